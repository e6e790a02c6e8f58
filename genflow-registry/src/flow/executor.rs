//! Flow invocation state machine

use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

use genflow_core::context::FlowContext;
use genflow_core::error::{GenflowError, Result};

use super::FlowDefinition;

/// Lifecycle of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Terminal result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    Completed(Value),
    Failed(GenflowError),
    /// The handler observed its context; carries the cancellation reason
    Cancelled(String),
}

impl FlowOutcome {
    pub fn state(&self) -> FlowState {
        match self {
            Self::Completed(_) => FlowState::Completed,
            Self::Failed(_) => FlowState::Failed,
            Self::Cancelled(_) => FlowState::Cancelled,
        }
    }

    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Failed(error) => Err(error),
            Self::Cancelled(reason) => Err(GenflowError::Cancelled(reason)),
        }
    }

    fn from_result(result: Result<Value>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(GenflowError::Cancelled(reason)) => Self::Cancelled(reason),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Drive one invocation, publishing each state transition on `state`.
#[tracing::instrument(name = "flow.run", skip_all, fields(flow = %flow.name(), run_id = %id))]
pub(super) async fn execute(
    flow: &FlowDefinition,
    id: Uuid,
    ctx: FlowContext,
    input: Value,
    state: &watch::Sender<FlowState>,
) -> FlowOutcome {
    state.send_replace(FlowState::Running);
    tracing::debug!("flow running");

    let run = (flow.handler)(ctx, input);
    let outcome = match AssertUnwindSafe(run).catch_unwind().await {
        Ok(result) => FlowOutcome::from_result(result),
        Err(_) => FlowOutcome::Failed(GenflowError::InternalError(format!(
            "flow '{}' handler panicked",
            flow.name()
        ))),
    };

    state.send_replace(outcome.state());
    match &outcome {
        FlowOutcome::Failed(error) => tracing::debug!(%error, "flow failed"),
        FlowOutcome::Cancelled(reason) => tracing::debug!(%reason, "flow cancelled"),
        FlowOutcome::Completed(_) => tracing::debug!("flow completed"),
    }
    outcome
}
