//! Flows: named async units of work
//!
//! A flow is defined once with typed input and output and stored type-erased
//! over JSON. Each invocation moves through
//! `Pending -> Running -> {Completed, Failed, Cancelled}`.
//!
//! Cancellation is cooperative. The executor never interrupts a handler; a
//! handler that ignores its [`FlowContext`] runs to completion even when the
//! context was cancelled before the run started.

mod executor;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use genflow_core::context::FlowContext;
use genflow_core::error::{GenflowError, Result};

pub use executor::{FlowOutcome, FlowState};

pub(crate) type ErasedHandler =
    dyn Fn(FlowContext, Value) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// A defined flow
#[derive(Clone)]
pub struct FlowDefinition {
    name: Arc<str>,
    handler: Arc<ErasedHandler>,
}

impl FlowDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for FlowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Name → flow lookup table and executor entry point.
#[derive(Default)]
pub struct FlowRegistry {
    flows: HashMap<String, FlowDefinition>,
}

impl fmt::Debug for FlowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowRegistry")
            .field("flows", &self.names())
            .finish()
    }
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a flow under a unique name.
    ///
    /// Input that does not deserialize into `I` fails the invocation with
    /// `InvalidInput`.
    pub fn define<I, O, F, Fut>(&mut self, name: impl Into<String>, handler: F) -> Result<()>
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(FlowContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(GenflowError::InvalidInput(
                "flow name must not be empty".to_string(),
            ));
        }
        if self.flows.contains_key(&name) {
            return Err(GenflowError::DuplicateFlow(name));
        }

        let flow_name = name.clone();
        let erased = move |ctx: FlowContext, input: Value| -> BoxFuture<'static, Result<Value>> {
            match serde_json::from_value::<I>(input) {
                Ok(input) => handler(ctx, input)
                    .map(|output| output.and_then(|o| Ok(serde_json::to_value(o)?)))
                    .boxed(),
                Err(e) => future::ready(Err(GenflowError::InvalidInput(format!(
                    "flow '{flow_name}' input: {e}"
                ))))
                .boxed(),
            }
        };

        tracing::debug!(flow = %name, "defined flow");
        self.flows.insert(
            name.clone(),
            FlowDefinition {
                name: name.into(),
                handler: Arc::new(erased),
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&FlowDefinition> {
        self.flows
            .get(name)
            .ok_or_else(|| GenflowError::flow_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flows.contains_key(name)
    }

    /// Defined names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.flows.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Run a flow to completion on the current task.
    pub async fn run<I, O>(&self, name: &str, ctx: &FlowContext, input: I) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let input = encode_input(name, input)?;
        let output = self.run_json(name, ctx, input).await?;
        Ok(serde_json::from_value(output)?)
    }

    /// Run a flow with JSON input and output.
    pub async fn run_json(&self, name: &str, ctx: &FlowContext, input: Value) -> Result<Value> {
        let flow = self.get(name)?;
        let (state, _) = watch::channel(FlowState::Pending);
        executor::execute(flow, Uuid::new_v4(), ctx.clone(), input, &state)
            .await
            .into_result()
    }

    /// Spawn a flow on its own task and return a handle to observe it.
    ///
    /// Unknown names and unserializable input fail here, before anything is
    /// spawned. Must be called from within a tokio runtime.
    pub fn start<I>(&self, name: &str, ctx: &FlowContext, input: I) -> Result<FlowInvocation>
    where
        I: Serialize,
    {
        let input = encode_input(name, input)?;
        self.start_json(name, ctx, input)
    }

    pub fn start_json(
        &self,
        name: &str,
        ctx: &FlowContext,
        input: Value,
    ) -> Result<FlowInvocation> {
        let flow = self.get(name)?.clone();
        let id = Uuid::new_v4();
        let (state_tx, state_rx) = watch::channel(FlowState::Pending);
        let ctx = ctx.clone();
        let handle = tokio::spawn(async move {
            executor::execute(&flow, id, ctx, input, &state_tx).await
        });
        Ok(FlowInvocation {
            id,
            flow: name.to_string(),
            state: state_rx,
            handle,
        })
    }
}

fn encode_input<I: Serialize>(name: &str, input: I) -> Result<Value> {
    serde_json::to_value(input)
        .map_err(|e| GenflowError::InvalidInput(format!("flow '{name}' input: {e}")))
}

/// A running (or finished) flow invocation.
#[derive(Debug)]
pub struct FlowInvocation {
    id: Uuid,
    flow: String,
    state: watch::Receiver<FlowState>,
    handle: JoinHandle<FlowOutcome>,
}

impl FlowInvocation {
    /// Unique id of this run
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn flow_name(&self) -> &str {
        &self.flow
    }

    /// Current state snapshot
    pub fn state(&self) -> FlowState {
        *self.state.borrow()
    }

    /// Receiver for following state changes
    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the terminal outcome.
    pub async fn outcome(self) -> FlowOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => FlowOutcome::Failed(GenflowError::InternalError(format!(
                "flow '{}' task failed: {e}",
                self.flow
            ))),
        }
    }

    /// Wait for the output as JSON.
    pub async fn result(self) -> Result<Value> {
        self.outcome().await.into_result()
    }

    /// Wait for the output and decode it.
    pub async fn output<O: DeserializeOwned>(self) -> Result<O> {
        let value = self.result().await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests;
