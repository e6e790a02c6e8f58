//! Cooperative cancellation for flow invocations
//!
//! A [`FlowContext`] is passed down the call chain. Nothing in the pipeline is
//! ever interrupted from outside: code observes the context at its suspension
//! points (`check`, `cancelled`, `run_until_cancelled`) and unwinds with a
//! `Cancelled` error carrying the reason.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use genflow_spec::error::{GenflowError, Result};

const DEFAULT_REASON: &str = "context cancelled";

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    reason: OnceLock<String>,
    parent: Option<FlowContext>,
}

/// Cancellation scope for one or more invocations.
///
/// Cloning is cheap and clones observe the same scope.
#[derive(Debug, Clone)]
pub struct FlowContext {
    inner: Arc<Inner>,
}

impl Default for FlowContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowContext {
    /// A fresh root context
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                reason: OnceLock::new(),
                parent: None,
            }),
        }
    }

    /// A child scope: cancelled whenever this context is, but cancelling the
    /// child leaves the parent untouched.
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: self.inner.token.child_token(),
                reason: OnceLock::new(),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Request cancellation. The first reason wins.
    pub fn cancel(&self, reason: impl Into<String>) {
        let _ = self.inner.reason.set(reason.into());
        self.inner.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Why this scope was cancelled, if it was
    pub fn reason(&self) -> Option<String> {
        if !self.is_cancelled() {
            return None;
        }
        Some(self.reason_or_default())
    }

    fn reason_or_default(&self) -> String {
        if let Some(reason) = self.inner.reason.get() {
            return reason.clone();
        }
        match &self.inner.parent {
            Some(parent) if parent.is_cancelled() => parent.reason_or_default(),
            _ => DEFAULT_REASON.to_string(),
        }
    }

    /// `Err(Cancelled)` once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(self.cancelled_error())
        } else {
            Ok(())
        }
    }

    /// Completes when cancellation is requested
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await
    }

    /// Drive `future` unless the context is cancelled first, in which case the
    /// future is dropped and `Cancelled` is returned.
    pub async fn run_until_cancelled<F>(&self, future: F) -> Result<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.inner.token.cancelled() => Err(self.cancelled_error()),
            output = future => Ok(output),
        }
    }

    pub fn cancelled_error(&self) -> GenflowError {
        GenflowError::Cancelled(self.reason_or_default())
    }

    /// The underlying token, for integrating with other tokio-util users
    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }
}
