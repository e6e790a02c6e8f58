//! Exponential backoff for callers that want to repeat failed generations

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use genflow_spec::error::GenflowError;

use crate::context::FlowContext;

/// How often, and how patiently, to repeat a failing operation.
///
/// The wait before retry `n` (0-based) is `initial_delay * backoff_multiplier^n`,
/// capped at `max_delay`, optionally spread by up to `jitter_factor` either way.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub use_jitter: bool,
    /// Fraction of the delay, in `0.0..=1.0`
    pub jitter_factor: f64,
    /// Overrides [`GenflowError::is_retryable`]. `Cancelled` is never retried.
    pub retry_condition: Option<fn(&GenflowError) -> bool>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            use_jitter: true,
            jitter_factor: 0.1,
            retry_condition: None,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub const fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    pub fn with_retry_condition(mut self, condition: fn(&GenflowError) -> bool) -> Self {
        self.retry_condition = Some(condition);
        self
    }

    pub fn should_retry(&self, error: &GenflowError) -> bool {
        if error.is_cancelled() {
            return false;
        }
        self.retry_condition
            .map_or_else(|| error.is_retryable(), |condition| condition(error))
    }

    /// Wait before retry number `retry` (0-based)
    pub fn calculate_delay(&self, retry: u32) -> Duration {
        let millis =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(retry as i32);
        let capped = Duration::from_millis(millis as u64).min(self.max_delay);
        if self.use_jitter {
            self.jittered(capped)
        } else {
            capped
        }
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let spread = delay.as_millis() as f64 * self.jitter_factor;
        if spread <= 0.0 {
            return delay;
        }
        let offset = rand::thread_rng().gen_range(-spread..=spread);
        Duration::from_millis((delay.as_millis() as f64 + offset).max(0.0) as u64)
    }
}

/// Runs an operation under a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, GenflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenflowError>>,
    {
        self.drive(None, operation).await
    }

    /// [`execute`](Self::execute) bound to `ctx`: no attempt starts once it is
    /// cancelled, and a pending backoff ends early with `Cancelled`.
    pub async fn execute_in<F, Fut, T>(
        &self,
        ctx: &FlowContext,
        operation: F,
    ) -> Result<T, GenflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenflowError>>,
    {
        self.drive(Some(ctx), operation).await
    }

    async fn drive<F, Fut, T>(
        &self,
        ctx: Option<&FlowContext>,
        mut operation: F,
    ) -> Result<T, GenflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenflowError>>,
    {
        let attempts = self.policy.max_attempts.max(1);
        let mut retry = 0;
        loop {
            if let Some(ctx) = ctx {
                ctx.check()?;
            }
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            if retry + 1 >= attempts || !self.policy.should_retry(&error) {
                return Err(error);
            }
            let delay = self.policy.calculate_delay(retry);
            tracing::debug!(retry, ?delay, error = %error, "retrying after failure");
            match ctx {
                Some(ctx) => ctx.run_until_cancelled(tokio::time::sleep(delay)).await?,
                None => tokio::time::sleep(delay).await,
            }
            retry += 1;
        }
    }
}

/// Retry `operation` under [`RetryPolicy::default`]
pub async fn retry_with_default<F, Fut, T>(operation: F) -> Result<T, GenflowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenflowError>>,
{
    RetryExecutor::new(RetryPolicy::default())
        .execute(operation)
        .await
}
