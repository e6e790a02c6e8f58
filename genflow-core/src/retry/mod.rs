//! Caller-side retry helpers
//!
//! Nothing inside the pipeline retries on its own. Callers wrap a flow run or a
//! model invocation with a [`RetryExecutor`] when they want repeated attempts.

pub mod policy;

pub use policy::*;
