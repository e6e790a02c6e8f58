//! genflow-registry
//!
//! Named models with declared capabilities, and named flows run under a
//! cooperative cancellation context.
#![deny(unsafe_code)]

pub use genflow_core::{FlowContext, GenflowError, ModelBackend, Result, error, types};

pub mod flow;
pub mod registry;

pub use flow::{FlowInvocation, FlowOutcome, FlowRegistry, FlowState};
pub use registry::models::{ModelHandle, ModelRegistry};
