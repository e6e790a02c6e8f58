//! genflow-core
//!
//! Provider-agnostic pipeline pieces: content classification, request assembly,
//! response extraction, the backend trait, cooperative cancellation, and
//! caller-side retry helpers.
#![deny(unsafe_code)]

pub mod backend;
pub mod context;
#[cfg(feature = "http")]
pub mod http;
pub mod request;
pub mod response;
pub mod retry;
pub mod utils;

pub use genflow_spec::{GenflowError, Result, error, types};

pub use backend::{FnBackend, ModelBackend};
pub use context::FlowContext;
pub use request::{RequestBuilder, augment_with_documents, build_request, validate_capabilities};
pub use response::{extract_text, text_parts};
pub use utils::mime::{ContentClassifier, MediaAsset, classify};
