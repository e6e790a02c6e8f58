//! genflow-spec
//!
//! Provider-agnostic data types and errors for genflow.
//!
//! This crate intentionally contains only *spec-level* types (requests, responses,
//! messages, parts, media payloads, and capability declarations) plus the shared
//! error taxonomy. Classification, request assembly, registries, and backend
//! implementations live in other crates (e.g. `genflow-core`, `genflow-registry`,
//! `genflow-provider-*`).
#![deny(unsafe_code)]

pub mod error;
pub mod types;

pub use error::{GenflowError, Result};
