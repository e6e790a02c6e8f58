//! genflow-provider-gemini
//!
//! Backend for the Gemini `generateContent` API.
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod transformers;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::{Gemini, GeminiBackend};
pub use config::{DEFAULT_BASE_URL, GeminiConfig};
