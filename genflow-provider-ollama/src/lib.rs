//! genflow-provider-ollama
//!
//! Backend for a local Ollama server, using either the generate API
//! (`/api/generate`) or the chat API (`/api/chat`).
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod transformers;
pub mod types;

pub use client::{Ollama, OllamaBackend};
pub use config::{DEFAULT_SERVER_ADDRESS, OllamaApi, OllamaConfig, OllamaModelDefinition};
