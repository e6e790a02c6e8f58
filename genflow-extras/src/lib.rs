//! genflow-extras
//!
//! Optional utilities that sit outside the generation pipeline. The core crates
//! emit `tracing` events but never install a subscriber; applications pick one
//! here.
#![deny(unsafe_code)]

pub mod error;

#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use error::{ExtrasError, Result};
