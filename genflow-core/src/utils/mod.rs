//! Utility modules for genflow-core

pub mod mime;
