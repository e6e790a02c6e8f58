//! Registries populated at startup and shared read-only afterwards.
//!
//! Registration takes `&mut self`. Once the host is done registering it wraps
//! the registry in an `Arc`; lookups then need no locking.

pub mod models;
