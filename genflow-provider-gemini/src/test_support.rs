//! Scoped changes to `GEMINI_*` / `GOOGLE_*` variables for config tests.
//! Hold `ENV_LOCK` for as long as a guard is alive.

#![allow(unsafe_code)]

use std::sync::Mutex;

pub(crate) static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Puts the variable back the way it was on drop
pub(crate) struct EnvGuard {
    key: &'static str,
    saved: Option<String>,
}

fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers serialize on ENV_LOCK
    unsafe {
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
}

impl EnvGuard {
    fn swap(key: &'static str, value: Option<&str>) -> Self {
        let saved = std::env::var(key).ok();
        write_var(key, value);
        Self { key, saved }
    }

    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        Self::swap(key, Some(value))
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        Self::swap(key, None)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_var(self.key, self.saved.as_deref());
    }
}
