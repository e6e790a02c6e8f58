//! Opaque generation configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conventional option keys. Only backends interpret them.
pub mod keys {
    pub const TEMPERATURE: &str = "temperature";
    pub const TOP_K: &str = "topK";
    pub const TOP_P: &str = "topP";
    pub const MAX_OUTPUT_TOKENS: &str = "maxOutputTokens";
    pub const STOP_SEQUENCES: &str = "stopSequences";
}

/// Generation options forwarded to the backend unchanged.
///
/// Keys are kept sorted so two configs built from the same options compare and
/// serialize identically regardless of insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct GenerationConfig {
    options: BTreeMap<String, Value>,
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary option
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn with_temperature(self, temperature: f64) -> Self {
        self.with_option(keys::TEMPERATURE, temperature)
    }

    pub fn with_top_k(self, top_k: u32) -> Self {
        self.with_option(keys::TOP_K, top_k)
    }

    pub fn with_top_p(self, top_p: f64) -> Self {
        self.with_option(keys::TOP_P, top_p)
    }

    pub fn with_max_output_tokens(self, max_output_tokens: u32) -> Self {
        self.with_option(keys::MAX_OUTPUT_TOKENS, max_output_tokens)
    }

    pub fn with_stop_sequences<I, S>(self, stops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stops: Vec<Value> = stops.into_iter().map(|s| Value::String(s.into())).collect();
        self.with_option(keys::STOP_SEQUENCES, Value::Array(stops))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.options.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for GenerationConfig {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}
