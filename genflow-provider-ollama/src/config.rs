//! Ollama configuration

use std::time::Duration;

/// Address of a default local Ollama install
pub const DEFAULT_SERVER_ADDRESS: &str = "http://127.0.0.1:11434";

/// Connection settings for one Ollama server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    pub server_address: String,
    /// Whole-request timeout. Local multimodal models can be slow, so none by default.
    pub timeout: Option<Duration>,
    /// Forwarded as `keep_alive` when set
    pub keep_alive: Option<String>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            timeout: None,
            keep_alive: None,
        }
    }
}

impl OllamaConfig {
    pub fn new(server_address: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    /// `server_address` joined with an API path, without doubling slashes
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server_address.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Which Ollama endpoint a model is served through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OllamaApi {
    /// Single prompt completion, `/api/generate`
    #[default]
    Generate,
    /// Role-tagged conversation, `/api/chat`
    Chat,
}

/// A model pulled into the Ollama server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaModelDefinition {
    pub name: String,
    pub api: OllamaApi,
}

impl OllamaModelDefinition {
    pub fn generate(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api: OllamaApi::Generate,
        }
    }

    pub fn chat(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api: OllamaApi::Chat,
        }
    }
}
