//! Generate request

use serde::{Deserialize, Serialize};

use super::config::GenerationConfig;
use super::message::{Document, Message};

/// A fully assembled request, ready for a backend.
///
/// Build one through `genflow_core::request::RequestBuilder` (or
/// `build_request`) so content and capability checks run at assembly time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Document>,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "GenerationConfig::is_empty")]
    pub config: GenerationConfig,
}

impl GenerateRequest {
    /// Number of media parts across documents and messages
    pub fn media_count(&self) -> usize {
        self.documents
            .iter()
            .map(|d| &d.content)
            .chain(self.messages.iter().map(|m| &m.content))
            .flatten()
            .filter(|p| p.is_media())
            .count()
    }
}
