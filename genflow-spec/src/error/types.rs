//! Core error types

use std::fmt;

use thiserror::Error;

use crate::types::Capability;

/// Where a piece of content sits inside a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentLocation {
    /// The document at this index of `GenerateRequest::documents`
    Document(usize),
    /// The message at this index of `GenerateRequest::messages`
    Message(usize),
}

impl fmt::Display for ContentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document(i) => write!(f, "document {i}"),
            Self::Message(i) => write!(f, "message {i}"),
        }
    }
}

/// Position of a single part: its container plus the index inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartPosition {
    pub location: ContentLocation,
    pub part: usize,
}

impl PartPosition {
    pub const fn new(location: ContentLocation, part: usize) -> Self {
        Self { location, part }
    }
}

impl fmt::Display for PartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, part {}", self.location, self.part)
    }
}

/// Which registry an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Model,
    Flow,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => f.write_str("model"),
            Self::Flow => f.write_str("flow"),
        }
    }
}

/// The error taxonomy shared by every genflow crate.
///
/// All variants carry owned data so errors can be cloned (the retry executor keeps
/// the last failure around while it backs off).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenflowError {
    /// Attempted to encode a zero-length media payload
    #[error("cannot encode an empty media payload")]
    EmptyPayload,

    /// A message or document without any parts
    #[error("{location} has no content parts")]
    EmptyContent { location: ContentLocation },

    /// The request uses a feature the target model does not declare
    #[error("model does not support {capability}: {message}")]
    CapabilityViolation {
        capability: Capability,
        /// Offending part, when the violation is tied to one
        position: Option<PartPosition>,
        message: String,
    },

    /// A model name was registered twice
    #[error("model '{0}' is already registered")]
    DuplicateModel(String),

    /// A flow name was defined twice
    #[error("flow '{0}' is already defined")]
    DuplicateFlow(String),

    /// Lookup of an unknown model or flow
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntryKind, name: String },

    /// The response carried no text part at all
    #[error("response contains no text content")]
    NoTextContent,

    /// Anything the backend collaborator reported
    #[error("{provider} backend error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    BackendError {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// The caller's context was cancelled and the work observed it
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Malformed caller input (flow input, data URI, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Backend or host configuration problem
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    InternalError(String),
}

impl GenflowError {
    /// Build a backend error without an HTTP status.
    pub fn backend(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendError {
            provider: provider.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Build a backend error carrying an HTTP status.
    pub fn backend_status(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::BackendError {
            provider: provider.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn model_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntryKind::Model,
            name: name.into(),
        }
    }

    pub fn flow_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntryKind::Flow,
            name: name.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Whether retrying the same operation could plausibly succeed.
    ///
    /// Only backend failures qualify: transport errors (no status), timeouts,
    /// rate limits, and server errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::BackendError { status: None, .. } => true,
            Self::BackendError {
                status: Some(code), ..
            } => *code == 408 || *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Result alias used across genflow.
pub type Result<T> = std::result::Result<T, GenflowError>;
