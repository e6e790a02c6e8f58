//! Messages and documents

use serde::{Deserialize, Serialize};

use super::media::EncodedMedia;
use super::part::Part;

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
    Model,
    Tool,
}

/// A role-tagged message made of ordered parts.
///
/// # Examples
///
/// ```rust
/// use genflow_spec::types::{Message, encode};
///
/// // Simple text message
/// let msg = Message::user("Hello!").build();
///
/// // Text plus an image
/// let image = encode(&[0xff, 0xd8, 0xff], "image/jpeg").unwrap();
/// let msg = Message::user("What do you see?").with_media(image).build();
/// assert_eq!(msg.content.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Part>,
}

impl Message {
    /// Message with explicit parts
    pub fn new(role: Role, content: Vec<Part>) -> Self {
        Self { role, content }
    }

    /// Creates a user message
    pub fn user<S: Into<String>>(text: S) -> MessageBuilder {
        MessageBuilder::new(Role::User).with_text(text)
    }

    /// Creates a system message
    pub fn system<S: Into<String>>(text: S) -> MessageBuilder {
        MessageBuilder::new(Role::System).with_text(text)
    }

    /// Creates a model (assistant) message
    pub fn model<S: Into<String>>(text: S) -> MessageBuilder {
        MessageBuilder::new(Role::Model).with_text(text)
    }

    /// Creates a tool message
    pub fn tool<S: Into<String>>(text: S) -> MessageBuilder {
        MessageBuilder::new(Role::Tool).with_text(text)
    }

    /// Start a message with no parts yet
    pub fn builder(role: Role) -> MessageBuilder {
        MessageBuilder::new(role)
    }

    /// Text parts joined in order, if any
    pub fn text(&self) -> Option<String> {
        concat_text(&self.content)
    }

    pub fn has_media(&self) -> bool {
        self.content.iter().any(Part::is_media)
    }
}

/// Builder for [`Message`]
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    role: Role,
    content: Vec<Part>,
}

impl MessageBuilder {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            content: Vec::new(),
        }
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.content.push(Part::text(text));
        self
    }

    pub fn with_media(mut self, media: EncodedMedia) -> Self {
        self.content.push(Part::media(media));
        self
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.content.push(part);
        self
    }

    pub fn build(self) -> Message {
        Message {
            role: self.role,
            content: self.content,
        }
    }
}

/// Background/context material, distinct from the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Document {
    pub content: Vec<Part>,
}

impl Document {
    pub fn new(content: Vec<Part>) -> Self {
        Self { content }
    }

    /// Single-part text document
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        Self {
            content: vec![Part::text(text)],
        }
    }

    /// Text parts joined in order, if any
    pub fn text(&self) -> Option<String> {
        concat_text(&self.content)
    }
}

fn concat_text(parts: &[Part]) -> Option<String> {
    let mut texts = parts.iter().filter_map(Part::as_text).peekable();
    texts.peek()?;
    Some(texts.collect())
}
