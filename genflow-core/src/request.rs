//! Request assembly
//!
//! Combines documents, messages and generation options into a
//! [`GenerateRequest`], checking content and declared model capabilities
//! before anything reaches a backend.

use genflow_spec::error::{ContentLocation, GenflowError, PartPosition, Result};
use genflow_spec::types::{
    Capability, Document, EncodedMedia, GenerateRequest, GenerationConfig, Message,
    ModelCapabilities, Part, Role,
};

/// Header placed in front of the rendered documents by [`augment_with_documents`]
pub const CONTEXT_PREAMBLE: &str = "\n\nUse the following information to complete your task:\n\n";

/// Assemble and validate a request.
///
/// With `capabilities` set, every declared capability is enforced; without
/// them only the structural checks run.
pub fn build_request(
    documents: Vec<Document>,
    messages: Vec<Message>,
    config: GenerationConfig,
    capabilities: Option<&ModelCapabilities>,
) -> Result<GenerateRequest> {
    let request = GenerateRequest {
        documents,
        messages,
        config,
    };
    validate_structure(&request)?;
    if let Some(caps) = capabilities {
        validate_capabilities(&request, caps)?;
    }
    tracing::trace!(
        documents = request.documents.len(),
        messages = request.messages.len(),
        media = request.media_count(),
        "assembled request"
    );
    Ok(request)
}

/// Every message and document must carry at least one part.
pub fn validate_structure(request: &GenerateRequest) -> Result<()> {
    for (i, doc) in request.documents.iter().enumerate() {
        if doc.content.is_empty() {
            return Err(GenflowError::EmptyContent {
                location: ContentLocation::Document(i),
            });
        }
    }
    for (i, msg) in request.messages.iter().enumerate() {
        if msg.content.is_empty() {
            return Err(GenflowError::EmptyContent {
                location: ContentLocation::Message(i),
            });
        }
    }
    Ok(())
}

/// Check a request against what a model declared at registration.
pub fn validate_capabilities(request: &GenerateRequest, caps: &ModelCapabilities) -> Result<()> {
    if !caps.media {
        let documents = request
            .documents
            .iter()
            .enumerate()
            .map(|(i, d)| (ContentLocation::Document(i), &d.content));
        let messages = request
            .messages
            .iter()
            .enumerate()
            .map(|(i, m)| (ContentLocation::Message(i), &m.content));
        for (location, parts) in documents.chain(messages) {
            if let Some(part) = parts.iter().position(Part::is_media) {
                let position = PartPosition::new(location, part);
                return Err(GenflowError::CapabilityViolation {
                    capability: Capability::Media,
                    position: Some(position),
                    message: format!("media part at {position}"),
                });
            }
        }
    }

    let mut conversational = 0usize;
    for (i, msg) in request.messages.iter().enumerate() {
        match msg.role {
            Role::System if !caps.system_role => {
                return Err(message_violation(Capability::SystemRole, i, "system message"));
            }
            Role::Tool if !caps.tools => {
                return Err(message_violation(Capability::Tools, i, "tool message"));
            }
            Role::System => {}
            _ => {
                conversational += 1;
                if conversational > 1 && !caps.multiturn {
                    return Err(message_violation(
                        Capability::Multiturn,
                        i,
                        "more than one conversational message",
                    ));
                }
            }
        }
    }
    Ok(())
}

fn message_violation(capability: Capability, index: usize, what: &str) -> GenflowError {
    GenflowError::CapabilityViolation {
        capability,
        position: None,
        message: format!("{what} at {}", ContentLocation::Message(index)),
    }
}

/// Render documents into the conversation.
///
/// For backends without a native document slot: the document text is appended
/// to the last user message as a numbered context block, document media parts
/// follow it, and the returned request has no documents left. When there is no
/// user message a new one is added.
pub fn augment_with_documents(mut request: GenerateRequest) -> GenerateRequest {
    if request.documents.is_empty() {
        return request;
    }
    let documents = std::mem::take(&mut request.documents);

    let mut block = String::from(CONTEXT_PREAMBLE);
    let mut media = Vec::new();
    for (i, doc) in documents.iter().enumerate() {
        block.push_str(&format!("- [{i}]: {}\n", doc.text().unwrap_or_default()));
        media.extend(doc.content.iter().filter(|p| p.is_media()).cloned());
    }
    block.push('\n');

    let target = request.messages.iter().rposition(|m| m.role == Role::User);
    let message = match target {
        Some(i) => &mut request.messages[i],
        None => {
            request.messages.push(Message::new(Role::User, Vec::new()));
            let last = request.messages.len() - 1;
            &mut request.messages[last]
        }
    };
    message.content.push(Part::text(block));
    message.content.extend(media);
    request
}

/// Fluent request assembly.
///
/// # Example
///
/// ```rust,ignore
/// let request = RequestBuilder::new()
///     .document(Document::from_text("Glasses are often a sign of evil people"))
///     .message(Message::user("What do you think?").with_media(image).build())
///     .config(GenerationConfig::new().with_temperature(2.0))
///     .build_for(&capabilities)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    documents: Vec<Document>,
    messages: Vec<Message>,
    config: GenerationConfig,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    pub fn documents(mut self, documents: impl IntoIterator<Item = Document>) -> Self {
        self.documents.extend(documents);
        self
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Shorthand for a text-only user message
    pub fn user_text(self, text: impl Into<String>) -> Self {
        self.message(Message::user(text).build())
    }

    /// Shorthand for a user message with text followed by one media part
    pub fn user_with_media(self, text: impl Into<String>, media: EncodedMedia) -> Self {
        self.message(Message::user(text).with_media(media).build())
    }

    pub fn config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.config.insert(name, value);
        self
    }

    /// Structural checks only
    pub fn build(self) -> Result<GenerateRequest> {
        build_request(self.documents, self.messages, self.config, None)
    }

    /// Structural and capability checks
    pub fn build_for(self, capabilities: &ModelCapabilities) -> Result<GenerateRequest> {
        build_request(self.documents, self.messages, self.config, Some(capabilities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genflow_spec::types::encode;

    fn image() -> EncodedMedia {
        encode(&[0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg").unwrap()
    }

    fn llava_caps() -> ModelCapabilities {
        ModelCapabilities::new().with_system_role().with_media()
    }

    #[test]
    fn multimodal_request_keeps_order_and_config() {
        let config = GenerationConfig::new()
            .with_temperature(2.0)
            .with_top_k(50)
            .with_top_p(0.5);
        let request = RequestBuilder::new()
            .document(Document::from_text("Glasses are often a sign of evil people"))
            .user_with_media("What do you think about this animated character?", image())
            .config(config.clone())
            .build_for(&llava_caps())
            .unwrap();

        assert_eq!(request.documents.len(), 1);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(
            request.messages[0].content,
            vec![
                Part::text("What do you think about this animated character?"),
                Part::media(image()),
            ]
        );
        assert_eq!(request.config, config);
    }

    #[test]
    fn assembly_is_deterministic() {
        let build = || {
            build_request(
                vec![Document::from_text("ctx")],
                vec![Message::user("q").with_media(image()).build()],
                GenerationConfig::new().with_top_p(0.5).with_temperature(1.0),
                Some(&llava_caps()),
            )
            .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn empty_message_is_rejected_with_location() {
        let err = build_request(
            vec![],
            vec![
                Message::user("fine").build(),
                Message::new(Role::User, vec![]),
            ],
            GenerationConfig::default(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            GenflowError::EmptyContent {
                location: ContentLocation::Message(1)
            }
        );
    }

    #[test]
    fn empty_document_is_rejected_with_location() {
        let err = RequestBuilder::new()
            .document(Document::new(vec![]))
            .user_text("q")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GenflowError::EmptyContent {
                location: ContentLocation::Document(0)
            }
        );
    }

    #[test]
    fn media_on_text_only_model_reports_position() {
        let caps = ModelCapabilities::new();
        let err = RequestBuilder::new()
            .message(
                Message::user("look")
                    .with_text("closer")
                    .with_media(image())
                    .build(),
            )
            .build_for(&caps)
            .unwrap_err();
        match err {
            GenflowError::CapabilityViolation {
                capability,
                position,
                ..
            } => {
                assert_eq!(capability, Capability::Media);
                assert_eq!(
                    position,
                    Some(PartPosition::new(ContentLocation::Message(0), 2))
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn media_in_document_is_checked_too() {
        let err = RequestBuilder::new()
            .document(Document::new(vec![Part::media(image())]))
            .user_text("q")
            .build_for(&ModelCapabilities::new())
            .unwrap_err();
        assert!(matches!(
            err,
            GenflowError::CapabilityViolation {
                position: Some(PartPosition {
                    location: ContentLocation::Document(0),
                    part: 0
                }),
                ..
            }
        ));
    }

    #[test]
    fn media_passes_without_capabilities() {
        let request = RequestBuilder::new()
            .user_with_media("q", image())
            .build()
            .unwrap();
        assert_eq!(request.media_count(), 1);
    }

    #[test]
    fn role_capabilities_are_enforced() {
        let caps = ModelCapabilities::new();

        let system = RequestBuilder::new()
            .message(Message::system("be terse").build())
            .user_text("q")
            .build_for(&caps)
            .unwrap_err();
        assert!(matches!(
            system,
            GenflowError::CapabilityViolation {
                capability: Capability::SystemRole,
                ..
            }
        ));

        let tool = RequestBuilder::new()
            .message(Message::tool("42").build())
            .build_for(&caps)
            .unwrap_err();
        assert!(matches!(
            tool,
            GenflowError::CapabilityViolation {
                capability: Capability::Tools,
                ..
            }
        ));

        let multiturn = RequestBuilder::new()
            .user_text("hi")
            .message(Message::model("hello").build())
            .user_text("again")
            .build_for(&caps)
            .unwrap_err();
        assert!(matches!(
            multiturn,
            GenflowError::CapabilityViolation {
                capability: Capability::Multiturn,
                ..
            }
        ));
    }

    #[test]
    fn system_message_does_not_count_as_a_turn() {
        let request = RequestBuilder::new()
            .message(Message::system("be terse").build())
            .user_with_media("q", image())
            .build_for(&llava_caps());
        assert!(request.is_ok());
    }

    #[test]
    fn augment_appends_context_to_last_user_message() {
        let request = RequestBuilder::new()
            .document(Document::from_text("first fact"))
            .document(Document::from_text("second fact"))
            .user_text("earlier")
            .message(Message::model("ok").build())
            .user_with_media("question", image())
            .build()
            .unwrap();

        let augmented = augment_with_documents(request);
        assert!(augmented.documents.is_empty());
        let last = &augmented.messages[2].content;
        assert_eq!(last.len(), 3);
        assert_eq!(
            last[2].as_text(),
            Some(
                "\n\nUse the following information to complete your task:\n\n\
                 - [0]: first fact\n- [1]: second fact\n\n"
            )
        );
        assert_eq!(augmented.messages[0].content.len(), 1);
    }

    #[test]
    fn augment_without_user_message_adds_one() {
        let request = GenerateRequest {
            documents: vec![Document::new(vec![Part::text("fact"), Part::media(image())])],
            messages: vec![Message::system("sys").build()],
            config: GenerationConfig::default(),
        };
        let augmented = augment_with_documents(request);
        assert_eq!(augmented.messages.len(), 2);
        assert_eq!(augmented.messages[1].role, Role::User);
        assert!(augmented.messages[1].has_media());
    }

    #[test]
    fn augment_is_noop_without_documents() {
        let request = RequestBuilder::new().user_text("q").build().unwrap();
        assert_eq!(augment_with_documents(request.clone()), request);
    }
}
