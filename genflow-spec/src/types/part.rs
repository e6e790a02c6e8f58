use serde::{Deserialize, Serialize};

use super::media::EncodedMedia;

/// Content part - one ordered piece of a message or document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Part {
    /// Text content
    Text { text: String },

    /// Inline media (image, audio, ...) with its derived MIME type
    Media {
        #[serde(flatten)]
        media: EncodedMedia,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn media(media: EncodedMedia) -> Self {
        Self::Media { media }
    }

    /// Text payload, if this is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Media { .. } => None,
        }
    }

    /// Media payload, if this is a media part
    pub fn as_media(&self) -> Option<&EncodedMedia> {
        match self {
            Self::Media { media } => Some(media),
            Self::Text { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    pub fn is_media(&self) -> bool {
        matches!(self, Self::Media { .. })
    }
}

impl From<&str> for Part {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Part {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<EncodedMedia> for Part {
    fn from(media: EncodedMedia) -> Self {
        Self::media(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::encode;

    #[test]
    fn text_part_serializes_with_type_tag() {
        let json = serde_json::to_value(Part::text("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "text": "hello"}));
    }

    #[test]
    fn media_part_flattens_payload() {
        let media = encode(b"x", "image/png").unwrap();
        let json = serde_json::to_value(Part::media(media.clone())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "media", "mimeType": "image/png", "data": "eA=="})
        );
        let back: Part = serde_json::from_value(json).unwrap();
        assert_eq!(back.as_media(), Some(&media));
    }

    #[test]
    fn accessors_discriminate_variants() {
        let text = Part::from("a");
        assert!(text.is_text());
        assert_eq!(text.as_text(), Some("a"));
        assert!(text.as_media().is_none());

        let media = Part::from(encode(b"x", "image/png").unwrap());
        assert!(media.is_media());
        assert!(media.as_text().is_none());
    }
}
