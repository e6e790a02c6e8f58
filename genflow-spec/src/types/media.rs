use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::{GenflowError, Result};

const DATA_URI_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Encoded media - a MIME type plus the base64 text of the bytes it describes.
///
/// Fields are private: an `EncodedMedia` only comes out of [`encode`] or
/// [`EncodedMedia::parse_data_uri`], so the type and payload always travel together.
///
/// Deserialization goes through the same checks as `parse_data_uri`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "WireMedia")]
pub struct EncodedMedia {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct WireMedia {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

impl TryFrom<WireMedia> for EncodedMedia {
    type Error = GenflowError;

    fn try_from(wire: WireMedia) -> Result<Self> {
        if wire.mime_type.is_empty() {
            return Err(GenflowError::InvalidInput(
                "encoded media is missing a MIME type".to_string(),
            ));
        }
        let bytes = STANDARD.decode(&wire.data)?;
        encode(&bytes, &wire.mime_type)
    }
}

/// Encode raw bytes into a transport-safe [`EncodedMedia`].
///
/// Uses the standard base64 alphabet with padding and no line wraps.
/// Fails with [`GenflowError::EmptyPayload`] on empty input.
///
/// ```rust
/// use genflow_spec::types::encode;
///
/// let media = encode(b"hi", "text/plain").unwrap();
/// assert_eq!(media.data_uri(), "data:text/plain;base64,aGk=");
/// ```
pub fn encode(bytes: &[u8], mime_type: &str) -> Result<EncodedMedia> {
    if bytes.is_empty() {
        return Err(GenflowError::EmptyPayload);
    }
    Ok(EncodedMedia {
        mime_type: mime_type.to_string(),
        data: STANDARD.encode(bytes),
    })
}

impl EncodedMedia {
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The base64 payload (no `data:` prefix)
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Render as an inline data URI: `data:<mimeType>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!(
            "{DATA_URI_SCHEME}{}{BASE64_MARKER}{}",
            self.mime_type, self.data
        )
    }

    /// Decode the payload back to the original bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.data)?)
    }

    /// Parse a `data:<mimeType>;base64,<payload>` URI.
    ///
    /// The payload is decoded once to make sure it is valid base64 and non-empty.
    pub fn parse_data_uri(uri: &str) -> Result<Self> {
        let rest = uri.strip_prefix(DATA_URI_SCHEME).ok_or_else(|| {
            GenflowError::InvalidInput("data URI must start with 'data:'".to_string())
        })?;
        let (mime_type, data) = rest.split_once(BASE64_MARKER).ok_or_else(|| {
            GenflowError::InvalidInput("data URI must be base64 encoded".to_string())
        })?;
        if mime_type.is_empty() {
            return Err(GenflowError::InvalidInput(
                "data URI is missing a MIME type".to_string(),
            ));
        }
        let bytes = STANDARD.decode(data)?;
        encode(&bytes, mime_type)
    }
}
