//! MIME type detection utilities
//!
//! Classification prefers the payload's binary signature, falls back to the file
//! extension, and finally to a fixed default. It never fails and never yields an
//! empty type.

use std::path::Path;

use genflow_spec::error::Result;
use genflow_spec::types::{EncodedMedia, encode};

/// Type used when neither the signature nor the extension is recognized
pub const DEFAULT_FALLBACK_MIME: &str = "image/png";

const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
];

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess MIME from the fixed extension table (case-insensitive)
pub fn guess_mime_from_extension(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Classification policy.
///
/// The default policy uses the fixed image extension table and falls back to
/// `image/png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentClassifier {
    fallback: String,
    broad_extensions: bool,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK_MIME.to_string(),
            broad_extensions: false,
        }
    }
}

impl ContentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fallback type. An empty value keeps the current fallback.
    pub fn with_fallback(mut self, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        if !mime_type.is_empty() {
            self.fallback = mime_type;
        }
        self
    }

    /// Also resolve extensions outside the fixed table through `mime_guess`
    pub fn with_broad_extensions(mut self, enabled: bool) -> Self {
        self.broad_extensions = enabled;
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Combined guess: prefer bytes, fall back to extension, otherwise the fallback
    pub fn classify(&self, bytes: &[u8], filename: Option<&str>) -> String {
        if let Some(m) = guess_mime_from_bytes(bytes) {
            return m;
        }
        if let Some(name) = filename {
            if let Some(m) = guess_mime_from_extension(name) {
                return m.to_string();
            }
            if self.broad_extensions
                && let Some(m) = mime_guess::from_path(name).first_raw()
            {
                return m.to_string();
            }
        }
        tracing::trace!(fallback = %self.fallback, "no signature or extension match");
        self.fallback.clone()
    }
}

/// Classify with the default policy.
pub fn classify(bytes: &[u8], filename: Option<&str>) -> String {
    ContentClassifier::default().classify(bytes, filename)
}

/// Raw media plus the MIME type derived from it.
///
/// The type is never supplied by the caller; it is computed from the bytes (and
/// the declared path, as a backstop) when the asset is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    bytes: Vec<u8>,
    declared_path: Option<String>,
    mime_type: String,
}

impl MediaAsset {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, declared_path: Option<&str>) -> Self {
        Self::classified_by(&ContentClassifier::default(), bytes, declared_path)
    }

    pub fn classified_by(
        classifier: &ContentClassifier,
        bytes: impl Into<Vec<u8>>,
        declared_path: Option<&str>,
    ) -> Self {
        let bytes = bytes.into();
        let mime_type = classifier.classify(&bytes, declared_path);
        Self {
            bytes,
            declared_path: declared_path.map(str::to_string),
            mime_type,
        }
    }

    /// Decode a base64 payload (e.g. inline data returned by a backend) and
    /// classify the decoded bytes.
    pub fn from_base64(data: &str, declared_path: Option<&str>) -> Result<Self> {
        Self::from_base64_classified_by(&ContentClassifier::default(), data, declared_path)
    }

    /// [`MediaAsset::from_base64`] under a caller-chosen policy
    pub fn from_base64_classified_by(
        classifier: &ContentClassifier,
        data: &str,
        declared_path: Option<&str>,
    ) -> Result<Self> {
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD.decode(data)?;
        Ok(Self::classified_by(classifier, bytes, declared_path))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn declared_path(&self) -> Option<&str> {
        self.declared_path.as_deref()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Encode with the derived type. Fails with `EmptyPayload` for empty assets.
    pub fn encode(&self) -> Result<EncodedMedia> {
        encode(&self.bytes, &self.mime_type)
    }
}
