//! Header assembly for backend requests

use genflow_spec::error::GenflowError;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};

/// HTTP header builder for backend requests
#[derive(Debug, Default)]
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Content-Type: application/json`
    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Add user agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self, GenflowError> {
        self.headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|e| {
                GenflowError::ConfigurationError(format!("Invalid user agent: {e}"))
            })?,
        );
        Ok(self)
    }

    /// Add a custom header (API keys and the like). The value is marked sensitive.
    pub fn with_secret_header(mut self, name: &str, value: &str) -> Result<Self, GenflowError> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            GenflowError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
        })?;
        let mut header_value = HeaderValue::from_str(value).map_err(|e| {
            GenflowError::ConfigurationError(format!("Invalid value for header '{name}': {e}"))
        })?;
        header_value.set_sensitive(true);
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

/// `<crate>/<version>` style user agent for a provider crate
pub fn user_agent(package: &str, version: &str) -> String {
    format!("{package}/{version}")
}
