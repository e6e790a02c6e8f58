//! Gemini client and model backend

use std::sync::Arc;

use async_trait::async_trait;

use genflow_core::backend::ModelBackend;
use genflow_core::error::{GenflowError, Result};
use genflow_core::http::{HttpHeaderBuilder, post_json, user_agent};
use genflow_core::types::{GenerateRequest, GenerateResponse, ModelCapabilities};
use genflow_registry::{ModelHandle, ModelRegistry};
use reqwest::header::HeaderMap;

use crate::config::GeminiConfig;
use crate::transformers::{build_request, convert_response};
use crate::types::GenerateContentResponse;

const PROVIDER_ID: &str = "gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Build HTTP headers for Gemini requests; the key travels in `x-goog-api-key`.
pub fn build_gemini_headers(config: &GeminiConfig) -> Result<HeaderMap> {
    let builder = HttpHeaderBuilder::new()
        .with_json_content_type()
        .with_user_agent(&user_agent(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))?
        .with_secret_header(API_KEY_HEADER, config.api_key())?;
    Ok(builder.build())
}

#[derive(Debug, Clone)]
pub struct Gemini {
    config: Arc<GeminiConfig>,
    http_client: reqwest::Client,
}

impl Gemini {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| {
            GenflowError::ConfigurationError(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    /// Client configured from `GOOGLE_GENAI_API_KEY` / `GEMINI_API_KEY`
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn backend(&self, model: impl Into<String>) -> GeminiBackend {
        GeminiBackend {
            gemini: self.clone(),
            model: model.into(),
        }
    }

    /// Register a Gemini model. Gemini models accept every content kind.
    pub fn define_model(
        &self,
        registry: &mut ModelRegistry,
        model: impl Into<String>,
    ) -> Result<ModelHandle> {
        let model = model.into();
        registry.register(
            model.clone(),
            ModelCapabilities::all(),
            self.backend(model),
        )
    }
}

/// One Gemini model behind the [`ModelBackend`] trait
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    gemini: Gemini,
    model: String,
}

impl GeminiBackend {
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    #[tracing::instrument(name = "gemini.generate", skip_all, fields(model = %self.model))]
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let config = &self.gemini.config;
        let body = build_request(&request);
        let reply: GenerateContentResponse = post_json(
            &self.gemini.http_client,
            PROVIDER_ID,
            &config.generate_content_url(&self.model),
            build_gemini_headers(config)?,
            &body,
        )
        .await?;
        let mut response = convert_response(reply)?;
        if response.model.is_none() {
            response.model = Some(self.model.clone());
        }
        Ok(response)
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }
}
