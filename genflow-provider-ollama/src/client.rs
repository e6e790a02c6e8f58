//! Ollama client and model backend

use std::sync::Arc;

use async_trait::async_trait;

use genflow_core::backend::ModelBackend;
use genflow_core::error::{GenflowError, Result};
use genflow_core::http::{HttpHeaderBuilder, post_json, user_agent};
use genflow_core::types::{GenerateRequest, GenerateResponse, ModelCapabilities};
use genflow_registry::{ModelHandle, ModelRegistry};
use reqwest::header::HeaderMap;

use crate::config::{OllamaApi, OllamaConfig, OllamaModelDefinition};
use crate::transformers::{
    build_chat_request, build_generate_request, convert_chat_response, convert_generate_response,
};
use crate::types::{OllamaChatResponse, OllamaGenerateResponse};

const PROVIDER_ID: &str = "ollama";

/// Build HTTP headers for Ollama requests
pub fn build_headers() -> Result<HeaderMap> {
    let builder = HttpHeaderBuilder::new()
        .with_json_content_type()
        .with_user_agent(&user_agent(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))?;
    Ok(builder.build())
}

/// Connection to one Ollama server, shared by every model defined through it.
#[derive(Debug, Clone)]
pub struct Ollama {
    config: Arc<OllamaConfig>,
    http_client: reqwest::Client,
}

impl Ollama {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| {
            GenflowError::ConfigurationError(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self::with_http_client(config, http_client))
    }

    pub fn with_http_client(config: OllamaConfig, http_client: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            http_client,
        }
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Backend for one model on this server
    pub fn backend(&self, definition: OllamaModelDefinition) -> OllamaBackend {
        OllamaBackend {
            ollama: self.clone(),
            definition,
        }
    }

    /// Register a model under its Ollama name.
    pub fn define_model(
        &self,
        registry: &mut ModelRegistry,
        definition: OllamaModelDefinition,
        capabilities: ModelCapabilities,
    ) -> Result<ModelHandle> {
        let name = definition.name.clone();
        registry.register(name, capabilities, self.backend(definition))
    }
}

/// One Ollama model behind the [`ModelBackend`] trait
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    ollama: Ollama,
    definition: OllamaModelDefinition,
}

impl OllamaBackend {
    pub fn definition(&self) -> &OllamaModelDefinition {
        &self.definition
    }

    async fn generate_api(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let config = &self.ollama.config;
        let body = build_generate_request(
            &self.definition.name,
            request,
            config.keep_alive.as_deref(),
        );
        let reply: OllamaGenerateResponse = post_json(
            &self.ollama.http_client,
            PROVIDER_ID,
            &config.endpoint("/api/generate"),
            build_headers()?,
            &body,
        )
        .await?;
        Ok(convert_generate_response(reply))
    }

    async fn chat_api(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let config = &self.ollama.config;
        let body = build_chat_request(
            &self.definition.name,
            request,
            config.keep_alive.as_deref(),
        );
        let reply: OllamaChatResponse = post_json(
            &self.ollama.http_client,
            PROVIDER_ID,
            &config.endpoint("/api/chat"),
            build_headers()?,
            &body,
        )
        .await?;
        Ok(convert_chat_response(reply))
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    #[tracing::instrument(
        name = "ollama.generate",
        skip_all,
        fields(model = %self.definition.name, api = ?self.definition.api)
    )]
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        match self.definition.api {
            OllamaApi::Generate => self.generate_api(&request).await,
            OllamaApi::Chat => self.chat_api(&request).await,
        }
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }
}
