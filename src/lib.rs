//! # genflow
//!
//! A provider-agnostic generation pipeline: classify and encode media, assemble
//! multimodal requests, route them to named models, and run named flows under
//! a cooperative cancellation context.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use genflow::prelude::*;
//!
//! let mut genflow = Genflow::new();
//! genflow.define_model("echo", ModelCapabilities::all(), FnBackend::new(|req| async move {
//!     Ok(GenerateResponse::from_text(format!("{} messages", req.messages.len())))
//! }))?;
//!
//! let model = genflow.resolve("echo")?;
//! genflow.define_flow("describe", move |ctx: FlowContext, subject: String| {
//!     let model = model.clone();
//!     async move {
//!         let request = RequestBuilder::new().user_text(subject).build()?;
//!         extract_text(&model.generate(&ctx, request).await?)
//!     }
//! })?;
//!
//! let text: String = genflow.run_flow("describe", "pumpkins").await?;
//! ```
//!
//! Backends are enabled per feature: `ollama` and `google` (both on by default).
#![deny(unsafe_code)]

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use genflow_core::{
    ContentClassifier, FlowContext, FnBackend, GenflowError, MediaAsset, ModelBackend,
    RequestBuilder, Result, augment_with_documents, build_request, classify, error,
    extract_text, text_parts, types, validate_capabilities,
};
pub use genflow_core::retry::{RetryExecutor, RetryPolicy};
pub use genflow_registry::{
    FlowInvocation, FlowOutcome, FlowRegistry, FlowState, ModelHandle, ModelRegistry,
};

use genflow_core::types::{GenerateRequest, GenerateResponse, ModelCapabilities};

/// Backend implementations
pub mod providers {
    #[cfg(feature = "google")]
    pub mod gemini {
        pub use genflow_provider_gemini::*;
    }

    #[cfg(feature = "ollama")]
    pub mod ollama {
        pub use genflow_provider_ollama::*;
    }
}

pub mod prelude {
    pub use crate::Genflow;
    pub use genflow_core::types::{
        Capability, Document, EncodedMedia, FinishReason, GenerateRequest, GenerateResponse,
        GenerationConfig, Message, ModelCapabilities, Part, Role, Usage, encode,
    };
    pub use genflow_core::{
        ContentClassifier, FlowContext, FnBackend, GenflowError, MediaAsset, ModelBackend,
        RequestBuilder, Result, extract_text,
    };
    pub use genflow_registry::{FlowInvocation, FlowOutcome, FlowState, ModelHandle};
}

/// Model and flow registries plus the root cancellation context.
///
/// Populate models and flows first, then use the instance from any number of
/// tasks; every run derives a child of the root context, so [`Genflow::shutdown`]
/// reaches all of them.
#[derive(Debug, Default)]
pub struct Genflow {
    models: ModelRegistry,
    flows: FlowRegistry,
    root: FlowContext,
}

impl Genflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing context as the root (e.g. one cancelled on Ctrl+C)
    pub fn with_context(mut self, root: FlowContext) -> Self {
        self.root = root;
        self
    }

    pub fn context(&self) -> &FlowContext {
        &self.root
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut ModelRegistry {
        &mut self.models
    }

    pub fn flows(&self) -> &FlowRegistry {
        &self.flows
    }

    pub fn define_model<B>(
        &mut self,
        name: impl Into<String>,
        capabilities: ModelCapabilities,
        backend: B,
    ) -> Result<ModelHandle>
    where
        B: ModelBackend + 'static,
    {
        self.models.register(name, capabilities, backend)
    }

    pub fn define_flow<I, O, F, Fut>(&mut self, name: impl Into<String>, handler: F) -> Result<()>
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(FlowContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        self.flows.define(name, handler)
    }

    pub fn resolve(&self, name: &str) -> Result<ModelHandle> {
        self.models.resolve(name)
    }

    /// Resolve `model` and generate under `ctx`.
    pub async fn generate(
        &self,
        ctx: &FlowContext,
        model: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse> {
        let handle = self.resolve(model)?;
        handle.generate(ctx, request).await
    }

    /// [`Genflow::generate`], reduced to the reply's concatenated text.
    pub async fn generate_text(
        &self,
        ctx: &FlowContext,
        model: &str,
        request: GenerateRequest,
    ) -> Result<String> {
        let response = self.generate(ctx, model, request).await?;
        extract_text(&response)
    }

    pub async fn run_flow<I, O>(&self, name: &str, input: I) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        self.flows.run(name, &self.root.child(), input).await
    }

    /// Spawn a flow on its own task. Must be called from within a tokio runtime.
    pub fn start_flow<I: Serialize>(&self, name: &str, input: I) -> Result<FlowInvocation> {
        self.flows.start(name, &self.root.child(), input)
    }

    /// Cancel the root context and with it every run derived from it.
    pub fn shutdown(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::debug!(%reason, "shutting down");
        self.root.cancel(reason);
    }
}
