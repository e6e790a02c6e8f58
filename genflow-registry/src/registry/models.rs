//! Model registry
//!
//! Maps a model name to its backend and the capabilities declared for it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use genflow_core::backend::ModelBackend;
use genflow_core::context::FlowContext;
use genflow_core::error::{GenflowError, Result};
use genflow_core::request::{validate_capabilities, validate_structure};
use genflow_core::types::{GenerateRequest, GenerateResponse, ModelCapabilities};

struct ModelEntry {
    name: String,
    capabilities: ModelCapabilities,
    backend: Arc<dyn ModelBackend>,
}

/// A resolved model. Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct ModelHandle {
    entry: Arc<ModelEntry>,
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.entry.name)
            .field("provider", &self.entry.backend.provider_id())
            .field("capabilities", &self.entry.capabilities)
            .finish()
    }
}

impl ModelHandle {
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn capabilities(&self) -> &ModelCapabilities {
        &self.entry.capabilities
    }

    pub fn provider_id(&self) -> &str {
        self.entry.backend.provider_id()
    }

    /// Check a request against this model's declared capabilities
    pub fn validate(&self, request: &GenerateRequest) -> Result<()> {
        validate_structure(request)?;
        validate_capabilities(request, &self.entry.capabilities)
    }

    /// Validate and send the request to the backend.
    #[tracing::instrument(
        name = "model.invoke",
        skip_all,
        fields(model = %self.entry.name, provider = %self.entry.backend.provider_id())
    )]
    pub async fn invoke(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        self.validate(&request)?;
        tracing::debug!(
            messages = request.messages.len(),
            documents = request.documents.len(),
            "invoking backend"
        );
        let response = self.entry.backend.generate(request).await?;
        tracing::debug!(parts = response.message.content.len(), "backend responded");
        Ok(response)
    }

    /// Like [`invoke`](Self::invoke), observing `ctx`.
    ///
    /// A context that is already cancelled fails before the backend is called.
    /// Cancellation while the backend is working drops the in-flight call.
    pub async fn generate(
        &self,
        ctx: &FlowContext,
        request: GenerateRequest,
    ) -> Result<GenerateResponse> {
        ctx.check()?;
        match ctx.run_until_cancelled(self.invoke(request)).await {
            Ok(result) => result,
            Err(cancelled) => {
                tracing::debug!(model = %self.entry.name, "backend call dropped on cancellation");
                Err(cancelled)
            }
        }
    }
}

/// Name → model lookup table.
#[derive(Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelHandle>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under a unique name.
    pub fn register<B>(
        &mut self,
        name: impl Into<String>,
        capabilities: ModelCapabilities,
        backend: B,
    ) -> Result<ModelHandle>
    where
        B: ModelBackend + 'static,
    {
        self.register_shared(name, capabilities, Arc::new(backend))
    }

    /// Register an already shared backend (several names may point at one client).
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        capabilities: ModelCapabilities,
        backend: Arc<dyn ModelBackend>,
    ) -> Result<ModelHandle> {
        let name = name.into();
        if name.is_empty() {
            return Err(GenflowError::InvalidInput(
                "model name must not be empty".to_string(),
            ));
        }
        if self.models.contains_key(&name) {
            return Err(GenflowError::DuplicateModel(name));
        }
        tracing::debug!(
            model = %name,
            provider = %backend.provider_id(),
            ?capabilities,
            "registered model"
        );
        let handle = ModelHandle {
            entry: Arc::new(ModelEntry {
                name: name.clone(),
                capabilities,
                backend,
            }),
        };
        self.models.insert(name, handle.clone());
        Ok(handle)
    }

    pub fn resolve(&self, name: &str) -> Result<ModelHandle> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| GenflowError::model_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
