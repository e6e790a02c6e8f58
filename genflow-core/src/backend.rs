//! Backend boundary
//!
//! A backend turns a fully assembled [`GenerateRequest`] into a
//! [`GenerateResponse`]. Transport and protocol failures surface as
//! `GenflowError::BackendError`.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use genflow_spec::error::Result;
use genflow_spec::types::{GenerateRequest, GenerateResponse};

#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Provider identifier used in logs and errors
    fn provider_id(&self) -> &str {
        "custom"
    }
}

#[async_trait]
impl<T: ModelBackend + ?Sized> ModelBackend for Arc<T> {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        (**self).generate(request).await
    }

    fn provider_id(&self) -> &str {
        (**self).provider_id()
    }
}

type GenerateFn =
    dyn Fn(GenerateRequest) -> BoxFuture<'static, Result<GenerateResponse>> + Send + Sync;

/// Backend backed by a closure. Handy for stubs and tests.
pub struct FnBackend {
    provider: String,
    func: Box<GenerateFn>,
}

impl FnBackend {
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(GenerateRequest) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<GenerateResponse>> + Send + 'static,
    {
        Self {
            provider: "fn".to_string(),
            func: Box::new(move |req| Box::pin(func(req))),
        }
    }

    pub fn with_provider_id(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }
}

impl std::fmt::Debug for FnBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBackend")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelBackend for FnBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        (self.func)(request).await
    }

    fn provider_id(&self) -> &str {
        &self.provider
    }
}
