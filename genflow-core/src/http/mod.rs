//! HTTP plumbing shared by the bundled backends
//!
//! - headers.rs: header construction
//! - errors.rs: mapping transport and status failures onto `BackendError`

pub mod errors;
pub mod headers;

pub use errors::{classify_http_error, transport_error};
pub use headers::{HttpHeaderBuilder, user_agent};

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use genflow_spec::error::{GenflowError, Result};

/// POST a JSON body and decode a JSON reply.
///
/// Non-2xx replies become `BackendError` with the status and the provider's
/// error message; undecodable replies become `BackendError` without a status.
pub async fn post_json<B, R>(
    client: &reqwest::Client,
    provider_id: &str,
    url: &str,
    headers: HeaderMap,
    body: &B,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    tracing::debug!(provider = provider_id, url, "sending request");
    let response = client
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(provider_id, &e))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(provider_id, &e))?;
    tracing::trace!(
        provider = provider_id,
        status = status.as_u16(),
        body = %text,
        "received response"
    );

    if !status.is_success() {
        return Err(classify_http_error(
            provider_id,
            status.as_u16(),
            &text,
            status.canonical_reason(),
        ));
    }

    serde_json::from_str(&text).map_err(|e| {
        GenflowError::backend(provider_id, format!("unexpected response body: {e}"))
    })
}
