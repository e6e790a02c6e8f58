//! HTTP error normalization

use genflow_spec::error::GenflowError;

const BODY_SAMPLE_CHARS: usize = 200;

/// Map a non-2xx reply onto `BackendError`.
///
/// Prefers the provider's own message (`{"error": {"message": ..}}` or
/// `{"error": ".."}`), then a sample of the body, then the canonical reason.
pub fn classify_http_error(
    provider_id: &str,
    status: u16,
    body_text: &str,
    fallback_message: Option<&str>,
) -> GenflowError {
    let message = provider_message(body_text)
        .or_else(|| {
            let sample: String = body_text.trim().chars().take(BODY_SAMPLE_CHARS).collect();
            (!sample.is_empty()).then_some(sample)
        })
        .or_else(|| fallback_message.map(str::to_string))
        .unwrap_or_else(|| "request failed".to_string());
    GenflowError::backend_status(provider_id, status, message)
}

fn provider_message(body_text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body_text).ok()?;
    let error = value.get("error")?;
    match error {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
}

/// Map a reqwest failure (connect, timeout, body read) onto `BackendError`.
pub fn transport_error(provider_id: &str, error: &reqwest::Error) -> GenflowError {
    match error.status() {
        Some(status) => {
            GenflowError::backend_status(provider_id, status.as_u16(), error.to_string())
        }
        None => GenflowError::backend(provider_id, error.to_string()),
    }
}
