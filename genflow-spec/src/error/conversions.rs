//! Type Conversions for GenflowError
//!
//! From implementations for the error types that cross crate boundaries.

use super::types::GenflowError;

impl From<serde_json::Error> for GenflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<base64::DecodeError> for GenflowError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidInput(format!("invalid base64 payload: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: GenflowError = json_err.into();
        assert!(matches!(err, GenflowError::JsonError(_)));
    }

    #[test]
    fn test_from_base64_error() {
        use base64::Engine;
        let decode_err = base64::engine::general_purpose::STANDARD
            .decode("@@@")
            .unwrap_err();
        let err: GenflowError = decode_err.into();
        assert!(matches!(err, GenflowError::InvalidInput(_)));
    }
}
