use thiserror::Error;

/// Fallback when a non-2xx body carries no usable message
const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 from the backend. Reported as-is; the session layer decides
    /// what to do with the stored credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Any other non-2xx status, with the backend's message when present
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 2xx auth response with no recognizable token/user pair
    #[error("Invalid authentication response")]
    MalformedAuthResponse,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Pull the backend's human-readable message out of an error body.
    /// Errors arrive as `{"message": "..."}`, some older routes still
    /// use `{"error": "..."}`.
    fn extract_message(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
            .map(str::to_string)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message =
            Self::extract_message(body).unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            code => ApiError::Backend {
                status: code,
                message,
            },
        }
    }

    /// True for 401 responses
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_backend_message() {
        let error = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"success": false, "message": "Email already registered"}"#,
        );
        match error {
            ApiError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Email already registered");
            }
            other => panic!("Expected Backend error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_status_401_is_unauthorized() {
        let error = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"message": "Invalid credentials"}"#,
        );
        assert!(error.is_unauthorized());
        assert_eq!(error.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_from_status_falls_back_on_unparseable_body() {
        let error = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(error.to_string(), "Request failed");
    }

    #[test]
    fn test_from_status_reads_legacy_error_key() {
        let error = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error": "Missing seats"}"#);
        assert_eq!(error.to_string(), "Missing seats");
    }

    #[test]
    fn test_from_status_ignores_non_string_message() {
        let error = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message": {"code": 7}}"#);
        assert_eq!(error.to_string(), "Request failed");
    }
}
