use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {message}")]
    ServerError { status: StatusCode, message: String },

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for backend-supplied text in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pull a human-readable message out of an error body.
    ///
    /// Tries `message` (string, or array of strings as sent by validation
    /// pipes), then `error`, then falls back to the status reason phrase.
    fn extract_message(status: StatusCode, body: &str) -> String {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
            match map.get("message") {
                Some(Value::String(s)) if !s.trim().is_empty() => return Self::truncate_body(s),
                Some(Value::Array(items)) => {
                    let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                    if !parts.is_empty() {
                        return Self::truncate_body(&parts.join(", "));
                    }
                }
                _ => {}
            }
            if let Some(Value::String(s)) = map.get("error") {
                if !s.trim().is_empty() {
                    return Self::truncate_body(s);
                }
            }
        }

        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::extract_message(status, body);
        match status.as_u16() {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError { status, message },
            _ => ApiError::Rejected { status, message },
        }
    }

    /// The text to show a user: the backend's own message when it sent one.
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(m)
            | ApiError::AccessDenied(m)
            | ApiError::NotFound(m)
            | ApiError::ServerError { message: m, .. }
            | ApiError::Rejected { message: m, .. } => m.clone(),
            ApiError::RateLimited => "Server is busy. Please wait a moment and try again.".to_string(),
            ApiError::Network(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Network(e) if e.is_connect() => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::Network(e) => format!("Network error: {}", e),
            ApiError::InvalidResponse(m) => format!("Invalid response: {}", m),
        }
    }

    /// HTTP status of the failed call, if the backend answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ApiError::AccessDenied(_) => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ApiError::RateLimited => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::ServerError { status, .. } | ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            ApiError::InvalidResponse(_) => None,
        }
    }

    /// True when the backend refused the credentials themselves (401/403),
    /// as opposed to being unreachable or broken.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::AccessDenied(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_string_field() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid credentials","statusCode":401}"#,
        );
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.message(), "Invalid credentials");
        assert!(err.is_credential_rejection());
    }

    #[test]
    fn test_message_array_field_is_joined() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":["email must be an email","password too short"],"error":"Bad Request"}"#,
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.message(), "email must be an email, password too short");
        assert!(!err.is_credential_rejection());
    }

    #[test]
    fn test_falls_back_to_error_field() {
        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"error":"Email already in use"}"#);
        assert_eq!(err.message(), "Email already in use");
    }

    #[test]
    fn test_falls_back_to_reason_phrase() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.message(), "Unauthorized");

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(matches!(err, ApiError::ServerError { .. }));
        assert_eq!(err.message(), "Bad Gateway");

        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message":"   "}"#);
        assert_eq!(err.message(), "Unauthorized");
    }

    #[test]
    fn test_rate_limited() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "{}");
        assert!(matches!(err, ApiError::RateLimited));
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn test_server_error_keeps_status() {
        let err = ApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(matches!(err, ApiError::ServerError { .. }));
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(err.message(), "Service Unavailable");
        assert!(!err.is_credential_rejection());
    }

    #[test]
    fn test_truncate_long_message() {
        let long = "é".repeat(400);
        let body = serde_json::json!({ "message": long }).to_string();
        let err = ApiError::from_status(StatusCode::FORBIDDEN, &body);
        let message = err.message();
        assert!(message.contains("truncated, 800 total bytes"));
        assert!(message.len() < 600);
    }
}
