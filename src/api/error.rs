use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid username or password")]
    AuthRejected,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data. The cut
    /// backs up to a char boundary so multibyte text (currency symbols in
    /// backend error detail) never splits mid-character.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::AuthRejected,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn short_body_passes_through_untruncated() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "no such item");
        assert_eq!(err.to_string(), "Resource not found: no such item");
    }

    #[test]
    fn multibyte_body_truncates_on_char_boundary() {
        // 200 rupee signs, 3 bytes each: byte 500 falls inside a char
        let body = "\u{20B9}".repeat(200);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);

        let message = err.to_string();
        assert!(message.contains("truncated, 600 total bytes"));
        // 498 is the nearest boundary below the limit: 166 whole chars
        assert_eq!(message.matches('\u{20B9}').count(), 166);
    }

    #[test]
    fn ascii_body_truncates_at_the_limit() {
        let body = "x".repeat(700);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);

        let message = err.to_string();
        assert!(message.contains("truncated, 700 total bytes"));
        assert_eq!(message.matches('x').count(), MAX_ERROR_BODY_LENGTH);
    }

    #[test]
    fn unauthorized_maps_without_leaking_body() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "detail goes here");
        assert!(matches!(err, ApiError::AuthRejected));
    }
}
