use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Validation errors")]
    Validation { details: BTreeMap<String, String> },

    #[error("Session expired - please sign in again")]
    SessionExpired,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid dragging excessive data into logs
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Field-level messages for display next to form inputs.
    pub fn field_details(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ApiError::Validation { details } => Some(details),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body() {
        assert_eq!(ApiError::truncate_body("short"), "short");

        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.contains("600 total bytes"));
    }

    #[test]
    fn test_field_details() {
        let mut details = BTreeMap::new();
        details.insert("name".to_string(), "name is required".to_string());
        let err = ApiError::Validation { details };
        assert_eq!(
            err.field_details().and_then(|d| d.get("name")).map(String::as_str),
            Some("name is required")
        );

        let err = ApiError::SessionExpired;
        assert!(err.field_details().is_none());
    }
}
