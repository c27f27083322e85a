//! The uniform response envelope used by every service endpoint.
//!
//! Every JSON body has the shape `{status, data?, errors?}`. The `errors`
//! field is normally a single object, but the register endpoint answers
//! with an array of them; the decoder accepts both shapes.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::ApiError;

/// Error message the server uses to flag per-field validation failures.
pub const VALIDATION_MESSAGE: &str = "validation errors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
}

/// `{code, message, details?}` as sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

/// `errors` is an object everywhere except registration, where the server
/// sends an array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorField {
    One(ErrorBody),
    Many(Vec<ErrorBody>),
}

impl ErrorField {
    /// The primary error, regardless of wire shape.
    pub fn first(&self) -> Option<&ErrorBody> {
        match self {
            ErrorField::One(body) => Some(body),
            ErrorField::Many(bodies) => bodies.first(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorField>,
}

impl Envelope {
    /// Decode the `data` payload into a typed value.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let data = self
            .data
            .clone()
            .ok_or_else(|| ApiError::InvalidResponse("missing data payload".to_string()))?;
        serde_json::from_value(data)
            .map_err(|e| ApiError::InvalidResponse(format!("malformed data payload: {}", e)))
    }

    /// The primary error message, if the envelope carries one.
    pub fn error_message(&self) -> Option<&str> {
        self.errors
            .as_ref()
            .and_then(|e| e.first())
            .map(|b| b.message.as_str())
    }

    /// Per-field validation details when `errors.message` is the
    /// validation marker.
    pub fn validation_details(&self) -> Option<BTreeMap<String, String>> {
        let body = self.errors.as_ref().and_then(|e| e.first())?;
        if body.message != VALIDATION_MESSAGE {
            return None;
        }
        Some(body.details.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_envelope() {
        let json = r#"{"status":"success","data":{"warehouse":[{"id":1,"name":"Main","address":"Jl. Sudirman 1"}]}}"#;
        let env: Envelope = serde_json::from_str(json).expect("parse envelope");
        assert_eq!(env.status, ResponseStatus::Success);
        assert!(env.errors.is_none());

        #[derive(Deserialize)]
        struct Payload {
            warehouse: Vec<serde_json::Value>,
        }
        let payload: Payload = env.decode_data().expect("decode data");
        assert_eq!(payload.warehouse.len(), 1);
    }

    #[test]
    fn test_parse_fail_envelope_with_details() {
        let json = r#"{"status":"fail","errors":{"code":400,"message":"validation errors","details":{"name":"name is required"}}}"#;
        let env: Envelope = serde_json::from_str(json).expect("parse envelope");
        assert_eq!(env.status, ResponseStatus::Fail);
        assert_eq!(env.error_message(), Some("validation errors"));

        let details = env.validation_details().expect("validation details");
        assert_eq!(details.get("name").map(String::as_str), Some("name is required"));
    }

    #[test]
    fn test_parse_errors_as_array() {
        // Registration failures arrive as an array of error objects
        let json = r#"{"status":"fail","errors":[{"code":409,"message":"email already taken"}]}"#;
        let env: Envelope = serde_json::from_str(json).expect("parse envelope");
        assert_eq!(env.error_message(), Some("email already taken"));
        assert!(env.validation_details().is_none());
    }

    #[test]
    fn test_non_validation_error_has_no_details() {
        let json = r#"{"status":"fail","errors":{"code":404,"message":"warehouse not found"}}"#;
        let env: Envelope = serde_json::from_str(json).expect("parse envelope");
        assert!(env.validation_details().is_none());
        assert_eq!(env.error_message(), Some("warehouse not found"));
    }

    #[test]
    fn test_decode_data_missing() {
        let json = r#"{"status":"success"}"#;
        let env: Envelope = serde_json::from_str(json).expect("parse envelope");
        let result: Result<serde_json::Value, _> = env.decode_data();
        assert!(result.is_err());
    }
}
