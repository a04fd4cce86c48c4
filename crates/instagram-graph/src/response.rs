//! Decoded response helpers
//!
//! Response bodies are open-ended JSON. Only the error envelope and a few
//! token fields are ever read by name; everything else is left to the caller.

use serde_json::{Map, Value};

use crate::constants::TOKEN_EXPIRED_CODE;
use crate::error::{Error, Result};

/// Decoded body of a successful authorization-code exchange.
///
/// The schema is provider-defined, so the full object is kept and the
/// well-known fields are exposed through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResponse(Map<String, Value>);

impl TokenResponse {
    pub(crate) fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.0.get("access_token").and_then(Value::as_str)
    }

    /// Instagram returns the user id as a number on some endpoints and as a
    /// string on others.
    pub fn user_id(&self) -> Option<String> {
        match self.0.get("user_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Seconds until the token expires, when the endpoint reports it.
    pub fn expires_in(&self) -> Option<u64> {
        self.0.get("expires_in").and_then(Value::as_u64)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// API-level failure carried inside a decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: i64,
    pub error_type: Option<String>,
    pub message: String,
    pub subcode: Option<i64>,
    pub trace_id: Option<String>,
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api {
            code: err.code,
            error_type: err.error_type,
            message: err.message,
        }
    }
}

/// Extract an API error from a decoded body.
///
/// Reads the Graph envelope `{"error": {"code", "type", "message", ...}}` and
/// the flat OAuth form `{"code", "error_type", "error_message"}` returned by
/// the authorization endpoints.
pub fn api_error(response: &Value) -> Option<ApiError> {
    if let Some(error) = response.get("error").filter(|e| e.is_object()) {
        return Some(ApiError {
            code: error.get("code").and_then(as_code).unwrap_or_default(),
            error_type: string_field(error, "type"),
            message: string_field(error, "message").unwrap_or_default(),
            subcode: error.get("error_subcode").and_then(as_code),
            trace_id: string_field(error, "fbtrace_id"),
        });
    }

    let error_type = string_field(response, "error_type")?;
    Some(ApiError {
        code: response.get("code").and_then(as_code).unwrap_or_default(),
        error_type: Some(error_type),
        message: string_field(response, "error_message").unwrap_or_default(),
        subcode: None,
        trace_id: None,
    })
}

/// Whether a decoded body reports an expired access token (`error.code` 190).
pub fn is_token_expired_error(response: &Value) -> bool {
    response
        .get("error")
        .and_then(|error| error.get("code"))
        .and_then(as_code)
        == Some(TOKEN_EXPIRED_CODE)
}

/// Promote an error payload to `Error::Api`, passing other bodies through.
pub fn check_api_error(response: Value) -> Result<Value> {
    match api_error(&response) {
        Some(err) => Err(err.into()),
        None => Ok(response),
    }
}

/// Error codes arrive as numbers, occasionally as numeric strings.
fn as_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}
