use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RESPONSE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// Stable error codes surfaced to callers
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    DuplicateIdentifier,
    InvalidCatalog,
    InvalidConfig,
    Internal,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// One JSON document per command: `status` plus either `data` or `error`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Response {
    pub schema_version: u32,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(default)]
    pub data: Value,
}

impl Response {
    pub fn ok<T: Serialize>(data: &T) -> Result<Self> {
        Ok(Self {
            schema_version: RESPONSE_SCHEMA_VERSION,
            status: ResponseStatus::Ok,
            error: None,
            data: serde_json::to_value(data)?,
        })
    }

    pub fn error(error: ErrorEnvelope) -> Self {
        Self {
            schema_version: RESPONSE_SCHEMA_VERSION,
            status: ResponseStatus::Error,
            error: Some(error),
            data: Value::Null,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, ResponseStatus::Error)
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn ok_response_is_flat() {
        let response = Response::ok(&json!({ "matched": 1, "selected_ids": ["a"] })).unwrap();
        let value: Value = serde_json::from_str(&serialize_json(&response).unwrap()).unwrap();

        assert_eq!(value["status"], "ok");
        assert_eq!(value["data"]["matched"], 1);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn error_response_carries_code_and_hint() {
        let response = Response::error(
            ErrorEnvelope::new(ErrorCode::NotFound, "Descriptor not found: x")
                .with_hint("run `list` to see known ids"),
        );
        assert!(response.is_error());

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["code"], "not_found");
        assert_eq!(value["error"]["hint"], "run `list` to see known ids");
        assert_eq!(value["data"], Value::Null);
    }
}
