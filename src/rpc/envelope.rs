//! JSON-RPC 2.0 envelope types.

use serde::Serialize;
use serde_json::Value;

use crate::error::{codes, PilotError};

pub const PROTOCOL_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Error member of a response envelope: stable numeric code, message, and
/// optional structured data (typically the operation's trace).
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(codes::PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, message)
    }

    pub fn method_not_found() -> Self {
        Self::new(codes::METHOD_NOT_FOUND, "Method not found")
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, message)
    }
}

impl From<PilotError> for RpcError {
    fn from(err: PilotError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let data = err
            .into_data()
            .filter(|data| !data.is_empty())
            .and_then(|data| serde_json::to_value(data).ok());
        Self {
            code,
            message,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_envelope_shape() {
        let response = Response::result(json!(1), json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "id": 1, "result": {"ok": true}})
        );
    }

    #[test]
    fn test_error_envelope_omits_empty_data() {
        let err = RpcError::from(PilotError::scope_not_found());
        assert_eq!(err.code, 1000);
        assert!(err.data.is_none());
    }

    #[test]
    fn test_domain_error_data_carries_attempts() {
        let err = RpcError::from(PilotError::element_not_found(vec![
            crate::models::MatchAttempt {
                rung_index: 0,
                kind: crate::models::RungKind::Attr,
                matched_count: 0,
                duration_ms: 2,
                ok: false,
                error: None,
            },
        ]));
        let data = err.data.unwrap();
        assert_eq!(data["match_attempts"][0]["rung_index"], json!(0));
    }
}
