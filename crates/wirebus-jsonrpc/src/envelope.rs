//! JSON-RPC 2.0 envelope shapes.
//!
//! Encode and decode sides use separate structs: the decode side keeps
//! `params`/`result` as undecoded [`RawValue`] so the payload can be handed
//! to the core `Data` container without an intermediate decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::value::RawValue;

/// Outgoing request envelope.
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a> {
    pub jsonrpc: &'a str,
    pub id: Value,
    pub method: &'a str,
    pub params: Value,
}

/// Incoming request envelope, params left undecoded.
#[derive(Debug, Deserialize)]
pub struct IncomingRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub method: String,
    pub params: Option<Box<RawValue>>,
}

/// Incoming response envelope, result left undecoded.
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub result: Option<Box<RawValue>>,
    pub error: Option<ErrorObject>,
}

/// Outgoing success envelope.
#[derive(Debug, Serialize)]
pub struct ResultResponse<'a> {
    pub jsonrpc: &'a str,
    pub id: Value,
    pub result: Value,
}

/// Outgoing error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponseEnvelope<'a> {
    pub jsonrpc: &'a str,
    pub id: Value,
    pub error: ErrorObject,
}

/// The `error` member of a response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
