//! Wire codec for schemas, requests and responses.
//!
//! The runtime only ever sees decoded [`Value`]s; the codec owns the bytes.
//! [`JsonCodec`] speaks a JSON-RPC 2.0 style envelope:
//!
//! - request: `{"jsonrpc":"2.0","method":"Iface.func","params":[...],"id":1}`
//! - batch: a non-empty array of requests
//! - success: `{"jsonrpc":"2.0","id":1,"result":...}`
//! - failure: `{"jsonrpc":"2.0","id":1,"error":{"code":..,"message":..}}`
//!
//! Undecodable bytes are `PARSE_ERROR`. Decodable JSON with a bad envelope is
//! `INVALID_REQUEST`. Inside a batch, a bad element is rejected on its own and
//! the remaining elements are still served.

use serde_json::{json, Map, Value};

use crate::config::LimitsConfig;
use crate::errors::{RpcError, RpcResult, SchemaError, SchemaResult};

const JSONRPC_VERSION: &str = "2.0";

/// A well-formed call.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    /// `interface.function`.
    pub method: String,
    pub params: Vec<Value>,
    /// Echoed back verbatim. `null` when the caller sent none.
    pub id: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: Value) -> Self {
        Self {
            method: method.into(),
            params,
            id,
        }
    }

    /// Split `method` into `(interface, function)` at the last `.`.
    pub fn split_method(&self) -> Option<(&str, &str)> {
        match self.method.rsplit_once('.') {
            Some((i, f)) if !i.is_empty() && !f.is_empty() => Some((i, f)),
            _ => None,
        }
    }
}

/// Outcome of one call, keyed by the request id.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    pub id: Value,
    pub outcome: Result<Value, RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            outcome: Ok(result),
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            id,
            outcome: Err(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Envelope form of this response.
    pub fn to_value(&self) -> Value {
        match &self.outcome {
            Ok(result) => json!({
                "jsonrpc": JSONRPC_VERSION,
                "id": self.id,
                "result": result,
            }),
            Err(e) => {
                let mut error = Map::new();
                error.insert("code".into(), json!(e.code()));
                error.insert("message".into(), json!(e.message));
                if let Some(data) = &e.data {
                    error.insert("data".into(), data.clone());
                }
                json!({
                    "jsonrpc": JSONRPC_VERSION,
                    "id": self.id,
                    "error": error,
                })
            }
        }
    }
}

/// One element of an inbound payload after envelope checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Request(RpcRequest),
    /// The element was rejected; the response is ready to send.
    Rejected(RpcResponse),
}

/// A decoded inbound payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Single(Decoded),
    Batch(Vec<Decoded>),
}

/// An outbound payload, mirroring the shape of the [`Incoming`] it answers.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Single(RpcResponse),
    Batch(Vec<RpcResponse>),
}

impl Outgoing {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Single(r) => r.to_value(),
            Self::Batch(rs) => Value::Array(rs.iter().map(RpcResponse::to_value).collect()),
        }
    }
}

/// Byte-level boundary of the runtime.
pub trait Codec: Send + Sync {
    /// Decode a schema document into its list of entries.
    fn decode_schema(&self, bytes: &[u8]) -> SchemaResult<Vec<Value>>;

    /// Decode a request payload.
    ///
    /// `Err` rejects the whole payload; element-level problems inside a
    /// batch come back as [`Decoded::Rejected`].
    fn decode_request(&self, bytes: &[u8]) -> RpcResult<Incoming>;

    fn encode_response(&self, response: &Outgoing) -> Vec<u8>;
}

/// JSON implementation of [`Codec`].
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    limits: LimitsConfig,
}

impl JsonCodec {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }
}

impl Codec for JsonCodec {
    fn decode_schema(&self, bytes: &[u8]) -> SchemaResult<Vec<Value>> {
        if bytes.len() > self.limits.max_schema_bytes {
            return Err(SchemaError::TooLarge {
                size: bytes.len(),
                limit: self.limits.max_schema_bytes,
            });
        }
        let doc: Value =
            serde_json::from_slice(bytes).map_err(|e| SchemaError::Decode(e.to_string()))?;
        match doc {
            Value::Array(entries) => Ok(entries),
            _ => Err(SchemaError::Decode(
                "schema document must be an array of entries".into(),
            )),
        }
    }

    fn decode_request(&self, bytes: &[u8]) -> RpcResult<Incoming> {
        if bytes.len() > self.limits.max_request_bytes {
            return Err(RpcError::invalid_request(format!(
                "request too large ({} bytes > limit {})",
                bytes.len(),
                self.limits.max_request_bytes
            )));
        }

        let doc: Value =
            serde_json::from_slice(bytes).map_err(|e| RpcError::parse_error(e.to_string()))?;

        match doc {
            Value::Array(items) if items.is_empty() => {
                Err(RpcError::invalid_request("empty batch"))
            }
            Value::Array(items) => Ok(Incoming::Batch(items.into_iter().map(decode_one).collect())),
            other => Ok(Incoming::Single(decode_one(other))),
        }
    }

    fn encode_response(&self, response: &Outgoing) -> Vec<u8> {
        response.to_value().to_string().into_bytes()
    }
}

fn decode_one(v: Value) -> Decoded {
    let mut obj = match v {
        Value::Object(obj) => obj,
        _ => {
            return Decoded::Rejected(RpcResponse::failure(
                Value::Null,
                RpcError::invalid_request("request must be an object"),
            ))
        }
    };

    let id = obj.remove("id").unwrap_or(Value::Null);
    match envelope(obj, &id) {
        Ok((method, params)) => Decoded::Request(RpcRequest { method, params, id }),
        Err(e) => {
            // An unusable id cannot be echoed back.
            let id = if valid_id(&id) { id } else { Value::Null };
            Decoded::Rejected(RpcResponse::failure(id, e))
        }
    }
}

fn envelope(mut obj: Map<String, Value>, id: &Value) -> RpcResult<(String, Vec<Value>)> {
    match obj.get("jsonrpc") {
        None => {}
        Some(Value::String(v)) if v == JSONRPC_VERSION => {}
        Some(_) => return Err(RpcError::invalid_request("unsupported jsonrpc version")),
    }

    if !valid_id(id) {
        return Err(RpcError::invalid_request(
            "id must be a string, a number or null",
        ));
    }

    let method = match obj.remove("method") {
        Some(Value::String(m)) => m,
        Some(_) => return Err(RpcError::invalid_request("method must be a string")),
        None => return Err(RpcError::invalid_request("missing method")),
    };
    match method.rsplit_once('.') {
        Some((i, f)) if !i.is_empty() && !f.is_empty() => {}
        _ => {
            return Err(RpcError::invalid_request(format!(
                "method '{method}' is not of the form interface.function"
            )))
        }
    }

    let params = match obj.remove("params") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(p)) => p,
        Some(_) => return Err(RpcError::invalid_request("params must be an array")),
    };

    Ok((method, params))
}

fn valid_id(id: &Value) -> bool {
    matches!(id, Value::Null | Value::Number(_) | Value::String(_))
}
