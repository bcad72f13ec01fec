//! Error taxonomy for Covenant.
//!
//! Two error types live here:
//! - [`RpcError`]: a coded, per-call failure that always ends up in a response.
//! - [`SchemaError`]: a boot-time failure (contract construction, type check,
//!   converter registration, configuration). Never produced while serving.
//!
//! Numeric codes follow JSON-RPC 2.0 where a standard code exists and must
//! remain stable across releases.

use std::fmt;

use serde_json::Value;

/// Result alias for per-call operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Result alias for boot-time operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Stable error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Request bytes could not be decoded. Never reaches the validator.
    ParseError,
    /// Bytes decoded, but the envelope is not a valid request.
    InvalidRequest,
    /// Interface or function not present in the contract.
    MethodNotFound,
    /// An inbound argument failed validation.
    InvalidParams,
    /// A handler result failed validation. Always a server-side defect.
    InvalidResponse,
    /// Contract construction failure.
    SchemaError,
    /// Unexpected failure, passed through unchanged.
    InternalError,
    /// Application-defined failure raised by a handler.
    Application(i64),
}

impl ErrorKind {
    pub fn code(&self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::InvalidResponse => -32001,
            Self::SchemaError => -32010,
            Self::Application(code) => *code,
        }
    }

    /// Map a wire code back to a kind. Unknown codes are application codes.
    pub fn from_code(code: i64) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32001 => Self::InvalidResponse,
            -32010 => Self::SchemaError,
            other => Self::Application(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "PARSE_ERROR",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::MethodNotFound => "METHOD_NOT_FOUND",
            Self::InvalidParams => "INVALID_PARAMS",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::SchemaError => "SCHEMA_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Application(_) => "APPLICATION_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application(code) => write!(f, "APPLICATION_ERROR({code})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A coded RPC failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RpcError {
    pub kind: ErrorKind,
    pub message: String,
    /// Optional structured payload (application errors, diagnostics).
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotFound, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParams, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidResponse, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    pub fn application(code: i64, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Application(code), message)
    }

    pub fn code(&self) -> i64 {
        self.kind.code()
    }
}

impl From<SchemaError> for RpcError {
    fn from(e: SchemaError) -> Self {
        RpcError::new(ErrorKind::SchemaError, e.to_string())
    }
}

/// Boot-time failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed schema entry {entry}: {reason}")]
    MalformedEntry { entry: String, reason: String },

    #[error("duplicate {namespace} name: {name}")]
    DuplicateName { namespace: &'static str, name: String },

    #[error("duplicate value '{value}' in enum {name}")]
    DuplicateEnumValue { name: String, value: String },

    #[error("duplicate function '{function}' in interface {interface}")]
    DuplicateFunction { interface: String, function: String },

    #[error("struct {name} extends unknown struct {parent}")]
    UnknownParent { name: String, parent: String },

    #[error("cyclic inheritance: {}", chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    #[error("struct {name} declares field '{field}' already defined by {defined_in}")]
    DuplicateField {
        name: String,
        field: String,
        defined_in: String,
    },

    #[error("{location} references unknown type '{type_name}'")]
    UnknownType { location: String, type_name: String },

    #[error("{location} nests {depth} array levels (limit {limit})")]
    ArrayTooDeep {
        location: String,
        depth: usize,
        limit: usize,
    },

    #[error("type converter already registered for kind: {0}")]
    DuplicateConverter(String),

    #[error("schema payload too large ({size} bytes > limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("failed to decode schema: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchemaError {
    pub fn malformed(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            entry: entry.into(),
            reason: reason.into(),
        }
    }
}
