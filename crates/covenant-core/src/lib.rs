//! covenant-core
//!
//! Core runtime for Covenant IDL contracts:
//! - Contract model (interfaces, functions, structs with single inheritance, enums)
//! - Pluggable primitive type converters
//! - Recursive, path-reporting value validation for requests and responses
//! - Method dispatch (resolve, validate, invoke, validate)
//! - JSON wire codec with stable error codes

pub mod codec;
pub mod config;
pub mod contract;
pub mod convert;
pub mod errors;
pub mod model;
pub mod validate;
pub mod value;

pub use crate::errors::{ErrorKind, RpcError, RpcResult, SchemaError, SchemaResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::codec::{Codec, Decoded, Incoming, JsonCodec, Outgoing, RpcRequest, RpcResponse};
    pub use crate::config::{validate_config, CoreConfig, LimitsConfig};
    pub use crate::contract::{Contract, TypeRef};
    pub use crate::convert::{ConverterRegistry, TypeConverter};
    pub use crate::model::{EnumDef, Field, Function, Interface, Param, StructDef, TypeSpec};
    pub use crate::validate::{Direction, Validator};
    pub use crate::{ErrorKind, RpcError, RpcResult, SchemaError, SchemaResult};
}
