//! Covenant contract models.
//!
//! This module defines the strongly-typed Rust representations of the entities
//! declared by an IDL document:
//! - [`TypeSpec`]: the declared type of a field, parameter or return value
//! - [`EnumDef`]: a named set of permitted string values
//! - [`StructDef`]: a named field set with optional single-parent inheritance
//! - [`Interface`] / [`Function`]: the callable catalog
//!
//! Models are built from decoded schema entries (`serde_json::Value` objects)
//! and are immutable once the owning [`crate::contract::Contract`] is
//! constructed. Cross-entity references (struct parents, user-defined type
//! names) are resolved by the contract, not here.

use serde_json::{Map, Value};

use crate::errors::{SchemaError, SchemaResult};

pub mod enums;
pub mod interface;
pub mod structs;
pub mod types;

pub use enums::EnumDef;
pub use interface::{Function, Interface, Param};
pub use structs::{Field, StructDef};
pub use types::TypeSpec;

/// A decoded schema entry viewed as a JSON object.
pub(crate) type Entry = Map<String, Value>;

/// Read a required, non-empty string key from an entry.
pub(crate) fn required_str<'a>(obj: &'a Entry, key: &str, ctx: &str) -> SchemaResult<&'a str> {
    let s = obj
        .get(key)
        .ok_or_else(|| SchemaError::malformed(ctx, format!("missing '{key}'")))?
        .as_str()
        .ok_or_else(|| SchemaError::malformed(ctx, format!("'{key}' must be a string")))?;
    if s.trim().is_empty() {
        return Err(SchemaError::malformed(ctx, format!("'{key}' must not be empty")));
    }
    Ok(s)
}

/// Read an optional array key. Absent and `null` both yield an empty slice.
pub(crate) fn optional_array<'a>(obj: &'a Entry, key: &str, ctx: &str) -> SchemaResult<&'a [Value]> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(SchemaError::malformed(ctx, format!("'{key}' must be an array"))),
    }
}

/// View a value as an entry object.
pub(crate) fn as_entry<'a>(v: &'a Value, ctx: &str) -> SchemaResult<&'a Entry> {
    v.as_object()
        .ok_or_else(|| SchemaError::malformed(ctx, "expected an object"))
}
