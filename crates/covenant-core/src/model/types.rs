//! Declared types.

use std::fmt;

use serde_json::Value;

use crate::errors::{SchemaError, SchemaResult};
use crate::model::Entry;

/// Prefix marking one array level in a type name (`[]int`, `[][]Book`).
pub const ARRAY_PREFIX: &str = "[]";

/// The declared type of a field, parameter, or return value.
///
/// `type_name` is either a primitive kind (`string`, `int`, `float`, `bool`,
/// or a custom kind registered at boot) or the name of a struct or enum in
/// the same contract. `array_depth` counts nested sequence levels around the
/// base type; `0` means scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSpec {
    pub type_name: String,
    pub optional: bool,
    pub array_depth: usize,
}

impl TypeSpec {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            optional: false,
            array_depth: 0,
        }
    }

    /// Mark the type as nullable.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Wrap the base type in `depth` sequence levels.
    pub fn array(mut self, depth: usize) -> Self {
        self.array_depth = depth;
        self
    }

    pub fn is_array(&self) -> bool {
        self.array_depth > 0
    }

    /// The element type of an array type: same base and optionality, one
    /// level shallower. Scalars return themselves.
    pub fn element(&self) -> TypeSpec {
        TypeSpec {
            type_name: self.type_name.clone(),
            optional: self.optional,
            array_depth: self.array_depth.saturating_sub(1),
        }
    }

    /// Build a type from a decoded field/param/returns object.
    ///
    /// Recognized keys:
    /// - `type` (required): base name, optionally prefixed by `[]` per level
    /// - `optional` (bool, default false)
    /// - `is_array` (bool): adds one level
    /// - `array_depth` (unsigned int): explicit depth, added to prefix levels
    pub fn from_entry(obj: &Entry, ctx: &str) -> SchemaResult<Self> {
        let raw = crate::model::required_str(obj, "type", ctx)?;

        let mut name = raw;
        let mut depth = 0usize;
        while let Some(rest) = name.strip_prefix(ARRAY_PREFIX) {
            name = rest;
            depth += 1;
        }
        if name.trim().is_empty() {
            return Err(SchemaError::malformed(ctx, format!("invalid type name '{raw}'")));
        }

        let optional = read_bool(obj, "optional", ctx)?;
        if read_bool(obj, "is_array", ctx)? {
            depth += 1;
        }
        match obj.get("array_depth") {
            None | Some(Value::Null) => {}
            Some(v) => {
                let n = v.as_u64().ok_or_else(|| {
                    SchemaError::malformed(ctx, "'array_depth' must be a non-negative integer")
                })?;
                depth = usize::try_from(n)
                    .ok()
                    .and_then(|n| depth.checked_add(n))
                    .ok_or_else(|| SchemaError::malformed(ctx, "array depth out of range"))?;
            }
        }

        Ok(Self {
            type_name: name.to_string(),
            optional,
            array_depth: depth,
        })
    }
}

fn read_bool(obj: &Entry, key: &str, ctx: &str) -> SchemaResult<bool> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(SchemaError::malformed(ctx, format!("'{key}' must be a boolean"))),
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.array_depth {
            f.write_str(ARRAY_PREFIX)?;
        }
        f.write_str(&self.type_name)?;
        if self.optional {
            f.write_str(" [optional]")?;
        }
        Ok(())
    }
}
