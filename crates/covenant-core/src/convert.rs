//! Primitive type converters.
//!
//! A converter checks (and normalizes) a decoded value against one primitive
//! kind. Every converter is used in both directions:
//! - `from_request`: inbound arguments, failures are `INVALID_PARAMS`
//! - `to_response`: outbound results, failures are `INVALID_RESPONSE`
//!
//! Both directions share the single [`TypeConverter::convert`] check, so they
//! accept and reject exactly the same values.
//!
//! The registry is populated once at boot (built-ins plus any custom kinds) and
//! then shared read-only.

use std::collections::BTreeMap;

use serde_json::{Number, Value};

use crate::errors::{RpcError, RpcResult, SchemaError, SchemaResult};
use crate::value::kind_name;

/// Built-in primitive kind names.
pub mod kinds {
    pub const STRING: &str = "string";
    pub const INT: &str = "int";
    pub const FLOAT: &str = "float";
    pub const BOOL: &str = "bool";
}

/// A validator for one primitive kind.
pub trait TypeConverter: Send + Sync {
    /// Kind name as used in schemas (e.g. `"string"`).
    fn kind(&self) -> &str;

    /// Check a non-null value; return the normalized value or a mismatch
    /// message that names the observed kind.
    fn convert(&self, value: &Value) -> Result<Value, String>;

    fn from_request(&self, value: &Value) -> RpcResult<Value> {
        self.convert(value).map_err(RpcError::invalid_params)
    }

    fn to_response(&self, value: &Value) -> RpcResult<Value> {
        self.convert(value).map_err(RpcError::invalid_response)
    }
}

fn mismatch(expected: &str, got: &Value) -> String {
    format!("expected {expected}, got {}", kind_name(got))
}

/// Accepts JSON strings only.
pub struct StringConverter;

impl TypeConverter for StringConverter {
    fn kind(&self) -> &str {
        kinds::STRING
    }

    fn convert(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(mismatch(kinds::STRING, other)),
        }
    }
}

/// Accepts integers, and floats with no fractional part (normalized to integers).
pub struct IntConverter;

impl TypeConverter for IntConverter {
    fn kind(&self) -> &str {
        kinds::INT
    }

    fn convert(&self, value: &Value) -> Result<Value, String> {
        let n = match value {
            Value::Number(n) => n,
            other => return Err(mismatch(kinds::INT, other)),
        };
        if n.is_i64() || n.is_u64() {
            return Ok(value.clone());
        }
        match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Ok(Value::Number(Number::from(f as i64)))
            }
            _ => Err(format!("expected int, got non-integral number {n}")),
        }
    }
}

/// Accepts any JSON number, normalized to a float.
pub struct FloatConverter;

impl TypeConverter for FloatConverter {
    fn kind(&self) -> &str {
        kinds::FLOAT
    }

    fn convert(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("expected float, got unrepresentable number {n}")),
            other => Err(mismatch(kinds::FLOAT, other)),
        }
    }
}

/// Accepts JSON booleans only.
pub struct BoolConverter;

impl TypeConverter for BoolConverter {
    fn kind(&self) -> &str {
        kinds::BOOL
    }

    fn convert(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            other => Err(mismatch(kinds::BOOL, other)),
        }
    }
}

/// Registry of converters keyed by kind name.
pub struct ConverterRegistry {
    converters: BTreeMap<String, Box<dyn TypeConverter>>,
}

impl ConverterRegistry {
    /// Create an empty registry (no kinds, not even built-ins).
    pub fn empty() -> Self {
        Self {
            converters: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in `string`, `int`, `float` and `bool` kinds.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        let builtins: [Box<dyn TypeConverter>; 4] = [
            Box::new(StringConverter),
            Box::new(IntConverter),
            Box::new(FloatConverter),
            Box::new(BoolConverter),
        ];
        for c in builtins {
            reg.converters.insert(c.kind().to_string(), c);
        }
        reg
    }

    /// Register a custom kind. Kind names are unique.
    pub fn register(&mut self, converter: Box<dyn TypeConverter>) -> SchemaResult<()> {
        let kind = converter.kind().to_string();
        if self.converters.contains_key(&kind) {
            return Err(SchemaError::DuplicateConverter(kind));
        }
        self.converters.insert(kind, converter);
        Ok(())
    }

    pub fn get(&self, kind: &str) -> Option<&dyn TypeConverter> {
        self.converters.get(kind).map(|c| c.as_ref())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.converters.contains_key(kind)
    }

    /// Kind names in deterministic order.
    pub fn kinds(&self) -> Vec<String> {
        self.converters.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
