//! Enum definitions.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::errors::{SchemaError, SchemaResult};
use crate::model::{as_entry, optional_array, required_str, Entry};

/// A named set of permitted string values, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    values: Vec<String>,
}

impl EnumDef {
    /// Build an enum from explicit values. Duplicates are rejected.
    pub fn new(name: impl Into<String>, values: Vec<String>) -> SchemaResult<Self> {
        let name = name.into();
        let mut seen = BTreeSet::new();
        for v in &values {
            if !seen.insert(v.as_str()) {
                return Err(SchemaError::DuplicateEnumValue {
                    name,
                    value: v.clone(),
                });
            }
        }
        Ok(Self { name, values })
    }

    /// Build an enum from a decoded `{"type":"enum", ...}` entry.
    ///
    /// `values` items may be plain strings or `{"value": "..."}` objects.
    pub fn from_entry(obj: &Entry) -> SchemaResult<Self> {
        let name = required_str(obj, "name", "enum")?;
        let ctx = format!("enum {name}");

        let mut values = Vec::new();
        for (idx, item) in optional_array(obj, "values", &ctx)?.iter().enumerate() {
            let value = match item {
                Value::String(s) => s.clone(),
                other => {
                    let item_ctx = format!("{ctx} values[{idx}]");
                    required_str(as_entry(other, &item_ctx)?, "value", &item_ctx)?.to_string()
                }
            };
            values.push(value);
        }

        Self::new(name, values)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
