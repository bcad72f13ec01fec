//! Interfaces and functions.

use std::collections::BTreeMap;

use crate::errors::{SchemaError, SchemaResult};
use crate::model::{as_entry, optional_array, required_str, Entry, TypeSpec};

/// A function parameter. Names are informational; arguments are positional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub spec: TypeSpec,
}

/// A callable function declared by an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: TypeSpec,
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<Param>, returns: TypeSpec) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
        }
    }

    fn from_entry(obj: &Entry, interface: &str) -> SchemaResult<Self> {
        let name = required_str(obj, "name", &format!("interface {interface} function"))?;
        let ctx = format!("function {interface}.{name}");

        let mut params = Vec::new();
        for (idx, item) in optional_array(obj, "params", &ctx)?.iter().enumerate() {
            let param_ctx = format!("{ctx} params[{idx}]");
            let p = as_entry(item, &param_ctx)?;
            let pname = p.get("name").and_then(|n| n.as_str()).map(str::to_string);
            params.push(Param {
                name: pname,
                spec: TypeSpec::from_entry(p, &param_ctx)?,
            });
        }

        let returns_ctx = format!("{ctx} returns");
        let returns = obj
            .get("returns")
            .ok_or_else(|| SchemaError::malformed(&ctx, "missing 'returns'"))?;
        let returns = TypeSpec::from_entry(as_entry(returns, &returns_ctx)?, &returns_ctx)?;

        Ok(Self::new(name, params, returns))
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A named group of functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    functions: BTreeMap<String, Function>,
}

impl Interface {
    /// Build an interface from functions. Duplicate function names are rejected.
    pub fn new(name: impl Into<String>, functions: Vec<Function>) -> SchemaResult<Self> {
        let name = name.into();
        let mut map = BTreeMap::new();
        for f in functions {
            if map.contains_key(&f.name) {
                return Err(SchemaError::DuplicateFunction {
                    interface: name,
                    function: f.name,
                });
            }
            map.insert(f.name.clone(), f);
        }
        Ok(Self {
            name,
            functions: map,
        })
    }

    /// Build an interface from a decoded `{"type":"interface", ...}` entry.
    pub fn from_entry(obj: &Entry) -> SchemaResult<Self> {
        let name = required_str(obj, "name", "interface")?;
        let ctx = format!("interface {name}");

        let functions = optional_array(obj, "functions", &ctx)?
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                Function::from_entry(as_entry(item, &format!("{ctx} functions[{idx}]"))?, name)
            })
            .collect::<SchemaResult<Vec<_>>>()?;

        Self::new(name, functions)
    }

    /// Exact-name lookup.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Functions in deterministic name order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_functions_and_params() {
        let v = json!({
            "type": "interface",
            "name": "Calculator",
            "functions": [
                {
                    "name": "add",
                    "params": [{"name": "a", "type": "int"}, {"name": "b", "type": "int"}],
                    "returns": {"type": "int"}
                },
                { "name": "ping", "returns": {"type": "bool", "optional": true} }
            ]
        });
        let i = Interface::from_entry(v.as_object().unwrap()).unwrap();
        let add = i.function("add").unwrap();
        assert_eq!(add.arity(), 2);
        assert_eq!(add.params[1].name.as_deref(), Some("b"));
        assert_eq!(i.function("ping").unwrap().arity(), 0);
        assert!(i.function("Add").is_none());
    }

    #[test]
    fn missing_returns_is_malformed() {
        let v = json!({"type": "interface", "name": "I", "functions": [{"name": "f", "params": []}]});
        let err = Interface::from_entry(v.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("missing 'returns'"));
    }

    #[test]
    fn duplicate_function_rejected() {
        let f = Function::new("f", vec![], TypeSpec::new("int"));
        let err = Interface::new("I", vec![f.clone(), f]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFunction { .. }));
    }
}
