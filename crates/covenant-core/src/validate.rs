//! Recursive value validation and method dispatch.
//!
//! [`Validator`] checks decoded values against declared [`TypeSpec`]s using a
//! frozen [`Contract`] and [`ConverterRegistry`]. It holds only shared
//! references and never mutates them, so any number of workers may validate
//! concurrently without locks.
//!
//! Rules, applied in order for `validate(spec, value, direction)`:
//! 1. `null` is accepted iff `spec.optional`
//! 2. `array_depth > 0`: the value must be an array; each element is checked
//!    against the element type (fail-fast, failures carry the index)
//! 3. primitive kind: delegate to the kind's converter
//! 4. struct: the value must be an object; every resolved field is checked,
//!    unknown keys are ignored and dropped from the normalized value
//! 5. enum: the value must be one of the permitted strings
//! 6. anything else is a schema defect and fails loudly
//!
//! Failures are `INVALID_PARAMS` for [`Direction::Request`] and
//! `INVALID_RESPONSE` for [`Direction::Response`]. Messages are prefixed with
//! the path of the offending value, e.g. `book.authors[2].name: expected
//! string, got number`.

use std::fmt;

use serde_json::{Map, Value};

use crate::config::LimitsConfig;
use crate::contract::{Contract, TypeRef};
use crate::convert::{ConverterRegistry, TypeConverter};
use crate::errors::{RpcError, RpcResult};
use crate::model::{EnumDef, Function, StructDef, TypeSpec};
use crate::value::kind_name;

/// Which side of a call a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Inbound arguments; failures are the caller's fault.
    Request,
    /// Outbound results; failures are server-side contract violations.
    Response,
}

impl Direction {
    /// Build the direction-appropriate validation error.
    pub fn error(self, message: impl Into<String>) -> RpcError {
        match self {
            Self::Request => RpcError::invalid_params(message),
            Self::Response => RpcError::invalid_response(message),
        }
    }

    fn convert(self, converter: &dyn TypeConverter, value: &Value) -> RpcResult<Value> {
        match self {
            Self::Request => converter.from_request(value),
            Self::Response => converter.to_response(value),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Param(usize, Option<&'a str>),
    Key(&'a str),
    Index(usize),
}

/// Location of the value currently being checked.
#[derive(Debug, Default)]
struct Path<'a>(Vec<Segment<'a>>);

impl<'a> Path<'a> {
    fn depth(&self) -> usize {
        self.0.len()
    }

    fn push(&mut self, s: Segment<'a>) {
        self.0.push(s);
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                Segment::Param(_, Some(name)) => f.write_str(name)?,
                Segment::Param(idx, None) => write!(f, "params[{idx}]")?,
                Segment::Key(k) if i == 0 => f.write_str(k)?,
                Segment::Key(k) => write!(f, ".{k}")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// Validates values and dispatches calls against one contract.
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    contract: &'a Contract,
    converters: &'a ConverterRegistry,
    max_depth: usize,
}

impl<'a> Validator<'a> {
    pub fn new(contract: &'a Contract, converters: &'a ConverterRegistry) -> Self {
        Self {
            contract,
            converters,
            max_depth: LimitsConfig::default().max_depth,
        }
    }

    pub fn with_limits(mut self, limits: &LimitsConfig) -> Self {
        self.max_depth = limits.max_depth;
        self
    }

    pub fn contract(&self) -> &'a Contract {
        self.contract
    }

    /// Check `value` against `spec` and return the normalized value.
    pub fn validate(
        &self,
        spec: &TypeSpec,
        value: &Value,
        direction: Direction,
    ) -> RpcResult<Value> {
        self.check(spec, value, direction, &mut Path::default())
    }

    /// Resolve, validate arguments, invoke `handler`, validate its result.
    ///
    /// The handler only runs if the method exists and every argument is
    /// valid. Handler failures are returned unchanged.
    pub fn dispatch<F>(
        &self,
        interface: &str,
        function: &str,
        args: Vec<Value>,
        handler: F,
    ) -> RpcResult<Value>
    where
        F: FnOnce(Vec<Value>) -> RpcResult<Value>,
    {
        let func = self.contract.function(interface, function)?;
        let normalized = self.validate_params(func, &args)?;

        tracing::debug!(interface, function, args = normalized.len(), "invoking handler");
        let result = handler(normalized)?;

        self.validate_result(func, &result).map_err(|e| {
            tracing::warn!(interface, function, error = %e, "handler result violates contract");
            e
        })
    }

    /// Arity check plus per-argument request validation. First failure wins.
    pub fn validate_params(&self, func: &'a Function, args: &[Value]) -> RpcResult<Vec<Value>> {
        if args.len() != func.arity() {
            return Err(RpcError::invalid_params(format!(
                "Function '{}' expects {} params, got {}",
                func.name,
                func.arity(),
                args.len()
            )));
        }

        let mut out = Vec::with_capacity(args.len());
        let mut path = Path::default();
        for (idx, (param, arg)) in func.params.iter().zip(args).enumerate() {
            path.push(Segment::Param(idx, param.name.as_deref()));
            let checked = self.check(&param.spec, arg, Direction::Request, &mut path);
            path.pop();
            out.push(checked?);
        }
        Ok(out)
    }

    /// Response validation of a handler result.
    pub fn validate_result(&self, func: &'a Function, result: &Value) -> RpcResult<Value> {
        let mut path = Path::default();
        path.push(Segment::Key("result"));
        self.check(&func.returns, result, Direction::Response, &mut path)
    }

    fn check(
        &self,
        spec: &TypeSpec,
        value: &Value,
        dir: Direction,
        path: &mut Path<'a>,
    ) -> RpcResult<Value> {
        if value.is_null() {
            return if spec.optional {
                Ok(Value::Null)
            } else {
                Err(fail(dir, path, format!("expected {spec}, got null")))
            };
        }

        if path.depth() > self.max_depth {
            return Err(fail(
                dir,
                path,
                format!("value nests deeper than {} levels", self.max_depth),
            ));
        }

        if spec.is_array() {
            return self.check_array(spec, value, dir, path);
        }

        match self.contract.resolve_type(&spec.type_name, self.converters) {
            Some(TypeRef::Primitive(c)) => dir.convert(c, value).map_err(|e| locate(path, e)),
            Some(TypeRef::Struct(s)) => self.check_struct(s, value, dir, path),
            Some(TypeRef::Enum(e)) => check_enum(e, value, dir, path),
            None => {
                tracing::error!(
                    type_name = %spec.type_name,
                    path = %path,
                    "contract references an unknown type"
                );
                Err(fail(dir, path, format!("unknown type '{}'", spec.type_name)))
            }
        }
    }

    fn check_array(
        &self,
        spec: &TypeSpec,
        value: &Value,
        dir: Direction,
        path: &mut Path<'a>,
    ) -> RpcResult<Value> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(fail(
                    dir,
                    path,
                    format!("expected {spec}, got {}", kind_name(other)),
                ))
            }
        };

        let element = spec.element();
        let mut out = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            path.push(Segment::Index(idx));
            let checked = self.check(&element, item, dir, path);
            path.pop();
            out.push(checked?);
        }
        Ok(Value::Array(out))
    }

    fn check_struct(
        &self,
        s: &'a StructDef,
        value: &Value,
        dir: Direction,
        path: &mut Path<'a>,
    ) -> RpcResult<Value> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(fail(
                    dir,
                    path,
                    format!("expected {}, got {}", s.name, kind_name(other)),
                ))
            }
        };

        let mut out = Map::new();
        for field in s.resolved_fields() {
            match obj.get(&field.name) {
                None if field.spec.optional => {}
                None => {
                    return Err(fail(
                        dir,
                        path,
                        format!("missing required field '{}' of {}", field.name, s.name),
                    ))
                }
                Some(v) => {
                    path.push(Segment::Key(&field.name));
                    let checked = self.check(&field.spec, v, dir, path);
                    path.pop();
                    out.insert(field.name.clone(), checked?);
                }
            }
        }
        Ok(Value::Object(out))
    }
}

fn check_enum(e: &EnumDef, value: &Value, dir: Direction, path: &Path<'_>) -> RpcResult<Value> {
    match value {
        Value::String(s) if e.contains(s) => Ok(value.clone()),
        Value::String(s) => Err(fail(
            dir,
            path,
            format!(
                "value '{s}' is not a member of enum {} (allowed: {})",
                e.name,
                e.values().join(", ")
            ),
        )),
        other => Err(fail(
            dir,
            path,
            format!("expected {}, got {}", e.name, kind_name(other)),
        )),
    }
}

fn fail(dir: Direction, path: &Path<'_>, message: String) -> RpcError {
    locate(path, dir.error(message))
}

/// Prefix an error message with the value path, if any.
fn locate(path: &Path<'_>, mut e: RpcError) -> RpcError {
    if path.depth() > 0 {
        e.message = format!("{path}: {}", e.message);
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn contract() -> Contract {
        Contract::from_value(json!([
            {"type": "enum", "name": "Status", "values": ["OPEN", "CLOSED"]},
            {"type": "struct", "name": "Base", "fields": [
                {"name": "id", "type": "string"}
            ]},
            {"type": "struct", "name": "Ticket", "extends": "Base", "fields": [
                {"name": "status", "type": "Status"},
                {"name": "tags", "type": "string", "is_array": true},
                {"name": "note", "type": "string", "optional": true}
            ]},
            {"type": "struct", "name": "Node", "fields": [
                {"name": "next", "type": "Node", "optional": true}
            ]},
            {"type": "interface", "name": "Calc", "functions": [
                {"name": "add", "params": [
                    {"name": "a", "type": "int"},
                    {"name": "b", "type": "int"}
                ], "returns": {"type": "int"}}
            ]}
        ]))
        .unwrap()
    }

    #[test]
    fn null_only_when_optional() {
        let c = contract();
        let conv = ConverterRegistry::builtin();
        let v = Validator::new(&c, &conv);

        let spec = TypeSpec::new("int");
        let err = v.validate(&spec, &Value::Null, Direction::Request).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParams);

        let spec = TypeSpec::new("int").optional();
        assert_eq!(v.validate(&spec, &Value::Null, Direction::Request).unwrap(), Value::Null);
    }

    #[test]
    fn array_failure_names_the_index() {
        let c = contract();
        let conv = ConverterRegistry::builtin();
        let v = Validator::new(&c, &conv);

        let spec = TypeSpec::new("int").array(1);
        let err = v
            .validate(&spec, &json!([1, 2, "three"]), Direction::Request)
            .unwrap_err();
        assert_eq!(err.message, "[2]: expected int, got string");
    }

    #[test]
    fn struct_uses_inherited_fields_and_drops_unknown_keys() {
        let c = contract();
        let conv = ConverterRegistry::builtin();
        let v = Validator::new(&c, &conv);

        let spec = TypeSpec::new("Ticket");
        let out = v
            .validate(
                &spec,
                &json!({"id": "t1", "status": "OPEN", "tags": [], "extra": true}),
                Direction::Response,
            )
            .unwrap();
        assert_eq!(out, json!({"id": "t1", "status": "OPEN", "tags": []}));

        let err = v
            .validate(&spec, &json!({"status": "OPEN", "tags": []}), Direction::Response)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
        assert!(err.message.contains("'id'"));
    }

    #[test]
    fn nested_failure_carries_field_path() {
        let c = contract();
        let conv = ConverterRegistry::builtin();
        let v = Validator::new(&c, &conv);

        let spec = TypeSpec::new("Ticket");
        let err = v
            .validate(
                &spec,
                &json!({"id": "t1", "status": "OPEN", "tags": ["a", 7]}),
                Direction::Request,
            )
            .unwrap_err();
        assert_eq!(err.message, "tags[1]: expected string, got number");
    }

    #[test]
    fn enum_error_lists_allowed_values() {
        let c = contract();
        let conv = ConverterRegistry::builtin();
        let v = Validator::new(&c, &conv);

        let err = v
            .validate(&TypeSpec::new("Status"), &json!("SHIPPED"), Direction::Request)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParams);
        assert!(err.message.contains("OPEN, CLOSED"));
    }

    #[test]
    fn unknown_type_fails_with_direction_kind() {
        let c = contract();
        let conv = ConverterRegistry::builtin();
        let v = Validator::new(&c, &conv);

        let err = v
            .validate(&TypeSpec::new("Ghost"), &json!(1), Direction::Response)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }

    #[test]
    fn depth_limit_stops_recursive_values() {
        let c = contract();
        let conv = ConverterRegistry::builtin();
        let limits = LimitsConfig {
            max_depth: 3,
            ..LimitsConfig::default()
        };
        let v = Validator::new(&c, &conv).with_limits(&limits);

        let shallow = json!({"next": {"next": null}});
        v.validate(&TypeSpec::new("Node"), &shallow, Direction::Request)
            .unwrap();

        let deep = json!({"next": {"next": {"next": {"next": {"next": null}}}}});
        let err = v
            .validate(&TypeSpec::new("Node"), &deep, Direction::Request)
            .unwrap_err();
        assert!(err.message.contains("deeper than 3"));
    }

    #[test]
    fn dispatch_runs_handler_only_on_valid_input() {
        let c = contract();
        let conv = ConverterRegistry::builtin();
        let v = Validator::new(&c, &conv);

        let sum = |args: Vec<Value>| -> RpcResult<Value> {
            let a = args[0].as_i64().unwrap_or_default();
            let b = args[1].as_i64().unwrap_or_default();
            Ok(json!(a + b))
        };
        assert_eq!(v.dispatch("Calc", "add", vec![json!(3), json!(4)], sum).unwrap(), json!(7));

        let mut called = false;
        let err = v
            .dispatch("Calc", "add", vec![json!("x"), json!(4)], |_| {
                called = true;
                Ok(json!(0))
            })
            .unwrap_err();
        assert!(!called);
        assert_eq!(err.message, "a: expected int, got string");

        let err = v
            .dispatch("Calc", "add", vec![json!(1)], |_| Ok(json!(0)))
            .unwrap_err();
        assert_matches!(err.kind, ErrorKind::InvalidParams);
    }

    #[test]
    fn dispatch_checks_results_and_passes_handler_errors() {
        let c = contract();
        let conv = ConverterRegistry::builtin();
        let v = Validator::new(&c, &conv);

        let err = v
            .dispatch("Calc", "add", vec![json!(3), json!(4)], |_| Ok(json!("7")))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
        assert_eq!(err.message, "result: expected int, got string");

        let err = v
            .dispatch("Calc", "add", vec![json!(3), json!(4)], |_| {
                Err(RpcError::application(4001, "overflow"))
            })
            .unwrap_err();
        assert_eq!(err, RpcError::application(4001, "overflow"));

        let err = v
            .dispatch("Calc", "mul", vec![], |_| Ok(json!(0)))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MethodNotFound);
    }
}
