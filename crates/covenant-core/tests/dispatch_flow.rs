//! dispatch_flow.rs
//!
//! End-to-end checks of contract loading and dispatch through the public API:
//! JSON schema bytes in, validated calls out.

use std::sync::Arc;
use std::thread;

use assert_matches::assert_matches;
use covenant_core::prelude::*;
use serde_json::{json, Value};

const SCHEMA: &str = r#"[
  {"type": "meta", "checksum": "c0ffee"},
  {"type": "enum", "name": "Genre", "values": [{"value": "FICTION"}, {"value": "HISTORY"}]},
  {"type": "struct", "name": "Item", "fields": [
    {"name": "id", "type": "string"}
  ]},
  {"type": "struct", "name": "Book", "extends": "Item", "fields": [
    {"name": "title", "type": "string"},
    {"name": "genre", "type": "Genre"},
    {"name": "authors", "type": "[]string"},
    {"name": "rating", "type": "float", "optional": true}
  ]},
  {"type": "interface", "name": "Library", "functions": [
    {"name": "add", "params": [{"name": "a", "type": "int"}, {"name": "b", "type": "int"}],
     "returns": {"type": "int"}},
    {"name": "shelve", "params": [{"name": "book", "type": "Book"}],
     "returns": {"type": "Book"}},
    {"name": "find", "params": [{"name": "title", "type": "string"}],
     "returns": {"type": "Book", "optional": true}}
  ]}
]"#;

fn load() -> Contract {
    Contract::from_json_bytes(SCHEMA.as_bytes(), &LimitsConfig::default()).unwrap()
}

fn sum(args: Vec<Value>) -> RpcResult<Value> {
    let a = args[0].as_i64().unwrap_or_default();
    let b = args[1].as_i64().unwrap_or_default();
    Ok(json!(a + b))
}

#[test]
fn add_round_trip() {
    let contract = load();
    let converters = ConverterRegistry::builtin();
    let v = Validator::new(&contract, &converters);

    assert_eq!(v.dispatch("Library", "add", vec![json!(3), json!(4)], sum).unwrap(), json!(7));
    // integral floats are accepted as ints
    assert_eq!(v.dispatch("Library", "add", vec![json!(3.0), json!(4)], sum).unwrap(), json!(7));
}

#[test]
fn contract_violation_by_handler_is_invalid_response() {
    let contract = load();
    let converters = ConverterRegistry::builtin();
    let v = Validator::new(&contract, &converters);

    let err = v
        .dispatch("Library", "add", vec![json!(3), json!(4)], |_| Ok(json!("7")))
        .unwrap_err();
    assert_eq!(err.code(), -32001);
}

#[test]
fn inherited_and_nested_fields_are_enforced() {
    let contract = load();
    let converters = ConverterRegistry::builtin();
    let v = Validator::new(&contract, &converters);

    let book = json!({
        "id": "b1",
        "title": "Dune",
        "genre": "FICTION",
        "authors": ["Herbert"],
        "isbn": "ignored"
    });
    let out = v
        .dispatch("Library", "shelve", vec![book], |args| Ok(args[0].clone()))
        .unwrap();
    assert_eq!(out.get("isbn"), None);
    assert_eq!(out["authors"], json!(["Herbert"]));

    let bad = json!({"id": "b2", "title": "X", "genre": "FICTION", "authors": ["A", 1]});
    let err = v
        .dispatch("Library", "shelve", vec![bad], |_| panic!("handler must not run"))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidParams);
    assert_eq!(err.message, "book.authors[1]: expected string, got number");

    let no_id = json!({"title": "X", "genre": "HISTORY", "authors": []});
    let err = v
        .dispatch("Library", "shelve", vec![no_id], |_| panic!("handler must not run"))
        .unwrap_err();
    assert!(err.message.contains("'id'"));
}

#[test]
fn optional_result_may_be_null() {
    let contract = load();
    let converters = ConverterRegistry::builtin();
    let v = Validator::new(&contract, &converters);

    let out = v
        .dispatch("Library", "find", vec![json!("missing")], |_| Ok(Value::Null))
        .unwrap();
    assert_eq!(out, Value::Null);
}

#[test]
fn unknown_method_never_calls_handler() {
    let contract = load();
    let converters = ConverterRegistry::builtin();
    let v = Validator::new(&contract, &converters);

    let err = v
        .dispatch("Library", "burn", vec![], |_| panic!("handler must not run"))
        .unwrap_err();
    assert_matches!(err.kind, ErrorKind::MethodNotFound);

    let err = v
        .dispatch("Archive", "add", vec![], |_| panic!("handler must not run"))
        .unwrap_err();
    assert_eq!(err.code(), -32601);
}

#[test]
fn lookups_return_the_same_definition() {
    let contract = load();
    let a = contract.function("Library", "add").unwrap();
    let b = contract.function("Library", "add").unwrap();
    assert!(std::ptr::eq(a, b));
    assert_eq!(contract.checksum(), Some("c0ffee"));
}

#[test]
fn cyclic_inheritance_is_a_schema_error() {
    let doc = json!([
        {"type": "struct", "name": "A", "extends": "B", "fields": []},
        {"type": "struct", "name": "B", "extends": "A", "fields": []}
    ]);
    let err = Contract::from_value(doc).unwrap_err();
    assert_matches!(err, SchemaError::InheritanceCycle { .. });
    assert_eq!(RpcError::from(err).code(), -32010);
}

#[test]
fn unknown_field_type_fails_the_boot_check() {
    let doc = json!([
        {"type": "struct", "name": "A", "fields": [{"name": "x", "type": "uuid"}]}
    ]);
    let contract = Contract::from_value(doc).unwrap();
    let err = contract
        .check_types(&ConverterRegistry::builtin(), &LimitsConfig::default())
        .unwrap_err();
    assert_matches!(err, SchemaError::UnknownType { ref type_name, .. } if type_name == "uuid");
}

#[test]
fn shared_contract_serves_concurrent_callers() {
    let contract = Arc::new(load());
    let converters = Arc::new(ConverterRegistry::builtin());

    let workers: Vec<_> = (0..8i64)
        .map(|i| {
            let contract = Arc::clone(&contract);
            let converters = Arc::clone(&converters);
            thread::spawn(move || {
                let v = Validator::new(&contract, &converters);
                v.dispatch("Library", "add", vec![json!(i), json!(i)], sum)
            })
        })
        .collect();

    for (i, w) in workers.into_iter().enumerate() {
        assert_eq!(w.join().unwrap().unwrap(), json!(2 * i as i64));
    }
}
