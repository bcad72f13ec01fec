//! contract_properties.rs
//!
//! Property tests over generated contracts and values:
//! - array nesting must match the declared depth exactly
//! - resolved struct fields are the union of the inheritance chain
//! - request and response validation accept the same values

use covenant_core::prelude::*;
use proptest::prelude::*;
use serde_json::{json, Value};

fn empty_contract() -> Contract {
    Contract::from_value(json!([])).unwrap()
}

fn nest(depth: usize, leaf: Value) -> Value {
    (0..depth).fold(leaf, |acc, _| json!([acc]))
}

/// Struct chain `S0 <- S1 <- ... <- S{n-1}`, each with `width` own fields.
fn chain_contract(levels: usize, width: usize) -> Contract {
    let mut entries = Vec::new();
    for level in 0..levels {
        let fields: Vec<Value> = (0..width)
            .map(|f| json!({"name": format!("f{level}_{f}"), "type": "int"}))
            .collect();
        let mut entry = json!({"type": "struct", "name": format!("S{level}"), "fields": fields});
        if level > 0 {
            entry["extends"] = json!(format!("S{}", level - 1));
        }
        entries.push(entry);
    }
    Contract::from_entries(entries).unwrap()
}

proptest! {
    #[test]
    fn array_depth_must_match_exactly(depth in 0usize..6, leaf in any::<i32>()) {
        let contract = empty_contract();
        let converters = ConverterRegistry::builtin();
        let v = Validator::new(&contract, &converters);
        let spec = TypeSpec::new("int").array(depth);

        let exact = nest(depth, json!(leaf));
        prop_assert_eq!(v.validate(&spec, &exact, Direction::Request).unwrap(), exact);

        let deeper = nest(depth + 1, json!(leaf));
        let err = v.validate(&spec, &deeper, Direction::Request).unwrap_err();
        prop_assert_eq!(err.kind, ErrorKind::InvalidParams);

        if depth > 0 {
            let shallower = nest(depth - 1, json!(leaf));
            let err = v.validate(&spec, &shallower, Direction::Request).unwrap_err();
            prop_assert_eq!(err.kind, ErrorKind::InvalidParams);
        }
    }

    #[test]
    fn resolved_fields_are_chain_union(levels in 1usize..6, width in 0usize..4) {
        let contract = chain_contract(levels, width);
        let leaf = contract.struct_def(&format!("S{}", levels - 1)).unwrap();
        let names: Vec<String> = leaf.resolved_fields().iter().map(|f| f.name.clone()).collect();

        let mut expected = Vec::new();
        for level in (0..levels).rev() {
            for f in 0..width {
                expected.push(format!("f{level}_{f}"));
            }
        }
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn request_and_response_accept_the_same_values(n in any::<i64>(), s in ".*", b in any::<bool>()) {
        let contract = empty_contract();
        let converters = ConverterRegistry::builtin();
        let v = Validator::new(&contract, &converters);

        for (ty, value) in [("int", json!(n)), ("string", json!(s)), ("bool", json!(b))] {
            let spec = TypeSpec::new(ty);
            let req = v.validate(&spec, &value, Direction::Request).unwrap();
            let resp = v.validate(&spec, &value, Direction::Response).unwrap();
            prop_assert_eq!(req, resp);
        }
    }
}
