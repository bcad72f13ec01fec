//! The contract: the schema root.
//!
//! A [`Contract`] is built once from the decoded IDL entries and is immutable
//! afterwards. It owns every interface, struct and enum, and it is the single
//! lookup point for "find function F in interface I".
//!
//! Construction steps:
//! 1. classify each entry by its `type` discriminator (`interface`, `struct`,
//!    `enum`; `meta` and unknown types are retained but not modeled)
//! 2. register each entity by name, rejecting duplicates within a namespace
//! 3. resolve struct parents, reject cycles, compute resolved field sets
//!
//! Any failure aborts construction. There is no partially usable contract.
//!
//! The contract is `Send + Sync` and holds no interior mutability, so one
//! instance can be shared (typically behind an `Arc`) by every worker.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::codec::{Codec, JsonCodec};
use crate::config::LimitsConfig;
use crate::convert::{ConverterRegistry, TypeConverter};
use crate::errors::{RpcError, RpcResult, SchemaError, SchemaResult};
use crate::model::structs::resolve_hierarchy;
use crate::model::{as_entry, EnumDef, Field, Function, Interface, StructDef, TypeSpec};

/// Entry discriminator values.
pub mod entry_types {
    pub const INTERFACE: &str = "interface";
    pub const STRUCT: &str = "struct";
    pub const ENUM: &str = "enum";
    pub const META: &str = "meta";
}

/// What a type name resolves to.
pub enum TypeRef<'a> {
    Primitive(&'a dyn TypeConverter),
    Struct(&'a StructDef),
    Enum(&'a EnumDef),
}

/// The parsed, immutable IDL catalog.
#[derive(Debug, Clone)]
pub struct Contract {
    interfaces: BTreeMap<String, Interface>,
    structs: Vec<StructDef>,
    struct_index: BTreeMap<String, usize>,
    enums: BTreeMap<String, EnumDef>,
    idl: Vec<Value>,
}

impl Contract {
    /// Build a contract from decoded schema entries.
    pub fn from_entries(entries: Vec<Value>) -> SchemaResult<Self> {
        let mut interfaces = BTreeMap::new();
        let mut structs = Vec::new();
        let mut struct_index = BTreeMap::new();
        let mut enums = BTreeMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            let ctx = format!("entries[{idx}]");
            let obj = as_entry(entry, &ctx)?;
            let ty = obj
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| SchemaError::malformed(&ctx, "missing string 'type'"))?;

            match ty {
                entry_types::INTERFACE => {
                    let i = Interface::from_entry(obj)?;
                    if interfaces.contains_key(&i.name) {
                        return Err(duplicate("interface", &i.name));
                    }
                    interfaces.insert(i.name.clone(), i);
                }
                entry_types::STRUCT => {
                    let s = StructDef::from_entry(obj)?;
                    if struct_index.contains_key(&s.name) {
                        return Err(duplicate("struct", &s.name));
                    }
                    struct_index.insert(s.name.clone(), structs.len());
                    structs.push(s);
                }
                entry_types::ENUM => {
                    let e = EnumDef::from_entry(obj)?;
                    if enums.contains_key(&e.name) {
                        return Err(duplicate("enum", &e.name));
                    }
                    enums.insert(e.name.clone(), e);
                }
                entry_types::META => {}
                other => {
                    tracing::debug!(
                        entry = idx,
                        entry_type = other,
                        "ignoring schema entry of unknown type"
                    );
                }
            }
        }

        resolve_hierarchy(&mut structs, &struct_index)?;

        tracing::info!(
            interfaces = interfaces.len(),
            structs = structs.len(),
            enums = enums.len(),
            "contract loaded"
        );

        Ok(Self {
            interfaces,
            structs,
            struct_index,
            enums,
            idl: entries,
        })
    }

    /// Build a contract from a decoded document, which must be an array of entries.
    pub fn from_value(doc: Value) -> SchemaResult<Self> {
        match doc {
            Value::Array(entries) => Self::from_entries(entries),
            _ => Err(SchemaError::Decode(
                "schema document must be an array of entries".into(),
            )),
        }
    }

    /// Decode JSON bytes (bounded by `limits.max_schema_bytes`) and build a contract.
    pub fn from_json_bytes(bytes: &[u8], limits: &LimitsConfig) -> SchemaResult<Self> {
        let entries = JsonCodec::new(limits.clone()).decode_schema(bytes)?;
        Self::from_entries(entries)
    }

    /// The decoded entries exactly as passed to construction.
    pub fn idl(&self) -> &[Value] {
        &self.idl
    }

    /// The first `meta` entry, if any.
    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.idl.iter().filter_map(Value::as_object).find(|o| {
            o.get("type").and_then(Value::as_str) == Some(entry_types::META)
        })
    }

    /// Checksum recorded by the IDL generator in the `meta` entry.
    pub fn checksum(&self) -> Option<&str> {
        self.meta()?.get("checksum")?.as_str()
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(name)
    }

    /// Interfaces in deterministic name order.
    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values()
    }

    /// Resolve `interface.function`. Exact name match only.
    pub fn function(&self, interface: &str, function: &str) -> RpcResult<&Function> {
        let i = self.interfaces.get(interface).ok_or_else(|| {
            RpcError::method_not_found(format!("Interface '{interface}' not found"))
        })?;
        i.function(function).ok_or_else(|| {
            RpcError::method_not_found(format!("Function '{interface}.{function}' not found"))
        })
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.struct_index.get(name).map(|&i| &self.structs[i])
    }

    /// Structs in declaration order.
    pub fn structs(&self) -> impl Iterator<Item = &StructDef> {
        self.structs.iter()
    }

    /// Parent struct, following the index resolved at construction.
    pub fn parent_of(&self, s: &StructDef) -> Option<&StructDef> {
        s.parent_index().map(|i| &self.structs[i])
    }

    /// Own and inherited fields of the named struct.
    pub fn resolved_fields(&self, name: &str) -> Option<&[Field]> {
        self.struct_def(name).map(StructDef::resolved_fields)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    /// Enums in deterministic name order.
    pub fn enums(&self) -> impl Iterator<Item = &EnumDef> {
        self.enums.values()
    }

    /// Resolve a base type name: primitive kinds first, then structs, then enums.
    pub fn resolve_type<'a>(
        &'a self,
        name: &str,
        converters: &'a ConverterRegistry,
    ) -> Option<TypeRef<'a>> {
        if let Some(c) = converters.get(name) {
            return Some(TypeRef::Primitive(c));
        }
        if let Some(s) = self.struct_def(name) {
            return Some(TypeRef::Struct(s));
        }
        self.enums.get(name).map(TypeRef::Enum)
    }

    /// Verify every referenced type name resolves against `converters` and
    /// that no declared type nests more array levels than `limits.max_depth`.
    ///
    /// Run once at boot, so a schema inconsistency stops startup instead of
    /// surfacing as a per-request failure.
    pub fn check_types(
        &self,
        converters: &ConverterRegistry,
        limits: &LimitsConfig,
    ) -> SchemaResult<()> {
        let check = |location: String, spec: &TypeSpec| -> SchemaResult<()> {
            if spec.array_depth > limits.max_depth {
                return Err(SchemaError::ArrayTooDeep {
                    location,
                    depth: spec.array_depth,
                    limit: limits.max_depth,
                });
            }
            if self.resolve_type(&spec.type_name, converters).is_some() {
                Ok(())
            } else {
                Err(SchemaError::UnknownType {
                    location,
                    type_name: spec.type_name.clone(),
                })
            }
        };

        for s in &self.structs {
            for f in s.own_fields() {
                check(format!("field {}.{}", s.name, f.name), &f.spec)?;
            }
        }

        for i in self.interfaces.values() {
            for f in i.functions() {
                for (idx, p) in f.params.iter().enumerate() {
                    let label = p.name.clone().unwrap_or_else(|| idx.to_string());
                    check(format!("param {}.{}({label})", i.name, f.name), &p.spec)?;
                }
                check(format!("return of {}.{}", i.name, f.name), &f.returns)?;
            }
        }

        Ok(())
    }
}

fn duplicate(namespace: &'static str, name: &str) -> SchemaError {
    SchemaError::DuplicateName {
        namespace,
        name: name.to_string(),
    }
}
