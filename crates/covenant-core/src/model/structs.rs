//! Struct definitions and inheritance resolution.
//!
//! A struct may extend one parent struct. The parent is referenced by name in
//! the schema and resolved into an index into the contract's struct table when
//! the contract is built. Resolution also computes each struct's full field
//! set once, so validation never walks the chain at request time.
//!
//! Rules enforced here:
//! - the parent must exist
//! - the extends chain must be acyclic
//! - a field name appears at most once across a struct and all its ancestors

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{SchemaError, SchemaResult};
use crate::model::{as_entry, optional_array, required_str, Entry, TypeSpec};

/// A named, typed struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub spec: TypeSpec,
}

impl Field {
    pub fn new(name: impl Into<String>, spec: TypeSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// A struct declared by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    /// Parent struct name as written in the schema.
    pub extends: Option<String>,
    fields: Vec<Field>,
    parent: Option<usize>,
    resolved: Vec<Field>,
}

impl StructDef {
    pub fn new(name: impl Into<String>, extends: Option<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            extends,
            fields,
            parent: None,
            resolved: Vec::new(),
        }
    }

    /// Build a struct from a decoded `{"type":"struct", ...}` entry.
    pub fn from_entry(obj: &Entry) -> SchemaResult<Self> {
        let name = required_str(obj, "name", "struct")?;
        let ctx = format!("struct {name}");

        let extends = match obj.get("extends") {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) if s.is_empty() => None,
            Some(_) => Some(required_str(obj, "extends", &ctx)?.to_string()),
        };

        let mut fields = Vec::new();
        for (idx, item) in optional_array(obj, "fields", &ctx)?.iter().enumerate() {
            let field_ctx = format!("{ctx} fields[{idx}]");
            let f = as_entry(item, &field_ctx)?;
            let field_name = required_str(f, "name", &field_ctx)?;
            let spec = TypeSpec::from_entry(f, &format!("{ctx}.{field_name}"))?;
            fields.push(Field::new(field_name, spec));
        }

        Ok(Self::new(name, extends, fields))
    }

    /// Fields declared directly on this struct.
    pub fn own_fields(&self) -> &[Field] {
        &self.fields
    }

    /// Index of the parent struct in the owning contract's struct table.
    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    /// Own fields followed by each ancestor's fields, walking up to the root.
    pub fn resolved_fields(&self) -> &[Field] {
        &self.resolved
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.resolved.iter().find(|f| f.name == name)
    }
}

/// Resolve parent links, reject cycles, and compute resolved field sets.
///
/// `index` maps struct names to positions in `structs`.
pub(crate) fn resolve_hierarchy(
    structs: &mut [StructDef],
    index: &BTreeMap<String, usize>,
) -> SchemaResult<()> {
    for s in structs.iter_mut() {
        s.parent = match &s.extends {
            None => None,
            Some(parent) => Some(*index.get(parent).ok_or_else(|| SchemaError::UnknownParent {
                name: s.name.clone(),
                parent: parent.clone(),
            })?),
        };
    }

    let mut resolved = Vec::with_capacity(structs.len());
    for start in 0..structs.len() {
        let chain = ancestor_chain(structs, start)?;
        resolved.push(merge_fields(structs, &chain)?);
    }

    for (s, fields) in structs.iter_mut().zip(resolved) {
        s.resolved = fields;
    }
    Ok(())
}

/// Indices from `start` up to its root. Fails on the first revisited struct.
fn ancestor_chain(structs: &[StructDef], start: usize) -> SchemaResult<Vec<usize>> {
    let mut visited = BTreeSet::new();
    let mut chain = Vec::new();
    let mut cur = Some(start);

    while let Some(i) = cur {
        if !visited.insert(i) {
            let mut names: Vec<String> = chain.iter().map(|&c: &usize| structs[c].name.clone()).collect();
            names.push(structs[i].name.clone());
            return Err(SchemaError::InheritanceCycle { chain: names });
        }
        chain.push(i);
        cur = structs[i].parent;
    }
    Ok(chain)
}

fn merge_fields(structs: &[StructDef], chain: &[usize]) -> SchemaResult<Vec<Field>> {
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    let mut out = Vec::new();

    for &i in chain {
        let s = &structs[i];
        for f in &s.fields {
            if let Some(owner) = owners.insert(f.name.as_str(), s.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    name: owner.to_string(),
                    field: f.name.clone(),
                    defined_in: s.name.clone(),
                });
            }
            out.push(f.clone());
        }
    }
    Ok(out)
}
