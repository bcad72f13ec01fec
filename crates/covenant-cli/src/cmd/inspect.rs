use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use covenant_core::contract::Contract;
use covenant_core::convert::ConverterRegistry;
use covenant_core::model::{Field, TypeSpec};
use covenant_handlers::config::ServerConfig;

use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct TypedName {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Serialize)]
pub struct FunctionOut {
    pub name: String,
    pub params: Vec<TypedName>,
    pub returns: String,
}

#[derive(Debug, Serialize)]
pub struct InterfaceOut {
    pub name: String,
    pub functions: Vec<FunctionOut>,
}

#[derive(Debug, Serialize)]
pub struct StructOut {
    pub name: String,
    pub extends: Option<String>,
    /// Own fields first, then inherited ones.
    pub fields: Vec<TypedName>,
}

#[derive(Debug, Serialize)]
pub struct EnumOut {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InspectOut {
    pub checksum: Option<String>,
    pub kinds: Vec<String>,
    pub interfaces: Vec<InterfaceOut>,
    pub structs: Vec<StructOut>,
    pub enums: Vec<EnumOut>,
}

pub fn run(idl: &Path, cfg: &ServerConfig) -> Result<ExitCode> {
    let converters = ConverterRegistry::builtin();
    let contract = input::load_contract(idl, cfg, &converters)?;

    output::print(&catalog(&contract, &converters))?;
    Ok(ExitCode::SUCCESS)
}

fn catalog(contract: &Contract, converters: &ConverterRegistry) -> InspectOut {
    let interfaces = contract
        .interfaces()
        .map(|i| InterfaceOut {
            name: i.name.clone(),
            functions: i
                .functions()
                .map(|f| FunctionOut {
                    name: f.name.clone(),
                    params: f
                        .params
                        .iter()
                        .map(|p| typed(p.name.clone(), &p.spec))
                        .collect(),
                    returns: f.returns.to_string(),
                })
                .collect(),
        })
        .collect();

    let structs = contract
        .structs()
        .map(|s| StructOut {
            name: s.name.clone(),
            extends: s.extends.clone(),
            fields: s.resolved_fields().iter().map(field).collect(),
        })
        .collect();

    let enums = contract
        .enums()
        .map(|e| EnumOut {
            name: e.name.clone(),
            values: e.values().to_vec(),
        })
        .collect();

    InspectOut {
        checksum: contract.checksum().map(str::to_string),
        kinds: converters.kinds(),
        interfaces,
        structs,
        enums,
    }
}

fn typed(name: Option<String>, spec: &TypeSpec) -> TypedName {
    TypedName {
        name,
        ty: spec.to_string(),
    }
}

fn field(f: &Field) -> TypedName {
    typed(Some(f.name.clone()), &f.spec)
}
