use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use covenant_core::convert::ConverterRegistry;
use covenant_core::model::TypeSpec;
use covenant_core::validate::{Direction, Validator};
use covenant_handlers::config::ServerConfig;

use crate::io::input;
use crate::output::{self, ErrorOut};

/// The declared type to check against.
#[derive(Debug, Clone)]
pub struct Target {
    pub type_name: String,
    pub optional: bool,
    pub array_depth: usize,
    pub response: bool,
}

impl Target {
    fn spec(&self) -> TypeSpec {
        let spec = TypeSpec::new(&self.type_name).array(self.array_depth);
        if self.optional {
            spec.optional()
        } else {
            spec
        }
    }

    fn direction(&self) -> Direction {
        if self.response {
            Direction::Response
        } else {
            Direction::Request
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateOut {
    pub ok: bool,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

pub fn run(idl: &Path, cfg: &ServerConfig, target: Target, value: &str) -> Result<ExitCode> {
    if target.array_depth > cfg.core.limits.max_depth {
        anyhow::bail!(
            "--array-depth {} exceeds limit {}",
            target.array_depth,
            cfg.core.limits.max_depth
        );
    }

    let converters = ConverterRegistry::builtin();
    let contract = input::load_contract(idl, cfg, &converters)?;
    let value = input::value_arg(value)?;

    let spec = target.spec();
    let validator = Validator::new(&contract, &converters).with_limits(&cfg.core.limits);
    let result = validator.validate(&spec, &value, target.direction());

    let out = match &result {
        Ok(v) => ValidateOut {
            ok: true,
            ty: spec.to_string(),
            value: Some(v.clone()),
            error: None,
        },
        Err(e) => ValidateOut {
            ok: false,
            ty: spec.to_string(),
            value: None,
            error: Some(ErrorOut::from(e)),
        },
    };

    match &result {
        Ok(_) => output::verdict(true, &format!("value matches {spec}"))?,
        Err(e) => output::verdict(false, &e.to_string())?,
    }
    output::print(&out)?;
    Ok(super::exit_code(out.ok))
}
