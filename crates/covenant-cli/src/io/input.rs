use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use covenant_core::contract::Contract;
use covenant_core::convert::ConverterRegistry;
use covenant_handlers::config::{validate_config, ServerConfig};

pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    let raw = read_bytes(path)?;
    let v: Value = serde_json::from_slice(&raw).map_err(|e| anyhow!("invalid json: {e}"))?;
    Ok(v)
}

/// Inline JSON, or `@path` to read the value from a file.
pub fn value_arg(arg: &str) -> Result<Value> {
    match arg.strip_prefix('@') {
        Some(path) => read_json_file(path),
        None => serde_json::from_str(arg).map_err(|e| anyhow!("invalid json value: {e}")),
    }
}

/// Load `--config`, or defaults when absent.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig> {
    let cfg = match path {
        Some(p) => serde_json::from_value(read_json_file(p)?)
            .with_context(|| format!("invalid config {}", p.display()))?,
        None => ServerConfig::default(),
    };
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Decode an IDL file and run the boot-time type check.
pub fn load_contract<P: AsRef<Path>>(
    path: P,
    cfg: &ServerConfig,
    converters: &ConverterRegistry,
) -> Result<Contract> {
    let path = path.as_ref();
    let bytes = read_bytes(path)?;
    let contract = Contract::from_json_bytes(&bytes, &cfg.core.limits)
        .with_context(|| format!("failed to load contract {}", path.display()))?;
    contract.check_types(converters, &cfg.core.limits)?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "contract file loaded");
    Ok(contract)
}
