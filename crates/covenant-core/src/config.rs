//! Configuration structures for covenant-core.
//!
//! This module defines explicit, serializable configuration objects used by
//! higher-level components (server, CLI) to bound the work done per schema
//! and per request.
//!
//! The core crate itself does not read environment variables or files. All
//! configuration must be provided explicitly by the caller.

use serde::{Deserialize, Serialize};

use crate::errors::{SchemaError, SchemaResult};

/// Global configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Resource and complexity limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum size of an encoded schema document.
    #[serde(default = "LimitsConfig::default_max_schema_bytes")]
    pub max_schema_bytes: usize,

    /// Maximum size of an encoded request (single or batch).
    #[serde(default = "LimitsConfig::default_max_request_bytes")]
    pub max_request_bytes: usize,

    /// Maximum nesting depth the validator will descend into.
    #[serde(default = "LimitsConfig::default_max_depth")]
    pub max_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_schema_bytes: Self::default_max_schema_bytes(),
            max_request_bytes: Self::default_max_request_bytes(),
            max_depth: Self::default_max_depth(),
        }
    }
}

impl LimitsConfig {
    fn default_max_schema_bytes() -> usize {
        8 * 1024 * 1024 // 8 MiB
    }
    fn default_max_request_bytes() -> usize {
        2 * 1024 * 1024 // 2 MiB
    }
    fn default_max_depth() -> usize {
        128
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> SchemaResult<()> {
    if cfg.limits.max_schema_bytes == 0 {
        return Err(SchemaError::InvalidConfig(
            "max_schema_bytes must be greater than zero".into(),
        ));
    }

    if cfg.limits.max_request_bytes == 0 {
        return Err(SchemaError::InvalidConfig(
            "max_request_bytes must be greater than zero".into(),
        ));
    }

    if cfg.limits.max_depth == 0 {
        return Err(SchemaError::InvalidConfig(
            "max_depth must be greater than zero".into(),
        ));
    }

    Ok(())
}
