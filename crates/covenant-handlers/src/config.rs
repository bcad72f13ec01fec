//! Server configuration.
//!
//! Conventions:
//! - All limits are explicit.
//! - Defaults are conservative.
//! - No direct I/O. Loading config from files is handled by the host.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use covenant_core::config::CoreConfig;

/// Server configuration root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Codec and validation limits.
    #[serde(default)]
    pub core: CoreConfig,

    /// Maximum number of calls accepted in one batch.
    #[serde(default = "ServerConfig::default_max_batch_size")]
    pub max_batch_size: usize,

    /// Serve the raw schema entries under the reserved introspection method.
    #[serde(default = "ServerConfig::default_introspection")]
    pub introspection: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            max_batch_size: Self::default_max_batch_size(),
            introspection: Self::default_introspection(),
        }
    }
}

impl ServerConfig {
    fn default_max_batch_size() -> usize {
        64
    }
    fn default_introspection() -> bool {
        true
    }
}

/// Validate a full server configuration.
pub fn validate_config(cfg: &ServerConfig) -> Result<()> {
    covenant_core::config::validate_config(&cfg.core)?;
    if cfg.max_batch_size == 0 {
        anyhow::bail!("max_batch_size must be greater than zero");
    }
    Ok(())
}
