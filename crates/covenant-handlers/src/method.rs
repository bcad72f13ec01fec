//! Method identifiers.
//!
//! A method is addressed on the wire as `interface.function`. The split is at
//! the last `.`, so interface names may themselves be dotted
//! (`acme.billing.Invoices.create`).

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

/// Stable method identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId {
    pub interface: String,
    pub function: String,
}

impl MethodId {
    pub fn new(interface: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            function: function.into(),
        }
    }

    /// Parse `interface.function`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.rsplit_once('.') {
            Some((i, f)) if !i.is_empty() && !f.is_empty() => Ok(Self::new(i, f)),
            _ => anyhow::bail!("invalid method id (expected interface.function): {s}"),
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.interface, self.function)
    }
}

impl FromStr for MethodId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
