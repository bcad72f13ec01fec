//! Handler registry.
//!
//! The registry binds contract functions to handler instances. It is bound to
//! one contract at creation, and only functions that contract declares can be
//! registered.
//!
//! Requirements:
//! - stable ordering for listing and iteration
//! - clear errors for undeclared and duplicate methods
//! - no global mutable state
//!
//! The registry does not validate or invoke anything; the server does.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;

use covenant_core::contract::Contract;

use crate::handler::Handler;
use crate::method::MethodId;

/// Handlers keyed by method id.
pub struct HandlerRegistry {
    contract: Arc<Contract>,
    handlers: BTreeMap<MethodId, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create an empty registry for `contract`.
    pub fn new(contract: Arc<Contract>) -> Self {
        Self {
            contract,
            handlers: BTreeMap::new(),
        }
    }

    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Register a handler for `method` (`interface.function`).
    pub fn register(&mut self, method: &str, handler: impl Handler + 'static) -> Result<()> {
        let id = MethodId::parse(method)?;

        if self.contract.function(&id.interface, &id.function).is_err() {
            anyhow::bail!("method not declared by contract: {id}");
        }
        if self.handlers.contains_key(&id) {
            anyhow::bail!("handler already registered: {id}");
        }

        tracing::debug!(method = %id, "handler registered");
        self.handlers.insert(id, Box::new(handler));
        Ok(())
    }

    pub fn get(&self, interface: &str, function: &str) -> Option<&dyn Handler> {
        // BTreeMap lookups need an owned key; method ids are short.
        self.handlers
            .get(&MethodId::new(interface, function))
            .map(|h| h.as_ref())
    }

    /// Registered method ids in deterministic order.
    pub fn list(&self) -> Vec<MethodId> {
        self.handlers.keys().cloned().collect()
    }

    /// Contract functions without a handler, in deterministic order.
    pub fn missing_handlers(&self) -> Vec<MethodId> {
        self.contract
            .interfaces()
            .flat_map(|i| i.functions().map(move |f| MethodId::new(&i.name, &f.name)))
            .filter(|id| !self.handlers.contains_key(id))
            .collect()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("methods", &self.list())
            .finish()
    }
}
