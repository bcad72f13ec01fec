//! Handler abstraction.
//!
//! A handler receives already-validated, normalized arguments in declaration
//! order and returns a result value that the server validates against the
//! declared return type before it is sent.
//!
//! Any `Fn(Vec<Value>) -> RpcResult<Value>` closure is a handler. Handlers
//! written against `anyhow` can be wrapped with [`fallible`].

use serde_json::Value;

use covenant_core::errors::{RpcError, RpcResult};

/// Application code behind one contract function.
pub trait Handler: Send + Sync {
    fn call(&self, args: Vec<Value>) -> RpcResult<Value>;
}

impl<F> Handler for F
where
    F: Fn(Vec<Value>) -> RpcResult<Value> + Send + Sync,
{
    fn call(&self, args: Vec<Value>) -> RpcResult<Value> {
        self(args)
    }
}

/// Adapter for handlers returning `anyhow::Result`.
///
/// An [`RpcError`] anywhere in the error chain is returned as-is; any other
/// error becomes `INTERNAL_ERROR`.
pub struct Fallible<F>(F);

/// Wrap an `anyhow`-returning function as a [`Handler`].
pub fn fallible<F>(f: F) -> Fallible<F>
where
    F: Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync,
{
    Fallible(f)
}

impl<F> Handler for Fallible<F>
where
    F: Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync,
{
    fn call(&self, args: Vec<Value>) -> RpcResult<Value> {
        (self.0)(args).map_err(|e| match e.chain().find_map(|c| c.downcast_ref::<RpcError>()) {
            Some(rpc) => rpc.clone(),
            None => RpcError::internal(format!("{e:#}")),
        })
    }
}
