//! Request-serving facade.
//!
//! A [`Server`] is assembled once at boot from a contract, a converter
//! registry, a handler registry and a [`ServerConfig`]. Boot fails if the
//! configuration is invalid or the contract references types that do not
//! resolve. Afterwards the server is immutable and `Send + Sync`; callers
//! share it behind an `Arc` and serve requests from any number of threads.
//!
//! Per call:
//! 1. decode (bytes only): `PARSE_ERROR` / `INVALID_REQUEST`
//! 2. resolve the function in the contract: `METHOD_NOT_FOUND`
//! 3. find its handler: `METHOD_NOT_FOUND`, before any validation
//! 4. validate arguments: `INVALID_PARAMS`
//! 5. invoke the handler: its own error, or `INTERNAL_ERROR` on panic
//! 6. validate the result: `INVALID_RESPONSE`
//! 7. encode

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use covenant_core::codec::{Codec, Decoded, Incoming, JsonCodec, Outgoing, RpcRequest, RpcResponse};
use covenant_core::contract::Contract;
use covenant_core::convert::ConverterRegistry;
use covenant_core::errors::{ErrorKind, RpcError, RpcResult};
use covenant_core::validate::Validator;

use crate::config::{validate_config, ServerConfig};
use crate::handler::Handler;
use crate::registry::HandlerRegistry;

/// Reserved method returning the raw schema entries.
pub const INTROSPECTION_METHOD: &str = "covenant.idl";

pub struct Server {
    contract: Arc<Contract>,
    converters: Arc<ConverterRegistry>,
    handlers: HandlerRegistry,
    config: ServerConfig,
    codec: JsonCodec,
}

impl Server {
    /// Assemble a server. `handlers` must have been built for `contract`.
    pub fn new(
        contract: Arc<Contract>,
        converters: Arc<ConverterRegistry>,
        handlers: HandlerRegistry,
        config: ServerConfig,
    ) -> Result<Self> {
        validate_config(&config).context("invalid server configuration")?;

        if !Arc::ptr_eq(&contract, handlers.contract()) {
            anyhow::bail!("handler registry was built for a different contract");
        }

        contract
            .check_types(&converters, &config.core.limits)
            .context("contract failed type check")?;

        let missing = handlers.missing_handlers();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
            tracing::warn!(missing = %names.join(", "), "contract functions without handlers");
        }

        tracing::info!(
            handlers = handlers.len(),
            introspection = config.introspection,
            "server ready"
        );

        let codec = JsonCodec::new(config.core.limits.clone());
        Ok(Self {
            contract,
            converters,
            handlers,
            config,
            codec,
        })
    }

    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve one decoded request.
    pub fn handle(&self, request: RpcRequest) -> RpcResponse {
        let id = request.id.clone();
        let method = request.method.clone();

        let outcome = self.call(request);
        if let Err(e) = &outcome {
            log_failure(&method, e);
        }
        RpcResponse { id, outcome }
    }

    /// Serve a decoded payload, single or batch.
    pub fn handle_incoming(&self, incoming: Incoming) -> Outgoing {
        match incoming {
            Incoming::Single(d) => Outgoing::Single(self.serve(d)),
            Incoming::Batch(items) if items.len() > self.config.max_batch_size => {
                tracing::warn!(
                    size = items.len(),
                    limit = self.config.max_batch_size,
                    "batch rejected"
                );
                Outgoing::Single(RpcResponse::failure(
                    Value::Null,
                    RpcError::invalid_request(format!(
                        "batch of {} calls exceeds limit {}",
                        items.len(),
                        self.config.max_batch_size
                    )),
                ))
            }
            Incoming::Batch(items) => {
                Outgoing::Batch(items.into_iter().map(|d| self.serve(d)).collect())
            }
        }
    }

    /// Serve raw request bytes and return encoded response bytes.
    pub fn handle_bytes(&self, bytes: &[u8]) -> Vec<u8> {
        let out = match self.codec.decode_request(bytes) {
            Ok(incoming) => self.handle_incoming(incoming),
            Err(e) => {
                tracing::debug!(error = %e, "request payload rejected");
                Outgoing::Single(RpcResponse::failure(Value::Null, e))
            }
        };
        self.codec.encode_response(&out)
    }

    fn serve(&self, decoded: Decoded) -> RpcResponse {
        match decoded {
            Decoded::Request(req) => self.handle(req),
            Decoded::Rejected(resp) => resp,
        }
    }

    fn call(&self, mut request: RpcRequest) -> RpcResult<Value> {
        let params = std::mem::take(&mut request.params);

        if self.config.introspection && request.method == INTROSPECTION_METHOD {
            if !params.is_empty() {
                return Err(RpcError::invalid_params(format!(
                    "{INTROSPECTION_METHOD} takes no params"
                )));
            }
            return Ok(Value::Array(self.contract.idl().to_vec()));
        }

        let (interface, function) = request.split_method().ok_or_else(|| {
            RpcError::invalid_request(format!(
                "method '{}' is not of the form interface.function",
                request.method
            ))
        })?;

        self.contract.function(interface, function)?;
        let handler = self.handlers.get(interface, function).ok_or_else(|| {
            RpcError::method_not_found(format!(
                "No handler registered for '{interface}.{function}'"
            ))
        })?;

        tracing::debug!(interface, function, "call");
        Validator::new(&self.contract, &self.converters)
            .with_limits(&self.config.core.limits)
            .dispatch(interface, function, params, |args| invoke(handler, args))
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("handlers", &self.handlers)
            .field("converters", &self.converters)
            .field("config", &self.config)
            .finish()
    }
}

fn invoke(handler: &dyn Handler, args: Vec<Value>) -> RpcResult<Value> {
    catch_unwind(AssertUnwindSafe(|| handler.call(args)))
        .unwrap_or_else(|_| Err(RpcError::internal("handler panicked")))
}

fn log_failure(method: &str, e: &RpcError) {
    match e.kind {
        ErrorKind::InvalidResponse | ErrorKind::InternalError | ErrorKind::SchemaError => {
            tracing::error!(method, code = e.code(), error = %e.message, "call failed");
        }
        _ => {
            tracing::debug!(method, code = e.code(), error = %e.message, "call rejected");
        }
    }
}
