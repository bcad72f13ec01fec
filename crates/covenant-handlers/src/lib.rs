//! covenant-handlers
//!
//! Serving layer for Covenant contracts:
//! - `Handler` trait for application code (closures included)
//! - `HandlerRegistry` binding contract functions to handlers
//! - `Server`: decode, resolve, validate, invoke, validate, encode
//! - `ServerConfig` with explicit limits and toggles

pub mod config;
pub mod handler;
pub mod method;
pub mod registry;
pub mod server;

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::{validate_config, ServerConfig};
    pub use crate::handler::{fallible, Handler};
    pub use crate::method::MethodId;
    pub use crate::registry::HandlerRegistry;
    pub use crate::server::{Server, INTROSPECTION_METHOD};
}
