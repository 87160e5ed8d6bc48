//! # Transport-agnostic RPC core
//!
//! This crate provides the building blocks for RPC services without tying
//! them to any wire format or transport:
//!
//! - a structured error taxonomy with retry classification ([`error`])
//! - an untyped parameter/result container with typed binding ([`data`])
//! - a request object coupling method name, context and parameters
//!   ([`request`])
//! - handler and middleware composition with a defined evaluation order
//!   ([`handler`])
//! - a service router dispatching on `"service.method"` names ([`service`])
//! - a client capability for issuing calls ([`client`])
//!
//! Concrete wire protocols (such as JSON-RPC 2.0 over HTTP) live in sibling
//! crates and consume these types.

pub mod client;
pub mod data;
pub mod error;
pub mod handler;
pub mod request;
pub mod service;

// Re-export main types
pub use client::Client;
pub use data::Data;
pub use error::{Error, ErrorCode, ErrorResponse, should_retry};
pub use handler::{Handler, Middleware, decorate, handler_fn};
pub use request::{Context, Request};
pub use service::{MethodDesc, Service, ServiceDesc};

/// Result alias used throughout the RPC core.
pub type Result<T> = std::result::Result<T, Error>;
