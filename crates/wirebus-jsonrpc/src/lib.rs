//! # JSON-RPC 2.0 wire implementation
//!
//! Concrete wire layer for the `wirebus-rpc` core:
//!
//! - [`Client`] marshals a request into a JSON-RPC 2.0 envelope, performs one
//!   HTTP exchange through an injected [`Transport`], and maps the response
//!   envelope back onto the core error taxonomy.
//! - [`JsonRpcHttpHandler`] decodes an incoming HTTP request into a core
//!   `Request`, runs it through a middleware-decorated handler chain, and
//!   encodes the result or error back into the wire envelope.
//! - [`HttpRpcServer`] is a small http1 accept loop for serving the handler.
//!
//! Per JSON-RPC convention the server replies HTTP 200 even for
//! application-level errors; the only exception is a routing miss signalled
//! with `Error::ServiceNotFound`, which becomes a plain HTTP 404.

pub mod client;
pub mod envelope;
pub mod server;
pub mod transport;

pub use client::Client;
pub use server::{HttpRpcServer, JsonRpcHttpHandler, ServerConfig};
pub use transport::{Transport, TransportMiddleware};

/// JSON-RPC 2.0 version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// Context key under which the server stores the request envelope `id`.
pub const CONTEXT_REQUEST_ID: &str = "request-id";
