//! HTTP transport abstraction for the JSON-RPC client.

use std::sync::Arc;

use async_trait::async_trait;

/// Performs one HTTP exchange.
///
/// The client never constructs its own network connection; any HTTP client
/// can satisfy this capability. `reqwest::Client` implements it out of the
/// box and is the default.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::execute(self, request).await
    }
}

/// Extends a transport with additional capabilities.
///
/// A transport middleware can simply set an additional header, or perform
/// more complex tasks like fetching an authorization token or adding a
/// caching layer.
pub trait TransportMiddleware: Send + Sync {
    fn wrap(&self, inner: Arc<dyn Transport>) -> Arc<dyn Transport>;
}

/// Applies transport middleware in argument order: each middleware wraps the
/// transport produced by the previous one.
pub(crate) fn apply(
    transport: Arc<dyn Transport>,
    middleware: &[Arc<dyn TransportMiddleware>],
) -> Arc<dyn Transport> {
    let mut transport = transport;
    for mw in middleware {
        transport = mw.wrap(transport);
    }

    transport
}
