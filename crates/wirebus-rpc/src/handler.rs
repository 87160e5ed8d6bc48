use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::Error;
use crate::request::Request;

/// Handles an RPC request and returns a result or an error.
///
/// This is the unit of business logic on the server side: the wire layer
/// decodes an incoming envelope into a [`Request`] and hands it to a handler.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, req: Request) -> Result<Value, Error>;
}

#[async_trait]
impl Handler for Arc<dyn Handler> {
    async fn handle(&self, req: Request) -> Result<Value, Error> {
        self.as_ref().handle(req).await
    }
}

/// An RPC handler described as a function.
///
/// Useful when defining handler logic inline without a dedicated type:
///
/// ```rust
/// use wirebus_rpc::{handler_fn, Request};
/// use serde_json::json;
///
/// let handler = handler_fn(|req: Request| {
///     Box::pin(async move { Ok(json!(req.method())) })
/// });
/// ```
pub struct HandlerFn<F>(F)
where
    F: Fn(Request) -> BoxFuture<'static, Result<Value, Error>> + Send + Sync;

/// Wraps a function into a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> BoxFuture<'static, Result<Value, Error>> + Send + Sync,
{
    HandlerFn(f)
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(Request) -> BoxFuture<'static, Result<Value, Error>> + Send + Sync,
{
    async fn handle(&self, req: Request) -> Result<Value, Error> {
        (self.0)(req).await
    }
}

/// Extends a handler with additional capabilities.
///
/// Middleware can execute code before or after the wrapped handler, or
/// short-circuit the request entirely, e.g. an authorization middleware
/// rejecting a call before the business logic runs.
pub trait Middleware: Send + Sync {
    fn wrap(&self, inner: Arc<dyn Handler>) -> Arc<dyn Handler>;
}

/// Extends a handler by wrapping it into middleware.
///
/// Each middleware in the list wraps the handler produced by the previous
/// step, so middleware executes in reversed list order: the last one is the
/// outermost wrapper and runs first at call time.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use wirebus_rpc::{decorate, Middleware};
/// # fn middlewares(h: Arc<dyn wirebus_rpc::Handler>, metrics: Arc<dyn Middleware>, auth: Arc<dyn Middleware>) {
/// // auth runs before metrics, metrics runs before the handler
/// let handler = decorate(h, &[metrics, auth]);
/// # }
/// ```
pub fn decorate(handler: Arc<dyn Handler>, middleware: &[Arc<dyn Middleware>]) -> Arc<dyn Handler> {
    let mut handler = handler;
    for mw in middleware {
        handler = mw.wrap(handler);
    }

    handler
}
