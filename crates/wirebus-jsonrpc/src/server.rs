//! JSON-RPC 2.0 HTTP server handler and accept loop.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use wirebus_rpc::{Context, Error, ErrorResponse, Handler, Middleware, Request, decorate};

use crate::envelope::{ErrorObject, ErrorResponseEnvelope, IncomingRequest, ResultResponse};
use crate::{CONTEXT_REQUEST_ID, JSONRPC_VERSION};

/// HTTP-level handler translating between JSON-RPC envelopes and the core
/// handler chain.
///
/// Middleware is applied once at construction; per HTTP request the handler
/// decodes the envelope, invokes the decorated chain, and encodes the result
/// or error back. Per JSON-RPC convention the response status is 200 even
/// for application-level errors; the only exception is a routing miss, which
/// maps to a plain HTTP 404 so the RPC layer can coexist with path-based
/// routing above it.
pub struct JsonRpcHttpHandler {
    handler: Arc<dyn Handler>,
}

impl JsonRpcHttpHandler {
    pub fn new(handler: impl Handler + 'static, middleware: &[Arc<dyn Middleware>]) -> Self {
        Self {
            handler: decorate(Arc::new(handler), middleware),
        }
    }

    /// Handles one HTTP request carrying a JSON-RPC envelope.
    ///
    /// The only failure this can return is an encoding failure while writing
    /// the response, which is not recoverable at this layer and is surfaced
    /// to the caller.
    pub async fn handle<B>(&self, http_req: hyper::Request<B>) -> Result<Response<Full<Bytes>>, Error>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        let body = match http_req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                let err = Error::Transport(format!("failed to read HTTP request: {e}"));
                return self.error_response(&Request::default(), &err);
            }
        };

        let (req, result) = match read_request(Context::new(), &body) {
            Ok(req) => {
                let result = self.handler.handle(req.clone()).await;
                (req, result)
            }
            Err(err) => (Request::default(), Err(err)),
        };

        match result {
            Err(Error::ServiceNotFound(msg)) => {
                debug!(method = %req.method(), %msg, "service not found");
                Ok(Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(Full::new(Bytes::from("404 page not found")))
                    .map_err(|e| Error::Transport(e.to_string()))?)
            }
            Err(err) => self.error_response(&req, &err),
            Ok(value) => self.result_response(&req, value),
        }
    }

    fn result_response(&self, req: &Request, result: Value) -> Result<Response<Full<Bytes>>, Error> {
        let body = serde_json::to_vec(&ResultResponse {
            jsonrpc: JSONRPC_VERSION,
            id: request_id(req),
            result,
        })
        .map_err(|e| Error::Transport(format!("failed to encode response: {e}")))?;

        json_response(body)
    }

    fn error_response(&self, req: &Request, err: &Error) -> Result<Response<Full<Bytes>>, Error> {
        let body = serde_json::to_vec(&ErrorResponseEnvelope {
            jsonrpc: JSONRPC_VERSION,
            id: request_id(req),
            error: error_object(err),
        })
        .map_err(|e| Error::Transport(format!("failed to encode error response: {e}")))?;

        json_response(body)
    }
}

fn json_response(body: Vec<u8>) -> Result<Response<Full<Bytes>>, Error> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .map_err(|e| Error::Transport(e.to_string()))
}

fn request_id(req: &Request) -> Value {
    req.value(CONTEXT_REQUEST_ID).cloned().unwrap_or(Value::Null)
}

/// Maps a handler error onto the wire error object.
///
/// Confirmed error responses keep their code and data verbatim. A decoding
/// failure carries the offending bytes as string data for diagnostics.
/// Everything else is serialized with the generic code and its message only.
fn error_object(err: &Error) -> ErrorObject {
    match err {
        Error::Response(resp) => ErrorObject {
            code: resp.code.code(),
            message: resp.message.clone(),
            data: resp.data.clone(),
        },
        Error::Decoding { message, raw } => ErrorObject {
            code: wirebus_rpc::ErrorCode::Generic.code(),
            message: message.clone(),
            data: Some(Value::String(String::from_utf8_lossy(raw).into_owned())),
        },
        other => ErrorObject {
            code: wirebus_rpc::ErrorCode::Generic.code(),
            message: other.to_string(),
            data: None,
        },
    }
}

/// Decodes the request envelope and constructs the core request.
///
/// The envelope `id` is stored in the request context so handlers can
/// correlate log lines and the response writer can echo it back.
fn read_request(ctx: Context, body: &[u8]) -> Result<Request, Error> {
    let envelope: IncomingRequest = serde_json::from_slice(body).map_err(|e| {
        ErrorResponse::parse(
            format!("Parse error: {e}"),
            Some(Value::String(String::from_utf8_lossy(body).into_owned())),
        )
    })?;

    if envelope.jsonrpc != JSONRPC_VERSION {
        return Err(
            ErrorResponse::invalid_request("JSONRPC version should be exactly 2.0", None).into(),
        );
    }

    if envelope.method.is_empty() {
        return Err(ErrorResponse::invalid_request("RPC method name can not be empty", None).into());
    }

    let ctx = ctx.with_value(CONTEXT_REQUEST_ID, envelope.id);

    Ok(match envelope.params {
        Some(raw) => Request::new_json(Some(ctx), envelope.method, raw.get().as_bytes()),
        None => Request::new(Some(ctx), envelope.method, wirebus_rpc::Data::empty()),
    })
}

/// Configuration for the HTTP RPC server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".parse().expect("valid default address"),
        }
    }
}

/// A minimal http1 server serving a [`JsonRpcHttpHandler`].
pub struct HttpRpcServer {
    config: ServerConfig,
    handler: Arc<JsonRpcHttpHandler>,
    listener: Option<TcpListener>,
}

impl HttpRpcServer {
    pub fn new(config: ServerConfig, handler: JsonRpcHttpHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
            listener: None,
        }
    }

    /// Binds the configured address. Separate from [`run`](Self::run) so
    /// callers can bind port 0 and read back the assigned address.
    pub async fn bind(&mut self) -> Result<(), Error> {
        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| Error::Transport(format!("failed to bind {}: {e}", self.config.bind_address)))?;

        let addr = listener
            .local_addr()
            .map_err(|e| Error::Transport(e.to_string()))?;
        info!(address = %addr, "JSONRPC server listening");
        self.listener = Some(listener);

        Ok(())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Accept loop. Runs until the task is dropped or the listener fails.
    pub async fn run(&mut self) -> Result<(), Error> {
        if self.listener.is_none() {
            self.bind().await?;
        }
        let listener = self.listener.take().expect("listener bound above");

        loop {
            let (stream, peer) = listener
                .accept()
                .await
                .map_err(|e| Error::Transport(format!("accept failed: {e}")))?;

            debug!(%peer, "accepted connection");

            let handler = self.handler.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let handler = handler.clone();
                    async move {
                        match handler.handle(req).await {
                            Ok(resp) => Ok::<_, std::convert::Infallible>(resp),
                            Err(err) => {
                                error!(%err, "failed to write JSONRPC response");
                                Ok(Response::builder()
                                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                                    .body(Full::new(Bytes::new()))
                                    .expect("static response"))
                            }
                        }
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(%err, "connection error");
                }
            });
        }
    }
}
