//! JSON-RPC 2.0 client over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use wirebus_rpc::{Data, Error, ErrorCode, ErrorResponse, Request};

use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::transport::{self, Transport, TransportMiddleware};
use crate::JSONRPC_VERSION;

/// JSON-RPC client.
///
/// Each call is independent and stateless: the client holds no mutable
/// call-scoped state, so calls may run concurrently over the shared
/// transport.
pub struct Client {
    url: Url,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Constructs a client for `endpoint` using a default pooled HTTP
    /// client as transport.
    pub fn new(endpoint: &str) -> Result<Self, Error> {
        Self::with_transport(endpoint, Arc::new(reqwest::Client::new()), &[])
    }

    /// Constructs a client with an explicit transport, wrapped by the given
    /// middleware in argument order.
    pub fn with_transport(
        endpoint: &str,
        transport: Arc<dyn Transport>,
        middleware: &[Arc<dyn TransportMiddleware>],
    ) -> Result<Self, Error> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::Transport(format!("invalid endpoint URL: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Transport(format!(
                "invalid endpoint scheme: {}",
                url.scheme()
            )));
        }

        Ok(Self {
            url,
            transport: transport::apply(transport, middleware),
        })
    }

    async fn do_call(&self, req: &Request) -> Result<Data, Error> {
        let params = req.raw().unwrap_or_else(|| json!({}));

        let body = serde_json::to_vec(&RequestEnvelope {
            jsonrpc: JSONRPC_VERSION,
            id: Value::String("1".into()),
            method: req.method(),
            params,
        })
        .map_err(|e| Error::Transport(format!("failed to compose JSONRPC request: {e}")))?;

        let mut http_req = reqwest::Request::new(Method::POST, self.url.clone());
        http_req
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *http_req.body_mut() = Some(reqwest::Body::from(body));

        debug!(method = %req.method(), url = %self.url, "performing JSONRPC call");

        let http_resp = tokio::select! {
            _ = req.context().cancelled() => {
                return Err(Error::Transport("request cancelled".into()));
            }
            resp = self.transport.execute(http_req) => {
                resp.map_err(|e| Error::Transport(format!("failed to make HTTP request: {e}")))?
            }
        };

        let status = http_resp.status();
        if !status.is_success() {
            return Err(Error::http(
                format!("failed to make HTTP request: response status code {status}"),
                status.as_u16(),
            ));
        }

        let body = http_resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("failed to read HTTP response: {e}")))?;

        let envelope: ResponseEnvelope = serde_json::from_slice(&body).map_err(|e| {
            Error::decoding(
                format!("server response is not a valid JSONRPC message: {e}"),
                body.to_vec(),
            )
        })?;

        if let Some(error) = envelope.error {
            return Err(ErrorResponse::new(
                ErrorCode::from_code(error.code),
                error.message,
                error.data,
            )
            .into());
        }

        Ok(match envelope.result {
            Some(raw) => Data::raw_bytes(raw.get().as_bytes()),
            None => Data::empty(),
        })
    }
}

#[async_trait]
impl wirebus_rpc::Client for Client {
    async fn call(&self, req: Request) -> Result<Data, Error> {
        self.do_call(&req).await
    }
}
