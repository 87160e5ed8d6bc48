use async_trait::async_trait;

use crate::data::Data;
use crate::error::Error;
use crate::request::Request;

/// Capability to issue calls to an RPC endpoint.
///
/// Implementations may call a remote server over a wire protocol or dispatch
/// in-process; either way the caller receives a data container with the call
/// result, or an error when the call failed or the server rejected it.
#[async_trait]
pub trait Client: Send + Sync {
    async fn call(&self, req: Request) -> Result<Data, Error>;
}
