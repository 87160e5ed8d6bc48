use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, ErrorResponse};
use crate::handler::Handler;
use crate::request::Request;

/// Describes a service: a name and the methods it exposes.
#[derive(Default)]
pub struct ServiceDesc {
    pub service_name: String,
    pub methods: Vec<MethodDesc>,
}

impl ServiceDesc {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method_name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.methods.push(MethodDesc {
            method_name: method_name.into(),
            handler: Arc::new(handler),
        });
        self
    }
}

/// Describes a single method of a service.
pub struct MethodDesc {
    pub method_name: String,
    pub handler: Arc<dyn Handler>,
}

/// A [`Handler`] which routes requests by `"service.method"` name.
///
/// Service descriptors provide the mapping between method names and method
/// handlers; the map is built once at construction and treated as read-only
/// for the lifetime of the server, so lookups need no locking.
pub struct Service {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl Service {
    /// Builds the routing handler from service descriptors.
    ///
    /// Duplicate `"service.method"` keys are resolved last-wins; the
    /// overwrite is logged since it almost always indicates a registration
    /// mistake.
    pub fn new(descriptors: impl IntoIterator<Item = ServiceDesc>) -> Self {
        let mut handlers: HashMap<String, Arc<dyn Handler>> = HashMap::new();

        for desc in descriptors {
            for method in desc.methods {
                let key = format!("{}.{}", desc.service_name, method.method_name);
                if handlers.insert(key.clone(), method.handler).is_some() {
                    warn!(method = %key, "duplicate method registration, later handler wins");
                }
            }
        }

        Self { handlers }
    }
}

#[async_trait]
impl Handler for Service {
    async fn handle(&self, req: Request) -> Result<Value, Error> {
        match self.handlers.get(req.method()) {
            Some(handler) => handler.handle(req).await,
            None => Err(ErrorResponse::method_not_found(
                format!("Method \"{}\" is not defined", req.method()),
                None,
            )
            .into()),
        }
    }
}
