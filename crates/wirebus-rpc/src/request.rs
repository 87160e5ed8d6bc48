use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::data::Data;
use crate::error::Error;

/// Execution context carried by a request.
///
/// Couples cooperative cancellation with an auxiliary key-value bag. The wire
/// layer stores the envelope `id` in the bag so handlers and middleware can
/// correlate log lines, and so the response writer can echo it back.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: CancellationToken,
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a context carrying an additional key-value pair.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Fetches a value from the auxiliary bag.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Requests cancellation of the call this context is attached to.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes when the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// The underlying cancellation token, for propagating into child tasks.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// An RPC call: a method name, parameters and an execution context.
///
/// Built by the caller (or by the server envelope decoder) for the duration
/// of one call and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    params: Data,
    context: Context,
}

impl Request {
    /// Constructs an RPC request.
    ///
    /// Accepts anything convertible into a [`Data`] container as parameters;
    /// a `Data` value is stored as-is. When no context is provided a default
    /// non-cancelled one is substituted.
    pub fn new(ctx: Option<Context>, method: impl Into<String>, params: impl Into<Data>) -> Self {
        Self {
            method: method.into(),
            params: params.into(),
            context: ctx.unwrap_or_default(),
        }
    }

    /// Constructs an RPC request for JSON encoded parameters.
    ///
    /// Useful when constructing a request straight from wire bytes.
    pub fn new_json(
        ctx: Option<Context>,
        method: impl Into<String>,
        params: impl Into<Vec<u8>>,
    ) -> Self {
        Self::new(ctx, method, Data::raw_bytes(params))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &Data {
        &self.params
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the untyped snapshot of the parameters.
    pub fn raw(&self) -> Option<Value> {
        self.params.raw()
    }

    /// Binds parameters into a typed destination.
    pub fn bind<T: serde::de::DeserializeOwned>(&self, dest: &mut T) -> Result<(), Error> {
        self.params.bind(dest)
    }

    /// Fetches a value from the request context.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.context.value(key)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wraps_params() {
        let req = Request::new(None, "calc.add", json!({"A": 10, "B": 2}));

        assert_eq!(req.method(), "calc.add");
        assert_eq!(req.raw(), Some(json!({"A": 10, "B": 2})));
        assert_eq!(req.to_string(), "calc.add");
    }

    #[test]
    fn test_request_keeps_data_as_is() {
        let req = Request::new(None, "calc.add", Data::raw_bytes(br#"{"A":1}"#.to_vec()));

        assert!(matches!(req.params(), Data::Raw(_)));
    }

    #[test]
    fn test_json_request_binds_lazily() {
        let req = Request::new_json(None, "calc.add", br#"{"A":10,"B":81}"#.to_vec());

        let mut params = std::collections::HashMap::<String, i64>::new();
        req.bind(&mut params).unwrap();

        assert_eq!(params.get("A"), Some(&10));
        assert_eq!(params.get("B"), Some(&81));
    }

    #[test]
    fn test_empty_request_binds_nothing() {
        let req = Request::new(None, "ping", Data::empty());

        let mut dest = json!("untouched");
        req.bind(&mut dest).unwrap();

        assert_eq!(dest, json!("untouched"));
        assert_eq!(req.raw(), None);
    }

    #[test]
    fn test_context_value_bag() {
        let ctx = Context::new().with_value("request-id", json!("req-7"));
        let req = Request::new(Some(ctx), "ping", Data::empty());

        assert_eq!(req.value("request-id"), Some(&json!("req-7")));
        assert_eq!(req.value("missing"), None);
    }

    #[tokio::test]
    async fn test_context_cancellation() {
        let ctx = Context::new();
        assert!(!ctx.is_cancelled());

        ctx.cancel();
        assert!(ctx.is_cancelled());
        ctx.cancelled().await;
    }
}
