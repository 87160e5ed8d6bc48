use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, ErrorResponse};

/// Container for a value which is not yet bound to a concrete type.
///
/// It represents request parameters and call results at the boundary where
/// concrete types are not known ahead of time. The structured variant holds
/// an already-decoded value; the raw variant holds undecoded JSON bytes which
/// are deserialized lazily on every [`bind`](Data::bind) call.
#[derive(Debug, Clone, Default)]
pub enum Data {
    /// No underlying value. Binding is a no-op and [`raw`](Data::raw)
    /// returns `None`.
    #[default]
    Empty,
    /// An already-decoded value.
    Structured(Value),
    /// Undecoded JSON bytes.
    Raw(Vec<u8>),
}

impl Data {
    /// Creates a data object from any serializable value.
    ///
    /// Fails with an internal error when the value cannot be represented as
    /// JSON (e.g. a map with non-string keys).
    pub fn structured<T: Serialize>(value: T) -> Result<Self, Error> {
        let value = serde_json::to_value(value)
            .map_err(|e| ErrorResponse::internal(format!("Value is not serializable: {e}"), None))?;
        Ok(Data::Structured(value))
    }

    /// Creates a data object from a raw JSON message.
    pub fn raw_bytes(raw: impl Into<Vec<u8>>) -> Self {
        Data::Raw(raw.into())
    }

    pub fn empty() -> Self {
        Data::Empty
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Data::Empty)
    }

    /// Binds the contained value into `dest`.
    ///
    /// An empty container leaves `dest` unchanged. Structured values are
    /// decoded from their JSON representation, so numeric widening across
    /// compatible kinds succeeds while kind mismatches fail with an
    /// invalid-params error. Raw bytes are deserialized on every call, with
    /// decode failures also mapped to invalid-params.
    pub fn bind<T: DeserializeOwned>(&self, dest: &mut T) -> Result<(), Error> {
        match self {
            Data::Empty => Ok(()),
            Data::Structured(value) => {
                *dest = serde_json::from_value(value.clone()).map_err(|e| {
                    ErrorResponse::invalid_params(format!("Value is not assignable: {e}"), None)
                })?;
                Ok(())
            }
            Data::Raw(bytes) => {
                *dest = serde_json::from_slice(bytes).map_err(|e| {
                    ErrorResponse::invalid_params(format!("Parameters are malformed: {e}"), None)
                })?;
                Ok(())
            }
        }
    }

    /// Returns a decoded, untyped snapshot of the contained value.
    ///
    /// Raw bytes which fail to decode yield `None`; this is only used for
    /// outbound marshalling where the value is assumed well-formed, and the
    /// degradation is covered by a test rather than left implicit.
    pub fn raw(&self) -> Option<Value> {
        match self {
            Data::Empty => None,
            Data::Structured(value) => Some(value.clone()),
            Data::Raw(bytes) => serde_json::from_slice(bytes).ok(),
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Data::Structured(value)
    }
}

impl From<Vec<u8>> for Data {
    fn from(raw: Vec<u8>) -> Self {
        Data::Raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct TestPayload {
        id: String,
        params: HashMap<String, String>,
    }

    #[test]
    fn test_binding() {
        let given = TestPayload {
            id: "bazzinga".into(),
            params: HashMap::from([("f".into(), "foo".into()), ("q".into(), "qux".into())]),
        };

        let data = Data::structured(&given).unwrap();

        let mut payload = TestPayload::default();
        data.bind(&mut payload).unwrap();

        assert_eq!(payload, given);
    }

    #[test]
    fn test_binding_widens_numeric_kinds() {
        let data = Data::structured(19i32).unwrap();

        let mut payload: i64 = 0;
        data.bind(&mut payload).unwrap();

        assert_eq!(payload, 19);
    }

    #[test]
    fn test_binding_type_mismatch() {
        let data = Data::structured("boom").unwrap();

        let mut payload: i64 = 0;
        let err = data.bind(&mut payload).unwrap_err();

        let resp = err.as_response().expect("should be an error response");
        assert_eq!(resp.code, ErrorCode::InvalidParams);
    }

    #[test]
    fn test_binding_raw_is_lazy() {
        let data = Data::raw_bytes(br#"{"id":"one","params":{}}"#.to_vec());

        // repeated binds re-deserialize, both must see the same value
        for _ in 0..2 {
            let mut payload = TestPayload::default();
            data.bind(&mut payload).unwrap();
            assert_eq!(payload.id, "one");
        }
    }

    #[test]
    fn test_binding_malformed_raw() {
        let data = Data::raw_bytes(b"{not json".to_vec());

        let mut payload = TestPayload::default();
        let err = data.bind(&mut payload).unwrap_err();

        let resp = err.as_response().expect("should be an error response");
        assert_eq!(resp.code, ErrorCode::InvalidParams);
    }

    #[test]
    fn test_empty_bind_is_noop() {
        let data = Data::empty();

        let mut payload: i64 = 42;
        data.bind(&mut payload).unwrap();

        assert_eq!(payload, 42, "empty data must leave destination unchanged");
        assert_eq!(data.raw(), None);
    }

    #[test]
    fn test_raw_snapshot() {
        let data = Data::structured(json!({"a": 1})).unwrap();
        assert_eq!(data.raw(), Some(json!({"a": 1})));

        let data = Data::raw_bytes(br#"[1,2,3]"#.to_vec());
        assert_eq!(data.raw(), Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_raw_swallows_decode_failures() {
        let data = Data::raw_bytes(b"{not json".to_vec());
        assert_eq!(data.raw(), None);
    }
}
