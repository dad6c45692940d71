//! Document encoding shared by every backend.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// A stored record: one JSON object addressed by one key.
pub type Document = Map<String, Value>;

/// Encode a document as pretty-printed JSON.
pub fn encode(document: &Document) -> StoreResult<Vec<u8>> {
    serde_json::to_vec_pretty(document).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode stored bytes, reporting anything but a JSON object as corrupt.
pub fn decode(path: &Path, bytes: &[u8]) -> StoreResult<Document> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(document) => Ok(document),
        other => Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("expected a JSON object, found {}", json_type(&other)),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn encode_then_decode() {
        let original = doc(json!({"UserId": 42, "Gold": 100, "Items": ["a", "b"]}));
        let bytes = encode(&original).unwrap();
        assert_eq!(decode(Path::new("p.json"), &bytes).unwrap(), original);
    }

    #[test]
    fn encode_is_pretty() {
        let bytes = encode(&doc(json!({"a": 1}))).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let err = decode(Path::new("p.json"), b"{\"UserId\": 4").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn non_object_is_corrupt() {
        for bytes in [&b"[1,2]"[..], b"null", b"7", b"\"x\""] {
            let err = decode(Path::new("p.json"), bytes).unwrap_err();
            assert!(matches!(err, StoreError::Corrupt { .. }));
        }
    }
}
