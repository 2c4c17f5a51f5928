//! Values a cache provider can hold.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::CacheError;

/// A cacheable value: an opaque blob, or a JSON-like structure.
///
/// Scalars (strings, numbers, booleans, null) travel as [`CacheValue::Json`].
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// Maps, sequences, strings, numbers, booleans or null.
    Json(Value),
}

impl CacheValue {
    /// Encode any serializable value as JSON.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, CacheError> {
        Ok(CacheValue::Json(serde_json::to_value(value)?))
    }

    /// Decode into a concrete type.
    ///
    /// Blobs decode only into byte-sequence types such as `Vec<u8>`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, CacheError> {
        let json = match self {
            CacheValue::Json(json) => json,
            CacheValue::Bytes(bytes) => Value::from(bytes),
        };
        Ok(serde_json::from_value(json)?)
    }

    /// True for a stored JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, CacheValue::Json(Value::Null))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            CacheValue::Json(json) => Some(json),
            CacheValue::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CacheValue::Bytes(bytes) => Some(bytes),
            CacheValue::Json(_) => None,
        }
    }
}

impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        CacheValue::Json(value)
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(bytes: Vec<u8>) -> Self {
        CacheValue::Bytes(bytes)
    }
}

impl From<&str> for CacheValue {
    fn from(s: &str) -> Self {
        CacheValue::Json(Value::from(s))
    }
}

impl From<String> for CacheValue {
    fn from(s: String) -> Self {
        CacheValue::Json(Value::from(s))
    }
}

impl From<i64> for CacheValue {
    fn from(n: i64) -> Self {
        CacheValue::Json(Value::from(n))
    }
}

impl From<f64> for CacheValue {
    fn from(n: f64) -> Self {
        CacheValue::Json(Value::from(n))
    }
}

impl From<bool> for CacheValue {
    fn from(b: bool) -> Self {
        CacheValue::Json(Value::from(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_are_json() {
        assert_eq!(CacheValue::from(5i64), CacheValue::Json(json!(5)));
        assert_eq!(CacheValue::from("L123"), CacheValue::Json(json!("L123")));
        assert_eq!(CacheValue::from(true), CacheValue::Json(json!(true)));
    }

    #[test]
    fn test_decode_struct() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Hotspot {
            loc_id: String,
            species: u32,
        }

        let value = CacheValue::from(json!({"loc_id": "L99", "species": 212}));
        let hotspot: Hotspot = value.decode().unwrap();
        assert_eq!(hotspot.loc_id, "L99");
        assert_eq!(hotspot.species, 212);
    }

    #[test]
    fn test_decode_bytes() {
        let value = CacheValue::from(vec![1u8, 2, 3]);
        let bytes: Vec<u8> = value.decode().unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_type_mismatch() {
        let value = CacheValue::from("not a number");
        let result = value.decode::<u64>();
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_is_null() {
        assert!(CacheValue::Json(Value::Null).is_null());
        assert!(!CacheValue::from(0i64).is_null());
        assert!(!CacheValue::Bytes(Vec::new()).is_null());
    }
}
