//! Ordered JSON object codec.
//!
//! The protected header is an ordered map whose JSON form must reject
//! duplicate keys outright, so plain `serde_json::Value` parsing (which keeps
//! the last duplicate silently) is not usable here. This module parses with a
//! map visitor that records the first duplicate key it sees.

use std::cell::RefCell;
use std::fmt;

use serde::de::{DeserializeSeed, Deserializer, Error as DeError, MapAccess, Visitor};
use serde_json::{Map, Value};

use crate::error::{JoseError, JoseResult};

/// Insertion-ordered JSON object. Requires serde_json's `preserve_order`.
pub type OrderedMap = Map<String, Value>;

struct UniqueObject<'a> {
    duplicate: &'a RefCell<Option<String>>,
}

impl<'de> DeserializeSeed<'de> for UniqueObject<'_> {
    type Value = OrderedMap;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for UniqueObject<'_> {
    type Value = OrderedMap;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = OrderedMap::new();
        while let Some(key) = access.next_key::<String>()? {
            let value = access.next_value::<Value>()?;
            if map.insert(key.clone(), value).is_some() {
                *self.duplicate.borrow_mut() = Some(key);
                return Err(A::Error::custom("duplicate object member"));
            }
        }
        Ok(map)
    }
}

/// Parse a JSON object, preserving member order and rejecting duplicates.
pub fn parse_object(text: &str) -> JoseResult<OrderedMap> {
    let duplicate = RefCell::new(None);
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let seed = UniqueObject {
        duplicate: &duplicate,
    };
    match seed.deserialize(&mut deserializer) {
        Ok(map) => {
            deserializer.end().map_err(JoseError::Json)?;
            Ok(map)
        }
        Err(err) => Err(match duplicate.into_inner() {
            Some(key) => JoseError::DuplicateHeaderKey(key),
            None => JoseError::Json(err),
        }),
    }
}

/// Serialize an ordered object back to its JSON text.
pub fn serialize_object(map: &OrderedMap) -> JoseResult<String> {
    serde_json::to_string(map).map_err(JoseError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_member_order() {
        let map = parse_object(r#"{"zzz":"1","aaa":"2","mmm":"3"}"#).unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zzz", "aaa", "mmm"]);
        assert_eq!(
            serialize_object(&map).unwrap(),
            r#"{"zzz":"1","aaa":"2","mmm":"3"}"#
        );
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = parse_object(r#"{"key":"value","key":"value2"}"#).unwrap_err();
        assert!(matches!(err, JoseError::DuplicateHeaderKey(k) if k == "key"));
    }

    #[test]
    fn rejects_non_objects_and_garbage() {
        assert!(parse_object("[1,2,3]").is_err());
        assert!(parse_object("\"text\"").is_err());
        assert!(parse_object(r#"{"a":"b"} trailing"#).is_err());
    }

    #[test]
    fn nested_duplicates_are_not_our_concern() {
        // Only top-level members are header keys; nested objects pass through
        // as opaque values.
        let map = parse_object(r#"{"jwk":{"kty":"EC","crv":"P-256"}}"#).unwrap();
        assert!(map.get("jwk").is_some());
    }
}
