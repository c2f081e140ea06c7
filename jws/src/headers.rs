//! The protected-header model.
//!
//! An insertion-ordered map of header names to values, with the JSON text
//! and its base64url encoding cached together and invalidated together on
//! every mutation. Parsing rejects duplicate names outright and refuses
//! array values; headers in this model are flat maps of strings (plus
//! structured values for JWK-shaped members).
//!
//! When a header set is parsed from a received encoding, that exact encoding
//! stays cached, so the secured input recomputed for verification matches
//! the bytes the sender actually signed even when our own serialization of
//! the same map would differ.

use std::sync::OnceLock;

use serde_json::Value;

use quill_common::json::{self, OrderedMap};
use quill_common::{base64url, JoseError, JoseResult};

/// Reserved header names.
pub mod header_names {
    /// Algorithm.
    pub const ALGORITHM: &str = "alg";
    /// Content-encryption algorithm (JWE).
    pub const ENCRYPTION_METHOD: &str = "enc";
    /// Key id.
    pub const KEY_ID: &str = "kid";
    /// Media type of the complete object.
    pub const TYPE: &str = "typ";
    /// Media type of the secured content.
    pub const CONTENT_TYPE: &str = "cty";
    /// JWK Set URL.
    pub const JWK_SET_URL: &str = "jku";
    /// Public key as a JWK.
    pub const JWK: &str = "jwk";
    /// X.509 URL.
    pub const X509_URL: &str = "x5u";
    /// X.509 certificate SHA-1 thumbprint.
    pub const X509_CERTIFICATE_THUMBPRINT: &str = "x5t";
    /// X.509 certificate SHA-256 thumbprint.
    pub const X509_CERTIFICATE_SHA256_THUMBPRINT: &str = "x5t#S256";
    /// Critical extensions.
    pub const CRITICAL: &str = "crit";
    /// Compression algorithm (JWE).
    pub const ZIP: &str = "zip";
}

/// An ordered, duplicate-rejecting header map with cached encodings.
#[derive(Debug, Default, Clone)]
pub struct Headers {
    map: OrderedMap,
    json_cache: OnceLock<String>,
    encoded_cache: OnceLock<String>,
}

impl Headers {
    /// An empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of headers present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no headers are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Set a string-valued header, invalidating the cached encodings.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.map.insert(name.into(), Value::String(value.into()));
        self.invalidate();
    }

    /// Set a structured header value (for JWK-shaped members).
    ///
    /// # Errors
    ///
    /// Array values are refused; the header model is flat.
    pub fn set_object_header(&mut self, name: impl Into<String>, value: Value) -> JoseResult<()> {
        let name = name.into();
        if value.is_array() {
            return Err(JoseError::UnexpectedArrayValue(name));
        }
        self.map.insert(name, value);
        self.invalidate();
        Ok(())
    }

    /// Remove a header, invalidating the cached encodings.
    pub fn remove_header(&mut self, name: &str) -> Option<Value> {
        let removed = self.map.remove(name);
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }

    /// A string header value.
    ///
    /// Absent headers are `None`; a present header with a non-string value
    /// is an [`JoseError::InvalidHeaderValue`] error.
    pub fn string_header_value(&self, name: &str) -> JoseResult<Option<&str>> {
        match self.map.get(name) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) => Err(JoseError::InvalidHeaderValue(name.to_string())),
        }
    }

    /// A header value of any JSON shape.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    /// Header names in insertion order.
    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// The JSON text of the full header, lazily computed and cached.
    pub fn as_json(&self) -> JoseResult<String> {
        if let Some(json) = self.json_cache.get() {
            return Ok(json.clone());
        }
        let json = json::serialize_object(&self.map)?;
        Ok(self.json_cache.get_or_init(|| json).clone())
    }

    /// The base64url encoding of the UTF-8 JSON, lazily computed and cached.
    pub fn as_encoded(&self) -> JoseResult<String> {
        if let Some(encoded) = self.encoded_cache.get() {
            return Ok(encoded.clone());
        }
        let encoded = base64url::encode_utf8(&self.as_json()?);
        Ok(self.encoded_cache.get_or_init(|| encoded).clone())
    }

    /// Parse header JSON, rejecting duplicate names and array values.
    pub fn parse_json(text: &str) -> JoseResult<Self> {
        let map = json::parse_object(text)?;
        for (name, value) in &map {
            if value.is_array() {
                return Err(JoseError::UnexpectedArrayValue(name.clone()));
            }
        }
        let headers = Self {
            map,
            json_cache: OnceLock::new(),
            encoded_cache: OnceLock::new(),
        };
        let _ = headers.json_cache.set(text.to_string());
        Ok(headers)
    }

    /// Base64url-decode then parse, keeping the received encoding cached.
    pub fn parse_encoded(encoded: &str) -> JoseResult<Self> {
        let text = base64url::decode_utf8(encoded)?;
        let headers = Self::parse_json(&text)?;
        let _ = headers.encoded_cache.set(encoded.to_string());
        Ok(headers)
    }

    fn invalidate(&mut self) {
        self.json_cache = OnceLock::new();
        self.encoded_cache = OnceLock::new();
    }
}
