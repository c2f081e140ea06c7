//! The JWS protocol object.
//!
//! A `JsonWebSignature` owns its header set, payload, and signature bytes.
//! Keys are never owned: the caller supplies one per sign or verify call
//! and keeps it. The secured input is always
//! `base64url(header) || "." || base64url(payload)`, recomputed on every
//! call, and a verification result is never cached.

use std::borrow::Cow;

use quill_common::{base64url, JoseError, JoseResult};
use quill_jwa::registry::{AlgorithmConstraints, AlgorithmRegistry};
use quill_jwa::{JoseKey, ProviderContext, SignatureAlgorithm};

use crate::compact;
use crate::headers::{header_names, Headers};

/// A signed (or to-be-signed) compact message.
#[derive(Debug, Default, Clone)]
pub struct JsonWebSignature {
    headers: Headers,
    payload: Option<Vec<u8>>,
    signature: Option<Vec<u8>>,
}

impl JsonWebSignature {
    /// An empty message: set headers and payload, then sign.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a received compact serialization.
    ///
    /// Requires exactly three parts. The payload part may be empty, which
    /// yields a detached-payload message whose payload must be supplied via
    /// [`set_payload_bytes`](Self::set_payload_bytes) before verification.
    pub fn from_compact_serialization(text: &str) -> JoseResult<Self> {
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 3 {
            return Err(JoseError::CompactSerialization(format!(
                "a JWS compact serialization must have 3 parts, not {}",
                parts.len()
            )));
        }
        if parts[0].is_empty() {
            return Err(JoseError::EmptyPart { index: 0 });
        }
        let headers = Headers::parse_encoded(parts[0])?;
        let payload = if parts[1].is_empty() {
            None
        } else {
            Some(base64url::decode(parts[1])?)
        };
        let signature = base64url::decode(parts[2])?;
        Ok(Self {
            headers,
            payload,
            signature: Some(signature),
        })
    }

    /// Replace this message's state with a parsed compact serialization.
    pub fn set_compact_serialization(&mut self, text: &str) -> JoseResult<()> {
        *self = Self::from_compact_serialization(text)?;
        Ok(())
    }

    /// The header set.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the header set. Any mutation invalidates a
    /// previously produced signature, so the signature bytes are dropped.
    pub fn headers_mut(&mut self) -> &mut Headers {
        self.signature = None;
        &mut self.headers
    }

    /// Set the payload from text.
    pub fn set_payload(&mut self, payload: impl Into<String>) {
        self.set_payload_bytes(payload.into().into_bytes());
    }

    /// Set the payload from raw bytes.
    pub fn set_payload_bytes(&mut self, payload: impl Into<Vec<u8>>) {
        self.payload = Some(payload.into());
        self.signature = None;
    }

    /// The payload bytes, if present.
    #[must_use]
    pub fn payload_bytes(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// The payload as text (lossy for non-UTF-8 content).
    #[must_use]
    pub fn payload_str(&self) -> Option<Cow<'_, str>> {
        self.payload.as_deref().map(String::from_utf8_lossy)
    }

    /// Whether this message was parsed without its payload.
    #[must_use]
    pub fn is_payload_detached(&self) -> bool {
        self.payload.is_none() && self.signature.is_some()
    }

    /// Set the `alg` header.
    pub fn set_algorithm_header_value(&mut self, identifier: impl Into<String>) {
        self.signature = None;
        self.headers
            .set_header(header_names::ALGORITHM, identifier.into());
    }

    /// The `alg` header.
    pub fn algorithm_header_value(&self) -> JoseResult<Option<&str>> {
        self.headers.string_header_value(header_names::ALGORITHM)
    }

    /// Set the `kid` header.
    pub fn set_key_id_header_value(&mut self, key_id: impl Into<String>) {
        self.signature = None;
        self.headers.set_header(header_names::KEY_ID, key_id.into());
    }

    /// The `kid` header.
    pub fn key_id_header_value(&self) -> JoseResult<Option<&str>> {
        self.headers.string_header_value(header_names::KEY_ID)
    }

    /// The `x5t` (SHA-1 certificate thumbprint) header.
    pub fn x509_thumbprint_header_value(&self) -> JoseResult<Option<&str>> {
        self.headers
            .string_header_value(header_names::X509_CERTIFICATE_THUMBPRINT)
    }

    /// The `x5t#S256` (SHA-256 certificate thumbprint) header.
    pub fn x509_sha256_thumbprint_header_value(&self) -> JoseResult<Option<&str>> {
        self.headers
            .string_header_value(header_names::X509_CERTIFICATE_SHA256_THUMBPRINT)
    }

    /// The signature bytes, once signed or parsed.
    #[must_use]
    pub fn signature_bytes(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// The exact bytes that are signed and verified:
    /// `base64url(header) || "." || base64url(payload)`.
    ///
    /// Recomputed on every call; nothing here survives a mutation.
    pub fn signing_input(&self) -> JoseResult<Vec<u8>> {
        let payload = self.payload.as_deref().ok_or_else(|| {
            JoseError::signing("the message has no payload; attach one before signing or verifying")
        })?;
        let mut input = String::new();
        input.push_str(&self.headers.as_encoded()?);
        input.push('.');
        input.push_str(&base64url::encode(payload));
        Ok(input.into_bytes())
    }

    /// Sign the message with the algorithm named by its `alg` header.
    ///
    /// The key is borrowed for this call only.
    pub fn sign(
        &mut self,
        key: Option<&JoseKey>,
        registry: &AlgorithmRegistry,
        context: &ProviderContext,
    ) -> JoseResult<()> {
        let algorithm = self.resolve_algorithm(registry)?;
        algorithm.validate_signing_key(key)?;
        let secured_input = self.signing_input()?;
        let signature = algorithm.sign(key, &secured_input, context)?;
        self.signature = Some(signature);
        Ok(())
    }

    /// The compact serialization, signing first if not yet signed.
    pub fn compact_serialization(
        &mut self,
        key: Option<&JoseKey>,
        registry: &AlgorithmRegistry,
        context: &ProviderContext,
    ) -> JoseResult<String> {
        if self.signature.is_none() {
            self.sign(key, registry, context)?;
        }
        let header = self.headers.as_encoded()?;
        let payload = self.payload.as_deref().map(base64url::encode).ok_or_else(
            || JoseError::signing("the message has no payload to serialize"),
        )?;
        let signature = self
            .signature
            .as_deref()
            .map(base64url::encode)
            .unwrap_or_default();
        compact::serialize(&[
            Some(header.as_str()),
            Some(payload.as_str()),
            Some(signature.as_str()),
        ])
    }

    /// The detached-payload compact serialization
    /// (`base64url(header) ".." base64url(signature)`), signing first if
    /// not yet signed.
    pub fn detached_compact_serialization(
        &mut self,
        key: Option<&JoseKey>,
        registry: &AlgorithmRegistry,
        context: &ProviderContext,
    ) -> JoseResult<String> {
        if self.signature.is_none() {
            self.sign(key, registry, context)?;
        }
        let header = self.headers.as_encoded()?;
        let signature = self
            .signature
            .as_deref()
            .map(base64url::encode)
            .unwrap_or_default();
        // The generic serializer refuses empty interior parts; the detached
        // form is assembled directly.
        Ok(format!("{header}..{signature}"))
    }

    /// Verify the signature with the algorithm named by the `alg` header.
    ///
    /// Constraint checking happens before anything else; a disallowed
    /// algorithm never reaches the crypto. `Ok(false)` is a normal
    /// cryptographic rejection, errors mean the message could not be
    /// processed at all.
    pub fn verify_signature(
        &self,
        key: Option<&JoseKey>,
        registry: &AlgorithmRegistry,
        context: &ProviderContext,
        constraints: &AlgorithmConstraints,
    ) -> JoseResult<bool> {
        let identifier = self
            .algorithm_header_value()?
            .ok_or(JoseError::MissingAlgorithmHeader)?;
        constraints.check(identifier)?;
        let algorithm = registry
            .get(identifier)
            .ok_or_else(|| JoseError::UnknownAlgorithm(identifier.to_string()))?;
        algorithm.validate_verification_key(key)?;
        let signature = self.signature.as_deref().ok_or_else(|| {
            JoseError::signing("the message has no signature to verify")
        })?;
        let secured_input = self.signing_input()?;
        algorithm.verify(signature, key, &secured_input, context)
    }

    fn resolve_algorithm(
        &self,
        registry: &AlgorithmRegistry,
    ) -> JoseResult<std::sync::Arc<dyn SignatureAlgorithm>> {
        let identifier = self
            .algorithm_header_value()?
            .ok_or(JoseError::MissingAlgorithmHeader)?;
        registry
            .get(identifier)
            .ok_or_else(|| JoseError::UnknownAlgorithm(identifier.to_string()))
    }
}
