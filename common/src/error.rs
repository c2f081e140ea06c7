//! Workspace-wide error handling.
//!
//! Every fallible operation in the workspace reports one of the variants
//! below. Nothing is retried internally; callers decide whether a failure is
//! fatal. Note that a cryptographically rejected signature is *not* an error:
//! `verify` returns `Ok(false)` for that case and reserves `Err` for inputs
//! that could not even be processed.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type JoseResult<T> = Result<T, JoseError>;

/// Errors produced by the JOSE signing core.
#[derive(Debug, Error)]
pub enum JoseError {
    /// The supplied key does not match the algorithm's declared key kind,
    /// curve, or public/private role.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The supplied key is structurally valid but below the algorithm's
    /// minimum strength.
    #[error("weak key: {0}")]
    WeakKey(String),

    /// Signature bytes could not be structurally parsed or re-encoded.
    #[error("malformed signature encoding: {0}")]
    SignatureFormat(String),

    /// A named backend provider could not be resolved for an operation.
    #[error("no provider named {provider:?} is available for {operation}")]
    ProviderSelection {
        /// The operation the provider was requested for.
        operation: String,
        /// The provider name that could not be resolved.
        provider: String,
    },

    /// Key derivation could not be performed with the requested parameters.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// An algorithm identifier was rejected by the active constraints.
    #[error("algorithm {identifier:?} is not permitted by the active constraints")]
    DisallowedAlgorithm {
        /// The rejected algorithm identifier.
        identifier: String,
    },

    /// An algorithm identifier has no registered implementation.
    #[error("no algorithm registered for identifier {0:?}")]
    UnknownAlgorithm(String),

    /// The protected header carries no `alg` value.
    #[error("the protected header has no algorithm (alg) value")]
    MissingAlgorithmHeader,

    /// A header key appeared more than once in the parsed JSON.
    #[error("duplicate header key {0:?}")]
    DuplicateHeaderKey(String),

    /// A header value was a JSON array, which the flat header model rejects.
    #[error("header {0:?} has an array value, which is not permitted")]
    UnexpectedArrayValue(String),

    /// A header value had an unusable JSON type for the requested accessor.
    #[error("header {0:?} does not have the expected value type")]
    InvalidHeaderValue(String),

    /// A compact serialization part that must carry content was empty.
    #[error("part {index} of the compact serialization is empty")]
    EmptyPart {
        /// Zero-based index of the offending part.
        index: usize,
    },

    /// A compact serialization had the wrong overall structure.
    #[error("malformed compact serialization: {0}")]
    CompactSerialization(String),

    /// Base64url decoding failed.
    #[error("base64url decoding failed: {0}")]
    Base64(String),

    /// JSON (de)serialization failed.
    #[error("JSON processing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend signing primitive reported a failure.
    #[error("signing operation failed: {0}")]
    Signing(String),

    /// No key-resolution strategy produced a verification key.
    #[error("unable to resolve a key: {0}")]
    UnresolvableKey(String),
}

impl JoseError {
    /// Create an invalid key error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        JoseError::InvalidKey(message.into())
    }

    /// Create a weak key error.
    #[must_use]
    pub fn weak_key(message: impl Into<String>) -> Self {
        JoseError::WeakKey(message.into())
    }

    /// Create a malformed signature encoding error.
    #[must_use]
    pub fn signature_format(message: impl Into<String>) -> Self {
        JoseError::SignatureFormat(message.into())
    }

    /// Create a provider selection error.
    #[must_use]
    pub fn provider_selection(
        operation: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        JoseError::ProviderSelection {
            operation: operation.into(),
            provider: provider.into(),
        }
    }

    /// Create a key derivation error.
    #[must_use]
    pub fn key_derivation(message: impl Into<String>) -> Self {
        JoseError::KeyDerivation(message.into())
    }

    /// Create a signing failure error.
    #[must_use]
    pub fn signing(message: impl Into<String>) -> Self {
        JoseError::Signing(message.into())
    }

    /// Create an unresolvable key error.
    #[must_use]
    pub fn unresolvable_key(message: impl Into<String>) -> Self {
        JoseError::UnresolvableKey(message.into())
    }
}
