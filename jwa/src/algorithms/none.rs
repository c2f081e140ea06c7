//! The unsecured `none` algorithm.
//!
//! Deliberately inert: it is only valid with no key and a zero-length
//! signature, and registries are expected to let deployments block it
//! outright (see `AlgorithmConstraints`) as a defense against
//! signature-stripping.

use quill_common::{JoseError, JoseResult};

use crate::algorithms::{identifiers, SignatureAlgorithm};
use crate::keys::{JoseKey, KeyKind};
use crate::provider::ProviderContext;

/// The unsecured (plaintext) algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneAlgorithm;

impl NoneAlgorithm {
    /// The `none` algorithm value.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        match key {
            None => Ok(()),
            Some(key) => Err(JoseError::invalid_key(format!(
                "the none algorithm must not be used with a key, but a {} was supplied",
                key.description()
            ))),
        }
    }
}

impl SignatureAlgorithm for NoneAlgorithm {
    fn algorithm_identifier(&self) -> &str {
        identifiers::NONE
    }

    fn key_kind(&self) -> KeyKind {
        KeyKind::None
    }

    fn validate_signing_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        self.check_key(key)
    }

    fn validate_verification_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        self.check_key(key)
    }

    fn sign(
        &self,
        key: Option<&JoseKey>,
        _secured_input: &[u8],
        _context: &ProviderContext,
    ) -> JoseResult<Vec<u8>> {
        self.check_key(key)?;
        Ok(Vec::new())
    }

    fn verify(
        &self,
        signature: &[u8],
        key: Option<&JoseKey>,
        _secured_input: &[u8],
        _context: &ProviderContext,
    ) -> JoseResult<bool> {
        self.check_key(key)?;
        if !signature.is_empty() {
            return Err(JoseError::invalid_key(
                "the none algorithm takes a zero-length signature",
            ));
        }
        Ok(true)
    }
}
