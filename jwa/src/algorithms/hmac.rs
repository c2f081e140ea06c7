//! HMAC-SHA2 MAC algorithms (HS256, HS384, HS512).

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use quill_common::{bytes, JoseError, JoseResult};

use crate::algorithms::{identifiers, SignatureAlgorithm};
use crate::hash::HashFunction;
use crate::keys::{JoseKey, KeyKind, SymmetricKey};
use crate::provider::{Operation, ProviderContext, RUSTCRYPTO_PROVIDER};

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// HMAC over a SHA-2 digest.
#[derive(Debug, Clone, Copy)]
pub struct HmacShaAlgorithm {
    identifier: &'static str,
    hash: HashFunction,
}

impl HmacShaAlgorithm {
    /// HS256.
    #[must_use]
    pub fn hmac_sha256() -> Self {
        Self {
            identifier: identifiers::HMAC_SHA256,
            hash: HashFunction::Sha256,
        }
    }

    /// HS384.
    #[must_use]
    pub fn hmac_sha384() -> Self {
        Self {
            identifier: identifiers::HMAC_SHA384,
            hash: HashFunction::Sha384,
        }
    }

    /// HS512.
    #[must_use]
    pub fn hmac_sha512() -> Self {
        Self {
            identifier: identifiers::HMAC_SHA512,
            hash: HashFunction::Sha512,
        }
    }

    fn symmetric_key<'a>(&self, key: Option<&'a JoseKey>) -> JoseResult<&'a SymmetricKey> {
        match key {
            Some(JoseKey::Symmetric(key)) => Ok(key),
            Some(other) => Err(JoseError::invalid_key(format!(
                "{} requires a symmetric key, not a {}",
                self.identifier,
                other.description()
            ))),
            None => Err(JoseError::invalid_key(format!(
                "{} requires a symmetric key",
                self.identifier
            ))),
        }
    }

    fn check_key_length(&self, key: &SymmetricKey) -> JoseResult<()> {
        let minimum = self.hash.byte_length();
        if key.len() < minimum {
            return Err(JoseError::weak_key(format!(
                "{} requires a key of at least {} bytes ({} bits); {} bytes were provided",
                self.identifier,
                minimum,
                minimum * 8,
                key.len()
            )));
        }
        Ok(())
    }

    fn compute_mac(&self, key: &SymmetricKey, data: &[u8]) -> JoseResult<Vec<u8>> {
        let mac_err = |_| JoseError::signing("unable to initialize the MAC primitive");
        Ok(match self.hash {
            HashFunction::Sha256 => {
                let mut mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(mac_err)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            HashFunction::Sha384 => {
                let mut mac = HmacSha384::new_from_slice(key.as_bytes()).map_err(mac_err)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            HashFunction::Sha512 => {
                let mut mac = HmacSha512::new_from_slice(key.as_bytes()).map_err(mac_err)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        })
    }

    fn validate_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        let key = self.symmetric_key(key)?;
        self.check_key_length(key)
    }
}

impl SignatureAlgorithm for HmacShaAlgorithm {
    fn algorithm_identifier(&self) -> &str {
        self.identifier
    }

    fn key_kind(&self) -> KeyKind {
        KeyKind::Symmetric
    }

    fn validate_signing_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        self.validate_key(key)
    }

    fn validate_verification_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        self.validate_key(key)
    }

    fn sign(
        &self,
        key: Option<&JoseKey>,
        secured_input: &[u8],
        context: &ProviderContext,
    ) -> JoseResult<Vec<u8>> {
        let key = self.symmetric_key(key)?;
        self.check_key_length(key)?;
        context
            .general_selection()
            .check_backend(Operation::Mac, &[RUSTCRYPTO_PROVIDER])?;
        self.compute_mac(key, secured_input)
    }

    fn verify(
        &self,
        signature: &[u8],
        key: Option<&JoseKey>,
        secured_input: &[u8],
        context: &ProviderContext,
    ) -> JoseResult<bool> {
        let computed = self.sign(key, secured_input, context)?;
        // Constant-time comparison is a security invariant here, not an
        // optimization choice.
        Ok(bytes::constant_time_equals(&computed, signature))
    }
}
