//! RSASSA-PKCS1-v1_5 signature algorithms (RS256, RS384, RS512).

use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};

use quill_common::{JoseError, JoseResult};

use crate::algorithms::{identifiers, SignatureAlgorithm};
use crate::hash::HashFunction;
use crate::keys::{JoseKey, KeyKind};
use crate::provider::{Operation, ProviderContext, RUSTCRYPTO_PROVIDER};

/// Minimum RSA modulus size accepted for any operation.
const MIN_RSA_KEY_BITS: usize = 2048;

/// RSA PKCS#1 v1.5 over a SHA-2 digest.
#[derive(Debug, Clone, Copy)]
pub struct RsaShaAlgorithm {
    identifier: &'static str,
    hash: HashFunction,
}

impl RsaShaAlgorithm {
    /// RS256.
    #[must_use]
    pub fn rsa_sha256() -> Self {
        Self {
            identifier: identifiers::RSA_SHA256,
            hash: HashFunction::Sha256,
        }
    }

    /// RS384.
    #[must_use]
    pub fn rsa_sha384() -> Self {
        Self {
            identifier: identifiers::RSA_SHA384,
            hash: HashFunction::Sha384,
        }
    }

    /// RS512.
    #[must_use]
    pub fn rsa_sha512() -> Self {
        Self {
            identifier: identifiers::RSA_SHA512,
            hash: HashFunction::Sha512,
        }
    }

    fn check_rsa_key_size(&self, bits: usize) -> JoseResult<()> {
        if bits < MIN_RSA_KEY_BITS {
            return Err(JoseError::weak_key(format!(
                "{} requires an RSA key of at least {MIN_RSA_KEY_BITS} bits; \
                 the supplied key has {bits} bits",
                self.identifier
            )));
        }
        Ok(())
    }

    fn private_key<'a>(&self, key: Option<&'a JoseKey>) -> JoseResult<&'a RsaPrivateKey> {
        match key {
            Some(JoseKey::RsaPrivate(key)) => Ok(key),
            Some(other) => Err(JoseError::invalid_key(format!(
                "{} signing requires an RSA private key, not a {}",
                self.identifier,
                other.description()
            ))),
            None => Err(JoseError::invalid_key(format!(
                "{} signing requires an RSA private key",
                self.identifier
            ))),
        }
    }

    fn public_key<'a>(&self, key: Option<&'a JoseKey>) -> JoseResult<&'a RsaPublicKey> {
        match key {
            Some(JoseKey::RsaPublic(key)) => Ok(key),
            Some(other) => Err(JoseError::invalid_key(format!(
                "{} verification requires an RSA public key, not a {}",
                self.identifier,
                other.description()
            ))),
            None => Err(JoseError::invalid_key(format!(
                "{} verification requires an RSA public key",
                self.identifier
            ))),
        }
    }
}

impl SignatureAlgorithm for RsaShaAlgorithm {
    fn algorithm_identifier(&self) -> &str {
        self.identifier
    }

    fn key_kind(&self) -> KeyKind {
        KeyKind::Asymmetric
    }

    fn validate_signing_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        let key = self.private_key(key)?;
        self.check_rsa_key_size(key.size() * 8)
    }

    fn validate_verification_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        let key = self.public_key(key)?;
        self.check_rsa_key_size(key.size() * 8)
    }

    fn sign(
        &self,
        key: Option<&JoseKey>,
        secured_input: &[u8],
        context: &ProviderContext,
    ) -> JoseResult<Vec<u8>> {
        let private_key = self.private_key(key)?;
        self.check_rsa_key_size(private_key.size() * 8)?;
        context
            .general_selection()
            .check_backend(Operation::Signature, &[RUSTCRYPTO_PROVIDER])?;
        let signature = match self.hash {
            HashFunction::Sha256 => SigningKey::<Sha256>::new(private_key.clone())
                .try_sign(secured_input)
                .map(|s| s.to_vec()),
            HashFunction::Sha384 => SigningKey::<Sha384>::new(private_key.clone())
                .try_sign(secured_input)
                .map(|s| s.to_vec()),
            HashFunction::Sha512 => SigningKey::<Sha512>::new(private_key.clone())
                .try_sign(secured_input)
                .map(|s| s.to_vec()),
        };
        signature.map_err(|e| JoseError::signing(e.to_string()))
    }

    fn verify(
        &self,
        signature: &[u8],
        key: Option<&JoseKey>,
        secured_input: &[u8],
        context: &ProviderContext,
    ) -> JoseResult<bool> {
        let public_key = self.public_key(key)?;
        self.check_rsa_key_size(public_key.size() * 8)?;
        context
            .general_selection()
            .check_backend(Operation::Signature, &[RUSTCRYPTO_PROVIDER])?;
        // A signature of the wrong width cannot even be attempted; treat it
        // as a rejection rather than an error, the bytes are
        // attacker-controlled.
        let Ok(signature) = Signature::try_from(signature) else {
            return Ok(false);
        };
        let accepted = match self.hash {
            HashFunction::Sha256 => VerifyingKey::<Sha256>::new(public_key.clone())
                .verify(secured_input, &signature)
                .is_ok(),
            HashFunction::Sha384 => VerifyingKey::<Sha384>::new(public_key.clone())
                .verify(secured_input, &signature)
                .is_ok(),
            HashFunction::Sha512 => VerifyingKey::<Sha512>::new(public_key.clone())
                .verify(secured_input, &signature)
                .is_ok(),
        };
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn generate_keys(bits: usize) -> (JoseKey, JoseKey) {
        let private = RsaPrivateKey::new(&mut OsRng, bits).expect("test key generation");
        let public = private.to_public_key();
        (JoseKey::RsaPrivate(private), JoseKey::RsaPublic(public))
    }

    #[test]
    fn sign_verify_round_trip_is_deterministic() {
        let (private, public) = generate_keys(2048);
        let algorithm = RsaShaAlgorithm::rsa_sha256();
        let context = ProviderContext::default();
        let input = b"eyJhbGciOiJSUzI1NiJ9.eyJpc3MiOiJqb2UifQ";
        let first = algorithm.sign(Some(&private), input, &context).unwrap();
        let second = algorithm.sign(Some(&private), input, &context).unwrap();
        // PKCS#1 v1.5 padding is deterministic: re-signing reproduces the
        // exact same bytes.
        assert_eq!(first, second);
        assert_eq!(first.len(), 256);
        assert!(algorithm
            .verify(&first, Some(&public), input, &context)
            .unwrap());
        assert!(!algorithm
            .verify(&first, Some(&public), b"tampered", &context)
            .unwrap());
    }

    #[test]
    fn small_key_is_rejected_before_use() {
        let (private, public) = generate_keys(1024);
        let algorithm = RsaShaAlgorithm::rsa_sha256();
        let context = ProviderContext::default();
        assert!(matches!(
            algorithm.sign(Some(&private), b"data", &context),
            Err(JoseError::WeakKey(_))
        ));
        assert!(matches!(
            algorithm.verify(&[0u8; 128], Some(&public), b"data", &context),
            Err(JoseError::WeakKey(_))
        ));
    }

    #[test]
    fn wrong_width_signature_is_rejected_not_an_error() {
        let (_, public) = generate_keys(2048);
        let algorithm = RsaShaAlgorithm::rsa_sha512();
        let verified = algorithm
            .verify(&[1u8; 17], Some(&public), b"data", &ProviderContext::default())
            .unwrap();
        assert!(!verified);
    }

    #[test]
    fn signing_with_a_public_key_is_invalid() {
        let (_, public) = generate_keys(2048);
        let algorithm = RsaShaAlgorithm::rsa_sha256();
        let err = algorithm
            .sign(Some(&public), b"data", &ProviderContext::default())
            .unwrap_err();
        assert!(matches!(err, JoseError::InvalidKey(_)));
    }
}
