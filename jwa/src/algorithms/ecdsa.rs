//! ECDSA signature algorithms (ES256, ES384, ES512).
//!
//! The JOSE wire form of an ECDSA signature is the concatenation `R || S`,
//! each half a fixed-width, left-zero-padded big-endian unsigned integer.
//! The backend signature primitive speaks DER: a `SEQUENCE` of two
//! two's-complement, minimal-length `INTEGER`s. Signing converts the
//! backend's DER output to the fixed-width form; verification converts the
//! received fixed-width bytes back to DER. The two conversions are exact
//! inverses for all valid signatures.

use p256::ecdsa::signature::{Signer, Verifier};

use quill_common::{JoseError, JoseResult};

use crate::algorithms::{identifiers, SignatureAlgorithm};
use crate::keys::{EcCurve, EcPrivateKey, EcPublicKey, JoseKey, KeyKind};
use crate::provider::{Operation, ProviderContext, RUSTCRYPTO_PROVIDER};

const DER_SEQUENCE: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;
const DER_LONG_FORM_ONE_BYTE: u8 = 0x81;

/// ECDSA on a NIST curve with the curve's companion SHA-2 digest.
#[derive(Debug, Clone, Copy)]
pub struct EcdsaShaAlgorithm {
    identifier: &'static str,
    curve: EcCurve,
}

impl EcdsaShaAlgorithm {
    /// ES256 (P-256, SHA-256).
    #[must_use]
    pub fn ecdsa_sha256() -> Self {
        Self {
            identifier: identifiers::ECDSA_SHA256,
            curve: EcCurve::P256,
        }
    }

    /// ES384 (P-384, SHA-384).
    #[must_use]
    pub fn ecdsa_sha384() -> Self {
        Self {
            identifier: identifiers::ECDSA_SHA384,
            curve: EcCurve::P384,
        }
    }

    /// ES512 (P-521, SHA-512).
    #[must_use]
    pub fn ecdsa_sha512() -> Self {
        Self {
            identifier: identifiers::ECDSA_SHA512,
            curve: EcCurve::P521,
        }
    }

    /// The curve this algorithm is bound to.
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        self.curve
    }

    fn check_curve(&self, curve: EcCurve) -> JoseResult<()> {
        if curve != self.curve {
            return Err(JoseError::invalid_key(format!(
                "{} requires a key on curve {}; the supplied key is on {}",
                self.identifier, self.curve, curve
            )));
        }
        Ok(())
    }

    fn signing_key<'a>(&self, key: Option<&'a JoseKey>) -> JoseResult<&'a EcPrivateKey> {
        match key {
            Some(JoseKey::EcPrivate(key)) => {
                self.check_curve(key.curve())?;
                Ok(key)
            }
            Some(other) => Err(JoseError::invalid_key(format!(
                "{} signing requires an EC private key, not a {}",
                self.identifier,
                other.description()
            ))),
            None => Err(JoseError::invalid_key(format!(
                "{} signing requires an EC private key",
                self.identifier
            ))),
        }
    }

    fn verifying_key<'a>(&self, key: Option<&'a JoseKey>) -> JoseResult<&'a EcPublicKey> {
        match key {
            Some(JoseKey::EcPublic(key)) => {
                // Guard against curve confusion: the key's curve must match
                // the algorithm's declared curve before any math happens.
                self.check_curve(key.curve())?;
                Ok(key)
            }
            Some(other) => Err(JoseError::invalid_key(format!(
                "{} verification requires an EC public key, not a {}",
                self.identifier,
                other.description()
            ))),
            None => Err(JoseError::invalid_key(format!(
                "{} verification requires an EC public key",
                self.identifier
            ))),
        }
    }
}

impl SignatureAlgorithm for EcdsaShaAlgorithm {
    fn algorithm_identifier(&self) -> &str {
        self.identifier
    }

    fn key_kind(&self) -> KeyKind {
        KeyKind::Asymmetric
    }

    fn validate_signing_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        self.signing_key(key).map(|_| ())
    }

    fn validate_verification_key(&self, key: Option<&JoseKey>) -> JoseResult<()> {
        self.verifying_key(key).map(|_| ())
    }

    fn sign(
        &self,
        key: Option<&JoseKey>,
        secured_input: &[u8],
        context: &ProviderContext,
    ) -> JoseResult<Vec<u8>> {
        let signing_key = self.signing_key(key)?;
        context
            .general_selection()
            .check_backend(Operation::Signature, &[RUSTCRYPTO_PROVIDER])?;
        let der = match signing_key {
            EcPrivateKey::P256(key) => {
                let signature: p256::ecdsa::Signature = key
                    .try_sign(secured_input)
                    .map_err(|e| JoseError::signing(e.to_string()))?;
                signature.to_der().as_bytes().to_vec()
            }
            EcPrivateKey::P384(key) => {
                let signature: p384::ecdsa::Signature = key
                    .try_sign(secured_input)
                    .map_err(|e| JoseError::signing(e.to_string()))?;
                signature.to_der().as_bytes().to_vec()
            }
            EcPrivateKey::P521(key) => {
                let signature: p521::ecdsa::Signature = key
                    .try_sign(secured_input)
                    .map_err(|e| JoseError::signing(e.to_string()))?;
                signature.to_der().as_bytes().to_vec()
            }
        };
        der_to_concatenated(&der, self.curve.signature_byte_length())
    }

    fn verify(
        &self,
        signature: &[u8],
        key: Option<&JoseKey>,
        secured_input: &[u8],
        context: &ProviderContext,
    ) -> JoseResult<bool> {
        let verifying_key = self.verifying_key(key)?;
        context
            .general_selection()
            .check_backend(Operation::Signature, &[RUSTCRYPTO_PROVIDER])?;
        // Structural problems in the concatenated form are surfaced as
        // format errors; values the curve math rejects are an ordinary
        // `false`.
        let der = concatenated_to_der(signature)?;
        let accepted = match verifying_key {
            EcPublicKey::P256(key) => match p256::ecdsa::Signature::from_der(&der) {
                Ok(signature) => key.verify(secured_input, &signature).is_ok(),
                Err(_) => false,
            },
            EcPublicKey::P384(key) => match p384::ecdsa::Signature::from_der(&der) {
                Ok(signature) => key.verify(secured_input, &signature).is_ok(),
                Err(_) => false,
            },
            EcPublicKey::P521(key) => match p521::ecdsa::Signature::from_der(&der) {
                Ok(signature) => key.verify(secured_input, &signature).is_ok(),
                Err(_) => false,
            },
        };
        Ok(accepted)
    }
}

/// Convert a fixed-width `R || S` signature to a DER `SEQUENCE` of two
/// `INTEGER`s.
///
/// Each half is trimmed to its minimal unsigned form, gaining one zero byte
/// of sign padding when its high bit is set. Lengths up to 127 use the
/// short form; 128 through 255 use the one-byte `0x81` long form; anything
/// larger is refused.
pub fn concatenated_to_der(concatenated: &[u8]) -> JoseResult<Vec<u8>> {
    if concatenated.is_empty() || concatenated.len() % 2 != 0 {
        return Err(JoseError::signature_format(
            "a concatenated ECDSA signature must split into two equal halves",
        ));
    }
    let raw_len = concatenated.len() / 2;
    let r = minimal_signed(&concatenated[..raw_len]);
    let s = minimal_signed(&concatenated[raw_len..]);
    let content_len = 2 + r.len() + 2 + s.len();
    if content_len > 255 {
        return Err(JoseError::signature_format(format!(
            "DER signature content of {content_len} bytes exceeds the supported \
             one-byte length encoding"
        )));
    }
    let mut der = Vec::with_capacity(content_len + 3);
    der.push(DER_SEQUENCE);
    if content_len >= 128 {
        der.push(DER_LONG_FORM_ONE_BYTE);
    }
    der.push(content_len as u8);
    for half in [r, s] {
        der.push(DER_INTEGER);
        der.push(half.len() as u8);
        der.extend_from_slice(&half);
    }
    Ok(der)
}

/// Convert a DER `SEQUENCE { INTEGER R, INTEGER S }` to the fixed-width
/// concatenated form, left-padding each half to `output_length / 2` bytes
/// (or to the wider of the two halves, if one does not fit that width).
pub fn der_to_concatenated(der: &[u8], output_length: usize) -> JoseResult<Vec<u8>> {
    let malformed = |detail: &str| JoseError::signature_format(format!("DER signature: {detail}"));
    if der.len() < 8 || der[0] != DER_SEQUENCE {
        return Err(malformed("expected a SEQUENCE of at least 8 bytes"));
    }
    let (declared, offset) = match der[1] {
        len @ 0x01..=0x7f => (len as usize, 2),
        DER_LONG_FORM_ONE_BYTE => (der[2] as usize, 3),
        _ => return Err(malformed("unsupported length encoding")),
    };
    if declared != der.len() - offset {
        return Err(malformed("declared length disagrees with actual length"));
    }
    if der[offset] != DER_INTEGER {
        return Err(malformed("first element is not an INTEGER"));
    }
    let r_len = der[offset + 1] as usize;
    let r_start = offset + 2;
    let r_end = r_start + r_len;
    if r_end + 2 > der.len() {
        return Err(malformed("first INTEGER overruns the SEQUENCE"));
    }
    if der[r_end] != DER_INTEGER {
        return Err(malformed("second element is not an INTEGER"));
    }
    let s_len = der[r_end + 1] as usize;
    let s_start = r_end + 2;
    if s_start + s_len != der.len() || declared != 2 + r_len + 2 + s_len {
        return Err(malformed("INTEGER lengths disagree with the SEQUENCE length"));
    }
    let r = strip_leading_zeros(&der[r_start..r_end]);
    let s = strip_leading_zeros(&der[s_start..]);
    let raw_len = r.len().max(s.len()).max(output_length / 2);
    let mut concatenated = vec![0u8; 2 * raw_len];
    concatenated[raw_len - r.len()..raw_len].copy_from_slice(r);
    concatenated[2 * raw_len - s.len()..].copy_from_slice(s);
    Ok(concatenated)
}

/// Minimal-length two's-complement encoding of an unsigned big-endian value.
fn minimal_signed(half: &[u8]) -> Vec<u8> {
    let first = half
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(half.len() - 1);
    let trimmed = &half[first..];
    if trimmed[0] & 0x80 != 0 {
        let mut padded = Vec::with_capacity(trimmed.len() + 1);
        padded.push(0);
        padded.extend_from_slice(trimmed);
        padded
    } else {
        trimmed.to_vec()
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::OsRng;

    #[test]
    fn short_form_round_trip() {
        // 32-byte halves without high bits: plain short-form DER.
        let mut concatenated = vec![0u8; 64];
        concatenated[0] = 0x01;
        concatenated[31] = 0x7f;
        concatenated[32] = 0x02;
        concatenated[63] = 0x33;
        let der = concatenated_to_der(&concatenated).unwrap();
        assert_eq!(der[0], 0x30);
        assert_eq!(der[1] as usize, der.len() - 2);
        assert_eq!(der_to_concatenated(&der, 64).unwrap(), concatenated);
    }

    #[test]
    fn high_bit_halves_gain_sign_padding() {
        let concatenated = vec![0x80u8; 64];
        let der = concatenated_to_der(&concatenated).unwrap();
        // Each INTEGER is 33 bytes: one zero of sign padding plus the value.
        assert_eq!(der[3], 33);
        assert_eq!(der[4], 0x00);
        assert_eq!(der_to_concatenated(&der, 64).unwrap(), concatenated);
    }

    #[test]
    fn p521_widths_use_the_long_form_length() {
        // Two 66-byte halves with high bits set need 67-byte INTEGERs, which
        // pushes the SEQUENCE content past 127 bytes.
        let concatenated = vec![0xffu8; 132];
        let der = concatenated_to_der(&concatenated).unwrap();
        assert_eq!(der[1], 0x81);
        assert_eq!(der[2] as usize, der.len() - 3);
        assert_eq!(der_to_concatenated(&der, 132).unwrap(), concatenated);
    }

    #[test]
    fn oversized_input_is_refused() {
        let concatenated = vec![0xffu8; 300];
        assert!(matches!(
            concatenated_to_der(&concatenated),
            Err(JoseError::SignatureFormat(_))
        ));
    }

    #[test]
    fn zero_halves_encode_as_single_zero_integers() {
        let concatenated = vec![0u8; 64];
        let der = concatenated_to_der(&concatenated).unwrap();
        assert_eq!(der, vec![0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]);
        assert_eq!(der_to_concatenated(&der, 64).unwrap(), concatenated);
    }

    #[test]
    fn malformed_der_is_a_format_error() {
        let cases: &[&[u8]] = &[
            &[],
            &[0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01],          // truncated
            &[0x31, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00],    // not a SEQUENCE
            &[0x30, 0x07, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00],    // bad outer length
            &[0x30, 0x06, 0x03, 0x01, 0x00, 0x02, 0x01, 0x00],    // not an INTEGER
            &[0x30, 0x06, 0x02, 0x03, 0x00, 0x02, 0x01, 0x00],    // inner overrun
            &[0x30, 0x82, 0x00, 0x06, 0x02, 0x01, 0x00, 0x02],    // two-byte long form
        ];
        for der in cases {
            assert!(
                der_to_concatenated(der, 64).is_err(),
                "accepted {der:02x?}"
            );
        }
    }

    #[test]
    fn odd_length_concatenation_is_a_format_error() {
        assert!(concatenated_to_der(&[1, 2, 3]).is_err());
        assert!(concatenated_to_der(&[]).is_err());
    }

    proptest! {
        #[test]
        fn concatenated_to_der_round_trips(
            r in proptest::collection::vec(any::<u8>(), 32),
            s in proptest::collection::vec(any::<u8>(), 32),
        ) {
            let mut concatenated = r;
            concatenated.extend_from_slice(&s);
            let der = concatenated_to_der(&concatenated).unwrap();
            let back = der_to_concatenated(&der, concatenated.len()).unwrap();
            prop_assert_eq!(back, concatenated);
        }
    }

    #[test]
    fn per_curve_round_trips() {
        let context = ProviderContext::default();
        let input = b"eyJhbGciOiJFUzI1NiJ9.eyJpc3MiOiJqb2UifQ";

        let p256_key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let private = JoseKey::from(p256_key.clone());
        let public = JoseKey::from(*p256_key.verifying_key());
        let algorithm = EcdsaShaAlgorithm::ecdsa_sha256();
        let signature = algorithm.sign(Some(&private), input, &context).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(algorithm
            .verify(&signature, Some(&public), input, &context)
            .unwrap());
        assert!(!algorithm
            .verify(&signature, Some(&public), b"tampered", &context)
            .unwrap());

        let p384_key = p384::ecdsa::SigningKey::random(&mut OsRng);
        let private = JoseKey::from(p384_key.clone());
        let public = JoseKey::from(*p384_key.verifying_key());
        let algorithm = EcdsaShaAlgorithm::ecdsa_sha384();
        let signature = algorithm.sign(Some(&private), input, &context).unwrap();
        assert_eq!(signature.len(), 96);
        assert!(algorithm
            .verify(&signature, Some(&public), input, &context)
            .unwrap());

        let p521_key = p521::ecdsa::SigningKey::random(&mut OsRng);
        let private = JoseKey::from(p521_key.clone());
        let public = JoseKey::from(p521::ecdsa::VerifyingKey::from(&p521_key));
        let algorithm = EcdsaShaAlgorithm::ecdsa_sha512();
        let signature = algorithm.sign(Some(&private), input, &context).unwrap();
        assert_eq!(signature.len(), 132);
        assert!(algorithm
            .verify(&signature, Some(&public), input, &context)
            .unwrap());
    }

    #[test]
    fn curve_confusion_is_invalid_key() {
        let p384_key = p384::ecdsa::SigningKey::random(&mut OsRng);
        let public = JoseKey::from(*p384_key.verifying_key());
        let algorithm = EcdsaShaAlgorithm::ecdsa_sha256();
        let err = algorithm
            .verify(&[0u8; 64], Some(&public), b"data", &ProviderContext::default())
            .unwrap_err();
        assert!(matches!(err, JoseError::InvalidKey(_)));
    }

    #[test]
    fn garbage_signature_values_verify_false() {
        let key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let public = JoseKey::from(*key.verifying_key());
        let algorithm = EcdsaShaAlgorithm::ecdsa_sha256();
        // Structurally fine but numerically nonsense (e.g. zero R and S).
        let verified = algorithm
            .verify(&[0u8; 64], Some(&public), b"data", &ProviderContext::default())
            .unwrap();
        assert!(!verified);
    }
}
