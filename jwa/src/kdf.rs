//! NIST SP 800-56A single-step ("Concat") key derivation.
//!
//! Derives a key of arbitrary bit length from a shared secret and an
//! OtherInfo context by hashing a big-endian counter, the secret, and the
//! context once per output block. Pure and reusable: a function value is
//! bound to a hash and can derive any number of keys from different secrets.

use zeroize::Zeroizing;

use quill_common::{bytes, JoseError, JoseResult};

use crate::hash::HashFunction;

/// The SP 800-56A §5.8.1 single-step KDF over a selected hash.
#[derive(Debug, Clone, Copy)]
pub struct ConcatKeyDerivationFunction {
    hash: HashFunction,
}

impl ConcatKeyDerivationFunction {
    /// Bind the KDF to a hash function.
    #[must_use]
    pub fn new(hash: HashFunction) -> Self {
        Self { hash }
    }

    /// The hash this KDF is bound to.
    #[must_use]
    pub fn hash_function(&self) -> HashFunction {
        self.hash
    }

    /// Number of hash blocks needed for `key_data_len_bits` of output.
    ///
    /// Ceiling division in integer arithmetic; the counter is a 32-bit
    /// value, so more than `u32::MAX` blocks cannot be produced.
    pub fn reps(&self, key_data_len_bits: u64) -> JoseResult<u32> {
        let hash_bits = self.hash.bit_length() as u64;
        let reps = key_data_len_bits.div_ceil(hash_bits);
        u32::try_from(reps).map_err(|_| {
            JoseError::key_derivation(format!(
                "{key_data_len_bits} bits of key data would need {reps} hash blocks, \
                 which overflows the 32-bit KDF counter"
            ))
        })
    }

    /// Derive `key_data_len_bits` of key material.
    ///
    /// # Errors
    ///
    /// Fails with [`JoseError::KeyDerivation`] when the block counter would
    /// overflow.
    pub fn kdf(
        &self,
        shared_secret: &[u8],
        key_data_len_bits: u64,
        other_info: &[u8],
    ) -> JoseResult<Zeroizing<Vec<u8>>> {
        let reps = self.reps(key_data_len_bits)?;
        let key_bytes = bytes::byte_length(key_data_len_bits as usize);
        let mut derived = Zeroizing::new(Vec::with_capacity(
            reps as usize * self.hash.byte_length(),
        ));
        for counter in 1..=reps {
            let counter_bytes = bytes::big_endian_bytes_u32(counter);
            let block = self
                .hash
                .digest(&bytes::concat(&[&counter_bytes, shared_secret, other_info]));
            derived.extend_from_slice(&block);
        }
        derived.truncate(key_bytes);
        Ok(derived)
    }

    /// Derive key material from the standard OtherInfo sub-fields.
    ///
    /// `algorithm_id`, `party_u_info`, and `party_v_info` are framed as
    /// Datalen || Data with a 4-byte big-endian length, even when empty.
    /// `supp_pub_info` and `supp_priv_info` are appended exactly as supplied
    /// (ECDH-ES passes the 4-byte keydatalen as SuppPubInfo).
    #[allow(clippy::too_many_arguments)]
    pub fn kdf_with_other_info(
        &self,
        shared_secret: &[u8],
        key_data_len_bits: u64,
        algorithm_id: &[u8],
        party_u_info: &[u8],
        party_v_info: &[u8],
        supp_pub_info: &[u8],
        supp_priv_info: &[u8],
    ) -> JoseResult<Zeroizing<Vec<u8>>> {
        let other_info = bytes::concat(&[
            &prefixed(algorithm_id),
            &prefixed(party_u_info),
            &prefixed(party_v_info),
            supp_pub_info,
            supp_priv_info,
        ]);
        self.kdf(shared_secret, key_data_len_bits, &other_info)
    }
}

/// Datalen || Data framing with a 4-byte big-endian length.
fn prefixed(data: &[u8]) -> Vec<u8> {
    let len = bytes::big_endian_bytes_u32(data.len() as u32);
    bytes::concat(&[&len, data])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha256_kdf() -> ConcatKeyDerivationFunction {
        ConcatKeyDerivationFunction::new(HashFunction::Sha256)
    }

    #[test]
    fn reps_reference_values() {
        let kdf = sha256_kdf();
        for (bits, expected) in [(256, 1), (384, 2), (512, 2), (1024, 4), (1025, 5)] {
            assert_eq!(kdf.reps(bits).unwrap(), expected, "{bits} bits");
        }
    }

    #[test]
    fn counter_overflow_is_an_error() {
        let kdf = sha256_kdf();
        let err = kdf.kdf(b"secret", 1u64 << 41, b"").unwrap_err();
        assert!(matches!(err, quill_common::JoseError::KeyDerivation(_)));
    }

    #[test]
    fn ecdh_es_reference_derivation() {
        // The direct key agreement example from RFC 7518 Appendix C:
        // AlgorithmID "A128GCM", PartyUInfo "Alice", PartyVInfo "Bob",
        // SuppPubInfo = 128 as a 4-byte big-endian value.
        let shared_secret = [
            158u8, 86, 217, 29, 129, 113, 53, 211, 114, 131, 66, 131, 191, 132, 38, 156, 251,
            49, 110, 163, 218, 128, 106, 72, 246, 218, 167, 121, 140, 254, 144, 196,
        ];
        let derived = sha256_kdf()
            .kdf_with_other_info(
                &shared_secret,
                128,
                b"A128GCM",
                b"Alice",
                b"Bob",
                &128u32.to_be_bytes(),
                b"",
            )
            .unwrap();
        assert_eq!(
            derived.as_slice(),
            &[86, 170, 141, 234, 248, 35, 109, 32, 92, 34, 40, 205, 113, 167, 16, 26]
        );
    }

    #[test]
    fn truncates_final_block() {
        let kdf = sha256_kdf();
        let long = kdf.kdf(b"z", 520, b"info").unwrap();
        assert_eq!(long.len(), 65);
        // The shorter derivation is a prefix of the longer one.
        let short = kdf.kdf(b"z", 256, b"info").unwrap();
        assert_eq!(&long[..32], short.as_slice());
    }

    #[test]
    fn zero_bits_derives_nothing() {
        let derived = sha256_kdf().kdf(b"z", 0, b"").unwrap();
        assert!(derived.is_empty());
    }

    #[test]
    fn empty_sub_fields_still_carry_length_prefixes() {
        let kdf = sha256_kdf();
        let with_helper = kdf
            .kdf_with_other_info(b"z", 256, b"", b"", b"", b"", b"")
            .unwrap();
        // Three empty Datalen||Data fields are twelve zero bytes of OtherInfo.
        let manual = kdf.kdf(b"z", 256, &[0u8; 12]).unwrap();
        assert_eq!(with_helper.as_slice(), manual.as_slice());
    }
}
