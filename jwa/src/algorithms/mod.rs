//! The signature-algorithm family.
//!
//! Every algorithm is a `{sign, verify}` capability keyed by a stable
//! identifier, binding one backend primitive to one key kind. Dispatch is a
//! plain trait object held by the registry; each variant carries only the
//! state it needs.

mod ecdsa;
mod hmac;
mod none;
mod rsa;

pub use self::ecdsa::{concatenated_to_der, der_to_concatenated, EcdsaShaAlgorithm};
pub use self::hmac::HmacShaAlgorithm;
pub use self::none::NoneAlgorithm;
pub use self::rsa::RsaShaAlgorithm;

use quill_common::JoseResult;

use crate::keys::{JoseKey, KeyKind};
use crate::provider::ProviderContext;

/// The algorithm identifiers registered by default.
pub mod identifiers {
    /// HMAC with SHA-256.
    pub const HMAC_SHA256: &str = "HS256";
    /// HMAC with SHA-384.
    pub const HMAC_SHA384: &str = "HS384";
    /// HMAC with SHA-512.
    pub const HMAC_SHA512: &str = "HS512";
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    pub const RSA_SHA256: &str = "RS256";
    /// RSASSA-PKCS1-v1_5 with SHA-384.
    pub const RSA_SHA384: &str = "RS384";
    /// RSASSA-PKCS1-v1_5 with SHA-512.
    pub const RSA_SHA512: &str = "RS512";
    /// ECDSA on P-256 with SHA-256.
    pub const ECDSA_SHA256: &str = "ES256";
    /// ECDSA on P-384 with SHA-384.
    pub const ECDSA_SHA384: &str = "ES384";
    /// ECDSA on P-521 with SHA-512.
    pub const ECDSA_SHA512: &str = "ES512";
    /// Unsecured (no signature).
    pub const NONE: &str = "none";
}

/// A signature or MAC capability bound to one key kind and one backend
/// primitive.
///
/// `verify` distinguishes rejection from failure: a signature the primitive
/// rejects yields `Ok(false)`, while inputs that cannot be processed at all
/// (wrong key kind, unresolvable provider, structurally unparseable
/// signature bytes) yield an error.
pub trait SignatureAlgorithm: Send + Sync {
    /// The stable identifier this algorithm registers under.
    fn algorithm_identifier(&self) -> &str;

    /// The key kind this algorithm declares.
    fn key_kind(&self) -> KeyKind;

    /// Validate a key for signing before use.
    fn validate_signing_key(&self, key: Option<&JoseKey>) -> JoseResult<()>;

    /// Validate a key for verification before use.
    fn validate_verification_key(&self, key: Option<&JoseKey>) -> JoseResult<()>;

    /// Produce signature bytes over the secured input.
    fn sign(
        &self,
        key: Option<&JoseKey>,
        secured_input: &[u8],
        context: &ProviderContext,
    ) -> JoseResult<Vec<u8>>;

    /// Check signature bytes over the secured input.
    fn verify(
        &self,
        signature: &[u8],
        key: Option<&JoseKey>,
        secured_input: &[u8],
        context: &ProviderContext,
    ) -> JoseResult<bool>;
}
