//! # Quill — a JOSE signing core
//!
//! Quill implements the cryptographic heart of the JOSE protocol family:
//! signed compact messages (JWS), a pluggable registry of signature
//! algorithms (`HS256/384/512`, `RS256/384/512`, `ES256/384/512`, `none`),
//! two-tier backend provider selection, the NIST SP 800-56A Concat KDF, and
//! the byte-level codecs those pieces rest on.
//!
//! This crate is a facade: everything re-exported here lives in the
//! [`quill_common`], [`quill_jwa`], and [`quill_jws`] member crates.
//!
//! ## Example
//!
//! ```
//! use quill::{
//!     AlgorithmConstraints, JoseKey, JsonWebSignature, ProviderContext,
//!     default_registry,
//! };
//!
//! # fn main() -> quill::JoseResult<()> {
//! let key = JoseKey::symmetric([0x6b; 32]);
//! let registry = default_registry();
//! let context = ProviderContext::default();
//!
//! let mut jws = JsonWebSignature::new();
//! jws.set_algorithm_header_value("HS256");
//! jws.set_payload("This is some text that is to be signed.");
//! let wire = jws.compact_serialization(Some(&key), registry, &context)?;
//!
//! let received = JsonWebSignature::from_compact_serialization(&wire)?;
//! let verified = received.verify_signature(
//!     Some(&key),
//!     registry,
//!     &context,
//!     &AlgorithmConstraints::block_none(),
//! )?;
//! assert!(verified);
//! # Ok(())
//! # }
//! ```

pub use quill_common::{base64url, bytes, json, JoseError, JoseResult};
pub use quill_jwa::{
    default_registry, identifiers, AlgorithmConstraints, AlgorithmRegistry,
    ConcatKeyDerivationFunction, ConstraintType, EcCurve, EcPrivateKey, EcPublicKey,
    EcdsaShaAlgorithm, HashFunction, HmacShaAlgorithm, JoseKey, KeyKind, NoneAlgorithm,
    Operation, ProviderContext, ProviderSelection, RsaShaAlgorithm, SignatureAlgorithm,
    SymmetricKey, RUSTCRYPTO_PROVIDER,
};
pub use quill_jws::{
    header_names, Headers, JsonWebSignature, KidVerificationKeyResolver,
    VerificationKeyResolver, X509ThumbprintKeyResolver,
};
