//! JOSE algorithm layer.
//!
//! This crate implements the pieces that sit between raw keys and the JWS
//! protocol object: the key handle type, the two-tier provider-selection
//! context, the NIST SP 800-56A Concat KDF, the signature-algorithm family
//! (HMAC, RSA, ECDSA, and the unsecured `none`), and the registry that maps
//! algorithm identifiers to implementations.

pub mod algorithms;
pub mod hash;
pub mod kdf;
pub mod keys;
pub mod provider;
pub mod registry;

pub use algorithms::{
    identifiers, EcdsaShaAlgorithm, HmacShaAlgorithm, NoneAlgorithm, RsaShaAlgorithm,
    SignatureAlgorithm,
};
pub use hash::HashFunction;
pub use kdf::ConcatKeyDerivationFunction;
pub use keys::{EcCurve, EcPrivateKey, EcPublicKey, JoseKey, KeyKind, SymmetricKey};
pub use provider::{Operation, ProviderContext, ProviderSelection, RUSTCRYPTO_PROVIDER};
pub use registry::{
    default_registry, AlgorithmConstraints, AlgorithmRegistry, ConstraintType,
};
