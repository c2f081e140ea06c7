//! Key handles consumed by the signature algorithms.
//!
//! Keys are supplied and owned by the caller; every component in this
//! workspace only borrows them for the duration of a single sign or verify
//! call. The handle declares just enough structure for an algorithm to
//! validate it: the key kind, the curve for EC keys, and the public/private
//! role.

use std::fmt;

use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The kind of key an algorithm declares it operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// A shared secret (MAC algorithms).
    Symmetric,
    /// A public or private key of an asymmetric pair.
    Asymmetric,
    /// No key at all (the unsecured `none` algorithm).
    None,
}

/// NIST curves supported by the ECDSA algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    /// NIST P-256 (secp256r1).
    P256,
    /// NIST P-384 (secp384r1).
    P384,
    /// NIST P-521 (secp521r1).
    P521,
}

impl EcCurve {
    /// JOSE curve name, as carried in a JWK `crv` member.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Byte width of one field coordinate (and of each signature half).
    #[must_use]
    pub const fn coordinate_byte_length(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// Byte width of the fixed-width `R || S` signature form.
    #[must_use]
    pub const fn signature_byte_length(self) -> usize {
        2 * self.coordinate_byte_length()
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared-secret key material, zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl SymmetricKey {
    /// Wrap raw key bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey({} bytes)", self.bytes.len())
    }
}

/// An EC verifying key, tagged with its curve.
#[derive(Clone)]
pub enum EcPublicKey {
    /// P-256 verifying key.
    P256(p256::ecdsa::VerifyingKey),
    /// P-384 verifying key.
    P384(p384::ecdsa::VerifyingKey),
    /// P-521 verifying key.
    P521(p521::ecdsa::VerifyingKey),
}

impl fmt::Debug for EcPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::P256(_) => write!(f, "EcPublicKey::P256(..)"),
            Self::P384(_) => write!(f, "EcPublicKey::P384(..)"),
            Self::P521(_) => write!(f, "EcPublicKey::P521(..)"),
        }
    }
}

impl EcPublicKey {
    /// The curve this key lives on.
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
            Self::P521(_) => EcCurve::P521,
        }
    }
}

/// An EC signing key, tagged with its curve.
#[derive(Clone)]
pub enum EcPrivateKey {
    /// P-256 signing key.
    P256(p256::ecdsa::SigningKey),
    /// P-384 signing key.
    P384(p384::ecdsa::SigningKey),
    /// P-521 signing key.
    P521(p521::ecdsa::SigningKey),
}

impl EcPrivateKey {
    /// The curve this key lives on.
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
            Self::P521(_) => EcCurve::P521,
        }
    }
}

impl fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcPrivateKey({})", self.curve())
    }
}

/// An opaque key handle with a declared family and role.
#[derive(Clone)]
pub enum JoseKey {
    /// Shared-secret key material.
    Symmetric(SymmetricKey),
    /// RSA public key.
    RsaPublic(RsaPublicKey),
    /// RSA private key.
    RsaPrivate(RsaPrivateKey),
    /// EC public key.
    EcPublic(EcPublicKey),
    /// EC private key.
    EcPrivate(EcPrivateKey),
}

impl JoseKey {
    /// Wrap shared-secret bytes.
    #[must_use]
    pub fn symmetric(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Symmetric(SymmetricKey::new(bytes))
    }

    /// The kind of this key.
    #[must_use]
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Symmetric(_) => KeyKind::Symmetric,
            _ => KeyKind::Asymmetric,
        }
    }

    /// The curve, for EC keys.
    #[must_use]
    pub fn curve(&self) -> Option<EcCurve> {
        match self {
            Self::EcPublic(key) => Some(key.curve()),
            Self::EcPrivate(key) => Some(key.curve()),
            _ => None,
        }
    }

    /// Whether this is private key material.
    #[must_use]
    pub fn is_private(&self) -> bool {
        matches!(
            self,
            Self::Symmetric(_) | Self::RsaPrivate(_) | Self::EcPrivate(_)
        )
    }

    /// Modulus size in bits, for RSA keys.
    #[must_use]
    pub fn rsa_bit_length(&self) -> Option<usize> {
        use rsa::traits::PublicKeyParts;
        match self {
            Self::RsaPublic(key) => Some(key.size() * 8),
            Self::RsaPrivate(key) => Some(key.size() * 8),
            _ => None,
        }
    }

    /// Short description used in error messages.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Symmetric(_) => "symmetric key",
            Self::RsaPublic(_) => "RSA public key",
            Self::RsaPrivate(_) => "RSA private key",
            Self::EcPublic(_) => "EC public key",
            Self::EcPrivate(_) => "EC private key",
        }
    }
}

impl fmt::Debug for JoseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EcPublic(key) => write!(f, "JoseKey({} {})", self.description(), key.curve()),
            Self::EcPrivate(key) => write!(f, "JoseKey({} {})", self.description(), key.curve()),
            _ => write!(f, "JoseKey({})", self.description()),
        }
    }
}

impl From<SymmetricKey> for JoseKey {
    fn from(key: SymmetricKey) -> Self {
        Self::Symmetric(key)
    }
}

impl From<RsaPublicKey> for JoseKey {
    fn from(key: RsaPublicKey) -> Self {
        Self::RsaPublic(key)
    }
}

impl From<RsaPrivateKey> for JoseKey {
    fn from(key: RsaPrivateKey) -> Self {
        Self::RsaPrivate(key)
    }
}

impl From<p256::ecdsa::VerifyingKey> for JoseKey {
    fn from(key: p256::ecdsa::VerifyingKey) -> Self {
        Self::EcPublic(EcPublicKey::P256(key))
    }
}

impl From<p384::ecdsa::VerifyingKey> for JoseKey {
    fn from(key: p384::ecdsa::VerifyingKey) -> Self {
        Self::EcPublic(EcPublicKey::P384(key))
    }
}

impl From<p521::ecdsa::VerifyingKey> for JoseKey {
    fn from(key: p521::ecdsa::VerifyingKey) -> Self {
        Self::EcPublic(EcPublicKey::P521(key))
    }
}

impl From<p256::ecdsa::SigningKey> for JoseKey {
    fn from(key: p256::ecdsa::SigningKey) -> Self {
        Self::EcPrivate(EcPrivateKey::P256(key))
    }
}

impl From<p384::ecdsa::SigningKey> for JoseKey {
    fn from(key: p384::ecdsa::SigningKey) -> Self {
        Self::EcPrivate(EcPrivateKey::P384(key))
    }
}

impl From<p521::ecdsa::SigningKey> for JoseKey {
    fn from(key: p521::ecdsa::SigningKey) -> Self {
        Self::EcPrivate(EcPrivateKey::P521(key))
    }
}
