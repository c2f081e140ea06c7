//! Backend provider selection.
//!
//! Every cryptographic primitive an algorithm touches can be independently
//! routed to a named backend provider. A context carries two selection
//! records: the *general* selection applies to operations on the
//! caller-supplied key, the *supplementary* selection to operations not
//! directly on that key (for example the content cipher when key management
//! is indirect). Contexts are immutable after construction and safe to share
//! across concurrent calls.

use quill_common::{JoseError, JoseResult};

/// Name of the backend compiled into this crate.
pub const RUSTCRYPTO_PROVIDER: &str = "RustCrypto";

/// The per-operation override slots of a [`ProviderSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Asymmetric signature primitive.
    Signature,
    /// MAC primitive.
    Mac,
    /// Cipher primitive.
    Cipher,
    /// Key-agreement primitive.
    KeyAgreement,
    /// Key-factory primitive.
    KeyFactory,
    /// Key-pair-generation primitive.
    KeyPairGenerator,
    /// Message-digest primitive.
    MessageDigest,
}

impl Operation {
    /// Human-readable operation name for error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Mac => "MAC",
            Self::Cipher => "cipher",
            Self::KeyAgreement => "key agreement",
            Self::KeyFactory => "key factory",
            Self::KeyPairGenerator => "key pair generation",
            Self::MessageDigest => "message digest",
        }
    }
}

/// An optional general provider plus per-operation overrides.
///
/// Resolution rule: an operation's effective provider is its specific
/// override if set, else the general provider, else none (system default).
/// Names are compared case-sensitively; an unset slot is distinct from an
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSelection {
    general: Option<String>,
    signature: Option<String>,
    mac: Option<String>,
    cipher: Option<String>,
    key_agreement: Option<String>,
    key_factory: Option<String>,
    key_pair_generator: Option<String>,
    message_digest: Option<String>,
}

impl ProviderSelection {
    /// A selection with nothing overridden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the general provider applied to all operations without a
    /// specific override.
    #[must_use]
    pub fn with_general_provider(mut self, provider: impl Into<String>) -> Self {
        self.general = Some(provider.into());
        self
    }

    /// Set the provider for one specific operation.
    #[must_use]
    pub fn with_provider(mut self, operation: Operation, provider: impl Into<String>) -> Self {
        let slot = match operation {
            Operation::Signature => &mut self.signature,
            Operation::Mac => &mut self.mac,
            Operation::Cipher => &mut self.cipher,
            Operation::KeyAgreement => &mut self.key_agreement,
            Operation::KeyFactory => &mut self.key_factory,
            Operation::KeyPairGenerator => &mut self.key_pair_generator,
            Operation::MessageDigest => &mut self.message_digest,
        };
        *slot = Some(provider.into());
        self
    }

    /// The general provider, if set.
    #[must_use]
    pub fn general_provider(&self) -> Option<&str> {
        self.general.as_deref()
    }

    /// The effective provider for `operation` per the resolution rule.
    #[must_use]
    pub fn provider_for(&self, operation: Operation) -> Option<&str> {
        let specific = match operation {
            Operation::Signature => self.signature.as_deref(),
            Operation::Mac => self.mac.as_deref(),
            Operation::Cipher => self.cipher.as_deref(),
            Operation::KeyAgreement => self.key_agreement.as_deref(),
            Operation::KeyFactory => self.key_factory.as_deref(),
            Operation::KeyPairGenerator => self.key_pair_generator.as_deref(),
            Operation::MessageDigest => self.message_digest.as_deref(),
        };
        specific.or(self.general.as_deref())
    }

    /// Check that the effective provider for `operation` is one of the
    /// backends in `available` (or unset, meaning the system default).
    pub fn check_backend(&self, operation: Operation, available: &[&str]) -> JoseResult<()> {
        match self.provider_for(operation) {
            None => Ok(()),
            Some(name) if available.contains(&name) => Ok(()),
            Some(name) => Err(JoseError::provider_selection(operation.as_str(), name)),
        }
    }
}

/// The provider context handed to every sign/verify call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderContext {
    general: ProviderSelection,
    supplementary: ProviderSelection,
    secure_random: Option<String>,
}

impl ProviderContext {
    /// A context selecting nothing, which means the system default backend
    /// for every operation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the general selection record.
    #[must_use]
    pub fn with_general(mut self, selection: ProviderSelection) -> Self {
        self.general = selection;
        self
    }

    /// Replace the supplementary selection record.
    #[must_use]
    pub fn with_supplementary(mut self, selection: ProviderSelection) -> Self {
        self.supplementary = selection;
        self
    }

    /// Name a random-number source for backends that draw randomness.
    ///
    /// This is a pass-through to the backend; the algorithms in this
    /// workspace are deterministic and never draw from it themselves.
    #[must_use]
    pub fn with_secure_random(mut self, source: impl Into<String>) -> Self {
        self.secure_random = Some(source.into());
        self
    }

    /// The selection for operations on the caller-supplied key.
    #[must_use]
    pub fn general_selection(&self) -> &ProviderSelection {
        &self.general
    }

    /// The selection for operations not directly on the supplied key.
    #[must_use]
    pub fn supplementary_selection(&self) -> &ProviderSelection {
        &self.supplementary
    }

    /// The named random-number source, if any.
    #[must_use]
    pub fn secure_random_source(&self) -> Option<&str> {
        self.secure_random.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specific_override_beats_general() {
        let selection = ProviderSelection::new()
            .with_general_provider("general")
            .with_provider(Operation::Mac, "mac-special");
        assert_eq!(selection.provider_for(Operation::Mac), Some("mac-special"));
        assert_eq!(selection.provider_for(Operation::Cipher), Some("general"));
    }

    #[test]
    fn unset_means_system_default() {
        let selection = ProviderSelection::new();
        assert_eq!(selection.provider_for(Operation::Signature), None);
        assert!(selection
            .check_backend(Operation::Signature, &[RUSTCRYPTO_PROVIDER])
            .is_ok());
    }

    #[test]
    fn empty_string_is_a_real_name_not_unset() {
        let selection = ProviderSelection::new().with_general_provider("");
        assert_eq!(selection.provider_for(Operation::Mac), Some(""));
        let err = selection
            .check_backend(Operation::Mac, &[RUSTCRYPTO_PROVIDER])
            .unwrap_err();
        assert!(matches!(
            err,
            quill_common::JoseError::ProviderSelection { .. }
        ));
    }

    #[test]
    fn names_compare_case_sensitively() {
        let selection = ProviderSelection::new().with_general_provider("rustcrypto");
        assert!(selection
            .check_backend(Operation::Signature, &[RUSTCRYPTO_PROVIDER])
            .is_err());
    }

    #[test]
    fn context_carries_two_tiers() {
        let context = ProviderContext::new()
            .with_general(ProviderSelection::new().with_general_provider("outer"))
            .with_supplementary(
                ProviderSelection::new().with_provider(Operation::Cipher, "inner"),
            )
            .with_secure_random("DRBG");
        assert_eq!(
            context.general_selection().provider_for(Operation::Mac),
            Some("outer")
        );
        assert_eq!(
            context
                .supplementary_selection()
                .provider_for(Operation::Cipher),
            Some("inner")
        );
        assert_eq!(context.secure_random_source(), Some("DRBG"));
    }
}
