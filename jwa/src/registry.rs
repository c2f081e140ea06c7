//! The algorithm registry and identifier constraints.
//!
//! A registry maps algorithm identifiers to implementations. The table is
//! built before concurrent use begins and is read through an atomic pointer,
//! so lookups take no lock; `reinitialize` replaces the whole table in one
//! store and concurrent readers only ever observe the old or the new table,
//! never a partially rebuilt one.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use quill_common::{JoseError, JoseResult};

use crate::algorithms::{
    identifiers, EcdsaShaAlgorithm, HmacShaAlgorithm, NoneAlgorithm, RsaShaAlgorithm,
    SignatureAlgorithm,
};

type AlgorithmTable = HashMap<String, Arc<dyn SignatureAlgorithm>>;

/// Identifier-keyed table of signature algorithms.
pub struct AlgorithmRegistry {
    table: ArcSwap<AlgorithmTable>,
}

impl AlgorithmRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(AlgorithmTable::new()),
        }
    }

    /// A registry with every built-in algorithm registered.
    #[must_use]
    pub fn with_default_algorithms() -> Self {
        let registry = Self::new();
        registry.reinitialize(default_algorithms());
        registry
    }

    /// Register one more algorithm.
    ///
    /// Replaces any existing registration under the same identifier. The
    /// table swap is atomic; in-flight lookups see the old table.
    pub fn register(&self, algorithm: Arc<dyn SignatureAlgorithm>) {
        self.table.rcu(|table| {
            let mut next = AlgorithmTable::clone(table);
            next.insert(algorithm.algorithm_identifier().to_string(), algorithm.clone());
            next
        });
    }

    /// Look up an algorithm. Unknown identifiers are simply not found;
    /// whether that is fatal is the caller's decision.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<Arc<dyn SignatureAlgorithm>> {
        self.table.load().get(identifier).cloned()
    }

    /// Whether an identifier has a registration.
    #[must_use]
    pub fn is_available(&self, identifier: &str) -> bool {
        self.table.load().contains_key(identifier)
    }

    /// The currently registered identifiers, sorted.
    #[must_use]
    pub fn registered_identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.table.load().keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// Replace the whole table atomically.
    ///
    /// Readers racing this call observe either the previous table or the
    /// complete new one.
    pub fn reinitialize(&self, algorithms: Vec<Arc<dyn SignatureAlgorithm>>) {
        let mut table = AlgorithmTable::with_capacity(algorithms.len());
        for algorithm in algorithms {
            table.insert(algorithm.algorithm_identifier().to_string(), algorithm);
        }
        debug!(count = table.len(), "initializing signature algorithm registry");
        self.table.store(Arc::new(table));
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::with_default_algorithms()
    }
}

fn default_algorithms() -> Vec<Arc<dyn SignatureAlgorithm>> {
    vec![
        Arc::new(HmacShaAlgorithm::hmac_sha256()),
        Arc::new(HmacShaAlgorithm::hmac_sha384()),
        Arc::new(HmacShaAlgorithm::hmac_sha512()),
        Arc::new(RsaShaAlgorithm::rsa_sha256()),
        Arc::new(RsaShaAlgorithm::rsa_sha384()),
        Arc::new(RsaShaAlgorithm::rsa_sha512()),
        Arc::new(EcdsaShaAlgorithm::ecdsa_sha256()),
        Arc::new(EcdsaShaAlgorithm::ecdsa_sha384()),
        Arc::new(EcdsaShaAlgorithm::ecdsa_sha512()),
        Arc::new(NoneAlgorithm::new()),
    ]
}

static DEFAULT_REGISTRY: Lazy<AlgorithmRegistry> =
    Lazy::new(AlgorithmRegistry::with_default_algorithms);

/// The process-wide default registry, built lazily on first use.
///
/// Callers that need different contents should construct their own
/// [`AlgorithmRegistry`] and pass it explicitly.
#[must_use]
pub fn default_registry() -> &'static AlgorithmRegistry {
    &DEFAULT_REGISTRY
}

/// Whether a constraint list permits only its members or blocks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    /// Only listed identifiers are usable.
    Permit,
    /// Listed identifiers are unusable.
    Block,
}

/// An allow-list or deny-list of algorithm identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmConstraints {
    constraint_type: ConstraintType,
    identifiers: BTreeSet<String>,
}

impl AlgorithmConstraints {
    /// Permit only the listed identifiers.
    #[must_use]
    pub fn permit_only<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            constraint_type: ConstraintType::Permit,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }

    /// Block the listed identifiers.
    #[must_use]
    pub fn block<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            constraint_type: ConstraintType::Block,
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }

    /// No constraints: an empty block list.
    #[must_use]
    pub fn no_constraints() -> Self {
        Self::block(Vec::<String>::new())
    }

    /// Block the unsecured `none` algorithm, the usual guard against
    /// signature stripping.
    #[must_use]
    pub fn block_none() -> Self {
        Self::block([identifiers::NONE])
    }

    /// Check one identifier against the list.
    pub fn check(&self, identifier: &str) -> JoseResult<()> {
        let permitted = match self.constraint_type {
            ConstraintType::Permit => self.identifiers.contains(identifier),
            ConstraintType::Block => !self.identifiers.contains(identifier),
        };
        if permitted {
            Ok(())
        } else {
            warn!(identifier, "algorithm rejected by constraints");
            Err(JoseError::DisallowedAlgorithm {
                identifier: identifier.to_string(),
            })
        }
    }
}

impl Default for AlgorithmConstraints {
    fn default() -> Self {
        Self::no_constraints()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_registered_identifier_space() {
        let registry = AlgorithmRegistry::with_default_algorithms();
        assert_eq!(
            registry.registered_identifiers(),
            ["ES256", "ES384", "ES512", "HS256", "HS384", "HS512", "RS256", "RS384", "RS512",
             "none"]
        );
        assert!(registry.get("HS256").is_some());
        assert!(registry.get("PS256").is_none());
    }

    #[test]
    fn lookup_returns_the_registered_instance() {
        let registry = AlgorithmRegistry::with_default_algorithms();
        let algorithm = registry.get("ES384").expect("registered");
        assert_eq!(algorithm.algorithm_identifier(), "ES384");
    }

    #[test]
    fn reinitialize_replaces_the_whole_table() {
        let registry = AlgorithmRegistry::with_default_algorithms();
        registry.reinitialize(vec![Arc::new(HmacShaAlgorithm::hmac_sha256())]);
        assert!(registry.is_available("HS256"));
        assert!(!registry.is_available("RS256"));
        assert_eq!(registry.registered_identifiers(), ["HS256"]);
    }

    #[test]
    fn register_adds_without_dropping_others() {
        let registry = AlgorithmRegistry::new();
        registry.register(Arc::new(NoneAlgorithm::new()));
        registry.register(Arc::new(HmacShaAlgorithm::hmac_sha512()));
        assert!(registry.is_available("none"));
        assert!(registry.is_available("HS512"));
    }

    #[test]
    fn permit_list_checks_membership() {
        let constraints = AlgorithmConstraints::permit_only(["HS256", "RS256"]);
        assert!(constraints.check("HS256").is_ok());
        assert!(matches!(
            constraints.check("ES256"),
            Err(JoseError::DisallowedAlgorithm { identifier }) if identifier == "ES256"
        ));
    }

    #[test]
    fn block_list_checks_absence() {
        let constraints = AlgorithmConstraints::block_none();
        assert!(constraints.check("HS256").is_ok());
        assert!(constraints.check("none").is_err());
    }

    #[test]
    fn no_constraints_permits_everything() {
        let constraints = AlgorithmConstraints::no_constraints();
        assert!(constraints.check("none").is_ok());
        assert!(constraints.check("anything-at-all").is_ok());
    }
}
