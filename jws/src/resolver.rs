//! Verification-key resolution.
//!
//! Strategies that map a received message's headers to a concrete
//! verification key. Resolvers own their candidate keys; the resolved
//! reference is borrowed back to the caller for the verification call.
//!
//! Both resolvers can optionally fall back to probing every candidate by
//! trial verification. That fallback is O(n) in the candidate count and
//! silently tolerates senders that omit key-identifying headers, so it is
//! off unless explicitly enabled, and probes are debug-logged. Probe order
//! is candidate insertion order; the first success wins and no further
//! meaning attaches to the order.

use std::collections::HashMap;

use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::debug;

use quill_common::{base64url, JoseError, JoseResult};
use quill_jwa::registry::AlgorithmConstraints;
use quill_jwa::{default_registry, JoseKey, ProviderContext};

use crate::jws::JsonWebSignature;

/// Maps a received message (and the chain of already-processed outer
/// messages, for nested structures) to a verification key.
pub trait VerificationKeyResolver: Send + Sync {
    /// Resolve the key to verify `jws` with.
    ///
    /// # Errors
    ///
    /// Fails with [`JoseError::UnresolvableKey`] describing the criteria
    /// that were tried.
    fn resolve(
        &self,
        jws: &JsonWebSignature,
        nesting_context: &[&JsonWebSignature],
    ) -> JoseResult<&JoseKey>;
}

/// Trial-verify `jws` against one candidate.
///
/// Probes run against the default registry with the `none` algorithm
/// blocked, so an unsecured message can never claim a key.
fn probe(jws: &JsonWebSignature, key: &JoseKey) -> bool {
    jws.verify_signature(
        Some(key),
        default_registry(),
        &ProviderContext::default(),
        &AlgorithmConstraints::block_none(),
    )
    .unwrap_or(false)
}

struct CertifiedCandidate {
    key: JoseKey,
}

/// Resolves keys by X.509 certificate thumbprint headers.
///
/// Candidates are (certificate DER, public key) pairs supplied by the
/// caller; certificate parsing itself happens upstream. Each candidate is
/// indexed by both the SHA-1 (`x5t`) and SHA-256 (`x5t#S256`) thumbprint of
/// its DER encoding.
pub struct X509ThumbprintKeyResolver {
    candidates: Vec<CertifiedCandidate>,
    by_sha1: HashMap<String, usize>,
    by_sha256: HashMap<String, usize>,
    try_all_on_no_thumbprint: bool,
}

impl X509ThumbprintKeyResolver {
    /// Index candidate certificates by both thumbprints.
    #[must_use]
    pub fn new(candidates: impl IntoIterator<Item = (Vec<u8>, JoseKey)>) -> Self {
        let mut resolver = Self {
            candidates: Vec::new(),
            by_sha1: HashMap::new(),
            by_sha256: HashMap::new(),
            try_all_on_no_thumbprint: false,
        };
        for (certificate_der, key) in candidates {
            let index = resolver.candidates.len();
            resolver
                .by_sha1
                .insert(base64url::encode(&Sha1::digest(&certificate_der)), index);
            resolver
                .by_sha256
                .insert(base64url::encode(&Sha256::digest(&certificate_der)), index);
            resolver.candidates.push(CertifiedCandidate { key });
        }
        resolver
    }

    /// Opt into probing every candidate by trial verification when the
    /// message carries no thumbprint header at all.
    pub fn set_try_all_on_no_thumbprint(&mut self, try_all: bool) {
        self.try_all_on_no_thumbprint = try_all;
    }

    fn lookup(&self, sha1: Option<&str>, sha256: Option<&str>) -> Option<&JoseKey> {
        if let Some(thumbprint) = sha256 {
            if let Some(&index) = self.by_sha256.get(thumbprint) {
                return Some(&self.candidates[index].key);
            }
        }
        if let Some(thumbprint) = sha1 {
            if let Some(&index) = self.by_sha1.get(thumbprint) {
                return Some(&self.candidates[index].key);
            }
        }
        None
    }
}

impl VerificationKeyResolver for X509ThumbprintKeyResolver {
    fn resolve(
        &self,
        jws: &JsonWebSignature,
        _nesting_context: &[&JsonWebSignature],
    ) -> JoseResult<&JoseKey> {
        let sha1 = jws.x509_thumbprint_header_value()?;
        let sha256 = jws.x509_sha256_thumbprint_header_value()?;
        if sha1.is_some() || sha256.is_some() {
            return self.lookup(sha1, sha256).ok_or_else(|| {
                JoseError::unresolvable_key(format!(
                    "no candidate certificate matched x5t={sha1:?} or x5t#S256={sha256:?} \
                     among {} candidates",
                    self.candidates.len()
                ))
            });
        }
        if self.try_all_on_no_thumbprint {
            debug!(
                candidates = self.candidates.len(),
                "no thumbprint header; falling back to trial verification"
            );
            for candidate in &self.candidates {
                if probe(jws, &candidate.key) {
                    return Ok(&candidate.key);
                }
            }
            return Err(JoseError::unresolvable_key(format!(
                "the message has no x5t or x5t#S256 header and trial verification \
                 failed against all {} candidates",
                self.candidates.len()
            )));
        }
        Err(JoseError::unresolvable_key(
            "the message has no x5t or x5t#S256 header (and trial verification is disabled)",
        ))
    }
}

/// Resolves keys by the `kid` header from a list of (kid, key) candidates,
/// the shape of a locally held JWK set.
pub struct KidVerificationKeyResolver {
    candidates: Vec<(String, JoseKey)>,
    try_all_on_no_match: bool,
}

impl KidVerificationKeyResolver {
    /// Build a resolver over (key id, key) candidates.
    #[must_use]
    pub fn new(candidates: impl IntoIterator<Item = (String, JoseKey)>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
            try_all_on_no_match: false,
        }
    }

    /// Opt into probing every candidate by trial verification when no
    /// candidate's id matches (or the message has no `kid` at all).
    pub fn set_try_all_on_no_match(&mut self, try_all: bool) {
        self.try_all_on_no_match = try_all;
    }
}

impl VerificationKeyResolver for KidVerificationKeyResolver {
    fn resolve(
        &self,
        jws: &JsonWebSignature,
        _nesting_context: &[&JsonWebSignature],
    ) -> JoseResult<&JoseKey> {
        let key_id = jws.key_id_header_value()?;
        if let Some(key_id) = key_id {
            if let Some((_, key)) = self.candidates.iter().find(|(id, _)| id == key_id) {
                return Ok(key);
            }
        }
        if self.try_all_on_no_match {
            debug!(
                candidates = self.candidates.len(),
                "no kid match; falling back to trial verification"
            );
            for (id, key) in &self.candidates {
                if probe(jws, key) {
                    debug!(kid = %id, "trial verification selected a candidate");
                    return Ok(key);
                }
            }
        }
        Err(JoseError::unresolvable_key(format!(
            "no candidate key matched kid={key_id:?} among {} candidates{}",
            self.candidates.len(),
            if self.try_all_on_no_match {
                ", including by trial verification"
            } else {
                " (trial verification is disabled)"
            }
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_message(key: &JoseKey, kid: Option<&str>) -> JsonWebSignature {
        let mut jws = JsonWebSignature::new();
        jws.set_algorithm_header_value("HS256");
        if let Some(kid) = kid {
            jws.set_key_id_header_value(kid);
        }
        jws.set_payload("resolver test payload");
        let wire = jws
            .compact_serialization(Some(key), default_registry(), &ProviderContext::default())
            .unwrap();
        JsonWebSignature::from_compact_serialization(&wire).unwrap()
    }

    #[test]
    fn kid_resolver_matches_by_id() {
        let right = JoseKey::symmetric(vec![1u8; 32]);
        let wrong = JoseKey::symmetric(vec![2u8; 32]);
        let resolver = KidVerificationKeyResolver::new([
            ("other".to_string(), wrong),
            ("mine".to_string(), right.clone()),
        ]);
        let jws = signed_message(&right, Some("mine"));
        let resolved = resolver.resolve(&jws, &[]).unwrap();
        assert!(jws
            .verify_signature(
                Some(resolved),
                default_registry(),
                &ProviderContext::default(),
                &AlgorithmConstraints::block_none()
            )
            .unwrap());
    }

    #[test]
    fn kid_resolver_without_fallback_fails_on_missing_header() {
        let key = JoseKey::symmetric(vec![1u8; 32]);
        let resolver = KidVerificationKeyResolver::new([("a".to_string(), key.clone())]);
        let jws = signed_message(&key, None);
        assert!(matches!(
            resolver.resolve(&jws, &[]),
            Err(JoseError::UnresolvableKey(_))
        ));
    }

    #[test]
    fn kid_resolver_fallback_probes_candidates() {
        let right = JoseKey::symmetric(vec![1u8; 32]);
        let wrong = JoseKey::symmetric(vec![2u8; 32]);
        let mut resolver = KidVerificationKeyResolver::new([
            ("other".to_string(), wrong),
            ("unlabeled".to_string(), right.clone()),
        ]);
        resolver.set_try_all_on_no_match(true);
        let jws = signed_message(&right, None);
        let resolved = resolver.resolve(&jws, &[]).unwrap();
        assert!(probe(&jws, resolved));
    }

    #[test]
    fn thumbprint_resolver_matches_either_digest() {
        let key = JoseKey::symmetric(vec![3u8; 32]);
        let certificate_der = b"not a real certificate, but stable bytes".to_vec();
        let resolver =
            X509ThumbprintKeyResolver::new([(certificate_der.clone(), key.clone())]);

        let sha1_thumbprint = base64url::encode(&Sha1::digest(&certificate_der));
        let sha256_thumbprint = base64url::encode(&Sha256::digest(&certificate_der));

        let mut jws = JsonWebSignature::new();
        jws.set_algorithm_header_value("HS256");
        jws.set_payload("data");
        jws.headers_mut().set_header("x5t", sha1_thumbprint);
        let wire = jws
            .compact_serialization(Some(&key), default_registry(), &ProviderContext::default())
            .unwrap();
        let received = JsonWebSignature::from_compact_serialization(&wire).unwrap();
        assert!(resolver.resolve(&received, &[]).is_ok());

        let mut jws = JsonWebSignature::new();
        jws.set_algorithm_header_value("HS256");
        jws.set_payload("data");
        jws.headers_mut().set_header("x5t#S256", sha256_thumbprint);
        let wire = jws
            .compact_serialization(Some(&key), default_registry(), &ProviderContext::default())
            .unwrap();
        let received = JsonWebSignature::from_compact_serialization(&wire).unwrap();
        assert!(resolver.resolve(&received, &[]).is_ok());
    }

    #[test]
    fn thumbprint_resolver_reports_what_it_tried() {
        let key = JoseKey::symmetric(vec![3u8; 32]);
        let resolver = X509ThumbprintKeyResolver::new([(vec![1, 2, 3], key.clone())]);
        let mut jws = JsonWebSignature::new();
        jws.set_algorithm_header_value("HS256");
        jws.set_payload("data");
        jws.headers_mut().set_header("x5t", "bm90LWEtbWF0Y2g");
        let wire = jws
            .compact_serialization(Some(&key), default_registry(), &ProviderContext::default())
            .unwrap();
        let received = JsonWebSignature::from_compact_serialization(&wire).unwrap();
        let err = resolver.resolve(&received, &[]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("x5t"));
    }

    #[test]
    fn thumbprint_fallback_is_opt_in() {
        let key = JoseKey::symmetric(vec![4u8; 32]);
        let mut resolver = X509ThumbprintKeyResolver::new([(vec![9, 9, 9], key.clone())]);
        let jws = signed_message(&key, None);
        assert!(resolver.resolve(&jws, &[]).is_err());
        resolver.set_try_all_on_no_thumbprint(true);
        assert!(resolver.resolve(&jws, &[]).is_ok());
    }
}
