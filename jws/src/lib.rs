//! Signed JOSE messages.
//!
//! The pieces that turn the algorithm layer into a wire protocol: the
//! dot-separated compact serialization, the ordered protected-header model,
//! the `JsonWebSignature` produce/consume state machine, and the pluggable
//! strategies that map message headers to verification keys.

pub mod compact;
pub mod headers;
pub mod jws;
pub mod resolver;

pub use headers::{header_names, Headers};
pub use jws::JsonWebSignature;
pub use resolver::{
    KidVerificationKeyResolver, VerificationKeyResolver, X509ThumbprintKeyResolver,
};
