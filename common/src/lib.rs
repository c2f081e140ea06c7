//! Shared foundations for the quill JOSE workspace.
//!
//! This crate holds the pieces every other member depends on: the single
//! workspace-wide error taxonomy, fixed-width big-endian byte conversions,
//! constant-time comparison, the unpadded base64url codec, and the ordered
//! JSON object codec used by the protected-header model.

pub mod base64url;
pub mod bytes;
pub mod error;
pub mod json;

pub use error::{JoseError, JoseResult};
