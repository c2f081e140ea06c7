//! The dot-separated compact serialization.
//!
//! A compact message is 2 to 5 dot-separated parts. Only the trailing part
//! may be empty: on the producing side that represents "no signature yet" or
//! a deliberately omitted trailing element, on the consuming side a wire
//! string ending in `.` yields one explicit empty trailing part. Any other
//! empty part is malformed.

use quill_common::{JoseError, JoseResult};

/// Join parts with `.`, treating an absent part as empty.
///
/// # Errors
///
/// Fails with [`JoseError::EmptyPart`] when any part except the trailing
/// one is empty or absent.
pub fn serialize(parts: &[Option<&str>]) -> JoseResult<String> {
    let last = parts.len().saturating_sub(1);
    let mut out = String::new();
    for (index, part) in parts.iter().enumerate() {
        let text = part.unwrap_or("");
        if text.is_empty() && index != last {
            return Err(JoseError::EmptyPart { index });
        }
        if index > 0 {
            out.push('.');
        }
        out.push_str(text);
    }
    Ok(out)
}

/// Split on `.`, validating that only the trailing part is empty.
///
/// A trailing `.` in the input produces an explicit empty final part, the
/// detached/unsigned wire forms.
pub fn deserialize(text: &str) -> JoseResult<Vec<String>> {
    let parts: Vec<&str> = text.split('.').collect();
    let last = parts.len() - 1;
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() && index != last {
            return Err(JoseError::EmptyPart { index });
        }
    }
    Ok(parts.into_iter().map(str::to_string).collect())
}
