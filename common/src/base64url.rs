//! Unpadded, URL-safe base64 as used by every JOSE wire field.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::{JoseError, JoseResult};

/// Encode bytes without padding.
#[must_use]
pub fn encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Encode the UTF-8 bytes of a string without padding.
#[must_use]
pub fn encode_utf8(text: &str) -> String {
    URL_SAFE_NO_PAD.encode(text.as_bytes())
}

/// Decode an unpadded base64url string.
///
/// Padding characters and whitespace are not tolerated; any byte outside the
/// URL-safe alphabet is an error.
pub fn decode(text: &str) -> JoseResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(text.as_bytes())
        .map_err(|e| JoseError::Base64(e.to_string()))
}

/// Decode an unpadded base64url string into UTF-8 text.
pub fn decode_utf8(text: &str) -> JoseResult<String> {
    let bytes = decode(text)?;
    String::from_utf8(bytes).map_err(|e| JoseError::Base64(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"{\"alg\":\"HS256\"}";
        let encoded = encode(data);
        assert_eq!(encoded, "eyJhbGciOiJIUzI1NiJ9");
        assert_eq!(decode(&encoded).unwrap(), data);
    }

    #[test]
    fn empty_input() {
        assert_eq!(encode(b""), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn rejects_padding_and_standard_alphabet() {
        assert!(decode("eyJhbGciOiJIUzI1NiJ9==").is_err());
        // '+' and '/' belong to the standard alphabet, not the URL-safe one.
        assert!(decode("a+b/").is_err());
    }

    #[test]
    fn url_safe_alphabet_accepted() {
        let bytes = decode("_-_-").unwrap();
        assert_eq!(encode(&bytes), "_-_-");
    }
}
