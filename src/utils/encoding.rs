// src/utils/encoding.rs

//! Base64 helpers shared by extraction and URL synthesis.

use base64::Engine;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};

use crate::error::{AppError, Result};

/// Standard alphabet with canonical padding. Non-zero trailing bits are
/// accepted, as upstream payloads are not always canonically encoded.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decode base64 into raw bytes.
pub fn decode_base64(input: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    LENIENT.decode(input)
}

/// Decode base64 into UTF-8 text.
///
/// Both invalid base64 and invalid UTF-8 surface as [`AppError::Decode`]
/// carrying `context` and the underlying detail.
pub fn decode_base64_utf8(input: &str, context: &str) -> Result<String> {
    let bytes = decode_base64(input).map_err(|e| AppError::decode(context, e))?;
    String::from_utf8(bytes).map_err(|e| AppError::decode(context, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_text() {
        assert_eq!(decode_base64_utf8("MTIz", "ts").unwrap(), "123");
        assert_eq!(decode_base64_utf8("YWJj", "rnd").unwrap(), "abc");
    }

    #[test]
    fn test_trailing_bits_are_tolerated() {
        // "YR==" carries non-zero bits past the single decoded byte
        assert_eq!(decode_base64_utf8("YR==", "ts").unwrap(), "a");
    }

    #[test]
    fn test_missing_padding_is_rejected() {
        assert!(decode_base64_utf8("YQ", "ts").is_err());
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        // 0xFF 0xFE 0xFD
        let err = decode_base64_utf8("//79", "blob").unwrap_err();
        match err {
            AppError::Decode { context, .. } => assert_eq!(context, "blob"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
