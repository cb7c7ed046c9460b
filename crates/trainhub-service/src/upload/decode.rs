//! Base64 payload decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use sha2::{Digest, Sha256};

use trainhub_core::error::{AppError, ErrorKind};
use trainhub_core::result::AppResult;

/// Decode a base64 payload, dropping any `data:<mime>;base64,` header and
/// embedded whitespace first.
pub fn decode_content(raw: &str) -> AppResult<Bytes> {
    let payload = match raw.split_once(',') {
        Some((_, rest)) => rest,
        None => raw,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    STANDARD
        .decode(compact.as_bytes())
        .map(Bytes::from)
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Validation,
                format!("Invalid base64 content: {e}"),
                e,
            )
        })
}

/// Lower-case hex SHA-256 of `data`.
pub fn content_hash(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_base64() {
        assert_eq!(decode_content("aGVsbG8=").unwrap(), Bytes::from("hello"));
    }

    #[test]
    fn test_data_url_prefix_and_whitespace() {
        let decoded = decode_content("data:image/png;base64,aGVs\nbG8=").unwrap();
        assert_eq!(decoded, Bytes::from("hello"));
    }

    #[test]
    fn test_invalid_base64() {
        let err = decode_content("not base64!").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
