//! Report sealing using NaCl secretbox (XSalsa20-Poly1305)
//!
//! Sealed reports travel as `base64(nonce || ciphertext)` so they can be
//! submitted as an ordinary JSON string.

mod secretbox;

pub use secretbox::{decrypt, encrypt};

use crate::{Result, WhistleError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use whistle_types::SecretKey;

/// Generate a random 256-bit key
pub fn generate_key() -> SecretKey {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}

/// Parse a key given as 64 hex characters or as base64 of 32 bytes
pub fn parse_key(text: &str) -> Result<SecretKey> {
    let text = text.trim();
    let bytes = if text.len() == 64 && text.chars().all(|c| c.is_ascii_hexdigit()) {
        hex::decode(text).map_err(|e| WhistleError::InvalidSecretKey(e.to_string()))?
    } else {
        STANDARD
            .decode(text)
            .map_err(|e| WhistleError::InvalidSecretKey(e.to_string()))?
    };

    SecretKey::try_from(bytes.as_slice()).map_err(|_| {
        WhistleError::InvalidSecretKey(format!("expected 32 bytes, got {}", bytes.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_differ() {
        let a = generate_key();
        let b = generate_key();
        assert_ne!(a, [0u8; 32]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_key_hex_and_base64() {
        let key = generate_key();
        assert_eq!(parse_key(&hex::encode(key)).unwrap(), key);
        assert_eq!(parse_key(&STANDARD.encode(key)).unwrap(), key);
    }

    #[test]
    fn test_parse_key_rejects_wrong_length() {
        assert!(matches!(
            parse_key(&hex::encode([1u8; 16])),
            Err(WhistleError::InvalidSecretKey(_))
        ));
        assert!(parse_key("not a key").is_err());
    }
}
