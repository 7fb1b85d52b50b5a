//! Symmetric sealing with XSalsa20Poly1305

use crate::{Result, WhistleError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use whistle_types::{Nonce, SecretKey, NONCE_LEN, TAG_LEN};
use xsalsa20poly1305::{
    aead::{Aead, KeyInit},
    XSalsa20Poly1305,
};

fn generate_nonce() -> Nonce {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Seal `plaintext` under `key` with a fresh nonce, returning base64 text
pub fn encrypt(plaintext: &str, key: &SecretKey) -> Result<String> {
    let cipher = XSalsa20Poly1305::new(key.into());
    let nonce_bytes = generate_nonce();
    let nonce = xsalsa20poly1305::Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| WhistleError::Encryption("Encryption failed".to_string()))?;

    let mut sealed = nonce_bytes.to_vec();
    sealed.extend(ciphertext);
    Ok(STANDARD.encode(sealed))
}

/// Open base64 text produced by [`encrypt`]
///
/// Fails as a whole on a wrong key or any modification of the input.
pub fn decrypt(encoded: &str, key: &SecretKey) -> Result<String> {
    let sealed = STANDARD
        .decode(encoded.trim())
        .map_err(|e| WhistleError::Decryption(format!("Invalid base64: {}", e)))?;

    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(WhistleError::Decryption(
            "Ciphertext too short".to_string(),
        ));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let cipher = XSalsa20Poly1305::new(key.into());
    let nonce = xsalsa20poly1305::Nonce::from_slice(nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| WhistleError::Decryption("Decryption failed".to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|_| WhistleError::Decryption("Plaintext is not valid UTF-8".to_string()))
}
