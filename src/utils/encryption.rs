use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::Aes256Gcm;
use rand::RngCore;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

type Nonce = [u8; 12];

const FORMAT_VERSION: u8 = 0x01;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Encryption failed: {0}")]
    Encryption(String),
    #[error("Decryption failed: {0}")]
    Decryption(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Hex decode error: {0}")]
    HexDecode(String),
    #[error("Base64 decode error: {0}")]
    Base64Decode(String),
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(String),
}

/// Build the cipher from a 64 character hex key
fn cipher_from_hex(key_hex: &str) -> Result<Aes256Gcm, CryptoError> {
    // 64 hex chars -> 32 key bytes
    let key_bytes = hex::decode(key_hex)
        .map_err(|e| CryptoError::HexDecode(e.to_string()))?;

    let key: [u8; 32] = key_bytes.try_into()
        .map_err(|_| CryptoError::InvalidKey(
            "Encryption key must be 32 bytes (256 bits)".to_string(),
        ))?;

    Ok(Aes256Gcm::new(&key.into()))
}

/// Check a key without encrypting anything
pub fn validate_key(key_hex: &str) -> Result<(), CryptoError> {
    cipher_from_hex(key_hex).map(|_| ())
}

/// Encrypt a contact value (chat id, phone number) for storage.
/// Returns base64 of `[version_byte][nonce(12)][ciphertext]`.
pub fn encrypt_contact(plaintext: &str, key_hex: &str) -> Result<String, CryptoError> {
    let cipher = cipher_from_hex(key_hex)?;

    // Fresh 96-bit nonce per value, from the OS CSPRNG
    let mut nonce_bytes: Nonce = [0u8; 12];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt((&nonce_bytes).into(), plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    // Layout: version, nonce, ciphertext with tag
    let mut encrypted_data = Vec::with_capacity(1 + 12 + ciphertext.len());
    encrypted_data.push(FORMAT_VERSION);
    encrypted_data.extend_from_slice(&nonce_bytes);
    encrypted_data.extend_from_slice(&ciphertext);

    // Stored in a TEXT column
    Ok(BASE64.encode(encrypted_data))
}

/// Reverse of [`encrypt_contact`]
pub fn decrypt_contact(encrypted_b64: &str, key_hex: &str) -> Result<String, CryptoError> {
    let encrypted_data = BASE64
        .decode(encrypted_b64)
        .map_err(|e| CryptoError::Base64Decode(e.to_string()))?;

    if encrypted_data.len() < 13 {
        return Err(CryptoError::InvalidData(
            "Encrypted data too short (need at least 1 + 12 bytes for version + nonce)"
                .to_string(),
        ));
    }

    // Only the v1 layout exists so far
    let version = encrypted_data[0];
    if version != FORMAT_VERSION {
        return Err(CryptoError::InvalidData(format!(
            "Unsupported encryption version: {}",
            version
        )));
    }

    let cipher = cipher_from_hex(key_hex)?;

    // Split nonce from ciphertext
    let nonce: Nonce = encrypted_data[1..13]
        .try_into()
        .map_err(|_| CryptoError::InvalidData("Failed to extract nonce".to_string()))?;

    // Fails on a wrong key or tampered bytes
    let plaintext = cipher
        .decrypt((&nonce).into(), &encrypted_data[13..])
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::Utf8Error(e.to_string()))
}
