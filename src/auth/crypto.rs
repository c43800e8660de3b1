//! Reversible password storage.
//!
//! Stored passwords are encrypted, not hashed: the login flow decrypts the
//! stored value and compares plaintexts. This is weaker than a salted one-way
//! hash, since anyone holding `JWT_SECRET` can recover every password.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use sha2::{Digest, Sha256};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("failed to initialize cipher")]
    Cipher,
    #[error("failed to encrypt payload")]
    Encryption,
    #[error("ciphertext is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("ciphertext too short")]
    CiphertextTooShort,
    #[error("ciphertext failed authentication")]
    Decryption,
    #[error("decrypted payload is not valid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Encrypts and decrypts stored passwords with a key derived from the server secret.
#[derive(Clone)]
pub struct PasswordCipher {
    key: [u8; 32],
}

impl PasswordCipher {
    pub fn new(secret: &str) -> Self {
        Self {
            key: Sha256::digest(secret.as_bytes()).into(),
        }
    }

    fn cipher(&self) -> Result<ChaCha20Poly1305, CryptoError> {
        ChaCha20Poly1305::new_from_slice(&self.key).map_err(|_| CryptoError::Cipher)
    }

    /// Returns `base64(nonce || ciphertext)` with a fresh nonce per call.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cipher = self.cipher()?;
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encryption)?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(payload))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let payload = STANDARD.decode(encoded)?;
        if payload.len() < NONCE_LEN {
            return Err(CryptoError::CiphertextTooShort);
        }
        let (nonce, ciphertext) = payload.split_at(NONCE_LEN);

        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decryption)?;
        Ok(String::from_utf8(plaintext)?)
    }
}
