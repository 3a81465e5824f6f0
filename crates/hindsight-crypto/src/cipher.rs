use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng, rand_core::RngCore},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption failed")]
    Encrypt,
    #[error("ciphertext is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("ciphertext shorter than the nonce prefix")]
    Truncated,
    #[error("decryption failed: wrong key or corrupted ciphertext")]
    Decrypt,
    #[error("decrypted payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Per-connection AES-256-GCM cipher for message bodies and attachment
/// references at rest.
///
/// Key material is the *raw* connection id, zero-padded to 32 bytes
/// (truncated if longer). Ciphertexts are `base64(nonce || ct)` so they fit
/// a TEXT column.
pub struct ContentCipher {
    key: [u8; 32],
}

impl ContentCipher {
    pub fn new(raw_connection_id: &str) -> Self {
        let mut key = [0u8; 32];
        let bytes = raw_connection_id.as_bytes();
        let len = bytes.len().min(32);
        key[..len].copy_from_slice(&bytes[..len]);
        Self { key }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encrypt)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, CipherError> {
        let bytes = BASE64.decode(encoded)?;
        if bytes.len() < NONCE_LEN {
            return Err(CipherError::Truncated);
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CipherError::Decrypt)?;

        Ok(String::from_utf8(plaintext)?)
    }
}
