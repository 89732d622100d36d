//! Symmetric encryption of individual column values.
//!
//! Values are encrypted with AES-256-GCM under a key derived from the
//! configured passphrase; the random nonce is prepended and the result
//! hex-encoded so ciphertexts fit in text columns. The authenticated
//! mode means ciphertexts produced by non-authenticated legacy schemes
//! are not readable.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};

use rowmap_types::Value;

use crate::error::MapError;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Passphrase-gated cipher for encrypted column values.
///
/// An empty or unset passphrase leaves the cipher unconfigured; any
/// encrypt/decrypt attempt then fails hard rather than passing values
/// through.
pub struct ValueCipher {
    key: Option<[u8; 32]>,
}

impl ValueCipher {
    /// Derive the cipher key from a passphrase, if one is configured.
    pub fn from_passphrase(passphrase: Option<&str>) -> Self {
        let key = passphrase
            .filter(|p| !p.is_empty())
            .map(|p| Sha256::digest(p.as_bytes()).into());
        Self { key }
    }

    /// Whether a passphrase is configured.
    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    /// Fail unless a passphrase is configured.
    pub fn ensure_configured(&self) -> Result<(), MapError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(missing_passphrase())
        }
    }

    /// Encrypt a value's canonical text rendering.
    pub fn encrypt(&self, value: &Value) -> Result<Value, MapError> {
        let cipher = self.cipher()?;
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), value.to_text().as_bytes())
            .map_err(|_| MapError::Cipher("encryption failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(Value::Text(hex::encode(out)))
    }

    /// Decrypt a hex-encoded ciphertext back to its text form.
    pub fn decrypt(&self, value: &Value) -> Result<Value, MapError> {
        let cipher = self.cipher()?;
        let raw = hex::decode(value.to_text())
            .map_err(|err| MapError::Cipher(format!("ciphertext is not valid hex: {err}")))?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(MapError::Cipher("ciphertext too short".into()));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| MapError::Cipher("ciphertext authentication failed".into()))?;
        let plaintext = String::from_utf8(plaintext)
            .map_err(|_| MapError::Cipher("decrypted value is not valid UTF-8".into()))?;
        Ok(Value::Text(plaintext))
    }

    fn cipher(&self) -> Result<Aes256Gcm, MapError> {
        let key = self.key.as_ref().ok_or_else(missing_passphrase)?;
        Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)))
    }
}

fn missing_passphrase() -> MapError {
    MapError::Configuration("no passphrase configured for encrypted column values".into())
}
