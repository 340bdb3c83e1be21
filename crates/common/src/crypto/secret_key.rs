//! Secret encryption using AES-128-GCM
//!
//! This module provides the symmetric key a sender mints for each shared
//! secret. Each `SecretKey` seals exactly one secret:
//! - **Per-secret keys**: compromising one link reveals nothing about others
//! - **Explicit nonces**: the nonce is transported separately from the
//!   ciphertext, in the share link's URL fragment
//! - **Opaque failures**: wrong key, wrong nonce, and tampered ciphertext are
//!   indistinguishable to the caller

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Key, Nonce};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::LinkNonce;

/// Size of an AES-128-GCM key in bytes (128 bits)
pub const KEY_SIZE: usize = 16;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("invalid key size, expected {KEY_SIZE}, got {0}")]
    KeySize(usize),
    #[error("encryption failed")]
    Encryption,
    #[error("ciphertext failed authentication")]
    Authentication,
}

/// A 128-bit symmetric key used to seal a single shared secret
///
/// Keys are generated on the sender's machine and never sent to the server
/// in raw form; they travel inside an exportable
/// [`KeyDescriptor`](super::KeyDescriptor). Key material is wiped from
/// memory on drop.
///
/// # Examples
///
/// ```ignore
/// let key = SecretKey::generate();
/// let nonce = LinkNonce::generate();
///
/// let ciphertext = key.encrypt(&nonce, b"hunter2")?;
/// let recovered = key.decrypt(&nonce, &ciphertext)?;
/// assert_eq!(recovered.as_slice(), b"hunter2");
/// ```
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_SIZE]);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey(..)")
    }
}

impl From<[u8; KEY_SIZE]> for SecretKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        SecretKey(bytes)
    }
}

impl SecretKey {
    /// Generate a new random key using a cryptographically secure RNG
    pub fn generate() -> Self {
        let mut buff = [0; KEY_SIZE];
        getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
        Self(buff)
    }

    /// Create a key from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, CipherError> {
        if data.len() != KEY_SIZE {
            return Err(CipherError::KeySize(data.len()));
        }
        let mut buff = [0; KEY_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Get a reference to the raw key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Encrypt a plaintext under this key and an explicit nonce
    ///
    /// The output is `ciphertext || auth_tag (16 bytes)`. The nonce is not
    /// embedded; callers transport it out of band in the share link
    /// fragment. A nonce must never be reused with the same key, which in
    /// practice means one freshly generated nonce per key.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying cipher rejects the input, which
    /// only happens for pathologically large plaintexts.
    pub fn encrypt(&self, nonce: &LinkNonce, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let key = Key::<Aes128Gcm>::from_slice(self.bytes());
        let cipher = Aes128Gcm::new(key);
        cipher
            .encrypt(Nonce::from_slice(nonce.bytes()), plaintext)
            .map_err(|_| CipherError::Encryption)
    }

    /// Decrypt a ciphertext produced by [`SecretKey::encrypt`]
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Authentication`] for any failure: a wrong key,
    /// a wrong nonce, or a ciphertext that was altered in any single byte.
    /// The variants are deliberately not distinguished.
    pub fn decrypt(&self, nonce: &LinkNonce, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let key = Key::<Aes128Gcm>::from_slice(self.bytes());
        let cipher = Aes128Gcm::new(key);
        cipher
            .decrypt(Nonce::from_slice(nonce.bytes()), ciphertext)
            .map_err(|_| CipherError::Authentication)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let key = SecretKey::generate();
        let nonce = LinkNonce::generate();
        let data = b"hello world, this is a short shared secret";

        let encrypted = key.encrypt(&nonce, data).unwrap();
        let decrypted = key.decrypt(&nonce, &encrypted).unwrap();

        assert_eq!(data.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_key_size_validation() {
        let too_short = [1u8; 8];
        let too_long = [1u8; 32];

        assert!(SecretKey::from_slice(&too_short).is_err());
        assert!(SecretKey::from_slice(&too_long).is_err());

        let just_right = [1u8; KEY_SIZE];
        assert!(SecretKey::from_slice(&just_right).is_ok());
    }

    #[test]
    fn test_any_single_byte_flip_fails_authentication() {
        let key = SecretKey::generate();
        let nonce = LinkNonce::generate();

        let encrypted = key.encrypt(&nonce, b"hunter2").unwrap();

        for i in 0..encrypted.len() {
            let mut corrupted = encrypted.clone();
            corrupted[i] ^= 0xFF;
            let result = key.decrypt(&nonce, &corrupted);
            assert!(result.is_err(), "flip at byte {} went undetected", i);
        }
    }

    #[test]
    fn test_wrong_nonce_fails_authentication() {
        let key = SecretKey::generate();
        let nonce = LinkNonce::generate();
        let other_nonce = LinkNonce::generate();

        let encrypted = key.encrypt(&nonce, b"hunter2").unwrap();
        assert!(key.decrypt(&other_nonce, &encrypted).is_err());
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let key = SecretKey::generate();
        let other_key = SecretKey::generate();
        let nonce = LinkNonce::generate();

        let encrypted = key.encrypt(&nonce, b"hunter2").unwrap();
        assert!(other_key.decrypt(&nonce, &encrypted).is_err());
    }

    #[test]
    fn test_empty_plaintext() {
        let key = SecretKey::generate();
        let nonce = LinkNonce::generate();

        let encrypted = key.encrypt(&nonce, b"").unwrap();
        let decrypted = key.decrypt(&nonce, &encrypted).unwrap();

        assert!(decrypted.is_empty());
    }
}
