//! Link nonces: the fragment half of a share link
//!
//! A `LinkNonce` is the 96-bit AES-GCM nonce for exactly one shared secret.
//! It is never stored server-side and never appears in a request path or
//! body; its only transport is the `#fragment` of the share link.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Size of an AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Errors that can occur while reconstructing a nonce
#[derive(Debug, thiserror::Error)]
pub enum NonceError {
    #[error("invalid nonce size, expected {NONCE_SIZE}, got {0}")]
    Size(usize),
    #[error("nonce is not valid url-safe base64")]
    Encoding,
}

/// A 96-bit nonce carried in the fragment of a share link
///
/// Generated fresh alongside each [`SecretKey`](super::SecretKey); the pair
/// is used for a single encryption and never again.
#[derive(Clone, PartialEq, Eq)]
pub struct LinkNonce([u8; NONCE_SIZE]);

impl std::fmt::Debug for LinkNonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LinkNonce(..)")
    }
}

impl From<[u8; NONCE_SIZE]> for LinkNonce {
    fn from(bytes: [u8; NONCE_SIZE]) -> Self {
        LinkNonce(bytes)
    }
}

impl LinkNonce {
    /// Generate a new random nonce using a cryptographically secure RNG
    pub fn generate() -> Self {
        let mut buff = [0; NONCE_SIZE];
        getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
        Self(buff)
    }

    /// Create a nonce from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `NONCE_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, NonceError> {
        if data.len() != NONCE_SIZE {
            return Err(NonceError::Size(data.len()));
        }
        let mut buff = [0; NONCE_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Get a reference to the raw nonce bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Encode the nonce the way it appears in a share-link fragment
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Decode a nonce from its share-link fragment form
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not url-safe base64 or does not
    /// decode to exactly `NONCE_SIZE` bytes.
    pub fn from_base64url(encoded: &str) -> Result<Self, NonceError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| NonceError::Encoding)?;
        Self::from_slice(&bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_base64url_round_trip() {
        let nonce = LinkNonce::generate();
        let encoded = nonce.to_base64url();
        let decoded = LinkNonce::from_base64url(&encoded).unwrap();

        assert_eq!(nonce, decoded);
    }

    #[test]
    fn test_fragment_form_has_no_padding_or_unsafe_chars() {
        let nonce = LinkNonce::from([0xFF; NONCE_SIZE]);
        let encoded = nonce.to_base64url();

        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
    }

    #[test]
    fn test_generate_is_fresh() {
        // Not a randomness test, just a guard against a constant output.
        assert_ne!(LinkNonce::generate(), LinkNonce::generate());
    }

    #[test]
    fn test_nonce_size_validation() {
        assert!(LinkNonce::from_slice(&[1u8; 8]).is_err());
        assert!(LinkNonce::from_slice(&[1u8; 16]).is_err());
        assert!(LinkNonce::from_slice(&[1u8; NONCE_SIZE]).is_ok());
    }

    #[test]
    fn test_rejects_standard_base64() {
        // 12 bytes of 0xFF encode as 16 '/' in the standard alphabet, which
        // the url-safe decoder must refuse.
        assert!(LinkNonce::from_base64url("////////////////").is_err());
    }
}
