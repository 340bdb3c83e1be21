//! Exportable key descriptors
//!
//! A `KeyDescriptor` is the JWK-style form of a [`SecretKey`] that travels
//! in the request payload next to the ciphertext. It deliberately has no
//! field for a nonce; the nonce belongs to the share-link fragment, and
//! keeping it out of this type means it cannot end up in the server's
//! database by construction.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::secret_key::KEY_SIZE;
use super::SecretKey;

/// JWK key type for raw symmetric keys
pub const SYMMETRIC_KEY_TYPE: &str = "oct";
/// JWA name of the one cipher Sealbox speaks
pub const AES_128_GCM_ALG: &str = "A128GCM";

/// Errors that can occur while validating or rebuilding a key
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("unsupported key type: {0}")]
    KeyType(String),
    #[error("unsupported algorithm: {0}")]
    Algorithm(String),
    #[error("key material is not valid url-safe base64")]
    KeyEncoding,
    #[error("key material is empty")]
    EmptyKey,
    #[error("invalid key size, expected {KEY_SIZE}, got {0}")]
    KeySize(usize),
}

/// An exportable, JWK-style description of a [`SecretKey`]
///
/// The sender exports one of these per shared secret and submits it with the
/// ciphertext. The recipient rebuilds the key from it with
/// [`KeyDescriptor::to_key`]. Serialized form:
///
/// ```json
/// {"alg":"A128GCM","ext":true,"k":"...","key_ops":["encrypt","decrypt"],"kty":"oct"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// Intended algorithm, `A128GCM`
    pub alg: String,
    /// Whether the key is extractable; always true, the recipient must be
    /// able to use the raw material
    pub ext: bool,
    /// Raw key bytes, url-safe base64 without padding
    pub k: String,
    /// Permitted operations, `["encrypt", "decrypt"]`
    pub key_ops: Vec<String>,
    /// JWK key type, `oct` for raw symmetric keys
    pub kty: String,
}

impl KeyDescriptor {
    /// Export a key into its transportable descriptor form
    pub fn from_key(key: &SecretKey) -> Self {
        Self {
            alg: AES_128_GCM_ALG.to_string(),
            ext: true,
            k: URL_SAFE_NO_PAD.encode(key.bytes()),
            key_ops: vec!["encrypt".to_string(), "decrypt".to_string()],
            kty: SYMMETRIC_KEY_TYPE.to_string(),
        }
    }

    /// Rebuild the secret key this descriptor was exported from
    ///
    /// # Errors
    ///
    /// Returns an error if the key type or algorithm is not the one Sealbox
    /// uses, or if the key material does not decode to exactly `KEY_SIZE`
    /// bytes.
    pub fn to_key(&self) -> Result<SecretKey, DescriptorError> {
        if self.kty != SYMMETRIC_KEY_TYPE {
            return Err(DescriptorError::KeyType(self.kty.clone()));
        }
        if self.alg != AES_128_GCM_ALG {
            return Err(DescriptorError::Algorithm(self.alg.clone()));
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.k)
            .map_err(|_| DescriptorError::KeyEncoding)?;
        if bytes.len() != KEY_SIZE {
            return Err(DescriptorError::KeySize(bytes.len()));
        }
        SecretKey::from_slice(&bytes).map_err(|_| DescriptorError::KeySize(bytes.len()))
    }

    /// Structural checks the server applies before storing a descriptor
    ///
    /// The server never builds a cipher from the descriptor, so it only
    /// verifies that the key type is symmetric and the key material is
    /// well-formed, non-empty base64. Stricter checks stay client-side.
    ///
    /// # Errors
    ///
    /// Returns an error for non-`oct` key types and missing or undecodable
    /// key material.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.kty != SYMMETRIC_KEY_TYPE {
            return Err(DescriptorError::KeyType(self.kty.clone()));
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.k)
            .map_err(|_| DescriptorError::KeyEncoding)?;
        if bytes.is_empty() {
            return Err(DescriptorError::EmptyKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_export_round_trip() {
        let key = SecretKey::generate();
        let descriptor = KeyDescriptor::from_key(&key);

        assert_eq!(descriptor.kty, "oct");
        assert_eq!(descriptor.alg, "A128GCM");
        assert!(descriptor.ext);

        let rebuilt = descriptor.to_key().unwrap();
        assert_eq!(key.bytes(), rebuilt.bytes());
    }

    #[test]
    fn test_serialized_form_never_carries_a_nonce() {
        let descriptor = KeyDescriptor::from_key(&SecretKey::generate());
        let value = serde_json::to_value(&descriptor).unwrap();
        let object = value.as_object().unwrap();

        let mut fields: Vec<&str> = object.keys().map(String::as_str).collect();
        fields.sort_unstable();
        assert_eq!(fields, ["alg", "ext", "k", "key_ops", "kty"]);
    }

    #[test]
    fn test_wire_form_parses() {
        let raw = r#"{
            "alg": "A128GCM",
            "ext": true,
            "k": "AAAAAAAAAAAAAAAAAAAAAA",
            "key_ops": ["encrypt", "decrypt"],
            "kty": "oct"
        }"#;

        let descriptor: KeyDescriptor = serde_json::from_str(raw).unwrap();
        assert!(descriptor.validate().is_ok());
        assert!(descriptor.to_key().is_ok());
    }

    #[test]
    fn test_rejects_foreign_key_type() {
        let mut descriptor = KeyDescriptor::from_key(&SecretKey::generate());
        descriptor.kty = "RSA".to_string();

        assert!(matches!(
            descriptor.to_key(),
            Err(DescriptorError::KeyType(_))
        ));
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_rejects_foreign_algorithm() {
        let mut descriptor = KeyDescriptor::from_key(&SecretKey::generate());
        descriptor.alg = "A256GCM".to_string();

        assert!(matches!(
            descriptor.to_key(),
            Err(DescriptorError::Algorithm(_))
        ));
        // Server-side validation is looser and lets the algorithm pass.
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_key_material() {
        let mut descriptor = KeyDescriptor::from_key(&SecretKey::generate());

        descriptor.k = "not//valid??base64".to_string();
        assert!(descriptor.validate().is_err());
        assert!(descriptor.to_key().is_err());

        descriptor.k = String::new();
        assert!(matches!(
            descriptor.validate(),
            Err(DescriptorError::EmptyKey)
        ));

        // Valid base64, wrong length.
        descriptor.k = URL_SAFE_NO_PAD.encode([1u8; 8]);
        assert!(descriptor.validate().is_ok());
        assert!(matches!(
            descriptor.to_key(),
            Err(DescriptorError::KeySize(8))
        ));
    }
}
