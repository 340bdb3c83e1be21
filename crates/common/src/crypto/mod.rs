//! Cryptographic primitives for Sealbox
//!
//! This module provides the cryptographic foundation for Sealbox's
//! zero-knowledge model:
//!
//! - **Encryption**: AES-128-GCM for sealing short secrets client-side
//! - **Key Transport**: JWK-style exportable key descriptors
//! - **Nonce Transport**: link nonces carried in URL fragments
//!
//! # Security Model
//!
//! ## Payload vs. fragment
//! A shared secret is split across two channels. The ciphertext and the
//! exportable [`KeyDescriptor`] travel in the request payload and are stored
//! by the server. The 96-bit [`LinkNonce`] travels only in the fragment of
//! the share link, which HTTP clients never transmit, so the server cannot
//! decrypt what it stores.
//!
//! ## Keys and nonces
//! Every shared secret gets its own fresh [`SecretKey`] and [`LinkNonce`].
//! Nothing is derived from a password and no key is reused across secrets,
//! so compromising one link reveals nothing about any other.
//!
//! ## Failure behavior
//! Decryption failures are deliberately opaque. A wrong key, a wrong nonce,
//! and a tampered ciphertext all surface as the same
//! [`CipherError::Authentication`], leaving an attacker nothing to probe.

mod descriptor;
mod link_nonce;
mod secret_key;

pub use descriptor::{DescriptorError, KeyDescriptor, AES_128_GCM_ALG, SYMMETRIC_KEY_TYPE};
pub use link_nonce::{LinkNonce, NonceError, NONCE_SIZE};
pub use secret_key::{CipherError, SecretKey, KEY_SIZE};
