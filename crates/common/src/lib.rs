/**
 * Cryptographic types and operations.
 *  - AES-128-GCM secret keys and link nonces
 *  - JWK-style exportable key descriptors
 */
pub mod crypto;
/**
 * Share-link composition and parsing.
 * The decryption nonce rides in the URL fragment,
 *  which clients never transmit to the server.
 */
pub mod link;
/**
 * The state machine a recipient walks through
 *  while revealing a shared secret.
 */
pub mod reveal;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::crypto::{KeyDescriptor, LinkNonce, SecretKey};
    pub use crate::link::{LinkError, ShareLink};
    pub use crate::reveal::{RevealFailure, RevealState};
    pub use crate::version::build_info;
}
