//! The recipient's reveal flow as a state machine
//!
//! Opening a share link walks through exactly one of two paths:
//!
//! ```text
//! Loading -> Decoding -> Revealed
//!    \          \
//!     +----------+--> Failed
//! ```
//!
//! `Revealed` and `Failed` are terminal. There are no retry transitions; a
//! link that failed stays failed until the recipient starts over with a
//! fresh state. The recovered plaintext lives only in the `Revealed` state
//! and is wiped when the state is dropped.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use crate::crypto::{DescriptorError, KeyDescriptor, LinkNonce};
use crate::link::LinkError;

/// Why a reveal ended in `Failed`
///
/// Link-format problems, missing records, and transport faults each keep
/// their own variant so the recipient can be told what went wrong before any
/// cryptography ran. Everything that happens after the key is rebuilt
/// collapses into [`RevealFailure::Decrypt`]; a wrong nonce and a tampered
/// ciphertext are indistinguishable on purpose.
#[derive(Debug, thiserror::Error)]
pub enum RevealFailure {
    #[error("invalid share link: {0}")]
    Link(#[from] LinkError),
    #[error("this shared secret does not exist or has expired")]
    NotFound,
    #[error("could not reach the server: {0}")]
    Transport(String),
    #[error("invalid key descriptor: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("could not decrypt the shared secret")]
    Decrypt,
}

/// Where a recipient is in the reveal flow
pub enum RevealState {
    /// Fetching the stored record by id
    Loading,
    /// Record in hand, ready to rebuild the key and decrypt
    Decoding {
        descriptor: KeyDescriptor,
        ciphertext: String,
    },
    /// The secret, recovered and held only in memory
    Revealed { plaintext: Zeroizing<String> },
    /// Terminal failure; the reason is safe to show the recipient
    Failed { reason: RevealFailure },
}

// Both the descriptor (raw key material) and the plaintext must never leak
// through logging, so Debug names the state and nothing else.
impl std::fmt::Debug for RevealState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevealState::Loading => write!(f, "Loading"),
            RevealState::Decoding { .. } => write!(f, "Decoding"),
            RevealState::Revealed { .. } => write!(f, "Revealed"),
            RevealState::Failed { reason } => write!(f, "Failed({})", reason),
        }
    }
}

impl RevealState {
    /// Every reveal starts here
    pub fn start() -> Self {
        RevealState::Loading
    }

    /// `Loading -> Decoding` once the stored record has been fetched
    ///
    /// A no-op from any other state.
    pub fn loaded(self, descriptor: KeyDescriptor, ciphertext: String) -> Self {
        match self {
            RevealState::Loading => RevealState::Decoding {
                descriptor,
                ciphertext,
            },
            other => other,
        }
    }

    /// Abort into `Failed` from either in-flight state
    ///
    /// Terminal states are left untouched, which is what makes them
    /// terminal: no event can resurrect a finished reveal.
    pub fn failed(self, reason: RevealFailure) -> Self {
        match self {
            RevealState::Loading | RevealState::Decoding { .. } => {
                RevealState::Failed { reason }
            }
            other => other,
        }
    }

    /// `Decoding -> Revealed | Failed`, consuming the fetched record
    ///
    /// Rebuilds the key from the descriptor and opens the ciphertext with
    /// the nonce recovered from the link fragment. A no-op from any state
    /// but `Decoding`.
    pub fn reveal(self, nonce: &LinkNonce) -> Self {
        match self {
            RevealState::Decoding {
                descriptor,
                ciphertext,
            } => match open_record(&descriptor, &ciphertext, nonce) {
                Ok(plaintext) => RevealState::Revealed { plaintext },
                Err(reason) => RevealState::Failed { reason },
            },
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RevealState::Revealed { .. } | RevealState::Failed { .. }
        )
    }

    /// The recovered secret, if this reveal reached `Revealed`
    pub fn plaintext(&self) -> Option<&str> {
        match self {
            RevealState::Revealed { plaintext } => Some(plaintext),
            _ => None,
        }
    }
}

fn open_record(
    descriptor: &KeyDescriptor,
    ciphertext: &str,
    nonce: &LinkNonce,
) -> Result<Zeroizing<String>, RevealFailure> {
    let key = descriptor.to_key()?;
    let sealed = STANDARD
        .decode(ciphertext)
        .map_err(|_| RevealFailure::Decrypt)?;
    let opened = key.decrypt(nonce, &sealed).map_err(|_| RevealFailure::Decrypt)?;
    let text = String::from_utf8(opened).map_err(|_| RevealFailure::Decrypt)?;
    Ok(Zeroizing::new(text))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::SecretKey;

    fn sealed_record(secret: &str) -> (KeyDescriptor, String, LinkNonce) {
        let key = SecretKey::generate();
        let nonce = LinkNonce::generate();
        let ciphertext = STANDARD.encode(key.encrypt(&nonce, secret.as_bytes()).unwrap());
        (KeyDescriptor::from_key(&key), ciphertext, nonce)
    }

    #[test]
    fn test_happy_path() {
        let (descriptor, ciphertext, nonce) = sealed_record("hunter2");

        let state = RevealState::start();
        assert!(!state.is_terminal());

        let state = state.loaded(descriptor, ciphertext);
        assert!(!state.is_terminal());
        assert!(state.plaintext().is_none());

        let state = state.reveal(&nonce);
        assert!(state.is_terminal());
        assert_eq!(state.plaintext(), Some("hunter2"));
    }

    #[test]
    fn test_load_failure_is_terminal() {
        let (descriptor, ciphertext, nonce) = sealed_record("hunter2");

        let state = RevealState::start().failed(RevealFailure::NotFound);
        assert!(state.is_terminal());

        // No event moves a failed reveal forward.
        let state = state.loaded(descriptor, ciphertext);
        assert!(matches!(
            state,
            RevealState::Failed {
                reason: RevealFailure::NotFound
            }
        ));
        let state = state.reveal(&nonce);
        assert!(matches!(
            state,
            RevealState::Failed {
                reason: RevealFailure::NotFound
            }
        ));
    }

    #[test]
    fn test_missing_fragment_fails_before_decryption() {
        let (descriptor, ciphertext, _nonce) = sealed_record("hunter2");

        // A recipient whose link lost its fragment aborts the Decoding
        // state directly; the failure is a link failure, not a crypto one.
        let state = RevealState::start()
            .loaded(descriptor, ciphertext)
            .failed(RevealFailure::Link(LinkError::MissingNonce));

        assert!(matches!(
            state,
            RevealState::Failed {
                reason: RevealFailure::Link(LinkError::MissingNonce)
            }
        ));
    }

    #[test]
    fn test_wrong_nonce_fails_opaquely() {
        let (descriptor, ciphertext, _nonce) = sealed_record("hunter2");

        let state = RevealState::start()
            .loaded(descriptor, ciphertext)
            .reveal(&LinkNonce::generate());

        assert!(matches!(
            state,
            RevealState::Failed {
                reason: RevealFailure::Decrypt
            }
        ));
    }

    #[test]
    fn test_bad_descriptor_fails_as_descriptor_error() {
        let (mut descriptor, ciphertext, nonce) = sealed_record("hunter2");
        descriptor.kty = "RSA".to_string();

        let state = RevealState::start()
            .loaded(descriptor, ciphertext)
            .reveal(&nonce);

        assert!(matches!(
            state,
            RevealState::Failed {
                reason: RevealFailure::Descriptor(_)
            }
        ));
    }

    #[test]
    fn test_revealed_state_does_not_debug_print_the_secret() {
        let (descriptor, ciphertext, nonce) = sealed_record("hunter2");

        let state = RevealState::start()
            .loaded(descriptor, ciphertext)
            .reveal(&nonce);

        let rendered = format!("{:?}", state);
        assert!(!rendered.contains("hunter2"));
        assert_eq!(rendered, "Revealed");
    }
}
