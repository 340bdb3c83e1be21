//! Share-link composition and parsing
//!
//! A share link is `<origin>/shared-secrets/<id>#<nonce>`. The path carries
//! the record id and is the only part the server ever sees; the fragment
//! carries the url-safe base64 nonce and stays on the client. The two parts
//! are parsed independently so a recipient can fetch the record before
//! deciding whether the fragment is usable.

use url::Url;
use uuid::Uuid;

use crate::crypto::{LinkNonce, NonceError};

/// Errors that can occur while composing or parsing a share link
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("share link does not point at a shared secret")]
    UnrecognizedPath,
    #[error("share link id is not a valid uuid")]
    InvalidId,
    #[error("share link has no nonce fragment")]
    MissingNonce,
    #[error("share link nonce is malformed: {0}")]
    MalformedNonce(#[from] NonceError),
    #[error("invalid share origin: {0}")]
    Origin(#[from] url::ParseError),
}

/// The two halves of a share link: record id and decryption nonce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub id: Uuid,
    pub nonce: LinkNonce,
}

impl ShareLink {
    pub fn new(id: Uuid, nonce: LinkNonce) -> Self {
        Self { id, nonce }
    }

    /// Parse a full share link, requiring both halves to be present
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not name a shared secret or the
    /// nonce fragment is missing, empty, or undecodable.
    pub fn parse(url: &Url) -> Result<Self, LinkError> {
        Ok(Self {
            id: secret_id(url)?,
            nonce: nonce(url)?,
        })
    }

    /// Compose the link to hand to a recipient
    ///
    /// The id goes in the path, the nonce in the fragment. Anything after
    /// `#` is kept by HTTP clients and never sent with the request, so the
    /// server stores everything needed to return the ciphertext but nothing
    /// that decrypts it.
    ///
    /// # Errors
    ///
    /// Returns an error if `origin` cannot serve as a base URL.
    pub fn to_url(&self, origin: &Url) -> Result<Url, LinkError> {
        let mut url = origin.join(&format!("/shared-secrets/{}", self.id))?;
        url.set_fragment(Some(&self.nonce.to_base64url()));
        Ok(url)
    }
}

/// Extract the record id from a share link's path
///
/// # Errors
///
/// Returns an error unless the path ends in `/shared-secrets/<uuid>`.
pub fn secret_id(url: &Url) -> Result<Uuid, LinkError> {
    let segments: Vec<&str> = url
        .path_segments()
        .ok_or(LinkError::UnrecognizedPath)?
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [.., collection, id] if *collection == "shared-secrets" => {
            Uuid::parse_str(id).map_err(|_| LinkError::InvalidId)
        }
        _ => Err(LinkError::UnrecognizedPath),
    }
}

/// Extract the decryption nonce from a share link's fragment
///
/// An absent fragment and an empty fragment are the same failure; neither
/// leaves anything to decrypt with.
///
/// # Errors
///
/// Returns an error if the fragment is missing, empty, or not a url-safe
/// base64 nonce of the right size.
pub fn nonce(url: &Url) -> Result<LinkNonce, LinkError> {
    match url.fragment() {
        None | Some("") => Err(LinkError::MissingNonce),
        Some(fragment) => Ok(LinkNonce::from_base64url(fragment)?),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:3000").unwrap()
    }

    #[test]
    fn test_compose_parse_round_trip() {
        let link = ShareLink::new(Uuid::new_v4(), LinkNonce::generate());
        let url = link.to_url(&origin()).unwrap();

        assert!(url.path().starts_with("/shared-secrets/"));
        assert_eq!(ShareLink::parse(&url).unwrap(), link);
    }

    #[test]
    fn test_nonce_only_in_fragment() {
        let link = ShareLink::new(Uuid::new_v4(), LinkNonce::generate());
        let url = link.to_url(&origin()).unwrap();
        let encoded = link.nonce.to_base64url();

        assert_eq!(url.fragment(), Some(encoded.as_str()));
        assert!(!url.path().contains(&encoded));
        assert!(url.query().is_none());
    }

    #[test]
    fn test_origin_with_base_path() {
        let deep_origin = Url::parse("https://vault.example.com/some/app").unwrap();
        let link = ShareLink::new(Uuid::new_v4(), LinkNonce::generate());
        let url = link.to_url(&deep_origin).unwrap();

        assert_eq!(url.path(), format!("/shared-secrets/{}", link.id));
        assert_eq!(ShareLink::parse(&url).unwrap().id, link.id);
    }

    #[test]
    fn test_missing_fragment() {
        let link = ShareLink::new(Uuid::new_v4(), LinkNonce::generate());
        let mut url = link.to_url(&origin()).unwrap();
        url.set_fragment(None);

        assert_eq!(secret_id(&url).unwrap(), link.id);
        assert!(matches!(nonce(&url), Err(LinkError::MissingNonce)));
        assert!(matches!(
            ShareLink::parse(&url),
            Err(LinkError::MissingNonce)
        ));
    }

    #[test]
    fn test_empty_fragment_is_missing() {
        let link = ShareLink::new(Uuid::new_v4(), LinkNonce::generate());
        let mut url = link.to_url(&origin()).unwrap();
        url.set_fragment(Some(""));

        assert!(matches!(nonce(&url), Err(LinkError::MissingNonce)));
    }

    #[test]
    fn test_garbled_fragment() {
        let link = ShareLink::new(Uuid::new_v4(), LinkNonce::generate());
        let mut url = link.to_url(&origin()).unwrap();
        url.set_fragment(Some("not-a-nonce"));

        assert!(matches!(nonce(&url), Err(LinkError::MalformedNonce(_))));
    }

    #[test]
    fn test_unrecognized_path() {
        let url = Url::parse("http://localhost:3000/other-things/abc#AAAA").unwrap();
        assert!(matches!(secret_id(&url), Err(LinkError::UnrecognizedPath)));
    }

    #[test]
    fn test_invalid_id() {
        let url = Url::parse("http://localhost:3000/shared-secrets/not-a-uuid").unwrap();
        assert!(matches!(secret_id(&url), Err(LinkError::InvalidId)));
    }
}
