use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

use crate::{OAuthError, TokenResponse};

#[derive(Debug, Deserialize)]
struct NonceClaims {
    #[serde(default)]
    nonce: String,
}

/// Checks the nonce claim embedded in the token's ID token against the one
/// generated at flow start.
///
/// This is a payload-decode check only: the ID token is split into its three
/// dot-separated segments and the middle segment is decoded, but the
/// signature is never verified.
pub fn verify_nonce(expected: &str, token: &TokenResponse) -> Result<(), OAuthError> {
    let id_token = token.id_token().ok_or(OAuthError::MissingIdToken)?;

    let mut segments = id_token.splitn(3, '.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) => payload,
        _ => {
            return Err(OAuthError::IdTokenPayloadDecode(
                "expected three dot-separated segments".to_string(),
            ));
        }
    };

    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| OAuthError::IdTokenPayloadDecode(err.to_string()))?;
    let claims: NonceClaims = serde_json::from_slice(&decoded)
        .map_err(|err| OAuthError::IdTokenPayloadDecode(err.to_string()))?;

    if claims.nonce != expected {
        return Err(OAuthError::NonceMismatch {
            expected: expected.to_string(),
            received: claims.nonce,
        });
    }
    Ok(())
}
