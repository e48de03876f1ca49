use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

use crate::OAuthError;

const TOKEN_BYTES: usize = 32;

/// Generates an opaque, URL-safe token from 32 bytes of OS randomness.
pub fn random_token() -> Result<String, OAuthError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| OAuthError::OsRng {
            message: err.to_string(),
        })?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Per-run CSRF state and optional OIDC replay nonce.
///
/// Generated once at startup, read-only afterwards, never persisted.
#[derive(Debug, Clone)]
pub struct FlowState {
    pub state: String,
    pub nonce: Option<String>,
}

impl FlowState {
    pub fn generate(oidc_nonce: bool) -> Result<Self, OAuthError> {
        Ok(Self {
            state: random_token()?,
            nonce: if oidc_nonce {
                Some(random_token()?)
            } else {
                None
            },
        })
    }
}
