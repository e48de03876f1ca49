use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("os rng error: {message}")]
    OsRng { message: String },

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("--{flag} is required")]
    MissingRequired { flag: &'static str },

    #[error("invalid redirect uri: {0}")]
    InvalidRedirectUri(String),

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String, body: String },

    #[error("missing authorization code in callback request")]
    MissingAuthorizationCode,

    #[error("state mismatch (expected={expected}, received={received})")]
    StateMismatch { expected: String, received: String },

    #[error("missing OIDC id_token in token response")]
    MissingIdToken,

    #[error("id_token payload decode: {0}")]
    IdTokenPayloadDecode(String),

    #[error("nonce mismatch (expected={expected}, received={received})")]
    NonceMismatch { expected: String, received: String },

    #[error("local server error: {0}")]
    Serve(String),
}
