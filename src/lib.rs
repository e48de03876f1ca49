//! Interactive three-legged OAuth 2.0 (and optionally OIDC) authorization-code
//! flow for the command line.
//!
//! The crate resolves configuration from a JSON defaults file plus CLI
//! overrides, prints an authorization URL for the operator to open, waits for
//! exactly one provider redirect on a short-lived local HTTP listener,
//! exchanges the returned code for tokens, and optionally checks the OIDC
//! nonce embedded in the ID token.

mod client;
mod config;
mod error;
mod flow;
mod nonce;
mod server;
mod types;

pub use client::{OAuthClient, OAuthClientConfig};
pub use config::{Config, DEFAULTS_PATH, FileConfig, Overrides, ScopeList};
pub use error::OAuthError;
pub use flow::{FlowState, random_token};
pub use nonce::verify_nonce;
pub use server::{CallbackServer, RedirectTarget};
pub use types::TokenResponse;
