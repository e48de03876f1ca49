use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Whatever the token endpoint returned. Treated opaquely apart from the
/// `id_token` extra, which the nonce verifier inspects when OIDC mode is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TokenResponse {
    pub fn id_token(&self) -> Option<&str> {
        self.extra.get("id_token").and_then(serde_json::Value::as_str)
    }
}
