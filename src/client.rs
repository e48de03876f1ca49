use std::collections::HashMap;

use reqwest::Client;
use url::Url;

use crate::{Config, FlowState, OAuthError, TokenResponse};

#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub verbose: bool,
}

impl OAuthClientConfig {
    pub fn from_config(config: &Config, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            redirect_uri: redirect_uri.into(),
            scopes: config.scopes.clone(),
            verbose: config.verbose,
        }
    }
}

/// Builds the provider authorization URL and performs the code-for-token
/// exchange. Verbose logging is a property of the client, not of any
/// process-global transport.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthClientConfig,
    http: Client,
}

impl OAuthClient {
    pub fn new(config: OAuthClientConfig) -> Result<Self, OAuthError> {
        let http = Client::builder().build()?;
        Ok(Self { config, http })
    }

    pub fn with_http_client(config: OAuthClientConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &OAuthClientConfig {
        &self.config
    }

    /// Composes the authorization-endpoint URL for the operator to open.
    ///
    /// Each configured scope value becomes its own `scope` query pair,
    /// verbatim: repeated `--scope` flags stay repeated pairs, and a single
    /// comma-joined value stays one pair. Providers interpret scope syntax
    /// differently, so the literal content is never rewritten.
    pub fn authorization_url(&self, flow: &FlowState) -> Result<String, OAuthError> {
        let mut url = Url::parse(&self.config.auth_url)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("response_type", "code");
            pairs.append_pair("client_id", &self.config.client_id);
            for scope in &self.config.scopes {
                pairs.append_pair("scope", scope);
            }
            pairs.append_pair("redirect_uri", &self.config.redirect_uri);
            pairs.append_pair("access_type", "offline");
            pairs.append_pair("state", &flow.state);
            if let Some(nonce) = &flow.nonce {
                pairs.append_pair("nonce", nonce);
            }
        }
        Ok(url.to_string())
    }

    /// Exchanges the authorization code at the token endpoint. No retries:
    /// any failure ends the single-shot flow.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthError> {
        let mut payload = HashMap::new();
        payload.insert("grant_type".to_string(), "authorization_code".to_string());
        payload.insert("code".to_string(), code.to_string());
        payload.insert("client_id".to_string(), self.config.client_id.clone());
        payload.insert(
            "client_secret".to_string(),
            self.config.client_secret.clone(),
        );
        payload.insert("redirect_uri".to_string(), self.config.redirect_uri.clone());

        if self.config.verbose {
            log::debug!("token request: POST {}", self.config.token_url);
            for (key, value) in &payload {
                log::debug!("  {key}={value}");
            }
        }

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if self.config.verbose {
            log::debug!("token response: {status}\nbody:\n{body}");
        }

        if !status.is_success() {
            return Err(OAuthError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let token = serde_json::from_str(&body).map_err(|err| OAuthError::InvalidResponse {
            message: err.to_string(),
            body,
        })?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_config() -> OAuthClientConfig {
        OAuthClientConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            auth_url: "https://provider.test/authorize".to_string(),
            token_url: "https://provider.test/token".to_string(),
            redirect_uri: "http://127.0.0.1:8081/oauth/callback".to_string(),
            scopes: Vec::new(),
            verbose: false,
        }
    }

    fn query_pairs(url: &str) -> Vec<(String, String)> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    fn session() -> FlowState {
        FlowState {
            state: "state-token".to_string(),
            nonce: None,
        }
    }

    #[test]
    fn authorization_url_includes_required_params() {
        let client = OAuthClient::new(client_config()).unwrap();
        let url = client.authorization_url(&session()).unwrap();
        let pairs = query_pairs(&url);

        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("client_id"), Some("client-id"));
        assert_eq!(get("redirect_uri"), Some("http://127.0.0.1:8081/oauth/callback"));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("state"), Some("state-token"));
        assert_eq!(get("nonce"), None);
    }

    #[test]
    fn repeated_scopes_become_repeated_pairs() {
        let mut config = client_config();
        config.scopes = vec!["read".to_string(), "write".to_string()];
        let client = OAuthClient::new(config).unwrap();
        let url = client.authorization_url(&session()).unwrap();

        let scopes: Vec<String> = query_pairs(&url)
            .into_iter()
            .filter(|(k, _)| k == "scope")
            .map(|(_, v)| v)
            .collect();
        assert_eq!(scopes, vec!["read".to_string(), "write".to_string()]);
    }

    #[test]
    fn comma_joined_scope_stays_verbatim() {
        let mut config = client_config();
        config.scopes = vec!["read,write".to_string()];
        let client = OAuthClient::new(config).unwrap();
        let url = client.authorization_url(&session()).unwrap();

        let scopes: Vec<String> = query_pairs(&url)
            .into_iter()
            .filter(|(k, _)| k == "scope")
            .map(|(_, v)| v)
            .collect();
        assert_eq!(scopes, vec!["read,write".to_string()]);
    }

    #[test]
    fn nonce_is_included_when_generated() {
        let client = OAuthClient::new(client_config()).unwrap();
        let flow = FlowState {
            state: "state-token".to_string(),
            nonce: Some("nonce-token".to_string()),
        };
        let url = client.authorization_url(&flow).unwrap();
        let pairs = query_pairs(&url);
        assert!(pairs.contains(&("nonce".to_string(), "nonce-token".to_string())));
    }
}
