use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use crate::OAuthError;

/// Well-known path of the JSON defaults file. Absence is not an error;
/// unreadable or malformed content is.
pub const DEFAULTS_PATH: &str = "/etc/oauth2-cli.json";

const DEFAULT_INTERFACE: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8081;
const DEFAULT_CALLBACK: &str = "/oauth/callback";
const DEFAULT_CODE_PARAM: &str = "code";

/// Fully resolved configuration for one flow run.
#[derive(Debug, Clone)]
pub struct Config {
    pub interface: String,
    pub port: u16,
    pub callback: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub code_param: String,
    pub scopes: Vec<String>,
    pub oidc_nonce: bool,
    pub verbose: bool,
}

/// Optional values read from the JSON defaults file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub interface: Option<String>,
    pub port: Option<u16>,
    pub callback: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub code_param: Option<String>,
    pub scopes: Option<ScopeList>,
    pub nonce: Option<bool>,
    pub verbose: Option<bool>,
}

/// The `scopes` key accepts a single string or an array of strings. Either
/// way the literal values are forwarded to the provider untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScopeList {
    One(String),
    Many(Vec<String>),
}

impl ScopeList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ScopeList::One(scope) => vec![scope],
            ScopeList::Many(scopes) => scopes,
        }
    }
}

/// Values supplied explicitly on the command line. Explicit values always win
/// over file values, which win over built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub interface: Option<String>,
    pub port: Option<u16>,
    pub callback: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub code_param: Option<String>,
    pub scopes: Vec<String>,
    pub oidc_nonce: Option<bool>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, OAuthError> {
        let path = path.as_ref();
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(OAuthError::ConfigRead {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };
        let config = serde_json::from_str(&data).map_err(|err| OAuthError::ConfigParse {
            path: path.to_path_buf(),
            source: err,
        })?;
        Ok(Some(config))
    }
}

impl Config {
    /// Merges built-in defaults, file values, and CLI overrides, then checks
    /// that the four required fields are present. The token URL must be given
    /// explicitly; the auth URL is never reused in its place.
    pub fn resolve(file: Option<FileConfig>, overrides: Overrides) -> Result<Self, OAuthError> {
        let file = file.unwrap_or_default();

        let scopes = if overrides.scopes.is_empty() {
            file.scopes.map(ScopeList::into_vec).unwrap_or_default()
        } else {
            overrides.scopes
        };

        Ok(Self {
            interface: overrides
                .interface
                .or(file.interface)
                .unwrap_or_else(|| DEFAULT_INTERFACE.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            callback: overrides
                .callback
                .or(file.callback)
                .unwrap_or_else(|| DEFAULT_CALLBACK.to_string()),
            client_id: require("id", overrides.client_id.or(file.client_id))?,
            client_secret: require("secret", overrides.client_secret.or(file.client_secret))?,
            auth_url: require("auth", overrides.auth_url.or(file.auth_url))?,
            token_url: require("token", overrides.token_url.or(file.token_url))?,
            code_param: overrides
                .code_param
                .or(file.code_param)
                .unwrap_or_else(|| DEFAULT_CODE_PARAM.to_string()),
            scopes,
            oidc_nonce: overrides.oidc_nonce.or(file.nonce).unwrap_or(false),
            verbose: overrides.verbose.or(file.verbose).unwrap_or(false),
        })
    }
}

fn require(flag: &'static str, value: Option<String>) -> Result<String, OAuthError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(OAuthError::MissingRequired { flag }),
    }
}
