use url::Url;

use crate::OAuthError;

/// Where the provider should send the operator back to.
///
/// A callback value with a scheme is taken as a full redirect URL; a bare
/// path is served over plain HTTP on the configured interface and port.
/// Either way the listener itself binds to interface:port and routes on the
/// derived path.
#[derive(Debug, Clone)]
pub struct RedirectTarget {
    redirect_uri: String,
    path: String,
}

impl RedirectTarget {
    pub fn resolve(callback: &str, interface: &str, port: u16) -> Result<Self, OAuthError> {
        if callback.contains("://") {
            let url = Url::parse(callback)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(OAuthError::InvalidRedirectUri(format!(
                    "unsupported scheme {:?}",
                    url.scheme()
                )));
            }
            if url.host_str().is_none() {
                return Err(OAuthError::InvalidRedirectUri(
                    "redirect uri is missing host".to_string(),
                ));
            }
            Ok(Self {
                redirect_uri: callback.to_string(),
                path: normalize_path(url.path()),
            })
        } else {
            let path = normalize_path(callback);
            Ok(Self {
                redirect_uri: format!("http://{interface}:{port}{path}"),
                path,
            })
        }
    }

    /// The absolute URL forwarded to the provider as `redirect_uri`.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// The route path the listener serves.
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::RedirectTarget;
    use crate::OAuthError;

    #[test]
    fn bare_path_derives_http_redirect_uri() {
        let target = RedirectTarget::resolve("/oauth/callback", "127.0.0.1", 8081).unwrap();
        assert_eq!(target.redirect_uri(), "http://127.0.0.1:8081/oauth/callback");
        assert_eq!(target.path(), "/oauth/callback");
    }

    #[test]
    fn missing_leading_slash_is_normalized() {
        let target = RedirectTarget::resolve("callback", "127.0.0.1", 8081).unwrap();
        assert_eq!(target.redirect_uri(), "http://127.0.0.1:8081/callback");
        assert_eq!(target.path(), "/callback");
    }

    #[test]
    fn full_url_is_kept_verbatim() {
        let target =
            RedirectTarget::resolve("https://example.com/oauth/cb", "127.0.0.1", 8081).unwrap();
        assert_eq!(target.redirect_uri(), "https://example.com/oauth/cb");
        assert_eq!(target.path(), "/oauth/cb");
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let result = RedirectTarget::resolve("ftp://example.com/cb", "127.0.0.1", 8081);
        assert!(matches!(result, Err(OAuthError::InvalidRedirectUri(_))));
    }
}
