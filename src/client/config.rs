use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::ClientError;

pub const DEFAULT_HOST: &str = "https://wsn.latice.eu";

pub const HOST_VAR: &str = "API_HOST";
pub const TOKEN_VAR: &str = "WSN_TOKEN";
pub const API_KEY_VAR: &str = "API_KEY";

/// Where the measurement service lives and how to authenticate with it.
/// Built once at startup and shared by every call.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base url of the service, without trailing slash
    pub host: String,
    /// Token for the query endpoints, sent as `Authorization: Token <token>`
    pub token: Option<String>,
    /// Key for the quality controlled data endpoints, sent as `Authorization: Api-Key <key>`
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            token: None,
            api_key: None,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_owned(),
            ..Self::default()
        }
    }

    /// Reads `API_HOST`, `WSN_TOKEN` and `API_KEY` from the environment.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`], with variables looked up through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_owned());
        Self {
            token: lookup(TOKEN_VAR),
            api_key: lookup(API_KEY_VAR),
            ..Self::new(host)
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    pub(crate) fn token_header(&self) -> Result<Option<HeaderValue>, ClientError> {
        authorization("Token", self.token.as_deref())
    }

    pub(crate) fn api_key_header(&self) -> Result<Option<HeaderValue>, ClientError> {
        authorization("Api-Key", self.api_key.as_deref())
    }
}

fn authorization(scheme: &str, secret: Option<&str>) -> Result<Option<HeaderValue>, ClientError> {
    secret
        .map(|secret| -> Result<HeaderValue, ClientError> {
            let mut value = HeaderValue::from_str(&format!("{} {}", scheme, secret))?;
            value.set_sensitive(true);
            Ok(value)
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let config = ClientConfig::new("http://localhost:8000/");
        assert_eq!(
            config.url("/api/query/clickhouse/"),
            "http://localhost:8000/api/query/clickhouse/"
        );
    }

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        let config = ClientConfig::from_vars(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.host, "https://wsn.latice.eu");
    }

    #[test]
    fn variables_override_host_and_secrets() {
        let vars = [
            (HOST_VAR, "http://localhost:8000/"),
            (TOKEN_VAR, "abc"),
            (API_KEY_VAR, "xyz"),
        ];
        let config = ClientConfig::from_vars(|name| {
            vars.iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| (*value).to_owned())
        });

        assert_eq!(config.host, "http://localhost:8000");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.api_key.as_deref(), Some("xyz"));
    }

    #[test]
    fn authorization_schemes_differ_per_endpoint_family() {
        let config = ClientConfig::default().with_token("abc").with_api_key("xyz");

        assert_eq!(config.token_header().unwrap().unwrap(), "Token abc");
        assert_eq!(config.api_key_header().unwrap().unwrap(), "Api-Key xyz");
        assert!(ClientConfig::default().token_header().unwrap().is_none());
    }

    #[test]
    fn rejects_secrets_that_cannot_be_headers() {
        let config = ClientConfig::default().with_token("abc\ndef");
        assert!(matches!(config.token_header(), Err(ClientError::Config(_))));
    }
}
