// src/proxy/backend.rs
use crate::config::ConfigError;
use hyper::http::uri::PathAndQuery;
use hyper::Uri;
use serde::Deserialize;
use url::Url;

use super::ProxyError;

/// A downstream server requests are forwarded to.
///
/// Parsed from either a full base URL (`http://host:port/prefix`) or a bare
/// `host:port`, which is treated as plain HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Backend {
    pub id: String,
    pub url: Url,
}

impl Backend {
    pub fn parse(address: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBackend {
            address: address.to_string(),
            reason,
        };

        let trimmed = address.trim();
        let url = if trimmed.contains("://") {
            Url::parse(trimmed)
        } else {
            Url::parse(&format!("http://{trimmed}"))
        }
        .map_err(|e| invalid(e.to_string()))?;

        if url.scheme() != "http" {
            return Err(invalid(format!(
                "only http backends are supported, got {}",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let id = format!("{}:{}", host, url.port_or_known_default().unwrap_or(80));

        Ok(Self { id, url })
    }

    /// Absolute URI for an inbound request path, resolved against this backend's base URL.
    ///
    /// A root request targets the configured address exactly, query included.
    pub fn target_uri(&self, path_and_query: Option<&PathAndQuery>) -> Result<Uri, ProxyError> {
        let mut base = self.url.clone();
        base.set_fragment(None);

        let target = match path_and_query.map(PathAndQuery::as_str) {
            None | Some("/") => base.to_string(),
            Some(suffix) => {
                base.set_query(None);
                format!("{}{}", base.as_str().trim_end_matches('/'), suffix)
            }
        };

        target
            .parse::<Uri>()
            .map_err(|e| ProxyError::InvalidTarget(format!("{target}: {e}")))
    }
}

impl TryFrom<String> for Backend {
    type Error = ConfigError;

    fn try_from(address: String) -> Result<Self, Self::Error> {
        Self::parse(&address)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}
