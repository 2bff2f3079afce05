// src/config/models.rs
use crate::proxy::Backend;
use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one backend must be configured")]
    NoBackends,

    #[error("invalid backend address {address:?}: {reason}")]
    InvalidBackend { address: String, reason: String },

    #[error("invalid listen address {0:?}")]
    InvalidListenAddress(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,

    /// Ordered backend list. Rotation follows this order, starting at the first entry.
    pub backends: Vec<Backend>,

    #[serde(default)]
    pub on_backend_error: BackendErrorPolicy,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        self.listen.socket_addr()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ListenConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let display = format!("{}:{}", self.host, self.port);
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or(ConfigError::InvalidListenAddress(display))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// What the client sees when the selected backend cannot be reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorPolicy {
    /// Close the inbound connection without writing a response.
    #[default]
    Reset,
    /// Answer with `502 Bad Gateway`.
    BadGateway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}
