//! Server configuration
//!
//! Loaded from TOML, every field optional, then overridden from `BM_*`
//! environment variables.

use crate::error::ServerError;
use bm_model::pagination::DEFAULT_WINDOW_SIZE;
use bm_service::DEFAULT_MAX_CONTENT_LEN;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Public base URL, used for redirects
    pub serve_path: String,
    /// Cache buster for static resources
    pub static_resource_version: String,
    /// Default list page size
    pub index_articles_cnt: usize,
    /// Whether anonymous users may view list pages
    pub allow_anonymous_view: bool,
    /// Breezemoon content limit in characters
    pub max_breezemoon_len: usize,
    /// Number of page links in pagination
    pub pagination_window_size: usize,
    /// Default tracing filter (overridden by `RUST_LOG`)
    pub log_filter: String,
}

impl ServerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - `ServerError::Io` if the file cannot be read
    /// - `ServerError::Config` if it is not valid TOML for this struct
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// `ServerError::Config` on invalid TOML
    pub fn from_toml(raw: &str) -> Result<Self, ServerError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `BM_BIND`, `BM_SERVE_PATH` and `BM_LOG` overrides
    ///
    /// # Errors
    /// `ServerError::InvalidEnv` if `BM_BIND` is not a socket address
    pub fn apply_env(self) -> Result<Self, ServerError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("BM_BIND") {
            self.bind = bind.parse().map_err(|_| ServerError::InvalidEnv {
                key: "BM_BIND",
                value: bind,
            })?;
        }
        if let Some(serve_path) = lookup("BM_SERVE_PATH") {
            self.serve_path = serve_path;
        }
        if let Some(filter) = lookup("BM_LOG") {
            self.log_filter = filter;
        }
        Ok(self)
    }

    /// With listen address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// With public base URL
    #[inline]
    #[must_use]
    pub fn with_serve_path(mut self, serve_path: impl Into<String>) -> Self {
        self.serve_path = serve_path.into();
        self
    }

    /// With anonymous viewing switch
    #[inline]
    #[must_use]
    pub fn with_anonymous_view(mut self, allow: bool) -> Self {
        self.allow_anonymous_view = allow;
        self
    }

    /// With default list page size
    #[inline]
    #[must_use]
    pub fn with_index_articles_cnt(mut self, count: usize) -> Self {
        self.index_articles_cnt = count;
        self
    }

    /// Serve path without a trailing slash
    #[must_use]
    pub fn serve_path(&self) -> &str {
        self.serve_path.trim_end_matches('/')
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            serve_path: "http://localhost:8080".to_string(),
            static_resource_version: "1".to_string(),
            index_articles_cnt: 20,
            allow_anonymous_view: true,
            max_breezemoon_len: DEFAULT_MAX_CONTENT_LEN,
            pagination_window_size: DEFAULT_WINDOW_SIZE,
            log_filter: "info".to_string(),
        }
    }
}
