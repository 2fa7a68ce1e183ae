//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use vnq_md::{source_by_name, QuoteSource};

pub const ENV_ADDR: &str = "VNQ_DAEMON_ADDR";
pub const ENV_CORS_ORIGIN: &str = "VNQ_CORS_ORIGIN";
pub const ENV_SOURCE: &str = "VNQ_SOURCE";
pub const ENV_VCI_BASE_URL: &str = "VNQ_VCI_BASE_URL";

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
/// Local Vite dev server.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_SOURCE: &str = "VCI";

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub addr: SocketAddr,
    /// The single origin allowed to call the API from a browser.
    pub cors_origin: HeaderValue,
    pub source: String,
    /// Override for the upstream base URL; `None` means the provider default.
    pub vci_base_url: Option<String>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr_s = get(ENV_ADDR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr_s
            .trim()
            .parse()
            .with_context(|| format!("{ENV_ADDR}='{addr_s}' is not a socket address"))?;

        let origin_s = get(ENV_CORS_ORIGIN).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let cors_origin = HeaderValue::from_str(origin_s.trim())
            .with_context(|| format!("{ENV_CORS_ORIGIN}='{origin_s}' is not a valid origin"))?;

        Ok(Self {
            addr,
            cors_origin,
            source: get(ENV_SOURCE).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            vci_base_url: get(ENV_VCI_BASE_URL),
        })
    }

    /// Resolve the configured upstream source.
    pub fn build_source(&self) -> Result<Arc<dyn QuoteSource>> {
        source_by_name(&self.source, self.vci_base_url.as_deref())
            .with_context(|| format!("{ENV_SOURCE}='{}'", self.source))
    }

    /// CORS: exactly one origin, any method, any header, credentials allowed.
    ///
    /// Wildcards are not valid together with credentials, so methods and
    /// headers are mirrored from the preflight request instead.
    pub fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(self.cors_origin.clone())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    }
}
