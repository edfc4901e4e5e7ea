//! Configuration management for the ticket portal.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use url::Url;

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `TICKET_API_URL` is not an absolute URL
    #[error("Invalid ticket service URL {url}: {reason}")]
    TicketApiUrl {
        /// Configured value
        url: String,
        /// Parse failure
        reason: String,
    },

    /// Two routes share one path
    #[error("Route path {0} is configured for more than one route")]
    DuplicatePath(String),
}

/// Fixed health check path
pub const HEALTH_PATH: &str = "/health";

/// Path segments mounted below the configured entry points
pub mod segments {
    /// Captive landing → secure redirect
    pub const CONTINUE: &str = "continue";
    /// Current purchase view
    pub const STATE: &str = "state";
    /// Ticket selection
    pub const SELECT: &str = "select";
    /// Phone number input
    pub const PHONE: &str = "phone";
    /// Purchase submission
    pub const PURCHASE: &str = "purchase";
    /// Credential copy
    pub const COPY: &str = "copy";
    /// Start over
    pub const RESTART: &str = "restart";

    /// Every segment below the purchase entry path
    pub const PURCHASE_FLOW: [&str; 6] = [STATE, SELECT, PHONE, PURCHASE, COPY, RESTART];
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Remote ticket service configuration
    pub ticket_api: TicketApiConfig,
    /// Captive landing → secure purchase entry redirect
    pub gateway: GatewayConfig,
    /// Public route paths
    pub routes: RouteConfig,
    /// Visitor session limits
    pub sessions: SessionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
}

/// Ticket service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketApiConfig {
    /// Root URL of the ticket service API
    pub url: String,
}

/// Public route paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Plain-HTTP captive landing page
    pub captive_path: String,
    /// General catalog listing (where unknown ticket types land)
    pub catalog_entry_path: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            captive_path: "/captive".to_string(),
            catalog_entry_path: "/home".to_string(),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum live visitor sessions before the oldest is evicted
    pub max_sessions: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to their defaults. Route paths
    /// are normalized to start with `/` and carry no trailing `/`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("PORTAL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORTAL_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
                metrics_host: env::var("METRICS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                metrics_port: env::var("METRICS_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(9090),
            },
            ticket_api: TicketApiConfig {
                url: env::var("TICKET_API_URL")
                    .unwrap_or_else(|_| "http://localhost:3001/api".to_string()),
            },
            gateway: GatewayConfig {
                purchase_entry_path: normalize_path(
                    &env::var("PURCHASE_ENTRY_PATH").unwrap_or_else(|_| "/buy-ticket".to_string()),
                ),
                secure_port: env::var("SECURE_PORT").ok().and_then(|s| s.parse().ok()),
            },
            routes: RouteConfig {
                captive_path: normalize_path(
                    &env::var("CAPTIVE_PATH").unwrap_or_else(|_| "/captive".to_string()),
                ),
                catalog_entry_path: normalize_path(
                    &env::var("CATALOG_ENTRY_PATH").unwrap_or_else(|_| "/home".to_string()),
                ),
            },
            sessions: SessionConfig {
                max_sessions: env::var("MAX_SESSIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1024),
            },
        }
    }

    /// Check values `from_env` cannot reject on its own
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TicketApiUrl`] if the ticket service URL does not parse
    /// - [`ConfigError::DuplicatePath`] if two routes resolve to one path
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ticket_api_url()?;

        let paths = self.route_paths();
        for (index, path) in paths.iter().enumerate() {
            if paths[..index].contains(path) {
                return Err(ConfigError::DuplicatePath(path.clone()));
            }
        }

        Ok(())
    }

    /// Every path the router mounts, entry points and the routes below them
    #[must_use]
    pub fn route_paths(&self) -> Vec<String> {
        let captive = &self.routes.captive_path;
        let purchase = &self.gateway.purchase_entry_path;

        let mut paths = vec![
            HEALTH_PATH.to_string(),
            captive.clone(),
            sub_path(captive, segments::CONTINUE),
            self.routes.catalog_entry_path.clone(),
            purchase.clone(),
        ];
        paths.extend(
            segments::PURCHASE_FLOW
                .iter()
                .map(|segment| sub_path(purchase, segment)),
        );
        paths
    }

    /// Parsed ticket service URL
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TicketApiUrl`] if the value does not parse.
    pub fn ticket_api_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.ticket_api.url).map_err(|e| ConfigError::TicketApiUrl {
            url: self.ticket_api.url.clone(),
            reason: e.to_string(),
        })
    }

    /// Address the HTTP server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Address the Prometheus exporter binds to
    #[must_use]
    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.server.metrics_host, self.server.metrics_port)
    }
}

/// Leading `/`, no trailing `/` (the root path stays `/`)
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{trimmed}")
}

/// `{base}/{segment}`, without doubling the root slash
#[must_use]
pub fn sub_path(base: &str, segment: &str) -> String {
    if base == "/" {
        format!("/{segment}")
    } else {
        format!("{base}/{segment}")
    }
}
