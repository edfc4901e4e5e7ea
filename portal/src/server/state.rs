//! Application state for the portal HTTP server.

use crate::config::{Config, RouteConfig};
pub use crate::config::sub_path;
use crate::gateway::GatewayConfig;
use crate::service::TicketService;
use crate::session::SessionRegistry;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Live visitor sessions, one `Store` each
    pub sessions: Arc<SessionRegistry>,
    /// Ticket service client (also used directly for the catalog listing)
    pub service: Arc<dyn TicketService>,
    /// Secure redirect target
    pub gateway: Arc<GatewayConfig>,
    /// Public route paths
    pub routes: Arc<RouteConfig>,
}

impl AppState {
    /// Build the state from a ticket service and the loaded configuration
    #[must_use]
    pub fn new(service: Arc<dyn TicketService>, config: &Config) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new(
                Arc::clone(&service),
                config.sessions.max_sessions,
            )),
            service,
            gateway: Arc::new(config.gateway.clone()),
            routes: Arc::new(config.routes.clone()),
        }
    }

    /// Purchase flow entry path
    #[must_use]
    pub fn purchase_path(&self) -> &str {
        &self.gateway.purchase_entry_path
    }
}
