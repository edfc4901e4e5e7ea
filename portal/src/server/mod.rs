//! HTTP server for the ticket portal.
//!
//! This module provides the Axum-based HTTP shell around the portal
//! reducers:
//! - Application state shared by handlers
//! - The captive landing page and its secure redirect
//! - The catalog listing and the per-session purchase flow
//! - Health check endpoint

pub mod captive;
pub mod catalog;
pub mod error;
pub mod extractors;
pub mod health;
pub mod purchase;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use health::health_check;
pub use routes::build_router;
pub use state::AppState;
