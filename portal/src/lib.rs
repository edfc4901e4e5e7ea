//! # Ticket Portal
//!
//! Captive-portal Wi-Fi ticket sales.
//!
//! A visitor intercepted by the hotspot lands on a plain-HTTP page, is sent
//! to the secure purchase flow, picks a ticket, pays with mobile money and
//! gets the hotspot credentials to log in with.
//!
//! # Architecture
//!
//! ```text
//!  GET /captive ──► /captive/continue ──303──► https://<host>/buy-ticket?type=..
//!                                                        │
//!                                          one Store per visitor session
//!                                                        │
//!   ┌──────────────────┬─────────────────────┬──────────┴─────────┐
//!   │  CatalogReducer  │   PurchaseReducer   │ CredentialReducer  │ ShellReducer
//!   │  load inventory  │  select / validate  │  reveal / copy /   │ notices,
//!   │  (type or all)   │  / submit           │  restart           │ navigation
//!   └──────────────────┴──────────┬──────────┴────────────────────┘
//!                                 │ effects
//!                                 ▼
//!                      TicketService (HTTP JSON API)
//! ```
//!
//! Every flow is a reducer over [`state::PortalState`]; all I/O is an effect
//! executed by the runtime `Store`. The HTTP shell in [`server`] only
//! translates requests into actions and state into JSON views.
//!
//! # Modules
//!
//! - [`gateway`]: captive landing → secure purchase entry rewrite
//! - [`catalog`]: ticket catalog loading
//! - [`purchase`]: ticket selection, phone validation and purchase submission
//! - [`credentials`]: credential reveal, copy and restart
//! - [`service`]: the remote ticket/payment service
//! - [`session`]: per-visitor stores
//! - `mocks`: in-memory service and clipboard for tests (`test-utils` feature)

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
pub mod phone;
pub mod purchase;
pub mod reducer;
pub mod server;
pub mod service;
pub mod session;
pub mod state;
pub mod types;
pub mod views;

pub use config::Config;
pub use error::{GatewayError, PortalError, ServiceError};
pub use phone::PhoneNumber;
pub use reducer::{PortalReducer, portal_reducer};
pub use service::{HttpTicketService, TicketService};
pub use session::{Session, SessionId, SessionRegistry};
pub use state::{PortalAction, PortalEnvironment, PortalState};
