//! Router configuration for the ticket portal.

use super::health::health_check;
use super::state::{AppState, sub_path};
use super::{captive, catalog, purchase};
use crate::config::{HEALTH_PATH, segments};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Route paths come from the configuration:
/// - Health check at [`HEALTH_PATH`]
/// - Captive landing and its secure redirect
/// - Catalog listing
/// - Purchase flow entry and the per-session endpoints below it
pub fn build_router(state: AppState) -> Router {
    let captive_path = state.routes.captive_path.clone();
    let catalog_path = state.routes.catalog_entry_path.clone();
    let purchase_path = state.purchase_path().to_string();

    Router::new()
        .route(HEALTH_PATH, get(health_check))
        // Captive portal (plain HTTP)
        .route(&captive_path, get(captive::landing))
        .route(
            &sub_path(&captive_path, segments::CONTINUE),
            get(captive::continue_to_purchase),
        )
        // Catalog
        .route(&catalog_path, get(catalog::list_ticket_types))
        // Purchase flow
        .route(&purchase_path, get(purchase::open))
        .route(&sub_path(&purchase_path, segments::STATE), get(purchase::current))
        .route(&sub_path(&purchase_path, segments::SELECT), post(purchase::select))
        .route(&sub_path(&purchase_path, segments::PHONE), put(purchase::phone))
        .route(
            &sub_path(&purchase_path, segments::PURCHASE),
            post(purchase::purchase),
        )
        .route(&sub_path(&purchase_path, segments::COPY), post(purchase::copy))
        .route(&sub_path(&purchase_path, segments::RESTART), post(purchase::restart))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
