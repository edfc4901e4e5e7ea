//! Catalog listing endpoint.
//!
//! - GET {catalog_entry} - Purchasable ticket types, each linking into the
//!   purchase flow pre-scoped to that type
//!
//! Visitors sent back from the purchase flow because their ticket type does
//! not exist arrive with `?unknown_type=<id>` and get the not-found notice
//! here.

use super::error::AppError;
use super::state::AppState;
use crate::catalog::purchasable_types;
use crate::error::PortalError;
use crate::types::{Notice, TicketTypeId};
use crate::views::{CatalogEntryView, TicketTypeView};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

/// Query parameters of the catalog listing
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Ticket type the visitor asked for that does not exist
    pub unknown_type: Option<String>,
}

/// Catalog listing response
#[derive(Debug, Serialize)]
pub struct HomeView {
    /// Active ticket types with stock left
    pub ticket_types: Vec<CatalogEntryView>,
    /// Notices to display once
    pub notices: Vec<Notice>,
}

/// List purchasable ticket types
///
/// ```bash
/// curl http://localhost:3000/home
/// # {"ticket_types":[{"id":"weekly-5000",...,"purchase_path":"/buy-ticket?type=weekly-5000"}],"notices":[]}
/// ```
///
/// # Errors
///
/// Returns 502 if the ticket service cannot list ticket types.
pub async fn list_ticket_types(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> Result<Json<HomeView>, AppError> {
    let types = purchasable_types(state.service.list_ticket_types().await?);

    let ticket_types = types
        .iter()
        .map(|ticket_type| CatalogEntryView {
            ticket_type: TicketTypeView::from(ticket_type),
            purchase_path: scoped_purchase_path(state.purchase_path(), &ticket_type.id),
        })
        .collect();

    let notices = query
        .unknown_type
        .map(|id| {
            let error = PortalError::NotFound(id);
            vec![Notice::error(error.user_message())]
        })
        .unwrap_or_default();

    Ok(Json(HomeView {
        ticket_types,
        notices,
    }))
}

/// `{purchase}?type=<id>`, with the id form-encoded
#[must_use]
pub fn scoped_purchase_path(purchase_path: &str, type_id: &TicketTypeId) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(type_id.as_str().as_bytes()).collect();
    format!("{purchase_path}?type={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_purchase_path_encodes_id() {
        assert_eq!(
            scoped_purchase_path("/buy-ticket", &TicketTypeId::from("weekly-5000")),
            "/buy-ticket?type=weekly-5000"
        );
        assert_eq!(
            scoped_purchase_path("/login", &TicketTypeId::from("day pass&more")),
            "/login?type=day+pass%26more"
        );
    }
}
