//! Purchase flow endpoints.
//!
//! - GET {purchase}?type=<id> - Open a fresh session and load its catalog
//! - GET {purchase}/state - Current view of the caller's session
//! - POST {purchase}/select - Pick a ticket
//! - PUT {purchase}/phone - Edit the phone number field
//! - POST {purchase}/purchase - Submit the form
//! - POST {purchase}/copy - Copy one credential field, or username and password
//! - POST {purchase}/restart - Discard the result and start over
//!
//! Every response carries the session id in the `X-Portal-Session` header.
//! Notices are delivered once: a rendered view acknowledges the notices it
//! contains.

use super::extractors::{VisitorSession, session_id};
use super::state::AppState;
use crate::credentials::CredentialField;
use crate::session::{SESSION_HEADER, Session};
use crate::state::{Navigation, PortalAction};
use crate::types::{TicketId, TicketTypeId};
use crate::views::PurchaseView;
use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters of the purchase entry
#[derive(Debug, Default, Deserialize)]
pub struct OpenQuery {
    /// Pre-selected ticket type
    #[serde(rename = "type")]
    pub type_id: Option<String>,
}

/// Request to pick a ticket
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    /// Chosen ticket
    pub ticket_id: TicketId,
}

/// Request to edit the phone number field
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRequest {
    /// Raw field content
    pub phone_number: String,
}

/// Request to copy credentials
///
/// Without a field, username and password are copied together.
#[derive(Debug, Default, Deserialize)]
pub struct CopyRequest {
    /// Single field to copy
    #[serde(default)]
    pub field: Option<CredentialField>,
}

/// Purchase page for one session
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// Session identifier (also in the `X-Portal-Session` header)
    pub session_id: String,
    /// Page content
    #[serde(flatten)]
    pub view: PurchaseView,
}

/// Purchase page plus the copied text
#[derive(Debug, Serialize)]
pub struct CopyResponse {
    /// Text placed on the clipboard, if anything was copied
    pub copied: Option<String>,
    /// Page content
    #[serde(flatten)]
    pub session: SessionView,
}

// ============================================================================
// Handlers
// ============================================================================

/// Enter the purchase flow
///
/// Always starts a new session; a session named in the request header is
/// discarded. An unknown ticket type sends the visitor to the catalog
/// listing instead.
pub async fn open(
    State(state): State<AppState>,
    Query(query): Query<OpenQuery>,
    headers: HeaderMap,
) -> Response {
    let type_id = query
        .type_id
        .filter(|id| !id.trim().is_empty())
        .map(TicketTypeId::new);

    let previous = session_id(&headers);
    let session = state.sessions.open(previous.as_ref()).await;

    tracing::info!(
        session = %session.id,
        ticket_type = type_id.as_ref().map_or("-", TicketTypeId::as_str),
        "Purchase flow opened"
    );

    dispatch(
        &session,
        PortalAction::LoadCatalog {
            type_id: type_id.clone(),
        },
    )
    .await;

    let redirect = session.store.state(|s| s.redirect).await;
    match (redirect, type_id) {
        (Some(Navigation::CatalogEntry), Some(type_id)) => {
            state.sessions.close(&session.id).await;
            let encoded: String =
                url::form_urlencoded::byte_serialize(type_id.as_str().as_bytes()).collect();
            Redirect::to(&format!(
                "{}?unknown_type={encoded}",
                state.routes.catalog_entry_path
            ))
            .into_response()
        },
        (Some(Navigation::CatalogEntry), None) => {
            state.sessions.close(&session.id).await;
            Redirect::to(&state.routes.catalog_entry_path).into_response()
        },
        (None, _) => render(&session).await,
    }
}

/// Current view of the caller's session
pub async fn current(VisitorSession(session): VisitorSession) -> Response {
    render(&session).await
}

/// Pick a ticket
pub async fn select(
    VisitorSession(session): VisitorSession,
    Json(request): Json<SelectRequest>,
) -> Response {
    dispatch(
        &session,
        PortalAction::SelectTicket {
            ticket_id: request.ticket_id,
        },
    )
    .await;
    render(&session).await
}

/// Edit the phone number field
pub async fn phone(
    VisitorSession(session): VisitorSession,
    Json(request): Json<PhoneRequest>,
) -> Response {
    dispatch(
        &session,
        PortalAction::PhoneNumberChanged {
            value: request.phone_number,
        },
    )
    .await;
    render(&session).await
}

/// Submit the purchase form and wait for the ticket service's answer
///
/// The outcome is reported through the view: credentials on success, a
/// notice on failure.
pub async fn purchase(VisitorSession(session): VisitorSession) -> Response {
    dispatch(&session, PortalAction::SubmitPurchase).await;
    render(&session).await
}

/// Copy credentials
///
/// The copied text is returned in the response for the page to place on the
/// visitor's clipboard.
pub async fn copy(
    VisitorSession(session): VisitorSession,
    Json(request): Json<CopyRequest>,
) -> Response {
    let action = request
        .field
        .map_or(PortalAction::CopyCredentials, |field| PortalAction::CopyField {
            field,
        });
    dispatch(&session, action).await;

    let copied = session.clipboard.take().await;
    let view = snapshot(&session).await;

    (
        [(SESSION_HEADER, session.id.to_string())],
        Json(CopyResponse {
            copied,
            session: view,
        }),
    )
        .into_response()
}

/// Discard the purchase result
pub async fn restart(VisitorSession(session): VisitorSession) -> Response {
    dispatch(&session, PortalAction::Restart).await;
    render(&session).await
}

// ============================================================================
// Helpers
// ============================================================================

/// Send an action and wait for every effect it causes
async fn dispatch(session: &Session, action: PortalAction) {
    session.store.send(action).await.wait().await;
}

/// Snapshot the session and acknowledge the notices it shows
async fn snapshot(session: &Session) -> SessionView {
    let (view, shown_from) = session
        .store
        .state(|state| (PurchaseView::from_state(state), state.acknowledged_notices))
        .await;

    if !view.notices.is_empty() {
        let through = shown_from + view.notices.len() as u64;
        session
            .store
            .send(PortalAction::NoticesAcknowledged { through })
            .await;
    }

    SessionView {
        session_id: session.id.to_string(),
        view,
    }
}

async fn render(session: &Session) -> Response {
    let view = snapshot(session).await;
    (
        [(SESSION_HEADER, session.id.to_string())],
        Json(view),
    )
        .into_response()
}
