//! Custom Axum extractors.

use super::error::AppError;
use super::state::AppState;
use crate::session::{SESSION_HEADER, Session, SessionId};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

/// Session id sent by the client, if present and well-formed
#[must_use]
pub fn session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

/// The caller's live visitor session
///
/// Rejects with `404 SESSION_NOT_FOUND` when the `X-Portal-Session` header
/// is missing, malformed or names an expired session.
#[derive(Debug, Clone)]
pub struct VisitorSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for VisitorSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = session_id(&parts.headers).ok_or_else(AppError::session_not_found)?;

        state
            .sessions
            .get(&id)
            .await
            .map(Self)
            .ok_or_else(|| {
                tracing::debug!(session = %id, "Unknown session");
                AppError::session_not_found()
            })
    }
}
