//! Visitor sessions.
//!
//! Each visitor gets a [`Store`] of its own; nothing is shared between
//! visitors except the ticket service client. Sessions live in memory only
//! and are replaced whenever the visitor re-enters the purchase flow, so
//! issued credentials cannot be fetched again after navigating away.

use crate::credentials::{BufferClipboard, Clipboard};
use crate::reducer::{PortalReducer, portal_reducer};
use crate::service::TicketService;
use crate::state::{PortalAction, PortalEnvironment, PortalState};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use ticket_portal_runtime::Store;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Header carrying the session identifier
pub const SESSION_HEADER: &str = "x-portal-session";

/// Store type driving one visitor session
pub type PortalStore = Store<PortalState, PortalAction, PortalEnvironment, PortalReducer>;

/// Opaque session identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random session id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// One visitor session
#[derive(Clone)]
pub struct Session {
    /// Session identifier
    pub id: SessionId,
    /// Store running the portal reducer for this visitor
    pub store: PortalStore,
    /// Where this visitor's copy actions land
    pub clipboard: Arc<BufferClipboard>,
    /// When the session was opened
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Sessions {
    by_id: HashMap<SessionId, Session>,
    opened: VecDeque<SessionId>,
}

impl Sessions {
    fn remove(&mut self, id: &SessionId) -> bool {
        let removed = self.by_id.remove(id).is_some();
        if removed {
            self.opened.retain(|opened| opened != id);
        }
        removed
    }
}

/// Bounded in-memory registry of visitor sessions
///
/// When full, opening a session evicts the oldest one.
pub struct SessionRegistry {
    service: Arc<dyn TicketService>,
    max_sessions: usize,
    sessions: RwLock<Sessions>,
}

impl SessionRegistry {
    /// Create a registry holding at most `max_sessions` sessions (at least one)
    #[must_use]
    pub fn new(service: Arc<dyn TicketService>, max_sessions: usize) -> Self {
        Self {
            service,
            max_sessions: max_sessions.max(1),
            sessions: RwLock::new(Sessions::default()),
        }
    }

    /// Open a fresh session, discarding `previous` if given
    pub async fn open(&self, previous: Option<&SessionId>) -> Session {
        let clipboard = Arc::new(BufferClipboard::new());
        let environment = PortalEnvironment::new(
            Arc::clone(&self.service),
            Arc::clone(&clipboard) as Arc<dyn Clipboard>,
        );

        let session = Session {
            id: SessionId::new(),
            store: Store::new(PortalState::default(), portal_reducer(), environment),
            clipboard,
            created_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().await;

        if let Some(previous) = previous {
            if sessions.remove(previous) {
                tracing::debug!(session = %previous, "Replaced previous session");
            }
        }

        while sessions.by_id.len() >= self.max_sessions {
            let Some(oldest) = sessions.opened.pop_front() else {
                break;
            };
            sessions.by_id.remove(&oldest);
            tracing::info!(session = %oldest, "Evicted oldest session");
            metrics::counter!("portal.sessions.evicted").increment(1);
        }

        sessions.opened.push_back(session.id);
        sessions.by_id.insert(session.id, session.clone());

        tracing::debug!(session = %session.id, active = sessions.by_id.len(), "Session opened");
        #[allow(clippy::cast_precision_loss)] // Session counts stay far below 2^52
        metrics::gauge!("portal.sessions.active").set(sessions.by_id.len() as f64);

        session
    }

    /// Look up a live session
    pub async fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.read().await.by_id.get(id).cloned()
    }

    /// Drop a session; returns whether it existed
    pub async fn close(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }

    /// Whether no session is live
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::fixtures;

    fn registry(max_sessions: usize) -> SessionRegistry {
        SessionRegistry::new(Arc::new(fixtures::weekly_service()), max_sessions)
    }

    #[test]
    fn test_session_id_round_trips_through_header_text() {
        let id = SessionId::new();
        let parsed: SessionId = format!(" {id} ").parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-session".parse::<SessionId>().is_err());
    }

    #[tokio::test]
    async fn test_open_replaces_previous_session() {
        let sessions = registry(8);

        let first = sessions.open(None).await;
        let second = sessions.open(Some(&first.id)).await;

        assert_ne!(first.id, second.id);
        assert!(sessions.get(&first.id).await.is_none());
        assert!(sessions.get(&second.id).await.is_some());
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_oldest_session_is_evicted_at_capacity() {
        let sessions = registry(2);

        let a = sessions.open(None).await;
        let b = sessions.open(None).await;
        let c = sessions.open(None).await;

        assert!(sessions.get(&a.id).await.is_none());
        assert!(sessions.get(&b.id).await.is_some());
        assert!(sessions.get(&c.id).await.is_some());
        assert_eq!(sessions.len().await, 2);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_state() {
        let sessions = registry(4);
        let a = sessions.open(None).await;
        let b = sessions.open(None).await;

        a.store
            .send(PortalAction::LoadCatalog { type_id: None })
            .await
            .wait()
            .await;

        assert_eq!(a.store.state(|s| s.catalog.tickets.len()).await, 3);
        assert!(b.store.state(|s| s.catalog.tickets.is_empty()).await);
    }

    #[tokio::test]
    async fn test_close() {
        let sessions = registry(4);
        let session = sessions.open(None).await;

        assert!(sessions.close(&session.id).await);
        assert!(!sessions.close(&session.id).await);
        assert!(sessions.is_empty().await);
    }
}
