//! Ticket catalog loading.
//!
//! Resolves which tickets a visitor may pick from: either one pre-selected
//! ticket type with its open inventory, or the global list of available
//! tickets. Loads are single attempts; a failure empties the catalog and
//! raises one notice.

use crate::error::{PortalError, ServiceError};
use crate::state::{Navigation, PortalAction, PortalEnvironment, PortalState};
use crate::types::{Notice, Ticket, TicketId, TicketType, TicketTypeId};
use std::sync::Arc;
use ticket_portal_core::{Effect, Reducer, SmallVec, async_effect, smallvec};

/// Notice raised when a catalog load fails
pub const LOAD_FAILED_MESSAGE: &str = "Unable to load tickets, please try again";

/// Which slice of the inventory the visitor is looking at
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CatalogScope {
    /// Every available ticket
    #[default]
    All,
    /// Tickets of a single ticket type
    Type(TicketTypeId),
}

impl CatalogScope {
    /// Scope for an optional `?type=` query value
    #[must_use]
    pub fn from_query(type_id: Option<TicketTypeId>) -> Self {
        type_id.map_or(Self::All, Self::Type)
    }
}

/// Loaded inventory for one visitor
#[derive(Clone, Debug, Default)]
pub struct CatalogState {
    /// Scope of the latest load
    pub scope: CatalogScope,
    /// `true` from load start until the fetch settles
    pub loading: bool,
    /// Resolved ticket type for type-scoped loads
    pub ticket_type: Option<TicketType>,
    /// Tickets the visitor can select
    pub tickets: Vec<Ticket>,
}

impl CatalogState {
    /// Look up a loaded ticket by id
    #[must_use]
    pub fn find(&self, ticket_id: &TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| &ticket.id == ticket_id)
    }

    fn clear(&mut self) {
        self.ticket_type = None;
        self.tickets.clear();
    }
}

/// Ticket types visitors can currently buy (active and not sold out)
#[must_use]
pub fn purchasable_types(types: Vec<TicketType>) -> Vec<TicketType> {
    types
        .into_iter()
        .filter(TicketType::is_purchasable)
        .collect()
}

/// Reducer for catalog loading
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Create the catalog reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fetch(scope: CatalogScope, env: &PortalEnvironment) -> Effect<PortalAction> {
        let service = Arc::clone(&env.service);

        match scope {
            CatalogScope::Type(type_id) => async_effect! {
                let fetched = futures::try_join!(
                    service.list_ticket_types(),
                    service.list_tickets_by_type(&type_id),
                );

                Some(match fetched {
                    Ok((types, tickets)) => PortalAction::TypeScopedFetched {
                        type_id,
                        types,
                        tickets,
                    },
                    Err(error) => PortalAction::CatalogLoadFailed {
                        scope: CatalogScope::Type(type_id),
                        error,
                    },
                })
            },
            CatalogScope::All => async_effect! {
                Some(match service.list_available_tickets().await {
                    Ok(tickets) => PortalAction::AvailableFetched { tickets },
                    Err(error) => PortalAction::CatalogLoadFailed {
                        scope: CatalogScope::All,
                        error,
                    },
                })
            },
        }
    }

    fn begin_load(
        state: &mut PortalState,
        scope: CatalogScope,
        env: &PortalEnvironment,
    ) -> SmallVec<[Effect<PortalAction>; 4]> {
        if state.catalog.scope != scope {
            state.catalog.clear();
        }
        state.catalog.scope = scope.clone();
        state.catalog.loading = true;

        smallvec![Self::fetch(scope, env)]
    }

    fn apply_type_scoped(
        state: &mut PortalState,
        type_id: &TicketTypeId,
        types: Vec<TicketType>,
        tickets: Vec<Ticket>,
    ) {
        state.catalog.loading = false;

        let Some(ticket_type) = types.into_iter().find(|t| &t.id == type_id) else {
            tracing::info!(%type_id, "Requested ticket type does not exist");
            state.catalog.clear();
            state.notify(Notice::error(
                PortalError::NotFound(type_id.to_string()).user_message(),
            ));
            state.redirect = Some(Navigation::CatalogEntry);
            return;
        };

        let open: Vec<Ticket> = tickets.into_iter().filter(Ticket::is_available).collect();
        tracing::debug!(%type_id, available = open.len(), "Type-scoped catalog loaded");

        state.catalog.ticket_type = Some(ticket_type);
        state.catalog.tickets = open;
    }

    fn apply_failure(state: &mut PortalState, error: &ServiceError) {
        tracing::warn!(scope = ?state.catalog.scope, error = %error, "Catalog load failed");
        metrics::counter!("portal.catalog.load_failures").increment(1);

        state.catalog.loading = false;
        state.catalog.clear();
        state.notify(Notice::error(LOAD_FAILED_MESSAGE));
    }
}

impl Reducer for CatalogReducer {
    type State = PortalState;
    type Action = PortalAction;
    type Environment = PortalEnvironment;

    fn reduce(
        &self,
        state: &mut PortalState,
        action: PortalAction,
        env: &PortalEnvironment,
    ) -> SmallVec<[Effect<PortalAction>; 4]> {
        match action {
            PortalAction::LoadCatalog { type_id } => {
                Self::begin_load(state, CatalogScope::from_query(type_id), env)
            },

            PortalAction::TypeScopedFetched {
                type_id,
                types,
                tickets,
            } => {
                if state.catalog.scope == CatalogScope::Type(type_id.clone()) {
                    Self::apply_type_scoped(state, &type_id, types, tickets);
                } else {
                    tracing::debug!(%type_id, "Ignoring catalog result for a stale scope");
                }
                SmallVec::new()
            },

            PortalAction::AvailableFetched { tickets } => {
                if state.catalog.scope == CatalogScope::All {
                    state.catalog.loading = false;
                    state.catalog.ticket_type = None;
                    state.catalog.tickets = tickets;
                } else {
                    tracing::debug!("Ignoring catalog result for a stale scope");
                }
                SmallVec::new()
            },

            PortalAction::CatalogLoadFailed { scope, error } => {
                if state.catalog.scope == scope {
                    Self::apply_failure(state, &error);
                }
                SmallVec::new()
            },

            // The sold ticket leaves the pool server-side; re-fetch availability.
            PortalAction::PurchaseSucceeded { .. } if state.phase.is_submitting() => {
                let scope = state.catalog.scope.clone();
                Self::begin_load(state, scope, env)
            },

            _ => SmallVec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{InMemoryTicketService, fixtures};
    use crate::types::{NoticeLevel, TicketStatus};
    use ticket_portal_testing::{ReducerTest, assertions, run_effects};

    fn environment(service: &Arc<InMemoryTicketService>) -> PortalEnvironment {
        crate::mocks::environment(service).0
    }

    #[test]
    fn test_load_starts_loading_and_fetches() {
        let service = Arc::new(InMemoryTicketService::new());

        ReducerTest::new(CatalogReducer::new())
            .with_env(environment(&service))
            .given_state(PortalState::default())
            .when_action(PortalAction::LoadCatalog {
                type_id: Some("weekly-5000".into()),
            })
            .then_state(|state| {
                assert!(state.catalog.loading);
                assert_eq!(
                    state.catalog.scope,
                    CatalogScope::Type("weekly-5000".into())
                );
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[tokio::test]
    async fn test_type_scoped_fetch_issues_both_calls() {
        let service = Arc::new(fixtures::weekly_service());
        let env = environment(&service);
        let mut state = PortalState::default();

        let effects = CatalogReducer.reduce(
            &mut state,
            PortalAction::LoadCatalog {
                type_id: Some("weekly-5000".into()),
            },
            &env,
        );
        let actions = run_effects(effects).await;

        assert_eq!(service.calls().list_ticket_types, 1);
        assert_eq!(service.calls().list_tickets_by_type, 1);
        assert_eq!(service.calls().list_available_tickets, 0);
        assert!(matches!(
            actions.as_slice(),
            [PortalAction::TypeScopedFetched { .. }]
        ));
    }

    #[test]
    fn test_type_scoped_result_keeps_only_available_tickets() {
        let service = Arc::new(InMemoryTicketService::new());
        let mut tickets = fixtures::tickets("weekly-5000", 3, 5000);
        tickets[1].status = TicketStatus::Reserved;

        ReducerTest::new(CatalogReducer::new())
            .with_env(environment(&service))
            .given_state(PortalState::default())
            .when_action(PortalAction::LoadCatalog {
                type_id: Some("weekly-5000".into()),
            })
            .when_action(PortalAction::TypeScopedFetched {
                type_id: "weekly-5000".into(),
                types: vec![fixtures::ticket_type("weekly-5000", 5000, 3)],
                tickets,
            })
            .then_state(|state| {
                assert!(!state.catalog.loading);
                assert_eq!(state.catalog.tickets.len(), 2);
                assert!(state.catalog.tickets.iter().all(Ticket::is_available));
                assert_eq!(
                    state.catalog.ticket_type.as_ref().map(|t| t.id.as_str()),
                    Some("weekly-5000")
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_unknown_type_redirects_without_selecting_a_type() {
        let service = Arc::new(InMemoryTicketService::new());

        ReducerTest::new(CatalogReducer::new())
            .with_env(environment(&service))
            .given_state(PortalState::default())
            .when_action(PortalAction::LoadCatalog {
                type_id: Some("ghost".into()),
            })
            .when_action(PortalAction::TypeScopedFetched {
                type_id: "ghost".into(),
                types: vec![fixtures::ticket_type("weekly-5000", 5000, 3)],
                tickets: fixtures::tickets("ghost", 2, 1000),
            })
            .then_state(|state| {
                assert!(!state.catalog.loading);
                assert!(state.catalog.ticket_type.is_none());
                assert!(state.catalog.tickets.is_empty());
                assert_eq!(state.redirect, Some(Navigation::CatalogEntry));
                assert_eq!(state.notices.len(), 1);
                assert_eq!(state.notices[0].level, NoticeLevel::Error);
            })
            .run();
    }

    #[test]
    fn test_failure_empties_catalog_with_one_notice() {
        let service = Arc::new(InMemoryTicketService::new());
        let mut state = PortalState::default();
        state.catalog.tickets = fixtures::tickets("weekly-5000", 2, 5000);

        ReducerTest::new(CatalogReducer::new())
            .with_env(environment(&service))
            .given_state(state)
            .when_action(PortalAction::CatalogLoadFailed {
                scope: CatalogScope::All,
                error: ServiceError::Transport("connection reset".to_string()),
            })
            .then_state(|state| {
                assert!(!state.catalog.loading);
                assert!(state.catalog.tickets.is_empty());
                assert_eq!(state.notices, vec![Notice::error(LOAD_FAILED_MESSAGE)]);
                assert!(state.redirect.is_none());
            })
            .run();
    }

    #[test]
    fn test_stale_results_are_ignored() {
        let service = Arc::new(InMemoryTicketService::new());

        ReducerTest::new(CatalogReducer::new())
            .with_env(environment(&service))
            .given_state(PortalState::default())
            .when_action(PortalAction::LoadCatalog {
                type_id: Some("daily-1000".into()),
            })
            .when_action(PortalAction::AvailableFetched {
                tickets: fixtures::tickets("weekly-5000", 2, 5000),
            })
            .when_action(PortalAction::CatalogLoadFailed {
                scope: CatalogScope::All,
                error: ServiceError::Transport("late".to_string()),
            })
            .then_state(|state| {
                assert!(state.catalog.loading);
                assert!(state.catalog.tickets.is_empty());
                assert!(state.notices.is_empty());
            })
            .run();
    }

    #[test]
    fn test_purchasable_types_filter() {
        let mut inactive = fixtures::ticket_type("monthly", 15000, 9);
        inactive.is_active = false;

        let visible = purchasable_types(vec![
            fixtures::ticket_type("weekly-5000", 5000, 3),
            fixtures::ticket_type("daily-1000", 1000, 0),
            inactive,
        ]);

        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), "weekly-5000");
    }
}
