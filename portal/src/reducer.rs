//! The combined portal reducer.

use crate::catalog::CatalogReducer;
use crate::credentials::CredentialReducer;
use crate::purchase::PurchaseReducer;
use crate::state::{PortalAction, PortalEnvironment, PortalState};
use ticket_portal_core::composition::{CombinedReducer, combine_reducers};
use ticket_portal_core::{Effect, Reducer, SmallVec};

/// Reducer driving one visitor session
pub type PortalReducer = CombinedReducer<PortalState, PortalAction, PortalEnvironment>;

/// Catalog, purchase form, credential reveal and shell bookkeeping, in that
/// order
///
/// The catalog runs before the purchase form so it still sees the
/// `Submitting` phase when a purchase succeeds.
#[must_use]
pub fn portal_reducer() -> PortalReducer {
    combine_reducers(vec![
        Box::new(CatalogReducer::new()),
        Box::new(PurchaseReducer::new()),
        Box::new(CredentialReducer::new()),
        Box::new(ShellReducer),
    ])
}

/// Drains notices once the shell has shown them
#[derive(Clone, Debug, Default)]
pub struct ShellReducer;

impl Reducer for ShellReducer {
    type State = PortalState;
    type Action = PortalAction;
    type Environment = PortalEnvironment;

    fn reduce(
        &self,
        state: &mut PortalState,
        action: PortalAction,
        _env: &PortalEnvironment,
    ) -> SmallVec<[Effect<PortalAction>; 4]> {
        if let PortalAction::NoticesAcknowledged { through } = action {
            let unseen = through.saturating_sub(state.acknowledged_notices);
            let count = usize::try_from(unseen)
                .unwrap_or(usize::MAX)
                .min(state.notices.len());
            state.notices.drain(..count);
            state.acknowledged_notices += count as u64;
        }
        SmallVec::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{self, fixtures};
    use crate::purchase::PurchasePhase;
    use crate::types::{Credentials, Notice, PurchaseResult};
    use std::sync::Arc;
    use ticket_portal_testing::{ReducerTest, assertions};

    fn environment() -> PortalEnvironment {
        mocks::environment(&Arc::new(fixtures::weekly_service())).0
    }

    #[test]
    fn test_acknowledging_keeps_later_notices() {
        let state = PortalState {
            notices: vec![
                Notice::error("first"),
                Notice::success("second"),
                Notice::success("third"),
            ],
            ..PortalState::default()
        };

        ReducerTest::new(portal_reducer())
            .with_env(environment())
            .given_state(state)
            .when_action(PortalAction::NoticesAcknowledged { through: 2 })
            .then_state(|state| {
                assert_eq!(state.notices, vec![Notice::success("third")]);
                assert_eq!(state.acknowledged_notices, 2);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_acknowledging_more_than_queued() {
        let state = PortalState {
            notices: vec![Notice::error("only")],
            ..PortalState::default()
        };

        ReducerTest::new(portal_reducer())
            .with_env(environment())
            .given_state(state)
            .when_action(PortalAction::NoticesAcknowledged { through: 5 })
            .then_state(|state| {
                assert!(state.notices.is_empty());
                assert_eq!(state.acknowledged_notices, 1);
            })
            .run();
    }

    #[test]
    fn test_repeated_acknowledgement_spares_newer_notice() {
        // Two views rendered the same first notice; a copy lands in between
        let state = PortalState {
            notices: vec![Notice::success(crate::purchase::PURCHASE_SUCCEEDED_MESSAGE)],
            ..PortalState::default()
        };

        ReducerTest::new(portal_reducer())
            .with_env(environment())
            .given_state(state)
            .when_action(PortalAction::Copied {
                label: "Username".to_string(),
            })
            .when_action(PortalAction::NoticesAcknowledged { through: 1 })
            .when_action(PortalAction::NoticesAcknowledged { through: 1 })
            .then_state(|state| {
                assert_eq!(state.notices, vec![Notice::success("Username copied")]);
                assert_eq!(state.acknowledged_notices, 1);
            })
            .run();
    }

    #[test]
    fn test_purchase_success_reloads_current_scope() {
        let mut state = PortalState::default();
        state.catalog.scope = crate::catalog::CatalogScope::Type("weekly-5000".into());
        state.catalog.tickets = fixtures::tickets("weekly-5000", 3, 5000);

        let result = PurchaseResult {
            credentials: Credentials {
                username: "u".to_string(),
                password: "p".to_string(),
                profile: "weekly".to_string(),
                instructions: String::new(),
            },
        };

        ReducerTest::new(portal_reducer())
            .with_env(environment())
            .given_state(state)
            .when_action(PortalAction::SelectTicket {
                ticket_id: "weekly-5000-1".into(),
            })
            .when_action(PortalAction::PhoneNumberChanged {
                value: "0900000000".to_string(),
            })
            .when_action(PortalAction::SubmitPurchase)
            .when_action(PortalAction::PurchaseSucceeded { result })
            .then_state(|state| {
                assert!(matches!(state.phase, PurchasePhase::Succeeded { .. }));
                assert!(state.catalog.loading);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_portal_reducer_combines_all_components() {
        assert_eq!(portal_reducer().len(), 4);
    }
}
