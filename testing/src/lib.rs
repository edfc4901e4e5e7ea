//! # Ticket Portal Testing
//!
//! Testing utilities for reducers written against `ticket-portal-core`.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then builder for exercising one reducer step
//! - [`assertions`]: Helpers for inspecting returned effects
//! - [`run_effects`]: Executes effect futures and collects the actions they produce
//!
//! ## Example
//!
//! ```ignore
//! use ticket_portal_testing::{ReducerTest, run_effects};
//!
//! ReducerTest::new(portal_reducer())
//!     .with_env(test_environment())
//!     .given_state(PortalState::default())
//!     .when_action(PortalAction::LoadCatalog { type_id: None })
//!     .then_state(|state| assert!(state.catalog.loading))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```


pub use reducer_test::{ReducerTest, assertions};

use ticket_portal_core::effect::Effect;

/// Execute every effect and collect the actions fed back by them
///
/// Futures are awaited in order. Produced actions are NOT reduced; pass them
/// to the reducer (or a Store) yourself to continue the flow step by step.
pub async fn run_effects<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
{
    let mut actions = Vec::new();

    for effect in effects {
        match effect {
            Effect::None => {},
            Effect::Future(fut) => {
                if let Some(action) = fut.await {
                    actions.push(action);
                }
            },
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_effects_collects_produced_actions() {
        let effects: Vec<Effect<u8>> = vec![
            Effect::None,
            Effect::Future(Box::pin(async { Some(1) })),
            Effect::Future(Box::pin(async { None })),
            Effect::Future(Box::pin(async { Some(2) })),
        ];

        let actions = run_effects(effects).await;

        assert_eq!(actions, vec![1, 2]);
    }
}
