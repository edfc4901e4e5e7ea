//! # Ticket Portal Runtime
//!
//! The Store runtime that owns a visitor session's state, runs the reducer
//! for every action and executes the effects it returns.
//!
//! ## Core Components
//!
//! - **Store**: Holds state behind a `RwLock` and coordinates reducer execution
//! - **Effect Executor**: Spawns effect futures and feeds produced actions back
//! - **`EffectHandle`**: Lets the shell wait until an action has fully settled
//!
//! ## Example
//!
//! ```ignore
//! use ticket_portal_runtime::Store;
//!
//! let store = Store::new(PortalState::default(), portal_reducer(), environment);
//!
//! // Load the catalog and wait for the fetch (and its follow-ups) to settle
//! store.send(PortalAction::LoadCatalog { type_id: None }).await.wait().await;
//!
//! let tickets = store.state(|s| s.catalog.tickets.len()).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

pub use store::Store;

/// Shared bookkeeping for the effects caused by one `send`.
///
/// Feedback actions inherit the tracking of the effect that produced them,
/// so an [`EffectHandle`] only resolves once the whole cascade has settled.
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn new() -> (Self, EffectHandle) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let tracking = Self {
            counter: Arc::clone(&counter),
            notifier: Arc::new(tx),
        };

        (tracking, EffectHandle { counter, receiver: rx })
    }

    /// Mark one effect as in flight until the returned guard is dropped
    fn begin(&self) -> InFlight {
        self.counter.fetch_add(1, Ordering::SeqCst);
        InFlight(self.clone())
    }
}

/// Decrements the tracking counter on drop (also on panic unwinding)
struct InFlight(EffectTracking);

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.0.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.0.notifier.send(());
        }
    }
}

/// Handle for waiting on the effects caused by a single action
///
/// Returned by [`Store::send`]. Dropping the handle does not cancel anything;
/// effects keep running and their results are still reduced.
#[derive(Debug)]
pub struct EffectHandle {
    counter: Arc<AtomicUsize>,
    receiver: watch::Receiver<()>,
}

impl EffectHandle {
    /// Number of effects still in flight
    #[must_use]
    pub fn pending(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    /// Whether every effect (including cascaded ones) has completed
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pending() == 0
    }

    /// Wait until every effect caused by the action has completed
    ///
    /// This includes effects returned for actions that the original effects
    /// fed back into the store.
    pub async fn wait(&mut self) {
        while !self.is_settled() {
            if self.receiver.changed().await.is_err() {
                break;
            }
        }
    }
}

/// The Store and its effect executor
pub mod store {
    use super::{Arc, EffectHandle, EffectTracking};
    use futures::future::BoxFuture;
    use ticket_portal_core::{effect::Effect, reducer::Reducer};
    use tokio::sync::RwLock;

    struct StoreInner<S, E, R> {
        state: RwLock<S>,
        reducer: R,
        environment: E,
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; reductions are serialized)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a Store is cheap and yields a handle to the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        inner: Arc<StoreInner<S, E, R>>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        S: Send + Sync + 'static,
        A: Send + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self {
                inner: Arc::new(StoreInner {
                    state: RwLock::new(initial_state),
                    reducer,
                    environment,
                }),
            }
        }

        /// Send an action to the store
        ///
        /// The reducer runs immediately (under the state write lock); any
        /// effects it returns are spawned on the tokio runtime. The returned
        /// handle resolves once all of them, and every action they feed back,
        /// have been processed.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> EffectHandle {
            let (tracking, handle) = EffectTracking::new();
            self.dispatch(action, tracking).await;
            handle
        }

        /// Read the current state through a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.inner.state.read().await;
            f(&state)
        }

        fn dispatch(&self, action: A, tracking: EffectTracking) -> BoxFuture<'static, ()> {
            let store = self.clone();

            Box::pin(async move {
                metrics::counter!("store.actions.reduced").increment(1);

                let effects = {
                    let mut state = store.inner.state.write().await;
                    store
                        .inner
                        .reducer
                        .reduce(&mut state, action, &store.inner.environment)
                };

                for effect in effects {
                    store.execute_effect(effect, &tracking);
                }
            })
        }

        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);

                    let in_flight = tracking.begin();
                    let tracking = tracking.clone();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _in_flight = in_flight;

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            store.dispatch(action, tracking).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticket_portal_core::{Effect, Reducer, SmallVec, async_effect, smallvec};

    #[derive(Clone, Debug, Default)]
    struct LoaderState {
        loading: bool,
        items: Vec<u32>,
        refreshes: u32,
    }

    #[derive(Clone, Debug)]
    enum LoaderAction {
        Load,
        Loaded(Vec<u32>),
        Refreshed,
    }

    struct LoaderReducer;

    impl Reducer for LoaderReducer {
        type State = LoaderState;
        type Action = LoaderAction;
        type Environment = Vec<u32>;

        fn reduce(
            &self,
            state: &mut LoaderState,
            action: LoaderAction,
            env: &Vec<u32>,
        ) -> SmallVec<[Effect<LoaderAction>; 4]> {
            match action {
                LoaderAction::Load => {
                    state.loading = true;
                    let items = env.clone();
                    smallvec![async_effect! {
                        tokio::task::yield_now().await;
                        Some(LoaderAction::Loaded(items))
                    }]
                },
                LoaderAction::Loaded(items) => {
                    state.loading = false;
                    state.items = items;
                    smallvec![async_effect! { Some(LoaderAction::Refreshed) }]
                },
                LoaderAction::Refreshed => {
                    state.refreshes += 1;
                    SmallVec::new()
                },
            }
        }
    }

    #[tokio::test]
    async fn test_wait_covers_feedback_cascade() {
        let store = Store::new(LoaderState::default(), LoaderReducer, vec![1, 2, 3]);

        let mut handle = store.send(LoaderAction::Load).await;
        handle.wait().await;

        assert!(handle.is_settled());
        let (loading, items, refreshes) = store
            .state(|s| (s.loading, s.items.clone(), s.refreshes))
            .await;
        assert!(!loading);
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(refreshes, 1);
    }

    #[tokio::test]
    async fn test_action_without_effects_is_settled_immediately() {
        let store = Store::new(LoaderState::default(), LoaderReducer, Vec::new());

        let mut handle = store.send(LoaderAction::Refreshed).await;
        assert!(handle.is_settled());
        handle.wait().await;

        assert_eq!(store.state(|s| s.refreshes).await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = Store::new(LoaderState::default(), LoaderReducer, vec![9]);
        let other = store.clone();

        other.send(LoaderAction::Load).await.wait().await;

        assert_eq!(store.state(|s| s.items.clone()).await, vec![9]);
    }
}
