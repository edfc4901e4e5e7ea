//! Reducer composition utilities
//!
//! A portal session is driven by several component reducers (catalog,
//! purchase form, credential presenter) that share one state value and one
//! action type. [`combine_reducers`] runs them in order on every action and
//! concatenates their effects.
//!
//! # Examples
//!
//! ```
//! use ticket_portal_core::{Effect, Reducer, SmallVec};
//! use ticket_portal_core::composition::combine_reducers;
//!
//! #[derive(Clone, Default)]
//! struct Form {
//!     selected: Option<u32>,
//!     submitted: bool,
//! }
//!
//! #[derive(Clone)]
//! enum FormAction {
//!     Select(u32),
//!     Submit,
//! }
//!
//! struct SelectionReducer;
//! struct SubmitReducer;
//!
//! impl Reducer for SelectionReducer {
//!     type State = Form;
//!     type Action = FormAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Form, action: FormAction, _env: &()) -> SmallVec<[Effect<FormAction>; 4]> {
//!         if let FormAction::Select(id) = action {
//!             state.selected = Some(id);
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! impl Reducer for SubmitReducer {
//!     type State = Form;
//!     type Action = FormAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Form, action: FormAction, _env: &()) -> SmallVec<[Effect<FormAction>; 4]> {
//!         if matches!(action, FormAction::Submit) && state.selected.is_some() {
//!             state.submitted = true;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let combined = combine_reducers(vec![Box::new(SelectionReducer), Box::new(SubmitReducer)]);
//!
//! let mut form = Form::default();
//! combined.reduce(&mut form, FormAction::Select(7), &());
//! combined.reduce(&mut form, FormAction::Submit, &());
//! assert!(form.submitted);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Boxed reducer trait object accepted by [`combine_reducers`].
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, and all effects are collected and
/// concatenated. Later reducers observe the state changes made by earlier ones.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    /// Number of reducers in the combination
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether the combination holds no reducers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects.into_iter().filter(|effect| !effect.is_none()));
        }

        all_effects
    }
}
