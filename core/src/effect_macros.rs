//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// The block evaluates to `Option<Action>`; a `Some` is fed back into the
/// reducer by the runtime.
///
/// # Example
///
/// ```
/// use ticket_portal_core::{async_effect, Effect};
///
/// #[derive(Debug)]
/// enum Action {
///     Loaded { count: usize },
/// }
///
/// let effect: Effect<Action> = async_effect! {
///     Some(Action::Loaded { count: 3 })
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
