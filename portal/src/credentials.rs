//! Credential presentation after a successful purchase.
//!
//! The issued credentials are shown once. Copy actions go through the
//! [`Clipboard`] environment dependency and are best-effort: the visitor gets
//! the same confirmation whether or not the write landed.

use crate::purchase::PurchasePhase;
use crate::state::{PortalAction, PortalEnvironment, PortalState};
use crate::types::{Credentials, Notice};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use ticket_portal_core::{Effect, Reducer, SmallVec, async_effect, smallvec};
use tokio::sync::Mutex;

/// Single credential value that can be copied
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialField {
    /// Hotspot username
    Username,
    /// Hotspot password
    Password,
    /// Hotspot profile
    Profile,
}

impl CredentialField {
    /// Value of this field in `credentials`
    #[must_use]
    pub fn value(self, credentials: &Credentials) -> &str {
        match self {
            Self::Username => &credentials.username,
            Self::Password => &credentials.password,
            Self::Profile => &credentials.profile,
        }
    }

    /// Label used in the copy confirmation
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Password => "Password",
            Self::Profile => "Profile",
        }
    }
}

/// Username and password joined by a line break
#[must_use]
pub fn combined_text(credentials: &Credentials) -> String {
    format!("{}\n{}", credentials.username, credentials.password)
}

/// Destination of copy actions
///
/// Writes are fire-and-forget; implementations swallow their own failures.
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard content
    fn write(&self, text: String) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Clipboard holding the last copied text for the HTTP shell to hand back
#[derive(Debug, Default)]
pub struct BufferClipboard {
    content: Mutex<Option<String>>,
}

impl BufferClipboard {
    /// Create an empty clipboard
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending copied text, leaving the clipboard empty
    pub async fn take(&self) -> Option<String> {
        self.content.lock().await.take()
    }
}

impl Clipboard for BufferClipboard {
    fn write(&self, text: String) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            *self.content.lock().await = Some(text);
        })
    }
}

/// Reducer for the credential reveal
#[derive(Clone, Debug, Default)]
pub struct CredentialReducer;

impl CredentialReducer {
    /// Create the credential reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn copy(env: &PortalEnvironment, text: String, label: &'static str) -> Effect<PortalAction> {
        let clipboard = Arc::clone(&env.clipboard);
        async_effect! {
            clipboard.write(text).await;
            Some(PortalAction::Copied { label: label.to_string() })
        }
    }
}

impl Reducer for CredentialReducer {
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
            PortalAction::CopyField { field } => match state.phase.result() {
                Some(result) => {
                    let text = field.value(&result.credentials).to_string();
                    smallvec![Self::copy(env, text, field.label())]
                },
                None => {
                    tracing::debug!(?field, "Nothing to copy");
                    SmallVec::new()
                },
            },

            PortalAction::CopyCredentials => match state.phase.result() {
                Some(result) => {
                    let text = combined_text(&result.credentials);
                    smallvec![Self::copy(env, text, "Credentials")]
                },
                None => SmallVec::new(),
            },

            PortalAction::Copied { label } => {
                state.notify(Notice::success(format!("{label} copied")));
                SmallVec::new()
            },

            PortalAction::Restart => {
                if matches!(state.phase, PurchasePhase::Succeeded { .. }) {
                    tracing::debug!("Discarding purchase result");
                    state.phase = PurchasePhase::default();
                }
                SmallVec::new()
            },

            _ => SmallVec::new(),
        }
    }
}
