//! Ticket purchase form.
//!
//! Selection, validation and submission are one finite-state value, so a
//! submission without a selection, or two submissions at once, cannot be
//! represented.
//!
//! ```text
//! Browsing ──select──▶ Selected ──submit (valid)──▶ Submitting ──ok──▶ Succeeded
//!                        ▲   │                           │                 │
//!                        │   └─select other ticket       │                 │
//!                        └──────────── failure ──────────┘                 │
//! Browsing ◀─────────────────────────── restart ───────────────────────────┘
//! ```

use crate::error::ServiceError;
use crate::phone::PhoneNumber;
use crate::state::{PortalAction, PortalEnvironment, PortalState};
use crate::types::{Notice, PurchaseRequest, PurchaseResult, Ticket, TicketId};
use std::sync::Arc;
use ticket_portal_core::{Effect, Reducer, SmallVec, async_effect, smallvec};

/// Notice shown after a successful purchase
pub const PURCHASE_SUCCEEDED_MESSAGE: &str = "Ticket purchased successfully!";

/// Notice shown when submitting with nothing selected
pub const SELECT_TICKET_MESSAGE: &str = "Please select a ticket";

/// Notice shown when the chosen ticket is not in the loaded catalog
pub const UNKNOWN_TICKET_MESSAGE: &str = "This ticket is not available, please choose another one";

/// Purchase form state machine
#[derive(Clone, Debug)]
pub enum PurchasePhase {
    /// No ticket chosen
    Browsing {
        /// Phone number exactly as typed
        phone_input: String,
    },
    /// Ticket chosen, form editable
    Selected {
        /// Chosen ticket
        ticket: Ticket,
        /// Phone number exactly as typed
        phone_input: String,
    },
    /// Request in flight, form locked
    Submitting {
        /// Ticket being bought
        ticket: Ticket,
        /// Phone number as typed, restored on failure
        phone_input: String,
        /// Request sent to the ticket service
        request: PurchaseRequest,
    },
    /// Purchase completed; credentials available
    Succeeded {
        /// Issued credentials
        result: PurchaseResult,
    },
}

impl Default for PurchasePhase {
    fn default() -> Self {
        Self::Browsing {
            phone_input: String::new(),
        }
    }
}

impl PurchasePhase {
    /// Short name for views and logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Browsing { .. } => "browsing",
            Self::Selected { .. } => "selected",
            Self::Submitting { .. } => "submitting",
            Self::Succeeded { .. } => "succeeded",
        }
    }

    /// Ticket currently chosen (also while submitting)
    #[must_use]
    pub const fn selected_ticket(&self) -> Option<&Ticket> {
        match self {
            Self::Selected { ticket, .. } | Self::Submitting { ticket, .. } => Some(ticket),
            Self::Browsing { .. } | Self::Succeeded { .. } => None,
        }
    }

    /// Phone number as typed; empty once the purchase succeeded
    #[must_use]
    pub fn phone_input(&self) -> &str {
        match self {
            Self::Browsing { phone_input }
            | Self::Selected { phone_input, .. }
            | Self::Submitting { phone_input, .. } => phone_input,
            Self::Succeeded { .. } => "",
        }
    }

    /// Whether a purchase request is in flight
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    /// Result of the completed purchase
    #[must_use]
    pub const fn result(&self) -> Option<&PurchaseResult> {
        match self {
            Self::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    /// Whether the submit affordance should be enabled
    #[must_use]
    pub fn can_submit(&self) -> bool {
        matches!(self, Self::Selected { phone_input, .. } if !phone_input.trim().is_empty())
    }
}

/// Reducer for the purchase form
#[derive(Clone, Debug, Default)]
pub struct PurchaseReducer;

impl PurchaseReducer {
    /// Create the purchase reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn select(state: &mut PortalState, ticket_id: &TicketId) {
        let phone_input = match &state.phase {
            PurchasePhase::Browsing { phone_input }
            | PurchasePhase::Selected { phone_input, .. } => phone_input.clone(),
            PurchasePhase::Submitting { .. } | PurchasePhase::Succeeded { .. } => {
                tracing::debug!(phase = state.phase.name(), "Ignoring selection");
                return;
            },
        };

        let Some(ticket) = state.catalog.find(ticket_id).cloned() else {
            tracing::debug!(%ticket_id, "Selected ticket is not in the loaded catalog");
            state.notify(Notice::error(UNKNOWN_TICKET_MESSAGE));
            return;
        };

        state.phase = PurchasePhase::Selected {
            ticket,
            phone_input,
        };
    }

    fn submit(
        state: &mut PortalState,
        env: &PortalEnvironment,
    ) -> SmallVec<[Effect<PortalAction>; 4]> {
        let (ticket, phone_input) = match &state.phase {
            PurchasePhase::Selected {
                ticket,
                phone_input,
            } => (ticket.clone(), phone_input.clone()),
            PurchasePhase::Browsing { .. } => {
                state.notify(Notice::error(SELECT_TICKET_MESSAGE));
                return SmallVec::new();
            },
            PurchasePhase::Submitting { .. } => {
                tracing::warn!("Purchase already in flight, ignoring submission");
                return SmallVec::new();
            },
            PurchasePhase::Succeeded { .. } => return SmallVec::new(),
        };

        let phone = match PhoneNumber::parse(&phone_input) {
            Ok(phone) => phone,
            Err(error) => {
                tracing::debug!(error = %error, "Purchase blocked by validation");
                state.notify(Notice::error(error.user_message()));
                return SmallVec::new();
            },
        };

        let request = PurchaseRequest::mobile_money(ticket.id.clone(), phone);
        tracing::info!(ticket_id = %ticket.id, "Submitting ticket purchase");
        metrics::counter!("portal.purchases.submitted").increment(1);

        state.phase = PurchasePhase::Submitting {
            ticket,
            phone_input,
            request: request.clone(),
        };

        let service = Arc::clone(&env.service);
        smallvec![async_effect! {
            Some(match service.purchase_ticket(request).await {
                Ok(result) => PortalAction::PurchaseSucceeded { result },
                Err(error) => PortalAction::PurchaseFailed { error },
            })
        }]
    }

    fn fail(state: &mut PortalState, error: &ServiceError) {
        let (ticket, phone_input) = match std::mem::take(&mut state.phase) {
            PurchasePhase::Submitting {
                ticket,
                phone_input,
                ..
            } => (ticket, phone_input),
            other => {
                state.phase = other;
                return;
            },
        };

        tracing::warn!(ticket_id = %ticket.id, error = %error, "Ticket purchase failed");
        metrics::counter!("portal.purchases.failed").increment(1);

        state.notify(Notice::error(error.user_message()));
        state.phase = PurchasePhase::Selected {
            ticket,
            phone_input,
        };
    }
}

impl Reducer for PurchaseReducer {
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
            PortalAction::SelectTicket { ticket_id } => {
                Self::select(state, &ticket_id);
                SmallVec::new()
            },

            PortalAction::PhoneNumberChanged { value } => {
                if let PurchasePhase::Browsing { phone_input }
                | PurchasePhase::Selected { phone_input, .. } = &mut state.phase
                {
                    *phone_input = value;
                }
                SmallVec::new()
            },

            PortalAction::SubmitPurchase => Self::submit(state, env),

            PortalAction::PurchaseSucceeded { result } => {
                if state.phase.is_submitting() {
                    tracing::info!(profile = %result.credentials.profile, "Ticket purchased");
                    metrics::counter!("portal.purchases.succeeded").increment(1);

                    state.phase = PurchasePhase::Succeeded { result };
                    state.notify(Notice::success(PURCHASE_SUCCEEDED_MESSAGE));
                }
                SmallVec::new()
            },

            PortalAction::PurchaseFailed { error } => {
                Self::fail(state, &error);
                SmallVec::new()
            },

            _ => SmallVec::new(),
        }
    }
}
