//! Session state, actions and environment of the portal.

use crate::catalog::{CatalogScope, CatalogState};
use crate::credentials::{Clipboard, CredentialField};
use crate::error::ServiceError;
use crate::purchase::PurchasePhase;
use crate::service::TicketService;
use crate::types::{Notice, PurchaseResult, Ticket, TicketId, TicketType, TicketTypeId};
use std::sync::Arc;

/// Navigation the shell must perform on behalf of the visitor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Back to the general catalog listing
    CatalogEntry,
}

/// Everything one visitor session knows
#[derive(Clone, Debug, Default)]
pub struct PortalState {
    /// Loaded inventory
    pub catalog: CatalogState,
    /// Purchase form
    pub phase: PurchasePhase,
    /// Notices not yet shown to the visitor
    pub notices: Vec<Notice>,
    /// Notices drained so far; position of `notices[0]`
    pub acknowledged_notices: u64,
    /// Pending navigation, if any (the shell closes the session instead of
    /// following it in place)
    pub redirect: Option<Navigation>,
}

impl PortalState {
    /// Queue a notice for the visitor
    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Every input the portal reducers react to
#[derive(Clone, Debug)]
pub enum PortalAction {
    // Catalog
    /// Load the catalog, scoped to a ticket type when one is given
    LoadCatalog {
        /// Ticket type from the `?type=` query parameter
        type_id: Option<TicketTypeId>,
    },
    /// Both type-scoped fetches completed
    TypeScopedFetched {
        /// Requested type
        type_id: TicketTypeId,
        /// Every ticket type
        types: Vec<TicketType>,
        /// Every ticket of the requested type
        tickets: Vec<Ticket>,
    },
    /// Global available list fetched
    AvailableFetched {
        /// Available tickets
        tickets: Vec<Ticket>,
    },
    /// A catalog fetch failed
    CatalogLoadFailed {
        /// Scope the failed load was for
        scope: CatalogScope,
        /// Failure cause
        error: ServiceError,
    },

    // Purchase form
    /// Visitor picked a ticket
    SelectTicket {
        /// Chosen ticket
        ticket_id: TicketId,
    },
    /// Visitor edited the phone number field
    PhoneNumberChanged {
        /// Raw field content
        value: String,
    },
    /// Visitor submitted the form
    SubmitPurchase,
    /// Ticket service accepted the purchase
    PurchaseSucceeded {
        /// Issued credentials
        result: PurchaseResult,
    },
    /// Ticket service rejected the purchase or could not be reached
    PurchaseFailed {
        /// Failure cause
        error: ServiceError,
    },

    // Credentials
    /// Copy one credential value
    CopyField {
        /// Field to copy
        field: CredentialField,
    },
    /// Copy username and password together
    CopyCredentials,
    /// A copy finished
    Copied {
        /// What was copied
        label: String,
    },
    /// Discard the result and start over
    Restart,

    // Shell
    /// The shell displayed every notice up to position `through`
    ///
    /// Positions count notices ever queued in the session, so acknowledging
    /// the same view twice drains nothing the second time.
    NoticesAcknowledged {
        /// Position just past the last notice shown
        through: u64,
    },
}

/// Dependencies injected into the portal reducers
#[derive(Clone)]
pub struct PortalEnvironment {
    /// Remote ticket/payment service
    pub service: Arc<dyn TicketService>,
    /// Destination of copy actions
    pub clipboard: Arc<dyn Clipboard>,
}

impl PortalEnvironment {
    /// Create an environment
    #[must_use]
    pub fn new(service: Arc<dyn TicketService>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self { service, clipboard }
    }
}

impl std::fmt::Debug for PortalEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalEnvironment").finish_non_exhaustive()
    }
}
