//! Serializable snapshots of portal state for the HTTP shell.

use crate::catalog::CatalogState;
use crate::state::PortalState;
use crate::types::{Credentials, Notice, Ticket, TicketId, TicketType, TicketTypeId, limit_label};
use serde::Serialize;

/// One selectable ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketView {
    /// Ticket identifier
    pub id: TicketId,
    /// Hotspot profile
    pub profile: String,
    /// Price in francs
    pub price: u64,
    /// Formatted price, e.g. `5 000 CDF`
    pub price_label: String,
    /// Time limit or `Unlimited`
    pub time_limit: String,
    /// Data limit or `Unlimited`
    pub data_limit: String,
    /// Whether this is the chosen ticket
    pub selected: bool,
}

impl TicketView {
    fn new(ticket: &Ticket, selected: Option<&TicketId>) -> Self {
        Self {
            id: ticket.id.clone(),
            profile: ticket.profile.clone(),
            price: ticket.price.francs(),
            price_label: ticket.price.to_string(),
            time_limit: limit_label(ticket.time_limit.as_deref()),
            data_limit: limit_label(ticket.data_limit.as_deref()),
            selected: selected == Some(&ticket.id),
        }
    }
}

/// A ticket type, as listed on the catalog page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketTypeView {
    /// Type identifier
    pub id: TicketTypeId,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Price in francs
    pub price: u64,
    /// Formatted price
    pub price_label: String,
    /// Time limit or `Unlimited`
    pub time_limit: String,
    /// Data limit or `Unlimited`
    pub data_limit: String,
    /// Tickets left
    pub available_count: u32,
}

impl From<&TicketType> for TicketTypeView {
    fn from(ticket_type: &TicketType) -> Self {
        Self {
            id: ticket_type.id.clone(),
            name: ticket_type.name.clone(),
            description: ticket_type.description.clone(),
            price: ticket_type.price.francs(),
            price_label: ticket_type.price.to_string(),
            time_limit: limit_label(ticket_type.time_limit.as_deref()),
            data_limit: limit_label(ticket_type.data_limit.as_deref()),
            available_count: ticket_type.available_count,
        }
    }
}

/// Catalog page entry linking into the purchase flow
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntryView {
    /// The ticket type
    #[serde(flatten)]
    pub ticket_type: TicketTypeView,
    /// Purchase flow address pre-scoped to this type
    pub purchase_path: String,
}

/// Revealed credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialsView {
    /// Hotspot username
    pub username: String,
    /// Hotspot password
    pub password: String,
    /// Hotspot profile
    pub profile: String,
    /// Usage instructions
    pub instructions: String,
}

impl From<&Credentials> for CredentialsView {
    fn from(credentials: &Credentials) -> Self {
        Self {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            profile: credentials.profile.clone(),
            instructions: credentials.instructions.clone(),
        }
    }
}

/// Full purchase page
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseView {
    /// `browsing`, `selected`, `submitting` or `succeeded`
    pub phase: &'static str,
    /// Whether the catalog is loading
    pub loading: bool,
    /// Resolved ticket type for type-scoped pages
    pub ticket_type: Option<TicketTypeView>,
    /// Selectable tickets
    pub tickets: Vec<TicketView>,
    /// Phone number field content
    pub phone_number: String,
    /// Whether the submit button is enabled
    pub can_submit: bool,
    /// Credentials, once purchased
    pub credentials: Option<CredentialsView>,
    /// Notices to display once
    pub notices: Vec<Notice>,
}

impl PurchaseView {
    /// Snapshot `state` for rendering
    #[must_use]
    pub fn from_state(state: &PortalState) -> Self {
        let CatalogState {
            loading,
            ticket_type,
            tickets,
            ..
        } = &state.catalog;
        let selected = state.phase.selected_ticket().map(|ticket| &ticket.id);

        Self {
            phase: state.phase.name(),
            loading: *loading,
            ticket_type: ticket_type.as_ref().map(TicketTypeView::from),
            tickets: tickets
                .iter()
                .map(|ticket| TicketView::new(ticket, selected))
                .collect(),
            phone_number: state.phase.phone_input().to_string(),
            can_submit: state.phase.can_submit(),
            credentials: state
                .phase
                .result()
                .map(|result| CredentialsView::from(&result.credentials)),
            notices: state.notices.clone(),
        }
    }
}
