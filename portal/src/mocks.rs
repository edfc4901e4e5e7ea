//! In-memory test doubles for the portal environment
//!
//! - [`InMemoryTicketService`]: inventory held in memory, sales mark tickets
//!   sold, failures can be scripted per operation
//! - [`RecordingClipboard`]: remembers every write
//! - [`fixtures`]: ready-made ticket types and tickets

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on poisoned locks

use crate::credentials::Clipboard;
use crate::error::ServiceError;
use crate::service::{ServiceFuture, TicketService};
use crate::state::PortalEnvironment;
use crate::types::{
    Credentials, PurchaseRequest, PurchaseResult, Ticket, TicketId, TicketStatus, TicketType,
    TicketTypeId,
};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

/// Ticket service operation, for scripting failures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `list_ticket_types`
    ListTicketTypes,
    /// `list_tickets_by_type`
    ListTicketsByType,
    /// `list_available_tickets`
    ListAvailableTickets,
    /// `purchase_ticket`
    PurchaseTicket,
}

/// Number of calls made to each operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceCalls {
    /// Calls to `list_ticket_types`
    pub list_ticket_types: usize,
    /// Calls to `list_tickets_by_type`
    pub list_tickets_by_type: usize,
    /// Calls to `list_available_tickets`
    pub list_available_tickets: usize,
    /// Calls to `purchase_ticket`
    pub purchase_ticket: usize,
}

impl ServiceCalls {
    /// Calls across every operation
    #[must_use]
    pub const fn total(&self) -> usize {
        self.list_ticket_types
            + self.list_tickets_by_type
            + self.list_available_tickets
            + self.purchase_ticket
    }
}

#[derive(Debug, Default)]
struct Inventory {
    types: Vec<TicketType>,
    tickets: Vec<Ticket>,
    failures: HashMap<Operation, ServiceError>,
    calls: ServiceCalls,
    requests: Vec<PurchaseRequest>,
    sold: usize,
}

/// In-memory ticket service
///
/// Clones share the same inventory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTicketService {
    inventory: Arc<RwLock<Inventory>>,
}

impl InMemoryTicketService {
    /// Create an empty service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ticket type
    #[must_use]
    pub fn with_type(self, ticket_type: TicketType) -> Self {
        self.inventory.write().unwrap().types.push(ticket_type);
        self
    }

    /// Add tickets
    #[must_use]
    pub fn with_tickets(self, tickets: impl IntoIterator<Item = Ticket>) -> Self {
        self.inventory.write().unwrap().tickets.extend(tickets);
        self
    }

    /// Make every call to `operation` fail with `error`
    pub fn fail(&self, operation: Operation, error: ServiceError) {
        self.inventory
            .write()
            .unwrap()
            .failures
            .insert(operation, error);
    }

    /// Remove every scripted failure
    pub fn clear_failures(&self) {
        self.inventory.write().unwrap().failures.clear();
    }

    /// Snapshot of call counts
    #[must_use]
    pub fn calls(&self) -> ServiceCalls {
        self.inventory.read().unwrap().calls
    }

    /// Every purchase request received, in order
    #[must_use]
    pub fn purchase_requests(&self) -> Vec<PurchaseRequest> {
        self.inventory.read().unwrap().requests.clone()
    }

    /// Every ticket of a type, whatever its status
    #[must_use]
    pub fn tickets_of(&self, type_id: &TicketTypeId) -> Vec<Ticket> {
        self.inventory
            .read()
            .unwrap()
            .tickets
            .iter()
            .filter(|ticket| ticket.type_id.as_ref() == Some(type_id))
            .cloned()
            .collect()
    }

    /// Current status of a ticket
    #[must_use]
    pub fn status_of(&self, ticket_id: &TicketId) -> Option<TicketStatus> {
        self.inventory
            .read()
            .unwrap()
            .tickets
            .iter()
            .find(|ticket| &ticket.id == ticket_id)
            .map(|ticket| ticket.status)
    }

    fn respond<T: Send + 'static>(
        &self,
        operation: Operation,
        f: impl FnOnce(&mut Inventory) -> Result<T, ServiceError>,
    ) -> ServiceFuture<'_, T> {
        let mut inventory = self.inventory.write().unwrap();

        let counter = match operation {
            Operation::ListTicketTypes => &mut inventory.calls.list_ticket_types,
            Operation::ListTicketsByType => &mut inventory.calls.list_tickets_by_type,
            Operation::ListAvailableTickets => &mut inventory.calls.list_available_tickets,
            Operation::PurchaseTicket => &mut inventory.calls.purchase_ticket,
        };
        *counter += 1;

        let failure = inventory.failures.get(&operation).cloned();
        let result = match failure {
            Some(error) => Err(error),
            None => f(&mut *inventory),
        };

        Box::pin(std::future::ready(result))
    }
}

fn sell(inventory: &mut Inventory, request: &PurchaseRequest) -> Result<PurchaseResult, ServiceError> {
    let Some(ticket) = inventory
        .tickets
        .iter_mut()
        .find(|ticket| ticket.id == request.ticket_id)
    else {
        return Err(ServiceError::Rejected {
            status: 404,
            message: Some("Ticket not found".to_string()),
        });
    };

    if ticket.status != TicketStatus::Available {
        return Err(ServiceError::Rejected {
            status: 409,
            message: Some("Ticket is no longer available".to_string()),
        });
    }

    ticket.status = TicketStatus::Sold;
    let profile = ticket.profile.clone();
    let type_id = ticket.type_id.clone();

    if let Some(ticket_type) = inventory
        .types
        .iter_mut()
        .find(|t| Some(&t.id) == type_id.as_ref())
    {
        ticket_type.available_count = ticket_type.available_count.saturating_sub(1);
    }

    inventory.sold += 1;
    let serial = inventory.sold;

    Ok(PurchaseResult {
        credentials: Credentials {
            username: format!("user-{serial:04}"),
            password: format!("pass-{serial:04}"),
            profile,
            instructions: "Connect to the Wi-Fi network and sign in with these credentials"
                .to_string(),
        },
    })
}

impl TicketService for InMemoryTicketService {
    fn list_ticket_types(&self) -> ServiceFuture<'_, Vec<TicketType>> {
        self.respond(Operation::ListTicketTypes, |inventory| {
            Ok(inventory.types.clone())
        })
    }

    fn list_tickets_by_type(&self, type_id: &TicketTypeId) -> ServiceFuture<'_, Vec<Ticket>> {
        self.respond(Operation::ListTicketsByType, |inventory| {
            Ok(inventory
                .tickets
                .iter()
                .filter(|ticket| ticket.type_id.as_ref() == Some(type_id))
                .cloned()
                .collect())
        })
    }

    fn list_available_tickets(&self) -> ServiceFuture<'_, Vec<Ticket>> {
        self.respond(Operation::ListAvailableTickets, |inventory| {
            Ok(inventory
                .tickets
                .iter()
                .filter(|ticket| ticket.is_available())
                .cloned()
                .collect())
        })
    }

    fn purchase_ticket(&self, request: PurchaseRequest) -> ServiceFuture<'_, PurchaseResult> {
        self.respond(Operation::PurchaseTicket, |inventory| {
            inventory.requests.push(request.clone());
            sell(inventory, &request)
        })
    }
}

/// Clipboard that records every write
#[derive(Clone, Debug, Default)]
pub struct RecordingClipboard {
    writes: Arc<RwLock<Vec<String>>>,
}

impl RecordingClipboard {
    /// Create an empty clipboard
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text written, oldest first
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes.read().unwrap().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn write(&self, text: String) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.writes.write().unwrap().push(text);
        Box::pin(std::future::ready(()))
    }
}

/// Environment backed by `service` and a fresh recording clipboard
#[must_use]
pub fn environment(
    service: &Arc<InMemoryTicketService>,
) -> (PortalEnvironment, Arc<RecordingClipboard>) {
    let clipboard = Arc::new(RecordingClipboard::new());
    let env = PortalEnvironment::new(
        Arc::clone(service) as Arc<dyn TicketService>,
        Arc::clone(&clipboard) as Arc<dyn Clipboard>,
    );
    (env, clipboard)
}

/// Ready-made catalog data
pub mod fixtures {
    use super::InMemoryTicketService;
    use crate::types::{Price, Ticket, TicketId, TicketStatus, TicketType, TicketTypeId};

    /// Active ticket type
    #[must_use]
    pub fn ticket_type(id: &str, price: u64, available_count: u32) -> TicketType {
        TicketType {
            id: TicketTypeId::new(id),
            name: format!("Pass {id}"),
            description: format!("Internet access ({id})"),
            price: Price::from_francs(price),
            time_limit: Some("7d".to_string()),
            data_limit: None,
            available_count,
            is_active: true,
        }
    }

    /// `count` available tickets of a type, ids `{type_id}-1`, `{type_id}-2`...
    #[must_use]
    pub fn tickets(type_id: &str, count: usize, price: u64) -> Vec<Ticket> {
        (1..=count)
            .map(|n| Ticket {
                id: TicketId::new(format!("{type_id}-{n}")),
                profile: type_id.to_string(),
                price: Price::from_francs(price),
                time_limit: Some("7d".to_string()),
                data_limit: None,
                status: TicketStatus::Available,
                type_id: Some(TicketTypeId::new(type_id)),
            })
            .collect()
    }

    /// One `weekly-5000` type with three available tickets at 5000 CDF
    #[must_use]
    pub fn weekly_service() -> InMemoryTicketService {
        InMemoryTicketService::new()
            .with_type(ticket_type("weekly-5000", 5000, 3))
            .with_tickets(tickets("weekly-5000", 3, 5000))
    }

    /// `weekly-5000` plus a sold-out daily type and an inactive monthly type
    #[must_use]
    pub fn campus_service() -> InMemoryTicketService {
        let mut monthly = ticket_type("monthly-15000", 15000, 4);
        monthly.is_active = false;

        let mut daily = tickets("daily-1000", 2, 1000);
        for ticket in &mut daily {
            ticket.status = TicketStatus::Sold;
        }

        weekly_service()
            .with_type(ticket_type("daily-1000", 1000, 0))
            .with_type(monthly)
            .with_tickets(daily)
            .with_tickets(tickets("monthly-15000", 4, 15000))
    }
}
