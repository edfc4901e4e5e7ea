//! Domain types for the ticket portal.
//!
//! Ticket types and tickets are owned by the remote ticket service; the
//! portal only reads them. Purchase requests and results are transient values
//! that live for a single submission and a single credential reveal.

use crate::phone::PhoneNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a ticket type (offer category), e.g. `weekly-5000`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketTypeId(String);

impl TicketTypeId {
    /// Create a ticket type identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TicketTypeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for TicketTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one issuable ticket
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Create a ticket identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Value Objects
// ============================================================================

/// Price in whole Congolese francs (CDF has no minor unit in practice)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// ISO 4217 currency code every price is expressed in
    pub const CURRENCY: &'static str = "CDF";

    /// Create a price from a franc amount
    #[must_use]
    pub const fn from_francs(francs: u64) -> Self {
        Self(francs)
    }

    /// Amount in francs
    #[must_use]
    pub const fn francs(self) -> u64 {
        self.0
    }
}

/// Formats as `5 000 CDF` (digits grouped by three, no decimals)
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

        for (index, digit) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(digit);
        }

        write!(f, "{grouped} {}", Self::CURRENCY)
    }
}

/// Human label for an optional time or data limit
#[must_use]
pub fn limit_label(limit: Option<&str>) -> String {
    match limit {
        Some(limit) if !limit.trim().is_empty() => limit.to_string(),
        _ => "Unlimited".to_string(),
    }
}

/// Lifecycle of a ticket as reported by the ticket service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Can be sold
    Available,
    /// Held for a pending payment
    Reserved,
    /// Issued to a buyer
    Sold,
    /// No longer valid
    Expired,
}

// ============================================================================
// Catalog entities
// ============================================================================

/// A purchasable offer category (price, limits, remaining inventory)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    /// Type identifier
    pub id: TicketTypeId,
    /// Display name
    pub name: String,
    /// Display description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: Price,
    /// Optional time limit (e.g. `7d`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<String>,
    /// Optional data limit (e.g. `5GB`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_limit: Option<String>,
    /// Tickets of this type still available
    pub available_count: u32,
    /// Whether the type is offered at all
    pub is_active: bool,
}

impl TicketType {
    /// Whether visitors can buy tickets of this type right now
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        self.is_active && self.available_count > 0
    }
}

/// One concrete inventory unit belonging to a ticket type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Ticket identifier
    pub id: TicketId,
    /// Hotspot profile the credentials will be bound to
    pub profile: String,
    /// Price of this ticket
    pub price: Price,
    /// Optional time limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<String>,
    /// Optional data limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_limit: Option<String>,
    /// Current status
    pub status: TicketStatus,
    /// Owning ticket type, when the service reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<TicketTypeId>,
}

impl Ticket {
    /// Whether the ticket was observed as available
    ///
    /// Advisory only: the ticket service decides at purchase time.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == TicketStatus::Available
    }
}

// ============================================================================
// Purchase
// ============================================================================

/// Payment method for a purchase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Phone-number-linked mobile money
    #[serde(rename = "mobile_money")]
    MobileMoney,
}

/// Request sent to the ticket service for one submission attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Ticket to buy
    pub ticket_id: TicketId,
    /// Normalized mobile money number
    pub phone_number: PhoneNumber,
    /// Always mobile money
    pub method: PaymentMethod,
}

impl PurchaseRequest {
    /// Build a mobile money purchase request
    #[must_use]
    pub const fn mobile_money(ticket_id: TicketId, phone_number: PhoneNumber) -> Self {
        Self {
            ticket_id,
            phone_number,
            method: PaymentMethod::MobileMoney,
        }
    }
}

/// Network credentials issued for a sold ticket
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Hotspot username
    pub username: String,
    /// Hotspot password
    pub password: String,
    /// Hotspot profile
    pub profile: String,
    /// Usage instructions (may span several lines)
    #[serde(default)]
    pub instructions: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// Successful purchase outcome
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseResult {
    /// Issued credentials
    pub credentials: Credentials,
}

// ============================================================================
// Notices
// ============================================================================

/// Severity of a user-visible notice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Something completed
    Success,
    /// Something failed; the visitor can correct or retry
    Error,
}

/// Transient user-visible notification (toast)
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Message shown to the visitor
    pub message: String,
}

impl Notice {
    /// Success notice
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Error notice
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
