//! Ticket/payment service boundary.
//!
//! The remote service owns inventory, payment processing and credential
//! generation. The portal talks to it only through [`TicketService`], so
//! reducers can be tested against the in-memory implementation in
//! `mocks` (behind the `test-utils` feature).

use crate::error::ServiceError;
use crate::types::{PurchaseRequest, PurchaseResult, Ticket, TicketType, TicketTypeId};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use url::Url;

/// Ticket service result
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Boxed future returned by [`TicketService`] methods
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = ServiceResult<T>> + Send + 'a>>;

/// Request/response contract of the remote ticket service
pub trait TicketService: Send + Sync {
    /// List every ticket type
    fn list_ticket_types(&self) -> ServiceFuture<'_, Vec<TicketType>>;

    /// List every ticket of one type, whatever its status
    fn list_tickets_by_type(&self, type_id: &TicketTypeId) -> ServiceFuture<'_, Vec<Ticket>>;

    /// List tickets currently available for sale
    fn list_available_tickets(&self) -> ServiceFuture<'_, Vec<Ticket>>;

    /// Buy one ticket
    ///
    /// The service decides whether the ticket can still be sold; a rejection
    /// carries a human-readable message.
    fn purchase_ticket(&self, request: PurchaseRequest) -> ServiceFuture<'_, PurchaseResult>;
}

/// Error body returned by the ticket service on non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// [`TicketService`] backed by the ticket service's JSON HTTP API
#[derive(Clone, Debug)]
pub struct HttpTicketService {
    client: Client,
    base_url: Url,
}

impl HttpTicketService {
    /// Create a client for the API rooted at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if `base_url` cannot carry a path.
    pub fn new(base_url: Url) -> ServiceResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest` client
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if `base_url` cannot carry a path.
    pub fn with_client(client: Client, base_url: Url) -> ServiceResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::Transport(format!(
                "ticket service URL cannot be a base: {base_url}"
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Root of the ticket service API
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ServiceResult<T> {
        let url = self.endpoint(segments);
        tracing::debug!(%url, "Calling ticket service");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
    let status = response.status();

    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %body, "Ticket service returned an error");

    Err(ServiceError::Rejected {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message.or(body.error))
}

impl TicketService for HttpTicketService {
    fn list_ticket_types(&self) -> ServiceFuture<'_, Vec<TicketType>> {
        Box::pin(self.get(&["tickets", "types"]))
    }

    fn list_tickets_by_type(&self, type_id: &TicketTypeId) -> ServiceFuture<'_, Vec<Ticket>> {
        let type_id = type_id.as_str().to_string();
        Box::pin(async move { self.get(&["tickets", "types", &type_id, "tickets"]).await })
    }

    fn list_available_tickets(&self) -> ServiceFuture<'_, Vec<Ticket>> {
        Box::pin(self.get(&["tickets", "available"]))
    }

    fn purchase_ticket(&self, request: PurchaseRequest) -> ServiceFuture<'_, PurchaseResult> {
        Box::pin(async move {
            let url = self.endpoint(&["tickets", "purchase"]);
            tracing::info!(ticket_id = %request.ticket_id, "Submitting purchase");

            let response = self
                .client
                .post(url)
                .json(&request)
                .send()
                .await
                .map_err(|e| ServiceError::Transport(e.to_string()))?;

            decode(response).await
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::phone::PhoneNumber;
    use crate::types::{Price, TicketId, TicketStatus};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_for(server: &MockServer) -> HttpTicketService {
        let base = Url::parse(&format!("{}/api/", server.uri())).unwrap();
        HttpTicketService::new(base).unwrap()
    }

    #[test]
    fn test_endpoint_escapes_identifiers() {
        let service =
            HttpTicketService::new(Url::parse("http://tickets.local/api").unwrap()).unwrap();

        let url = service.endpoint(&["tickets", "types", "a b/c", "tickets"]);

        assert_eq!(
            url.as_str(),
            "http://tickets.local/api/tickets/types/a%20b%2Fc/tickets"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let url = Url::parse("mailto:tickets@example.org").unwrap();
        assert!(matches!(
            HttpTicketService::new(url),
            Err(ServiceError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_lists_tickets_of_a_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tickets/types/weekly-5000/tickets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "t-1", "profile": "weekly", "price": 5000, "timeLimit": "7d", "status": "available"},
                {"id": "t-2", "profile": "weekly", "price": 5000, "status": "sold"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let tickets = service
            .list_tickets_by_type(&TicketTypeId::from("weekly-5000"))
            .await
            .unwrap();

        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].price, Price::from_francs(5000));
        assert_eq!(tickets[1].status, TicketStatus::Sold);
    }

    #[tokio::test]
    async fn test_purchase_sends_camel_case_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tickets/purchase"))
            .and(body_json(json!({
                "ticketId": "t-1",
                "phoneNumber": "0900000000",
                "method": "mobile_money"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "credentials": {
                    "username": "u-481",
                    "password": "p-992",
                    "profile": "weekly",
                    "instructions": "Connect to the Wi-Fi and sign in"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let request = PurchaseRequest::mobile_money(
            TicketId::from("t-1"),
            PhoneNumber::parse("0900 000 000").unwrap(),
        );

        let result = service.purchase_ticket(request).await.unwrap();

        assert_eq!(result.credentials.username, "u-481");
        assert_eq!(result.credentials.password, "p-992");
    }

    #[tokio::test]
    async fn test_rejection_carries_service_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tickets/purchase"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "Ticket already sold"})),
            )
            .mount(&server)
            .await;

        let service = service_for(&server).await;
        let request = PurchaseRequest::mobile_money(
            TicketId::from("t-1"),
            PhoneNumber::parse("0900000000").unwrap(),
        );

        let err = service.purchase_ticket(request).await.unwrap_err();

        assert_eq!(
            err,
            ServiceError::Rejected {
                status: 409,
                message: Some("Ticket already sold".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_error_field_and_plain_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tickets/types"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "Maintenance"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/tickets/available"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let service = service_for(&server).await;

        let types_err = service.list_ticket_types().await.unwrap_err();
        assert_eq!(types_err.user_message(), "Maintenance");

        let available_err = service.list_available_tickets().await.unwrap_err();
        assert_eq!(
            available_err,
            ServiceError::Rejected {
                status: 500,
                message: None,
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tickets/available"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;

        let service = service_for(&server).await;

        assert!(matches!(
            service.list_available_tickets().await,
            Err(ServiceError::Decode(_))
        ));
    }
}
