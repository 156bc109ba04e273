//! Side conversation endpoints.
//!
//! Zendesk reference: `ticketing/side_conversation/side_conversation`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{decode, ZendeskClient};
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Message, SideConversation};

#[derive(Serialize)]
struct CreateSideConversationRequest<'a> {
    message: &'a Message,
}

#[derive(Deserialize)]
struct SideConversationResponse {
    side_conversation: SideConversation,
}

impl ZendeskClient {
    /// `POST /tickets/{ticket_id}/side_conversations`
    pub fn build_create_side_conversation(
        &self,
        ticket_id: i64,
        message: &Message,
    ) -> Result<HttpRequest> {
        self.post(
            &format!("/tickets/{ticket_id}/side_conversations"),
            &CreateSideConversationRequest { message },
        )
    }

    pub fn parse_create_side_conversation(&self, response: HttpResponse) -> Result<SideConversation> {
        debug!(status = response.status, body = %response.body, "side conversation response");
        decode::<SideConversationResponse>(&response, 201).map(|r| r.side_conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::HttpMethod;
    use crate::types::MessageTo;

    fn client() -> ZendeskClient {
        ZendeskClient::new("https://acme.zendesk.com/api/v2")
    }

    #[test]
    fn build_create_side_conversation_wraps_message() {
        let message = Message::new("Parts order", "Please ship 2 fusers")
            .to(MessageTo::email("parts@example.com"));
        let req = client().build_create_side_conversation(42, &message).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.path,
            "https://acme.zendesk.com/api/v2/tickets/42/side_conversations"
        );
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["message"]["subject"], "Parts order");
        assert_eq!(body["message"]["to"][0]["email"], "parts@example.com");
        assert!(body["message"].get("html_body").is_none());
    }

    #[test]
    fn parse_create_side_conversation_success() {
        let response = HttpResponse {
            status: 201,
            headers: Vec::new(),
            body: r#"{"side_conversation":{"id":"abc-123","subject":"Parts order","state":"open","ticket_id":42}}"#
                .to_string(),
        };
        let sc = client().parse_create_side_conversation(response).unwrap();
        assert_eq!(sc.id.as_deref(), Some("abc-123"));
        assert_eq!(sc.ticket_id, Some(42));
    }

    #[test]
    fn parse_create_side_conversation_ticket_missing() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: r#"{"error":"RecordNotFound","description":"Not found"}"#.to_string(),
        };
        let err = client().parse_create_side_conversation(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
