//! Macro endpoints.
//!
//! Zendesk reference: `ticketing/business-rules/macros`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{check_status, decode, ZendeskClient};
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{
    bool_from_str, i64_from_str, CustomField, Macro, MacroListOptions, Page, Ticket, TicketComment,
    TicketSideConversation,
};

#[derive(Serialize)]
struct MacroRequest<'a> {
    r#macro: &'a Macro,
}

#[derive(Deserialize)]
struct MacroResponse {
    r#macro: Macro,
}

#[derive(Deserialize)]
struct MacroListResponse {
    #[serde(default)]
    macros: Vec<Macro>,
    #[serde(flatten)]
    page: Page,
}

#[derive(Deserialize)]
struct ApplyResponse<T> {
    result: ApplyResult<T>,
}

#[derive(Deserialize)]
struct ApplyResult<T> {
    ticket: T,
}

/// `comment.public` is a string in macro application results.
#[derive(Deserialize)]
struct AppliedComment {
    #[serde(default)]
    body: Option<String>,
    #[serde(deserialize_with = "bool_from_str")]
    public: bool,
}

impl From<AppliedComment> for TicketComment {
    fn from(comment: AppliedComment) -> Self {
        TicketComment {
            body: comment.body,
            public: Some(comment.public),
            ..TicketComment::default()
        }
    }
}

/// Ticket shape of `GET /macros/{id}/apply.json`, where `ticket_form_id`
/// is also a string.
#[derive(Deserialize)]
struct TicketChanges {
    #[serde(deserialize_with = "i64_from_str")]
    ticket_form_id: i64,
    #[serde(default)]
    side_conversation: Option<TicketSideConversation>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    comment: AppliedComment,
    #[serde(default)]
    collaborator_ids: Vec<i64>,
    #[serde(default)]
    follower_ids: Vec<i64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    custom_fields: Vec<CustomField>,
}

impl From<TicketChanges> for Ticket {
    fn from(t: TicketChanges) -> Self {
        Ticket {
            ticket_form_id: Some(t.ticket_form_id),
            side_conversation: t.side_conversation,
            subject: t.subject,
            tags: t.tags,
            comment: Some(t.comment.into()),
            collaborator_ids: t.collaborator_ids,
            follower_ids: t.follower_ids,
            status: t.status,
            custom_fields: t.custom_fields,
            ..Ticket::default()
        }
    }
}

/// Ticket shape of `GET /tickets/{id}/macros/{id}/apply`.
#[derive(Deserialize)]
struct TicketAfterChanges {
    #[serde(default)]
    ticket_form_id: Option<i64>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    comment: AppliedComment,
    #[serde(default)]
    collaborator_ids: Vec<i64>,
    #[serde(default)]
    follower_ids: Vec<i64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    custom_fields: Vec<CustomField>,
}

impl From<TicketAfterChanges> for Ticket {
    fn from(t: TicketAfterChanges) -> Self {
        Ticket {
            ticket_form_id: t.ticket_form_id,
            subject: t.subject,
            tags: t.tags,
            comment: Some(t.comment.into()),
            collaborator_ids: t.collaborator_ids,
            follower_ids: t.follower_ids,
            status: t.status,
            custom_fields: t.custom_fields,
            ..Ticket::default()
        }
    }
}

impl ZendeskClient {
    /// `GET /macros.json`. `None` lists with default options.
    pub fn build_get_macros(&self, opts: Option<&MacroListOptions>) -> Result<HttpRequest> {
        let query = match opts {
            Some(opts) => serde_urlencoded::to_string(opts)?,
            None => String::new(),
        };
        if query.is_empty() {
            Ok(self.get("/macros.json"))
        } else {
            Ok(self.get(&format!("/macros.json?{query}")))
        }
    }

    pub fn parse_get_macros(&self, response: HttpResponse) -> Result<(Vec<Macro>, Page)> {
        let list: MacroListResponse = decode(&response, 200)?;
        debug!(count = list.macros.len(), has_next = list.page.has_next(), "listed macros");
        Ok((list.macros, list.page))
    }

    /// `GET /macros/{id}.json`
    pub fn build_get_macro(&self, macro_id: i64) -> HttpRequest {
        self.get(&format!("/macros/{macro_id}.json"))
    }

    pub fn parse_get_macro(&self, response: HttpResponse) -> Result<Macro> {
        decode::<MacroResponse>(&response, 200).map(|r| r.r#macro)
    }

    /// `POST /macros.json`
    pub fn build_create_macro(&self, r#macro: &Macro) -> Result<HttpRequest> {
        self.post("/macros.json", &MacroRequest { r#macro })
    }

    pub fn parse_create_macro(&self, response: HttpResponse) -> Result<Macro> {
        decode::<MacroResponse>(&response, 201).map(|r| r.r#macro)
    }

    /// `PUT /macros/{id}.json`
    pub fn build_update_macro(&self, macro_id: i64, r#macro: &Macro) -> Result<HttpRequest> {
        self.put(&format!("/macros/{macro_id}.json"), &MacroRequest { r#macro })
    }

    pub fn parse_update_macro(&self, response: HttpResponse) -> Result<Macro> {
        decode::<MacroResponse>(&response, 200).map(|r| r.r#macro)
    }

    /// `DELETE /macros/{id}.json`
    pub fn build_delete_macro(&self, macro_id: i64) -> HttpRequest {
        self.delete(&format!("/macros/{macro_id}.json"))
    }

    pub fn parse_delete_macro(&self, response: HttpResponse) -> Result<()> {
        check_status(&response, 204)
    }

    /// `GET /macros/{id}/apply.json`: the changes the macro would make to a
    /// ticket. Nothing is modified server-side; the result can be fed into a
    /// ticket update.
    pub fn build_show_changes_to_ticket(&self, macro_id: i64) -> HttpRequest {
        self.get(&format!("/macros/{macro_id}/apply.json"))
    }

    pub fn parse_show_changes_to_ticket(&self, response: HttpResponse) -> Result<Ticket> {
        decode::<ApplyResponse<TicketChanges>>(&response, 200).map(|r| r.result.ticket.into())
    }

    /// `GET /tickets/{ticket_id}/macros/{macro_id}/apply`: the full ticket as
    /// it would look after applying the macro. Nothing is modified.
    pub fn build_show_ticket_after_changes(&self, ticket_id: i64, macro_id: i64) -> HttpRequest {
        self.get(&format!("/tickets/{ticket_id}/macros/{macro_id}/apply"))
    }

    pub fn parse_show_ticket_after_changes(&self, response: HttpResponse) -> Result<Ticket> {
        decode::<ApplyResponse<TicketAfterChanges>>(&response, 200).map(|r| r.result.ticket.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::HttpMethod;
    use crate::types::{MacroAction, MacroSortBy, PageOptions};

    const BASE: &str = "http://localhost:3000/api/v2";

    fn client() -> ZendeskClient {
        ZendeskClient::new(BASE)
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_get_macros_without_options() {
        let req = client().build_get_macros(None).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, format!("{BASE}/macros.json"));
        assert!(req.body.is_none());

        let req = client()
            .build_get_macros(Some(&MacroListOptions::default()))
            .unwrap();
        assert_eq!(req.path, format!("{BASE}/macros.json"));
    }

    #[test]
    fn build_get_macros_with_options() {
        let opts = MacroListOptions {
            access: Some("shared".to_string()),
            page: PageOptions {
                per_page: Some(10),
                page: None,
            },
            sort_by: Some(MacroSortBy::Alphabetical),
            ..MacroListOptions::default()
        };
        let req = client().build_get_macros(Some(&opts)).unwrap();
        assert_eq!(
            req.path,
            format!("{BASE}/macros.json?access=shared&per_page=10&sort_by=alphabetical")
        );
    }

    #[test]
    fn parse_get_macros_returns_page() {
        let body = r#"{
            "macros": [{"id": 1, "title": "A", "active": true, "actions": []}],
            "next_page": "http://localhost:3000/api/v2/macros.json?page=2",
            "previous_page": null,
            "count": 2
        }"#;
        let (macros, page) = client().parse_get_macros(ok(body)).unwrap();
        assert_eq!(macros.len(), 1);
        assert_eq!(macros[0].title, "A");
        assert!(page.has_next());
        assert!(!page.has_prev());
        assert_eq!(page.count, 2);
    }

    #[test]
    fn build_create_macro_wraps_envelope() {
        let m = Macro::new("Close", vec![MacroAction::new("status", ["solved"])]);
        let req = client().build_create_macro(&m).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, format!("{BASE}/macros.json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["macro"]["title"], "Close");
        assert_eq!(body["macro"]["actions"][0]["field"], "status");
    }

    #[test]
    fn build_update_and_delete_paths() {
        let m = Macro::new("Renamed", Vec::new());
        let req = client().build_update_macro(360, &m).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, format!("{BASE}/macros/360.json"));

        let req = client().build_delete_macro(360);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, format!("{BASE}/macros/360.json"));
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_get_macro_unwraps_envelope() {
        let m = client()
            .parse_get_macro(ok(r#"{"macro":{"id":5,"title":"T","active":false,"actions":[]}}"#))
            .unwrap();
        assert_eq!(m.id, Some(5));
        assert!(!m.active);
    }

    #[test]
    fn parse_delete_macro_accepts_no_content() {
        let response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(client().parse_delete_macro(response).is_ok());
    }

    #[test]
    fn apply_paths() {
        assert_eq!(
            client().build_show_changes_to_ticket(9).path,
            format!("{BASE}/macros/9/apply.json")
        );
        assert_eq!(
            client().build_show_ticket_after_changes(35436, 9).path,
            format!("{BASE}/tickets/35436/macros/9/apply")
        );
    }

    #[test]
    fn show_changes_coerces_string_fields() {
        let body = r#"{"result":{"ticket":{
            "ticket_form_id": "360000123",
            "side_conversation": {"subject": "Ask vendor", "message": "Hi", "recipients": "v@example.com", "context_type": "email"},
            "subject": "Refund",
            "tags": ["refund"],
            "comment": {"body": "We refunded you", "public": "true"},
            "collaborator_ids": [1],
            "follower_ids": [2],
            "status": "solved"
        }}}"#;
        let ticket = client().parse_show_changes_to_ticket(ok(body)).unwrap();
        assert_eq!(ticket.ticket_form_id, Some(360000123));
        assert_eq!(ticket.comment.as_ref().unwrap().public, Some(true));
        assert_eq!(ticket.comment.unwrap().body.as_deref(), Some("We refunded you"));
        assert_eq!(ticket.side_conversation.unwrap().context_type, "email");
        assert_eq!(ticket.status.as_deref(), Some("solved"));
        assert_eq!(ticket.collaborator_ids, vec![1]);
        assert_eq!(ticket.follower_ids, vec![2]);
    }

    #[test]
    fn show_changes_rejects_non_numeric_form_id() {
        let body = r#"{"result":{"ticket":{"ticket_form_id":"abc","comment":{"public":"true"}}}}"#;
        let err = client().parse_show_changes_to_ticket(ok(body)).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn show_after_changes_private_comment() {
        let body = r#"{"result":{"ticket":{
            "ticket_form_id": 77,
            "subject": "Printer",
            "comment": {"body": "internal note", "public": "false"},
            "custom_fields": [{"id": 11, "value": "hw"}],
            "status": "pending"
        }}}"#;
        let ticket = client().parse_show_ticket_after_changes(ok(body)).unwrap();
        assert_eq!(ticket.ticket_form_id, Some(77));
        assert_eq!(ticket.comment.unwrap().public, Some(false));
        assert_eq!(ticket.custom_fields[0].id, 11);
        assert_eq!(ticket.custom_fields[0].value, "hw");
    }

    #[test]
    fn show_after_changes_invalid_public_is_error() {
        let body = r#"{"result":{"ticket":{"ticket_form_id":1,"comment":{"body":"x","public":"maybe"}}}}"#;
        let err = client().parse_show_ticket_after_changes(ok(body)).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn missing_public_is_error() {
        let body = r#"{"result":{"ticket":{"ticket_form_id":1,"comment":{"body":"x"}}}}"#;
        assert!(client().parse_show_ticket_after_changes(ok(body)).is_err());
        let body = r#"{"result":{"ticket":{"ticket_form_id":1}}}"#;
        assert!(client().parse_show_ticket_after_changes(ok(body)).is_err());
    }
}
