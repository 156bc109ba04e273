use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: usize = 100;
pub const MAX_PER_PAGE: usize = 100;
pub const DEFAULT_TICKET_FORM_ID: i64 = 360000000001;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MockMacro {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub active: bool,
    pub actions: Vec<Action>,
    pub description: Value,
    pub restriction: Value,
    pub position: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
pub struct CreateMacro {
    pub title: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    pub active: Option<bool>,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub restriction: Value,
    pub position: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateMacro {
    pub title: Option<String>,
    pub actions: Option<Vec<Action>>,
    pub active: Option<bool>,
    pub description: Option<Value>,
    pub restriction: Option<Value>,
    pub position: Option<i32>,
}

#[derive(Deserialize)]
pub struct MacroEnvelope<T> {
    #[serde(rename = "macro")]
    pub inner: T,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub per_page: Option<usize>,
    pub page: Option<usize>,
    pub active: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recipient {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct NewMessage {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub html_body: Option<String>,
    #[serde(default)]
    pub to: Vec<Recipient>,
}

#[derive(Deserialize)]
pub struct MessageEnvelope {
    pub message: NewMessage,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MockSideConversation {
    pub id: Uuid,
    pub url: String,
    pub ticket_id: i64,
    pub subject: String,
    pub preview_text: String,
    pub state: String,
    pub participants: Vec<Recipient>,
    pub created_at: String,
    pub updated_at: String,
    pub message_added_at: String,
    pub state_updated_at: String,
}

#[derive(Default)]
pub struct Store {
    pub macros: HashMap<i64, MockMacro>,
    pub next_id: i64,
    pub side_conversations: HashMap<i64, Vec<MockSideConversation>>,
}

pub type Db = Arc<RwLock<Store>>;

type ApiError = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        next_id: 1,
        ..Store::default()
    }));
    Router::new()
        .route("/api/v2/macros.json", get(list_macros).post(create_macro))
        .route(
            "/api/v2/macros/{id}",
            get(get_macro).put(update_macro).delete(delete_macro),
        )
        .route("/api/v2/macros/{id}/apply.json", get(show_changes_to_ticket))
        .route(
            "/api/v2/tickets/{ticket_id}/macros/{macro_id}/apply",
            get(show_ticket_after_changes),
        )
        .route(
            "/api/v2/tickets/{ticket_id}/side_conversations",
            get(list_side_conversations).post(create_side_conversation),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "RecordNotFound", "description": "Not found"})),
    )
}

fn invalid(detail: &str) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "error": "RecordInvalid",
            "description": "Record validation errors",
            "details": {"base": [{"description": detail}]}
        })),
    )
}

/// `{id}.json` path segment.
fn parse_json_id(file: &str) -> Result<i64, ApiError> {
    file.strip_suffix(".json")
        .and_then(|id| id.parse().ok())
        .ok_or_else(not_found)
}

async fn list_macros(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Json<Value> {
    let store = db.read().await;
    let mut macros: Vec<&MockMacro> = store
        .macros
        .values()
        .filter(|m| query.active.map_or(true, |active| m.active == active))
        .collect();
    match query.sort_by.as_deref() {
        Some("alphabetical") => macros.sort_by(|a, b| a.title.cmp(&b.title)),
        Some("created_at") => macros.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))),
        Some("updated_at") => macros.sort_by(|a, b| a.updated_at.cmp(&b.updated_at).then(a.id.cmp(&b.id))),
        _ => macros.sort_by_key(|m| m.id),
    }
    if query.sort_order.as_deref() == Some("desc") {
        macros.reverse();
    }

    let count = macros.len();
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let page = query.page.unwrap_or(1).max(1);
    let items: Vec<&MockMacro> = macros
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    let base = format!("{}/api/v2/macros.json", origin(&headers));
    let next_page = (page.saturating_mul(per_page) < count)
        .then(|| format!("{base}?page={}&per_page={per_page}", page + 1));
    let previous_page =
        (page > 1).then(|| format!("{base}?page={}&per_page={per_page}", page - 1));

    Json(json!({
        "macros": items,
        "next_page": next_page,
        "previous_page": previous_page,
        "count": count,
    }))
}

async fn create_macro(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<MacroEnvelope<CreateMacro>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = input.inner;
    if input.title.trim().is_empty() {
        return Err(invalid("Title: cannot be blank"));
    }
    let mut store = db.write().await;
    let id = store.next_id;
    store.next_id += 1;
    let stamp = now();
    let created = MockMacro {
        id,
        url: format!("{}/api/v2/macros/{id}.json", origin(&headers)),
        title: input.title,
        active: input.active.unwrap_or(true),
        actions: input.actions,
        description: input.description,
        restriction: input.restriction,
        position: input.position.unwrap_or(10000),
        created_at: stamp.clone(),
        updated_at: stamp,
    };
    debug!(id, title = %created.title, "created macro");
    store.macros.insert(id, created.clone());
    Ok((StatusCode::CREATED, Json(json!({ "macro": created }))))
}

async fn get_macro(
    State(db): State<Db>,
    Path(file): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_json_id(&file)?;
    let store = db.read().await;
    let found = store.macros.get(&id).ok_or_else(not_found)?;
    Ok(Json(json!({ "macro": found })))
}

async fn update_macro(
    State(db): State<Db>,
    Path(file): Path<String>,
    Json(input): Json<MacroEnvelope<UpdateMacro>>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_json_id(&file)?;
    let input = input.inner;
    let mut store = db.write().await;
    let existing = store.macros.get_mut(&id).ok_or_else(not_found)?;
    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return Err(invalid("Title: cannot be blank"));
        }
        existing.title = title;
    }
    if let Some(actions) = input.actions {
        existing.actions = actions;
    }
    if let Some(active) = input.active {
        existing.active = active;
    }
    if let Some(description) = input.description {
        existing.description = description;
    }
    if let Some(restriction) = input.restriction {
        existing.restriction = restriction;
    }
    if let Some(position) = input.position {
        existing.position = position;
    }
    existing.updated_at = now();
    Ok(Json(json!({ "macro": existing })))
}

async fn delete_macro(
    State(db): State<Db>,
    Path(file): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_json_id(&file)?;
    let mut store = db.write().await;
    store
        .macros
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}

/// Ticket fields a macro touches, as the apply endpoints report them.
#[derive(Debug, Default, PartialEq)]
pub struct AppliedTicket {
    pub ticket_form_id: i64,
    pub subject: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub comment_body: String,
    pub comment_public: bool,
    pub follower_ids: Vec<i64>,
    pub custom_fields: Vec<(i64, Value)>,
    pub side_conversation: Option<[String; 4]>,
}

fn strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(strings).collect(),
        Value::String(s) => vec![s.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

fn first_string(value: &Value) -> Option<String> {
    strings(value).into_iter().next()
}

/// Replay macro actions onto a blank ticket.
pub fn apply_actions(actions: &[Action]) -> AppliedTicket {
    let mut ticket = AppliedTicket {
        ticket_form_id: DEFAULT_TICKET_FORM_ID,
        comment_public: true,
        ..AppliedTicket::default()
    };
    for action in actions {
        let field = action.field.as_str();
        match field {
            "status" => ticket.status = first_string(&action.value),
            "subject" => ticket.subject = first_string(&action.value),
            "set_tags" => {
                ticket.tags = strings(&action.value)
                    .iter()
                    .flat_map(|s| s.split_whitespace().map(str::to_string))
                    .collect();
            }
            "current_tags" => ticket.tags.extend(
                strings(&action.value)
                    .iter()
                    .flat_map(|s| s.split_whitespace().map(str::to_string)),
            ),
            "comment_value" | "comment_value_html" => {
                ticket.comment_body = first_string(&action.value).unwrap_or_default();
            }
            "comment_mode_is_public" => {
                ticket.comment_public = first_string(&action.value).as_deref() != Some("false");
            }
            "ticket_form_id" => {
                if let Some(id) = first_string(&action.value).and_then(|s| s.parse().ok()) {
                    ticket.ticket_form_id = id;
                }
            }
            "follower" => {
                ticket
                    .follower_ids
                    .extend(strings(&action.value).iter().filter_map(|s| s.parse::<i64>().ok()));
            }
            "side_conversation" => {
                let mut parts = strings(&action.value).into_iter();
                ticket.side_conversation = Some([
                    parts.next().unwrap_or_default(),
                    parts.next().unwrap_or_default(),
                    parts.next().unwrap_or_default(),
                    parts.next().unwrap_or_else(|| "text/html".to_string()),
                ]);
            }
            _ => {
                if let Some(id) = field
                    .strip_prefix("custom_fields_")
                    .and_then(|id| id.parse().ok())
                {
                    ticket.custom_fields.push((id, action.value.clone()));
                }
            }
        }
    }
    ticket
}

async fn show_changes_to_ticket(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let found = store.macros.get(&id).ok_or_else(not_found)?;
    let applied = apply_actions(&found.actions);

    // Zendesk sends the form id and comment visibility as strings here.
    let mut ticket = json!({
        "ticket_form_id": applied.ticket_form_id.to_string(),
        "tags": applied.tags,
        "comment": {
            "body": applied.comment_body,
            "public": applied.comment_public.to_string(),
        },
        "collaborator_ids": [],
        "follower_ids": applied.follower_ids,
    });
    if let Some(subject) = applied.subject {
        ticket["subject"] = json!(subject);
    }
    if let Some(status) = applied.status {
        ticket["status"] = json!(status);
    }
    if let Some([subject, message, recipients, context_type]) = applied.side_conversation {
        ticket["side_conversation"] = json!({
            "subject": subject,
            "message": message,
            "recipients": recipients,
            "context_type": context_type,
        });
    }
    Ok(Json(json!({ "result": { "ticket": ticket } })))
}

async fn show_ticket_after_changes(
    State(db): State<Db>,
    Path((ticket_id, macro_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let found = store.macros.get(&macro_id).ok_or_else(not_found)?;
    let applied = apply_actions(&found.actions);

    let custom_fields: Vec<Value> = applied
        .custom_fields
        .into_iter()
        .map(|(id, value)| json!({"id": id, "value": value}))
        .collect();
    Ok(Json(json!({
        "result": {
            "ticket": {
                "id": ticket_id,
                "ticket_form_id": applied.ticket_form_id,
                "subject": applied.subject.unwrap_or_else(|| format!("Ticket {ticket_id}")),
                "status": applied.status.unwrap_or_else(|| "open".to_string()),
                "tags": applied.tags,
                "comment": {
                    "body": applied.comment_body,
                    "public": applied.comment_public.to_string(),
                },
                "collaborator_ids": [],
                "follower_ids": applied.follower_ids,
                "custom_fields": custom_fields,
            }
        }
    })))
}

async fn list_side_conversations(
    State(db): State<Db>,
    Path(ticket_id): Path<i64>,
) -> Json<Value> {
    let store = db.read().await;
    let items = store
        .side_conversations
        .get(&ticket_id)
        .map(Vec::as_slice)
        .unwrap_or_default();
    Json(json!({
        "side_conversations": items,
        "next_page": null,
        "previous_page": null,
        "count": items.len(),
    }))
}

async fn create_side_conversation(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(ticket_id): Path<i64>,
    Json(input): Json<MessageEnvelope>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let message = input.message;
    if message.to.is_empty() {
        return Err(invalid("Message: at least one recipient is required"));
    }
    let text = message.body.or(message.html_body).unwrap_or_default();
    let id = Uuid::new_v4();
    let stamp = now();
    let created = MockSideConversation {
        id,
        url: format!(
            "{}/api/v2/tickets/{ticket_id}/side_conversations/{id}",
            origin(&headers)
        ),
        ticket_id,
        subject: message.subject.unwrap_or_default(),
        preview_text: text.chars().take(100).collect(),
        state: "open".to_string(),
        participants: message.to,
        created_at: stamp.clone(),
        updated_at: stamp.clone(),
        message_added_at: stamp.clone(),
        state_updated_at: stamp,
    };
    db.write()
        .await
        .side_conversations
        .entry(ticket_id)
        .or_default()
        .push(created.clone());
    Ok((
        StatusCode::CREATED,
        Json(json!({ "side_conversation": created })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(field: &str, value: Value) -> Action {
        Action {
            field: field.to_string(),
            value,
        }
    }

    #[test]
    fn apply_defaults_to_public_comment() {
        let applied = apply_actions(&[]);
        assert!(applied.comment_public);
        assert_eq!(applied.ticket_form_id, DEFAULT_TICKET_FORM_ID);
        assert!(applied.tags.is_empty());
    }

    #[test]
    fn apply_reads_common_actions() {
        let applied = apply_actions(&[
            action("status", json!("solved")),
            action("set_tags", json!("refund vip")),
            action("comment_value", json!("Done!")),
            action("comment_mode_is_public", json!("false")),
            action("ticket_form_id", json!("42")),
            action("follower", json!(["7", "8"])),
            action("custom_fields_99", json!("blue")),
        ]);
        assert_eq!(applied.status.as_deref(), Some("solved"));
        assert_eq!(applied.tags, vec!["refund", "vip"]);
        assert_eq!(applied.comment_body, "Done!");
        assert!(!applied.comment_public);
        assert_eq!(applied.ticket_form_id, 42);
        assert_eq!(applied.follower_ids, vec![7, 8]);
        assert_eq!(applied.custom_fields, vec![(99, json!("blue"))]);
    }

    #[test]
    fn apply_side_conversation_action() {
        let applied = apply_actions(&[action(
            "side_conversation",
            json!(["Ask vendor", "Hello", "v@example.com"]),
        )]);
        let [subject, _, recipients, context_type] = applied.side_conversation.unwrap();
        assert_eq!(subject, "Ask vendor");
        assert_eq!(recipients, "v@example.com");
        assert_eq!(context_type, "text/html");
    }

    #[test]
    fn json_id_segment() {
        assert_eq!(parse_json_id("12.json").unwrap(), 12);
        assert!(parse_json_id("12").is_err());
        assert!(parse_json_id("abc.json").is_err());
    }

    #[test]
    fn create_macro_input_requires_title() {
        let result: Result<MacroEnvelope<CreateMacro>, _> =
            serde_json::from_str(r#"{"macro":{"actions":[]}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_macro_all_fields_optional() {
        let input: MacroEnvelope<UpdateMacro> = serde_json::from_str(r#"{"macro":{}}"#).unwrap();
        assert!(input.inner.title.is_none());
        assert!(input.inner.actions.is_none());
    }
}
