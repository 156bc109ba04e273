//! Synchronous API client core for the Zendesk Support API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `ZendeskClient` is stateless; it holds only its base URL, credential
//!   and user agent.
//! - Each endpoint is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - Request and response envelopes (`{"macro": ...}`, `{"result": ...}`)
//!   stay private; callers only see the DTOs in `types`.
//! - Macro application results encode `comment.public` as a string; the
//!   parse methods coerce it back to `bool`.

mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use auth::Credential;
pub use client::ZendeskClient;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    CustomField, ExternalIds, Macro, MacroAction, MacroListOptions, MacroSortBy, Message,
    MessageTo, Page, PageOptions, Participant, SideConversation, SortOrder, Ticket, TicketComment,
    TicketSideConversation,
};
