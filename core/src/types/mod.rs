//! Domain DTOs for the Zendesk Support API.
//!
//! # Design
//! Field names follow Zendesk's JSON exactly. Optional fields are skipped on
//! serialization so partial payloads (create, update) only send what the
//! caller set. The mock-server crate defines its own copies of the wire
//! shapes; integration tests catch any drift between the two.

mod de;
pub mod macros;
pub mod page;
pub mod side_conversation;
pub mod ticket;

pub use de::parse_bool;
pub(crate) use de::{bool_from_str, i64_from_str};
pub use macros::{Macro, MacroAction, MacroListOptions, MacroSortBy, SortOrder};
pub use page::{Page, PageOptions};
pub use side_conversation::{ExternalIds, Message, MessageTo, Participant, SideConversation};
pub use ticket::{CustomField, Ticket, TicketComment, TicketSideConversation};
