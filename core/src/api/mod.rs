//! Endpoint methods on `ZendeskClient`, grouped by resource.

mod macros;
mod side_conversations;
