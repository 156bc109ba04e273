//! Offset pagination shared by Zendesk list endpoints.

use serde::{Deserialize, Serialize};

/// Query parameters selecting a page of a list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Pagination links returned alongside a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub previous_page: Option<String>,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub count: i64,
}

impl Page {
    pub fn has_prev(&self) -> bool {
        self.previous_page.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}
