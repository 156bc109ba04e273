//! Macros: saved sets of ticket actions an agent applies in one click.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de::string_or_seq;
use super::page::PageOptions;

/// A Zendesk macro.
///
/// `description` and `restriction` are free-form on the Zendesk side and are
/// kept as raw JSON (`null` when unset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macro {
    #[serde(default)]
    pub actions: Vec<MacroAction>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(default)]
    pub restriction: Value,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Macro {
    /// An active macro with the given title and actions, ready to create.
    pub fn new(title: impl Into<String>, actions: Vec<MacroAction>) -> Self {
        Macro {
            title: title.into(),
            actions,
            active: true,
            ..Macro::default()
        }
    }
}

/// One change a macro makes to a ticket, e.g. `status` -> `["solved"]`.
///
/// See Zendesk's "Actions reference" for the valid `field` names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroAction {
    pub field: String,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub value: Vec<String>,
}

impl MacroAction {
    pub fn new<I, S>(field: impl Into<String>, value: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MacroAction {
            field: field.into(),
            value: value.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroSortBy {
    CreatedAt,
    UpdatedAt,
    #[serde(rename = "usage_1h")]
    Usage1h,
    #[serde(rename = "usage_24h")]
    Usage24h,
    #[serde(rename = "usage_7d")]
    Usage7d,
    #[serde(rename = "usage_30d")]
    Usage30d,
    Alphabetical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filters for `GET /macros.json`. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroListOptions {
    /// `personal`, `agents`, `shared` or `account`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    /// Sideloads, e.g. `usage_7d`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_viewable: Option<bool>,
    #[serde(flatten)]
    pub page: PageOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<MacroSortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}
