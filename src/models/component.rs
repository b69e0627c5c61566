//! Inspector data model: tree nodes, the selected component, and the rows of
//! the property panel.
//!
//! These are plain data. Turning them into host-specific tree widgets is the
//! host's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json::JsonType;

/// A component in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    /// The component's `id`, else its `type`.
    pub label: String,
    /// The component's own JSON subtree.
    pub properties: JsonType,
    /// Slash-delimited structural path from the document root,
    /// e.g. `mainTemplate/items/0/item`.
    pub path: String,
    pub has_children: bool,
}

/// The component currently shown in the property panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub properties: JsonType,
}

/// One row of the property panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyItem {
    pub name: String,
    /// Current value on the instance; `None` for schema-only properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Schema description, empty when the schema has none.
    pub description: String,
}

/// The single child line under a [`PropertyItem`] showing its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValueItem {
    pub label: String,
}
