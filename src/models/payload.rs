//! APL payload and package-import data model.
//!
//! [`AplPayload`] is the on-disk shape of a previewed file:
//!
//! ```json
//! { "document": { ... }, "datasources": { ... } }
//! ```
//!
//! [`PackageImport`] mirrors one entry of `document.import`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json::JsonType;

/// An APL document together with the datasources bound into it.
///
/// Handed between components by value; nothing holds a shared mutable
/// reference to a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AplPayload {
    /// The APL document (`type`, `version`, `import`, `layouts`, `mainTemplate`, ...).
    pub document: JsonType,
    /// Data bound into `mainTemplate.parameters` at render time.
    #[serde(default)]
    pub datasources: JsonType,
}

impl AplPayload {
    /// Parse the full source text of a previewed file.
    pub fn from_source_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The document's `mainTemplate`, when it is an object.
    pub fn main_template(&self) -> Option<&JsonType> {
        self.document.get("mainTemplate").and_then(Value::as_object)
    }
}

/// Where a package import points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// A relative (or absolute) file-system path next to the document.
    Local(String),
    /// An `http://` or `https://` URL the renderer resolves itself.
    Remote(String),
    /// No `source`, or an empty one: a named package from the public catalog.
    Unspecified,
}

/// One entry of `document.import`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageImport {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Why a `document.import` value was not accepted as a package list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportListError {
    #[error("import is not an array")]
    NotAnArray,
    #[error("import entry {index} has no name or version")]
    InvalidEntry { index: usize },
}

impl PackageImport {
    /// Validate a raw `document.import` value.
    ///
    /// Every entry must be an object with a non-empty string `name` and
    /// `version`. A string `source` is picked up when present; any other
    /// members are ignored here (callers keep the raw entry for verbatim
    /// copies).
    pub fn parse_list(value: &Value) -> Result<Vec<Self>, ImportListError> {
        let entries = value.as_array().ok_or(ImportListError::NotAnArray)?;
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Self::from_entry(entry).ok_or(ImportListError::InvalidEntry { index })
            })
            .collect()
    }

    fn from_entry(entry: &Value) -> Option<Self> {
        let non_empty = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            name: non_empty("name")?,
            version: non_empty("version")?,
            source: entry.get("source").and_then(Value::as_str).map(str::to_string),
        })
    }

    /// Classify this import by its `source`.
    pub fn classify(&self) -> PackageSource {
        match self.source.as_deref() {
            None | Some("") => PackageSource::Unspecified,
            Some(src) if src.starts_with("http://") || src.starts_with("https://") => {
                PackageSource::Remote(src.to_string())
            }
            Some(src) => PackageSource::Local(src.to_string()),
        }
    }
}
