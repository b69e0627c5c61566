//! Component schema lookup.
//!
//! The property panel asks a [`SchemaLookup`] which properties a component
//! type declares so that properties not yet set on an instance can still be
//! discovered. Lookups take the whole payload because custom layouts declared
//! in `document.layouts` are components too.

pub mod builtin;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::AplPayload;

pub use builtin::BuiltinSchemaCatalog;

/// Schema of one property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(default)]
    pub description: String,
    /// Allowed values, when the property is an enumeration.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// Declared properties of a component type, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSchema {
    pub properties: BTreeMap<String, PropertySchema>,
}

/// Resolves component schemas for a payload.
///
/// Asynchronous so that implementations may consult remote package catalogs.
pub trait SchemaLookup: Send + Sync {
    /// Schema for `component_type`, or `None` if the type is unknown.
    fn component_schema(
        &self,
        payload: &AplPayload,
        component_type: &str,
    ) -> impl Future<Output = Option<ComponentSchema>> + Send;

    /// Every component type usable in `payload`.
    fn available_components(&self, payload: &AplPayload) -> impl Future<Output = Vec<String>> + Send;
}

impl<T: SchemaLookup> SchemaLookup for Arc<T> {
    fn component_schema(
        &self,
        payload: &AplPayload,
        component_type: &str,
    ) -> impl Future<Output = Option<ComponentSchema>> + Send {
        (**self).component_schema(payload, component_type)
    }

    fn available_components(&self, payload: &AplPayload) -> impl Future<Output = Vec<String>> + Send {
        (**self).available_components(payload)
    }
}
