//! Property panel for the selected component.

use std::collections::HashSet;

use serde_json::Value;
use tokio::sync::watch;

use crate::json::{display_value, JsonType};
use crate::models::{AplPayload, PropertyItem, PropertyValueItem};
use crate::schema::SchemaLookup;

/// Keys that hold child components; they belong to the tree, not the panel.
const CHILD_KEYS: [&str; 2] = ["item", "items"];

/// Detail projector: the selected component's property bag, resolved against
/// the schema of its type.
pub struct ComponentDetails<S> {
    schema: S,
    payload: AplPayload,
    properties: JsonType,
    refresh: watch::Sender<u64>,
}

impl<S: SchemaLookup> ComponentDetails<S> {
    pub fn new(schema: S, payload: AplPayload) -> Self {
        let (refresh, _) = watch::channel(0);
        Self {
            schema,
            payload,
            properties: JsonType::new(),
            refresh,
        }
    }

    pub fn properties(&self) -> &JsonType {
        &self.properties
    }

    pub fn payload(&self) -> &AplPayload {
        &self.payload
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Replace the selected property bag.
    pub fn update_properties(&mut self, properties: JsonType) {
        self.properties = properties;
        self.refresh.send_modify(|revision| *revision += 1);
    }

    /// Replace the payload used to resolve custom layouts.
    pub fn update_payload(&mut self, payload: AplPayload) {
        self.payload = payload;
        self.refresh.send_modify(|revision| *revision += 1);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.refresh.subscribe()
    }

    /// Rows of the property panel.
    pub async fn property_items(&self) -> Vec<PropertyItem> {
        property_items(&self.schema, &self.payload, &self.properties).await
    }

    /// The value line shown under `item`.
    pub fn value_items(item: &PropertyItem) -> Vec<PropertyValueItem> {
        value_items(item)
    }
}

impl<S: SchemaLookup + Clone> ComponentDetails<S> {
    /// Detached copy at the current revision, for resolving rows without
    /// holding the lock that guards `self`.
    pub fn snapshot(&self) -> Self {
        let (refresh, _) = watch::channel(*self.refresh.borrow());
        Self {
            schema: self.schema.clone(),
            payload: self.payload.clone(),
            properties: self.properties.clone(),
            refresh,
        }
    }
}

/// Instance keys in document order, then schema-only keys by name.
/// `item` and `items` are never listed.
///
/// A bag without a string `type` has no rows.
pub async fn property_items<S: SchemaLookup>(
    schema: &S,
    payload: &AplPayload,
    properties: &JsonType,
) -> Vec<PropertyItem> {
    let Some(component_type) = properties.get("type").and_then(Value::as_str) else {
        return Vec::new();
    };

    let component_schema = schema.component_schema(payload, component_type).await;
    if component_schema.is_none() {
        tracing::debug!("no schema for component type {component_type}");
    }
    let declared = component_schema.map(|s| s.properties).unwrap_or_default();

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for (name, value) in properties {
        if CHILD_KEYS.contains(&name.as_str()) || !seen.insert(name.as_str()) {
            continue;
        }
        items.push(PropertyItem {
            name: name.clone(),
            value: Some(value.clone()),
            description: declared
                .get(name)
                .map(|p| p.description.clone())
                .unwrap_or_default(),
        });
    }
    for (name, property) in &declared {
        if CHILD_KEYS.contains(&name.as_str()) || seen.contains(name.as_str()) {
            continue;
        }
        items.push(PropertyItem {
            name: name.clone(),
            value: None,
            description: property.description.clone(),
        });
    }
    items
}

/// One line holding the displayed value, or nothing for an unset property.
pub fn value_items(item: &PropertyItem) -> Vec<PropertyValueItem> {
    item.value
        .as_ref()
        .map(|value| PropertyValueItem {
            label: display_value(value),
        })
        .into_iter()
        .collect()
}
