//! Schema catalog for the standard APL components, embedded from
//! `components.toml`, extended at lookup time with the payload's custom
//! layouts.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Deserialize;
use serde_json::Value;

use super::{ComponentSchema, PropertySchema, SchemaLookup};
use crate::models::AplPayload;

const BUILTIN_SCHEMA: &str = include_str!("components.toml");

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    common: BTreeMap<String, PropertySchema>,
    components: BTreeMap<String, BTreeMap<String, PropertySchema>>,
}

#[derive(Debug, Clone)]
pub struct BuiltinSchemaCatalog {
    common: BTreeMap<String, PropertySchema>,
    components: BTreeMap<String, BTreeMap<String, PropertySchema>>,
}

impl BuiltinSchemaCatalog {
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::parse(BUILTIN_SCHEMA)
    }

    pub fn parse(toml_str: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile =
            toml::from_str(toml_str).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Ok(Self {
            common: file.common,
            components: file.components,
        })
    }

    /// Synchronous lookup behind [`SchemaLookup::component_schema`].
    ///
    /// Built-in components take precedence over layouts of the same name.
    pub fn lookup(&self, payload: &AplPayload, component_type: &str) -> Option<ComponentSchema> {
        if let Some(specific) = self.components.get(component_type) {
            let mut properties = self.common.clone();
            properties.extend(specific.iter().map(|(k, v)| (k.clone(), v.clone())));
            return Some(ComponentSchema { properties });
        }

        let layout = payload
            .document
            .get("layouts")
            .and_then(Value::as_object)?
            .get(component_type)?;
        Some(self.layout_schema(layout))
    }

    /// Built-in component names followed by the payload's layout names.
    pub fn component_names(&self, payload: &AplPayload) -> Vec<String> {
        let mut names: Vec<String> = self.components.keys().cloned().collect();
        if let Some(layouts) = payload.document.get("layouts").and_then(Value::as_object) {
            names.extend(
                layouts
                    .keys()
                    .filter(|name| !self.components.contains_key(*name))
                    .cloned(),
            );
        }
        names
    }

    fn layout_schema(&self, layout: &Value) -> ComponentSchema {
        let mut properties = self.common.clone();
        let parameters = layout
            .get("parameters")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for parameter in parameters {
            if let Some((name, schema)) = parameter_schema(parameter) {
                properties.insert(name, schema);
            }
        }
        ComponentSchema { properties }
    }
}

/// A layout parameter is either a bare name or `{ name, type?, description? }`.
fn parameter_schema(parameter: &Value) -> Option<(String, PropertySchema)> {
    match parameter {
        Value::String(name) => Some((
            name.clone(),
            PropertySchema {
                description: "Layout parameter".to_string(),
                enum_values: None,
            },
        )),
        Value::Object(fields) => {
            let name = fields.get("name")?.as_str()?.to_string();
            let description = match (
                fields.get("description").and_then(Value::as_str),
                fields.get("type").and_then(Value::as_str),
            ) {
                (Some(description), _) => description.to_string(),
                (None, Some(ty)) => format!("Layout parameter ({ty})"),
                (None, None) => "Layout parameter".to_string(),
            };
            Some((
                name,
                PropertySchema {
                    description,
                    enum_values: None,
                },
            ))
        }
        _ => None,
    }
}

impl SchemaLookup for BuiltinSchemaCatalog {
    fn component_schema(
        &self,
        payload: &AplPayload,
        component_type: &str,
    ) -> impl Future<Output = Option<ComponentSchema>> + Send {
        std::future::ready(self.lookup(payload, component_type))
    }

    fn available_components(&self, payload: &AplPayload) -> impl Future<Output = Vec<String>> + Send {
        std::future::ready(self.component_names(payload))
    }
}
