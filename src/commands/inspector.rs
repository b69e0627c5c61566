//! Document tree queries and component selection.
//!
//! Selecting a component fans out to three places: the persisted selection,
//! the property panel, and a highlight of the component's lines in the
//! editor. Property rows are resolved asynchronously; when a newer selection
//! starts before they arrive the older result is dropped.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::host::EditorHost;
use crate::inspector::{value_items, ComponentDetails};
use crate::json::{into_json_type, JsonType};
use crate::models::{ComponentNode, PropertyItem, PropertyValueItem, SelectedComponent};
use crate::schema::SchemaLookup;
use crate::source_map::{locate_in_file, SourceRange};
use crate::state::AppState;

use super::{read_lock, write_lock};

/// Everything the inspector shows for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInspection {
    pub selection: SelectedComponent,
    pub properties: Vec<PropertyItem>,
    /// Lines of the component in the document file, when they could be found.
    pub range: Option<SourceRange>,
}

/// Roots of the document tree.
pub fn root_nodes(state: &AppState) -> Result<Vec<ComponentNode>, AppError> {
    Ok(read_lock(&state.tree, "document tree")?.root_nodes())
}

/// Children of `node` in the document tree.
pub fn children(state: &AppState, node: &ComponentNode) -> Result<Vec<ComponentNode>, AppError> {
    Ok(read_lock(&state.tree, "document tree")?.children(node))
}

/// The whole tree, depth-first, with each node's depth.
pub fn flatten_tree(state: &AppState) -> Result<Vec<(usize, ComponentNode)>, AppError> {
    Ok(read_lock(&state.tree, "document tree")?.flatten())
}

/// The value line under a property row.
pub fn property_values(item: &PropertyItem) -> Vec<PropertyValueItem> {
    value_items(item)
}

/// A tree node was activated.
pub async fn activate_node(
    state: &AppState,
    node: &ComponentNode,
    editor: &dyn EditorHost,
) -> Result<Option<ComponentInspection>, AppError> {
    let selection = read_lock(&state.tree, "document tree")?.activate(node);
    select_component(state, Value::Object(selection.properties), selection.path, editor).await
}

/// Select the component whose property bag is `properties` at `path`.
///
/// `properties` comes from the host and is checked here; anything other than
/// an object selects an empty bag. Member values are kept as they are,
/// `null` included. Returns `None`
/// when a newer selection superseded this one while its properties were
/// being resolved.
pub async fn select_component(
    state: &AppState,
    properties: Value,
    path: Option<String>,
    editor: &dyn EditorHost,
) -> Result<Option<ComponentInspection>, AppError> {
    let sequence = state.begin_selection();

    let properties = into_json_type(properties).unwrap_or_else(|| {
        tracing::warn!("ignoring component properties that are not an object");
        JsonType::new()
    });
    let selection = SelectedComponent {
        path: path.clone(),
        properties: properties.clone(),
    };
    state.selection.update(selection.clone())?;

    let details = {
        let mut details = write_lock(&state.details, "component details")?;
        details.update_properties(properties);
        details.snapshot()
    };

    let Some(items) = rows_if_current(state, sequence, &details).await else {
        return Ok(None);
    };

    let range = match path {
        Some(path) => locate_component(editor.document_path(), path).await?,
        None => None,
    };
    if let Some(range) = range {
        editor.highlight(range, state.config.highlight_duration());
    }

    Ok(Some(ComponentInspection {
        selection,
        properties: items,
        range,
    }))
}

/// Resolve the rows of `details`, or `None` when a selection newer than
/// `sequence` started while they were being looked up.
async fn rows_if_current<S: SchemaLookup>(
    state: &AppState,
    sequence: u64,
    details: &ComponentDetails<S>,
) -> Option<Vec<PropertyItem>> {
    let items = details.property_items().await;
    if !state.is_current_selection(sequence) {
        tracing::debug!("selection {sequence} superseded, dropping its properties");
        return None;
    }
    Some(items)
}

/// Resolve `path` against the on-disk text of `file`.
async fn locate_component(
    file: Option<PathBuf>,
    path: String,
) -> Result<Option<SourceRange>, AppError> {
    let Some(file) = file else {
        return Ok(None);
    };
    tokio::task::spawn_blocking(move || locate_in_file(&file, &path))
        .await
        .map_err(|e| AppError::Io(format!("locate task panicked: {e}")))
}

/// Property rows of the currently selected component.
pub async fn current_properties(state: &AppState) -> Result<Vec<PropertyItem>, AppError> {
    let details = read_lock(&state.details, "component details")?.snapshot();
    Ok(details.property_items().await)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
