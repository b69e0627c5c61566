//! Lazily expanded component tree of `document.mainTemplate`.
//!
//! Each node carries a structural path (`mainTemplate/items/0/item`) that
//! [`crate::source_map::locate`] resolves back to source lines. Array children
//! get an index segment; a singular `item` object does not.

use serde_json::Value;
use tokio::sync::watch;

use crate::json::JsonType;
use crate::models::{AplPayload, ComponentNode, SelectedComponent};

/// Label and path of the synthetic root node.
pub const MAIN_TEMPLATE: &str = "mainTemplate";

/// Label for a component with neither `id` nor `type`.
const UNTYPED_LABEL: &str = "(untyped)";

/// Child-bearing keys, in lookup order. Only the first match is used.
const CHILD_KEYS: [&str; 2] = ["items", "item"];

enum ChildSlot<'a> {
    Many(&'a [Value]),
    Single(&'a JsonType),
}

/// Document tree projector.
#[derive(Debug)]
pub struct DocumentTree {
    main_template: Option<JsonType>,
    refresh: watch::Sender<u64>,
}

impl DocumentTree {
    pub fn new(payload: &AplPayload) -> Self {
        let (refresh, _) = watch::channel(0);
        Self {
            main_template: payload.main_template().cloned(),
            refresh,
        }
    }

    /// Take a new snapshot of `payload` and notify subscribers.
    pub fn refresh(&mut self, payload: &AplPayload) {
        self.main_template = payload.main_template().cloned();
        self.refresh.send_modify(|revision| *revision += 1);
    }

    /// Receives the tree revision each time [`refresh`](Self::refresh) runs.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.refresh.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.refresh.borrow()
    }

    /// The single `mainTemplate` root, or nothing for a document without one.
    pub fn root_nodes(&self) -> Vec<ComponentNode> {
        let Some(main_template) = &self.main_template else {
            return Vec::new();
        };
        vec![ComponentNode {
            label: MAIN_TEMPLATE.to_string(),
            properties: main_template.clone(),
            path: MAIN_TEMPLATE.to_string(),
            has_children: has_children(main_template),
        }]
    }

    /// Child components of `node`, from its `items` or else its `item`.
    pub fn children(&self, node: &ComponentNode) -> Vec<ComponentNode> {
        child_components(&node.properties, &node.path)
    }

    /// The selection produced by activating `node` in the tree.
    pub fn activate(&self, node: &ComponentNode) -> SelectedComponent {
        SelectedComponent {
            path: Some(node.path.clone()),
            properties: node.properties.clone(),
        }
    }

    /// Depth-first expansion of the whole tree as `(depth, node)` pairs.
    pub fn flatten(&self) -> Vec<(usize, ComponentNode)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, ComponentNode)> =
            self.root_nodes().into_iter().map(|n| (0, n)).collect();
        while let Some((depth, node)) = stack.pop() {
            let children = self.children(&node);
            out.push((depth, node));
            stack.extend(children.into_iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }
}

fn child_slot(properties: &JsonType) -> Option<(&'static str, ChildSlot<'_>)> {
    CHILD_KEYS
        .into_iter()
        .find_map(|key| match properties.get(key)? {
            Value::Array(items) => Some((key, ChildSlot::Many(items))),
            Value::Object(item) => Some((key, ChildSlot::Single(item))),
            _ => None,
        })
}

fn has_children(properties: &JsonType) -> bool {
    match child_slot(properties) {
        Some((_, ChildSlot::Many(items))) => items.iter().any(Value::is_object),
        Some((_, ChildSlot::Single(_))) => true,
        None => false,
    }
}

fn child_components(properties: &JsonType, parent_path: &str) -> Vec<ComponentNode> {
    match child_slot(properties) {
        Some((key, ChildSlot::Many(items))) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let item = item.as_object()?;
                Some(component_node(item, format!("{parent_path}/{key}/{idx}")))
            })
            .collect(),
        Some((key, ChildSlot::Single(item))) => {
            vec![component_node(item, format!("{parent_path}/{key}"))]
        }
        None => Vec::new(),
    }
}

fn component_node(properties: &JsonType, path: String) -> ComponentNode {
    ComponentNode {
        label: label_of(properties),
        properties: properties.clone(),
        path,
        has_children: has_children(properties),
    }
}

fn label_of(properties: &JsonType) -> String {
    let non_empty = |key: &str| {
        properties
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    non_empty("id")
        .or_else(|| non_empty("type"))
        .unwrap_or(UNTYPED_LABEL)
        .to_string()
}
