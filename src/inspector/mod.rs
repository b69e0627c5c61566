//! Component inspector: the document tree and the property panel of the
//! selected component.

pub mod component_details;
pub mod document_tree;

pub use component_details::{property_items, value_items, ComponentDetails};
pub use document_tree::{DocumentTree, MAIN_TEMPLATE};
