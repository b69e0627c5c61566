pub mod component;
pub mod payload;
pub mod viewport;

pub use component::{ComponentNode, PropertyItem, PropertyValueItem, SelectedComponent};
pub use payload::{AplPayload, ImportListError, PackageImport, PackageSource};
pub use viewport::{Viewport, ViewportCharacteristics, ViewportShape};
