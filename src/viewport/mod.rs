//! Viewport catalog and dp → pixel conversion.
//!
//! - [`characteristics`]: pure conversion from [`crate::models::Viewport`]
//!   to what the render surface consumes
//! - [`catalog`]: built-in device profiles and the default device

pub mod catalog;
pub mod characteristics;

pub use catalog::{CatalogError, NamedViewport, ViewportCatalog, ViewportProfile};
pub use characteristics::to_characteristics;
