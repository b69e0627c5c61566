//! Persisted preview state: the current payload, viewport and selection.

pub mod repository;
pub mod store;

pub use repository::{
    PayloadRepository, Repository, SelectedComponentRepository, StateEvent, Stored,
    ViewportRepository,
};
pub use store::{FileStore, MemoryStore, StateStore, StoreError};
