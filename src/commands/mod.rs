//! Command handlers driven by the host (editor events, tree clicks, the CLI).
//!
//! Sub-modules are grouped by concern:
//! - [`document`]:  load a saved payload file, render it
//! - [`inspector`]: document tree queries and component selection
//! - [`viewport`]:  list and select viewport devices
//! - [`directive`]: new RenderDocument directive template
//!
//! Handlers take `&AppState` and return `Result<_, AppError>`. No `unwrap()`
//! or `expect()` calls are present outside of `#[cfg(test)]`.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::AppError;

pub mod directive;
pub mod document;
pub mod inspector;
pub mod viewport;

/// Acquire a read lock, mapping poisoning to [`AppError::State`].
pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    what: &str,
) -> Result<RwLockReadGuard<'a, T>, AppError> {
    lock.read()
        .map_err(|e| AppError::State(format!("{what} lock poisoned: {e}")))
}

/// Acquire a write lock, mapping poisoning to [`AppError::State`].
pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    what: &str,
) -> Result<RwLockWriteGuard<'a, T>, AppError> {
    lock.write()
        .map_err(|e| AppError::State(format!("{what} lock poisoned: {e}")))
}
