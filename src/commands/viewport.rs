//! Viewport device listing and selection.

use crate::error::AppError;
use crate::models::Viewport;
use crate::state::AppState;
use crate::viewport::{NamedViewport, ViewportProfile};

/// Profiles of the viewport catalog, each with its example devices.
pub fn list_profiles(state: &AppState) -> Vec<ViewportProfile> {
    state.catalog.profiles().to_vec()
}

/// The persisted viewport, or the catalog default when none is stored.
pub fn current_viewport(state: &AppState) -> Result<Viewport, AppError> {
    Ok(state
        .viewport
        .get()?
        .unwrap_or_else(|| state.catalog.default_viewport().clone()))
}

/// Make the device called `name` the current viewport.
///
/// Returns [`AppError::NotFound`] for a name the catalog does not know.
pub fn select_viewport(state: &AppState, name: &str) -> Result<NamedViewport, AppError> {
    let device = state
        .catalog
        .find_device(name)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("unknown device: {name}")))?;
    state.viewport.update(device.viewport.clone())?;
    tracing::info!("viewport set to {}", device.name);
    Ok(device)
}
