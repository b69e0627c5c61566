//! Viewport catalog: named device profiles the user can preview against.
//!
//! The built-in catalog is embedded from `catalog.toml` and validated on
//! load, the same parse-then-validate flow used for configuration files.

use serde::{Deserialize, Serialize};

use crate::models::Viewport;

const BUILTIN_CATALOG: &str = include_str!("catalog.toml");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog error: {0}")]
    Parse(String),
    #[error("unknown viewport device: {0}")]
    UnknownDevice(String),
}

/// A device with a display name, e.g. `"Echo Spot"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedViewport {
    pub name: String,
    #[serde(flatten)]
    pub viewport: Viewport,
}

/// A viewport profile (e.g. `"Hub Round Small"`) and its example devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportProfile {
    pub name: String,
    #[serde(alias = "example_devices")]
    pub example_devices: Vec<NamedViewport>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    default_device: String,
    profiles: Vec<ViewportProfile>,
}

/// Validated set of viewport profiles with a default device.
#[derive(Debug, Clone)]
pub struct ViewportCatalog {
    profiles: Vec<ViewportProfile>,
    default_device: NamedViewport,
}

impl ViewportCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG)
    }

    /// Parse a TOML catalog and check that its default device exists.
    pub fn parse(toml_str: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            toml::from_str(toml_str).map_err(|e| CatalogError::Parse(e.to_string()))?;
        if file.profiles.iter().all(|p| p.example_devices.is_empty()) {
            return Err(CatalogError::Parse(
                "catalog must contain at least one device".to_string(),
            ));
        }
        let default_device = find_in(&file.profiles, &file.default_device)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownDevice(file.default_device.clone()))?;
        Ok(Self {
            profiles: file.profiles,
            default_device,
        })
    }

    /// Replace the default device with the one called `name`.
    pub fn with_default(mut self, name: &str) -> Result<Self, CatalogError> {
        self.default_device = self
            .find_device(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownDevice(name.to_string()))?;
        Ok(self)
    }

    pub fn default_viewport(&self) -> &Viewport {
        &self.default_device.viewport
    }

    pub fn default_device(&self) -> &NamedViewport {
        &self.default_device
    }

    pub fn profiles(&self) -> &[ViewportProfile] {
        &self.profiles
    }

    /// Look a device up by its display name (case-insensitive).
    pub fn find_device(&self, name: &str) -> Option<&NamedViewport> {
        find_in(&self.profiles, name)
    }
}

fn find_in<'a>(profiles: &'a [ViewportProfile], name: &str) -> Option<&'a NamedViewport> {
    profiles
        .iter()
        .flat_map(|p| p.example_devices.iter())
        .find(|d| d.name.eq_ignore_ascii_case(name))
}
