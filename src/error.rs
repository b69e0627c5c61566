//! Application-level error type returned by all command handlers.
//!
//! `AppError` is serialized to `{ kind, message }` JSON payloads so a webview
//! or editor frontend can pattern-match on a stable `kind` string.

use crate::config::ConfigError;
use crate::package::LocalPackageImportError;
use crate::persistence::StoreError;
use crate::schema::builtin::SchemaError;
use crate::viewport::CatalogError;

/// Top-level error returned by command handlers.
///
/// Serialized with serde's adjacently-tagged representation:
/// `{ "kind": "<variant>", "message": "<human-readable text>" }`
#[derive(Debug, thiserror::Error, serde::Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum AppError {
    /// A required file path does not exist on disk.
    #[error("file not found")]
    FileNotFound,

    /// A generic I/O error, stringified so it remains serializable.
    #[error("{0}")]
    Io(String),

    /// The document text is not JSON or not shaped like an APL payload.
    #[error("{0}")]
    InvalidJson(String),

    /// A local package referenced by `document.import` could not be merged.
    #[error("{0}")]
    LocalPackageImport(String),

    /// The configuration file, viewport catalog or schema catalog is invalid.
    #[error("{0}")]
    Config(String),

    /// The persisted state store could not be read or written.
    #[error("{0}")]
    Storage(String),

    /// An internal lock was poisoned.
    #[error("{0}")]
    State(String),

    /// A requested resource (device, component, etc.) was not found.
    #[error("{0}")]
    NotFound(String),

    /// The render surface rejected a message.
    #[error("{0}")]
    Render(String),
}

impl AppError {
    /// Text shown to the user when this error reaches the editor.
    pub fn user_message(&self) -> String {
        match self {
            Self::LocalPackageImport(_) => "Failed to import local packages while updating \
                 the APL json. The source path may be invalid."
                .to_string(),
            Self::InvalidJson(_) => "Your APL json seems invalid.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<LocalPackageImportError> for AppError {
    fn from(e: LocalPackageImportError) -> Self {
        Self::LocalPackageImport(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    /// Convert an [`std::io::Error`] into an [`AppError::Io`].
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidJson(e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::UnknownDevice(name) => Self::NotFound(format!("unknown device: {name}")),
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Poisoned => Self::State(e.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<SchemaError> for AppError {
    fn from(e: SchemaError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn io_error_serializes_to_kind_message() {
        let err = AppError::Io("disk full".to_string());
        let value = serde_json::to_value(&err).expect("serialize AppError::Io");
        assert_eq!(value["kind"], "Io");
        assert_eq!(value["message"], "disk full");
    }

    #[test]
    fn file_not_found_serializes_with_kind() {
        let err = AppError::FileNotFound;
        let value = serde_json::to_value(&err).expect("serialize AppError::FileNotFound");
        assert_eq!(value["kind"], "FileNotFound");
    }

    #[test]
    fn from_import_error_produces_local_package_import_variant() {
        let import_err = LocalPackageImportError {
            path: PathBuf::from("/tmp/pkg.json"),
            reason: "expected value".to_string(),
        };
        let app_err = AppError::from(import_err);
        assert!(matches!(app_err, AppError::LocalPackageImport(_)));
        let value = serde_json::to_value(&app_err).expect("serialize");
        assert_eq!(value["kind"], "LocalPackageImport");
        assert!(value["message"]
            .as_str()
            .expect("message string")
            .contains("/tmp/pkg.json"));
    }

    #[test]
    fn from_serde_error_produces_invalid_json_variant() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid");
        let app_err = AppError::from(serde_err);
        assert!(matches!(app_err, AppError::InvalidJson(_)));
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let app_err = AppError::from(io_err);
        assert!(matches!(app_err, AppError::Io(_)));
        let value = serde_json::to_value(&app_err).expect("serialize");
        assert_eq!(value["kind"], "Io");
    }

    #[test]
    fn unknown_device_becomes_not_found() {
        let app_err = AppError::from(CatalogError::UnknownDevice("Echo Nope".to_string()));
        let value = serde_json::to_value(&app_err).expect("serialize");
        assert_eq!(value["kind"], "NotFound");
        assert_eq!(value["message"], "unknown device: Echo Nope");
    }

    #[test]
    fn store_errors_map_to_storage_or_state() {
        let corrupt = AppError::from(StoreError::Corrupt("bad".to_string()));
        assert!(matches!(corrupt, AppError::Storage(_)));
        assert!(matches!(AppError::from(StoreError::Poisoned), AppError::State(_)));
    }

    #[test]
    fn user_messages_match_editor_notifications() {
        assert_eq!(
            AppError::LocalPackageImport("x".to_string()).user_message(),
            "Failed to import local packages while updating the APL json. \
             The source path may be invalid."
        );
        assert_eq!(
            AppError::InvalidJson("x".to_string()).user_message(),
            "Your APL json seems invalid."
        );
        assert_eq!(
            AppError::NotFound("no such device".to_string()).user_message(),
            "no such device"
        );
    }

    #[test]
    fn app_error_display_is_human_readable() {
        assert_eq!(AppError::FileNotFound.to_string(), "file not found");
        assert_eq!(
            AppError::Storage("write failed".to_string()).to_string(),
            "write failed"
        );
    }
}
