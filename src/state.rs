//! Application state shared by the command handlers.
//!
//! [`AppState`] is built once at startup and passed to handlers by reference.
//! Persisted values live in the repositories; derived views (the document
//! tree, the selected component's properties) sit behind [`RwLock`]s.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::config::PreviewConfig;
use crate::error::AppError;
use crate::inspector::{ComponentDetails, DocumentTree};
use crate::models::{AplPayload, SelectedComponent};
use crate::persistence::{
    FileStore, MemoryStore, PayloadRepository, SelectedComponentRepository, StateEvent,
    StateStore, ViewportRepository,
};
use crate::schema::BuiltinSchemaCatalog;
use crate::viewport::ViewportCatalog;

/// Capacity of the state event channel.
const EVENT_CAPACITY: usize = 64;

/// The payload file currently being previewed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Absolute path to the source file on disk.
    pub path: PathBuf,
    /// SHA-256 hex digest of the text last loaded.
    pub checksum: String,
}

/// Root application state.
pub struct AppState {
    pub config: PreviewConfig,
    pub catalog: ViewportCatalog,
    pub schema: Arc<BuiltinSchemaCatalog>,
    pub payload: PayloadRepository,
    pub viewport: ViewportRepository,
    pub selection: SelectedComponentRepository,
    pub document: RwLock<Option<LoadedDocument>>,
    pub tree: RwLock<DocumentTree>,
    pub details: RwLock<ComponentDetails<Arc<BuiltinSchemaCatalog>>>,
    selection_sequence: AtomicU64,
    events: broadcast::Sender<StateEvent>,
}

impl AppState {
    /// Build the state over `store`, initializing absent keys: an empty
    /// payload, the configured default device, no selection.
    pub fn new(config: PreviewConfig, store: Arc<dyn StateStore>) -> Result<Self, AppError> {
        let mut catalog = ViewportCatalog::builtin()?;
        if let Some(device) = &config.viewport.default_device {
            catalog = catalog.with_default(device)?;
        }
        let schema = Arc::new(BuiltinSchemaCatalog::builtin()?);

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let payload_repo = PayloadRepository::new(store.clone(), events.clone());
        let viewport_repo = ViewportRepository::new(store.clone(), events.clone());
        let selection_repo = SelectedComponentRepository::new(store, events.clone());

        let payload = payload_repo.create(AplPayload::default())?;
        let viewport = viewport_repo.create(catalog.default_viewport().clone())?;
        let selection = selection_repo.create(SelectedComponent::default())?;
        tracing::info!(
            "state ready: {}x{} viewport, selection {:?}",
            viewport.width,
            viewport.height,
            selection.path
        );

        let tree = DocumentTree::new(&payload);
        let mut details = ComponentDetails::new(schema.clone(), payload);
        details.update_properties(selection.properties);

        Ok(Self {
            tree: RwLock::new(tree),
            details: RwLock::new(details),
            config,
            catalog,
            schema,
            payload: payload_repo,
            viewport: viewport_repo,
            selection: selection_repo,
            document: RwLock::new(None),
            selection_sequence: AtomicU64::new(0),
            events,
        })
    }

    /// State with nothing persisted beyond the process.
    pub fn in_memory(config: PreviewConfig) -> Result<Self, AppError> {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Pick the store from `config.storage`.
    pub fn from_config(config: PreviewConfig) -> Result<Self, AppError> {
        let store: Arc<dyn StateStore> = match &config.storage.state_file {
            Some(path) => Arc::new(FileStore::open(path.clone())?),
            None => Arc::new(MemoryStore::new()),
        };
        Self::new(config, store)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    /// Start a new selection and return its sequence number.
    pub fn begin_selection(&self) -> u64 {
        self.selection_sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `sequence` is still the newest selection.
    pub fn is_current_selection(&self, sequence: u64) -> bool {
        self.selection_sequence.load(Ordering::SeqCst) == sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ViewportShape;

    #[test]
    fn app_state_constructs_with_defaults() {
        let state = AppState::in_memory(PreviewConfig::default()).expect("state");
        assert_eq!(state.payload.get().expect("get"), Some(AplPayload::default()));
        assert_eq!(
            state.viewport.get().expect("get").as_ref(),
            Some(state.catalog.default_viewport())
        );
        assert!(state.document.read().expect("read lock").is_none());
        assert!(state.tree.read().expect("read lock").root_nodes().is_empty());
    }

    #[test]
    fn configured_default_device_is_used() {
        let mut config = PreviewConfig::default();
        config.viewport.default_device = Some("Echo Spot".to_string());
        let state = AppState::in_memory(config).expect("state");
        let viewport = state.viewport.get().expect("get").expect("viewport");
        assert_eq!(viewport.shape, ViewportShape::Round);
    }

    #[test]
    fn unknown_default_device_is_rejected() {
        let mut config = PreviewConfig::default();
        config.viewport.default_device = Some("Echo Nope".to_string());
        assert!(matches!(
            AppState::in_memory(config),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn persisted_viewport_survives_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = PreviewConfig::default();
        config.storage.state_file = Some(dir.path().join("state.json"));

        let spot = {
            let state = AppState::from_config(config.clone()).expect("state");
            let spot = state
                .catalog
                .find_device("Echo Spot")
                .expect("Echo Spot")
                .viewport
                .clone();
            state.viewport.update(spot.clone()).expect("update");
            spot
        };

        let state = AppState::from_config(config).expect("restarted state");
        assert_eq!(state.viewport.get().expect("get"), Some(spot));
    }

    #[test]
    fn only_newest_selection_is_current() {
        let state = AppState::in_memory(PreviewConfig::default()).expect("state");
        let first = state.begin_selection();
        let second = state.begin_selection();
        assert!(!state.is_current_selection(first));
        assert!(state.is_current_selection(second));
    }
}
