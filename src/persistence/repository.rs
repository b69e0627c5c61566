//! Typed repositories over a [`StateStore`].
//!
//! Each persisted type has a fixed store key. `update` writes to the store
//! first and only then announces the new value on the shared
//! [`StateEvent`] channel.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;

use super::store::{StateStore, StoreError};
use crate::models::{AplPayload, SelectedComponent, Viewport};

/// A persisted value changed.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    PayloadUpdated(AplPayload),
    ViewportUpdated(Viewport),
    SelectionUpdated(SelectedComponent),
}

/// A type persisted under a fixed key.
pub trait Stored: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KEY: &'static str;

    fn into_event(self) -> StateEvent;
}

impl Stored for AplPayload {
    const KEY: &'static str = "_aplPayload";

    fn into_event(self) -> StateEvent {
        StateEvent::PayloadUpdated(self)
    }
}

impl Stored for Viewport {
    const KEY: &'static str = "_aplViewport";

    fn into_event(self) -> StateEvent {
        StateEvent::ViewportUpdated(self)
    }
}

impl Stored for SelectedComponent {
    const KEY: &'static str = "_selectedAplComponentRepository";

    fn into_event(self) -> StateEvent {
        StateEvent::SelectionUpdated(self)
    }
}

pub struct Repository<T> {
    store: Arc<dyn StateStore>,
    events: broadcast::Sender<StateEvent>,
    _marker: PhantomData<fn() -> T>,
}

pub type PayloadRepository = Repository<AplPayload>;
pub type ViewportRepository = Repository<Viewport>;
pub type SelectedComponentRepository = Repository<SelectedComponent>;

impl<T: Stored> Repository<T> {
    pub fn new(store: Arc<dyn StateStore>, events: broadcast::Sender<StateEvent>) -> Self {
        Self {
            store,
            events,
            _marker: PhantomData,
        }
    }

    /// Return the stored value, initializing the key with `initial` when it
    /// is absent or no longer decodes. Initialization is not announced.
    pub fn create(&self, initial: T) -> Result<T, StoreError> {
        match self.get() {
            Ok(Some(existing)) => return Ok(existing),
            Ok(None) => {}
            Err(StoreError::Corrupt(reason)) => {
                tracing::warn!("discarding stored {}: {reason}", T::KEY);
            }
            Err(e) => return Err(e),
        }
        self.store.set(T::KEY, encode(&initial)?)?;
        Ok(initial)
    }

    pub fn get(&self) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.store.get(T::KEY)? else {
            return Ok(None);
        };
        serde_json::from_value(raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", T::KEY)))
    }

    /// Persist `value`, then broadcast it.
    pub fn update(&self, value: T) -> Result<(), StoreError> {
        self.store.set(T::KEY, encode(&value)?)?;
        tracing::debug!("{} updated", T::KEY);
        // No receivers is not an error: nothing is listening yet.
        let _ = self.events.send(value.into_event());
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }
}

fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}
