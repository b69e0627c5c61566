//! Seams to the environment the preview runs in.
//!
//! The webview that renders APL and the text editor holding the document are
//! owned by the host application. The preview pipeline only talks to them
//! through these traits.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::AppError;
use crate::preview::RenderMessage;
use crate::source_map::SourceRange;

/// The webview running the APL renderer.
pub trait RenderSurface: Send + Sync {
    fn post_message(&self, message: &RenderMessage) -> Result<(), AppError>;
}

/// The editor showing the APL payload file.
pub trait EditorHost: Send + Sync {
    /// On-disk path of the edited document, if it has been saved.
    fn document_path(&self) -> Option<PathBuf>;

    /// Current text of the document, saved or not.
    fn document_text(&self) -> Option<String>;

    /// Reveal and highlight `range` for `duration`.
    fn highlight(&self, range: SourceRange, duration: Duration);

    fn show_information(&self, message: &str);

    fn show_error(&self, message: &str);
}

/// Everything a host call produced, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Posted(RenderMessage),
    Highlighted(SourceRange, Duration),
    Information(String),
    Error(String),
}

/// Host that records calls instead of performing them.
///
/// Backs the headless CLI and the tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    path: Option<PathBuf>,
    text: Option<String>,
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new(path: Option<PathBuf>, text: Option<String>) -> Self {
        Self {
            path,
            text,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Host for the file at `path`, reading its current text.
    pub fn for_file(path: PathBuf) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::FileNotFound);
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(Self::new(Some(path), Some(text)))
    }

    /// Drain the recorded events.
    pub fn take_events(&self) -> Vec<HostEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(_) => Vec::new(),
        }
    }

    fn record(&self, event: HostEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl RenderSurface for RecordingHost {
    fn post_message(&self, message: &RenderMessage) -> Result<(), AppError> {
        self.record(HostEvent::Posted(message.clone()));
        Ok(())
    }
}

impl EditorHost for RecordingHost {
    fn document_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn document_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn highlight(&self, range: SourceRange, duration: Duration) {
        self.record(HostEvent::Highlighted(range, duration));
    }

    fn show_information(&self, message: &str) {
        self.record(HostEvent::Information(message.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.record(HostEvent::Error(message.to_string()));
    }
}
