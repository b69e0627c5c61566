//! The preview panel: keeps the last good inflated payload and the selected
//! viewport, and posts a [`RenderMessage`] to the render surface whenever
//! either changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::AppError;
use crate::host::{EditorHost, RenderSurface};
use crate::models::{AplPayload, Viewport};
use crate::package;
use crate::persistence::StateEvent;
use crate::viewport::to_characteristics;

/// What the renderer receives. Each field is itself JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderMessage {
    pub document: String,
    pub datasources: String,
    pub viewport: String,
}

impl RenderMessage {
    pub fn new(payload: &AplPayload, viewport: &Viewport) -> Result<Self, AppError> {
        let encode = |e: serde_json::Error| AppError::Render(e.to_string());
        Ok(Self {
            document: serde_json::to_string(&payload.document).map_err(encode)?,
            datasources: serde_json::to_string(&payload.datasources).map_err(encode)?,
            viewport: serde_json::to_string(&to_characteristics(viewport)).map_err(encode)?,
        })
    }
}

/// Messages sent by the preview page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum WebviewMessage {
    /// The page is ready; load the editor's current text.
    Initialize,
    /// The renderer failed; `text` is shown to the user.
    Alert { text: String },
}

/// Directory against which relative package sources resolve.
pub fn document_dir(editor: &dyn EditorHost) -> PathBuf {
    editor
        .document_path()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug)]
pub struct PreviewPanel {
    payload: AplPayload,
    viewport: Viewport,
}

impl PreviewPanel {
    pub fn new(payload: AplPayload, viewport: Viewport) -> Self {
        Self { payload, viewport }
    }

    pub fn payload(&self) -> &AplPayload {
        &self.payload
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Inflate `raw` against `base_dir` and make it current.
    ///
    /// On failure the previous payload stays in place.
    pub fn update_payload(&mut self, base_dir: &Path, raw: &AplPayload) -> Result<(), AppError> {
        self.payload = package::inflate(base_dir, raw)?;
        Ok(())
    }

    pub fn update_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn render_message(&self) -> Result<RenderMessage, AppError> {
        RenderMessage::new(&self.payload, &self.viewport)
    }

    pub fn render(&self, surface: &dyn RenderSurface) -> Result<(), AppError> {
        surface.post_message(&self.render_message()?)
    }

    /// React to a message from the page.
    ///
    /// `Initialize` yields the editor's current payload for the caller to
    /// store; `Alert` is forwarded to the editor as an error.
    pub fn handle_message(
        message: WebviewMessage,
        editor: &dyn EditorHost,
    ) -> Result<Option<AplPayload>, AppError> {
        match message {
            WebviewMessage::Initialize => {
                let Some(text) = editor.document_text() else {
                    tracing::debug!("initialize without an open document");
                    return Ok(None);
                };
                let payload = AplPayload::from_source_text(&text)?;
                Ok(Some(payload))
            }
            WebviewMessage::Alert { text } => {
                tracing::warn!("preview alert: {text}");
                editor.show_error(&text);
                Ok(None)
            }
        }
    }

    /// Follow state events until the channel closes, re-rendering on each
    /// payload or viewport change.
    ///
    /// Inflation failures are reported to the editor and leave the last good
    /// render in place.
    pub async fn run<H>(mut self, mut events: broadcast::Receiver<StateEvent>, host: Arc<H>)
    where
        H: RenderSurface + EditorHost + 'static,
    {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("preview panel skipped {skipped} state events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            match event {
                StateEvent::PayloadUpdated(raw) => {
                    let base_dir = document_dir(host.as_ref());
                    let inflated =
                        tokio::task::spawn_blocking(move || package::inflate(&base_dir, &raw))
                            .await;
                    match inflated {
                        Ok(Ok(payload)) => self.payload = payload,
                        Ok(Err(e)) => {
                            let err = AppError::from(e);
                            tracing::warn!("keeping previous payload: {err}");
                            host.show_information(&err.user_message());
                            continue;
                        }
                        Err(e) => {
                            tracing::warn!("inflation task failed: {e}");
                            continue;
                        }
                    }
                }
                StateEvent::ViewportUpdated(viewport) => self.update_viewport(viewport),
                StateEvent::SelectionUpdated(_) => continue,
            }
            if let Err(e) = self.render(host.as_ref()) {
                tracing::warn!("render failed: {e}");
            }
        }
        tracing::debug!("preview panel stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostEvent, RecordingHost};
    use crate::models::ViewportShape;
    use serde_json::{json, Value};

    fn viewport() -> Viewport {
        Viewport {
            shape: ViewportShape::Round,
            width: 480.0,
            height: 480.0,
            dpi: 320.0,
        }
    }

    fn payload(document: Value) -> AplPayload {
        AplPayload {
            document: document.as_object().cloned().expect("object"),
            datasources: crate::json::JsonType::new(),
        }
    }

    #[test]
    fn render_message_double_encodes_fields() {
        let panel = PreviewPanel::new(payload(json!({ "type": "APL" })), viewport());
        let message = panel.render_message().expect("message");
        assert_eq!(message.document, r#"{"type":"APL"}"#);
        assert_eq!(message.datasources, "{}");

        let characteristics: Value = serde_json::from_str(&message.viewport).expect("json");
        assert_eq!(
            characteristics,
            json!({ "isRound": true, "width": 960, "height": 960, "dpi": 320 })
        );

        let wire = serde_json::to_value(&message).expect("serialize");
        let keys: Vec<&String> = wire.as_object().expect("object").keys().collect();
        assert_eq!(keys, ["document", "datasources", "viewport"]);
    }

    #[test]
    fn webview_messages_deserialize_by_command() {
        let init: WebviewMessage =
            serde_json::from_str(r#"{"command":"initialize"}"#).expect("initialize");
        assert_eq!(init, WebviewMessage::Initialize);

        let alert: WebviewMessage =
            serde_json::from_str(r#"{"command":"alert","text":"boom"}"#).expect("alert");
        assert_eq!(
            alert,
            WebviewMessage::Alert {
                text: "boom".to_string()
            }
        );

        assert!(serde_json::from_str::<WebviewMessage>(r#"{"command":"other"}"#).is_err());
    }

    #[test]
    fn initialize_parses_editor_text() {
        let host = RecordingHost::new(None, Some(r#"{"document":{"type":"APL"}}"#.to_string()));
        let loaded = PreviewPanel::handle_message(WebviewMessage::Initialize, &host)
            .expect("handled")
            .expect("payload");
        assert_eq!(loaded.document["type"], "APL");
    }

    #[test]
    fn initialize_with_invalid_text_is_invalid_json() {
        let host = RecordingHost::new(None, Some("{".to_string()));
        let err = PreviewPanel::handle_message(WebviewMessage::Initialize, &host)
            .expect_err("invalid");
        assert!(matches!(err, AppError::InvalidJson(_)));
    }

    #[test]
    fn alert_is_shown_as_error() {
        let host = RecordingHost::default();
        let result = PreviewPanel::handle_message(
            WebviewMessage::Alert {
                text: "engine failed".to_string(),
            },
            &host,
        )
        .expect("handled");
        assert!(result.is_none());
        assert_eq!(
            host.take_events(),
            vec![HostEvent::Error("engine failed".to_string())]
        );
    }

    #[test]
    fn failed_inflation_keeps_previous_payload() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("broken.json"), "{ nope").expect("write");

        let good = payload(json!({ "type": "APL" }));
        let mut panel = PreviewPanel::new(good.clone(), viewport());
        let raw = payload(json!({
            "import": [{ "name": "broken", "version": "1.0", "source": "./broken.json" }]
        }));

        let err = panel.update_payload(dir.path(), &raw).expect_err("broken package");
        assert!(matches!(err, AppError::LocalPackageImport(_)));
        assert_eq!(panel.payload(), &good);
    }

    #[tokio::test]
    async fn run_renders_on_payload_and_viewport_events() {
        let (events, receiver) = broadcast::channel(8);
        let host = Arc::new(RecordingHost::default());
        let panel = PreviewPanel::new(AplPayload::default(), viewport());
        let task = tokio::spawn(panel.run(receiver, host.clone()));

        events
            .send(StateEvent::PayloadUpdated(payload(json!({ "type": "APL" }))))
            .expect("send payload");
        let mut square = viewport();
        square.shape = ViewportShape::Rectangle;
        events
            .send(StateEvent::ViewportUpdated(square))
            .expect("send viewport");
        drop(events);
        task.await.expect("panel task");

        let posted: Vec<RenderMessage> = host
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Posted(message) => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].document, r#"{"type":"APL"}"#);
        assert!(posted[1].viewport.contains(r#""isRound":false"#));
    }
}
