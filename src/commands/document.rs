//! Document lifecycle: a payload file was opened or saved.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::Digest as _;

use crate::error::AppError;
use crate::models::AplPayload;
use crate::package;
use crate::host::EditorHost;
use crate::preview::{document_dir, PreviewPanel, RenderMessage, WebviewMessage};
use crate::state::{AppState, LoadedDocument};

use super::{read_lock, write_lock};

/// Outcome of [`open_document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub checksum: String,
    /// `false` when the text matched the loaded document. The payload is
    /// re-inflated and broadcast either way, since local packages may have
    /// changed on disk.
    pub changed: bool,
}

/// SHA-256 hex digest of `text`.
pub fn checksum(text: &str) -> String {
    let digest = sha2::Sha256::digest(text.as_bytes());
    format!("{digest:x}")
}

// ── open_document ─────────────────────────────────────────────────────────────

/// Load the payload file at `path_str` (on open or save).
///
/// 1. Returns [`AppError::FileNotFound`] if the path does not exist.
/// 2. Reads and hashes the file on the blocking thread pool.
/// 3. Hands the text to [`apply_document_text`].
pub async fn open_document(state: &AppState, path_str: &str) -> Result<DocumentStatus, AppError> {
    let path = PathBuf::from(path_str);
    if !path.exists() {
        return Err(AppError::FileNotFound);
    }

    let read_path = path.clone();
    let (text, digest) = tokio::task::spawn_blocking(move || {
        let text = std::fs::read_to_string(&read_path)?;
        let digest = checksum(&text);
        Ok::<(String, String), AppError>((text, digest))
    })
    .await
    .map_err(|e| AppError::Io(format!("read task panicked: {e}")))??;

    apply_document_text(state, path, &text, digest).await
}

/// Make `text` (the content of `path`) the current payload, replacing the
/// previous one wholesale.
///
/// Text that is not an APL payload fails with [`AppError::InvalidJson`] and
/// leaves the state untouched.
pub async fn apply_document_text(
    state: &AppState,
    path: PathBuf,
    text: &str,
    checksum: String,
) -> Result<DocumentStatus, AppError> {
    let changed = read_lock(&state.document, "document")?
        .as_ref()
        .map_or(true, |doc| doc.path != path || doc.checksum != checksum);
    if !changed {
        tracing::debug!("{} text unchanged, re-inflating packages", path.display());
    }

    let payload = AplPayload::from_source_text(text)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let resolved = resolve_packages(base_dir, &payload).await;
    store_payload(state, payload, resolved)?;

    tracing::info!("loaded {}", path.display());
    *write_lock(&state.document, "document")? = Some(LoadedDocument {
        path,
        checksum: checksum.clone(),
    });
    Ok(DocumentStatus { checksum, changed })
}

/// Inflate `payload` so the property panel sees layouts from local packages.
///
/// Falls back to `payload` itself when a package cannot be loaded; the
/// preview panel reports that failure to the user.
async fn resolve_packages(base_dir: PathBuf, payload: &AplPayload) -> AplPayload {
    let raw = payload.clone();
    match tokio::task::spawn_blocking(move || package::inflate(&base_dir, &raw)).await {
        Ok(Ok(resolved)) => resolved,
        Ok(Err(e)) => {
            tracing::warn!("schema lookups use the raw payload: {e}");
            payload.clone()
        }
        Err(e) => {
            tracing::warn!("inflate task failed: {e}");
            payload.clone()
        }
    }
}

/// Refresh the inspector views, then persist and announce `payload`.
///
/// `resolved` is `payload` with local packages merged; schema lookups use it.
pub fn store_payload(
    state: &AppState,
    payload: AplPayload,
    resolved: AplPayload,
) -> Result<(), AppError> {
    write_lock(&state.tree, "document tree")?.refresh(&payload);
    write_lock(&state.details, "component details")?.update_payload(resolved);
    state.payload.update(payload)?;
    Ok(())
}

// ── webview messages ──────────────────────────────────────────────────────────

/// Handle a message from the preview page.
///
/// `initialize` loads the editor's current text, saved or not, as the
/// payload; the document checksum is left alone so the next save refreshes.
pub async fn handle_webview_message(
    state: &AppState,
    message: WebviewMessage,
    editor: &dyn EditorHost,
) -> Result<(), AppError> {
    let Some(payload) = PreviewPanel::handle_message(message, editor)? else {
        return Ok(());
    };
    let resolved = resolve_packages(document_dir(editor), &payload).await;
    store_payload(state, payload, resolved)
}

// ── render_document ───────────────────────────────────────────────────────────

/// Inflate the current payload against `base_dir` and build the render
/// message for the current viewport.
pub async fn render_current(state: &AppState, base_dir: &Path) -> Result<RenderMessage, AppError> {
    let payload = state.payload.get()?.unwrap_or_default();
    let viewport = match state.viewport.get()? {
        Some(viewport) => viewport,
        None => state.catalog.default_viewport().clone(),
    };

    let base_dir = base_dir.to_path_buf();
    let inflated = tokio::task::spawn_blocking(move || package::inflate(&base_dir, &payload))
        .await
        .map_err(|e| AppError::Io(format!("inflate task panicked: {e}")))??;

    RenderMessage::new(&inflated, &viewport)
}

/// Load `path_str` and render it, resolving local packages next to it.
pub async fn render_document(state: &AppState, path_str: &str) -> Result<RenderMessage, AppError> {
    open_document(state, path_str).await?;
    let base_dir = Path::new(path_str)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    render_current(state, &base_dir).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
