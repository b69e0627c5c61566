//! Live preview: the webview page, the messages exchanged with it, and the
//! panel that keeps it in sync with the document and viewport.

pub mod html;
pub mod panel;

pub use html::build_preview_html;
pub use panel::{document_dir, PreviewPanel, RenderMessage, WebviewMessage};
