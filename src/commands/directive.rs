//! Template for starting a new APL document.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;

pub const RENDER_DOCUMENT: &str = "Alexa.Presentation.APL.RenderDocument";

/// A `RenderDocument` directive with a minimal document and a fresh token.
pub fn new_render_directive() -> Value {
    json!({
        "type": RENDER_DOCUMENT,
        "token": Uuid::new_v4().to_string(),
        "document": {
            "type": "APL",
            "version": "2023.2",
            "mainTemplate": {
                "parameters": ["payload"],
                "items": [
                    {
                        "type": "Container",
                        "items": [
                            {
                                "type": "Text",
                                "text": "${payload.helloWorld.text}",
                                "textAlign": "center"
                            }
                        ]
                    }
                ]
            }
        },
        "datasources": {
            "helloWorld": {
                "text": "Hello, World!"
            }
        }
    })
}

/// [`new_render_directive`] as text indented with four spaces, ready to
/// insert into an empty editor.
pub fn new_render_directive_text() -> Result<String, AppError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    new_render_directive()
        .serialize(&mut serializer)
        .map_err(|e| AppError::Render(e.to_string()))?;
    String::from_utf8(out).map_err(|e| AppError::Render(e.to_string()))
}
