//! Map a structural component path back to a line range in the source text.

use std::path::Path;

use serde::Serialize;

use super::parser::parse;

/// Zero-indexed, end-exclusive line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    pub start_line: usize,
    pub end_line: usize,
}

/// Locate `path` (e.g. `mainTemplate/items/0`) inside the `document` member of
/// the payload file whose text is `text`.
///
/// Every segment but the last is descended into; the last one names the
/// member or element whose span is returned. Any failure along the way
/// (unparsable text, missing segment, missing position) yields `None`.
pub fn locate(text: &str, path: &str) -> Option<SourceRange> {
    let root = match parse(text) {
        Ok(root) => root,
        Err(e) => {
            tracing::debug!("cannot locate {path}: {e}");
            return None;
        }
    };

    let segments: Vec<&str> = path.split('/').collect();
    let (last, parents) = segments.split_last()?;

    let mut node = root.get("document")?;
    for segment in parents {
        node = node.get(segment)?;
    }
    let span = node.position(last)?;

    Some(SourceRange {
        start_line: span.first_line.saturating_sub(1),
        end_line: span.last_line,
    })
}

/// Like [`locate`], reading the text from `file` first.
///
/// Always reads the file on disk: re-serializing the in-memory payload would
/// not reproduce the user's formatting.
pub fn locate_in_file(file: &Path, path: &str) -> Option<SourceRange> {
    match std::fs::read_to_string(file) {
        Ok(text) => locate(&text, path),
        Err(e) => {
            tracing::debug!("cannot read {}: {e}", file.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"{
  "document": {
    "type": "APL",
    "mainTemplate": {
      "items": [
        {
          "type": "Container",
          "item": {
            "type": "Text",
            "text": "hello"
          }
        },
        {
          "type": "Image"
        }
      ]
    }
  },
  "datasources": {}
}"#;

    #[test]
    fn locates_main_template() {
        assert_eq!(
            locate(SOURCE, "mainTemplate"),
            Some(SourceRange {
                start_line: 3,
                end_line: 17,
            })
        );
    }

    #[test]
    fn locates_array_elements() {
        assert_eq!(
            locate(SOURCE, "mainTemplate/items/0"),
            Some(SourceRange {
                start_line: 5,
                end_line: 12,
            })
        );
        assert_eq!(
            locate(SOURCE, "mainTemplate/items/1"),
            Some(SourceRange {
                start_line: 12,
                end_line: 15,
            })
        );
    }

    #[test]
    fn locates_singular_item() {
        assert_eq!(
            locate(SOURCE, "mainTemplate/items/0/item"),
            Some(SourceRange {
                start_line: 7,
                end_line: 11,
            })
        );
    }

    #[test]
    fn missing_segments_yield_none() {
        assert_eq!(locate(SOURCE, "mainTemplate/items/7"), None);
        assert_eq!(locate(SOURCE, "mainTemplate/nothing/0"), None);
        assert_eq!(locate(SOURCE, "layouts"), None);
        assert_eq!(locate(SOURCE, ""), None);
    }

    #[test]
    fn unparsable_text_yields_none() {
        assert_eq!(locate("{ \"document\": ", "mainTemplate"), None);
    }

    #[test]
    fn text_without_document_yields_none() {
        assert_eq!(locate(r#"{"mainTemplate": {}}"#, "mainTemplate"), None);
    }

    #[test]
    fn missing_file_yields_none() {
        assert_eq!(
            locate_in_file(Path::new("/nonexistent/apl/document.json"), "mainTemplate"),
            None
        );
    }

    #[test]
    fn reads_text_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("document.json");
        std::fs::write(&file, SOURCE).expect("write");
        assert_eq!(
            locate_in_file(&file, "mainTemplate/items/0/item"),
            locate(SOURCE, "mainTemplate/items/0/item")
        );
    }
}
