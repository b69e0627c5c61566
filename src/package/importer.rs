//! Merge locally referenced packages into an APL document.
//!
//! # Algorithm
//! 1. Validate `document.import`; anything that is not a list of
//!    `{ name, version, source? }` entries leaves the payload untouched.
//! 2. Entries with no source or an `http(s)://` source are kept verbatim.
//! 3. Local sources are resolved against the document directory. A missing
//!    file keeps its entry verbatim; an unreadable or invalid one fails the
//!    whole call.
//! 4. Every object-valued top-level section of a loaded package except
//!    `mainTemplate` is deep-merged beneath the document's own section, so the
//!    document wins on every conflicting key.
//! 5. Inflated entries are dropped from `import`; the renderer would otherwise
//!    try (and fail) to fetch them a second time.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::LocalPackageImportError;
use crate::json::{deep_merge, JsonType};
use crate::models::{AplPayload, PackageImport, PackageSource};

/// Top-level document key that is never taken from a package.
const MAIN_TEMPLATE: &str = "mainTemplate";

/// Inflate every local package referenced by `payload.document.import`.
///
/// `base_dir` is the directory of the previewed file. The input payload is
/// never modified; on error the caller still holds it unchanged.
pub fn inflate(base_dir: &Path, payload: &AplPayload) -> Result<AplPayload, LocalPackageImportError> {
    let Some(import_value) = payload.document.get("import") else {
        return Ok(payload.clone());
    };
    let imports = match PackageImport::parse_list(import_value) {
        Ok(imports) => imports,
        Err(e) => {
            tracing::debug!("import list not inflated: {e}");
            return Ok(payload.clone());
        }
    };
    let Some(raw_entries) = import_value.as_array() else {
        return Ok(payload.clone());
    };

    let mut document = payload.document.clone();
    let mut retained = Vec::with_capacity(raw_entries.len());

    for (import, raw) in imports.iter().zip(raw_entries) {
        let PackageSource::Local(source) = import.classify() else {
            retained.push(raw.clone());
            continue;
        };

        let path = resolve_source(base_dir, &source);
        match load_local_package(&path)? {
            Some(package) => {
                merge_package(&mut document, &package);
                tracing::info!(
                    package = %import.name,
                    version = %import.version,
                    path = %path.display(),
                    "inflated local package"
                );
            }
            None => {
                tracing::warn!(
                    package = %import.name,
                    path = %path.display(),
                    "local package not found; keeping import entry"
                );
                retained.push(raw.clone());
            }
        }
    }

    document.insert("import".to_string(), Value::Array(retained));
    Ok(AplPayload {
        document,
        datasources: payload.datasources.clone(),
    })
}

/// Resolve a package `source` against the document directory.
///
/// Absolute sources are used as-is and a leading `~/` expands to the user's
/// home directory.
fn resolve_source(base_dir: &Path, source: &str) -> PathBuf {
    if let Some(rest) = source.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    base_dir.join(source)
}

/// Load a package file. `Ok(None)` means the file does not exist.
fn load_local_package(path: &Path) -> Result<Option<JsonType>, LocalPackageImportError> {
    if !path.exists() {
        return Ok(None);
    }

    let fail = |reason: String| LocalPackageImportError {
        path: path.to_path_buf(),
        reason,
    };

    let text = std::fs::read_to_string(path).map_err(|e| fail(format!("cannot read file: {e}")))?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(package)) => Ok(Some(package)),
        Ok(_) => Err(fail("package root is not a JSON object".to_string())),
        Err(e) => Err(fail(format!("cannot parse JSON: {e}"))),
    }
}

fn merge_package(document: &mut JsonType, package: &JsonType) {
    for (key, package_value) in package {
        if key == MAIN_TEMPLATE || !package_value.is_object() {
            continue;
        }
        let merged = match document.get(key) {
            Some(own) => deep_merge(package_value, own),
            None => package_value.clone(),
        };
        document.insert(key.clone(), merged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(document: Value) -> AplPayload {
        AplPayload {
            document: document.as_object().cloned().expect("document object"),
            datasources: JsonType::new(),
        }
    }

    fn local_import() -> Value {
        json!({ "name": "localPackage", "version": "1.0.0", "source": "./local-package.json" })
    }

    fn write_package(dir: &Path, contents: &Value) {
        std::fs::write(
            dir.join("local-package.json"),
            serde_json::to_string(contents).expect("serialize package"),
        )
        .expect("write package");
    }

    #[test]
    fn payload_without_import_is_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = payload(json!({ "mainTemplate": {} }));
        let output = inflate(dir.path(), &input).expect("inflate");
        assert_eq!(output, input);
    }

    #[test]
    fn imports_without_source_are_kept_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = payload(json!({
            "import": [{ "name": "alexa-layouts", "version": "1.5.0" }],
            "mainTemplate": {}
        }));
        let output = inflate(dir.path(), &input).expect("inflate");
        assert_eq!(output, input);
    }

    #[test]
    fn remote_sources_are_kept_and_local_ones_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_package(dir.path(), &json!({}));
        for remote in ["https://example.com", "http://example.com"] {
            let input = payload(json!({
                "import": [
                    local_import(),
                    { "name": "remote-package", "version": "1.0.0", "source": remote }
                ],
                "mainTemplate": {}
            }));
            let output = inflate(dir.path(), &input).expect("inflate");
            assert_eq!(
                output.document["import"],
                json!([{ "name": "remote-package", "version": "1.0.0", "source": remote }])
            );
        }
    }

    #[test]
    fn local_package_is_merged_and_removed_from_import() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_package(dir.path(), &json!({ "layouts": {} }));
        let input = payload(json!({ "import": [local_import()] }));

        let output = inflate(dir.path(), &input).expect("inflate");

        assert_eq!(output, payload(json!({ "import": [], "layouts": {} })));
    }

    #[test]
    fn main_template_is_never_merged() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_package(
            dir.path(),
            &json!({ "mainTemplate": { "parameters": [], "items": [{ "type": "Container" }] } }),
        );
        let input = payload(json!({
            "import": [local_import()],
            "mainTemplate": { "items": [{ "type": "Container" }] }
        }));

        let output = inflate(dir.path(), &input).expect("inflate");

        assert_eq!(
            output.document["mainTemplate"],
            json!({ "items": [{ "type": "Container" }] })
        );
    }

    #[test]
    fn non_object_package_sections_are_not_merged() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_package(dir.path(), &json!({ "version": "1.9", "extensions": ["x"] }));
        let input = payload(json!({ "version": "2022.1", "import": [local_import()] }));

        let output = inflate(dir.path(), &input).expect("inflate");

        assert_eq!(output.document["version"], "2022.1");
        assert!(output.document.get("extensions").is_none());
    }

    #[test]
    fn document_values_win_over_package_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_package(
            dir.path(),
            &json!({
                "layouts": {
                    "CustomLayout": {
                        "parameters": [],
                        "items": [{ "type": "Container", "items": [] }]
                    }
                }
            }),
        );
        let own_layouts = json!({
            "CustomLayout": { "parameters": [], "items": [{ "type": "Text" }] }
        });
        let input = payload(json!({ "import": [local_import()], "layouts": own_layouts }));

        let output = inflate(dir.path(), &input).expect("inflate");

        assert_eq!(output.document["layouts"], own_layouts);
    }

    #[test]
    fn merge_keeps_document_only_nested_keys_and_adds_package_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_package(
            dir.path(),
            &json!({ "styles": { "fromPackage": { "values": [] }, "shared": { "a": 1, "b": 1 } } }),
        );
        let input = payload(json!({
            "import": [local_import()],
            "styles": { "fromDocument": { "values": [] }, "shared": { "a": 2 } }
        }));

        let output = inflate(dir.path(), &input).expect("inflate");

        assert_eq!(
            output.document["styles"],
            json!({
                "fromPackage": { "values": [] },
                "shared": { "a": 2, "b": 1 },
                "fromDocument": { "values": [] }
            })
        );
    }

    #[test]
    fn missing_local_file_keeps_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = payload(json!({ "import": [local_import()], "mainTemplate": {} }));

        let output = inflate(dir.path(), &input).expect("missing file is not an error");

        assert_eq!(output, input);
    }

    #[test]
    fn unreadable_local_file_fails_without_touching_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory exists but cannot be read as a file.
        std::fs::create_dir(dir.path().join("local-package.json")).expect("mkdir");
        let input = payload(json!({ "import": [local_import()], "layouts": { "A": {} } }));
        let before = input.clone();

        let err = inflate(dir.path(), &input).expect_err("unreadable package must fail");

        assert!(err.path.ends_with("local-package.json"));
        assert_eq!(input, before);
    }

    #[test]
    fn invalid_json_package_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("local-package.json"), "{ not json").expect("write");
        let input = payload(json!({ "import": [local_import()] }));

        let err = inflate(dir.path(), &input).expect_err("invalid package must fail");

        assert!(err.reason.contains("parse"), "reason: {}", err.reason);
    }

    #[test]
    fn empty_import_list_becomes_empty_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = payload(json!({ "import": [], "mainTemplate": {} }));
        let output = inflate(dir.path(), &input).expect("inflate");
        assert_eq!(output, input);
    }

    #[test]
    fn malformed_import_list_is_left_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = payload(json!({ "import": [{ "source": "./local-package.json" }] }));
        write_package(dir.path(), &json!({ "layouts": {} }));
        let output = inflate(dir.path(), &input).expect("inflate");
        assert_eq!(output, input);
    }

    #[test]
    fn sources_resolve_relative_to_base_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("packages");
        std::fs::create_dir(&nested).expect("mkdir");
        std::fs::write(nested.join("styles.json"), r#"{"styles":{"s":{}}}"#).expect("write");
        let input = payload(json!({
            "import": [{ "name": "styles", "version": "1.0", "source": "packages/styles.json" }]
        }));

        let output = inflate(dir.path(), &input).expect("inflate");

        assert_eq!(output.document["styles"], json!({ "s": {} }));
        assert_eq!(output.document["import"], json!([]));
    }
}
