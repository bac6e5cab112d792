//! Collections import and export

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::ImportError;
use crate::models::Collection;
use crate::postman::{convert_postman, is_postman_collection};

/// Read an import file. An empty path means the user backed out.
pub fn read_import_file(path: &str) -> Result<Option<String>, ImportError> {
    let path = path.trim();
    if path.is_empty() {
        return Ok(None);
    }
    let content = fs::read_to_string(expand_home(path))?;
    Ok(Some(content))
}

/// Parse an import document: a Postman collection or our own collections list
pub fn parse_import(content: &str) -> Result<Vec<Collection>, ImportError> {
    let document: Value = serde_json::from_str(content).map_err(ImportError::Parse)?;
    normalize(document)
}

/// Postman documents are converted, anything else must already be a collections list
pub fn normalize(document: Value) -> Result<Vec<Collection>, ImportError> {
    if is_postman_collection(&document) {
        return Ok(vec![convert_postman(&document)]);
    }
    serde_json::from_value(document).map_err(ImportError::Format)
}

/// Read and normalize `path`. `Ok(None)` when cancelled.
pub fn import_collections(path: &str) -> Result<Option<Vec<Collection>>, ImportError> {
    match read_import_file(path)? {
        Some(content) => parse_import(&content).map(Some),
        None => Ok(None),
    }
}

/// Pretty-printed collections document
pub fn export_document(collections: &[Collection]) -> Result<String> {
    Ok(serde_json::to_string_pretty(collections)?)
}

/// Write all collections to `path`
pub fn export_collections(collections: &[Collection], path: &str) -> Result<()> {
    let path = expand_home(path.trim());
    let document = export_document(collections)?;
    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&path, document).with_context(|| format!("Failed to write `{}`", path))?;
    tracing::info!(path = %path, collections = collections.len(), "Exported collections");
    Ok(())
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.to_string_lossy(), rest);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Request;

    #[test]
    fn test_internal_format_passes_through() {
        let content = r#"[{"id": 1, "name": "Mine", "requests": [
            {"id": 2, "name": "a", "method": "PUT", "url": "http://x", "collectionId": 1}
        ]}]"#;
        let collections = parse_import(content).unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].name, "Mine");
        assert_eq!(collections[0].requests[0].collection_id, Some(1));
    }

    #[test]
    fn test_postman_is_converted() {
        let content = r#"{"info": {"name": "P"}, "item": [
            {"name": "Ping", "request": {"url": "http://x/ping"}}
        ]}"#;
        let collections = parse_import(content).unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].name, "P");
    }

    #[test]
    fn test_import_errors() {
        assert!(matches!(parse_import("{oops"), Err(ImportError::Parse(_))));
        assert!(matches!(parse_import(r#"{"hello": 1}"#), Err(ImportError::Format(_))));
        assert!(matches!(parse_import(r#"[{"name": "no id"}]"#), Err(ImportError::Format(_))));
        assert!(matches!(
            import_collections("/definitely/not/here.json"),
            Err(ImportError::Read(_))
        ));
    }

    #[test]
    fn test_empty_path_is_cancellation() {
        assert!(import_collections("  ").unwrap().is_none());
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("collections.json");
        let path = path.to_string_lossy().to_string();

        let mut coll = Collection::new(10, "Exported");
        coll.requests.push(Request {
            id: Some(11),
            name: Some("r".into()),
            collection_id: Some(10),
            ..Request::default()
        });
        export_collections(&[coll.clone()], &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  {"));

        let imported = import_collections(&path).unwrap().unwrap();
        assert_eq!(imported, vec![coll]);
    }
}
