//! Postman collection import
//!
//! Flattens a Postman v2 document (nested folders, `{{variable}}` templates)
//! into a single internal [`Collection`].

use serde_json::Value;

use crate::constants::DEFAULT_IMPORT_NAME;
use crate::models::{AuthType, Collection, Header, HttpMethod, Request, ScanType};
use crate::storage::timestamp_id;

const FOLDER_SEPARATOR: &str = " / ";

/// `{{key}}` → value table from the document's top-level `variable` list
#[derive(Clone, Debug, Default)]
pub struct Variables {
    entries: Vec<(String, String)>,
}

impl Variables {
    pub fn from_document(document: &Value) -> Self {
        let mut entries = Vec::new();
        if let Some(vars) = document.get("variable").and_then(|v| v.as_array()) {
            for var in vars {
                let Some(key) = var.get("key").and_then(|k| k.as_str()) else {
                    continue;
                };
                let value = match var.get("value") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => continue,
                    Some(other) => other.to_string(),
                };
                entries.push((key.to_string(), value));
            }
        }
        Variables { entries }
    }

    /// Substitutes {{variable}} patterns in text. Unknown names stay as written.
    pub fn substitute(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (key, value) in &self.entries {
            let pattern = format!("{{{{{}}}}}", key);
            result = result.replace(&pattern, value);
        }
        result
    }
}

/// A Postman document has a non-null `info` and an array `item`
pub fn is_postman_collection(document: &Value) -> bool {
    present(document, "info").is_some() && document.get("item").map(Value::is_array).unwrap_or(false)
}

/// Field lookup where JSON `null` counts as absent
fn present<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

/// Convert a Postman document into one collection holding every leaf request
pub fn convert_postman(document: &Value) -> Collection {
    let variables = Variables::from_document(document);
    let collection_id = timestamp_id();

    let mut requests = Vec::new();
    if let Some(items) = document.get("item").and_then(|i| i.as_array()) {
        collect_items(items, "", &variables, &mut requests);
    }

    // Leaves converted in the same millisecond would share an id otherwise
    for (offset, request) in requests.iter_mut().enumerate() {
        request.id = Some(collection_id + offset as i64);
        request.collection_id = Some(collection_id);
    }

    let name = document
        .get("info")
        .and_then(|info| info.get("name"))
        .and_then(|n| n.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_IMPORT_NAME);

    tracing::info!(name, requests = requests.len(), "Converted Postman collection");

    Collection {
        id: collection_id,
        name: name.to_string(),
        requests,
    }
}

fn collect_items(items: &[Value], prefix: &str, variables: &Variables, out: &mut Vec<Request>) {
    for item in items {
        let name = item.get("name").and_then(|n| n.as_str()).unwrap_or("");

        if let Some(request) = present(item, "request") {
            out.push(convert_request(request, format!("{}{}", prefix, name), variables));
        } else if let Some(children) = item.get("item").and_then(|i| i.as_array()) {
            let folder = format!("{}{}{}", prefix, name, FOLDER_SEPARATOR);
            collect_items(children, &folder, variables, out);
        }
    }
}

fn convert_request(request: &Value, name: String, variables: &Variables) -> Request {
    let method = request
        .get("method")
        .and_then(|m| m.as_str())
        .map(|m| {
            HttpMethod::parse(m).unwrap_or_else(|| {
                tracing::warn!(method = m, "Unsupported method in import, using GET");
                HttpMethod::GET
            })
        })
        .unwrap_or(HttpMethod::GET);

    let url = match request.get("url") {
        Some(Value::String(raw)) => variables.substitute(raw),
        Some(url) => url
            .get("raw")
            .and_then(|r| r.as_str())
            .map(|raw| variables.substitute(raw))
            .unwrap_or_default(),
        None => String::new(),
    };

    let mut headers: Vec<Header> = request
        .get("header")
        .and_then(|h| h.as_array())
        .map(|list| {
            list.iter()
                .map(|h| {
                    let field = |name: &str| {
                        h.get(name)
                            .and_then(|v| v.as_str())
                            .map(|s| variables.substitute(s))
                            .unwrap_or_default()
                    };
                    Header::new(field("key"), field("value"))
                })
                .collect()
        })
        .unwrap_or_default();
    if headers.is_empty() {
        headers.push(Header::blank());
    }

    let body = request
        .get("body")
        .and_then(|b| b.get("raw"))
        .and_then(|r| r.as_str())
        .map(|raw| variables.substitute(raw))
        .unwrap_or_default();

    Request {
        id: None,
        name: Some(name),
        method,
        url,
        headers,
        body,
        scan_type: ScanType::All,
        collection_id: None,
        auth: AuthType::None,
    }
}
