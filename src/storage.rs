//! Collections and history, mirrored to JSON records on every change

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{COLLECTIONS_KEY, HISTORY_KEY, MAX_HISTORY};
use crate::models::{Collection, Request};

/// Millisecond wall-clock id. Not collision checked.
pub fn timestamp_id() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Owns the collection list and the history log.
///
/// Sequences are replaced rather than edited in place, and everything that
/// enters the store is a fresh copy, so nothing here aliases the live editor.
pub struct CollectionStore {
    collections: Vec<Collection>,
    history: Vec<Request>,
    data_dir: PathBuf,
    /// Records that failed to load and could not be moved aside
    read_only: HashSet<&'static str>,
}

impl CollectionStore {
    /// Store rooted at `data_dir`. Call [`CollectionStore::load`] to read existing records.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        CollectionStore {
            collections: Vec::new(),
            history: Vec::new(),
            data_dir: data_dir.into(),
            read_only: HashSet::new(),
        }
    }

    /// Read both records. A missing record is an empty one.
    ///
    /// Records load independently. One that cannot be read is moved aside to
    /// `<record>.json.corrupt` and starts empty; if it cannot be moved, it is
    /// never written this session. Returns the first failure.
    pub fn load(&mut self) -> Result<()> {
        let (mut history, history_err) = or_default(self.load_record::<Vec<Request>>(HISTORY_KEY));
        let (collections, collections_err) = or_default(self.load_record::<Vec<Collection>>(COLLECTIONS_KEY));

        history.truncate(MAX_HISTORY);
        self.history = history;
        self.collections = collections;
        tracing::info!(
            collections = self.collections.len(),
            history = self.history.len(),
            "Loaded saved state"
        );

        match history_err.or(collections_err) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn save_collections(&self) -> Result<()> {
        self.ensure_writable(COLLECTIONS_KEY)?;
        write_record(&self.data_dir, &self.record_path(COLLECTIONS_KEY), &self.collections)
    }

    pub fn save_history(&self) -> Result<()> {
        self.ensure_writable(HISTORY_KEY)?;
        write_record(&self.data_dir, &self.record_path(HISTORY_KEY), &self.history)
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Newest first
    pub fn history(&self) -> &[Request] {
        &self.history
    }

    pub fn collection(&self, id: i64) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn request(&self, collection_id: i64, request_id: i64) -> Option<&Request> {
        self.collection(collection_id)
            .and_then(|c| c.requests.iter().find(|r| r.id == Some(request_id)))
    }

    // ========================
    // Collections
    // ========================

    /// Returns the new collection's id, or `None` for a blank name
    pub fn create_collection(&mut self, name: &str) -> Option<i64> {
        if name.trim().is_empty() {
            return None;
        }
        let id = timestamp_id();
        let mut next = self.collections.clone();
        next.push(Collection::new(id, name));
        self.replace_collections(next);
        Some(id)
    }

    pub fn rename_collection(&mut self, id: i64, name: &str) -> bool {
        if name.trim().is_empty() || self.collection(id).is_none() {
            return false;
        }
        let next = self
            .collections
            .iter()
            .map(|c| {
                if c.id == id {
                    Collection {
                        name: name.to_string(),
                        ..c.clone()
                    }
                } else {
                    c.clone()
                }
            })
            .collect();
        self.replace_collections(next);
        true
    }

    /// Removes the collection and every request in it. History is untouched.
    pub fn delete_collection(&mut self, id: i64) -> bool {
        if self.collection(id).is_none() {
            return false;
        }
        let next = self
            .collections
            .iter()
            .filter(|c| c.id != id)
            .cloned()
            .collect();
        self.replace_collections(next);
        true
    }

    /// Save a copy of `request` under `name`. Returns the stored request's id.
    pub fn add_request(&mut self, collection_id: i64, request: &Request, name: &str) -> Option<i64> {
        if name.trim().is_empty() || self.collection(collection_id).is_none() {
            return None;
        }
        let id = timestamp_id();
        let saved = Request {
            id: Some(id),
            name: Some(name.to_string()),
            collection_id: Some(collection_id),
            ..request.clone()
        };
        self.map_requests(collection_id, |requests| {
            let mut next = requests.to_vec();
            next.push(saved.clone());
            next
        });
        Some(id)
    }

    pub fn rename_request(&mut self, collection_id: i64, request_id: i64, name: &str) -> bool {
        if name.trim().is_empty() || self.request(collection_id, request_id).is_none() {
            return false;
        }
        self.map_requests(collection_id, |requests| {
            requests
                .iter()
                .map(|r| {
                    if r.id == Some(request_id) {
                        Request {
                            name: Some(name.to_string()),
                            ..r.clone()
                        }
                    } else {
                        r.clone()
                    }
                })
                .collect()
        });
        true
    }

    pub fn delete_request(&mut self, collection_id: i64, request_id: i64) -> bool {
        if self.request(collection_id, request_id).is_none() {
            return false;
        }
        self.map_requests(collection_id, |requests| {
            requests
                .iter()
                .filter(|r| r.id != Some(request_id))
                .cloned()
                .collect()
        });
        true
    }

    /// Append imported collections after the existing ones. Requests that
    /// arrive without an id get one so they stay addressable.
    pub fn extend_collections(&mut self, imported: Vec<Collection>) {
        let base = timestamp_id();
        let mut next = self.collections.clone();
        next.extend(imported.into_iter().map(|mut coll| {
            for (offset, req) in coll.requests.iter_mut().enumerate() {
                if req.id.is_none() {
                    req.id = Some(base + offset as i64 + 1);
                }
                req.collection_id.get_or_insert(coll.id);
            }
            coll
        }));
        self.replace_collections(next);
    }

    // ========================
    // History
    // ========================

    /// Prepend a snapshot of `request`, keeping the newest [`MAX_HISTORY`] entries
    pub fn push_history(&mut self, request: &Request) {
        let snapshot = Request {
            id: Some(timestamp_id()),
            ..request.clone()
        };
        let next = std::iter::once(snapshot)
            .chain(self.history.iter().cloned())
            .take(MAX_HISTORY)
            .collect();
        self.history = next;
        self.persist_history();
    }

    pub fn clear_history(&mut self) {
        self.history = Vec::new();
        self.persist_history();
    }

    // ========================
    // Write-through
    // ========================

    fn map_requests<F>(&mut self, collection_id: i64, f: F)
    where
        F: Fn(&[Request]) -> Vec<Request>,
    {
        let next = self
            .collections
            .iter()
            .map(|c| {
                if c.id == collection_id {
                    Collection {
                        id: c.id,
                        name: c.name.clone(),
                        requests: f(&c.requests),
                    }
                } else {
                    c.clone()
                }
            })
            .collect();
        self.replace_collections(next);
    }

    fn replace_collections(&mut self, next: Vec<Collection>) {
        self.collections = next;
        if let Err(e) = self.save_collections() {
            tracing::warn!(error = %e, "Failed to persist collections");
        }
    }

    fn persist_history(&self) {
        if let Err(e) = self.save_history() {
            tracing::warn!(error = %e, "Failed to persist history");
        }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    fn load_record<T: DeserializeOwned + Default>(&mut self, key: &'static str) -> Result<T> {
        let path = self.record_path(key);
        let err = match read_record(&path) {
            Ok(value) => return Ok(value.unwrap_or_default()),
            Err(e) => e,
        };

        let backup = path.with_extension("json.corrupt");
        match fs::rename(&path, &backup) {
            Ok(()) => {
                tracing::warn!(error = %err, backup = %backup.display(), "Moved unreadable record aside");
            }
            Err(rename_err) => {
                tracing::error!(
                    error = %err,
                    rename_error = %rename_err,
                    path = %path.display(),
                    "Unreadable record left in place, it will not be written"
                );
                self.read_only.insert(key);
            }
        }
        Err(err)
    }

    fn ensure_writable(&self, key: &str) -> Result<()> {
        if self.read_only.contains(key) {
            anyhow::bail!("`{}` could not be loaded, refusing to overwrite it", self.record_path(key).display());
        }
        Ok(())
    }
}

fn or_default<T: Default>(result: Result<T>) -> (T, Option<anyhow::Error>) {
    match result {
        Ok(value) => (value, None),
        Err(e) => (T::default(), Some(e)),
    }
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read `{}`", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse `{}`", path.display()))?;
    Ok(Some(value))
}

fn write_record<T: Serialize + ?Sized>(dir: &Path, path: &Path, value: &T) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let content = serde_json::to_string(value)?;
    fs::write(path, content).with_context(|| format!("Failed to write `{}`", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, ScanType};

    fn store() -> (tempfile::TempDir, CollectionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CollectionStore::open(dir.path());
        (dir, store)
    }

    #[test]
    fn test_create_rename_delete_collection() {
        let (_dir, mut store) = store();
        assert_eq!(store.create_collection("   "), None);

        let id = store.create_collection("Users API").unwrap();
        assert!(store.rename_collection(id, "Accounts"));
        assert!(!store.rename_collection(id, ""));
        assert_eq!(store.collection(id).unwrap().name, "Accounts");

        assert!(store.delete_collection(id));
        assert!(store.collections().is_empty());
        assert!(!store.delete_collection(id));
    }

    #[test]
    fn test_saved_request_does_not_alias_editor() {
        let (_dir, mut store) = store();
        let coll = store.create_collection("C").unwrap();

        let mut live = Request::default();
        live.url = "http://x/users".into();
        let req_id = store.add_request(coll, &live, "List users").unwrap();

        live.url = "http://changed".into();
        live.method = HttpMethod::DELETE;
        live.headers[0].key = "X-Mutated".into();

        let saved = store.request(coll, req_id).unwrap();
        assert_eq!(saved.url, "http://x/users");
        assert_eq!(saved.method, HttpMethod::GET);
        assert_eq!(saved.name.as_deref(), Some("List users"));
        assert_eq!(saved.collection_id, Some(coll));
        assert!(saved.headers[0].key.is_empty());
    }

    #[test]
    fn test_rename_and_delete_request() {
        let (_dir, mut store) = store();
        let coll = store.create_collection("C").unwrap();
        let req_id = store.add_request(coll, &Request::default(), "a").unwrap();

        assert!(store.rename_request(coll, req_id, "b"));
        assert_eq!(store.request(coll, req_id).unwrap().name.as_deref(), Some("b"));

        assert!(store.delete_request(coll, req_id));
        assert!(store.collection(coll).unwrap().requests.is_empty());
        assert!(!store.rename_request(coll, req_id, "c"));
    }

    #[test]
    fn test_history_is_capped_newest_first() {
        let (_dir, mut store) = store();
        for i in 0..MAX_HISTORY + 7 {
            let mut req = Request::default();
            req.url = format!("http://x/{}", i);
            store.push_history(&req);
        }
        assert_eq!(store.history().len(), MAX_HISTORY);
        assert_eq!(store.history()[0].url, format!("http://x/{}", MAX_HISTORY + 6));
        assert_eq!(store.history()[MAX_HISTORY - 1].url, "http://x/7");
    }

    #[test]
    fn test_delete_collection_leaves_history() {
        let (_dir, mut store) = store();
        let coll = store.create_collection("C").unwrap();
        let req = Request::default();
        store.add_request(coll, &req, "saved").unwrap();
        store.push_history(&req);

        store.delete_collection(coll);
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].url, req.url);
    }

    #[test]
    fn test_records_round_trip_through_disk() {
        let (dir, mut store) = store();
        let coll = store.create_collection("Saved").unwrap();
        let mut req = Request::default();
        req.scan_type = ScanType::Xss;
        store.add_request(coll, &req, "xss probe").unwrap();
        store.push_history(&req);

        assert!(dir.path().join("http_cli_collections_v3.json").exists());
        assert!(dir.path().join("http_cli_history.json").exists());

        let mut reloaded = CollectionStore::open(dir.path());
        reloaded.load().unwrap();
        assert_eq!(reloaded.collections(), store.collections());
        assert_eq!(reloaded.history(), store.history());
        assert_eq!(reloaded.collections()[0].requests[0].scan_type, ScanType::Xss);
    }

    #[test]
    fn test_load_missing_records_is_empty() {
        let (_dir, mut store) = store();
        store.load().unwrap();
        assert!(store.collections().is_empty());
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_load_rejects_corrupt_record() {
        let (dir, mut store) = store();
        fs::write(dir.path().join("http_cli_history.json"), "{not json").unwrap();
        assert!(store.load().is_err());
        assert!(store.history().is_empty());

        let backup = dir.path().join("http_cli_history.json.corrupt");
        assert_eq!(fs::read_to_string(backup).unwrap(), "{not json");
    }

    #[test]
    fn test_corrupt_history_keeps_collections() {
        let (dir, mut store) = store();
        store.create_collection("Precious").unwrap();
        fs::write(dir.path().join("http_cli_history.json"), "{corrupt").unwrap();

        let mut reopened = CollectionStore::open(dir.path());
        assert!(reopened.load().is_err());
        assert_eq!(reopened.collections().len(), 1);

        reopened.create_collection("New").unwrap();
        let mut check = CollectionStore::open(dir.path());
        check.load().unwrap();
        let names: Vec<_> = check.collections().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Precious", "New"]);
    }

    #[test]
    fn test_corrupt_collections_keeps_history() {
        let (dir, mut store) = store();
        let mut req = Request::default();
        req.url = "http://x/kept".into();
        store.push_history(&req);
        fs::write(dir.path().join("http_cli_collections_v3.json"), "[{\"id\":").unwrap();

        let mut reopened = CollectionStore::open(dir.path());
        assert!(reopened.load().is_err());
        assert!(reopened.collections().is_empty());
        assert_eq!(reopened.history()[0].url, "http://x/kept");

        // Later writes go to a fresh record, the bad one survives as a backup
        reopened.create_collection("After").unwrap();
        let backup = dir.path().join("http_cli_collections_v3.json.corrupt");
        assert_eq!(fs::read_to_string(backup).unwrap(), "[{\"id\":");
        let history = fs::read_to_string(dir.path().join("http_cli_history.json")).unwrap();
        assert!(history.contains("http://x/kept"));
    }

    #[test]
    fn test_unmovable_record_is_never_written() {
        let (dir, mut store) = store();
        let history = dir.path().join("http_cli_history.json");
        fs::write(&history, "{corrupt").unwrap();
        store.read_only.insert(HISTORY_KEY);

        store.push_history(&Request::default());
        assert!(store.save_history().is_err());
        assert_eq!(fs::read_to_string(&history).unwrap(), "{corrupt");

        // The other record is unaffected
        store.create_collection("C").unwrap();
        assert!(dir.path().join("http_cli_collections_v3.json").exists());
    }

    #[test]
    fn test_clear_history() {
        let (_dir, mut store) = store();
        store.push_history(&Request::default());
        store.clear_history();
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_imported_requests_get_ids() {
        let (_dir, mut store) = store();
        let mut imported = Collection::new(7, "Imported");
        imported.requests.push(Request::default());
        imported.requests.push(Request {
            id: Some(3),
            ..Request::default()
        });
        store.extend_collections(vec![imported]);

        let requests = &store.collection(7).unwrap().requests;
        assert!(requests[0].id.is_some());
        assert_eq!(requests[1].id, Some(3));
        assert!(requests.iter().all(|r| r.collection_id == Some(7)));
    }
}
