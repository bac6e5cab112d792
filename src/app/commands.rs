//! Command handlers - business logic for processing UI events

use crate::app::state::{ConfirmKind, PendingSend, Popup, PromptKind, SidebarEntry};
use crate::app::AppState;
use crate::args::{build_args, effective_headers};
use crate::constants::EXPORT_FILE_NAME;
use crate::messages::ui_events::{AuthField, HeaderColumn, InputMode, Panel, ResponseTab};
use crate::messages::{ExecutorCommand, ExecutorResponse};
use crate::models::{AuthType, Header, Request};
use crate::output::{completed_response, dispatch_failure_response, executor_failure_response};
use crate::transfer;

impl AppState {
    // ========================
    // Navigation
    // ========================

    pub fn next_panel(&mut self) {
        self.focus(self.active_panel.next());
    }

    pub fn prev_panel(&mut self) {
        self.focus(self.active_panel.prev());
    }

    fn focus(&mut self, panel: Panel) {
        self.active_panel = panel;
        if panel.is_editor_tab() {
            self.editor_tab = panel;
        }
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        if let Some(len) = self.current_input().map(str::len) {
            self.input_mode = InputMode::Editing;
            self.cursor_position = len;
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn move_cursor_left(&mut self) {
        let Some(input) = self.current_input() else {
            return;
        };
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let Some(input) = self.current_input() else {
            return;
        };
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        if let Some(input) = self.current_input_mut() {
            if cursor_pos <= input.len() {
                input.insert(cursor_pos, c);
                self.cursor_position = cursor_pos + c.len_utf8();
            }
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let cursor_pos = self.cursor_position;
        if let Some(input) = self.current_input_mut() {
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    // ========================
    // Request editor
    // ========================

    pub fn cycle_method(&mut self) {
        if !self.is_loading {
            self.request.method = self.request.method.next();
        }
    }

    /// Replace the editor with a blank request
    pub fn new_request(&mut self) {
        self.load_into_editor(Request::blank());
    }

    fn load_into_editor(&mut self, request: Request) {
        self.request = request;
        self.cursor_position = self.request.url.len();
        self.selected_header = 0;
        self.input_mode = InputMode::Normal;
    }

    pub fn next_header(&mut self) {
        if !self.request.headers.is_empty() {
            self.selected_header = (self.selected_header + 1) % self.request.headers.len();
        }
    }

    pub fn prev_header(&mut self) {
        if !self.request.headers.is_empty() {
            self.selected_header = self
                .selected_header
                .checked_sub(1)
                .unwrap_or(self.request.headers.len() - 1);
        }
    }

    pub fn switch_header_column(&mut self) {
        self.header_column = match self.header_column {
            HeaderColumn::Key => HeaderColumn::Value,
            HeaderColumn::Value => HeaderColumn::Key,
        };
        if self.input_mode == InputMode::Editing {
            self.cursor_position = self.current_input().map(str::len).unwrap_or(0);
        }
    }

    pub fn add_header(&mut self) {
        self.request.headers.push(Header::blank());
        self.selected_header = self.request.headers.len() - 1;
        self.header_column = HeaderColumn::Key;
    }

    pub fn delete_header(&mut self) {
        if self.selected_header < self.request.headers.len() {
            self.request.headers.remove(self.selected_header);
            if self.selected_header > 0 && self.selected_header >= self.request.headers.len() {
                self.selected_header -= 1;
            }
        }
    }

    pub fn cycle_auth(&mut self) {
        self.request.auth = match &self.request.auth {
            AuthType::None => AuthType::Bearer {
                token: String::new(),
            },
            AuthType::Bearer { .. } => AuthType::Basic {
                username: String::new(),
                password: String::new(),
            },
            AuthType::Basic { .. } => AuthType::None,
        };
        self.auth_field = match self.request.auth {
            AuthType::Basic { .. } => AuthField::Username,
            _ => AuthField::Token,
        };
    }

    pub fn next_auth_field(&mut self) {
        if matches!(self.request.auth, AuthType::Basic { .. }) {
            self.auth_field = match self.auth_field {
                AuthField::Username => AuthField::Password,
                _ => AuthField::Username,
            };
            self.cursor_position = self.current_input().map(str::len).unwrap_or(0);
        }
    }

    pub fn next_scan_type(&mut self) {
        self.request.scan_type = self.request.scan_type.next();
    }

    pub fn prev_scan_type(&mut self) {
        self.request.scan_type = self.request.scan_type.prev();
    }

    // ========================
    // Response viewer
    // ========================

    pub fn scroll_up(&mut self) {
        self.response_scroll = self.response_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.response_scroll = self.response_scroll.saturating_add(1);
    }

    pub fn next_response_tab(&mut self) {
        self.response_tab = self.response_tab.next();
        self.response_scroll = 0;
    }

    // ========================
    // Request sending
    // ========================

    /// Build the executor command for the editor contents. `None` while a
    /// send is already in flight.
    pub fn prepare_send(&mut self, scan: bool) -> Option<ExecutorCommand> {
        if self.is_loading {
            return None;
        }
        if self.input_mode == InputMode::Editing {
            self.stop_editing();
        }

        let args = build_args(&self.request, scan);
        let id = self.next_id();
        tracing::info!(id, scan, method = self.request.method.as_str(), url = %self.request.url, "Sending request");
        tracing::debug!(id, ?args, "Executor arguments");

        self.pending = Some(PendingSend {
            id,
            snapshot: self.request.clone(),
            request_headers: effective_headers(&self.request),
            scan,
        });
        self.is_loading = true;
        self.response = None;

        Some(ExecutorCommand::Execute { id, args })
    }

    // ========================
    // Response handling
    // ========================

    pub fn handle_response(&mut self, response: ExecutorResponse) {
        // Only process if it matches the pending send
        if self.pending.as_ref().map(|p| p.id) != Some(response.id()) {
            tracing::debug!(id = response.id(), "Ignoring stale executor response");
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        match response {
            ExecutorResponse::Finished { output, .. } => match output.error {
                None => {
                    self.response = Some(completed_response(&output.stdout, pending.request_headers));
                    self.store.push_history(&pending.snapshot);
                    self.response_tab = if pending.scan {
                        ResponseTab::Raw
                    } else {
                        ResponseTab::Body
                    };
                }
                Some(error) => {
                    tracing::warn!(id = pending.id, error = %error, "Executor failed");
                    self.response = Some(executor_failure_response(
                        &error,
                        &output.stdout,
                        &output.stderr,
                        pending.request_headers,
                    ));
                }
            },
            ExecutorResponse::DispatchFailed { message, .. } => {
                tracing::warn!(id = pending.id, error = %message, "Executor dispatch failed");
                self.response = Some(dispatch_failure_response(&message));
            }
        }

        self.is_loading = false;
        self.response_scroll = 0;
    }

    // ========================
    // Sidebar
    // ========================

    pub fn sidebar_up(&mut self) {
        let len = self.sidebar_entries().len();
        if len > 0 {
            self.sidebar_selected = self.sidebar_selected.checked_sub(1).unwrap_or(len - 1);
        }
    }

    pub fn sidebar_down(&mut self) {
        let len = self.sidebar_entries().len();
        if len > 0 {
            self.sidebar_selected = (self.sidebar_selected + 1) % len;
        }
    }

    /// Toggle a collection, or load a saved/history request into the editor
    pub fn sidebar_activate(&mut self) {
        match self.selected_entry() {
            Some(SidebarEntry::Collection(id)) => {
                if !self.collapsed.remove(&id) {
                    self.collapsed.insert(id);
                }
            }
            Some(SidebarEntry::Request {
                collection_id,
                request_id,
            }) => {
                if let Some(req) = self.store.request(collection_id, request_id).cloned() {
                    self.load_into_editor(req);
                    self.active_panel = Panel::Url;
                }
            }
            Some(SidebarEntry::History(idx)) => {
                if let Some(req) = self.store.history().get(idx).cloned() {
                    self.load_into_editor(req);
                    self.active_panel = Panel::Url;
                }
            }
            None => {}
        }
    }

    fn clamp_sidebar(&mut self) {
        let len = self.sidebar_entries().len();
        if self.sidebar_selected >= len {
            self.sidebar_selected = len.saturating_sub(1);
        }
    }

    fn selected_collection_id(&self) -> Option<i64> {
        match self.selected_entry()? {
            SidebarEntry::Collection(id) => Some(id),
            SidebarEntry::Request { collection_id, .. } => Some(collection_id),
            SidebarEntry::History(_) => None,
        }
    }

    // ========================
    // Collections
    // ========================

    pub fn new_collection(&mut self) {
        self.open_prompt(PromptKind::NewCollection, String::new());
    }

    pub fn save_to_collection(&mut self) {
        match self.selected_collection_id() {
            Some(id) => self.open_prompt(PromptKind::SaveRequest(id), String::new()),
            None if self.store.collections().is_empty() => {
                self.popup = Some(Popup::Notice(String::from(
                    "No collections yet. Press 'n' in the sidebar to create one.",
                )));
            }
            None => {
                self.popup = Some(Popup::Notice(String::from(
                    "Select a collection to save the current request into.",
                )));
            }
        }
    }

    pub fn rename_selected(&mut self) {
        match self.selected_entry() {
            Some(SidebarEntry::Collection(id)) => {
                let current = self.store.collection(id).map(|c| c.name.clone()).unwrap_or_default();
                self.open_prompt(PromptKind::RenameCollection(id), current);
            }
            Some(SidebarEntry::Request {
                collection_id,
                request_id,
            }) => {
                let current = self
                    .store
                    .request(collection_id, request_id)
                    .and_then(|r| r.name.clone())
                    .unwrap_or_default();
                self.open_prompt(
                    PromptKind::RenameRequest {
                        collection_id,
                        request_id,
                    },
                    current,
                );
            }
            _ => {}
        }
    }

    pub fn delete_selected(&mut self) {
        let confirm = match self.selected_entry() {
            Some(SidebarEntry::Collection(id)) => ConfirmKind::DeleteCollection(id),
            Some(SidebarEntry::Request {
                collection_id,
                request_id,
            }) => ConfirmKind::DeleteRequest {
                collection_id,
                request_id,
            },
            _ => return,
        };
        self.popup = Some(Popup::Confirm(confirm));
    }

    pub fn clear_history(&mut self) {
        if !self.store.history().is_empty() {
            self.popup = Some(Popup::Confirm(ConfirmKind::ClearHistory));
        }
    }

    // ========================
    // Import / export
    // ========================

    pub fn import_collections(&mut self) {
        self.open_prompt(PromptKind::ImportPath, String::new());
    }

    pub fn export_collections(&mut self) {
        self.open_prompt(PromptKind::ExportPath, EXPORT_FILE_NAME.to_string());
    }

    fn run_import(&mut self, path: &str) {
        match transfer::import_collections(path) {
            Ok(None) => {}
            Ok(Some(imported)) => {
                let count = imported.len();
                tracing::info!(path, count, "Imported collections");
                self.store.extend_collections(imported);
                self.popup = Some(Popup::Notice(format!(
                    "Collections imported successfully ({} collections)",
                    count
                )));
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "Import failed");
                self.popup = Some(Popup::Notice(e.to_string()));
            }
        }
    }

    fn run_export(&mut self, path: &str) {
        let path = if path.trim().is_empty() {
            EXPORT_FILE_NAME
        } else {
            path
        };
        let message = match transfer::export_collections(self.store.collections(), path) {
            Ok(()) => format!(
                "Exported {} collections to {}",
                self.store.collections().len(),
                path.trim()
            ),
            Err(e) => {
                tracing::warn!(path, error = %e, "Export failed");
                format!("Export failed: {:#}", e)
            }
        };
        self.popup = Some(Popup::Notice(message));
    }

    // ========================
    // Popups
    // ========================

    fn open_prompt(&mut self, kind: PromptKind, input: String) {
        self.popup = Some(Popup::Prompt { kind, input });
    }

    pub fn popup_char(&mut self, c: char) {
        if let Some(Popup::Prompt { input, .. }) = &mut self.popup {
            input.push(c);
        }
    }

    pub fn popup_backspace(&mut self) {
        if let Some(Popup::Prompt { input, .. }) = &mut self.popup {
            input.pop();
        }
    }

    pub fn popup_cancel(&mut self) {
        self.popup = None;
    }

    pub fn popup_submit(&mut self) {
        match self.popup.take() {
            Some(Popup::Prompt { kind, input }) => self.submit_prompt(kind, &input),
            Some(Popup::Confirm(kind)) => self.submit_confirm(kind),
            Some(Popup::Notice(_)) | None => {}
        }
        self.clamp_sidebar();
    }

    fn submit_prompt(&mut self, kind: PromptKind, input: &str) {
        match kind {
            PromptKind::NewCollection => {
                self.store.create_collection(input);
            }
            PromptKind::RenameCollection(id) => {
                self.store.rename_collection(id, input);
            }
            PromptKind::SaveRequest(collection_id) => {
                if self.store.add_request(collection_id, &self.request, input).is_some() {
                    self.collapsed.remove(&collection_id);
                }
            }
            PromptKind::RenameRequest {
                collection_id,
                request_id,
            } => {
                self.store.rename_request(collection_id, request_id, input);
            }
            PromptKind::ImportPath => self.run_import(input),
            PromptKind::ExportPath => self.run_export(input),
        }
    }

    fn submit_confirm(&mut self, kind: ConfirmKind) {
        match kind {
            ConfirmKind::DeleteCollection(id) => {
                self.store.delete_collection(id);
                self.collapsed.remove(&id);
            }
            ConfirmKind::DeleteRequest {
                collection_id,
                request_id,
            } => {
                self.store.delete_request(collection_id, request_id);
            }
            ConfirmKind::ClearHistory => self.store.clear_history(),
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::messages::ExecutorOutput;
    use crate::models::HttpMethod;
    use crate::storage::CollectionStore;

    fn app() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path(), "httpcli");
        let state = AppState::with_store(config, CollectionStore::open(dir.path()));
        (dir, state)
    }

    fn finished(id: u64, stdout: &str, error: Option<&str>) -> ExecutorResponse {
        ExecutorResponse::Finished {
            id,
            output: ExecutorOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                error: error.map(str::to_string),
            },
        }
    }

    fn send(state: &mut AppState, scan: bool) -> u64 {
        match state.prepare_send(scan) {
            Some(ExecutorCommand::Execute { id, .. }) => id,
            other => panic!("expected execute command, got {:?}", other),
        }
    }

    #[test]
    fn test_second_send_is_refused_while_loading() {
        let (_dir, mut state) = app();
        send(&mut state, false);
        assert!(state.prepare_send(false).is_none());
    }

    #[test]
    fn test_successful_send_archives_snapshot() {
        let (_dir, mut state) = app();
        state.request.url = "http://x/users".into();
        let id = send(&mut state, false);

        // Edits made while in flight are not archived
        state.request.url = "http://edited".into();
        state.handle_response(finished(id, "Status: 201 Created\nBody:\nok\n", None));

        let response = state.response.as_ref().unwrap();
        assert_eq!(response.status, "201 Created");
        assert_eq!(response.size, "2 bytes");
        assert!(!state.is_loading);
        assert_eq!(state.store.history().len(), 1);
        assert_eq!(state.store.history()[0].url, "http://x/users");
    }

    #[test]
    fn test_scan_switches_to_raw_output() {
        let (_dir, mut state) = app();
        let id = send(&mut state, true);
        state.handle_response(finished(id, "Status: 200 OK\n", None));
        assert_eq!(state.response_tab, ResponseTab::Raw);
    }

    #[test]
    fn test_failures_are_not_archived() {
        let (_dir, mut state) = app();
        let id = send(&mut state, false);
        state.handle_response(finished(id, "", Some("Command failed: httpcli")));
        assert_eq!(state.response.as_ref().unwrap().status, "Error");
        assert!(state.store.history().is_empty());

        let id = send(&mut state, false);
        state.handle_response(ExecutorResponse::DispatchFailed {
            id,
            message: "spawn failed".into(),
        });
        assert_eq!(state.response.as_ref().unwrap().status, "Failed");
        assert!(state.store.history().is_empty());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let (_dir, mut state) = app();
        let id = send(&mut state, false);
        state.handle_response(finished(id + 100, "Status: 200 OK\n", None));
        assert!(state.is_loading);
        assert!(state.response.is_none());
    }

    #[test]
    fn test_save_prompt_copies_editor() {
        let (_dir, mut state) = app();
        state.store.create_collection("C").unwrap();
        state.active_panel = Panel::Sidebar;
        state.sidebar_selected = 0;

        state.save_to_collection();
        for c in "Repos".chars() {
            state.popup_char(c);
        }
        state.popup_submit();

        state.request.method = HttpMethod::PATCH;
        let saved = &state.store.collections()[0].requests[0];
        assert_eq!(saved.name.as_deref(), Some("Repos"));
        assert_eq!(saved.method, HttpMethod::GET);
    }

    #[test]
    fn test_delete_collection_requires_confirmation() {
        let (_dir, mut state) = app();
        state.store.create_collection("C").unwrap();
        state.store.push_history(&Request::default());

        state.delete_selected();
        assert!(matches!(state.popup, Some(Popup::Confirm(ConfirmKind::DeleteCollection(_)))));
        state.popup_cancel();
        assert_eq!(state.store.collections().len(), 1);

        state.delete_selected();
        state.popup_submit();
        assert!(state.store.collections().is_empty());
        assert_eq!(state.store.history().len(), 1);
    }

    #[test]
    fn test_activate_history_loads_copy() {
        let (_dir, mut state) = app();
        let mut req = Request::default();
        req.url = "http://x/history".into();
        state.store.push_history(&req);

        state.sidebar_selected = 0;
        state.sidebar_activate();
        assert_eq!(state.request.url, "http://x/history");

        state.request.url.push_str("/edited");
        assert_eq!(state.store.history()[0].url, "http://x/history");
    }

    #[test]
    fn test_import_failure_shows_notice() {
        let (dir, mut state) = app();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"not": "collections"}"#).unwrap();

        state.run_import(&path.to_string_lossy());
        match &state.popup {
            Some(Popup::Notice(msg)) => assert!(msg.starts_with("Invalid format")),
            other => panic!("expected notice, got {:?}", other),
        }
        assert!(state.store.collections().is_empty());
    }

    #[test]
    fn test_editing_header_cells() {
        let (_dir, mut state) = app();
        state.active_panel = Panel::Headers;
        state.start_editing();
        for c in "Accept".chars() {
            state.enter_char(c);
        }
        state.switch_header_column();
        for c in "json".chars() {
            state.enter_char(c);
        }
        state.delete_char();
        assert_eq!(state.request.headers[0], Header::new("Accept", "jso"));
    }
}
