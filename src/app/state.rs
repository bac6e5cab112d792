//! App state - pure data structure with no I/O logic

use std::collections::HashSet;

use crate::config::Config;
use crate::messages::render::{RenderState, SidebarRow, SidebarRowKind};
use crate::messages::ui_events::{AuthField, HeaderColumn, InputMode, Panel, ResponseTab};
use crate::models::{AuthType, HeaderPairs, Request, Response};
use crate::storage::CollectionStore;

/// What a text prompt is collecting
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptKind {
    NewCollection,
    RenameCollection(i64),
    SaveRequest(i64),
    RenameRequest { collection_id: i64, request_id: i64 },
    ImportPath,
    ExportPath,
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::NewCollection => "Enter collection name",
            PromptKind::RenameCollection(_) => "Enter new collection name",
            PromptKind::SaveRequest(_) => "Enter a name for this request",
            PromptKind::RenameRequest { .. } => "Enter new request name",
            PromptKind::ImportPath => "Import collections from (JSON file)",
            PromptKind::ExportPath => "Export collections to",
        }
    }
}

/// What a yes/no confirmation guards
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmKind {
    DeleteCollection(i64),
    DeleteRequest { collection_id: i64, request_id: i64 },
    ClearHistory,
}

impl ConfirmKind {
    pub fn question(&self) -> &'static str {
        match self {
            ConfirmKind::DeleteCollection(_) => "Delete this collection and all its requests?",
            ConfirmKind::DeleteRequest { .. } => "Delete this request from collection?",
            ConfirmKind::ClearHistory => "Clear the request history?",
        }
    }
}

/// Modal overlay
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Popup {
    Prompt { kind: PromptKind, input: String },
    Confirm(ConfirmKind),
    Notice(String),
}

/// A selectable sidebar line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidebarEntry {
    Collection(i64),
    Request { collection_id: i64, request_id: i64 },
    History(usize),
}

/// Bookkeeping for the send in flight
#[derive(Clone, Debug)]
pub struct PendingSend {
    pub id: u64,
    /// Editor contents at send time, archived to history on success
    pub snapshot: Request,
    pub request_headers: HeaderPairs,
    pub scan: bool,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub config: Config,

    // Request editor
    pub request: Request,
    pub cursor_position: usize,
    pub selected_header: usize,
    pub header_column: HeaderColumn,
    pub auth_field: AuthField,

    // UI state
    pub active_panel: Panel,
    /// Editor tab shown while focus is elsewhere
    pub editor_tab: Panel,
    pub input_mode: InputMode,

    // Response
    pub response: Option<Response>,
    pub response_tab: ResponseTab,
    pub response_scroll: u16,
    pub is_loading: bool,
    pub next_request_id: u64,
    pub pending: Option<PendingSend>,

    // Sidebar
    pub collapsed: HashSet<i64>,
    pub sidebar_selected: usize,

    // Storage (persisted data)
    pub store: CollectionStore,

    // Popups
    pub popup: Option<Popup>,
    pub show_help: bool,
}

impl AppState {
    /// State backed by the records in `config.data_dir`
    pub fn new(config: Config) -> Self {
        let mut store = CollectionStore::open(&config.data_dir);
        if let Err(e) = store.load() {
            tracing::warn!(error = %e, "Some saved state could not be loaded");
        }
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: CollectionStore) -> Self {
        let request = Request::default();
        AppState {
            config,
            cursor_position: request.url.len(),
            request,
            selected_header: 0,
            header_column: HeaderColumn::Key,
            auth_field: AuthField::Token,
            active_panel: Panel::Url,
            editor_tab: Panel::Headers,
            input_mode: InputMode::Normal,
            response: None,
            response_tab: ResponseTab::Body,
            response_scroll: 0,
            is_loading: false,
            next_request_id: 1,
            pending: None,
            collapsed: HashSet::new(),
            sidebar_selected: 0,
            store,
            popup: None,
            show_help: false,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Get the current input field content
    pub fn current_input(&self) -> Option<&str> {
        match self.active_panel {
            Panel::Url => Some(&self.request.url),
            Panel::Body => Some(&self.request.body),
            Panel::Headers => self.request.headers.get(self.selected_header).map(|h| match self.header_column {
                HeaderColumn::Key => h.key.as_str(),
                HeaderColumn::Value => h.value.as_str(),
            }),
            Panel::Auth => match &self.request.auth {
                AuthType::Bearer { token } => Some(token),
                AuthType::Basic { username, password } => match self.auth_field {
                    AuthField::Password => Some(password),
                    _ => Some(username),
                },
                AuthType::None => None,
            },
            _ => None,
        }
    }

    /// Get mutable reference to current input field
    pub fn current_input_mut(&mut self) -> Option<&mut String> {
        match self.active_panel {
            Panel::Url => Some(&mut self.request.url),
            Panel::Body => Some(&mut self.request.body),
            Panel::Headers => {
                let column = self.header_column;
                self.request
                    .headers
                    .get_mut(self.selected_header)
                    .map(|h| match column {
                        HeaderColumn::Key => &mut h.key,
                        HeaderColumn::Value => &mut h.value,
                    })
            }
            Panel::Auth => match &mut self.request.auth {
                AuthType::Bearer { token } => Some(token),
                AuthType::Basic { username, password } => match self.auth_field {
                    AuthField::Password => Some(password),
                    _ => Some(username),
                },
                AuthType::None => None,
            },
            _ => None,
        }
    }

    /// Selectable sidebar lines: collections (with their requests unless
    /// collapsed), then history
    pub fn sidebar_entries(&self) -> Vec<SidebarEntry> {
        let mut entries = Vec::new();
        for coll in self.store.collections() {
            entries.push(SidebarEntry::Collection(coll.id));
            if self.collapsed.contains(&coll.id) {
                continue;
            }
            for req in &coll.requests {
                if let Some(request_id) = req.id {
                    entries.push(SidebarEntry::Request {
                        collection_id: coll.id,
                        request_id,
                    });
                }
            }
        }
        entries.extend((0..self.store.history().len()).map(SidebarEntry::History));
        entries
    }

    pub fn selected_entry(&self) -> Option<SidebarEntry> {
        self.sidebar_entries().get(self.sidebar_selected).copied()
    }

    fn sidebar_rows(&self) -> Vec<SidebarRow> {
        self.sidebar_entries()
            .into_iter()
            .filter_map(|entry| match entry {
                SidebarEntry::Collection(id) => self.store.collection(id).map(|c| SidebarRow {
                    kind: SidebarRowKind::Collection {
                        collapsed: self.collapsed.contains(&id),
                    },
                    label: c.name.clone(),
                    method: None,
                    url: String::new(),
                }),
                SidebarEntry::Request {
                    collection_id,
                    request_id,
                } => self
                    .store
                    .request(collection_id, request_id)
                    .map(|r| SidebarRow {
                        kind: SidebarRowKind::Request,
                        label: r.display_name(),
                        method: Some(r.method),
                        url: r.url.clone(),
                    }),
                SidebarEntry::History(idx) => self.store.history().get(idx).map(|r| SidebarRow {
                    kind: SidebarRowKind::History,
                    label: r.display_name(),
                    method: Some(r.method),
                    url: r.url.clone(),
                }),
            })
            .collect()
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            request: self.request.clone(),
            active_panel: self.active_panel,
            editor_tab: self.editor_tab,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            selected_header: self.selected_header,
            header_column: self.header_column,
            auth_field: self.auth_field,
            response: self.response.clone(),
            response_tab: self.response_tab,
            response_scroll: self.response_scroll,
            is_loading: self.is_loading,
            is_scanning: self.pending.as_ref().map(|p| p.scan).unwrap_or(false),
            sidebar: self.sidebar_rows(),
            sidebar_selected: self.sidebar_selected,
            popup: self.popup.clone(),
            show_help: self.show_help,
            executor: self.config.executor.clone(),
        }
    }
}
