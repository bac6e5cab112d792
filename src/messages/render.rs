//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::Popup;
use crate::messages::ui_events::{AuthField, HeaderColumn, InputMode, Panel, ResponseTab};
use crate::models::{HttpMethod, Request, Response};

/// Kind of sidebar line, drives indentation and icons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarRowKind {
    Collection { collapsed: bool },
    Request,
    History,
}

/// One pre-formatted sidebar line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    pub kind: SidebarRowKind,
    pub label: String,
    pub method: Option<HttpMethod>,
    pub url: String,
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Request editor
    pub request: Request,
    pub active_panel: Panel,
    pub editor_tab: Panel,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub selected_header: usize,
    pub header_column: HeaderColumn,
    pub auth_field: AuthField,

    // Response
    pub response: Option<Response>,
    pub response_tab: ResponseTab,
    pub response_scroll: u16,
    pub is_loading: bool,
    pub is_scanning: bool,

    // Sidebar
    pub sidebar: Vec<SidebarRow>,
    pub sidebar_selected: usize,

    // Popups
    pub popup: Option<Popup>,
    pub show_help: bool,

    pub executor: String,
}

impl Default for RenderState {
    fn default() -> Self {
        let request = Request::default();
        RenderState {
            cursor_position: request.url.len(),
            request,
            active_panel: Panel::Url,
            editor_tab: Panel::Headers,
            input_mode: InputMode::Normal,
            selected_header: 0,
            header_column: HeaderColumn::Key,
            auth_field: AuthField::Token,
            response: None,
            response_tab: ResponseTab::Body,
            response_scroll: 0,
            is_loading: false,
            is_scanning: false,
            sidebar: Vec::new(),
            sidebar_selected: 0,
            popup: None,
            show_help: false,
            executor: String::from(crate::constants::DEFAULT_EXECUTOR),
        }
    }
}
