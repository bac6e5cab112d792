//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::state::Popup;

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Panel navigation
    NextPanel,
    PrevPanel,
    ScrollUp,
    ScrollDown,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Newline,
    Backspace,
    CursorLeft,
    CursorRight,

    // Request actions
    SendRequest,
    SendScan,
    CycleMethod,
    NewRequest,

    // Headers
    NextHeader,
    PrevHeader,
    SwitchHeaderColumn,
    AddHeader,
    DeleteHeader,

    // Auth
    CycleAuth,
    NextAuthField,

    // Scan settings
    NextScanType,
    PrevScanType,

    // Response
    NextResponseTab,

    // Sidebar (collections + history)
    SidebarUp,
    SidebarDown,
    SidebarActivate,
    NewCollection,
    SaveToCollection,
    RenameSelected,
    DeleteSelected,
    ClearHistory,

    // Import / export
    ImportCollections,
    ExportCollections,

    // Popups
    PopupChar(char),
    PopupBackspace,
    PopupSubmit,
    PopupCancel,
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Active panel in the UI (needed for context-aware event mapping)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Panel {
    Url,
    Auth,
    Headers,
    Body,
    Scan,
    Response,
    Sidebar,
}

impl Panel {
    pub fn next(&self) -> Panel {
        match self {
            Panel::Url => Panel::Auth,
            Panel::Auth => Panel::Headers,
            Panel::Headers => Panel::Body,
            Panel::Body => Panel::Scan,
            Panel::Scan => Panel::Response,
            Panel::Response => Panel::Sidebar,
            Panel::Sidebar => Panel::Url,
        }
    }

    pub fn prev(&self) -> Panel {
        match self {
            Panel::Url => Panel::Sidebar,
            Panel::Auth => Panel::Url,
            Panel::Headers => Panel::Auth,
            Panel::Body => Panel::Headers,
            Panel::Scan => Panel::Body,
            Panel::Response => Panel::Scan,
            Panel::Sidebar => Panel::Response,
        }
    }

    /// Whether this panel is one of the request editor tabs
    pub fn is_editor_tab(&self) -> bool {
        matches!(self, Panel::Auth | Panel::Headers | Panel::Body | Panel::Scan)
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Auth editing field
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AuthField {
    Token,
    Username,
    Password,
}

/// Header row column being edited
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HeaderColumn {
    Key,
    Value,
}

/// Response viewer tab
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ResponseTab {
    #[default]
    Body,
    Headers,
    Raw,
}

impl ResponseTab {
    pub fn next(&self) -> ResponseTab {
        match self {
            ResponseTab::Body => ResponseTab::Headers,
            ResponseTab::Headers => ResponseTab::Raw,
            ResponseTab::Raw => ResponseTab::Body,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ResponseTab::Body => 0,
            ResponseTab::Headers => 1,
            ResponseTab::Raw => 2,
        }
    }
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_panel: Panel,
    input_mode: InputMode,
    show_help: bool,
    popup: Option<&Popup>,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    // Handle popups first
    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if let Some(popup) = popup {
        return popup_keys(key, popup);
    }

    // File menu shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) && input_mode == InputMode::Normal {
        return match key.code {
            KeyCode::Char('n') => Some(UiEvent::NewRequest),
            KeyCode::Char('o') => Some(UiEvent::ImportCollections),
            KeyCode::Char('e') => Some(UiEvent::ExportCollections),
            _ => None,
        };
    }

    match input_mode {
        InputMode::Normal => normal_keys(key, active_panel),
        InputMode::Editing => editing_keys(key, active_panel),
    }
}

fn popup_keys(key: KeyEvent, popup: &Popup) -> Option<UiEvent> {
    match popup {
        Popup::Prompt { .. } => match key.code {
            KeyCode::Esc => Some(UiEvent::PopupCancel),
            KeyCode::Enter => Some(UiEvent::PopupSubmit),
            KeyCode::Backspace => Some(UiEvent::PopupBackspace),
            KeyCode::Char(c) => Some(UiEvent::PopupChar(c)),
            _ => None,
        },
        Popup::Confirm(_) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(UiEvent::PopupSubmit),
            _ => Some(UiEvent::PopupCancel),
        },
        Popup::Notice(_) => Some(UiEvent::PopupCancel),
    }
}

fn normal_keys(key: KeyEvent, active_panel: Panel) -> Option<UiEvent> {
    // Global keys
    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        KeyCode::Tab => return Some(UiEvent::NextPanel),
        KeyCode::BackTab => return Some(UiEvent::PrevPanel),
        KeyCode::Char('s') => return Some(UiEvent::SendRequest),
        KeyCode::Char('x') => return Some(UiEvent::SendScan),
        KeyCode::Char('m') => return Some(UiEvent::CycleMethod),
        _ => {}
    }

    match active_panel {
        Panel::Url | Panel::Body => match key.code {
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
            _ => None,
        },
        Panel::Headers => match key.code {
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
            KeyCode::Up => Some(UiEvent::PrevHeader),
            KeyCode::Down => Some(UiEvent::NextHeader),
            KeyCode::Left | KeyCode::Right => Some(UiEvent::SwitchHeaderColumn),
            KeyCode::Char('a') => Some(UiEvent::AddHeader),
            KeyCode::Char('d') => Some(UiEvent::DeleteHeader),
            _ => None,
        },
        Panel::Auth => match key.code {
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
            KeyCode::Char('t') => Some(UiEvent::CycleAuth),
            KeyCode::Up | KeyCode::Down => Some(UiEvent::NextAuthField),
            _ => None,
        },
        Panel::Scan => match key.code {
            KeyCode::Char('t') | KeyCode::Right | KeyCode::Down => Some(UiEvent::NextScanType),
            KeyCode::Left | KeyCode::Up => Some(UiEvent::PrevScanType),
            _ => None,
        },
        Panel::Response => match key.code {
            KeyCode::Up => Some(UiEvent::ScrollUp),
            KeyCode::Down => Some(UiEvent::ScrollDown),
            KeyCode::Char('r') => Some(UiEvent::NextResponseTab),
            _ => None,
        },
        Panel::Sidebar => match key.code {
            KeyCode::Up => Some(UiEvent::SidebarUp),
            KeyCode::Down => Some(UiEvent::SidebarDown),
            KeyCode::Enter => Some(UiEvent::SidebarActivate),
            KeyCode::Char('n') => Some(UiEvent::NewCollection),
            KeyCode::Char('a') => Some(UiEvent::SaveToCollection),
            KeyCode::Char('R') => Some(UiEvent::RenameSelected),
            KeyCode::Char('D') => Some(UiEvent::DeleteSelected),
            KeyCode::Char('C') => Some(UiEvent::ClearHistory),
            KeyCode::Char('i') => Some(UiEvent::ImportCollections),
            KeyCode::Char('o') => Some(UiEvent::ExportCollections),
            _ => None,
        },
    }
}

fn editing_keys(key: KeyEvent, active_panel: Panel) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        KeyCode::Tab if active_panel == Panel::Auth => Some(UiEvent::NextAuthField),
        KeyCode::Tab if active_panel == Panel::Headers => Some(UiEvent::SwitchHeaderColumn),
        KeyCode::Enter => match active_panel {
            Panel::Url => Some(UiEvent::SendRequest),
            Panel::Body => Some(UiEvent::Newline),
            _ => Some(UiEvent::StopEditing),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_panel_cycle_round_trips() {
        let mut panel = Panel::Url;
        for _ in 0..7 {
            assert_eq!(panel.next().prev(), panel);
            panel = panel.next();
        }
        assert_eq!(panel, Panel::Url);
    }

    #[test]
    fn test_prompt_captures_characters() {
        let popup = Popup::Prompt {
            kind: crate::app::state::PromptKind::NewCollection,
            input: String::new(),
        };
        let event = key_to_ui_event(press(KeyCode::Char('q')), Panel::Sidebar, InputMode::Normal, false, Some(&popup));
        assert_eq!(event, Some(UiEvent::PopupChar('q')));
    }

    #[test]
    fn test_body_enter_inserts_newline() {
        let event = key_to_ui_event(press(KeyCode::Enter), Panel::Body, InputMode::Editing, false, None);
        assert_eq!(event, Some(UiEvent::Newline));
        let event = key_to_ui_event(press(KeyCode::Enter), Panel::Url, InputMode::Editing, false, None);
        assert_eq!(event, Some(UiEvent::SendRequest));
    }

    #[test]
    fn test_ctrl_shortcuts() {
        let key = KeyEvent::new(KeyCode::Char('o'), KeyModifiers::CONTROL);
        assert_eq!(
            key_to_ui_event(key, Panel::Url, InputMode::Normal, false, None),
            Some(UiEvent::ImportCollections)
        );
    }
}
