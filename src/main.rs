//! Ghostwire - terminal front end for the httpcli request/scan tool
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Executor Layer (Tokio) - async child process execution

use std::io;
use std::time::Duration;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use ghostwire::app::state::Popup;
use ghostwire::app::{AppActor, AppState};
use ghostwire::config::Config;
use ghostwire::constants::{APP_NAME, APP_VERSION, LOG_FILE_NAME};
use ghostwire::executor::ExecutorActor;
use ghostwire::messages::render::{SidebarRow, SidebarRowKind};
use ghostwire::messages::ui_events::{key_to_ui_event, AuthField, HeaderColumn, InputMode, Panel, ResponseTab};
use ghostwire::messages::{ExecutorCommand, ExecutorResponse, RenderState, UiEvent};
use ghostwire::models::{AuthType, ScanType};
use ghostwire::ui::{self, body_lines, centered_rect, header_lines, method_color, panel_block, status_color};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    std::fs::create_dir_all(&config.data_dir)?;

    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(&config.data_dir, LOG_FILE_NAME);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    tracing::info!(
        version = APP_VERSION,
        data_dir = %config.data_dir.display(),
        executor = %config.executor,
        "Starting {}",
        APP_NAME
    );

    let state = AppState::new(config.clone());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (exec_cmd_tx, exec_cmd_rx) = mpsc::unbounded_channel::<ExecutorCommand>();
    let (exec_resp_tx, exec_resp_rx) = mpsc::unbounded_channel::<ExecutorResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn executor actor
    let executor_actor = ExecutorActor::new(config.executor, exec_resp_tx);
    tokio::spawn(executor_actor.run(exec_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(state, exec_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, exec_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.active_panel,
                    current_state.input_mode,
                    current_state.show_help,
                    current_state.popup.as_ref(),
                ) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),     // Content
            Constraint::Length(1),  // Status bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(32), // Sidebar
            Constraint::Min(40),    // Request + response
        ])
        .split(main_chunks[0]);

    draw_sidebar(f, state, columns[0]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Method + URL
            Constraint::Length(10), // Editor tabs
            Constraint::Min(5),     // Response
        ])
        .split(columns[1]);

    draw_url_bar(f, state, chunks[0]);
    draw_editor(f, state, chunks[1]);
    draw_response(f, state, chunks[2]);

    draw_status_bar(f, state, main_chunks[1]);

    // Popups
    if state.show_help {
        draw_help_popup(f, area);
    }

    if let Some(popup) = &state.popup {
        draw_popup(f, popup, area);
    }
}

fn is_editing(state: &RenderState, panel: Panel) -> bool {
    state.active_panel == panel && state.input_mode == InputMode::Editing
}

fn focus_style(state: &RenderState, panel: Panel) -> Style {
    if is_editing(state, panel) {
        Style::default().fg(Color::Yellow)
    } else if state.active_panel == panel {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Place the terminal cursor inside a bordered area, `pos` being a byte
/// offset into `text`
fn set_cursor(f: &mut Frame, area: Rect, text: &str, pos: usize) {
    let before = &text[..pos.min(text.len())];
    let row = before.matches('\n').count() as u16;
    let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) as u16;

    let max_x = area.x + area.width.saturating_sub(2);
    let max_y = area.y + area.height.saturating_sub(2);
    let cursor_x = (area.x + col + 1).min(max_x);
    let cursor_y = (area.y + row + 1).min(max_y);
    f.set_cursor_position(Position::new(cursor_x, cursor_y));
}

// ---------------------------------------------------------------------------
// Sidebar
// ---------------------------------------------------------------------------

fn section_title(title: &str) -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(
        title.to_uppercase(),
        Style::default().fg(Color::Magenta).bold(),
    )))
}

fn placeholder(text: &str) -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(
        format!("  {}", text),
        Style::default().fg(Color::DarkGray).italic(),
    )))
}

fn sidebar_item(row: &SidebarRow) -> ListItem<'static> {
    let method_span = |indent: &str| match row.method {
        Some(m) => Span::styled(
            format!("{}{:6} ", indent, m.as_str()),
            Style::default().fg(method_color(m)).bold(),
        ),
        None => Span::raw(indent.to_string()),
    };

    let line = match row.kind {
        SidebarRowKind::Collection { collapsed } => Line::from(Span::styled(
            format!("{} {}", if collapsed { "▸" } else { "▾" }, row.label),
            Style::default().bold(),
        )),
        SidebarRowKind::Request => Line::from(vec![method_span("   "), Span::raw(row.label.clone())]),
        SidebarRowKind::History => Line::from(vec![method_span(" "), Span::raw(row.label.clone())]),
    };
    ListItem::new(line)
}

fn draw_sidebar(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Sidebar;

    let mut items = vec![section_title("Collections")];
    let mut selected = None;

    if !state.sidebar.iter().any(|r| r.kind != SidebarRowKind::History) {
        items.push(placeholder("No collections"));
    }

    let mut history_started = false;
    for (i, row) in state.sidebar.iter().enumerate() {
        if row.kind == SidebarRowKind::History && !history_started {
            history_started = true;
            items.push(section_title("History"));
        }
        if i == state.sidebar_selected {
            selected = Some(items.len());
        }
        items.push(sidebar_item(row));
    }

    if !history_started {
        items.push(section_title("History"));
        items.push(placeholder("No history yet"));
    }

    let highlight_style = if is_focused {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };

    let list = List::new(items)
        .block(panel_block(" Ghostwire (n:new a:save R:rename D:delete) ", is_focused))
        .highlight_style(highlight_style);

    let mut list_state = ListState::default();
    list_state.select(selected);
    f.render_stateful_widget(list, area, &mut list_state);
}

// ---------------------------------------------------------------------------
// Request editor
// ---------------------------------------------------------------------------

fn draw_url_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let method = state.request.method;

    let loading = match (state.is_loading, state.is_scanning) {
        (true, true) => " [scanning...]",
        (true, false) => " [sending...]",
        _ => "",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state, Panel::Url))
        .title(format!(" {}{} ", method.as_str(), loading))
        .title_style(Style::default().fg(method_color(method)).bold())
        .title(Line::from(format!(" via {} ", state.executor)).right_aligned());

    let input = Paragraph::new(state.request.url.as_str()).block(block);
    f.render_widget(input, area);

    if is_editing(state, Panel::Url) {
        set_cursor(f, area, &state.request.url, state.cursor_position);
    }
}

fn draw_editor(f: &mut Frame, state: &RenderState, area: Rect) {
    let tabs_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let tab_titles = ["Authorization", "Headers", "Body", "Scan Settings"];
    let selected_tab = match state.editor_tab {
        Panel::Auth => 0,
        Panel::Headers => 1,
        Panel::Body => 2,
        _ => 3,
    };

    let tabs = ui::render_tabs(&tab_titles, selected_tab);
    f.render_widget(tabs, tabs_area[0]);

    let content_area = tabs_area[1];
    match state.editor_tab {
        Panel::Auth => draw_auth_panel(f, state, content_area),
        Panel::Body => draw_body_panel(f, state, content_area),
        Panel::Scan => draw_scan_panel(f, state, content_area),
        _ => draw_headers_panel(f, state, content_area),
    }
}

fn draw_auth_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let editing = is_editing(state, Panel::Auth);
    let field_style = |field: AuthField| {
        if state.active_panel == Panel::Auth && state.auth_field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let shown = |s: &str| if s.is_empty() { String::from("<empty>") } else { s.to_string() };

    let (lines, cursor_text) = match &state.request.auth {
        AuthType::None => (
            vec![Line::from(Span::styled(
                "This request does not use any authorization. Press 't' to cycle.",
                Style::default().fg(Color::DarkGray),
            ))],
            None,
        ),
        AuthType::Bearer { token } => (
            vec![Line::from(vec![
                Span::styled("Token: ", field_style(AuthField::Token)),
                Span::raw(shown(token)),
            ])],
            Some((0u16, "Token: ".len(), token.as_str())),
        ),
        AuthType::Basic { username, password } => {
            let masked = if password.is_empty() {
                String::from("<empty>")
            } else {
                "*".repeat(password.chars().count())
            };
            let cursor = match state.auth_field {
                AuthField::Password => (1u16, "Password: ".len(), password.as_str()),
                _ => (0u16, "Username: ".len(), username.as_str()),
            };
            (
                vec![
                    Line::from(vec![
                        Span::styled("Username: ", field_style(AuthField::Username)),
                        Span::raw(shown(username)),
                    ]),
                    Line::from(vec![
                        Span::styled("Password: ", field_style(AuthField::Password)),
                        Span::raw(masked),
                    ]),
                ],
                Some(cursor),
            )
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state, Panel::Auth))
        .title(format!(" Auth: {} (t:cycle) ", state.request.auth.label()));
    f.render_widget(Paragraph::new(lines).block(block), area);

    if editing {
        if let Some((row, label_len, text)) = cursor_text {
            let offset = text[..state.cursor_position.min(text.len())].chars().count();
            let max_x = area.x + area.width.saturating_sub(2);
            let cursor_x = (area.x + 1 + (label_len + offset) as u16).min(max_x);
            f.set_cursor_position(Position::new(cursor_x, area.y + 1 + row));
        }
    }
}

fn draw_headers_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Headers;

    let items: Vec<ListItem> = state
        .request
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let selected = is_focused && i == state.selected_header;
            let cell_style = |column: HeaderColumn| {
                if selected && state.header_column == column {
                    Style::default().fg(Color::Yellow).bold()
                } else if selected {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::Gray)
                }
            };
            let key = if h.key.is_empty() { "<key>" } else { h.key.as_str() };
            let value = if h.value.is_empty() { "<value>" } else { h.value.as_str() };
            ListItem::new(Line::from(vec![
                Span::styled(key.to_string(), cell_style(HeaderColumn::Key)),
                Span::raw(": "),
                Span::styled(value.to_string(), cell_style(HeaderColumn::Value)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(state, Panel::Headers))
            .title(" Headers (a:add d:del ←/→:column) "),
    );
    f.render_widget(list, area);
}

fn draw_body_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let title = if state.request.method.sends_body() {
        " Body (JSON) "
    } else {
        " Body (not sent with GET) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state, Panel::Body))
        .title(title);

    let body = Paragraph::new(state.request.body.as_str())
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);

    if is_editing(state, Panel::Body) {
        set_cursor(f, area, &state.request.body, state.cursor_position);
    }
}

fn draw_scan_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let items: Vec<ListItem> = ScanType::ALL
        .iter()
        .map(|t| {
            let marker = if *t == state.request.scan_type { "(•)" } else { "( )" };
            ListItem::new(format!("{} {}", marker, t.label()))
        })
        .collect();

    let selected = ScanType::ALL
        .iter()
        .position(|t| *t == state.request.scan_type);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(state, Panel::Scan))
                .title(" Scan Type (←/→ select, x:scan) "),
        )
        .highlight_style(Style::default().fg(Color::Yellow).bold());

    let mut list_state = ListState::default();
    list_state.select(selected);
    f.render_stateful_widget(list, area, &mut list_state);
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

fn draw_response(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state, Panel::Response));

    let Some(response) = &state.response else {
        let text = if state.is_loading {
            "Waiting for the executor..."
        } else {
            "Send a request (s) or run a scan (x) to see the response."
        };
        let empty = Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
            .block(block.title(" Response "));
        f.render_widget(empty, area);
        return;
    };

    let badges = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!(" {} ", response.status),
            Style::default().fg(Color::Black).bg(status_color(&response.status)).bold(),
        ),
        Span::raw(" "),
        Span::styled(format!(" {} ", response.time), Style::default().fg(Color::Cyan)),
        Span::styled(format!(" {} ", response.size), Style::default().fg(Color::Gray)),
    ]);

    let inner = block.inner(area);
    f.render_widget(block.title(badges), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let tabs = ui::render_tabs(&["Body", "Headers", "Raw Output"], state.response_tab.index());
    f.render_widget(tabs, chunks[0]);

    let lines = match state.response_tab {
        ResponseTab::Body => body_lines(&response.body),
        ResponseTab::Headers => {
            let mut lines = vec![Line::from(Span::styled("Response Headers", Style::default().bold()))];
            lines.extend(header_lines(&response.headers));
            if !response.request_headers.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Request Headers", Style::default().bold())));
                lines.extend(header_lines(&response.request_headers));
            }
            lines
        }
        ResponseTab::Raw => response
            .full_output
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect(),
    };

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.response_scroll, 0));
    f.render_widget(body, chunks[1]);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = if state.is_loading {
        " Running executor... "
    } else if state.input_mode == InputMode::Editing {
        " ESC:stop editing | arrows:move | Tab:next field "
    } else {
        " Tab:panel | e:edit | m:method | s:send | x:scan | ^N:new ^O:import ^E:export | ?:help | q:quit "
    };

    let bar = Paragraph::new(status)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

// ---------------------------------------------------------------------------
// Popups
// ---------------------------------------------------------------------------

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);

    let help_text = r#"
 GHOSTWIRE - Keyboard Shortcuts

 NAVIGATION
   Tab / Shift+Tab    Switch panels
   ↑ / ↓              Scroll response / move selection

 REQUEST
   m                  Cycle HTTP method
   s                  Send request
   x                  Run security scan
   e / Enter          Edit current field
   Ctrl+N             New request

 HEADERS
   a / d              Add / delete header
   ← / →              Switch key/value column

 AUTH & SCAN
   t                  Cycle auth type / scan type
   ↑ / ↓              Switch username/password

 SIDEBAR
   Enter              Open request / toggle collection
   n                  New collection
   a                  Save current request to collection
   R / D              Rename / delete selected
   C                  Clear history

 RESPONSE
   r                  Cycle Body / Headers / Raw Output

 FILE
   i / Ctrl+O         Import collections
   o / Ctrl+E         Export collections

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn draw_popup(f: &mut Frame, popup: &Popup, area: Rect) {
    let popup_area = centered_rect(60, 20, area);

    let (title, content, color) = match popup {
        Popup::Prompt { kind, input } => (
            format!(" {} (Enter to confirm, Esc to cancel) ", kind.title()),
            format!("{}▏", input),
            Color::Cyan,
        ),
        Popup::Confirm(kind) => (
            String::from(" Confirm "),
            format!("{}\n\n[y] Yes   [any other key] No", kind.question()),
            Color::Red,
        ),
        Popup::Notice(message) => (
            String::from(" Ghostwire "),
            format!("{}\n\nPress any key to continue...", message),
            Color::Yellow,
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
        .style(Style::default().bg(Color::Black));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
