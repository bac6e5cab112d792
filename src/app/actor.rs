//! App actor - message loop processing UI events and executor responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{ExecutorCommand, ExecutorResponse, RenderState, UiEvent};

/// App actor that processes UI events and executor responses
pub struct AppActor {
    state: AppState,
    executor_tx: mpsc::UnboundedSender<ExecutorCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        executor_tx: mpsc::UnboundedSender<ExecutorCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            executor_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut exec_rx: mpsc::UnboundedReceiver<ExecutorResponse>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.executor_tx.send(ExecutorCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = exec_rx.recv() => {
                    self.state.handle_response(response);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn send(&mut self, scan: bool) {
        if let Some(cmd) = self.state.prepare_send(scan) {
            let _ = self.executor_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Panel navigation
            UiEvent::NextPanel => self.state.next_panel(),
            UiEvent::PrevPanel => self.state.prev_panel(),
            UiEvent::ScrollUp => self.state.scroll_up(),
            UiEvent::ScrollDown => self.state.scroll_down(),

            // Input editing
            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Newline => self.state.enter_char('\n'),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),

            // Request actions
            UiEvent::SendRequest => self.send(false),
            UiEvent::SendScan => self.send(true),
            UiEvent::CycleMethod => self.state.cycle_method(),
            UiEvent::NewRequest => self.state.new_request(),

            // Headers
            UiEvent::NextHeader => self.state.next_header(),
            UiEvent::PrevHeader => self.state.prev_header(),
            UiEvent::SwitchHeaderColumn => self.state.switch_header_column(),
            UiEvent::AddHeader => self.state.add_header(),
            UiEvent::DeleteHeader => self.state.delete_header(),

            // Auth
            UiEvent::CycleAuth => self.state.cycle_auth(),
            UiEvent::NextAuthField => self.state.next_auth_field(),

            // Scan settings
            UiEvent::NextScanType => self.state.next_scan_type(),
            UiEvent::PrevScanType => self.state.prev_scan_type(),

            // Response
            UiEvent::NextResponseTab => self.state.next_response_tab(),

            // Sidebar
            UiEvent::SidebarUp => self.state.sidebar_up(),
            UiEvent::SidebarDown => self.state.sidebar_down(),
            UiEvent::SidebarActivate => self.state.sidebar_activate(),
            UiEvent::NewCollection => self.state.new_collection(),
            UiEvent::SaveToCollection => self.state.save_to_collection(),
            UiEvent::RenameSelected => self.state.rename_selected(),
            UiEvent::DeleteSelected => self.state.delete_selected(),
            UiEvent::ClearHistory => self.state.clear_history(),

            // Import / export
            UiEvent::ImportCollections => self.state.import_collections(),
            UiEvent::ExportCollections => self.state.export_collections(),

            // Popups
            UiEvent::PopupChar(c) => self.state.popup_char(c),
            UiEvent::PopupBackspace => self.state.popup_backspace(),
            UiEvent::PopupSubmit => self.state.popup_submit(),
            UiEvent::PopupCancel => self.state.popup_cancel(),
            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::CloseHelp => self.state.close_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}
