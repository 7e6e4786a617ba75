//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::i18n::Language;
use crate::messages::network::PdfKind;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

fn dispatch(
    network_tx: &mpsc::UnboundedSender<NetworkCommand>,
    cmds: impl IntoIterator<Item = NetworkCommand>,
) {
    for cmd in cmds {
        let _ = network_tx.send(cmd);
    }
}

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
        language: Language,
        page_size: u32,
    ) -> Self {
        AppActor {
            state: AppState::new(language, page_size),
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Route guard check, then the loading view
        let bootstrap = self.state.start();
        self.send(bootstrap);
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    dispatch(&self.network_tx, self.state.handle_response(response));
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn send(&self, cmd: NetworkCommand) {
        let _ = self.network_tx.send(cmd);
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        // Any keypress dismisses the last status message
        if !matches!(event, UiEvent::Quit) {
            self.state.notice = None;
        }

        match event {
            // Navigation
            UiEvent::GoTo(screen) => dispatch(&self.network_tx, self.state.go_to(screen)),
            UiEvent::NextScreen => dispatch(&self.network_tx, self.state.next_screen()),
            UiEvent::PrevScreen => dispatch(&self.network_tx, self.state.prev_screen()),
            UiEvent::ScrollUp => self.state.scroll_up(),
            UiEvent::ScrollDown => self.state.scroll_down(),

            // Text input
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),
            UiEvent::Newline => self.state.newline(),
            UiEvent::NextField => self.state.next_field(),
            UiEvent::Submit => dispatch(&self.network_tx, self.state.submit()),
            UiEvent::Cancel => self.state.cancel(),

            // Session
            UiEvent::Logout => dispatch(&self.network_tx, self.state.logout()),

            // Tables
            UiEvent::SelectNext => self.state.select_next(),
            UiEvent::SelectPrev => self.state.select_prev(),
            UiEvent::NextPage => dispatch(&self.network_tx, self.state.next_page()),
            UiEvent::PrevPage => dispatch(&self.network_tx, self.state.prev_page()),
            UiEvent::CyclePageSize => dispatch(&self.network_tx, self.state.cycle_page_size()),
            UiEvent::Refresh => dispatch(&self.network_tx, self.state.refresh()),
            UiEvent::AddRecord => dispatch(&self.network_tx, self.state.add_record()),
            UiEvent::EditRecord => dispatch(&self.network_tx, self.state.edit_record()),
            UiEvent::ViewRecord => self.state.view_record(),
            UiEvent::DeleteRecord => self.state.delete_record(),
            UiEvent::ConfirmYes => dispatch(&self.network_tx, self.state.confirm_delete()),
            UiEvent::ToggleActive => dispatch(&self.network_tx, self.state.toggle_active()),
            UiEvent::StartSearch => self.state.start_search(),
            UiEvent::ClearSearch => dispatch(&self.network_tx, self.state.clear_search()),
            UiEvent::GeneratePdf => dispatch(&self.network_tx, self.state.request_pdf(PdfKind::Generate)),
            UiEvent::ViewPdf => dispatch(&self.network_tx, self.state.request_pdf(PdfKind::View)),

            // Profile
            UiEvent::ChangePassword => self.state.change_password(),

            // Popups and settings
            UiEvent::ToggleLanguage => self.state.toggle_language(),
            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::CloseHelp => self.state.close_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}
