//! App actor - message loop processing UI events and call lifecycle events

use tokio::sync::mpsc;

use crate::app::AppState;
use crate::messages::{CallEvent, RenderState, UiEvent};

/// Single consumer of UI events and call lifecycle events. All state
/// mutation happens here, one message at a time; the UI only ever sees
/// the snapshots this actor publishes.
pub struct AppActor {
    state: AppState,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(state: AppState, render_tx: mpsc::UnboundedSender<RenderState>) -> Self {
        AppActor { state, render_tx }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut event_rx: mpsc::UnboundedReceiver<CallEvent>,
    ) {
        tracing::info!("App actor started");
        self.publish();

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if matches!(event, UiEvent::Quit) {
                        tracing::info!("Quit requested, shutting down");
                        self.state.dispatcher.shutdown();
                        break;
                    }
                    self.handle_ui_event(event);
                    self.publish();
                }
                Some(event) = event_rx.recv() => {
                    self.state.handle_call_event(event);
                    self.publish();
                }
                else => break,
            }
        }
    }

    fn publish(&self) {
        let _ = self.render_tx.send(self.state.to_render_state());
    }

    fn handle_ui_event(&mut self, event: UiEvent) {
        // A fresh interaction retires whatever notice was on screen
        if !matches!(event, UiEvent::Notify(_)) {
            self.state.notice = None;
        }

        match event {
            UiEvent::NextPanel => self.state.next_panel(),
            UiEvent::PrevPanel => self.state.prev_panel(),
            UiEvent::ScrollUp => self.state.scroll_up(),
            UiEvent::ScrollDown => self.state.scroll_down(),
            UiEvent::NextTab => self.state.next_tab(),
            UiEvent::PrevTab => self.state.prev_tab(),

            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),
            UiEvent::NextEditColumn => self.state.next_edit_column(),

            UiEvent::SubmitCall => self.state.submit_call(),
            UiEvent::CycleMethod => self.state.cycle_method(),
            UiEvent::SaveCall => self.state.save_call(),

            UiEvent::NextRow => self.state.next_row(),
            UiEvent::PrevRow => self.state.prev_row(),
            UiEvent::ToggleRow => self.state.toggle_row(),
            UiEvent::AddRow => self.state.add_row(),
            UiEvent::DeleteRow => self.state.delete_row(),

            UiEvent::CycleAuth => self.state.cycle_auth(),
            UiEvent::NextAuthField => self.state.next_auth_field(),
            UiEvent::CycleBodyType => self.state.cycle_body_type(),

            UiEvent::NextEntry => self.state.next_entry(),
            UiEvent::PrevEntry => self.state.prev_entry(),
            UiEvent::SelectEntry => self.state.select_entry(),
            UiEvent::NewCall => self.state.new_call(),
            UiEvent::DeleteEntry => self.state.delete_entry(),

            UiEvent::ShowCurlImport => self.state.open_curl_import(),
            UiEvent::CurlImportChar(c) => self.state.curl_import_char(c),
            UiEvent::CurlImportBackspace => self.state.curl_import_backspace(),
            UiEvent::ImportCurl => self.state.import_curl(),
            UiEvent::CancelCurlImport => self.state.cancel_curl_import(),
            UiEvent::ExportCurl => self.state.export_curl(),

            // The terminal loop suspends the screen and runs the editor
            // itself; by the time this actor hears about it the export
            // already happened.
            UiEvent::ExportBody => {}

            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::CloseHelp => self.state.close_help(),

            UiEvent::Notify(message) => self.state.notify(message),
            UiEvent::Resized(w, h) => self.state.resized(w, h),
            UiEvent::Quit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DispatchCommand;
    use crate::network::Dispatcher;
    use crate::storage::Storage;

    fn actor_under_test() -> (
        AppActor,
        mpsc::UnboundedReceiver<RenderState>,
        mpsc::UnboundedReceiver<DispatchCommand>,
        tempfile::TempDir,
    ) {
        let temp = tempfile::tempdir().unwrap();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (render_tx, render_rx) = mpsc::unbounded_channel();
        let storage = Storage::with_dir(temp.path().to_path_buf());
        let state = AppState::new(Dispatcher::new(cmd_tx), storage);
        (AppActor::new(state, render_tx), render_rx, cmd_rx, temp)
    }

    #[tokio::test]
    async fn a_render_state_follows_every_message() {
        let (actor, mut render_rx, _cmd_rx, _temp) = actor_under_test();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(actor.run(ui_rx, event_rx));

        let initial = render_rx.recv().await.unwrap();
        assert!(!initial.is_loading);

        ui_tx.send(UiEvent::NextPanel).unwrap();
        let after = render_rx.recv().await.unwrap();
        assert_ne!(after.active_panel, initial.active_panel);

        ui_tx.send(UiEvent::Quit).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn quit_forwards_shutdown_to_the_dispatcher() {
        let (actor, _render_rx, mut cmd_rx, _temp) = actor_under_test();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(actor.run(ui_rx, event_rx));

        ui_tx.send(UiEvent::Quit).unwrap();
        handle.await.unwrap();

        assert!(matches!(
            cmd_rx.recv().await,
            Some(DispatchCommand::Shutdown)
        ));
    }
}
