//! Command handlers - business logic for processing UI events

use crate::app::AppState;
use crate::curl;
use crate::messages::dispatch::CallEvent;
use crate::messages::ui_events::{
    AuthField, EditColumn, InputMode, Panel, RequestTab, ResultsTab,
};
use crate::models::{Auth, Call, CallBody, Collection, Row};
use crate::ui;

impl AppState {
    // ========================
    // Navigation
    // ========================

    pub fn next_panel(&mut self) {
        self.active_panel = self.active_panel.next();
    }

    pub fn prev_panel(&mut self) {
        self.active_panel = self.active_panel.prev();
    }

    pub fn next_tab(&mut self) {
        match self.active_panel {
            Panel::Request => self.request_tab = self.request_tab.next(),
            Panel::Results => self.results_tab = self.results_tab.next(),
            _ => {}
        }
    }

    pub fn prev_tab(&mut self) {
        match self.active_panel {
            Panel::Request => self.request_tab = self.request_tab.prev(),
            Panel::Results => self.results_tab = self.results_tab.prev(),
            _ => {}
        }
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        if self.active_panel == Panel::Url && self.active_call().is_none() {
            let id = self.alloc_call_id();
            self.draft = Some(Call::new(id, "New Call"));
        }

        let editable = match self.active_panel {
            Panel::Url => self.active_call().is_some(),
            Panel::Request => match self.request_tab {
                RequestTab::Params | RequestTab::Headers => {
                    self.active_rows().map_or(false, |rows| !rows.is_empty())
                }
                RequestTab::Auth => self.current_input().is_some(),
                RequestTab::Body => self.active_call().is_some(),
            },
            _ => false,
        };
        if !editable {
            return;
        }

        if self.active_panel == Panel::Request
            && matches!(self.request_tab, RequestTab::Params | RequestTab::Headers)
        {
            self.edit_column = EditColumn::Key;
        }
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.current_input().map_or(0, |s| s.len());
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn move_cursor_left(&mut self) {
        let cursor_pos = self.cursor_position;
        let Some(input) = self.current_input() else {
            return;
        };
        if cursor_pos > 0 && cursor_pos <= input.len() {
            self.cursor_position = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_cursor_right(&mut self) {
        let cursor_pos = self.cursor_position;
        let Some(input) = self.current_input() else {
            return;
        };
        if cursor_pos < input.len() {
            self.cursor_position = input[cursor_pos..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| cursor_pos + i)
                .unwrap_or(input.len());
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        let Some(input) = self.current_input_mut() else {
            return;
        };
        if cursor_pos <= input.len() {
            input.insert(cursor_pos, c);
            self.cursor_position = cursor_pos + c.len_utf8();
        }
    }

    pub fn delete_char(&mut self) {
        let cursor_pos = self.cursor_position;
        if cursor_pos == 0 {
            return;
        }
        let Some(input) = self.current_input_mut() else {
            return;
        };
        if cursor_pos <= input.len() {
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    /// Jump between the key and value column of the row under edit
    pub fn next_edit_column(&mut self) {
        self.edit_column = match self.edit_column {
            EditColumn::Key => EditColumn::Value,
            EditColumn::Value => EditColumn::Key,
        };
        self.cursor_position = self.current_input().map_or(0, |s| s.len());
    }

    // ========================
    // HTTP Method
    // ========================

    pub fn cycle_method(&mut self) {
        if let Some(call) = self.active_call_mut() {
            call.method = call.method.next();
        }
    }

    // ========================
    // Results scrolling
    // ========================

    pub fn scroll_up(&mut self) {
        self.results_scroll = self.results_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.results_scroll = self.results_scroll.saturating_add(1);
    }

    // ========================
    // Params/headers rows
    // ========================

    pub fn next_row(&mut self) {
        let len = self.active_rows().map_or(0, |rows| rows.len());
        if len > 0 {
            self.selected_row = (self.selected_row + 1) % len;
        }
    }

    pub fn prev_row(&mut self) {
        let len = self.active_rows().map_or(0, |rows| rows.len());
        if len > 0 {
            self.selected_row = self.selected_row.checked_sub(1).unwrap_or(len - 1);
        }
    }

    pub fn toggle_row(&mut self) {
        let index = self.selected_row;
        if let Some(rows) = self.active_rows_mut() {
            if let Some(row) = rows.get_mut(index) {
                row.enabled = !row.enabled;
            }
        }
    }

    pub fn add_row(&mut self) {
        if self.active_call().is_none() {
            return;
        }
        if let Some(rows) = self.active_rows_mut() {
            rows.push(Row::new("", ""));
            self.selected_row = self.active_rows().map_or(0, |rows| rows.len() - 1);
        }
    }

    pub fn delete_row(&mut self) {
        let index = self.selected_row;
        if let Some(rows) = self.active_rows_mut() {
            if index < rows.len() {
                rows.remove(index);
            }
        }
        if self.selected_row > 0 {
            self.selected_row -= 1;
        }
    }

    // ========================
    // Auth
    // ========================

    pub fn cycle_auth(&mut self) {
        if let Some(call) = self.active_call_mut() {
            call.auth = call.auth.next();
        }
        self.sync_auth_field();
    }

    pub fn next_auth_field(&mut self) {
        let Some(call) = self.active_call() else {
            return;
        };
        self.auth_field = match (&call.auth, self.auth_field) {
            (Auth::Basic { .. }, AuthField::Username) => AuthField::Password,
            (Auth::Basic { .. }, _) => AuthField::Username,
            (Auth::ApiKey { .. }, AuthField::ApiHeader) => AuthField::ApiValue,
            (Auth::ApiKey { .. }, _) => AuthField::ApiHeader,
            _ => AuthField::Token,
        };
        self.cursor_position = self.current_input().map_or(0, |s| s.len());
    }

    fn sync_auth_field(&mut self) {
        self.auth_field = match self.active_call().map(|c| &c.auth) {
            Some(Auth::Basic { .. }) => AuthField::Username,
            Some(Auth::ApiKey { .. }) => AuthField::ApiHeader,
            _ => AuthField::Token,
        };
    }

    // ========================
    // Body
    // ========================

    pub fn cycle_body_type(&mut self) {
        if let Some(call) = self.active_call_mut() {
            let body = call.body.get_or_insert_with(CallBody::default);
            body.content_type = body.content_type.next();
        }
    }

    // ========================
    // Sidebar
    // ========================

    pub fn next_entry(&mut self) {
        let len = self.sidebar_rows().len();
        if len > 0 && self.sidebar_index + 1 < len {
            self.sidebar_index += 1;
        }
    }

    pub fn prev_entry(&mut self) {
        self.sidebar_index = self.sidebar_index.saturating_sub(1);
    }

    pub fn select_entry(&mut self) {
        if let Some(id) = self.selected_sidebar_call() {
            self.select_call(Some(id));
        }
    }

    pub fn new_call(&mut self) {
        if self.collections.is_empty() {
            self.collections.push(Collection::new("default"));
        }
        let idx = self
            .selected_collection_index()
            .unwrap_or(0)
            .min(self.collections.len() - 1);
        let id = self.alloc_call_id();
        self.collections[idx].calls.push(Call::new(id, "New Call"));
        self.select_call(Some(id));
        self.sidebar_index = self
            .sidebar_rows()
            .iter()
            .position(|row| row.call == Some(id))
            .unwrap_or(self.sidebar_index);
        self.active_panel = Panel::Url;
        self.start_editing();
    }

    pub fn delete_entry(&mut self) {
        let Some(id) = self.selected_sidebar_call() else {
            return;
        };
        for collection in &mut self.collections {
            let before = collection.calls.len();
            collection.calls.retain(|c| c.id != id);
            if collection.calls.len() != before {
                if let Err(e) = self.storage.save_collection(collection) {
                    tracing::error!("Failed to persist deletion: {e:#}");
                }
            }
        }
        if self.active == Some(id) {
            self.select_call(None);
        }
        let rows = self.sidebar_rows().len();
        if rows == 0 {
            self.sidebar_index = 0;
        } else if self.sidebar_index >= rows {
            self.sidebar_index = rows - 1;
        }
    }

    // ========================
    // Call selection
    // ========================

    /// Make a call (or nothing) the target of the editor panels. The
    /// results panel always empties; a running submission keeps its
    /// spinner and is reconciled when its terminal event lands.
    pub fn select_call(&mut self, id: Option<crate::models::CallId>) {
        tracing::info!(?id, "Call selected");
        self.active = id;
        if id.is_some() {
            self.draft = None;
        }
        self.input_mode = InputMode::Normal;
        self.selected_row = 0;
        self.edit_column = EditColumn::Key;
        self.cursor_position = 0;
        self.clear_results();
        self.sync_auth_field();
    }

    fn clear_results(&mut self) {
        self.results_body = None;
        self.result = None;
        self.result_is_error = false;
        self.results_scroll = 0;
    }

    // ========================
    // Call submission
    // ========================

    pub fn submit_call(&mut self) {
        if self.input_mode == InputMode::Editing {
            self.stop_editing();
        }
        if self.pending.is_some() {
            self.notice = Some(String::from("A call is already running"));
            return;
        }
        let Some(call) = self.active_call().cloned() else {
            self.notice = Some(String::from("Nothing to send"));
            return;
        };
        match self.dispatcher.submit(&call) {
            Ok(submission) => {
                self.pending = Some(submission);
            }
            Err(e) => {
                tracing::warn!("Refusing submission: {e}");
                self.notice = Some(e.to_string());
            }
        }
    }

    // ========================
    // Lifecycle events
    // ========================

    pub fn handle_call_event(&mut self, event: CallEvent) {
        let submission = event.submission();
        if self.pending != Some(submission) {
            tracing::debug!(seq = submission.seq, "Dropping event for stale submission");
            return;
        }

        match event {
            CallEvent::Loading { .. } => {
                self.is_loading = true;
                self.clear_results();
            }
            CallEvent::Ready { result, .. } => {
                self.pending = None;
                self.is_loading = false;
                if self.active_call_id() == Some(submission.call) {
                    self.clear_results();
                    if !result.raw_body.is_empty() {
                        self.results_body =
                            Some(ui::number_lines(&ui::format_body(&result.raw_body)));
                    }
                    self.result = Some(result);
                } else {
                    tracing::debug!(seq = submission.seq, "Call switched; dropping payload");
                }
            }
            CallEvent::Failed { error, .. } => {
                self.pending = None;
                self.is_loading = false;
                if self.active_call_id() == Some(submission.call) {
                    self.clear_results();
                    self.result_is_error = true;
                    self.results_body = Some(error.to_string());
                } else {
                    tracing::debug!(seq = submission.seq, "Call switched; dropping error");
                }
            }
        }
    }

    // ========================
    // Saving
    // ========================

    pub fn save_call(&mut self) {
        if let Some(draft) = self.draft.take() {
            if self.collections.is_empty() {
                self.collections.push(Collection::new("default"));
            }
            let idx = self
                .selected_collection_index()
                .unwrap_or(0)
                .min(self.collections.len() - 1);
            let id = draft.id;
            self.collections[idx].calls.push(draft);
            self.active = Some(id);
        }

        let Some(id) = self.active else {
            return;
        };
        for collection in &mut self.collections {
            if let Some(call) = collection.calls.iter_mut().find(|c| c.id == id) {
                call.snapshot();
                match self.storage.save_collection(collection) {
                    Ok(()) => {
                        self.notice = Some(format!("Saved to '{}'", collection.name));
                    }
                    Err(e) => {
                        tracing::error!("Failed to save collection: {e:#}");
                        self.notice = Some(format!("Save failed: {}", e));
                    }
                }
                return;
            }
        }
    }

    // ========================
    // cURL import/export
    // ========================

    pub fn open_curl_import(&mut self) {
        self.show_curl_import = true;
    }

    pub fn curl_import_char(&mut self, c: char) {
        self.curl_import_buffer.push(c);
    }

    pub fn curl_import_backspace(&mut self) {
        self.curl_import_buffer.pop();
    }

    pub fn import_curl(&mut self) {
        match curl::parse_curl(&self.curl_import_buffer) {
            Ok(mut call) => {
                call.id = self.alloc_call_id();
                self.active = None;
                self.draft = Some(call);
                self.input_mode = InputMode::Normal;
                self.active_panel = Panel::Url;
                self.selected_row = 0;
                self.clear_results();
                self.sync_auth_field();
                self.notice = Some(String::from("Imported from cURL"));
            }
            Err(e) => {
                self.notice = Some(format!("cURL import failed: {}", e));
            }
        }
        self.curl_import_buffer.clear();
        self.show_curl_import = false;
    }

    pub fn cancel_curl_import(&mut self) {
        self.curl_import_buffer.clear();
        self.show_curl_import = false;
    }

    pub fn export_curl(&mut self) {
        let Some(call) = self.active_call() else {
            return;
        };
        let text = curl::to_curl(call);
        self.clear_results();
        self.results_body = Some(text);
        self.results_tab = ResultsTab::Response;
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Shell events
    // ========================

    pub fn notify(&mut self, message: String) {
        self.notice = Some(message);
    }

    pub fn resized(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::dispatch::DispatchCommand;
    use crate::models::{CallResult, Method};
    use crate::network::Dispatcher;
    use crate::storage::Storage;
    use tempfile::TempDir;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn test_state() -> (AppState, UnboundedReceiver<DispatchCommand>, TempDir) {
        let temp = tempfile::tempdir().unwrap();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let storage = Storage::with_dir(temp.path().to_path_buf());
        let state = AppState::new(Dispatcher::new(cmd_tx), storage);
        (state, cmd_rx, temp)
    }

    fn take_submission(cmd_rx: &mut UnboundedReceiver<DispatchCommand>) -> crate::messages::Submission {
        match cmd_rx.try_recv().unwrap() {
            DispatchCommand::Execute { submission, .. } => submission,
            other => panic!("expected Execute, got {:?}", other),
        }
    }

    #[test]
    fn starts_with_the_first_starter_call_selected() {
        let (state, _cmd_rx, _temp) = test_state();
        let call = state.active_call().expect("a call should be selected");
        assert!(!call.url.is_empty());
        assert!(!state.is_loading);
    }

    #[test]
    fn submit_with_empty_url_sets_notice_and_dispatches_nothing() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.new_call();
        assert!(state.active_call().unwrap().url.is_empty());

        state.submit_call();
        assert!(state.notice.is_some());
        assert!(state.pending.is_none());
        assert!(!state.is_loading);
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn submit_sends_exactly_one_execute() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.submit_call();

        let submission = take_submission(&mut cmd_rx);
        assert_eq!(state.pending, Some(submission));
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn second_submit_is_refused_while_one_is_pending() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.submit_call();
        let _ = take_submission(&mut cmd_rx);

        state.submit_call();
        assert!(state.notice.is_some());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn loading_then_ready_fills_the_results_panel() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.submit_call();
        let submission = take_submission(&mut cmd_rx);

        state.handle_call_event(CallEvent::Loading { submission });
        assert!(state.is_loading);
        assert!(state.results_body.is_none());

        state.handle_call_event(CallEvent::Ready {
            submission,
            result: CallResult {
                status: 200,
                raw_body: String::from(r#"{"ok":true}"#),
                headers: vec![(String::from("content-type"), String::from("application/json"))],
                elapsed_ms: 12,
            },
        });
        assert!(!state.is_loading);
        assert!(state.pending.is_none());
        let body = state.results_body.as_deref().unwrap();
        assert!(body.starts_with("1  {"));
        assert_eq!(state.to_render_state().status, 200);
    }

    #[test]
    fn events_for_stale_submissions_are_ignored() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.submit_call();
        let submission = take_submission(&mut cmd_rx);
        state.handle_call_event(CallEvent::Loading { submission });

        let stale = crate::messages::Submission {
            seq: submission.seq + 99,
            call: submission.call,
        };
        state.handle_call_event(CallEvent::Ready {
            submission: stale,
            result: CallResult::default(),
        });

        assert!(state.is_loading);
        assert_eq!(state.pending, Some(submission));
    }

    #[test]
    fn response_landing_after_call_switch_clears_spinner_but_drops_payload() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.submit_call();
        let submission = take_submission(&mut cmd_rx);
        state.handle_call_event(CallEvent::Loading { submission });

        let other = state.collections[0].calls[1].id;
        state.select_call(Some(other));
        assert!(state.is_loading);

        state.handle_call_event(CallEvent::Ready {
            submission,
            result: CallResult {
                status: 200,
                raw_body: String::from("{}"),
                headers: Vec::new(),
                elapsed_ms: 3,
            },
        });
        assert!(!state.is_loading);
        assert!(state.pending.is_none());
        assert!(state.results_body.is_none());
        assert!(state.result.is_none());
    }

    #[test]
    fn failure_shows_the_error_in_place_of_a_body() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.submit_call();
        let submission = take_submission(&mut cmd_rx);
        state.handle_call_event(CallEvent::Loading { submission });

        state.handle_call_event(CallEvent::Failed {
            submission,
            error: crate::error::TransportError::Timeout(30),
        });
        assert!(state.result_is_error);
        assert!(state.results_body.as_deref().unwrap().contains("timed out"));
        assert_eq!(state.to_render_state().status, 0);
    }

    #[test]
    fn empty_response_body_keeps_the_placeholder() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.submit_call();
        let submission = take_submission(&mut cmd_rx);
        state.handle_call_event(CallEvent::Loading { submission });

        state.handle_call_event(CallEvent::Ready {
            submission,
            result: CallResult {
                status: 204,
                raw_body: String::new(),
                headers: Vec::new(),
                elapsed_ms: 5,
            },
        });
        assert!(state.results_body.is_none());
        assert_eq!(state.to_render_state().status, 204);
    }

    #[test]
    fn tab_cycling_clamps_in_both_panels() {
        let (mut state, _cmd_rx, _temp) = test_state();
        state.active_panel = Panel::Request;
        for _ in 0..10 {
            state.next_tab();
        }
        assert_eq!(state.request_tab, RequestTab::Body);
        for _ in 0..10 {
            state.prev_tab();
        }
        assert_eq!(state.request_tab, RequestTab::Params);
    }

    #[test]
    fn row_editing_writes_through_to_the_call() {
        let (mut state, _cmd_rx, _temp) = test_state();
        state.active_panel = Panel::Request;
        state.request_tab = RequestTab::Params;
        state.add_row();
        state.start_editing();
        for c in "page".chars() {
            state.enter_char(c);
        }
        state.next_edit_column();
        for c in "2".chars() {
            state.enter_char(c);
        }
        state.stop_editing();

        let call = state.active_call().unwrap();
        let row = call.params.last().unwrap();
        assert_eq!(row.key, "page");
        assert_eq!(row.value, "2");
        assert!(call.was_changed());
    }

    #[test]
    fn toggling_a_row_changes_count_but_not_length() {
        let (mut state, _cmd_rx, _temp) = test_state();
        state.active_panel = Panel::Request;
        state.request_tab = RequestTab::Headers;
        state.add_row();
        let call = state.active_call().unwrap();
        let len = call.headers.len();
        let count = call.headers_count();

        state.selected_row = len - 1;
        state.toggle_row();
        let call = state.active_call().unwrap();
        assert_eq!(call.headers.len(), len);
        assert_eq!(call.headers_count(), count - 1);
    }

    #[test]
    fn url_edit_with_nothing_selected_creates_a_draft() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.select_call(None);
        assert!(state.active_call().is_none());

        state.active_panel = Panel::Url;
        state.start_editing();
        for c in "https://example.com".chars() {
            state.enter_char(c);
        }
        assert!(state.draft.is_some());
        assert_eq!(state.active_call().unwrap().url, "https://example.com");
        assert!(state.active_call().unwrap().was_changed());

        state.submit_call();
        assert!(state.pending.is_some());
        assert!(cmd_rx.try_recv().is_ok());
    }

    #[test]
    fn save_call_snapshots_and_persists() {
        let (mut state, _cmd_rx, temp) = test_state();
        state.active_panel = Panel::Url;
        state.start_editing();
        state.enter_char('x');
        assert!(state.active_call().unwrap().was_changed());

        state.save_call();
        assert!(!state.active_call().unwrap().was_changed());

        let files: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert!(!files.is_empty());
    }

    #[test]
    fn selecting_a_call_resets_the_results_panel() {
        let (mut state, mut cmd_rx, _temp) = test_state();
        state.submit_call();
        let submission = take_submission(&mut cmd_rx);
        state.handle_call_event(CallEvent::Loading { submission });
        state.handle_call_event(CallEvent::Ready {
            submission,
            result: CallResult {
                status: 200,
                raw_body: String::from("{}"),
                headers: Vec::new(),
                elapsed_ms: 1,
            },
        });
        assert!(state.results_body.is_some());

        let other = state.collections[0].calls[1].id;
        state.select_call(Some(other));
        assert!(state.results_body.is_none());
        assert_eq!(state.to_render_state().status, 0);
    }

    #[test]
    fn export_curl_renders_into_the_results_panel() {
        let (mut state, _cmd_rx, _temp) = test_state();
        state.export_curl();
        let body = state.results_body.as_deref().unwrap();
        assert!(body.starts_with("curl "));
    }

    #[test]
    fn import_curl_becomes_the_active_draft() {
        let (mut state, _cmd_rx, _temp) = test_state();
        state.open_curl_import();
        for c in "curl -X POST https://api.example.com/users -H 'Accept: application/json'".chars()
        {
            state.curl_import_char(c);
        }
        state.import_curl();

        assert!(!state.show_curl_import);
        let call = state.active_call().unwrap();
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.url, "https://api.example.com/users");
        assert_eq!(call.headers_count(), 1);
    }
}
