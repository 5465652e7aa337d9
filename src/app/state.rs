//! App state - pure data structure with no I/O logic

use crate::messages::render::SidebarRow;
use crate::messages::ui_events::{
    AuthField, EditColumn, InputMode, Panel, RequestTab, ResultsTab,
};
use crate::messages::{RenderState, Submission};
use crate::models::{Auth, Call, CallId, CallResult, Collection, Row};
use crate::network::Dispatcher;
use crate::storage::Storage;

/// Main application state - owned by the app actor, mutated one event
/// at a time
pub struct AppState {
    // Calls
    pub collections: Vec<Collection>,
    pub active: Option<CallId>,
    /// Scratch call being composed outside any collection. Created on
    /// the first URL edit with nothing selected, adopted into a
    /// collection on save.
    pub draft: Option<Call>,
    pub next_call_id: CallId,

    // Execution
    pub dispatcher: Dispatcher,
    pub pending: Option<Submission>,
    pub is_loading: bool,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub auth_field: AuthField,

    // Request panel
    pub request_tab: RequestTab,
    pub selected_row: usize,
    pub edit_column: EditColumn,

    // Results panel
    pub results_tab: ResultsTab,
    pub results_body: Option<String>,
    pub result: Option<CallResult>,
    pub result_is_error: bool,
    pub results_scroll: u16,

    // Sidebar
    pub sidebar_index: usize,

    // Popups
    pub show_help: bool,
    pub show_curl_import: bool,
    pub curl_import_buffer: String,

    // Shell
    pub notice: Option<String>,
    pub size: (u16, u16),

    // Storage (persisted data)
    pub storage: Storage,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, storage: Storage) -> Self {
        let mut state = AppState {
            collections: Vec::new(),
            active: None,
            draft: None,
            next_call_id: 1,
            dispatcher,
            pending: None,
            is_loading: false,
            active_panel: Panel::Url,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            auth_field: AuthField::Token,
            request_tab: RequestTab::Params,
            selected_row: 0,
            edit_column: EditColumn::Key,
            results_tab: ResultsTab::Response,
            results_body: None,
            result: None,
            result_is_error: false,
            results_scroll: 0,
            sidebar_index: 0,
            show_help: false,
            show_curl_import: false,
            curl_import_buffer: String::new(),
            notice: None,
            size: (0, 0),
            storage,
        };

        state.collections = match state.storage.load_collections() {
            Ok(collections) if !collections.is_empty() => collections,
            Ok(_) => vec![Storage::starter_collection()],
            Err(e) => {
                tracing::warn!("Failed to load collections: {e:#}");
                vec![Storage::starter_collection()]
            }
        };

        // Loaded calls get runtime ids and a saved baseline
        for collection in &mut state.collections {
            for call in &mut collection.calls {
                call.id = state.next_call_id;
                state.next_call_id += 1;
                call.snapshot();
            }
        }

        let first = state
            .collections
            .iter()
            .flat_map(|c| &c.calls)
            .next()
            .map(|c| c.id);
        if let Some(id) = first {
            state.select_call(Some(id));
            state.sidebar_index = state
                .sidebar_rows()
                .iter()
                .position(|row| row.call.is_some())
                .unwrap_or(0);
        }

        state
    }

    /// Generate a unique call ID
    pub fn alloc_call_id(&mut self) -> CallId {
        let id = self.next_call_id;
        self.next_call_id += 1;
        id
    }

    /// Identity of whichever call edits and submissions target
    pub fn active_call_id(&self) -> Option<CallId> {
        self.active.or_else(|| self.draft.as_ref().map(|c| c.id))
    }

    pub fn active_call(&self) -> Option<&Call> {
        match self.active {
            Some(id) => self
                .collections
                .iter()
                .flat_map(|c| &c.calls)
                .find(|c| c.id == id),
            None => self.draft.as_ref(),
        }
    }

    pub fn active_call_mut(&mut self) -> Option<&mut Call> {
        match self.active {
            Some(id) => self
                .collections
                .iter_mut()
                .flat_map(|c| &mut c.calls)
                .find(|c| c.id == id),
            None => self.draft.as_mut(),
        }
    }

    /// Rows of the request tab currently showing, if it is a row tab
    pub fn active_rows(&self) -> Option<&Vec<Row>> {
        let call = self.active_call()?;
        match self.request_tab {
            RequestTab::Params => Some(&call.params),
            RequestTab::Headers => Some(&call.headers),
            _ => None,
        }
    }

    pub fn active_rows_mut(&mut self) -> Option<&mut Vec<Row>> {
        let tab = self.request_tab;
        let call = self.active_call_mut()?;
        match tab {
            RequestTab::Params => Some(&mut call.params),
            RequestTab::Headers => Some(&mut call.headers),
            _ => None,
        }
    }

    /// Get the current input field content
    pub fn current_input(&self) -> Option<&str> {
        let call = self.active_call()?;
        match self.active_panel {
            Panel::Url => Some(&call.url),
            Panel::Request => match self.request_tab {
                RequestTab::Params => row_column(&call.params, self.selected_row, self.edit_column),
                RequestTab::Headers => {
                    row_column(&call.headers, self.selected_row, self.edit_column)
                }
                RequestTab::Auth => match (&call.auth, self.auth_field) {
                    (Auth::Bearer(token), _) => Some(token.as_str()),
                    (Auth::Basic { username, .. }, AuthField::Username) => Some(username.as_str()),
                    (Auth::Basic { password, .. }, AuthField::Password) => Some(password.as_str()),
                    (Auth::ApiKey { header, .. }, AuthField::ApiHeader) => Some(header.as_str()),
                    (Auth::ApiKey { value, .. }, AuthField::ApiValue) => Some(value.as_str()),
                    _ => None,
                },
                RequestTab::Body => {
                    Some(call.body.as_ref().map(|b| b.content.as_str()).unwrap_or(""))
                }
            },
            _ => None,
        }
    }

    /// Get mutable reference to the current input field. The body
    /// string is created here on first touch.
    pub fn current_input_mut(&mut self) -> Option<&mut String> {
        let panel = self.active_panel;
        let tab = self.request_tab;
        let row = self.selected_row;
        let column = self.edit_column;
        let auth_field = self.auth_field;
        let call = self.active_call_mut()?;

        match panel {
            Panel::Url => Some(&mut call.url),
            Panel::Request => match tab {
                RequestTab::Params => row_column_mut(&mut call.params, row, column),
                RequestTab::Headers => row_column_mut(&mut call.headers, row, column),
                RequestTab::Auth => match (&mut call.auth, auth_field) {
                    (Auth::Bearer(token), _) => Some(token),
                    (Auth::Basic { username, .. }, AuthField::Username) => Some(username),
                    (Auth::Basic { password, .. }, AuthField::Password) => Some(password),
                    (Auth::ApiKey { header, .. }, AuthField::ApiHeader) => Some(header),
                    (Auth::ApiKey { value, .. }, AuthField::ApiValue) => Some(value),
                    _ => None,
                },
                RequestTab::Body => Some(&mut call.body.get_or_insert_with(Default::default).content),
            },
            _ => None,
        }
    }

    /// Flattened sidebar: a header row per collection, then its calls
    pub fn sidebar_rows(&self) -> Vec<SidebarRow> {
        let active = self.active_call_id();
        let mut rows = Vec::new();
        for collection in &self.collections {
            rows.push(SidebarRow {
                label: collection.name.clone(),
                method: None,
                call: None,
                active: false,
                dirty: false,
            });
            for call in &collection.calls {
                rows.push(SidebarRow {
                    label: call.name.clone(),
                    method: Some(call.method.clone()),
                    call: Some(call.id),
                    active: active == Some(call.id),
                    dirty: call.was_changed(),
                });
            }
        }
        rows
    }

    /// Call id under the sidebar cursor, if the cursor is on a call
    pub fn selected_sidebar_call(&self) -> Option<CallId> {
        self.sidebar_rows()
            .get(self.sidebar_index)
            .and_then(|row| row.call)
    }

    /// Collection the sidebar cursor falls under
    pub fn selected_collection_index(&self) -> Option<usize> {
        let mut row = 0usize;
        for (idx, collection) in self.collections.iter().enumerate() {
            let span = 1 + collection.calls.len();
            if self.sidebar_index < row + span {
                return Some(idx);
            }
            row += span;
        }
        None
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            call: self.active_call().cloned(),
            dirty: self.active_call().map_or(false, |c| c.was_changed()),
            active_panel: self.active_panel,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            auth_field: self.auth_field,
            request_tab: self.request_tab,
            selected_row: self.selected_row,
            edit_column: self.edit_column,
            results_tab: self.results_tab,
            results_body: self.results_body.clone(),
            result: self.result.clone(),
            status: self.result.as_ref().map_or(0, |r| r.status),
            results_scroll: self.results_scroll,
            result_is_error: self.result_is_error,
            is_loading: self.is_loading,
            sidebar: self.sidebar_rows(),
            sidebar_index: self.sidebar_index,
            show_help: self.show_help,
            show_curl_import: self.show_curl_import,
            curl_import_buffer: self.curl_import_buffer.clone(),
            notice: self.notice.clone(),
            size: self.size,
        }
    }
}

fn row_column(rows: &[Row], index: usize, column: EditColumn) -> Option<&str> {
    let row = rows.get(index)?;
    Some(match column {
        EditColumn::Key => row.key.as_str(),
        EditColumn::Value => row.value.as_str(),
    })
}

fn row_column_mut(rows: &mut [Row], index: usize, column: EditColumn) -> Option<&mut String> {
    let row = rows.get_mut(index)?;
    Some(match column {
        EditColumn::Key => &mut row.key,
        EditColumn::Value => &mut row.value,
    })
}
