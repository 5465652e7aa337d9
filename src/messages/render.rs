//! Render state - data structure sent from App layer to UI for rendering

use crate::messages::ui_events::{
    AuthField, EditColumn, InputMode, Panel, RequestTab, ResultsTab,
};
use crate::models::{Call, CallResult, Method};

/// One visible line of the sidebar, either a collection header or a
/// call underneath it.
#[derive(Debug, Clone)]
pub struct SidebarRow {
    pub label: String,
    pub method: Option<Method>,
    pub call: Option<crate::models::CallId>,
    pub active: bool,
    pub dirty: bool,
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Active call (a clone; the app keeps the original)
    pub call: Option<Call>,
    pub dirty: bool,

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
    pub status: u16,
    pub results_scroll: u16,
    pub result_is_error: bool,
    pub is_loading: bool,

    // Sidebar
    pub sidebar: Vec<SidebarRow>,
    pub sidebar_index: usize,

    // Popups
    pub show_help: bool,
    pub show_curl_import: bool,
    pub curl_import_buffer: String,

    // Shell
    pub notice: Option<String>,
    pub size: (u16, u16),
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            call: None,
            dirty: false,
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
            status: 0,
            results_scroll: 0,
            result_is_error: false,
            is_loading: false,
            sidebar: Vec::new(),
            sidebar_index: 0,
            show_help: false,
            show_curl_import: false,
            curl_import_buffer: String::new(),
            notice: None,
            size: (0, 0),
        }
    }
}
