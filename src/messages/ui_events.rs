//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Events generated from user input in the UI layer
#[derive(Debug, Clone)]
pub enum UiEvent {
    // Panel navigation
    NextPanel,
    PrevPanel,
    ScrollUp,
    ScrollDown,

    // Tab strips (request and results panels)
    NextTab,
    PrevTab,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    NextEditColumn,

    // Call actions
    SubmitCall,
    CycleMethod,
    SaveCall,

    // Params/headers rows
    NextRow,
    PrevRow,
    ToggleRow,
    AddRow,
    DeleteRow,

    // Auth
    CycleAuth,
    NextAuthField,

    // Body
    CycleBodyType,

    // Sidebar
    NextEntry,
    PrevEntry,
    SelectEntry,
    NewCall,
    DeleteEntry,

    // cURL
    ShowCurlImport,
    CurlImportChar(char),
    CurlImportBackspace,
    ImportCurl,
    CancelCurlImport,
    ExportCurl,

    /// Export the formatted response body to $EDITOR. Handled by the
    /// terminal loop itself since it has to suspend the screen.
    ExportBody,

    // Popups
    ToggleHelp,
    CloseHelp,

    // Shell
    Notify(String),
    Resized(u16, u16),
    Quit,
}

/// Active panel in the UI (needed for context-aware event mapping)
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum Panel {
    Sidebar,
    #[default]
    Url,
    Request,
    Results,
}

impl Panel {
    pub fn next(&self) -> Panel {
        match self {
            Panel::Sidebar => Panel::Url,
            Panel::Url => Panel::Request,
            Panel::Request => Panel::Results,
            Panel::Results => Panel::Sidebar,
        }
    }

    pub fn prev(&self) -> Panel {
        match self {
            Panel::Sidebar => Panel::Results,
            Panel::Url => Panel::Sidebar,
            Panel::Request => Panel::Url,
            Panel::Results => Panel::Request,
        }
    }
}

/// Tabs of the request panel
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum RequestTab {
    #[default]
    Params,
    Headers,
    Auth,
    Body,
}

impl RequestTab {
    pub const ALL: [RequestTab; 4] = [
        RequestTab::Params,
        RequestTab::Headers,
        RequestTab::Auth,
        RequestTab::Body,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            RequestTab::Params => "Params",
            RequestTab::Headers => "Headers",
            RequestTab::Auth => "Auth",
            RequestTab::Body => "Body",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    /// Next tab, stopping at the last one.
    pub fn next(&self) -> RequestTab {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    /// Previous tab, stopping at the first one.
    pub fn prev(&self) -> RequestTab {
        Self::ALL[self.index().saturating_sub(1)]
    }
}

/// Tabs of the results panel
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum ResultsTab {
    #[default]
    Response,
    Headers,
    Cookies,
    Stats,
}

impl ResultsTab {
    pub const ALL: [ResultsTab; 4] = [
        ResultsTab::Response,
        ResultsTab::Headers,
        ResultsTab::Cookies,
        ResultsTab::Stats,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ResultsTab::Response => "Response",
            ResultsTab::Headers => "Headers",
            ResultsTab::Cookies => "Cookies",
            ResultsTab::Stats => "Stats",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> ResultsTab {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    pub fn prev(&self) -> ResultsTab {
        Self::ALL[self.index().saturating_sub(1)]
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Which column of a key/value row is being edited
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum EditColumn {
    #[default]
    Key,
    Value,
}

/// Auth editing field
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum AuthField {
    #[default]
    Token,
    Username,
    Password,
    ApiHeader,
    ApiValue,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_panel: Panel,
    input_mode: InputMode,
    request_tab: RequestTab,
    show_help: bool,
    show_curl_import: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts (active in every mode)
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('l') => return Some(UiEvent::NextTab),
            KeyCode::Char('h') => return Some(UiEvent::PrevTab),
            KeyCode::Char('r') => return Some(UiEvent::CycleMethod),
            KeyCode::Char('s') => return Some(UiEvent::SaveCall),
            KeyCode::Char('e') if active_panel == Panel::Results => {
                return Some(UiEvent::ExportBody)
            }
            _ => {}
        }
    }

    // Popups swallow everything else
    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if show_curl_import {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::CancelCurlImport),
            KeyCode::Enter => Some(UiEvent::ImportCurl),
            KeyCode::Backspace => Some(UiEvent::CurlImportBackspace),
            KeyCode::Char(c) => Some(UiEvent::CurlImportChar(c)),
            _ => None,
        };
    }

    match input_mode {
        InputMode::Normal => normal_mode_key(key, active_panel, request_tab),
        InputMode::Editing => editing_mode_key(key, active_panel, request_tab),
    }
}

fn normal_mode_key(key: KeyEvent, active_panel: Panel, request_tab: RequestTab) -> Option<UiEvent> {
    let on_rows = active_panel == Panel::Request
        && matches!(request_tab, RequestTab::Params | RequestTab::Headers);

    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Char('i') if active_panel == Panel::Url => Some(UiEvent::ShowCurlImport),
        KeyCode::Char('c') => Some(UiEvent::ExportCurl),
        KeyCode::Tab => Some(UiEvent::NextPanel),
        KeyCode::BackTab => Some(UiEvent::PrevPanel),
        KeyCode::Enter => match active_panel {
            Panel::Url => Some(UiEvent::SubmitCall),
            Panel::Sidebar => Some(UiEvent::SelectEntry),
            Panel::Request if on_rows => Some(UiEvent::ToggleRow),
            Panel::Request => Some(UiEvent::StartEditing),
            Panel::Results => None,
        },
        KeyCode::Char(' ') if on_rows => Some(UiEvent::ToggleRow),
        KeyCode::Char('e') => match active_panel {
            Panel::Url | Panel::Request => Some(UiEvent::StartEditing),
            _ => None,
        },
        KeyCode::Up => match active_panel {
            Panel::Sidebar => Some(UiEvent::PrevEntry),
            Panel::Request if on_rows => Some(UiEvent::PrevRow),
            Panel::Results => Some(UiEvent::ScrollUp),
            _ => None,
        },
        KeyCode::Down => match active_panel {
            Panel::Sidebar => Some(UiEvent::NextEntry),
            Panel::Request if on_rows => Some(UiEvent::NextRow),
            Panel::Results => Some(UiEvent::ScrollDown),
            _ => None,
        },
        KeyCode::Char('a') if on_rows => Some(UiEvent::AddRow),
        KeyCode::Char('d') if on_rows => Some(UiEvent::DeleteRow),
        KeyCode::Char('d') if active_panel == Panel::Sidebar => Some(UiEvent::DeleteEntry),
        KeyCode::Char('n') if active_panel == Panel::Sidebar => Some(UiEvent::NewCall),
        KeyCode::Char('t') if active_panel == Panel::Request && request_tab == RequestTab::Auth => {
            Some(UiEvent::CycleAuth)
        }
        KeyCode::Char('b') if active_panel == Panel::Request && request_tab == RequestTab::Body => {
            Some(UiEvent::CycleBodyType)
        }
        _ => None,
    }
}

fn editing_mode_key(
    key: KeyEvent,
    active_panel: Panel,
    request_tab: RequestTab,
) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Tab if active_panel == Panel::Request => match request_tab {
            RequestTab::Params | RequestTab::Headers => Some(UiEvent::NextEditColumn),
            RequestTab::Auth => Some(UiEvent::NextAuthField),
            _ => None,
        },
        KeyCode::Enter => {
            if active_panel == Panel::Url {
                Some(UiEvent::SubmitCall)
            } else {
                Some(UiEvent::StopEditing)
            }
        }
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        let mut key = KeyEvent::new(code, modifiers);
        key.kind = KeyEventKind::Press;
        key
    }

    #[test]
    fn tab_cycling_clamps_at_both_ends() {
        assert_eq!(RequestTab::Params.prev(), RequestTab::Params);
        assert_eq!(RequestTab::Body.next(), RequestTab::Body);
        assert_eq!(ResultsTab::Response.prev(), ResultsTab::Response);
        assert_eq!(ResultsTab::Stats.next(), ResultsTab::Stats);

        let mut tab = RequestTab::Params;
        for _ in 0..10 {
            tab = tab.next();
        }
        assert_eq!(tab, RequestTab::Body);
    }

    #[test]
    fn enter_submits_from_the_url_bar_in_both_modes() {
        for mode in [InputMode::Normal, InputMode::Editing] {
            let event = key_to_ui_event(
                press(KeyCode::Enter, KeyModifiers::NONE),
                Panel::Url,
                mode,
                RequestTab::Params,
                false,
                false,
            );
            assert!(matches!(event, Some(UiEvent::SubmitCall)));
        }
    }

    #[test]
    fn export_is_only_offered_on_the_results_panel() {
        let ctrl_e = press(KeyCode::Char('e'), KeyModifiers::CONTROL);
        let on_results = key_to_ui_event(
            ctrl_e,
            Panel::Results,
            InputMode::Normal,
            RequestTab::Params,
            false,
            false,
        );
        assert!(matches!(on_results, Some(UiEvent::ExportBody)));

        let on_url = key_to_ui_event(
            ctrl_e,
            Panel::Url,
            InputMode::Normal,
            RequestTab::Params,
            false,
            false,
        );
        assert!(on_url.is_none());
    }

    #[test]
    fn method_cycle_works_while_editing() {
        let event = key_to_ui_event(
            press(KeyCode::Char('r'), KeyModifiers::CONTROL),
            Panel::Url,
            InputMode::Editing,
            RequestTab::Params,
            false,
            false,
        );
        assert!(matches!(event, Some(UiEvent::CycleMethod)));
    }
}
