//! Rester - actor-based terminal REST client
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Dispatch Layer (Tokio) - async HTTP execution

mod models;
mod storage;
mod ui;
mod curl;
mod error;
mod export;
mod messages;
mod app;
mod network;
mod constants;

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

use app::{AppActor, AppState};
use constants::{APP_NAME, APP_VERSION, LOG_FILE, URL_PLACEHOLDER};
use messages::ui_events::{
    key_to_ui_event, AuthField, EditColumn, InputMode, Panel, RequestTab, ResultsTab,
};
use messages::{CallEvent, DispatchCommand, RenderState, UiEvent};
use models::{Auth, ContentType, Row};
use network::{DispatchActor, Dispatcher};
use storage::Storage;
use ui::{centered_rect, highlight_numbered, method_color, pane_style, spinner_frame, status_color};

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
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<DispatchCommand>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<CallEvent>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn dispatch actor
    let dispatch_actor = DispatchActor::new(event_tx);
    tokio::spawn(dispatch_actor.run(cmd_rx));

    // Spawn app actor
    let state = AppState::new(Dispatcher::new(cmd_tx), Storage::new());
    let app_actor = AppActor::new(state, render_tx);
    tokio::spawn(app_actor.run(ui_rx, event_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();
    let mut tick: usize = 0;

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state, tick))?;
        tick = tick.wrapping_add(1);

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(event) = key_to_ui_event(
                        key,
                        current_state.active_panel,
                        current_state.input_mode,
                        current_state.request_tab,
                        current_state.show_help,
                        current_state.show_curl_import,
                    ) {
                        match event {
                            UiEvent::Quit => {
                                let _ = ui_tx.send(UiEvent::Quit);
                                break;
                            }
                            // Export suspends the terminal, so it runs
                            // here instead of crossing into the app actor
                            UiEvent::ExportBody => {
                                let outcome =
                                    run_export(terminal, current_state.results_body.as_deref())?;
                                let _ = ui_tx.send(UiEvent::Notify(outcome));
                            }
                            event => {
                                let _ = ui_tx.send(event);
                            }
                        }
                    }
                }
                Event::Resize(width, height) => {
                    let _ = ui_tx.send(UiEvent::Resized(width, height));
                }
                _ => {}
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

/// Write the rendered body to a file and open $EDITOR over a suspended
/// terminal. Returns the message shown in the status bar afterwards.
fn run_export(
    terminal: &mut Terminal<impl Backend>,
    body: Option<&str>,
) -> anyhow::Result<String> {
    let path = match export::export_formatted(body) {
        Ok(Some(path)) => path,
        Ok(None) => return Ok(String::from("Nothing to export")),
        Err(e) => return Ok(format!("Export failed: {}", e)),
    };

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    let opened = export::open_in_editor(&path);

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    terminal.clear()?;

    Ok(match opened {
        Ok(()) => format!("Exported to {}", path.display()),
        Err(e) => format!("{} (file kept at {})", e, path.display()),
    })
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState, tick: usize) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(28), Constraint::Min(40)])
        .split(main_chunks[0]);

    draw_sidebar(f, state, content[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Method + URL
            Constraint::Length(9), // Request tabs
            Constraint::Min(5),    // Results
        ])
        .split(content[1]);

    draw_url_bar(f, state, tick, right[0]);
    draw_request_panel(f, state, right[1]);
    draw_results_panel(f, state, tick, right[2]);

    draw_status_bar(f, state, main_chunks[1]);

    // Popups
    if state.show_help {
        draw_help_popup(f, area);
    }

    if state.show_curl_import {
        draw_curl_import_popup(f, state, area);
    }
}

fn draw_sidebar(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Sidebar;

    let items: Vec<ListItem> = state
        .sidebar
        .iter()
        .map(|row| match &row.method {
            Some(method) => {
                let marker = if row.dirty { " *" } else { "" };
                let name_style = if row.active {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("  {:<7}", method.as_str()),
                        Style::default().fg(method_color(method)),
                    ),
                    Span::styled(row.label.clone(), name_style),
                    Span::styled(marker.to_string(), Style::default().fg(Color::Yellow)),
                ]))
            }
            None => ListItem::new(Span::styled(
                row.label.clone(),
                Style::default().fg(Color::Magenta).bold(),
            )),
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(pane_style(is_focused))
                .title(" Calls (n:new d:delete Enter:open) "),
        )
        .highlight_style(Style::default().fg(Color::Yellow).bold());

    let mut list_state = ListState::default();
    if is_focused && !state.sidebar.is_empty() {
        list_state.select(Some(state.sidebar_index.min(state.sidebar.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_url_bar(f: &mut Frame, state: &RenderState, tick: usize, area: Rect) {
    let is_focused = state.active_panel == Panel::Url;
    let editing = is_focused && state.input_mode == InputMode::Editing;

    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        pane_style(is_focused)
    };

    let (method, url) = match &state.call {
        Some(call) => (call.method.as_str(), call.url.as_str()),
        None => ("---", ""),
    };
    let dirty = if state.dirty { " *" } else { "" };
    let loading = if state.is_loading {
        format!(" {}", spinner_frame(tick))
    } else {
        String::new()
    };
    let mcolor = state
        .call
        .as_ref()
        .map(|c| method_color(&c.method))
        .unwrap_or(Color::DarkGray);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {}{}{} ", method, dirty, loading))
        .title_style(Style::default().fg(mcolor).bold());

    let input = if url.is_empty() && !editing {
        Paragraph::new(Span::styled(
            URL_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
        .block(block)
    } else {
        Paragraph::new(url).block(block)
    };
    f.render_widget(input, area);

    // Cursor
    if editing {
        let max_x = area.x + area.width.saturating_sub(2);
        let cursor_x = (area.x + state.cursor_position as u16 + 1).min(max_x);
        f.set_cursor_position(Position::new(cursor_x, area.y + 1));
    }
}

fn draw_request_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Request;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    // Tab strip with live badges
    let titles: Vec<String> = RequestTab::ALL
        .iter()
        .map(|tab| match (tab, &state.call) {
            (RequestTab::Params, Some(call)) => format!("Params({})", call.params_count()),
            (RequestTab::Headers, Some(call)) => format!("Headers({})", call.headers_count()),
            (RequestTab::Auth, Some(call)) => format!("Auth:{}", call.auth.label()),
            (RequestTab::Body, Some(call)) => match &call.body {
                Some(body) => format!("Body:{}", body.content_type.label()),
                None => String::from("Body"),
            },
            (tab, None) => tab.title().to_string(),
        })
        .collect();
    f.render_widget(ui::render_tabs(titles, state.request_tab.index()), chunks[0]);

    match state.request_tab {
        RequestTab::Params | RequestTab::Headers => draw_rows_tab(f, state, is_focused, chunks[1]),
        RequestTab::Auth => draw_auth_tab(f, state, is_focused, chunks[1]),
        RequestTab::Body => draw_body_tab(f, state, is_focused, chunks[1]),
    }
}

fn draw_rows_tab(f: &mut Frame, state: &RenderState, is_focused: bool, area: Rect) {
    let editing = is_focused && state.input_mode == InputMode::Editing;

    let rows: &[Row] = match (&state.call, state.request_tab) {
        (Some(call), RequestTab::Params) => &call.params,
        (Some(call), _) => &call.headers,
        (None, _) => &[],
    };

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = is_focused && i == state.selected_row;
            let style = if !row.enabled {
                Style::default().fg(Color::DarkGray)
            } else if selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default()
            };
            let key_style = if selected && editing && state.edit_column == EditColumn::Key {
                style.underlined()
            } else {
                style
            };
            let value_style = if selected && editing && state.edit_column == EditColumn::Value {
                style.underlined()
            } else {
                style
            };
            let prefix = if row.enabled { "[x] " } else { "[ ] " };
            ListItem::new(Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(row.key.clone(), key_style),
                Span::styled(": ", style),
                Span::styled(row.value.clone(), value_style),
            ]))
        })
        .collect();

    let title = match state.request_tab {
        RequestTab::Params => " Query params (a:add d:del space:toggle) ",
        _ => " Headers (a:add d:del space:toggle) ",
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if editing {
                Style::default().fg(Color::Yellow)
            } else {
                pane_style(is_focused)
            })
            .title(title),
    );
    f.render_widget(list, area);
}

fn draw_auth_tab(f: &mut Frame, state: &RenderState, is_focused: bool, area: Rect) {
    let editing = is_focused && state.input_mode == InputMode::Editing;

    let lines: Vec<Line> = match state.call.as_ref().map(|c| &c.auth) {
        Some(Auth::None) | None => {
            vec![Line::from(Span::styled(
                "No auth. Press 't' to cycle the auth type.",
                Style::default().fg(Color::DarkGray),
            ))]
        }
        Some(Auth::Bearer(token)) => vec![auth_field_line(
            "Token",
            token,
            false,
            editing && state.auth_field == AuthField::Token,
        )],
        Some(Auth::Basic { username, password }) => vec![
            auth_field_line(
                "User",
                username,
                false,
                editing && state.auth_field == AuthField::Username,
            ),
            auth_field_line(
                "Pass",
                password,
                true,
                editing && state.auth_field == AuthField::Password,
            ),
        ],
        Some(Auth::ApiKey { header, value }) => vec![
            auth_field_line(
                "Header",
                header,
                false,
                editing && state.auth_field == AuthField::ApiHeader,
            ),
            auth_field_line(
                "Value",
                value,
                false,
                editing && state.auth_field == AuthField::ApiValue,
            ),
        ],
    };

    let label = state.call.as_ref().map(|c| c.auth.label()).unwrap_or("None");
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if editing {
            Style::default().fg(Color::Yellow)
        } else {
            pane_style(is_focused)
        })
        .title(format!(" Auth: {} (t:cycle Tab:field) ", label));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn auth_field_line(name: &str, value: &str, mask: bool, active: bool) -> Line<'static> {
    let shown = if value.is_empty() {
        String::from("<empty>")
    } else if mask {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let marker = if active { "> " } else { "  " };
    Line::from(vec![
        Span::styled(
            format!("{}{}: ", marker, name),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(shown),
    ])
}

fn draw_body_tab(f: &mut Frame, state: &RenderState, is_focused: bool, area: Rect) {
    let editing = is_focused && state.input_mode == InputMode::Editing;

    let (content, kind) = match state.call.as_ref().and_then(|c| c.body.as_ref()) {
        Some(body) => (body.content.as_str(), body.content_type.label()),
        None => ("", ContentType::Json.label()),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if editing {
            Style::default().fg(Color::Yellow)
        } else {
            pane_style(is_focused)
        })
        .title(format!(" Body: {} (b:type e:edit) ", kind));

    let body = if content.is_empty() && !editing {
        Paragraph::new(Span::styled(
            "Press 'e' to write a body",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block)
    } else {
        Paragraph::new(content).block(block).wrap(Wrap { trim: false })
    };
    f.render_widget(body, area);

    if editing {
        let max_x = area.x + area.width.saturating_sub(2);
        let cursor_x = (area.x + state.cursor_position as u16 + 1).min(max_x);
        f.set_cursor_position(Position::new(cursor_x, area.y + 1));
    }
}

fn draw_results_panel(f: &mut Frame, state: &RenderState, tick: usize, area: Rect) {
    let is_focused = state.active_panel == Panel::Results;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let titles: Vec<String> = ResultsTab::ALL
        .iter()
        .map(|t| t.title().to_string())
        .collect();
    f.render_widget(ui::render_tabs(titles, state.results_tab.index()), chunks[0]);

    match state.results_tab {
        ResultsTab::Response => draw_response_tab(f, state, is_focused, tick, chunks[1]),
        ResultsTab::Headers => draw_result_headers_tab(f, state, is_focused, chunks[1]),
        ResultsTab::Cookies => draw_cookies_tab(f, state, is_focused, chunks[1]),
        ResultsTab::Stats => draw_stats_tab(f, state, is_focused, chunks[1]),
    }
}

fn draw_response_tab(
    f: &mut Frame,
    state: &RenderState,
    is_focused: bool,
    tick: usize,
    area: Rect,
) {
    let status_title = match state.status {
        0 => Span::raw(" Response "),
        code => Span::styled(
            format!(" {} ", code),
            Style::default().fg(status_color(code)).bold(),
        ),
    };
    let time_text = state
        .result
        .as_ref()
        .map(|r| format!(" {}ms ", r.elapsed_ms))
        .unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_style(is_focused))
        .title(status_title)
        .title_bottom(Line::from(time_text).right_aligned());

    let paragraph = if state.is_loading {
        Paragraph::new(Span::styled(
            format!("{} waiting", spinner_frame(tick)),
            Style::default().fg(Color::Yellow),
        ))
        .block(block)
    } else {
        match &state.results_body {
            Some(body) if state.result_is_error => Paragraph::new(body.as_str())
                .style(Style::default().fg(Color::Red))
                .block(block)
                .wrap(Wrap { trim: false }),
            // Numbered bodies never wrap, the gutter has to stay aligned
            Some(body) if state.result.is_some() => Paragraph::new(highlight_numbered(body))
                .block(block)
                .scroll((state.results_scroll, 0)),
            Some(body) => Paragraph::new(body.as_str())
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((state.results_scroll, 0)),
            None => Paragraph::new(Span::styled(
                "Hit Enter on the URL to send the call",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
        }
    };
    f.render_widget(paragraph, area);
}

fn draw_result_headers_tab(f: &mut Frame, state: &RenderState, is_focused: bool, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_style(is_focused))
        .title(" Response headers ");

    let lines: Vec<Line> = match &state.result {
        Some(result) if !result.headers.is_empty() => result
            .headers
            .iter()
            .map(|(k, v)| {
                Line::from(vec![
                    Span::styled(format!("{}: ", k), Style::default().fg(Color::Cyan)),
                    Span::raw(v.clone()),
                ])
            })
            .collect(),
        Some(_) => vec![Line::from("No headers on the response")],
        None => vec![Line::from(Span::styled(
            "No response yet",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .scroll((state.results_scroll, 0)),
        area,
    );
}

fn draw_cookies_tab(f: &mut Frame, state: &RenderState, is_focused: bool, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_style(is_focused))
        .title(" Cookies ");

    // Set-Cookie rows straight off the response, there is no jar
    let cookies: Vec<Line> = state
        .result
        .iter()
        .flat_map(|r| &r.headers)
        .filter(|(k, _)| k.eq_ignore_ascii_case("set-cookie"))
        .map(|(_, v)| Line::from(v.clone()))
        .collect();

    let lines = if cookies.is_empty() {
        vec![Line::from(Span::styled(
            "No cookies on the response",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        cookies
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_stats_tab(f: &mut Frame, state: &RenderState, is_focused: bool, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_style(is_focused))
        .title(" Stats ");

    let lines: Vec<Line> = match &state.result {
        Some(result) => vec![
            stat_line("Status", result.status.to_string()),
            stat_line("Time", format!("{} ms", result.elapsed_ms)),
            stat_line("Size", format!("{} bytes", result.body_bytes())),
            stat_line("Headers", result.headers.len().to_string()),
        ],
        None => vec![Line::from(Span::styled(
            "No response yet",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn stat_line(name: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:>8}:  ", name),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(value),
    ])
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let bar = match &state.notice {
        Some(notice) => Paragraph::new(format!(" {} ", notice))
            .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
        None => {
            let hints = if state.input_mode == InputMode::Editing {
                " ESC:stop editing | arrows:move | Tab:next field | Enter:done "
            } else {
                " Tab:panel | e:edit | Enter:send | ^r:method | ^s:save | ^e:export | ?:help | q:quit "
            };
            Paragraph::new(hints).style(Style::default().fg(Color::DarkGray))
        }
    };
    f.render_widget(bar, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 Keyboard Shortcuts

 NAVIGATION
   Tab / Shift+Tab    Switch panels
   Ctrl+L / Ctrl+H    Switch tabs inside a panel
   Up / Down          Move in lists, scroll results

 CALLS (sidebar)
   n                  New call
   d                  Delete call
   Enter              Open call

 REQUEST
   Enter              Send call (URL bar)
   Ctrl+R             Cycle HTTP method
   Ctrl+S             Save call
   e                  Edit the field under the cursor
   a / d              Add / delete row (params, headers)
   Space              Toggle row on or off
   t                  Cycle auth type (Auth tab)
   b                  Cycle body type (Body tab)

 RESULTS
   Ctrl+E             Export body to $EDITOR

 CURL
   i                  Import cURL (URL panel)
   c                  Copy call as cURL

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} {} ", APP_NAME, APP_VERSION))
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn draw_curl_import_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(80, 30, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Import cURL (Enter to import, Esc to cancel) ")
        .style(Style::default().bg(Color::Black));

    let content = if state.curl_import_buffer.is_empty() {
        "Paste cURL command here..."
    } else {
        &state.curl_import_buffer
    };

    let input = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}
