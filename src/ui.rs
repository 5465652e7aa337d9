use ratatui::{prelude::*, widgets::*};
use serde_json::Value;

pub const SPINNER_FRAMES: [&str; 4] = ["∙∙∙", "●∙∙", "∙●∙", "∙∙●"];

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Pretty-print a response body when it parses as JSON. Text that does
/// not parse is passed through untouched, and a body that is just
/// `null` also comes back raw.
pub fn format_body(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) | Err(_) => raw.to_string(),
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string()),
    }
}

/// Prefix each line with a right-aligned line number and two spaces.
/// The gutter width is the digit count of the last line number, so the
/// body text starts at the same column on every line.
pub fn number_lines(text: &str) -> String {
    let total = text.lines().count();
    let width = total.to_string().len();
    text.lines()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}  {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn a numbered body into styled lines: dim gutter, highlighted
/// JSON. The gutter width is re-derived from the line count, so this
/// only makes sense on text produced by `number_lines`.
pub fn highlight_numbered(numbered: &str) -> Vec<Line<'static>> {
    let total = numbered.lines().count();
    let width = total.to_string().len();
    let prefix_len = width + 2;

    numbered
        .lines()
        .map(|line| {
            if line.len() < prefix_len {
                return Line::raw(line.to_string());
            }
            let (gutter, rest) = line.split_at(prefix_len);
            let mut spans = vec![Span::styled(
                gutter.to_string(),
                Style::default().fg(Color::DarkGray),
            )];
            spans.extend(highlight_json_line(rest));
            Line::from(spans)
        })
        .collect()
}

/// Simple JSON syntax highlighting for one line. String escapes are
/// not tracked; a pretty-printed body keeps them rare enough.
fn highlight_json_line(line: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut is_key = false;

    for (i, c) in line.char_indices() {
        if in_string {
            current.push(c);
            if c == '"' {
                let color = if is_key { Color::Cyan } else { Color::Green };
                spans.push(Span::styled(current.clone(), Style::default().fg(color)));
                current.clear();
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                flush_token(&mut spans, &mut current);
                in_string = true;
                // A string is a key when a colon follows its closing quote
                is_key = line[i + 1..]
                    .split_once('"')
                    .map_or(false, |(_, rest)| rest.trim_start().starts_with(':'));
                current.push(c);
            }
            ':' | ',' => {
                flush_token(&mut spans, &mut current);
                spans.push(Span::styled(
                    c.to_string(),
                    Style::default().fg(Color::White),
                ));
            }
            '{' | '}' | '[' | ']' => {
                flush_token(&mut spans, &mut current);
                spans.push(Span::styled(
                    c.to_string(),
                    Style::default().fg(Color::Yellow),
                ));
            }
            _ => current.push(c),
        }
    }
    flush_token(&mut spans, &mut current);
    spans
}

fn flush_token(spans: &mut Vec<Span<'static>>, current: &mut String) {
    if current.is_empty() {
        return;
    }
    let token = current.trim();
    let color = if token == "true" || token == "false" || token == "null" {
        Some(Color::Magenta)
    } else if !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
    {
        Some(Color::Yellow)
    } else {
        None
    };
    match color {
        Some(color) => spans.push(Span::styled(
            current.clone(),
            Style::default().fg(color),
        )),
        None => spans.push(Span::raw(current.clone())),
    }
    current.clear();
}

/// Border style for a pane, by focus
pub fn pane_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Renders tabs
pub fn render_tabs<'a>(titles: Vec<String>, selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.into_iter().map(Line::from).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Status code color
pub fn status_color(code: u16) -> Color {
    match code {
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=499 => Color::Red,
        500..=599 => Color::Magenta,
        _ => Color::Yellow,
    }
}

/// Method color
pub fn method_color(method: &crate::models::Method) -> Color {
    use crate::models::Method;
    match method {
        Method::GET => Color::Green,
        Method::POST => Color::Yellow,
        Method::PUT => Color::Blue,
        Method::DELETE => Color::Red,
    }
}

/// Centered popup area, sized as a percentage of the surrounding rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_bodies_are_pretty_printed_with_two_space_indent() {
        let formatted = format_body(r#"{"name":"ada","tags":[1,2]}"#);
        assert_eq!(
            formatted,
            "{\n  \"name\": \"ada\",\n  \"tags\": [\n    1,\n    2\n  ]\n}"
        );
    }

    #[test]
    fn non_json_and_bare_null_pass_through_untouched() {
        assert_eq!(format_body("plain text, not json"), "plain text, not json");
        assert_eq!(format_body("null"), "null");
        assert_eq!(format_body("<html></html>"), "<html></html>");
    }

    #[test]
    fn line_numbers_are_right_aligned_to_the_widest() {
        let text = (0..12).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let numbered = number_lines(&text);
        let lines: Vec<&str> = numbered.lines().collect();
        assert_eq!(lines.len(), 12);
        assert!(lines[0].starts_with(" 1  line0"));
        assert!(lines[9].starts_with("10  line9"));
        assert!(lines[11].starts_with("12  line11"));
    }

    #[test]
    fn single_digit_bodies_use_a_one_column_gutter() {
        let numbered = number_lines("{\n  \"a\": 1\n}");
        assert_eq!(numbered, "1  {\n2    \"a\": 1\n3  }");
    }

    #[test]
    fn stripping_the_gutter_recovers_the_formatted_body() {
        let pretty = format_body(r#"{"a":{"b":[true,null,2.5]}}"#);
        let numbered = number_lines(&pretty);
        let width = numbered.lines().count().to_string().len();
        let recovered = numbered
            .lines()
            .map(|l| &l[width + 2..])
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(recovered, pretty);
    }

    #[test]
    fn highlighting_keeps_the_line_count_and_dims_the_gutter() {
        let numbered = number_lines(&format_body(r#"{"ok":true}"#));
        let lines = highlight_numbered(&numbered);
        assert_eq!(lines.len(), numbered.lines().count());
        assert_eq!(
            lines[0].spans[0].style.fg,
            Some(Color::DarkGray)
        );
    }

    #[test]
    fn spinner_wraps_around() {
        assert_eq!(spinner_frame(0), spinner_frame(SPINNER_FRAMES.len()));
        assert_ne!(spinner_frame(0), spinner_frame(1));
    }
}
