//! Widget helpers shared by the draw functions

use ratatui::{prelude::*, widgets::*};

use crate::models::{HeaderPairs, HttpMethod};

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Bordered block, yellow when focused
pub fn panel_block(title: &str, is_focused: bool) -> Block<'_> {
    let style = if is_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

/// `key: value` lines for a header mapping
pub fn header_lines(headers: &HeaderPairs) -> Vec<Line<'static>> {
    headers
        .iter()
        .map(|(key, value)| {
            Line::from(vec![
                Span::styled(format!("{}: ", key), Style::default().fg(Color::Cyan)),
                Span::raw(value.clone()),
            ])
        })
        .collect()
}

/// Body text, highlighted when it looks like JSON
pub fn body_lines(body: &str) -> Vec<Line<'static>> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        highlight_json(body)
    } else {
        body.lines().map(|l| Line::from(l.to_string())).collect()
    }
}

/// Simple JSON syntax highlighting, one token pass per line
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    text.lines().map(highlight_json_line).collect()
}

fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        let len = match c {
            '"' => {
                let end = string_end(rest);
                let is_key = rest[end..].trim_start().starts_with(':');
                let color = if is_key { Color::Cyan } else { Color::Green };
                spans.push(Span::styled(rest[..end].to_string(), Style::default().fg(color)));
                end
            }
            '{' | '}' | '[' | ']' => {
                spans.push(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
                1
            }
            '-' | '0'..='9' => {
                let end = rest
                    .find(|ch: char| !(ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e' | 'E')))
                    .unwrap_or(rest.len());
                spans.push(Span::styled(rest[..end].to_string(), Style::default().fg(Color::Yellow)));
                end
            }
            _ => {
                if let Some(word) = ["true", "false", "null"].iter().find(|w| rest.starts_with(**w)) {
                    spans.push(Span::styled(word.to_string(), Style::default().fg(Color::Magenta)));
                    word.len()
                } else {
                    let end = rest
                        .find(|ch: char| matches!(ch, '"' | '{' | '}' | '[' | ']' | '-' | '0'..='9' | 't' | 'f' | 'n'))
                        .filter(|&i| i > 0)
                        .unwrap_or(c.len_utf8());
                    spans.push(Span::raw(rest[..end].to_string()));
                    end
                }
            }
        };
        rest = &rest[len..];
    }

    Line::from(spans)
}

/// Byte offset just past the closing quote of the string starting at `s[0]`
fn string_end(s: &str) -> usize {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return i + 1,
            _ => escaped = false,
        }
    }
    s.len()
}

/// Status badge color
pub fn status_color(status: &str) -> Color {
    if status.contains("200") {
        Color::Green
    } else if matches!(status, "Error" | "Failed") {
        Color::Red
    } else if status.starts_with('2') || status.starts_with('3') {
        Color::Cyan
    } else if status.starts_with('4') || status.starts_with('5') {
        Color::Magenta
    } else {
        Color::Yellow
    }
}

/// Method color
pub fn method_color(method: HttpMethod) -> Color {
    match method {
        HttpMethod::GET => Color::Green,
        HttpMethod::POST => Color::Yellow,
        HttpMethod::PUT => Color::Blue,
        HttpMethod::PATCH => Color::Cyan,
        HttpMethod::DELETE => Color::Red,
    }
}

/// Helper function to create a centered rect
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

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_preserves_text() {
        let src = r#"  {"name": "ghost\"wire", "count": -1.5e3, "ok": true, "none": null}"#;
        let lines = highlight_json(src);
        assert_eq!(text(&lines[0]), src);
    }

    #[test]
    fn test_keys_and_values_colored_differently() {
        let lines = highlight_json(r#"{"id": "abc"}"#);
        let key = lines[0].spans.iter().find(|s| s.content == "\"id\"").unwrap();
        let value = lines[0].spans.iter().find(|s| s.content == "\"abc\"").unwrap();
        assert_eq!(key.style.fg, Some(Color::Cyan));
        assert_eq!(value.style.fg, Some(Color::Green));
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color("200 OK"), Color::Green);
        assert_eq!(status_color("Error"), Color::Red);
        assert_eq!(status_color("404 Not Found"), Color::Magenta);
        assert_eq!(status_color("Done"), Color::Yellow);
    }
}
