use ratatui::{prelude::*, widgets::*};

use crate::models::HttpMethod;

/// Header line of a collapsible section, e.g. `▼ Headers (Optional)`
pub fn section_title(label: &str, open: bool) -> Line<'static> {
    let chevron = if open { "▲" } else { "▼" };
    Line::from(vec![
        Span::styled(format!("{} ", chevron), Style::default().fg(Color::DarkGray)),
        Span::styled(label.to_string(), Style::default().fg(Color::Gray)),
    ])
}

/// Method selector showing all four methods, the active one highlighted
pub fn render_method_tabs(selected: HttpMethod) -> Tabs<'static> {
    let titles: Vec<Line> = HttpMethod::ALL
        .iter()
        .map(|m| Line::from(m.as_str()))
        .collect();
    let index = HttpMethod::ALL
        .iter()
        .position(|m| *m == selected)
        .unwrap_or(0);

    Tabs::new(titles)
        .select(index)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(method_color(selected)).bold())
        .divider("|")
}

/// Simple JSON syntax highlighting for pretty-printed text
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    text.lines().map(highlight_json_line).collect()
}

fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut chars = line.char_indices().peekable();

    let flush = |plain: &mut String, spans: &mut Vec<Span<'static>>| {
        if !plain.is_empty() {
            spans.push(Span::raw(std::mem::take(plain)));
        }
    };

    while let Some((start, c)) = chars.next() {
        match c {
            '"' => {
                flush(&mut plain, &mut spans);
                let mut end = line.len();
                let mut escaped = false;
                for (i, ch) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == '"' {
                        end = i + 1;
                        break;
                    }
                }
                let literal = &line[start..end];
                let is_key = line[end..].trim_start().starts_with(':');
                let color = if is_key { Color::Cyan } else { Color::Green };
                spans.push(Span::styled(literal.to_string(), Style::default().fg(color)));
            }
            '{' | '}' | '[' | ']' => {
                flush(&mut plain, &mut spans);
                spans.push(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
            }
            '0'..='9' | '-' => {
                flush(&mut plain, &mut spans);
                let mut end = start + 1;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-') {
                        end = i + ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                spans.push(Span::styled(
                    line[start..end].to_string(),
                    Style::default().fg(Color::Yellow),
                ));
            }
            't' | 'f' | 'n' => {
                let rest = &line[start..];
                match ["true", "false", "null"].iter().find(|w| rest.starts_with(**w)) {
                    Some(word) => {
                        flush(&mut plain, &mut spans);
                        for _ in 1..word.len() {
                            chars.next();
                        }
                        spans.push(Span::styled(
                            word.to_string(),
                            Style::default().fg(Color::Magenta),
                        ));
                    }
                    None => plain.push(c),
                }
            }
            _ => plain.push(c),
        }
    }
    flush(&mut plain, &mut spans);

    Line::from(spans)
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
pub fn method_color(method: HttpMethod) -> Color {
    match method {
        HttpMethod::GET => Color::Green,
        HttpMethod::POST => Color::Yellow,
        HttpMethod::PUT => Color::Blue,
        HttpMethod::DELETE => Color::Red,
    }
}

/// Human readable byte count
pub fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Line and column of byte offset `pos` in `text`, counted in chars.
/// Offsets inside a char snap back to its start; values saturate at `u16::MAX`.
pub fn cursor_cell(text: &str, pos: usize) -> (u16, u16) {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    let before = &text[..pos];
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map_or(0, |line| line.chars().count());
    (
        u16::try_from(row).unwrap_or(u16::MAX),
        u16::try_from(col).unwrap_or(u16::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_key_and_value() {
        let lines = highlight_json(r#"  "login": "octocat","#);
        let line = &lines[0];
        assert_eq!(span_texts(line), vec!["  ", "\"login\"", ": ", "\"octocat\"", ","]);
        assert_eq!(line.spans[1].style.fg, Some(Color::Cyan));
        assert_eq!(line.spans[3].style.fg, Some(Color::Green));
    }

    #[test]
    fn test_highlight_literals() {
        let lines = highlight_json(r#"  "id": -12.5e3, "ok": true, "x": null"#);
        let texts = span_texts(&lines[0]);
        assert!(texts.contains(&"-12.5e3".to_string()));
        assert!(texts.contains(&"true".to_string()));
        assert!(texts.contains(&"null".to_string()));
    }

    #[test]
    fn test_highlight_keeps_text_intact() {
        let text = "{\n  \"a\": [1, \"b \\\" c\"],\n  \"t\": false\n}";
        let rebuilt: Vec<String> = highlight_json(text)
            .iter()
            .map(|l| span_texts(l).concat())
            .collect();
        assert_eq!(rebuilt.join("\n"), text);
    }

    #[test]
    fn test_cursor_cell_counts_chars() {
        let url = "https://例え.jp/é";
        assert_eq!(cursor_cell(url, url.len()), (0, 15));
        assert_eq!(cursor_cell(url, 9), (0, 8));
        // Inside the two-byte 'é'
        assert_eq!(cursor_cell(url, url.len() - 1), (0, 14));
        assert_eq!(cursor_cell("{\n  \"a\"", 9), (1, 5));
    }

    #[test]
    fn test_cursor_cell_saturates() {
        let long = "a".repeat(70_000);
        assert_eq!(cursor_cell(&long, long.len()), (0, u16::MAX));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
