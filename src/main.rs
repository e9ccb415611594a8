//! CurlUp - Actor-based HTTP request composer
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - query panel state machine processing events
//! - Network Layer (Tokio) - async dispatch with a read cache

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use curlup::app::{AppActor, AppState};
use curlup::config::Config;
use curlup::constants::{APP_NAME, APP_VERSION};
use curlup::draft::RequestDraft;
use curlup::messages::ui_events::{key_to_ui_event, InputMode, Panel};
use curlup::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use curlup::models::{HeaderField, ResponseState};
use curlup::network::{NetworkActor, ReqwestTransport, RequestDispatcher};
use curlup::ui::{
    cursor_cell, format_size, highlight_json, method_color, render_method_tabs, section_title,
    status_color,
};

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
    let config = Config::load().context("loading configuration")?;

    // Initialize logging to file; the terminal belongs to the UI
    let log_dir = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_name = config
        .log_file
        .file_name()
        .context("log_file must name a file")?;
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    tracing::info!(version = APP_VERSION, url = %config.default_url, "Starting {}", APP_NAME);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // One dispatcher (and read cache) per session
    let transport = Arc::new(ReqwestTransport::new(config.timeout()));
    let dispatcher =
        RequestDispatcher::with_gc_time(transport, config.stale_time(), config.gc_time());

    // Spawn network actor
    let network_actor = NetworkActor::new(dispatcher, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let state = AppState::new(RequestDraft::new(config.default_url.clone()));
    let app_actor = AppActor::new(state, net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        terminal.draw(|f| draw_ui(f, &current_state))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.active_panel,
                    current_state.input_mode,
                    current_state.show_help,
                ) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let body_height = if !state.method.shows_body_editor() {
        0
    } else if state.body_open {
        8
    } else {
        1
    };
    let headers_height = if state.headers_open {
        (state.headers.len() as u16 + 3).clamp(4, 10)
    } else {
        1
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),              // Title
            Constraint::Length(3),              // Method + URL
            Constraint::Length(body_height),    // Body section
            Constraint::Length(headers_height), // Headers section
            Constraint::Length(1),              // Submit
            Constraint::Min(5),                 // Response
            Constraint::Length(1),              // Status bar
        ])
        .split(area);

    draw_title(f, chunks[0]);
    draw_request_line(f, state, chunks[1]);
    if body_height > 0 {
        draw_body_section(f, state, chunks[2]);
    }
    draw_headers_section(f, state, chunks[3]);
    draw_submit(f, state, chunks[4]);
    draw_response(f, state, chunks[5]);
    draw_status_bar(f, state, chunks[6]);

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", APP_NAME), Style::default().fg(Color::Black).bg(Color::Blue).bold()),
        Span::styled(" New Request", Style::default().bold()),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

fn focus_style(state: &RenderState, panel: Panel) -> Style {
    let is_focused = state.active_panel == panel;
    if is_focused && state.input_mode == InputMode::Editing {
        Style::default().fg(Color::Yellow)
    } else if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_request_line(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(10)])
        .split(area);

    let method_block = Block::default()
        .borders(Borders::ALL)
        .title(" Method (m) ");
    f.render_widget(render_method_tabs(state.method).block(method_block), chunks[0]);

    let url_block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state, Panel::Url))
        .title(" URL ")
        .title_style(Style::default().fg(method_color(state.method)).bold());
    let url = if state.url.is_empty() {
        Paragraph::new(Span::styled("Enter URL", Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(state.url.as_str())
    };
    f.render_widget(url.block(url_block), chunks[1]);

    if state.active_panel == Panel::Url && state.input_mode == InputMode::Editing {
        let area = chunks[1];
        let max_x = area.x + area.width.saturating_sub(2);
        let (_, col) = cursor_cell(&state.url, state.cursor_position);
        let cursor_x = area.x.saturating_add(col).saturating_add(1).min(max_x);
        f.set_cursor_position(Position::new(cursor_x, area.y + 1));
    }
}

fn draw_body_section(f: &mut Frame, state: &RenderState, area: Rect) {
    if !state.body_open {
        let mut line = section_title("Request Body (JSON)", false);
        if state.active_panel == Panel::Body {
            line = line.patch_style(Style::default().fg(Color::Cyan));
        }
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state, Panel::Body))
        .title(section_title("Request Body (JSON)", true));

    let body = if state.body.is_empty() {
        Paragraph::new(Span::styled(r#"{"key": "value"}"#, Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(state.body.as_str())
    };
    f.render_widget(body.block(block).wrap(Wrap { trim: false }), area);

    if state.active_panel == Panel::Body && state.input_mode == InputMode::Editing {
        let (row, col) = cursor_cell(&state.body, state.cursor_position);
        let max_x = area.x + area.width.saturating_sub(2);
        let max_y = area.y + area.height.saturating_sub(2);
        f.set_cursor_position(Position::new(
            area.x.saturating_add(col).saturating_add(1).min(max_x),
            area.y.saturating_add(row).saturating_add(1).min(max_y),
        ));
    }
}

fn draw_headers_section(f: &mut Frame, state: &RenderState, area: Rect) {
    if !state.headers_open {
        let mut line = section_title("Headers (Optional)", false);
        if state.active_panel == Panel::Headers {
            line = line.patch_style(Style::default().fg(Color::Cyan));
        }
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let is_focused = state.active_panel == Panel::Headers;
    let editing = is_focused && state.input_mode == InputMode::Editing;

    let items: Vec<ListItem> = if state.headers.is_empty() {
        vec![ListItem::new(Span::styled(
            "No headers. Press 'a' to add one.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        state
            .headers
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let selected = is_focused && i == state.selected_header;
                let field_style = |field: HeaderField| {
                    if selected && editing && state.header_field == field {
                        Style::default().fg(Color::Black).bg(Color::Yellow)
                    } else if selected {
                        Style::default().fg(Color::Yellow).bold()
                    } else {
                        Style::default()
                    }
                };
                let key = if row.key.is_empty() { "Key" } else { row.key.as_str() };
                let value = if row.value.is_empty() { "Value" } else { row.value.as_str() };
                ListItem::new(Line::from(vec![
                    Span::styled(key.to_string(), field_style(HeaderField::Key)),
                    Span::raw(": "),
                    Span::styled(value.to_string(), field_style(HeaderField::Value)),
                ]))
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(state, Panel::Headers))
            .title(section_title("Headers (Optional)", true))
            .title_bottom(Line::from(" a:add d:delete e:edit Tab:key/value ").right_aligned()),
    );
    f.render_widget(list, area);
}

fn draw_submit(f: &mut Frame, state: &RenderState, area: Rect) {
    let style = if state.is_busy {
        Style::default().fg(Color::DarkGray).bg(Color::Black)
    } else {
        Style::default().fg(Color::Black).bg(Color::Blue).bold()
    };
    let button = Paragraph::new(format!("➤ {}", state.submit_label()))
        .alignment(Alignment::Center)
        .style(style);
    f.render_widget(button, area);
}

fn draw_response(f: &mut Frame, state: &RenderState, area: Rect) {
    let border_style = if state.active_panel == Panel::Response {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    // Latest successful response decides the title
    let latest = state.write.data().or_else(|| state.read.data());
    let mut title = match latest {
        Some(resp) => Line::from(vec![
            Span::styled(format!(" {} {} ", resp.status, resp.status_text), Style::default().fg(status_color(resp.status)).bold()),
        ]),
        None => Line::from(" Response "),
    };
    if state.read_stale && state.read.data().is_some() {
        title.push_span(Span::styled("(stale) ", Style::default().fg(Color::DarkGray)));
    }
    let meta = latest
        .map(|resp| format!(" {}ms | {} ", resp.time_ms, format_size(resp.size_bytes)))
        .unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_bottom(Line::from(meta).right_aligned());

    // Only success payloads are rendered; errors go to the status bar
    let mut lines = Vec::new();
    for slot in [&state.read, &state.write] {
        if let ResponseState::Success(resp) = slot {
            lines.extend(highlight_json(&resp.pretty()));
        }
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Press 's' to send the request.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let response = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.response_scroll, 0));
    f.render_widget(response, area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let (status, style) = if state.is_busy {
        (String::from(" Sending... "), Style::default().fg(Color::DarkGray))
    } else if let Some(error) = &state.last_error {
        (format!(" Error: {} ", error), Style::default().fg(Color::Red))
    } else if state.input_mode == InputMode::Editing {
        (
            String::from(" ESC:stop editing | arrows:move | Enter:done "),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            String::from(" Tab:panel | e:edit | m:method | b:body | h:headers | s:send | ?:help | q:quit "),
            Style::default().fg(Color::DarkGray),
        )
    };

    f.render_widget(Paragraph::new(status).style(style), area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 CURLUP - Keyboard Shortcuts

 NAVIGATION
   Tab / Shift+Tab    Switch panels
   ↑ / ↓              Scroll response / select header

 REQUEST
   m                  Cycle method (GET/POST/PUT/DELETE)
   s                  Send request
   e / Enter          Edit focused field
   Enter (URL)        Send while editing the URL

 SECTIONS
   b / Space          Show or hide the body (POST only)
   h / Space          Show or hide headers

 HEADERS
   a                  Add header row
   d                  Delete selected row
   Tab (editing)      Switch between key and value

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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
