//! Render state - data structure sent from App layer to UI for rendering

use crate::constants::{DEFAULT_HTTP_URL, SENDING_LABEL, SEND_LABEL};
use crate::messages::ui_events::{InputMode, Panel};
use crate::models::{HeaderField, HeaderRow, HttpMethod, ResponseState};

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Request draft
    pub method: HttpMethod,
    pub url: String,
    pub body: String,
    pub headers: Vec<HeaderRow>,

    // Collapsible sections
    pub body_open: bool,
    pub headers_open: bool,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub selected_header: usize,
    pub header_field: HeaderField,

    // Response slots
    pub read: ResponseState,
    /// The read data shown was invalidated or outlived its stale time
    pub read_stale: bool,
    pub write: ResponseState,
    pub response_scroll: u16,
    pub is_busy: bool,
    pub last_error: Option<String>,

    // Popups
    pub show_help: bool,
}

impl RenderState {
    pub fn submit_label(&self) -> &'static str {
        if self.is_busy {
            SENDING_LABEL
        } else {
            SEND_LABEL
        }
    }

    /// True when either slot holds data worth showing
    pub fn has_response(&self) -> bool {
        self.read.data().is_some() || self.write.data().is_some()
    }
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            method: HttpMethod::GET,
            url: String::from(DEFAULT_HTTP_URL),
            body: String::new(),
            headers: Vec::new(),
            body_open: false,
            headers_open: false,
            active_panel: Panel::Url,
            input_mode: InputMode::Normal,
            cursor_position: DEFAULT_HTTP_URL.len(),
            selected_header: 0,
            header_field: HeaderField::Key,
            read: ResponseState::Idle,
            read_stale: false,
            write: ResponseState::Idle,
            response_scroll: 0,
            is_busy: false,
            last_error: None,
            show_help: false,
        }
    }
}
