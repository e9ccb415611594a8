//! App state - pure data structure with no I/O logic

use crate::draft::RequestDraft;
use crate::messages::ui_events::{InputMode, Panel};
use crate::messages::RenderState;
use crate::models::{HeaderField, ResponseState};

/// One response slot plus the id of the dispatch it is waiting for.
///
/// Only the response carrying `pending_id` may settle the slot, so a
/// superseded dispatch can never overwrite a newer result.
#[derive(Clone, Debug, Default)]
pub struct ResponseSlot {
    pub state: ResponseState,
    pending_id: Option<u64>,
}

impl ResponseSlot {
    pub fn begin(&mut self, id: u64) {
        self.pending_id = Some(id);
        self.state = ResponseState::Pending;
    }

    /// Store `state` if `id` is the awaited dispatch. Returns whether it was.
    pub fn settle(&mut self, id: u64, state: ResponseState) -> bool {
        if self.pending_id != Some(id) {
            return false;
        }
        self.pending_id = None;
        self.state = state;
        true
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending_id.is_some()
    }
}

/// Main application state - pure data, no I/O
pub struct AppState {
    // Request being composed
    pub draft: RequestDraft,
    pub cursor_position: usize,

    // Collapsible sections (default collapsed)
    pub body_open: bool,
    pub headers_open: bool,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub response_scroll: u16,

    // Headers panel
    pub selected_header: usize,
    pub header_field: HeaderField,

    // Response slots. `read_url` is the URL the read slot's contents belong to.
    pub read: ResponseSlot,
    pub read_url: Option<String>,
    pub read_stale: bool,
    pub lookup_id: Option<u64>,
    pub write: ResponseSlot,
    pub last_error: Option<String>,
    pub next_request_id: u64,

    // Popups
    pub show_help: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(RequestDraft::default())
    }
}

impl AppState {
    pub fn new(draft: RequestDraft) -> Self {
        AppState {
            cursor_position: draft.url.len(),
            draft,
            body_open: false,
            headers_open: false,
            active_panel: Panel::Url,
            input_mode: InputMode::Normal,
            response_scroll: 0,
            selected_header: 0,
            header_field: HeaderField::Key,
            read: ResponseSlot::default(),
            read_url: None,
            read_stale: false,
            lookup_id: None,
            write: ResponseSlot::default(),
            last_error: None,
            next_request_id: 1,
            show_help: false,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// True exactly while a read or a write is outstanding
    pub fn is_busy(&self) -> bool {
        self.read.is_in_flight() || self.write.is_in_flight()
    }

    /// Whether the read slot holds the result for the URL now in the draft
    pub fn read_matches_url(&self) -> bool {
        self.read_url.as_deref() == Some(self.draft.url.as_str())
    }

    /// Text of the field being edited, if the focused panel has one
    pub fn current_input(&self) -> Option<&str> {
        match self.active_panel {
            Panel::Url => Some(&self.draft.url),
            Panel::Body => Some(&self.draft.body_text),
            Panel::Headers => self.draft.header_rows.get(self.selected_header).map(|row| {
                match self.header_field {
                    HeaderField::Key => row.key.as_str(),
                    HeaderField::Value => row.value.as_str(),
                }
            }),
            Panel::Response => None,
        }
    }

    /// Replace the text of the field being edited
    pub fn set_current_input(&mut self, text: String) {
        match self.active_panel {
            Panel::Url => self.draft.url = text,
            Panel::Body => self.draft.body_text = text,
            Panel::Headers => {
                self.draft
                    .update_header_row(self.selected_header, self.header_field, text)
            }
            Panel::Response => {}
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            method: self.draft.method,
            url: self.draft.url.clone(),
            body: self.draft.body_text.clone(),
            headers: self.draft.header_rows.clone(),
            body_open: self.body_open,
            headers_open: self.headers_open,
            active_panel: self.active_panel,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            selected_header: self.selected_header,
            header_field: self.header_field,
            read: if self.read_matches_url() {
                self.read.state.clone()
            } else {
                ResponseState::Idle
            },
            read_stale: self.read_matches_url() && self.read_stale,
            write: self.write.state.clone(),
            response_scroll: self.response_scroll,
            is_busy: self.is_busy(),
            last_error: self.last_error.clone(),
            show_help: self.show_help,
        }
    }
}
