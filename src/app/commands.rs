//! Command handlers - business logic for processing UI events

use crate::app::AppState;
use crate::messages::network::Slot;
use crate::messages::ui_events::{InputMode, Panel};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{ApiResponse, HttpMethod, ResponseState};

impl AppState {
    // ========================
    // Navigation
    // ========================

    pub fn next_panel(&mut self) {
        self.active_panel = self.active_panel.next();
        if self.active_panel == Panel::Body && !self.draft.method.shows_body_editor() {
            self.active_panel = self.active_panel.next();
        }
    }

    pub fn prev_panel(&mut self) {
        self.active_panel = self.active_panel.prev();
        if self.active_panel == Panel::Body && !self.draft.method.shows_body_editor() {
            self.active_panel = self.active_panel.prev();
        }
    }

    // ========================
    // Collapsible sections
    // ========================

    pub fn toggle_body(&mut self) {
        if self.draft.method.shows_body_editor() {
            self.body_open = !self.body_open;
        }
    }

    pub fn toggle_headers(&mut self) {
        self.headers_open = !self.headers_open;
    }

    // ========================
    // Input editing
    // ========================

    /// Whether the focused panel has a visible, editable field
    fn can_edit(&self) -> bool {
        match self.active_panel {
            Panel::Url => true,
            Panel::Body => self.body_open && self.draft.method.shows_body_editor(),
            Panel::Headers => {
                self.headers_open && self.selected_header < self.draft.header_rows.len()
            }
            Panel::Response => false,
        }
    }

    pub fn start_editing(&mut self) {
        if !self.can_edit() {
            return;
        }
        if let Some(len) = self.current_input().map(str::len) {
            self.input_mode = InputMode::Editing;
            self.cursor_position = len;
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn move_cursor_left(&mut self) {
        let Some(input) = self.current_input() else {
            return;
        };
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let Some(input) = self.current_input() else {
            return;
        };
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        let Some(input) = self.current_input() else {
            return;
        };
        if cursor_pos <= input.len() {
            let mut text = input.to_string();
            text.insert(cursor_pos, c);
            self.set_current_input(text);
            self.cursor_position = cursor_pos + c.len_utf8();
        }
    }

    pub fn delete_char(&mut self) {
        let cursor_pos = self.cursor_position;
        let Some(input) = self.current_input() else {
            return;
        };
        if cursor_pos > 0 && cursor_pos <= input.len() {
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            let mut text = input.to_string();
            text.remove(prev_pos);
            self.set_current_input(text);
            self.cursor_position = prev_pos;
        }
    }

    // ========================
    // HTTP Method
    // ========================

    pub fn cycle_method(&mut self) {
        self.draft.method = self.draft.method.next();
        if self.active_panel == Panel::Body && !self.draft.method.shows_body_editor() {
            self.active_panel = Panel::Url;
            self.input_mode = InputMode::Normal;
        }
    }

    // ========================
    // Response scrolling
    // ========================

    pub fn scroll_up(&mut self) {
        self.response_scroll = self.response_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.response_scroll = self.response_scroll.saturating_add(1);
    }

    // ========================
    // Headers
    // ========================

    pub fn next_header(&mut self) {
        if !self.draft.header_rows.is_empty() {
            self.selected_header = (self.selected_header + 1) % self.draft.header_rows.len();
        }
    }

    pub fn prev_header(&mut self) {
        if !self.draft.header_rows.is_empty() {
            self.selected_header = self
                .selected_header
                .checked_sub(1)
                .unwrap_or(self.draft.header_rows.len() - 1);
        }
    }

    pub fn add_header(&mut self) {
        self.draft.add_header_row();
        self.headers_open = true;
        self.selected_header = self.draft.header_rows.len() - 1;
        self.header_field = crate::models::HeaderField::Key;
    }

    pub fn delete_header(&mut self) {
        self.draft.delete_header_row(self.selected_header);
        // Re-resolve the selection by position
        self.selected_header = self
            .selected_header
            .min(self.draft.header_rows.len().saturating_sub(1));
    }

    pub fn switch_header_field(&mut self) {
        self.header_field = self.header_field.toggle();
        self.cursor_position = self.current_input().map(str::len).unwrap_or(0);
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Request sending
    // ========================

    /// Finalize the draft and pick the path: GET reads, everything else writes.
    /// Refused while anything is in flight.
    pub fn submit(&mut self) -> Option<NetworkCommand> {
        if self.is_busy() {
            return None;
        }

        let request = self.draft.finalize();
        let id = self.next_id();
        self.last_error = None;

        if request.method == HttpMethod::GET {
            self.read.begin(id);
            self.read_url = Some(request.url.clone());
            self.read_stale = false;
            self.lookup_id = None;
            Some(NetworkCommand::Read {
                id,
                request,
                force: true,
            })
        } else {
            self.write.begin(id);
            Some(NetworkCommand::Write { id, request })
        }
    }

    // ========================
    // Response handling
    // ========================

    /// Apply a network response. May return a follow-up cache lookup.
    pub fn handle_response(&mut self, response: NetworkResponse) -> Option<NetworkCommand> {
        let (id, slot, state) = match response {
            NetworkResponse::Success { id, slot, response } => {
                (id, slot, ResponseState::Success(response))
            }
            NetworkResponse::Error { id, slot, message } => {
                (id, slot, ResponseState::Error(message))
            }
            NetworkResponse::Cached {
                id,
                url,
                response,
                stale,
            } => {
                self.show_cached(id, url, response, stale);
                return None;
            }
        };
        let error = state.error().map(String::from);
        let succeeded = state.data().is_some();

        let target = match slot {
            Slot::Read => &mut self.read,
            Slot::Write => &mut self.write,
        };
        if !target.settle(id, state) {
            tracing::debug!(id, slot = slot.as_str(), "Dropping superseded response");
            return None;
        }
        self.last_error = error;
        self.response_scroll = 0;

        match slot {
            // The URL may have moved while the read was out
            Slot::Read => self.sync_read_to_url(),
            // Every cached read is stale now
            Slot::Write if succeeded => Some(self.lookup_draft_url()),
            Slot::Write => None,
        }
    }

    /// Point the read slot at the draft URL. Returns a cache lookup when the
    /// slot holds another URL's result.
    pub fn sync_read_to_url(&mut self) -> Option<NetworkCommand> {
        if self.read.is_in_flight() || self.read_matches_url() {
            return None;
        }
        Some(self.lookup_draft_url())
    }

    fn lookup_draft_url(&mut self) -> NetworkCommand {
        let id = self.next_id();
        self.lookup_id = Some(id);
        NetworkCommand::Lookup {
            id,
            url: self.draft.url.clone(),
        }
    }

    fn show_cached(&mut self, id: u64, url: String, response: Option<ApiResponse>, stale: bool) {
        if self.lookup_id != Some(id) || self.read.is_in_flight() {
            tracing::debug!(id, "Dropping superseded cache lookup");
            return;
        }
        self.lookup_id = None;
        self.read.state = response.map(ResponseState::Success).unwrap_or_default();
        self.read_url = Some(url);
        self.read_stale = stale;
    }
}
