//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Panel navigation
    NextPanel,
    PrevPanel,
    ScrollUp,
    ScrollDown,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,

    // Request actions
    SendRequest,
    CycleMethod,

    // Collapsible sections
    ToggleBody,
    ToggleHeaders,

    // Headers
    NextHeader,
    PrevHeader,
    AddHeader,
    DeleteHeader,
    SwitchHeaderField,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Active panel in the UI (needed for context-aware event mapping)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Panel {
    Url,
    Body,
    Headers,
    Response,
}

impl Panel {
    pub fn next(&self) -> Panel {
        match self {
            Panel::Url => Panel::Body,
            Panel::Body => Panel::Headers,
            Panel::Headers => Panel::Response,
            Panel::Response => Panel::Url,
        }
    }

    pub fn prev(&self) -> Panel {
        match self {
            Panel::Url => Panel::Response,
            Panel::Body => Panel::Url,
            Panel::Headers => Panel::Body,
            Panel::Response => Panel::Headers,
        }
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_panel: Panel,
    input_mode: InputMode,
    show_help: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    match input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => Some(UiEvent::Quit),
            KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
            KeyCode::Tab => Some(UiEvent::NextPanel),
            KeyCode::BackTab => Some(UiEvent::PrevPanel),
            KeyCode::Char('e') | KeyCode::Enter => match active_panel {
                Panel::Url | Panel::Body | Panel::Headers => Some(UiEvent::StartEditing),
                Panel::Response => None,
            },
            KeyCode::Char(' ') => match active_panel {
                Panel::Body => Some(UiEvent::ToggleBody),
                Panel::Headers => Some(UiEvent::ToggleHeaders),
                _ => None,
            },
            KeyCode::Char('b') => Some(UiEvent::ToggleBody),
            KeyCode::Char('h') => Some(UiEvent::ToggleHeaders),
            KeyCode::Char('m') => Some(UiEvent::CycleMethod),
            KeyCode::Char('s') => Some(UiEvent::SendRequest),
            KeyCode::Up => match active_panel {
                Panel::Headers => Some(UiEvent::PrevHeader),
                Panel::Response => Some(UiEvent::ScrollUp),
                _ => None,
            },
            KeyCode::Down => match active_panel {
                Panel::Headers => Some(UiEvent::NextHeader),
                Panel::Response => Some(UiEvent::ScrollDown),
                _ => None,
            },
            KeyCode::Char('a') if active_panel == Panel::Headers => Some(UiEvent::AddHeader),
            KeyCode::Char('d') if active_panel == Panel::Headers => Some(UiEvent::DeleteHeader),
            _ => None,
        },
        InputMode::Editing => match key.code {
            KeyCode::Esc => Some(UiEvent::StopEditing),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            KeyCode::Tab if active_panel == Panel::Headers => Some(UiEvent::SwitchHeaderField),
            KeyCode::Enter => match active_panel {
                Panel::Url => Some(UiEvent::SendRequest),
                Panel::Body => Some(UiEvent::CharInput('\n')),
                _ => Some(UiEvent::StopEditing),
            },
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_on_url_sends_while_editing() {
        let event = key_to_ui_event(press(KeyCode::Enter), Panel::Url, InputMode::Editing, false);
        assert_eq!(event, Some(UiEvent::SendRequest));
    }

    #[test]
    fn test_enter_in_body_inserts_newline() {
        let event = key_to_ui_event(press(KeyCode::Enter), Panel::Body, InputMode::Editing, false);
        assert_eq!(event, Some(UiEvent::CharInput('\n')));
    }

    #[test]
    fn test_header_keys_only_on_headers_panel() {
        let add = key_to_ui_event(press(KeyCode::Char('a')), Panel::Headers, InputMode::Normal, false);
        assert_eq!(add, Some(UiEvent::AddHeader));
        let none = key_to_ui_event(press(KeyCode::Char('a')), Panel::Url, InputMode::Normal, false);
        assert_eq!(none, None);
    }

    #[test]
    fn test_help_swallows_keys() {
        let event = key_to_ui_event(press(KeyCode::Char('s')), Panel::Url, InputMode::Normal, true);
        assert_eq!(event, Some(UiEvent::CloseHelp));
    }

    #[test]
    fn test_space_toggles_focused_section() {
        let body = key_to_ui_event(press(KeyCode::Char(' ')), Panel::Body, InputMode::Normal, false);
        assert_eq!(body, Some(UiEvent::ToggleBody));
        let headers = key_to_ui_event(press(KeyCode::Char(' ')), Panel::Headers, InputMode::Normal, false);
        assert_eq!(headers, Some(UiEvent::ToggleHeaders));
    }
}
