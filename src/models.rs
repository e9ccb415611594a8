use serde_json::Value;
use std::collections::BTreeMap;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }

    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::GET,
        }
    }

    /// Methods that travel the write path
    pub fn is_write(&self) -> bool {
        !matches!(self, HttpMethod::GET)
    }

    /// Methods that carry a payload on the wire
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT)
    }

    /// Only POST exposes the body editor
    pub fn shows_body_editor(&self) -> bool {
        matches!(self, HttpMethod::POST)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One editable header line in the draft
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderRow {
    pub key: String,
    pub value: String,
}

impl HeaderRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        HeaderRow {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Which half of a header row an edit targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderField {
    Key,
    Value,
}

impl HeaderField {
    pub fn toggle(&self) -> HeaderField {
        match self {
            HeaderField::Key => HeaderField::Value,
            HeaderField::Value => HeaderField::Key,
        }
    }
}

/// Request payload after parsing the body editor text
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Raw(String),
}

/// Immutable snapshot of a request, built at submit time
#[derive(Clone, Debug, PartialEq)]
pub struct FinalizedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
}

impl FinalizedRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        FinalizedRequest {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

/// Response from an HTTP call that passed the status check
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub data: Value,
    pub status: u16,
    pub status_text: String,
    pub time_ms: u64,
    pub size_bytes: usize,
}

impl ApiResponse {
    /// Pretty JSON text of the payload
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.data).unwrap_or_else(|_| self.data.to_string())
    }
}

/// State of one response slot (read or write)
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ResponseState {
    #[default]
    Idle,
    Pending,
    Error(String),
    Success(ApiResponse),
}

impl ResponseState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ResponseState::Pending)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponseState::Error(_))
    }

    pub fn data(&self) -> Option<&ApiResponse> {
        match self {
            ResponseState::Success(response) => Some(response),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResponseState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_cycle_visits_all_four() {
        let mut method = HttpMethod::GET;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(method);
            method = method.next();
        }
        assert_eq!(seen, HttpMethod::ALL.to_vec());
        assert_eq!(method, HttpMethod::GET);
    }

    #[test]
    fn test_write_methods() {
        assert!(!HttpMethod::GET.is_write());
        assert!(HttpMethod::DELETE.is_write());
        assert!(!HttpMethod::DELETE.has_body());
        assert!(HttpMethod::PUT.has_body());
        assert!(!HttpMethod::PUT.shows_body_editor());
    }

    #[test]
    fn test_header_row_and_method_display() {
        let row = HeaderRow::new("Accept", "*/*");
        assert_eq!(row.key, "Accept");
        assert_eq!(HeaderRow::default(), HeaderRow::new("", ""));
        assert_eq!(HttpMethod::PUT.to_string(), "PUT");
    }

    #[test]
    fn test_response_state_accessors() {
        let state = ResponseState::Error("boom".into());
        assert!(state.is_error());
        assert_eq!(state.error(), Some("boom"));
        assert!(state.data().is_none());
        assert!(!ResponseState::Idle.is_pending());
    }
}
