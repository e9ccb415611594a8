//! Request draft - the editable, unsubmitted form of a request
//!
//! Header rows are addressed by position. Edits against an index that no
//! longer exists (e.g. after a delete) are ignored instead of panicking.

use std::collections::BTreeMap;

use crate::constants::DEFAULT_HTTP_URL;
use crate::models::{FinalizedRequest, HeaderField, HeaderRow, HttpMethod, RequestBody};

/// Mutable request owned by the query panel
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDraft {
    pub method: HttpMethod,
    pub url: String,
    pub header_rows: Vec<HeaderRow>,
    pub body_text: String,
}

impl Default for RequestDraft {
    fn default() -> Self {
        RequestDraft::new(DEFAULT_HTTP_URL)
    }
}

impl RequestDraft {
    pub fn new(url: impl Into<String>) -> Self {
        RequestDraft {
            method: HttpMethod::GET,
            url: url.into(),
            header_rows: Vec::new(),
            body_text: String::new(),
        }
    }

    pub fn add_header_row(&mut self) {
        self.header_rows.push(HeaderRow::default());
    }

    /// Replace the key or value at `index`. Out-of-range indices are a no-op.
    pub fn update_header_row(&mut self, index: usize, field: HeaderField, value: impl Into<String>) {
        if let Some(row) = self.header_rows.get_mut(index) {
            match field {
                HeaderField::Key => row.key = value.into(),
                HeaderField::Value => row.value = value.into(),
            }
        }
    }

    /// Remove the row at `index`, shifting later rows down by one.
    pub fn delete_header_row(&mut self, index: usize) {
        if index < self.header_rows.len() {
            self.header_rows.remove(index);
        }
    }

    /// Wire header mapping. Blank keys are dropped, the last duplicate wins.
    pub fn header_map(&self) -> BTreeMap<String, String> {
        self.header_rows
            .iter()
            .filter(|row| !row.key.trim().is_empty())
            .map(|row| (row.key.clone(), row.value.clone()))
            .collect()
    }

    pub fn finalize(&self) -> FinalizedRequest {
        FinalizedRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self.header_map(),
            body: parse_body(&self.body_text),
        }
    }
}

/// Parse body editor text: JSON when it parses, the raw text otherwise.
pub fn parse_body(text: &str) -> Option<RequestBody> {
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(value) => Some(RequestBody::Json(value)),
        Err(_) => Some(RequestBody::Raw(text.to_string())),
    }
}
