//! # CurlUp
//!
//! A single-screen terminal dashboard for composing HTTP requests and
//! inspecting the responses.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, DELETE
//! - JSON request body editor (POST)
//! - Ordered, editable header rows
//! - Read cache per URL, invalidated by any successful write
//! - JSON syntax highlighting
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod draft;
pub mod messages;
pub mod models;
pub mod network;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use config::Config;
pub use draft::RequestDraft;
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{ApiResponse, FinalizedRequest, HeaderRow, HttpMethod, RequestBody, ResponseState};
pub use network::{NetworkActor, RequestDispatcher};
