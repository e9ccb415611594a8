//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default URL for a fresh request draft
pub const DEFAULT_HTTP_URL: &str = "https://api.github.com/users/octocat";

/// Application name
pub const APP_NAME: &str = "CurlUp";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How long a cached read result is considered fresh (10 minutes)
pub const DEFAULT_STALE_TIME_SECS: u64 = 600;

/// How long a cached read nobody looks at is kept before eviction (5 minutes)
pub const DEFAULT_GC_TIME_SECS: u64 = 300;

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "curlup.log";

/// Name of the per-user configuration directory under `$HOME`
pub const CONFIG_DIR_NAME: &str = ".curlup";

/// Submit label when nothing is in flight
pub const SEND_LABEL: &str = "Send Request";

/// Submit label while a read or write is outstanding
pub const SENDING_LABEL: &str = "Sending...";
