//! Network messages - communication between App and Network layers

use crate::models::{ApiResponse, FinalizedRequest};

/// Which response slot a dispatch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Read,
    Write,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Read => "read",
            Slot::Write => "write",
        }
    }
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// GET through the read cache; `force` skips the freshness check
    Read {
        id: u64,
        request: FinalizedRequest,
        force: bool,
    },
    /// POST/PUT/DELETE chosen by `request.method`
    Write {
        id: u64,
        request: FinalizedRequest,
    },
    /// Report what the read cache holds for `url`; never hits the network
    Lookup { id: u64, url: String },
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    Success {
        id: u64,
        slot: Slot,
        response: ApiResponse,
    },
    Error {
        id: u64,
        slot: Slot,
        message: String,
    },
    /// Answer to a lookup; always belongs to the read slot
    Cached {
        id: u64,
        url: String,
        response: Option<ApiResponse>,
        stale: bool,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Success { id, .. } => *id,
            NetworkResponse::Error { id, .. } => *id,
            NetworkResponse::Cached { id, .. } => *id,
        }
    }

    pub fn slot(&self) -> Slot {
        match self {
            NetworkResponse::Success { slot, .. } => *slot,
            NetworkResponse::Error { slot, .. } => *slot,
            NetworkResponse::Cached { .. } => Slot::Read,
        }
    }
}
