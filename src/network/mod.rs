//! Network layer - request dispatch and the read cache
//!
//! The Network actor receives dispatch commands and sends back responses.

pub mod actor;
pub mod cache;
pub mod client;
pub mod dispatcher;

pub use actor::NetworkActor;
pub use client::{HttpTransport, ReqwestTransport};
pub use dispatcher::RequestDispatcher;
