//! HTTP API module.
//!
//! This module provides the HTTP server and its JSON types. The live import
//! log stream is served from [`crate::logs`].

pub mod server;
pub mod types;

pub use server::{create_router, start_server, AppState};
pub use types::*;
