//! bucket-api: HTTP API layer for the Bucket client
//!
//! Read-only JSON endpoints over the protocol views.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::AppState;
