//! Data models
//!
//! Shared between laundry-server and clients (via API).
//! IDs are UUID v4 strings; money is `i64` kobo; timestamps are Unix millis.

pub mod address;
pub mod service;
pub mod time_slot;
pub mod user;

// Re-exports
pub use address::*;
pub use service::*;
pub use time_slot::*;
pub use user::*;
