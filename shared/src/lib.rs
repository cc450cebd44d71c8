//! Shared types for the laundry service
//!
//! Domain types used by the server and its clients: orders, catalog,
//! users, time slots, addresses, plus the unified error system.

pub mod error;
pub mod models;
pub mod order;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
