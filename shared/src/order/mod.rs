//! Order domain types
//!
//! - Records: [`Order`], [`OrderItem`], [`OrderDetail`]
//! - History: [`StatusChange`] (append-only, keyed by order + sequence)
//! - Commands: request payloads for create / transition / payment
//! - State machine: [`OrderStatus::allowed_next`]

pub mod command;
pub mod event;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{BookingItem, CreateOrderRequest, ManualPaymentRequest, RefundRequest, TransitionRequest};
pub use event::{SYSTEM_ACTOR, StatusChange};
pub use snapshot::{Order, OrderDetail, OrderItem};
pub use types::*;
