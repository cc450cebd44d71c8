//! Orders: creation, pricing, status workflow and payment bookkeeping
//!
//! - **manager**: [`OrdersManager`] command processing (one redb transaction per command)
//! - **storage**: redb tables for orders, items, status history and payment indexes
//! - **lifecycle**: status state machine and transition authorization
//! - **pricing**: per-line price computation
//! - **number**: order number formatting

pub mod lifecycle;
pub mod manager;
pub mod number;
pub mod pricing;
pub mod storage;

pub use manager::{
    OrderError, OrderFilter, OrderPage, OrderResult, OrdersManager, PaymentConfirmation,
    PaymentRecord,
};
pub use storage::{OrderStorage, PendingReconciliation};
