use shared::error::{AppError, ErrorCode};
use shared::order::{OrderStatus, PaymentStatus};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::db::{StorageError, impl_from_storage_errors};
use crate::orders::pricing::PricingError;

/// Manager errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Rejected(#[from] AppError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order must contain at least one service")]
    Empty,

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Service is not active: {0}")]
    ServiceInactive(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Cannot transition order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order {order_number} is already {status}")]
    OrderClosed {
        order_number: String,
        status: OrderStatus,
    },

    #[error("Order was modified (expected version {expected}, current {actual})")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("{0}")]
    PermissionDenied(String),

    #[error("Order belongs to another customer")]
    NotOrderOwner,

    #[error("Order {0} has already been paid")]
    AlreadyPaid(String),

    #[error("Paid amount {paid} does not cover order total {expected}")]
    AmountMismatch { expected: i64, paid: i64 },

    #[error("Payment for order {0} has already been refunded")]
    AlreadyRefunded(String),

    #[error("Payment for order {order_number} is {} and cannot be refunded", .status.as_str())]
    NotRefundable {
        order_number: String,
        status: PaymentStatus,
    },
}

impl_from_storage_errors!(OrderError);

pub type OrderResult<T> = Result<T, OrderError>;

/// 将存储错误转换为错误码
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) => ErrorCode::InternalError,
        _ => ErrorCode::DatabaseError,
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = %code, "Order storage error");
                AppError::with_message(code, e.to_string())
            }
            OrderError::Catalog(e) => e.into(),
            OrderError::Rejected(e) => e,
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order not found: {id}"))
                    .with_detail("order_id", id)
            }
            e @ OrderError::Empty => AppError::with_message(ErrorCode::OrderEmpty, e.to_string()),
            OrderError::ServiceNotFound(id) => {
                AppError::with_message(ErrorCode::ServiceNotFound, format!("Service not found: {id}"))
                    .with_detail("service_id", id)
            }
            e @ OrderError::ServiceInactive(_) => {
                AppError::with_message(ErrorCode::ServiceInactive, e.to_string())
            }
            OrderError::Pricing(e) => AppError::validation(e.to_string()),
            OrderError::InvalidTransition { from, to } => AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot transition order from {from} to {to}"),
            )
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str()),
            e @ OrderError::OrderClosed { .. } => {
                AppError::with_message(ErrorCode::OrderClosed, e.to_string())
            }
            OrderError::VersionConflict { expected, actual } => AppError::with_message(
                ErrorCode::VersionConflict,
                format!("Order was modified (expected version {expected}, current {actual})"),
            )
            .with_detail("current_version", actual),
            OrderError::PermissionDenied(msg) => {
                AppError::with_message(ErrorCode::PermissionDenied, msg)
            }
            OrderError::NotOrderOwner => AppError::new(ErrorCode::NotOrderOwner),
            e @ OrderError::AlreadyPaid(_) => {
                AppError::with_message(ErrorCode::OrderAlreadyPaid, e.to_string())
            }
            OrderError::AmountMismatch { expected, paid } => AppError::with_message(
                ErrorCode::PaymentAmountMismatch,
                format!("Paid amount {paid} does not cover order total {expected}"),
            )
            .with_detail("expected", expected)
            .with_detail("paid", paid),
            e @ OrderError::AlreadyRefunded(_) => {
                AppError::with_message(ErrorCode::PaymentAlreadyRefunded, e.to_string())
            }
            e @ OrderError::NotRefundable { .. } => {
                AppError::with_message(ErrorCode::PaymentNotRefundable, e.to_string())
            }
        }
    }
}
