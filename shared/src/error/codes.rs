//! Unified error codes for the laundry service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors (services, time slots, users)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Version conflict (stale write)
    VersionConflict = 6,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Order belongs to another customer
    NotOrderOwner = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no services
    OrderEmpty = 4002,
    /// Status transition not allowed
    InvalidStatusTransition = 4003,
    /// Order is in a terminal status
    OrderClosed = 4004,
    /// Invalid address (missing fields, unknown LGA)
    InvalidAddress = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment gateway reported failure or is unreachable
    PaymentFailed = 5001,
    /// Order has already been paid
    OrderAlreadyPaid = 5002,
    /// Verified amount does not cover the order
    PaymentAmountMismatch = 5003,
    /// Payment reference missing
    PaymentReferenceMissing = 5004,
    /// Payment reference unknown
    PaymentReferenceNotFound = 5005,
    /// Payment has already been refunded
    PaymentAlreadyRefunded = 5006,
    /// Payment not in a refundable status
    PaymentNotRefundable = 5007,
    /// Webhook signature invalid
    WebhookSignatureInvalid = 5008,
    /// Payment gateway not configured
    PaymentGatewayNotConfigured = 5009,

    // ==================== 6xxx: Catalog ====================
    /// Service not found
    ServiceNotFound = 6001,
    /// Service is not active
    ServiceInactive = 6002,
    /// Service has invalid pricing
    ServiceInvalidPrice = 6003,
    /// Time slot not found
    TimeSlotNotFound = 6101,
    /// Time slot is full
    TimeSlotFull = 6102,
    /// User not found
    UserNotFound = 6201,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Messaging provider failed
    NotificationFailed = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::VersionConflict => "Resource was modified by another request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::NotOrderOwner => "Order belongs to another customer",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order must contain at least one service",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",
            ErrorCode::OrderClosed => "Order is already closed",
            ErrorCode::InvalidAddress => "Invalid address",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::PaymentAmountMismatch => "Paid amount does not cover the order",
            ErrorCode::PaymentReferenceMissing => "Payment reference is missing",
            ErrorCode::PaymentReferenceNotFound => "Payment reference not found",
            ErrorCode::PaymentAlreadyRefunded => "Payment has already been refunded",
            ErrorCode::PaymentNotRefundable => "Payment cannot be refunded",
            ErrorCode::WebhookSignatureInvalid => "Webhook signature is invalid",
            ErrorCode::PaymentGatewayNotConfigured => "Payment gateway is not configured",

            // Catalog
            ErrorCode::ServiceNotFound => "Service not found",
            ErrorCode::ServiceInactive => "Service is not active",
            ErrorCode::ServiceInvalidPrice => "Service has invalid price",
            ErrorCode::TimeSlotNotFound => "Time slot not found",
            ErrorCode::TimeSlotFull => "Time slot is fully booked",
            ErrorCode::UserNotFound => "User not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NotificationFailed => "Notification delivery failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::VersionConflict),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::NotOrderOwner),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::InvalidStatusTransition),
            4004 => Ok(ErrorCode::OrderClosed),
            4005 => Ok(ErrorCode::InvalidAddress),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::OrderAlreadyPaid),
            5003 => Ok(ErrorCode::PaymentAmountMismatch),
            5004 => Ok(ErrorCode::PaymentReferenceMissing),
            5005 => Ok(ErrorCode::PaymentReferenceNotFound),
            5006 => Ok(ErrorCode::PaymentAlreadyRefunded),
            5007 => Ok(ErrorCode::PaymentNotRefundable),
            5008 => Ok(ErrorCode::WebhookSignatureInvalid),
            5009 => Ok(ErrorCode::PaymentGatewayNotConfigured),

            // Catalog
            6001 => Ok(ErrorCode::ServiceNotFound),
            6002 => Ok(ErrorCode::ServiceInactive),
            6003 => Ok(ErrorCode::ServiceInvalidPrice),
            6101 => Ok(ErrorCode::TimeSlotNotFound),
            6102 => Ok(ErrorCode::TimeSlotFull),
            6201 => Ok(ErrorCode::UserNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::NotificationFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
