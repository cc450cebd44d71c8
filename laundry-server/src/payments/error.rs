use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::orders::OrderError;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment gateway is not configured")]
    NotConfigured,

    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway rejected request: {0}")]
    Gateway(String),

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Webhook signature is invalid")]
    InvalidSignature,

    #[error("Payment reference is missing")]
    ReferenceMissing,

    #[error("Payment reference not found: {0}")]
    ReferenceNotFound(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Rejected(#[from] AppError),
}

pub type PaymentResult<T> = Result<T, PaymentError>;

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            e @ PaymentError::NotConfigured => {
                AppError::with_message(ErrorCode::PaymentGatewayNotConfigured, e.to_string())
            }
            PaymentError::Http(e) => {
                tracing::error!(error = %e, "Payment gateway request failed");
                let code = if e.is_timeout() {
                    ErrorCode::TimeoutError
                } else {
                    ErrorCode::PaymentFailed
                };
                AppError::with_message(code, format!("Payment gateway unreachable: {e}"))
            }
            PaymentError::Gateway(msg) => {
                tracing::warn!(message = %msg, "Payment gateway rejected request");
                AppError::with_message(ErrorCode::PaymentFailed, msg)
            }
            PaymentError::InvalidResponse(msg) => {
                tracing::error!(message = %msg, "Invalid payment gateway response");
                AppError::with_message(ErrorCode::PaymentFailed, msg)
            }
            e @ PaymentError::InvalidSignature => {
                AppError::with_message(ErrorCode::WebhookSignatureInvalid, e.to_string())
            }
            e @ PaymentError::ReferenceMissing => {
                AppError::with_message(ErrorCode::PaymentReferenceMissing, e.to_string())
            }
            PaymentError::ReferenceNotFound(reference) => AppError::with_message(
                ErrorCode::PaymentReferenceNotFound,
                format!("Payment reference not found: {reference}"),
            )
            .with_detail("reference", reference),
            PaymentError::Order(e) => e.into(),
            PaymentError::Catalog(e) => e.into(),
            PaymentError::Rejected(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: AppError = PaymentError::NotConfigured.into();
        assert_eq!(err.code, ErrorCode::PaymentGatewayNotConfigured);

        let err: AppError = PaymentError::ReferenceMissing.into();
        assert_eq!(err.code, ErrorCode::PaymentReferenceMissing);

        let err: AppError = PaymentError::ReferenceNotFound("LD-x".into()).into();
        assert_eq!(err.code, ErrorCode::PaymentReferenceNotFound);

        let err: AppError = PaymentError::Order(OrderError::AmountMismatch {
            expected: 500,
            paid: 100,
        })
        .into();
        assert_eq!(err.code, ErrorCode::PaymentAmountMismatch);
    }
}
