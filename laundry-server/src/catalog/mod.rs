//! Catalog: services, pickup time slots and user profiles

mod storage;

pub use storage::CatalogStorage;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::{StorageError, impl_from_storage_errors};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Invalid service price: {0}")]
    InvalidPrice(String),

    #[error("Time slot not found: {0}")]
    TimeSlotNotFound(String),

    #[error("Time slot {0} is fully booked")]
    TimeSlotFull(String),

    #[error("Time slot {0} is not active")]
    TimeSlotInactive(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("{0}")]
    Validation(String),
}

impl_from_storage_errors!(CatalogError);

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Storage(e) => {
                tracing::error!(error = %e, "Catalog storage error");
                AppError::database(e.to_string())
            }
            CatalogError::ServiceNotFound(id) => {
                AppError::with_message(ErrorCode::ServiceNotFound, format!("Service not found: {id}"))
                    .with_detail("service_id", id)
            }
            CatalogError::InvalidPrice(msg) => {
                AppError::with_message(ErrorCode::ServiceInvalidPrice, msg)
            }
            CatalogError::TimeSlotNotFound(id) => AppError::with_message(
                ErrorCode::TimeSlotNotFound,
                format!("Time slot not found: {id}"),
            ),
            e @ CatalogError::TimeSlotFull(_) => {
                AppError::with_message(ErrorCode::TimeSlotFull, e.to_string())
            }
            e @ CatalogError::TimeSlotInactive(_) => AppError::validation(e.to_string()),
            CatalogError::UserNotFound(id) => {
                AppError::with_message(ErrorCode::UserNotFound, format!("User not found: {id}"))
            }
            CatalogError::Validation(msg) => AppError::validation(msg),
        }
    }
}
