//! Outbound order-status notifications
//!
//! Triggered manually by staff; never sent automatically on transitions.

pub mod messaging;
pub mod templates;

pub use messaging::MessagingClient;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::Capability;
use shared::order::OrderStatus;
use thiserror::Error;

use crate::auth::CurrentUser;
use crate::catalog::{CatalogError, CatalogStorage};
use crate::orders::{OrderError, OrdersManager};
use templates::TemplateContext;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Messaging is not configured")]
    NotConfigured,

    #[error("Messaging request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Messaging provider error: {0}")]
    Provider(String),

    #[error("No message template for status {0}")]
    NoTemplate(OrderStatus),

    #[error("Customer has no valid phone number")]
    MissingPhone,

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Rejected(#[from] AppError),
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        match err {
            e @ NotifyError::NotConfigured => AppError::config(e.to_string()),
            NotifyError::Http(e) => {
                tracing::error!(error = %e, "Messaging request failed");
                let code = if e.is_timeout() {
                    ErrorCode::TimeoutError
                } else {
                    ErrorCode::NotificationFailed
                };
                AppError::with_message(code, e.to_string())
            }
            NotifyError::Provider(msg) => {
                tracing::warn!(message = %msg, "Messaging provider rejected message");
                AppError::with_message(ErrorCode::NotificationFailed, msg)
            }
            e @ (NotifyError::NoTemplate(_) | NotifyError::MissingPhone) => {
                AppError::validation(e.to_string())
            }
            NotifyError::Order(e) => e.into(),
            NotifyError::Catalog(e) => e.into(),
            NotifyError::Rejected(e) => e,
        }
    }
}

/// `POST /api/orders/:id/notify` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyRequest {
    /// Template to send; defaults to the order's current status
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationReceipt {
    pub order_number: String,
    pub status: OrderStatus,
    pub to: String,
    pub message_id: String,
    pub body: String,
}

pub struct Notifier {
    orders: Arc<OrdersManager>,
    catalog: CatalogStorage,
    client: Option<MessagingClient>,
    business_phone: String,
    business_hours: String,
}

impl Notifier {
    pub fn new(
        orders: Arc<OrdersManager>,
        catalog: CatalogStorage,
        client: Option<MessagingClient>,
        business_phone: impl Into<String>,
        business_hours: impl Into<String>,
    ) -> Self {
        Self {
            orders,
            catalog,
            client,
            business_phone: business_phone.into(),
            business_hours: business_hours.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Render the message for an order without sending it
    pub fn preview(
        &self,
        order_id: &str,
        status: Option<OrderStatus>,
    ) -> Result<(String, OrderStatus, String), NotifyError> {
        let order = self.orders.get_order(order_id)?;
        let status = status.unwrap_or(order.status);
        let profile = self.catalog.get_user(&order.customer_id)?;

        let phone = profile
            .as_ref()
            .and_then(|p| p.phone.as_deref())
            .and_then(normalize_phone)
            .ok_or(NotifyError::MissingPhone)?;
        let customer_name = profile.as_ref().map(|p| p.full_name.as_str()).unwrap_or("");

        let body = templates::render(
            status,
            &TemplateContext {
                customer_name,
                order_number: &order.order_number,
                amount: order.final_amount,
                business_phone: &self.business_phone,
                business_hours: &self.business_hours,
            },
        )
        .ok_or(NotifyError::NoTemplate(status))?;

        Ok((phone, status, body))
    }

    /// Send the status message for an order
    pub async fn notify_order(
        &self,
        order_id: &str,
        request: NotifyRequest,
        actor: &CurrentUser,
    ) -> Result<NotificationReceipt, NotifyError> {
        actor.require(Capability::SendNotifications)?;
        let client = self.client.as_ref().ok_or(NotifyError::NotConfigured)?;

        let (to, status, body) = self.preview(order_id, request.status)?;
        let message_id = client.send_text(&to, &body).await?;
        let order = self.orders.get_order(order_id)?;

        tracing::info!(
            order_number = %order.order_number,
            status = %status,
            actor_id = %actor.id,
            "Order notification sent"
        );

        Ok(NotificationReceipt {
            order_number: order.order_number,
            status,
            to,
            message_id,
            body,
        })
    }
}

/// Normalize a Nigerian phone number to international digits
///
/// `0803 123 4567` / `+234 803 123 4567` / `8031234567` → `2348031234567`
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '+' | '.'))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = if let Some(local) = digits.strip_prefix('0') {
        format!("234{local}")
    } else if digits.starts_with("234") {
        digits
    } else {
        format!("234{digits}")
    };
    (normalized.len() == 13).then_some(normalized)
}
