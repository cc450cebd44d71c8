//! Request payloads for order commands

use super::types::{DeliveryType, OrderStatus, PaymentMethod};
use crate::models::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One requested service line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingItem {
    pub service_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub weight_kg: Option<Decimal>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// Create order request (booking form submission)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub services: Vec<BookingItem>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    /// Requested pickup time (Unix millis)
    pub scheduled_at: i64,
    #[serde(default)]
    pub pickup_address: Option<Address>,
    #[serde(default)]
    pub delivery_address: Option<Address>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Status transition request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub notes: Option<String>,
    /// Reject the write unless the order is still at this version
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Offline payment recorded by staff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualPaymentRequest {
    pub method: PaymentMethod,
    pub amount: i64,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Refund marking request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefundRequest {
    #[serde(default)]
    pub reason: Option<String>,
}
