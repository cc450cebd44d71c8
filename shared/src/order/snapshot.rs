//! Order records as persisted and returned by the API

use super::event::StatusChange;
use super::types::{DeliveryType, OrderStatus, PaymentMethod, PaymentStatus};
use crate::models::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order record. Monetary fields are kobo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Storage id (UUID v4)
    pub id: String,
    /// Human-facing number, e.g. `LD240501123456`
    pub order_number: String,
    pub customer_id: String,
    pub status: OrderStatus,
    /// Σ item.total_price
    pub total_amount: i64,
    pub discount_amount: i64,
    /// total_amount - discount_amount
    pub final_amount: i64,
    pub amount_paid: i64,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    pub delivery_type: DeliveryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
    /// Requested pickup time (Unix millis)
    pub scheduled_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_pickup_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_delivery_at: Option<i64>,
    /// 乐观锁版本号，每次写入 +1
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    pub fn outstanding(&self) -> i64 {
        (self.final_amount - self.amount_paid).max(0)
    }

    /// Address text used for area grouping
    pub fn address_text(&self) -> String {
        self.pickup_address
            .as_ref()
            .map(|a| a.to_string())
            .unwrap_or_default()
    }
}

/// Order line, priced once at creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub line_no: u32,
    pub service_id: String,
    /// Service name at booking time
    pub service_name: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<Decimal>,
    pub unit_price: i64,
    pub total_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// Order with its items and full status history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub history: Vec<StatusChange>,
    /// Primary next action for staff UIs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_next: Option<OrderStatus>,
}

impl OrderDetail {
    pub fn new(order: Order, items: Vec<OrderItem>, history: Vec<StatusChange>) -> Self {
        let suggested_next = order.status.suggested_next();
        Self {
            order,
            items,
            history,
            suggested_next,
        }
    }
}
