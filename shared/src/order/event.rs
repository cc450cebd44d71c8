//! Status history entries

use super::types::OrderStatus;
use serde::{Deserialize, Serialize};

/// One entry of an order's append-only status history
///
/// Keyed by `(order_id, sequence)`; sequence starts at 1 with the creation entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: String,
    pub sequence: u64,
    pub status: OrderStatus,
    /// Unix millis
    pub timestamp: i64,
    /// User who made the change (`system` for gateway-driven changes)
    pub actor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Actor id recorded for changes made by the reconciliation worker and webhooks
pub const SYSTEM_ACTOR: &str = "system";
