//! Order enums and the status state machine

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Order Status
// ============================================================================

/// 订单状态
///
/// ```text
/// pending ──┬─> picked_up ─┬─> in_progress ─> ready ─> delivered
///           └─> confirmed ─┘
/// (任意非终态) ─> cancelled
/// ```
///
/// `picked_up` 与 `confirmed` 互相可达：前者表示衣物已取走，后者表示付款/人工确认。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    PickedUp,
    Confirmed,
    InProgress,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::PickedUp,
        OrderStatus::Confirmed,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Statuses reachable from `self` in one step
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[PickedUp, Confirmed, Cancelled],
            Confirmed => &[PickedUp, InProgress, Cancelled],
            PickedUp => &[Confirmed, InProgress, Cancelled],
            InProgress => &[Ready, Cancelled],
            Ready => &[Delivered, Cancelled],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Primary "next action" offered to staff
    pub fn suggested_next(&self) -> Option<OrderStatus> {
        use OrderStatus::*;
        match self {
            Pending => Some(PickedUp),
            PickedUp | Confirmed => Some(InProgress),
            InProgress => Some(Ready),
            Ready => Some(Delivered),
            Delivered | Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Payment
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// 付款方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// 在线支付（Paystack）
    Online,
    /// POS 刷卡
    Pos,
    /// 银行转账
    Transfer,
    /// 现金
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Pos => "pos",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn is_offline(&self) -> bool {
        !matches!(self, PaymentMethod::Online)
    }
}

// ============================================================================
// Delivery
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    /// 客户自取/自送
    #[default]
    Pickup,
    /// 上门取送
    Delivery,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_have_no_successors() {
        assert!(OrderStatus::Delivered.allowed_next().is_empty());
        assert!(OrderStatus::Cancelled.allowed_next().is_empty());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_cancel_reachable_from_every_non_terminal() {
        for status in OrderStatus::ALL.iter().filter(|s| !s.is_terminal()) {
            assert!(status.can_transition_to(OrderStatus::Cancelled), "{status}");
        }
    }

    #[test]
    fn test_picked_up_and_confirmed_interchangeable() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::PickedUp));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::PickedUp.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::PickedUp));
    }

    #[test]
    fn test_no_skipping_ahead() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::InProgress.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::InProgress));
    }

    #[test]
    fn test_suggested_path_is_allowed() {
        let mut status = OrderStatus::Pending;
        let mut path = vec![status];
        while let Some(next) = status.suggested_next() {
            assert!(status.can_transition_to(next));
            status = next;
            path.push(status);
        }
        assert_eq!(
            path,
            vec![
                OrderStatus::Pending,
                OrderStatus::PickedUp,
                OrderStatus::InProgress,
                OrderStatus::Ready,
                OrderStatus::Delivered,
            ]
        );
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(OrderStatus::parse("picked_up"), Some(OrderStatus::PickedUp));
        assert_eq!(OrderStatus::parse("shipped"), None);
    }
}
