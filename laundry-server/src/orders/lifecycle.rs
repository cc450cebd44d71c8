//! Order status state machine
//!
//! | From | To |
//! |------|----|
//! | pending | picked_up, confirmed, cancelled |
//! | confirmed | picked_up, in_progress, cancelled |
//! | picked_up | confirmed, in_progress, cancelled |
//! | in_progress | ready, cancelled |
//! | ready | delivered, cancelled |
//! | delivered, cancelled | (terminal) |
//!
//! The table itself lives on [`OrderStatus::allowed_next`]; this module adds
//! authorization and the side effects of a transition.

use shared::models::Capability;
use shared::order::{Order, OrderStatus};

use super::manager::OrderError;
use crate::auth::CurrentUser;

/// Who may move an order to `next`
///
/// Holders of `UpdateOrderStatus` may apply any valid transition; a customer
/// may only cancel their own order while it is still pending.
pub fn authorize_transition(
    user: &CurrentUser,
    order: &Order,
    next: OrderStatus,
) -> Result<(), OrderError> {
    if user.has(Capability::UpdateOrderStatus) {
        return Ok(());
    }
    if order.customer_id != user.id {
        return Err(OrderError::NotOrderOwner);
    }
    if next == OrderStatus::Cancelled && order.status == OrderStatus::Pending {
        return Ok(());
    }
    Err(OrderError::PermissionDenied(
        "Customers can only cancel their own pending orders".to_string(),
    ))
}

/// Reject transitions the state machine does not allow
pub fn check_transition(order: &Order, next: OrderStatus) -> Result<(), OrderError> {
    if order.status.is_terminal() {
        return Err(OrderError::OrderClosed {
            order_number: order.order_number.clone(),
            status: order.status,
        });
    }
    if !order.status.can_transition_to(next) {
        return Err(OrderError::InvalidTransition {
            from: order.status,
            to: next,
        });
    }
    Ok(())
}

/// Apply a (checked) transition to the record
///
/// `ready` stamps `actual_pickup_at`, `delivered` stamps `actual_delivery_at`.
pub fn apply_transition(order: &mut Order, next: OrderStatus, now: i64) {
    order.status = next;
    match next {
        OrderStatus::Ready => order.actual_pickup_at = Some(now),
        OrderStatus::Delivered => order.actual_delivery_at = Some(now),
        _ => {}
    }
    order.version += 1;
    order.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Role;
    use shared::order::{DeliveryType, PaymentStatus};

    fn order(status: OrderStatus) -> Order {
        Order {
            id: "o1".into(),
            order_number: "LD240501000001".into(),
            customer_id: "c1".into(),
            status,
            total_amount: 100,
            discount_amount: 0,
            final_amount: 100,
            amount_paid: 0,
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
            payment_method: None,
            delivery_type: DeliveryType::Pickup,
            pickup_address: None,
            delivery_address: None,
            scheduled_at: 0,
            notes: None,
            actual_pickup_at: None,
            actual_delivery_at: None,
            version: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn user(id: &str, role: Role) -> CurrentUser {
        CurrentUser {
            id: id.into(),
            email: None,
            name: None,
            role,
        }
    }

    #[test]
    fn test_primary_path_is_valid() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::PickedUp,
            OrderStatus::InProgress,
            OrderStatus::Ready,
            OrderStatus::Delivered,
        ];
        for pair in path.windows(2) {
            assert!(check_transition(&order(pair[0]), pair[1]).is_ok());
        }
    }

    #[test]
    fn test_every_pair_matches_table() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let result = check_transition(&order(from), to);
                assert_eq!(result.is_ok(), from.allowed_next().contains(&to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_skipping_stages_rejected() {
        assert!(matches!(
            check_transition(&order(OrderStatus::Pending), OrderStatus::Delivered),
            Err(OrderError::InvalidTransition { .. })
        ));
        assert!(matches!(
            check_transition(&order(OrderStatus::Ready), OrderStatus::InProgress),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_terminal_orders_are_closed() {
        assert!(matches!(
            check_transition(&order(OrderStatus::Delivered), OrderStatus::Cancelled),
            Err(OrderError::OrderClosed { .. })
        ));
        assert!(matches!(
            check_transition(&order(OrderStatus::Cancelled), OrderStatus::Pending),
            Err(OrderError::OrderClosed { .. })
        ));
    }

    #[test]
    fn test_apply_stamps_timestamps() {
        let mut o = order(OrderStatus::InProgress);
        apply_transition(&mut o, OrderStatus::Ready, 10);
        assert_eq!(o.actual_pickup_at, Some(10));
        assert_eq!(o.version, 2);

        apply_transition(&mut o, OrderStatus::Delivered, 20);
        assert_eq!(o.actual_delivery_at, Some(20));
        assert_eq!(o.updated_at, 20);
        assert_eq!(o.version, 3);
    }

    #[test]
    fn test_customer_may_cancel_own_pending_order() {
        let o = order(OrderStatus::Pending);
        assert!(authorize_transition(&user("c1", Role::Customer), &o, OrderStatus::Cancelled).is_ok());
        assert!(matches!(
            authorize_transition(&user("c1", Role::Customer), &o, OrderStatus::PickedUp),
            Err(OrderError::PermissionDenied(_))
        ));
        assert!(matches!(
            authorize_transition(&user("c2", Role::Customer), &o, OrderStatus::Cancelled),
            Err(OrderError::NotOrderOwner)
        ));
    }

    #[test]
    fn test_customer_cannot_cancel_after_pickup() {
        let o = order(OrderStatus::PickedUp);
        assert!(matches!(
            authorize_transition(&user("c1", Role::Customer), &o, OrderStatus::Cancelled),
            Err(OrderError::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_staff_may_transition_any_order() {
        let o = order(OrderStatus::PickedUp);
        assert!(authorize_transition(&user("s1", Role::Staff), &o, OrderStatus::InProgress).is_ok());
    }
}
