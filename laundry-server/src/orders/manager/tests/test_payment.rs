use super::*;

fn online(reference: &str, amount: i64) -> PaymentRecord {
    PaymentRecord {
        reference: Some(reference.to_string()),
        amount,
        method: PaymentMethod::Online,
        notes: None,
    }
}

#[test]
fn test_attach_reference_creates_marker() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;

    let order = manager
        .attach_payment_reference(&order_id, "LD1-abcd1234", NOW)
        .unwrap();
    assert_eq!(order.payment_reference.as_deref(), Some("LD1-abcd1234"));
    assert_eq!(order.payment_method, Some(PaymentMethod::Online));

    let marker = manager.storage.get_pending("LD1-abcd1234").unwrap().unwrap();
    assert_eq!(marker.order_id, order_id);
    assert_eq!(marker.attempts, 0);
    assert_eq!(
        manager.get_by_reference("LD1-abcd1234").unwrap().unwrap().id,
        order_id
    );
}

#[test]
fn test_confirm_payment_pays_and_confirms_atomically() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;
    manager
        .attach_payment_reference(&order_id, "ref-1", NOW)
        .unwrap();

    let result = manager
        .confirm_payment(&order_id, online("ref-1", 300_000), "system", NOW + 1)
        .unwrap();
    let PaymentConfirmation::Confirmed(order) = result else {
        panic!("expected Confirmed");
    };
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.amount_paid, 300_000);

    let detail = manager.get_detail(&order_id).unwrap();
    assert_eq!(detail.order.payment_status, PaymentStatus::Paid);
    assert_eq!(detail.order.status, OrderStatus::Confirmed);
    assert_eq!(detail.history.len(), 2);
    assert_eq!(detail.history[1].status, OrderStatus::Confirmed);
    assert_eq!(detail.history[1].actor_id, "system");
    assert!(manager.storage.get_pending("ref-1").unwrap().is_none());
}

#[test]
fn test_confirm_payment_is_idempotent() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;
    manager
        .attach_payment_reference(&order_id, "ref-1", NOW)
        .unwrap();
    manager
        .confirm_payment(&order_id, online("ref-1", 300_000), "system", NOW)
        .unwrap();

    let again = manager
        .confirm_payment(&order_id, online("ref-1", 300_000), "system", NOW + 5)
        .unwrap();
    assert!(matches!(again, PaymentConfirmation::AlreadyPaid(_)));

    let detail = manager.get_detail(&order_id).unwrap();
    assert_eq!(detail.history.len(), 2);
    assert_eq!(detail.order.version, 3);
}

#[test]
fn test_underpayment_writes_nothing() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;
    manager
        .attach_payment_reference(&order_id, "ref-1", NOW)
        .unwrap();

    let err = manager
        .confirm_payment(&order_id, online("ref-1", 299_999), "system", NOW)
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::AmountMismatch {
            expected: 300_000,
            paid: 299_999
        }
    ));

    let order = manager.get_order(&order_id).unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(manager.storage.get_pending("ref-1").unwrap().is_some());
}

#[test]
fn test_payment_after_pickup_keeps_status() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;
    manager
        .transition_at(&order_id, to(OrderStatus::PickedUp), &staff(), NOW)
        .unwrap();

    let result = manager
        .confirm_payment(
            &order_id,
            PaymentRecord {
                reference: None,
                amount: 300_000,
                method: PaymentMethod::Cash,
                notes: Some("Paid at counter".into()),
            },
            "staff-1",
            NOW,
        )
        .unwrap();
    let PaymentConfirmation::Confirmed(order) = result else {
        panic!("expected Confirmed");
    };
    assert_eq!(order.status, OrderStatus::PickedUp);
    assert_eq!(order.payment_method, Some(PaymentMethod::Cash));
    // already past pending: no confirm entry
    assert_eq!(manager.history(&order_id).unwrap().len(), 2);
}

#[test]
fn test_other_reference_on_paid_order() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;
    manager
        .attach_payment_reference(&order_id, "ref-1", NOW)
        .unwrap();
    manager
        .attach_payment_reference(&order_id, "ref-2", NOW)
        .unwrap();
    manager
        .confirm_payment(&order_id, online("ref-2", 300_000), "system", NOW)
        .unwrap();

    let err = manager
        .confirm_payment(&order_id, online("ref-1", 300_000), "system", NOW)
        .unwrap_err();
    assert!(matches!(err, OrderError::AlreadyPaid(_)));
    assert!(manager.storage.get_pending("ref-1").unwrap().is_none());
}

#[test]
fn test_cannot_initialize_paid_or_cancelled() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;
    manager
        .transition_at(&order_id, to(OrderStatus::Cancelled), &staff(), NOW)
        .unwrap();
    assert!(matches!(
        manager.attach_payment_reference(&order_id, "ref-1", NOW),
        Err(OrderError::OrderClosed { .. })
    ));
}

#[test]
fn test_payment_on_cancelled_order_is_recorded_for_refund() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;
    manager
        .attach_payment_reference(&order_id, "ref-x", NOW)
        .unwrap();
    manager
        .transition_at(&order_id, to(OrderStatus::Cancelled), &user("c1", Role::Customer), NOW + 1)
        .unwrap();

    let result = manager
        .confirm_payment(&order_id, online("ref-x", 300_000), "system", NOW + 2)
        .unwrap();
    assert!(matches!(result, PaymentConfirmation::Confirmed(_)));

    let detail = manager.get_detail(&order_id).unwrap();
    assert_eq!(detail.order.status, OrderStatus::Cancelled);
    assert_eq!(detail.order.payment_status, PaymentStatus::Paid);
    assert_eq!(detail.order.amount_paid, 300_000);
    assert_eq!(detail.history.len(), 3);
    let last = detail.history.last().unwrap();
    assert_eq!(last.status, OrderStatus::Cancelled);
    assert_eq!(last.actor_id, "system");
    assert!(last.notes.as_deref().unwrap().contains("refund required"));
    assert!(manager.storage.get_pending("ref-x").unwrap().is_none());

    // 入账后可走退款
    let refunded = manager
        .mark_refunded(&order_id, "owner-1", None, NOW + 3)
        .unwrap();
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
}

#[test]
fn test_refund_flow() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;

    assert!(matches!(
        manager.mark_refunded(&order_id, "owner-1", None, NOW),
        Err(OrderError::NotRefundable { .. })
    ));

    manager
        .confirm_payment(
            &order_id,
            PaymentRecord {
                reference: Some("TRF-001".into()),
                amount: 300_000,
                method: PaymentMethod::Transfer,
                notes: None,
            },
            "staff-1",
            NOW,
        )
        .unwrap();
    let order = manager
        .mark_refunded(&order_id, "owner-1", Some("Damaged shirt".into()), NOW)
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Refunded);

    assert!(matches!(
        manager.mark_refunded(&order_id, "owner-1", None, NOW),
        Err(OrderError::AlreadyRefunded(_))
    ));
    assert!(matches!(
        manager.confirm_payment(&order_id, online("ref-x", 300_000), "system", NOW),
        Err(OrderError::AlreadyRefunded(_))
    ));
}
