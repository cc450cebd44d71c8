use super::*;

#[test]
fn test_each_transition_appends_exactly_one_entry() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;

    let path = [
        OrderStatus::PickedUp,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ];
    let mut previous_len = manager.history(&order_id).unwrap().len();
    for (i, status) in path.into_iter().enumerate() {
        let detail = manager
            .transition_at(&order_id, to(status), &staff(), NOW + (i as i64 + 1) * 1000)
            .unwrap();
        assert_eq!(detail.history.len(), previous_len + 1);
        let last = detail.history.last().unwrap();
        assert_eq!(last.status, detail.order.status);
        assert_eq!(last.sequence as usize, detail.history.len());
        assert_eq!(last.actor_id, "staff-1");
        previous_len = detail.history.len();
    }

    let order = manager.get_order(&order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.actual_pickup_at, Some(NOW + 3000));
    assert_eq!(order.actual_delivery_at, Some(NOW + 4000));
    assert_eq!(order.version, 5);
}

#[test]
fn test_invalid_transition_writes_nothing() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;

    let err = manager
        .transition_at(&order_id, to(OrderStatus::Delivered), &staff(), NOW)
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));

    let detail = manager.get_detail(&order_id).unwrap();
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.version, 1);
    assert_eq!(detail.history.len(), 1);
}

#[test]
fn test_terminal_order_cannot_move() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;
    manager
        .transition_at(&order_id, to(OrderStatus::Cancelled), &staff(), NOW)
        .unwrap();

    let err = manager
        .transition_at(&order_id, to(OrderStatus::PickedUp), &staff(), NOW)
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderClosed { .. }));
    let app: AppError = err.into();
    assert_eq!(app.code, shared::error::ErrorCode::OrderClosed);
}

#[test]
fn test_stale_expected_version_rejected() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;

    manager
        .transition_at(
            &order_id,
            TransitionRequest {
                status: OrderStatus::PickedUp,
                notes: Some("Collected by rider".into()),
                expected_version: Some(1),
            },
            &staff(),
            NOW,
        )
        .unwrap();

    // Second writer still holds version 1
    let err = manager
        .transition_at(
            &order_id,
            TransitionRequest {
                status: OrderStatus::Cancelled,
                notes: None,
                expected_version: Some(1),
            },
            &staff(),
            NOW,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::VersionConflict {
            expected: 1,
            actual: 2
        }
    ));

    let detail = manager.get_detail(&order_id).unwrap();
    assert_eq!(detail.order.status, OrderStatus::PickedUp);
    assert_eq!(detail.history.len(), 2);
    assert_eq!(detail.history[1].notes.as_deref(), Some("Collected by rider"));
}

#[test]
fn test_picked_up_and_confirmed_reachable_in_either_order() {
    let manager = create_test_manager();
    let a = simple_order(&manager).order.id;
    manager
        .transition_at(&a, to(OrderStatus::PickedUp), &staff(), NOW)
        .unwrap();
    manager
        .transition_at(&a, to(OrderStatus::Confirmed), &staff(), NOW)
        .unwrap();

    let b = manager
        .create_order_at(
            "c1",
            pickup_request(vec![booking(
                &manager.get_detail(&a).unwrap().items[0].service_id,
                1,
            )]),
            NOW + 5,
        )
        .unwrap()
        .order
        .id;
    manager
        .transition_at(&b, to(OrderStatus::Confirmed), &staff(), NOW)
        .unwrap();
    let detail = manager
        .transition_at(&b, to(OrderStatus::PickedUp), &staff(), NOW)
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::PickedUp);
}

#[test]
fn test_customer_cancels_own_pending_order() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;

    let err = manager
        .transition_at(
            &order_id,
            to(OrderStatus::Cancelled),
            &user("c2", Role::Customer),
            NOW,
        )
        .unwrap_err();
    assert!(matches!(err, OrderError::NotOrderOwner));

    let detail = manager
        .transition_at(
            &order_id,
            to(OrderStatus::Cancelled),
            &user("c1", Role::Customer),
            NOW,
        )
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::Cancelled);
    assert_eq!(detail.suggested_next, None);
}

#[test]
fn test_customer_cannot_advance_status() {
    let manager = create_test_manager();
    let order_id = simple_order(&manager).order.id;
    let err = manager
        .transition_at(
            &order_id,
            to(OrderStatus::PickedUp),
            &user("c1", Role::Customer),
            NOW,
        )
        .unwrap_err();
    assert!(matches!(err, OrderError::PermissionDenied(_)));
}

#[test]
fn test_unknown_order() {
    let manager = create_test_manager();
    assert!(matches!(
        manager.transition_at("nope", to(OrderStatus::PickedUp), &staff(), NOW),
        Err(OrderError::OrderNotFound(_))
    ));
    assert!(matches!(manager.history("nope"), Err(OrderError::OrderNotFound(_))));
}

#[test]
fn test_concurrent_transitions_never_lose_history() {
    use std::sync::Arc;

    let manager = Arc::new(create_test_manager());
    let order_id = simple_order(&manager).order.id;

    // Many writers race on pending → picked_up / confirmed / cancelled;
    // every successful write must leave exactly one history entry.
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            let order_id = order_id.clone();
            std::thread::spawn(move || {
                let status = match i % 3 {
                    0 => OrderStatus::PickedUp,
                    1 => OrderStatus::Confirmed,
                    _ => OrderStatus::InProgress,
                };
                manager
                    .transition_at(&order_id, to(status), &staff(), NOW + i)
                    .is_ok()
            })
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    let detail = manager.get_detail(&order_id).unwrap();
    assert_eq!(detail.history.len(), 1 + successes);
    assert_eq!(detail.order.version as usize, 1 + successes);
    let sequences: Vec<u64> = detail.history.iter().map(|h| h.sequence).collect();
    let expected: Vec<u64> = (1..=detail.history.len() as u64).collect();
    assert_eq!(sequences, expected);
    assert_eq!(detail.history.last().unwrap().status, detail.order.status);
}
