use super::*;
use rust_decimal::Decimal;

#[test]
fn test_two_times_base_price() {
    let manager = create_test_manager();
    let detail = simple_order(&manager);

    assert_eq!(detail.order.total_amount, 300_000);
    assert_eq!(detail.order.final_amount, 300_000);
    assert_eq!(detail.order.discount_amount, 0);
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].unit_price, 150_000);
    assert_eq!(detail.items[0].total_price, 300_000);
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.payment_status, PaymentStatus::Pending);
    assert_eq!(detail.order.version, 1);
}

#[test]
fn test_persisted_and_reloadable() {
    let manager = create_test_manager();
    let created = simple_order(&manager);

    let reloaded = manager.get_detail(&created.order.id).unwrap();
    assert_eq!(reloaded, created);
    assert_eq!(reloaded.history.len(), 1);
    assert_eq!(reloaded.history[0].sequence, 1);
    assert_eq!(reloaded.history[0].status, OrderStatus::Pending);
    assert_eq!(reloaded.history[0].actor_id, "c1");
    assert_eq!(reloaded.suggested_next, Some(OrderStatus::PickedUp));

    let by_number = manager.get_by_number(&created.order.order_number).unwrap();
    assert_eq!(by_number.order.id, created.order.id);
}

#[test]
fn test_order_number_format() {
    let manager = create_test_manager();
    let detail = simple_order(&manager);
    assert_eq!(detail.order.order_number, "LD240501600123");
}

#[test]
fn test_order_number_collision_advances() {
    let manager = create_test_manager();
    let service_id = add_service(&manager, "Wash & Fold", 150_000, None, None);

    let a = manager
        .create_order_at("c1", pickup_request(vec![booking(&service_id, 1)]), NOW)
        .unwrap();
    let b = manager
        .create_order_at("c2", pickup_request(vec![booking(&service_id, 1)]), NOW)
        .unwrap();

    assert_eq!(a.order.order_number, "LD240501600123");
    assert_eq!(b.order.order_number, "LD240501600124");
}

#[test]
fn test_final_amount_equals_total_minus_discount() {
    let manager = create_test_manager();
    let a = add_service(&manager, "Wash & Fold", 150_000, Some(50_000), None);
    let b = add_service(&manager, "Dry Cleaning", 80_000, None, Some(120_000));

    let mut line_a = booking(&a, 1);
    line_a.weight_kg = Some(Decimal::new(35, 1)); // 3.5 kg
    let detail = manager
        .create_order_at("c1", pickup_request(vec![line_a, booking(&b, 3)]), NOW)
        .unwrap();

    // 150000 + 3.5 × 50000 = 325000; per-item override 120000 × 3 = 360000
    assert_eq!(detail.items[0].total_price, 325_000);
    assert_eq!(detail.items[1].unit_price, 120_000);
    assert_eq!(detail.items[1].total_price, 360_000);
    assert_eq!(detail.order.total_amount, 685_000);
    assert_eq!(
        detail.order.final_amount,
        detail.order.total_amount - detail.order.discount_amount
    );
    assert_eq!(detail.items[0].line_no, 1);
    assert_eq!(detail.items[1].line_no, 2);
}

#[test]
fn test_empty_services_rejected_before_persistence() {
    let manager = create_test_manager();
    let err = manager
        .create_order_at("c1", pickup_request(vec![]), NOW)
        .unwrap_err();
    assert!(matches!(err, OrderError::Empty));
    assert_eq!(manager.storage.count_orders().unwrap(), 0);
}

#[test]
fn test_missing_service_aborts_and_names_it() {
    let manager = create_test_manager();
    let known = add_service(&manager, "Wash & Fold", 150_000, None, None);

    let err = manager
        .create_order_at(
            "c1",
            pickup_request(vec![booking(&known, 1), booking("svc-ghost", 1)]),
            NOW,
        )
        .unwrap_err();
    assert!(err.to_string().contains("svc-ghost"));

    let app: AppError = err.into();
    assert_eq!(app.code, shared::error::ErrorCode::ServiceNotFound);
    assert!(app.message.contains("svc-ghost"));
    assert_eq!(manager.storage.count_orders().unwrap(), 0);
}

#[test]
fn test_inactive_service_rejected() {
    let manager = create_test_manager();
    let id = add_service(&manager, "Old Service", 100, None, None);
    manager
        .catalog
        .update_service(
            &id,
            shared::models::ServiceUpdate {
                is_active: Some(false),
                ..Default::default()
            },
            NOW,
        )
        .unwrap();

    let err = manager
        .create_order_at("c1", pickup_request(vec![booking(&id, 1)]), NOW)
        .unwrap_err();
    assert!(matches!(err, OrderError::ServiceInactive(name) if name == "Old Service"));
}

#[test]
fn test_quantity_bounds() {
    let manager = create_test_manager();
    let id = add_service(&manager, "Wash & Fold", 100, None, None);

    for qty in [0, MAX_QUANTITY + 1] {
        let err = manager
            .create_order_at("c1", pickup_request(vec![booking(&id, qty)]), NOW)
            .unwrap_err();
        assert!(matches!(err, OrderError::Rejected(_)));
    }
}

#[test]
fn test_delivery_requires_pickup_address() {
    let manager = create_test_manager();
    let id = add_service(&manager, "Wash & Fold", 100, None, None);

    let mut request = pickup_request(vec![booking(&id, 1)]);
    request.delivery_type = DeliveryType::Delivery;
    let err: AppError = manager
        .create_order_at("c1", request, NOW)
        .unwrap_err()
        .into();
    assert_eq!(err.code, shared::error::ErrorCode::InvalidAddress);
}

#[test]
fn test_delivery_address_defaults_to_pickup_and_lga_normalized() {
    let manager = create_test_manager();
    let id = add_service(&manager, "Wash & Fold", 100, None, None);

    let mut request = pickup_request(vec![booking(&id, 1)]);
    request.delivery_type = DeliveryType::Delivery;
    request.pickup_address = Some(lekki_address());
    let detail = manager.create_order_at("c1", request, NOW).unwrap();

    let pickup = detail.order.pickup_address.clone().unwrap();
    assert_eq!(pickup.lga, "Eti-Osa");
    assert_eq!(detail.order.delivery_address, Some(pickup));
}

#[test]
fn test_unknown_lga_rejected() {
    let manager = create_test_manager();
    let id = add_service(&manager, "Wash & Fold", 100, None, None);

    let mut address = lekki_address();
    address.lga = "Abuja Municipal".into();
    let mut request = pickup_request(vec![booking(&id, 1)]);
    request.delivery_type = DeliveryType::Delivery;
    request.pickup_address = Some(address);

    let err: AppError = manager
        .create_order_at("c1", request, NOW)
        .unwrap_err()
        .into();
    assert_eq!(err.code, shared::error::ErrorCode::InvalidAddress);
}

#[test]
fn test_pickup_orders_drop_addresses() {
    let manager = create_test_manager();
    let id = add_service(&manager, "Wash & Fold", 100, None, None);

    let mut request = pickup_request(vec![booking(&id, 1)]);
    request.pickup_address = Some(lekki_address());
    let detail = manager.create_order_at("c1", request, NOW).unwrap();
    assert!(detail.order.pickup_address.is_none());
    assert!(detail.order.delivery_address.is_none());
}

#[test]
fn test_list_orders_filters_and_paginates() {
    let manager = create_test_manager();
    let id = add_service(&manager, "Wash & Fold", 100, None, None);
    for (i, customer) in ["c1", "c2", "c1", "c1"].iter().enumerate() {
        manager
            .create_order_at(customer, pickup_request(vec![booking(&id, 1)]), NOW + i as i64 * 1000)
            .unwrap();
    }

    let filter = OrderFilter {
        customer_id: Some("c1".into()),
        ..Default::default()
    };
    let page = manager.list_orders(&filter, 0, 2).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.orders.len(), 2);
    // newest first
    assert!(page.orders[0].created_at > page.orders[1].created_at);

    let page = manager.list_orders(&filter, 2, 2).unwrap();
    assert_eq!(page.orders.len(), 1);

    let all = manager.list_orders(&OrderFilter::default(), 0, 100).unwrap();
    assert_eq!(all.total, 4);
}

#[test]
fn test_orders_with_items_in_range() {
    let manager = create_test_manager();
    let id = add_service(&manager, "Wash & Fold", 100, None, None);
    manager
        .create_order_at("c1", pickup_request(vec![booking(&id, 1)]), NOW)
        .unwrap();
    manager
        .create_order_at("c1", pickup_request(vec![booking(&id, 2)]), NOW + 10_000)
        .unwrap();

    let in_range = manager.orders_with_items(NOW, NOW + 10_000).unwrap();
    assert_eq!(in_range.len(), 1);
    assert_eq!(in_range[0].1.len(), 1);
    assert_eq!(in_range[0].1[0].quantity, 1);
}
