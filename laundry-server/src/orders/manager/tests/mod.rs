use super::*;
use shared::models::{Address, Role, ServiceCreate, ServiceType};
use shared::order::{BookingItem, CreateOrderRequest, DeliveryType, TransitionRequest};

/// 2024-05-01T10:00:00.123Z
const NOW: i64 = 1_714_557_600_123;

fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    let catalog = CatalogStorage::open_in_memory().unwrap();
    OrdersManager::new(storage, catalog, "LD", chrono_tz::Africa::Lagos)
}

fn add_service(
    manager: &OrdersManager,
    name: &str,
    base_price: i64,
    price_per_kg: Option<i64>,
    price_per_item: Option<i64>,
) -> String {
    manager
        .catalog
        .create_service(
            ServiceCreate {
                name: name.to_string(),
                service_type: ServiceType::WashAndFold,
                description: None,
                base_price,
                price_per_kg,
                price_per_item,
                is_active: true,
                coverage_areas: vec![],
                estimated_hours: None,
            },
            NOW,
        )
        .unwrap()
        .id
}

fn booking(service_id: &str, quantity: u32) -> BookingItem {
    BookingItem {
        service_id: service_id.to_string(),
        quantity,
        weight_kg: None,
        special_instructions: None,
    }
}

fn pickup_request(services: Vec<BookingItem>) -> CreateOrderRequest {
    CreateOrderRequest {
        services,
        delivery_type: DeliveryType::Pickup,
        scheduled_at: NOW + 86_400_000,
        pickup_address: None,
        delivery_address: None,
        payment_method: None,
        notes: None,
    }
}

fn lekki_address() -> Address {
    Address {
        street: "12 Admiralty Way".into(),
        area: "Lekki Phase 1".into(),
        lga: "eti-osa".into(),
        city: "Lagos".into(),
        state: "Lagos".into(),
        landmark: Some("Opposite the mall".into()),
    }
}

fn user(id: &str, role: Role) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        email: None,
        name: None,
        role,
    }
}

fn staff() -> CurrentUser {
    user("staff-1", Role::Staff)
}

fn to(status: OrderStatus) -> TransitionRequest {
    TransitionRequest {
        status,
        notes: None,
        expected_version: None,
    }
}

/// Create a simple order for customer `c1` worth 300000 kobo
fn simple_order(manager: &OrdersManager) -> OrderDetail {
    let service_id = add_service(manager, "Wash & Fold", 150_000, None, None);
    manager
        .create_order_at("c1", pickup_request(vec![booking(&service_id, 2)]), NOW)
        .unwrap()
}

mod test_create;
mod test_lifecycle;
mod test_payment;
