//! Test support: in-memory gateway and fixtures

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::models::{Role, ServiceCreate, ServiceType, UserUpdate};
use shared::order::{BookingItem, CreateOrderRequest, DeliveryType, Order};

use super::gateway::{Checkout, GatewayStatus, InitializeTransaction, PaymentGateway, Verification};
use super::reconciler::PaymentReconciler;
use super::{PaymentError, PaymentResult};
use crate::auth::CurrentUser;
use crate::catalog::CatalogStorage;
use crate::orders::{OrderStorage, OrdersManager};

pub const SECRET_KEY: &str = "sk_test_laundry";

/// 2024-05-01T10:00:00.123Z
pub const NOW: i64 = 1_714_557_600_123;

#[derive(Default)]
pub struct MockGateway {
    results: Mutex<HashMap<String, (GatewayStatus, i64)>>,
    initialized: Mutex<Vec<InitializeTransaction>>,
    verify_calls: AtomicUsize,
    fail_initialize: AtomicBool,
}

impl MockGateway {
    pub fn respond(&self, reference: &str, status: GatewayStatus, amount: i64) {
        if let Ok(mut results) = self.results.lock() {
            results.insert(reference.to_string(), (status, amount));
        }
    }

    pub fn succeed(&self, reference: &str, amount: i64) {
        self.respond(reference, GatewayStatus::Success, amount);
    }

    pub fn fail_initialize(&self) {
        self.fail_initialize.store(true, Ordering::SeqCst);
    }

    pub fn initialized(&self) -> Vec<InitializeTransaction> {
        self.initialized.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initialize(&self, request: InitializeTransaction) -> PaymentResult<Checkout> {
        if self.fail_initialize.load(Ordering::SeqCst) {
            return Err(PaymentError::Gateway("Invalid key".into()));
        }
        let checkout = Checkout {
            authorization_url: format!("https://checkout.test/{}", request.reference),
            access_code: "access".into(),
            reference: request.reference.clone(),
        };
        if let Ok(mut initialized) = self.initialized.lock() {
            initialized.push(request);
        }
        Ok(checkout)
    }

    async fn verify(&self, reference: &str) -> PaymentResult<Verification> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let (status, amount) = self
            .results
            .lock()
            .ok()
            .and_then(|r| r.get(reference).cloned())
            .unwrap_or((GatewayStatus::Pending, 0));
        Ok(Verification {
            reference: reference.to_string(),
            status,
            amount,
            paid_at: None,
            channel: Some("card".into()),
            gateway_response: None,
        })
    }
}

pub struct Fixture {
    pub orders: Arc<OrdersManager>,
    pub catalog: CatalogStorage,
    pub gateway: Arc<MockGateway>,
    pub reconciler: Arc<PaymentReconciler>,
    service_id: String,
}

impl Fixture {
    /// Pickup order of 2 × 150000 kobo
    pub fn place_order(&self, customer_id: &str) -> Order {
        self.catalog
            .upsert_profile(
                customer_id,
                UserUpdate {
                    full_name: Some(format!("Customer {customer_id}")),
                    email: Some(format!("{customer_id}@example.com")),
                    phone: None,
                    default_address: None,
                },
                Role::Customer,
                NOW,
            )
            .unwrap();
        self.orders
            .create_order_at(
                customer_id,
                CreateOrderRequest {
                    services: vec![BookingItem {
                        service_id: self.service_id.clone(),
                        quantity: 2,
                        weight_kg: None,
                        special_instructions: None,
                    }],
                    delivery_type: DeliveryType::Pickup,
                    scheduled_at: NOW + 86_400_000,
                    pickup_address: None,
                    delivery_address: None,
                    payment_method: None,
                    notes: None,
                },
                NOW,
            )
            .unwrap()
            .order
    }
}

fn build(with_gateway: bool) -> Fixture {
    let catalog = CatalogStorage::open_in_memory().unwrap();
    let storage = OrderStorage::open_in_memory().unwrap();
    let orders = Arc::new(OrdersManager::new(
        storage,
        catalog.clone(),
        "LD",
        chrono_tz::Africa::Lagos,
    ));
    let service_id = catalog
        .create_service(
            ServiceCreate {
                name: "Wash & Fold".into(),
                service_type: ServiceType::WashAndFold,
                description: None,
                base_price: 150_000,
                price_per_kg: None,
                price_per_item: None,
                is_active: true,
                coverage_areas: vec![],
                estimated_hours: None,
            },
            NOW,
        )
        .unwrap()
        .id;

    let gateway = Arc::new(MockGateway::default());
    let dyn_gateway: Option<Arc<dyn PaymentGateway>> = if with_gateway {
        Some(gateway.clone())
    } else {
        None
    };
    let reconciler = Arc::new(PaymentReconciler::new(
        orders.clone(),
        catalog.clone(),
        dyn_gateway,
        Some(SECRET_KEY.to_string()),
        None,
    ));
    Fixture {
        orders,
        catalog,
        gateway,
        reconciler,
        service_id,
    }
}

pub fn fixture() -> Fixture {
    build(true)
}

pub fn fixture_without_gateway() -> Fixture {
    build(false)
}

pub fn customer(id: &str) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        email: None,
        name: None,
        role: Role::Customer,
    }
}

pub fn staff() -> CurrentUser {
    CurrentUser {
        id: "staff-1".into(),
        email: None,
        name: None,
        role: Role::Staff,
    }
}
