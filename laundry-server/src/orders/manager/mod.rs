//! OrdersManager - order creation, status workflow and payment bookkeeping
//!
//! Every command runs inside a single redb write transaction:
//!
//! ```text
//! create_order(customer, request)
//!     ├─ 1. Validate request (services, quantities, addresses, text)
//!     ├─ 2. Resolve services against the catalog, price each line
//!     ├─ 3. Begin write transaction
//!     ├─ 4. Allocate a unique order number (index check)
//!     ├─ 5. Persist order + items + history #1 + number index
//!     └─ 6. Commit
//!
//! transition(order, request, actor)
//!     ├─ 1. Begin write transaction, load order
//!     ├─ 2. expected_version check
//!     ├─ 3. Authorize + state machine check
//!     ├─ 4. Apply (timestamps, version) and append history
//!     └─ 5. Commit
//! ```

mod error;
pub use error::*;

use chrono_tz::Tz;
use shared::order::{
    BookingItem, CreateOrderRequest, DeliveryType, Order, OrderDetail, OrderItem, OrderStatus,
    PaymentMethod, PaymentStatus, StatusChange, TransitionRequest,
};

use super::lifecycle::{apply_transition, authorize_transition, check_transition};
use super::number::format_order_number;
use super::pricing::price_line;
use super::storage::{OrderStorage, PendingReconciliation};
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::catalog::CatalogStorage;
use crate::utils::AppError;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_address, validate_optional_text,
};

/// Maximum quantity per line
pub const MAX_QUANTITY: u32 = 999;

/// Order number collision retries before giving up
const MAX_NUMBER_ATTEMPTS: i64 = 1000;

/// List filter
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<String>,
    /// `created_at >= from`
    pub from: Option<i64>,
    /// `created_at < to`
    pub to: Option<i64>,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| order.status == s)
            && self
                .customer_id
                .as_deref()
                .is_none_or(|c| order.customer_id == c)
            && self.from.is_none_or(|from| order.created_at >= from)
            && self.to.is_none_or(|to| order.created_at < to)
    }
}

/// One page of orders plus the filtered total
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: usize,
}

/// A payment to be applied to an order
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    /// Gateway or offline reference
    pub reference: Option<String>,
    pub amount: i64,
    pub method: PaymentMethod,
    /// History note when the payment confirms the order
    pub notes: Option<String>,
}

/// Result of [`OrdersManager::confirm_payment`]
#[derive(Debug, Clone)]
pub enum PaymentConfirmation {
    /// Payment written (and order confirmed when it was pending)
    Confirmed(Order),
    /// Same reference already applied; nothing written
    AlreadyPaid(Order),
}

/// OrdersManager
pub struct OrdersManager {
    storage: OrderStorage,
    catalog: CatalogStorage,
    order_number_prefix: String,
    /// 业务时区
    tz: Tz,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("order_number_prefix", &self.order_number_prefix)
            .field("tz", &self.tz)
            .finish()
    }
}

impl OrdersManager {
    pub fn new(
        storage: OrderStorage,
        catalog: CatalogStorage,
        order_number_prefix: impl Into<String>,
        tz: Tz,
    ) -> Self {
        Self {
            storage,
            catalog,
            order_number_prefix: order_number_prefix.into(),
            tz,
        }
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    // ========== Creation ==========

    pub fn create_order(
        &self,
        customer_id: &str,
        request: CreateOrderRequest,
    ) -> OrderResult<OrderDetail> {
        self.create_order_at(customer_id, request, now_millis())
    }

    /// Create an order as of `now` (Unix millis)
    pub fn create_order_at(
        &self,
        customer_id: &str,
        request: CreateOrderRequest,
        now: i64,
    ) -> OrderResult<OrderDetail> {
        if request.services.is_empty() {
            return Err(OrderError::Empty);
        }
        validate_booking_items(&request.services)?;
        validate_optional_text(&request.notes, "notes", MAX_NOTE_LEN)?;
        if request.scheduled_at <= 0 {
            return Err(AppError::validation("scheduled_at is required").into());
        }

        let (pickup_address, delivery_address) = match request.delivery_type {
            DeliveryType::Delivery => {
                let pickup = request.pickup_address.as_ref().ok_or_else(|| {
                    AppError::with_message(
                        shared::error::ErrorCode::InvalidAddress,
                        "pickup_address is required for delivery orders",
                    )
                })?;
                let pickup = validate_address(pickup, "pickup_address")?;
                let delivery = match &request.delivery_address {
                    Some(address) => validate_address(address, "delivery_address")?,
                    None => pickup.clone(),
                };
                (Some(pickup), Some(delivery))
            }
            DeliveryType::Pickup => (None, None),
        };

        let order_id = uuid::Uuid::new_v4().to_string();

        // 解析服务并定价
        let mut items = Vec::with_capacity(request.services.len());
        let mut total_amount: i64 = 0;
        for (idx, booking) in request.services.iter().enumerate() {
            let service = self
                .catalog
                .get_service(&booking.service_id)?
                .ok_or_else(|| OrderError::ServiceNotFound(booking.service_id.clone()))?;
            if !service.is_active {
                return Err(OrderError::ServiceInactive(service.name));
            }

            let price = price_line(&service, booking.quantity, booking.weight_kg)?;
            total_amount = total_amount
                .checked_add(price.total_price)
                .ok_or_else(|| AppError::validation("order total overflow"))?;

            items.push(OrderItem {
                id: uuid::Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                line_no: idx as u32 + 1,
                service_id: service.id,
                service_name: service.name,
                quantity: booking.quantity,
                weight_kg: booking.weight_kg,
                unit_price: price.unit_price,
                total_price: price.total_price,
                special_instructions: booking.special_instructions.clone(),
            });
        }

        let discount_amount = 0;
        let mut order = Order {
            id: order_id,
            order_number: String::new(),
            customer_id: customer_id.to_string(),
            status: OrderStatus::Pending,
            total_amount,
            discount_amount,
            final_amount: total_amount - discount_amount,
            amount_paid: 0,
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
            payment_method: request.payment_method,
            delivery_type: request.delivery_type,
            pickup_address,
            delivery_address,
            scheduled_at: request.scheduled_at,
            notes: request.notes,
            actual_pickup_at: None,
            actual_delivery_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let txn = self.storage.begin_write()?;
        order.order_number = self.allocate_order_number(&txn, now)?;
        self.storage.store_order(&txn, &order)?;
        self.storage.store_items(&txn, &items)?;
        let created =
            self.storage
                .append_status(&txn, &order.id, OrderStatus::Pending, now, customer_id, None)?;
        self.storage
            .index_order_number(&txn, &order.order_number, &order.id)?;
        txn.commit()?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            customer_id = %customer_id,
            items = items.len(),
            final_amount = order.final_amount,
            "Order created"
        );

        Ok(OrderDetail::new(order, items, vec![created]))
    }

    fn allocate_order_number(&self, txn: &redb::WriteTransaction, now: i64) -> OrderResult<String> {
        for offset in 0..MAX_NUMBER_ATTEMPTS {
            let number = format_order_number(&self.order_number_prefix, now + offset, self.tz);
            if !self.storage.order_number_exists_txn(txn, &number)? {
                if offset > 0 {
                    tracing::debug!(number = %number, offset, "Order number collision resolved");
                }
                return Ok(number);
            }
        }
        Err(AppError::internal("Unable to allocate a unique order number").into())
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: &str) -> OrderResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    pub fn get_detail(&self, order_id: &str) -> OrderResult<OrderDetail> {
        let order = self.get_order(order_id)?;
        let items = self.storage.get_items(order_id)?;
        let history = self.storage.get_history(order_id)?;
        Ok(OrderDetail::new(order, items, history))
    }

    pub fn get_by_number(&self, order_number: &str) -> OrderResult<OrderDetail> {
        let order_id = self
            .storage
            .find_by_number(order_number)?
            .ok_or_else(|| OrderError::OrderNotFound(order_number.to_string()))?;
        self.get_detail(&order_id)
    }

    pub fn get_by_reference(&self, reference: &str) -> OrderResult<Option<Order>> {
        match self.storage.find_by_reference(reference)? {
            Some(order_id) => Ok(Some(self.get_order(&order_id)?)),
            None => Ok(None),
        }
    }

    pub fn history(&self, order_id: &str) -> OrderResult<Vec<StatusChange>> {
        // 404 for unknown orders rather than an empty log
        self.get_order(order_id)?;
        Ok(self.storage.get_history(order_id)?)
    }

    /// Filtered orders, newest first, offset-paginated
    pub fn list_orders(
        &self,
        filter: &OrderFilter,
        offset: usize,
        limit: usize,
    ) -> OrderResult<OrderPage> {
        let matching: Vec<Order> = self
            .storage
            .list_orders()?
            .into_iter()
            .filter(|o| filter.matches(o))
            .collect();
        let total = matching.len();
        let orders = matching.into_iter().skip(offset).take(limit).collect();
        Ok(OrderPage { orders, total })
    }

    /// Orders created in `[from, to)` with their items (analytics input)
    pub fn orders_with_items(&self, from: i64, to: i64) -> OrderResult<Vec<(Order, Vec<OrderItem>)>> {
        let filter = OrderFilter {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        };
        let mut result = Vec::new();
        for order in self.storage.list_orders()? {
            if filter.matches(&order) {
                let items = self.storage.get_items(&order.id)?;
                result.push((order, items));
            }
        }
        Ok(result)
    }

    // ========== Status workflow ==========

    pub fn transition(
        &self,
        order_id: &str,
        request: TransitionRequest,
        actor: &CurrentUser,
    ) -> OrderResult<OrderDetail> {
        self.transition_at(order_id, request, actor, now_millis())
    }

    pub fn transition_at(
        &self,
        order_id: &str,
        request: TransitionRequest,
        actor: &CurrentUser,
        now: i64,
    ) -> OrderResult<OrderDetail> {
        validate_optional_text(&request.notes, "notes", MAX_NOTE_LEN)?;

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if let Some(expected) = request.expected_version
            && expected != order.version
        {
            return Err(OrderError::VersionConflict {
                expected,
                actual: order.version,
            });
        }

        let next = request.status;
        authorize_transition(actor, &order, next)?;
        check_transition(&order, next)?;

        let previous = order.status;
        apply_transition(&mut order, next, now);
        self.storage.store_order(&txn, &order)?;
        self.storage
            .append_status(&txn, &order.id, next, now, &actor.id, request.notes)?;
        txn.commit()?;

        audit_log!(
            actor.id,
            "order_transition",
            format!("order:{}", order.order_number),
            format!("{previous} -> {next}")
        );

        self.get_detail(order_id)
    }

    // ========== Payments ==========

    /// Store a gateway reference on the order and queue it for reconciliation
    pub fn attach_payment_reference(
        &self,
        order_id: &str,
        reference: &str,
        now: i64,
    ) -> OrderResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        ensure_payable(&order)?;

        order.payment_reference = Some(reference.to_string());
        order.payment_method = Some(PaymentMethod::Online);
        order.version += 1;
        order.updated_at = now;
        self.storage.store_order(&txn, &order)?;
        self.storage
            .index_payment_reference(&txn, reference, &order.id)?;
        self.storage.put_pending(
            &txn,
            &PendingReconciliation {
                reference: reference.to_string(),
                order_id: order.id.clone(),
                attempts: 0,
                created_at: now,
                last_checked_at: None,
            },
        )?;
        txn.commit()?;

        tracing::info!(order_number = %order.order_number, reference = %reference, "Payment initialized");
        Ok(order)
    }

    /// Apply a confirmed payment
    ///
    /// One write transaction: `paid` + amount + reference, `pending → confirmed`
    /// with its history entry, and removal of the reconciliation marker.
    pub fn confirm_payment(
        &self,
        order_id: &str,
        payment: PaymentRecord,
        actor_id: &str,
        now: i64,
    ) -> OrderResult<PaymentConfirmation> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        match order.payment_status {
            PaymentStatus::Paid => {
                if payment.reference.is_some() && payment.reference == order.payment_reference {
                    // 幂等：同一 reference 重复确认
                    if let Some(reference) = &payment.reference {
                        self.storage.remove_pending(&txn, reference)?;
                    }
                    txn.commit()?;
                    return Ok(PaymentConfirmation::AlreadyPaid(order));
                }
                if let Some(reference) = &payment.reference {
                    self.storage.remove_pending(&txn, reference)?;
                    txn.commit()?;
                    tracing::warn!(
                        order_number = %order.order_number,
                        reference = %reference,
                        "Payment succeeded for an order already paid by another reference"
                    );
                }
                return Err(OrderError::AlreadyPaid(order.order_number));
            }
            PaymentStatus::Refunded => {
                return Err(OrderError::AlreadyRefunded(order.order_number));
            }
            PaymentStatus::Pending | PaymentStatus::Failed => {}
        }

        if payment.amount < order.final_amount {
            return Err(OrderError::AmountMismatch {
                expected: order.final_amount,
                paid: payment.amount,
            });
        }

        order.payment_status = PaymentStatus::Paid;
        order.amount_paid = payment.amount;
        order.payment_method = Some(payment.method);
        if payment.reference.is_some() {
            order.payment_reference = payment.reference.clone();
        }
        order.version += 1;
        order.updated_at = now;

        let confirmed = order.status == OrderStatus::Pending;
        if confirmed {
            order.status = OrderStatus::Confirmed;
        }
        self.storage.store_order(&txn, &order)?;
        if confirmed {
            self.storage.append_status(
                &txn,
                &order.id,
                OrderStatus::Confirmed,
                now,
                actor_id,
                Some(
                    payment
                        .notes
                        .clone()
                        .unwrap_or_else(|| format!("Payment received via {}", payment.method.as_str())),
                ),
            )?;
        }
        // 已取消订单收到款项：照常入账，历史中留痕待退款
        let cancelled = order.status == OrderStatus::Cancelled;
        if cancelled {
            self.storage.append_status(
                &txn,
                &order.id,
                OrderStatus::Cancelled,
                now,
                actor_id,
                Some(format!(
                    "Payment of {} received after cancellation; refund required",
                    payment.amount
                )),
            )?;
        }
        if let Some(reference) = &payment.reference {
            self.storage.remove_pending(&txn, reference)?;
        }
        txn.commit()?;

        if cancelled {
            tracing::warn!(
                order_number = %order.order_number,
                amount = payment.amount,
                reference = payment.reference.as_deref().unwrap_or("-"),
                "Payment captured for a cancelled order, refund required"
            );
            audit_log!(
                actor_id,
                "payment_on_cancelled_order",
                format!("order:{}", order.order_number),
                format!(
                    "amount={} reference={}",
                    payment.amount,
                    payment.reference.as_deref().unwrap_or("-")
                )
            );
        }

        audit_log!(
            actor_id,
            "payment_confirmed",
            format!("order:{}", order.order_number),
            format!(
                "amount={} method={} reference={}",
                payment.amount,
                payment.method.as_str(),
                payment.reference.as_deref().unwrap_or("-")
            )
        );

        Ok(PaymentConfirmation::Confirmed(order))
    }

    /// Mark a paid order as refunded (no gateway call)
    pub fn mark_refunded(
        &self,
        order_id: &str,
        actor_id: &str,
        reason: Option<String>,
        now: i64,
    ) -> OrderResult<Order> {
        validate_optional_text(&reason, "reason", MAX_NOTE_LEN)?;

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        match order.payment_status {
            PaymentStatus::Paid => {}
            PaymentStatus::Refunded => return Err(OrderError::AlreadyRefunded(order.order_number)),
            status => {
                return Err(OrderError::NotRefundable {
                    order_number: order.order_number,
                    status,
                });
            }
        }

        order.payment_status = PaymentStatus::Refunded;
        order.version += 1;
        order.updated_at = now;
        self.storage.store_order(&txn, &order)?;
        txn.commit()?;

        audit_log!(
            actor_id,
            "payment_refunded",
            format!("order:{}", order.order_number),
            reason.unwrap_or_default()
        );
        Ok(order)
    }
}

/// Online payment may start only for unpaid, open orders
pub fn ensure_payable(order: &Order) -> OrderResult<()> {
    match order.payment_status {
        PaymentStatus::Paid => return Err(OrderError::AlreadyPaid(order.order_number.clone())),
        PaymentStatus::Refunded => {
            return Err(OrderError::AlreadyRefunded(order.order_number.clone()));
        }
        PaymentStatus::Pending | PaymentStatus::Failed => {}
    }
    if order.status == OrderStatus::Cancelled {
        return Err(OrderError::OrderClosed {
            order_number: order.order_number.clone(),
            status: order.status,
        });
    }
    Ok(())
}

fn validate_booking_items(items: &[BookingItem]) -> OrderResult<()> {
    for (idx, item) in items.iter().enumerate() {
        let line = idx + 1;
        if item.service_id.trim().is_empty() {
            return Err(AppError::validation(format!("services[{line}]: service_id is required")).into());
        }
        if item.service_id.len() > MAX_SHORT_TEXT_LEN {
            return Err(AppError::validation(format!("services[{line}]: service_id is too long")).into());
        }
        if item.quantity == 0 || item.quantity > MAX_QUANTITY {
            return Err(AppError::validation(format!(
                "services[{line}]: quantity must be between 1 and {MAX_QUANTITY}"
            ))
            .into());
        }
        if item.weight_kg.is_some_and(|w| w <= rust_decimal::Decimal::ZERO) {
            return Err(AppError::validation(format!(
                "services[{line}]: weight_kg must be greater than zero"
            ))
            .into());
        }
        validate_optional_text(&item.special_instructions, "special_instructions", MAX_NOTE_LEN)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
