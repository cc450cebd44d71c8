//! PaymentReconciler - drives orders from gateway verification results
//!
//! ```text
//! initialize_payment(order, actor)
//!     ├─ owner / RecordPayments check, order payable
//!     ├─ reference = "{order_number}-{8 hex}"
//!     ├─ gateway.initialize(final_amount)
//!     └─ one txn: reference on order + reference index + pending marker
//!
//! reconcile(reference)
//!     ├─ already paid with this reference → AlreadyPaid (no gateway call)
//!     ├─ gateway.verify(reference)
//!     ├─ success → confirm_payment (paid + pending→confirmed + marker removed)
//!     └─ otherwise → NotConfirmed, order and marker untouched
//! ```

use std::sync::Arc;

use serde::Serialize;
use shared::models::Capability;
use shared::order::{
    ManualPaymentRequest, Order, PaymentMethod, PaymentStatus, RefundRequest, SYSTEM_ACTOR,
};

use super::gateway::{GatewayStatus, InitializeTransaction, PaymentGateway};
use super::webhook::{self, WebhookEvent};
use super::{PaymentError, PaymentResult};
use crate::auth::CurrentUser;
use crate::catalog::CatalogStorage;
use crate::orders::manager::ensure_payable;
use crate::orders::{OrderError, OrdersManager, PaymentConfirmation, PaymentRecord};
use crate::security_log;
use crate::utils::AppError;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text};

/// Result of starting an online payment
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInitialization {
    pub order_id: String,
    pub order_number: String,
    pub reference: String,
    /// kobo
    pub amount: i64,
    pub authorization_url: String,
    pub access_code: String,
}

/// Result of a reconciliation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Payment written and order confirmed
    Confirmed { order: Order },
    /// Reference had already been applied; nothing written
    AlreadyPaid { order: Order },
    /// Gateway did not report success; client may retry verification
    NotConfirmed {
        gateway_status: GatewayStatus,
        order: Order,
    },
}

impl ReconcileOutcome {
    pub fn order(&self) -> &Order {
        match self {
            Self::Confirmed { order }
            | Self::AlreadyPaid { order }
            | Self::NotConfirmed { order, .. } => order,
        }
    }

    /// Whether the order is settled (no further retries needed)
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::NotConfirmed { .. })
    }
}

pub struct PaymentReconciler {
    orders: Arc<OrdersManager>,
    catalog: CatalogStorage,
    gateway: Option<Arc<dyn PaymentGateway>>,
    /// Paystack secret key (webhook HMAC key)
    webhook_secret: Option<String>,
    callback_url: Option<String>,
}

impl std::fmt::Debug for PaymentReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentReconciler")
            .field("gateway", &self.gateway.is_some())
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

impl PaymentReconciler {
    pub fn new(
        orders: Arc<OrdersManager>,
        catalog: CatalogStorage,
        gateway: Option<Arc<dyn PaymentGateway>>,
        webhook_secret: Option<String>,
        callback_url: Option<String>,
    ) -> Self {
        Self {
            orders,
            catalog,
            gateway,
            webhook_secret,
            callback_url,
        }
    }

    pub fn orders(&self) -> &Arc<OrdersManager> {
        &self.orders
    }

    pub fn is_configured(&self) -> bool {
        self.gateway.is_some()
    }

    fn gateway(&self) -> PaymentResult<&Arc<dyn PaymentGateway>> {
        self.gateway.as_ref().ok_or(PaymentError::NotConfigured)
    }

    // ========== Online payments ==========

    pub async fn initialize_payment(
        &self,
        order_id: &str,
        actor: &CurrentUser,
    ) -> PaymentResult<PaymentInitialization> {
        let gateway = self.gateway()?;
        let order = self.orders.get_order(order_id)?;
        actor.require_owner_or(&order.customer_id, Capability::RecordPayments)?;
        ensure_payable(&order)?;
        if order.final_amount <= 0 {
            return Err(AppError::validation("Order has nothing to pay").into());
        }

        let email = self.customer_email(&order, actor)?;
        let reference = generate_reference(&order.order_number);

        let checkout = gateway
            .initialize(InitializeTransaction {
                email,
                amount: order.final_amount,
                reference: reference.clone(),
                callback_url: self.callback_url.clone(),
                metadata: serde_json::json!({
                    "order_id": order.id,
                    "order_number": order.order_number,
                }),
            })
            .await?;

        let order = self
            .orders
            .attach_payment_reference(&order.id, &reference, now_millis())?;

        Ok(PaymentInitialization {
            order_id: order.id,
            order_number: order.order_number,
            reference,
            amount: order.final_amount,
            authorization_url: checkout.authorization_url,
            access_code: checkout.access_code,
        })
    }

    /// Stored profile email, falling back to the session claims
    fn customer_email(&self, order: &Order, actor: &CurrentUser) -> PaymentResult<String> {
        if let Some(profile) = self.catalog.get_user(&order.customer_id)?
            && !profile.email.trim().is_empty()
        {
            return Ok(profile.email);
        }
        if actor.id == order.customer_id
            && let Some(email) = actor.email.as_ref().filter(|e| !e.trim().is_empty())
        {
            return Ok(email.clone());
        }
        Err(AppError::validation("Customer email is required to start an online payment").into())
    }

    /// Verify `reference` with the gateway and apply the result
    pub async fn reconcile(&self, reference: &str, actor_id: &str) -> PaymentResult<ReconcileOutcome> {
        if reference.trim().is_empty() {
            return Err(PaymentError::ReferenceMissing);
        }
        let order = self
            .orders
            .get_by_reference(reference)?
            .ok_or_else(|| PaymentError::ReferenceNotFound(reference.to_string()))?;

        if order.payment_status == PaymentStatus::Paid
            && order.payment_reference.as_deref() == Some(reference)
        {
            return Ok(ReconcileOutcome::AlreadyPaid { order });
        }

        let verification = self.gateway()?.verify(reference).await?;
        if verification.reference != reference {
            return Err(PaymentError::InvalidResponse(format!(
                "verification returned reference {} for {reference}",
                verification.reference
            )));
        }

        if !verification.status.is_success() {
            tracing::info!(
                order_number = %order.order_number,
                reference = %reference,
                gateway_status = %verification.status,
                "Payment not confirmed by gateway"
            );
            return Ok(ReconcileOutcome::NotConfirmed {
                gateway_status: verification.status,
                order,
            });
        }

        let record = PaymentRecord {
            reference: Some(reference.to_string()),
            amount: verification.amount,
            method: PaymentMethod::Online,
            notes: verification
                .channel
                .as_ref()
                .map(|channel| format!("Payment received via online ({channel})")),
        };
        match self
            .orders
            .confirm_payment(&order.id, record, actor_id, now_millis())?
        {
            PaymentConfirmation::Confirmed(order) => {
                tracing::info!(
                    order_number = %order.order_number,
                    reference = %reference,
                    amount = verification.amount,
                    "Payment confirmed"
                );
                Ok(ReconcileOutcome::Confirmed { order })
            }
            PaymentConfirmation::AlreadyPaid(order) => Ok(ReconcileOutcome::AlreadyPaid { order }),
        }
    }

    /// Manual "retry verification" for an order's stored reference
    pub async fn verify_order(
        &self,
        order_id: &str,
        actor: &CurrentUser,
    ) -> PaymentResult<ReconcileOutcome> {
        let order = self.orders.get_order(order_id)?;
        actor.require_owner_or(&order.customer_id, Capability::RecordPayments)?;
        let reference = order
            .payment_reference
            .clone()
            .ok_or(PaymentError::ReferenceMissing)?;

        self.orders
            .storage()
            .reset_attempts(&reference)
            .map_err(OrderError::from)?;
        self.reconcile(&reference, &actor.id).await
    }

    /// Gateway return URL: `?reference=` or `?trxref=`
    pub async fn handle_callback(
        &self,
        reference: Option<&str>,
        trxref: Option<&str>,
        actor: &CurrentUser,
    ) -> PaymentResult<ReconcileOutcome> {
        let reference = reference
            .into_iter()
            .chain(trxref)
            .map(str::trim)
            .find(|r| !r.is_empty())
            .ok_or(PaymentError::ReferenceMissing)?;
        if reference.len() > MAX_SHORT_TEXT_LEN {
            return Err(AppError::validation("reference is too long").into());
        }

        let order = self
            .orders
            .get_by_reference(reference)?
            .ok_or_else(|| PaymentError::ReferenceNotFound(reference.to_string()))?;
        actor.require_owner_or(&order.customer_id, Capability::RecordPayments)?;

        self.reconcile(reference, &actor.id).await
    }

    // ========== Webhook ==========

    /// Check signature and decode the event
    pub fn parse_webhook(&self, signature: Option<&str>, body: &[u8]) -> PaymentResult<WebhookEvent> {
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or(PaymentError::NotConfigured)?;
        let signature = signature.unwrap_or_default();

        if let Err(reason) = webhook::verify_signature(body, signature, secret) {
            security_log!(WARN, "webhook_signature_invalid", reason = reason);
            return Err(PaymentError::InvalidSignature);
        }

        serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Invalid webhook payload: {e}")).into())
    }

    /// Reconcile a verified webhook event; non-charge events are ignored
    pub async fn handle_webhook_event(
        &self,
        event: &WebhookEvent,
    ) -> PaymentResult<Option<ReconcileOutcome>> {
        if !event.is_charge_success() {
            tracing::debug!(event = %event.event, "Ignoring webhook event");
            return Ok(None);
        }
        let reference = event
            .data
            .reference
            .as_deref()
            .ok_or(PaymentError::ReferenceMissing)?;
        tracing::info!(reference = %reference, "Received Paystack charge.success");

        // 以网关查询结果为准，不信任 webhook 金额
        self.reconcile(reference, SYSTEM_ACTOR).await.map(Some)
    }

    // ========== Offline payments / refunds ==========

    /// Staff-recorded pos / transfer / cash payment
    pub fn record_manual_payment(
        &self,
        order_id: &str,
        request: ManualPaymentRequest,
        actor: &CurrentUser,
    ) -> PaymentResult<Order> {
        actor.require(Capability::RecordPayments)?;
        if !request.method.is_offline() {
            return Err(AppError::validation(
                "Online payments are confirmed through the payment gateway",
            )
            .into());
        }
        if request.amount <= 0 {
            return Err(AppError::validation("amount must be greater than zero").into());
        }
        validate_optional_text(&request.reference, "reference", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&request.notes, "notes", MAX_NOTE_LEN)?;

        let record = PaymentRecord {
            reference: request.reference,
            amount: request.amount,
            method: request.method,
            notes: request.notes,
        };
        let order = match self
            .orders
            .confirm_payment(order_id, record, &actor.id, now_millis())?
        {
            PaymentConfirmation::Confirmed(order) | PaymentConfirmation::AlreadyPaid(order) => order,
        };
        Ok(order)
    }

    /// Owner marks a paid order refunded (bookkeeping only)
    pub fn refund(
        &self,
        order_id: &str,
        request: RefundRequest,
        actor: &CurrentUser,
    ) -> PaymentResult<Order> {
        actor.require(Capability::RefundPayments)?;
        Ok(self
            .orders
            .mark_refunded(order_id, &actor.id, request.reason, now_millis())?)
    }
}

/// `"{order_number}-{8 hex}"`
fn generate_reference(order_number: &str) -> String {
    format!("{}-{:08x}", order_number, rand::random::<u32>())
}
