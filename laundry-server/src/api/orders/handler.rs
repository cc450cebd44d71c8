//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{Page, PageQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::notifications::{NotificationReceipt, NotifyRequest};
use crate::orders::OrderFilter;
use crate::payments::{PaymentInitialization, ReconcileOutcome};
use crate::utils::AppResult;
use shared::models::Capability;
use shared::order::{
    CreateOrderRequest, ManualPaymentRequest, Order, OrderDetail, OrderStatus, RefundRequest,
    StatusChange, TransitionRequest,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// POST /api/orders - 下单
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderDetail>> {
    user.require(Capability::PlaceOrders)?;
    let detail = state.orders.create_order(&user.id, payload)?;
    Ok(Json(detail))
}

/// GET /api/orders - 订单列表 (新→旧)
///
/// 无 ViewAllOrders 的用户只能看到自己的订单。
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Order>>> {
    let customer_id = if user.has(Capability::ViewAllOrders) {
        query.customer_id
    } else {
        if let Some(requested) = &query.customer_id {
            user.require_owner_or(requested, Capability::ViewAllOrders)?;
        }
        Some(user.id.clone())
    };

    let filter = OrderFilter {
        status: query.status,
        customer_id,
        ..Default::default()
    };
    let (offset, limit) = PageQuery {
        offset: query.offset,
        limit: query.limit,
    }
    .resolve();

    let page = state.orders.list_orders(&filter, offset, limit)?;
    Ok(Json(Page {
        items: page.orders,
        total: page.total,
        offset,
        limit,
    }))
}

/// GET /api/orders/:id - 订单详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.get_detail(&id)?;
    user.require_owner_or(&detail.order.customer_id, Capability::ViewAllOrders)?;
    Ok(Json(detail))
}

/// GET /api/orders/number/:order_number
pub async fn get_by_number(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_number): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.get_by_number(&order_number)?;
    user.require_owner_or(&detail.order.customer_id, Capability::ViewAllOrders)?;
    Ok(Json(detail))
}

/// GET /api/orders/:id/history - 状态历史 (时间顺序)
pub async fn history(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<StatusChange>>> {
    let order = state.orders.get_order(&id)?;
    user.require_owner_or(&order.customer_id, Capability::ViewAllOrders)?;
    Ok(Json(state.orders.history(&id)?))
}

/// POST /api/orders/:id/status - 状态流转
pub async fn transition(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.transition(&id, payload, &user)?;
    Ok(Json(detail))
}

// ========== Payments ==========

/// POST /api/orders/:id/payment/initialize - 创建网关支付
pub async fn initialize_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<PaymentInitialization>> {
    let init = state.payments.initialize_payment(&id, &user).await?;
    Ok(Json(init))
}

/// POST /api/orders/:id/payment/verify - 手动重试对账
pub async fn verify_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ReconcileOutcome>> {
    let outcome = state.payments.verify_order(&id, &user).await?;
    Ok(Json(outcome))
}

/// POST /api/orders/:id/payment/manual - 记录线下付款
pub async fn record_manual_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ManualPaymentRequest>,
) -> AppResult<Json<Order>> {
    let order = state.payments.record_manual_payment(&id, payload, &user)?;
    Ok(Json(order))
}

/// POST /api/orders/:id/payment/refund - 标记退款
pub async fn refund(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<RefundRequest>>,
) -> AppResult<Json<Order>> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let order = state.payments.refund(&id, request, &user)?;
    Ok(Json(order))
}

// ========== Notifications ==========

/// POST /api/orders/:id/notify - 发送状态通知
pub async fn notify(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<NotifyRequest>>,
) -> AppResult<Json<NotificationReceipt>> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let receipt = state.notifier.notify_order(&id, request, &user).await?;
    Ok(Json(receipt))
}
