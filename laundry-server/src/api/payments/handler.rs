//! Payment API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::payments::ReconcileOutcome;
use crate::payments::webhook::SIGNATURE_HEADER;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub reference: Option<String>,
    pub trxref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// GET /api/payments/callback?reference=&trxref= - 网关回跳
pub async fn callback(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Json<ReconcileOutcome>> {
    let outcome = state
        .payments
        .handle_callback(query.reference.as_deref(), query.trxref.as_deref(), &user)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/payments/webhook - Paystack 事件推送
///
/// 签名校验失败返回错误；签名通过后总是确认接收，对账失败只记录日志，
/// 由后台对账任务继续重试。
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let event = state.payments.parse_webhook(signature, &body)?;

    match state.payments.handle_webhook_event(&event).await {
        Ok(Some(outcome)) => {
            tracing::info!(
                order_number = %outcome.order().order_number,
                settled = outcome.is_settled(),
                "Webhook reconciled"
            );
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(event = %event.event, error = %e, "Webhook reconciliation failed");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}
