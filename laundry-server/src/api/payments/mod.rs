//! Payment gateway API 模块
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/payments/callback | GET | 登录用户 (本人 / RecordPayments) |
//! | /api/payments/webhook | POST | 无，校验 `x-paystack-signature` |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/callback", get(handler::callback))
        .route("/webhook", post(handler::webhook))
}
