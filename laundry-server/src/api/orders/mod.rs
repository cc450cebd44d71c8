//! Order API 模块
//!
//! | 路径 | 方法 | 能力 |
//! |------|------|------|
//! | /api/orders | POST | PlaceOrders |
//! | /api/orders | GET | 本人订单 / ViewAllOrders |
//! | /api/orders/{id} | GET | 本人 / ViewAllOrders |
//! | /api/orders/number/{order_number} | GET | 本人 / ViewAllOrders |
//! | /api/orders/{id}/history | GET | 本人 / ViewAllOrders |
//! | /api/orders/{id}/status | POST | UpdateOrderStatus (顾客可取消自己的待处理订单) |
//! | /api/orders/{id}/payment/initialize | POST | 本人 / RecordPayments |
//! | /api/orders/{id}/payment/verify | POST | 本人 / RecordPayments |
//! | /api/orders/{id}/payment/manual | POST | RecordPayments |
//! | /api/orders/{id}/payment/refund | POST | RefundPayments |
//! | /api/orders/{id}/notify | POST | SendNotifications |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/number/{order_number}", get(handler::get_by_number))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/history", get(handler::history))
        .route("/{id}/status", post(handler::transition))
        .route("/{id}/payment/initialize", post(handler::initialize_payment))
        .route("/{id}/payment/verify", post(handler::verify_payment))
        .route("/{id}/payment/manual", post(handler::record_manual_payment))
        .route("/{id}/payment/refund", post(handler::refund))
        .route("/{id}/notify", post(handler::notify))
}
