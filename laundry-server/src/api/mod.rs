//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`services`] - 洗衣服务目录
//! - [`time_slots`] - 取件时间段
//! - [`users`] - 用户档案与角色
//! - [`orders`] - 订单、支付、通知
//! - [`payments`] - 支付回调与 webhook
//! - [`analytics`] - 经营分析

pub mod analytics;
pub mod health;
pub mod orders;
pub mod payments;
pub mod services;
pub mod time_slots;
pub mod users;

use std::time::Duration;

use axum::Router;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// 默认分页大小
pub const DEFAULT_PAGE_LIMIT: usize = 20;
/// 分页上限
pub const MAX_PAGE_LIMIT: usize = 100;

/// 构建完整的 axum 应用
pub fn build_app(state: ServerState) -> Router {
    let request_timeout = Duration::from_millis(state.config.request_timeout_ms);

    Router::new()
        .merge(health::router())
        .merge(services::router())
        .merge(time_slots::router())
        .merge(users::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(analytics::router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 分页查询参数 (offset-based)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    /// (offset, limit)，limit 取值 1..=100
    pub fn resolve(&self) -> (usize, usize) {
        let offset = self.offset.unwrap_or(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        (offset, limit)
    }
}

/// 分页响应
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        assert_eq!(PageQuery::default().resolve(), (0, 20));
    }

    #[test]
    fn test_page_limit_clamped() {
        let query = PageQuery {
            offset: Some(40),
            limit: Some(500),
        };
        assert_eq!(query.resolve(), (40, 100));

        let query = PageQuery {
            offset: None,
            limit: Some(0),
        };
        assert_eq!(query.resolve(), (0, 1));
    }
}
