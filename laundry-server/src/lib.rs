//! Laundry Server - 拉各斯洗衣取送服务后端
//!
//! # 架构概述
//!
//! - **订单** (`orders`): 下单计价、订单号、状态机、支付记录 (redb)
//! - **支付** (`payments`): Paystack 初始化、回调/webhook/后台对账
//! - **目录** (`catalog`): 服务、取件时间段、用户档案
//! - **分析** (`analytics`): 营收、完成率、客户与区域统计
//! - **通知** (`notifications`): 订单状态消息模板与发送
//! - **认证** (`auth`): 托管平台签发的 JWT 校验 + 角色能力
//! - **HTTP API** (`api`): axum 路由和处理器
//!
//! # 模块结构
//!
//! ```text
//! laundry-server/src/
//! ├── core/           # 配置、状态、错误、后台任务
//! ├── auth/           # JWT 校验、权限
//! ├── api/            # HTTP 路由和处理器
//! ├── db/             # redb 公共层
//! ├── catalog/        # 服务 / 时间段 / 用户
//! ├── orders/         # 订单管理
//! ├── payments/       # 支付网关与对账
//! ├── analytics/      # 报表
//! ├── notifications/  # 消息通知
//! └── utils/          # 日志、时间、校验
//! ```

pub mod analytics;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::{OrderStorage, OrdersManager};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger};

/// 创建工作目录并初始化日志
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    config.ensure_work_dir_structure()?;
    init_logger(
        &config.log_level,
        config.log_json,
        Some(config.log_dir().as_path()),
    )
}
