//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] / [`ApiResponse`] - 统一错误与响应结构 (from shared::error)
//! - [`logger`] - 日志初始化、审计/安全日志宏
//! - [`time`] - 业务时区转换
//! - [`validation`] - 输入校验

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
