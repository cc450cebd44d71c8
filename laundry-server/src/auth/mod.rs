//! 认证授权模块
//!
//! 会话由托管认证平台签发，本服务只负责校验：
//! - [`JwtService`] - HS256 JWT 校验 (以及测试/开发用签发)
//! - [`CurrentUser`] - 当前用户上下文 (axum extractor)
//! - [`permissions`] - 角色 → 能力映射

pub mod extractor;
pub mod jwt;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use permissions::{capabilities, role_has};
