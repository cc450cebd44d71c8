//! JWT 令牌服务
//!
//! 校验托管认证平台签发的 HS256 令牌；签发接口保留给测试与本地开发。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::models::{Capability, Role};
use thiserror::Error;

use crate::auth::permissions::role_has;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 共享密钥 (至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟)，仅用于本地签发
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
    /// 密钥是否为临时生成 (未设置 JWT_SECRET)
    pub ephemeral: bool,
}

impl JwtConfig {
    /// 从环境变量加载
    ///
    /// `JWT_SECRET` 缺失时生成临时密钥 (仅开发可用，生产环境由 `Config::validate` 拒绝)。
    pub fn from_env() -> Self {
        let (secret, ephemeral) = match std::env::var("JWT_SECRET") {
            Ok(secret) => (secret, false),
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, generating ephemeral key for development");
                (generate_printable_secret(), true)
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "laundry-auth".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "laundry-server".to_string()),
            ephemeral,
        }
    }

    /// 固定密钥配置 (测试用)
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: 60,
            issuer: "laundry-auth".to_string(),
            audience: "laundry-server".to_string(),
            ephemeral: false,
        }
    }

    pub fn validate(&self) -> Result<(), JwtError> {
        if self.secret.len() < 32 {
            return Err(JwtError::ConfigError(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        Ok(())
    }
}

/// 令牌中携带的 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 角色 (customer | staff | owner)；缺省视为 customer
    #[serde(default)]
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::ExpiredToken => AppError::token_expired(),
            JwtError::InvalidToken(_) | JwtError::InvalidSignature => {
                AppError::invalid_token("Invalid token")
            }
            JwtError::GenerationFailed(msg) => AppError::internal(msg),
            JwtError::ConfigError(msg) => AppError::config(msg),
        }
    }
}

/// 生成可打印的随机密钥 (开发环境)
pub fn generate_printable_secret() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    if rng.fill(&mut bytes).is_err() {
        // SystemRandom 失败时退回 rand
        use rand::RngCore;
        rand::thread_rng().fill_bytes(&mut bytes);
    }
    bytes
        .iter()
        .map(|b| CHARSET[*b as usize % CHARSET.len()] as char)
        .collect()
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 签发令牌 (测试与本地开发)
    pub fn generate_token(
        &self,
        user_id: &str,
        email: Option<&str>,
        name: Option<&str>,
        role: Role,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
            role,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

/// 当前用户上下文
///
/// 由 extractor 从 JWT 解析；若已有本地档案，角色以档案为准。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    pub fn has(&self, capability: Capability) -> bool {
        role_has(self.role, capability)
    }

    /// 要求指定能力，否则返回 PermissionDenied
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.has(capability) {
            return Ok(());
        }
        security_log!(
            WARN,
            "permission_denied",
            user_id = %self.id,
            role = %self.role,
            capability = ?capability
        );
        Err(AppError::with_message(
            ErrorCode::PermissionDenied,
            format!("Missing capability: {:?}", capability),
        ))
    }

    /// 订单归属检查：本人或拥有 ViewAllOrders
    pub fn require_owner_or(
        &self,
        owner_id: &str,
        capability: Capability,
    ) -> Result<(), AppError> {
        if self.id == owner_id || self.has(capability) {
            return Ok(());
        }
        security_log!(
            WARN,
            "not_order_owner",
            user_id = %self.id,
            owner_id = %owner_id
        );
        Err(AppError::new(ErrorCode::NotOrderOwner))
    }
}
