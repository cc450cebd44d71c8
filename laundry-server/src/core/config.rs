use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;
use crate::payments::paystack::DEFAULT_BASE_URL;
use crate::utils::time::parse_timezone;

/// 默认服务区域 (拉各斯)
const DEFAULT_SERVICE_AREAS: &str =
    "Lekki,Victoria Island,Ikoyi,Ajah,Ikeja,Yaba,Surulere,Gbagada,Maryland,Magodo";

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (`.env` 由 dotenv 加载)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | JSON 格式日志 |
/// | BUSINESS_TIMEZONE | Africa/Lagos | 业务时区 (订单号日期、统计区间) |
/// | BUSINESS_PHONE | - | 通知中的联系电话 |
/// | BUSINESS_HOURS | Mon-Sat 8am-6pm | 通知中的营业时间 |
/// | ORDER_NUMBER_PREFIX | LD | 订单号前缀 |
/// | SERVICE_AREAS | Lekki,Victoria Island,... | 统计分区 (逗号分隔) |
/// | PAYSTACK_SECRET_KEY | - | Paystack 密钥 (未设置则禁用在线支付) |
/// | PAYSTACK_BASE_URL | https://api.paystack.co | Paystack API 地址 |
/// | PAYSTACK_CALLBACK_URL | - | 支付完成后的回跳地址 |
/// | RECONCILE_INTERVAL_SECS | 5 | 自动对账间隔 (秒) |
/// | RECONCILE_MAX_ATTEMPTS | 10 | 每个支付引用的自动对账次数 |
/// | MESSAGING_API_URL | - | 消息 API 地址 |
/// | MESSAGING_ACCESS_TOKEN | - | 消息 API 令牌 |
/// | MESSAGING_PHONE_NUMBER_ID | - | 发送方号码 ID |
/// | REQUEST_TIMEOUT_MS | 30000 | 外部请求超时 (毫秒) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 后台任务关闭超时 (毫秒) |
/// | JWT_SECRET / JWT_ISSUER / JWT_AUDIENCE | - | 令牌校验 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/var/lib/laundry HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,

    // === 业务配置 ===
    pub timezone: Tz,
    pub business_phone: String,
    pub business_hours: String,
    pub order_number_prefix: String,
    pub service_areas: Vec<String>,

    // === 支付 ===
    pub paystack: PaystackConfig,
    pub reconcile_interval_secs: u64,
    pub reconcile_max_attempts: u32,

    // === 通知 ===
    pub messaging: MessagingConfig,

    /// 外部请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

#[derive(Clone, Default)]
pub struct PaystackConfig {
    pub secret_key: Option<String>,
    pub base_url: String,
    pub callback_url: Option<String>,
}

impl std::fmt::Debug for PaystackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct MessagingConfig {
    pub api_url: Option<String>,
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
}

impl MessagingConfig {
    /// All three settings present
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.api_url.as_deref()?,
            self.access_token.as_deref()?,
            self.phone_number_id.as_deref()?,
        ))
    }
}

impl std::fmt::Debug for MessagingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingConfig")
            .field("api_url", &self.api_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("phone_number_id", &self.phone_number_id)
            .finish()
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Comma-separated list, blanks dropped
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let timezone = match env_opt("BUSINESS_TIMEZONE") {
            Some(name) => parse_timezone(&name).unwrap_or_else(|| {
                tracing::warn!(timezone = %name, "Unknown BUSINESS_TIMEZONE, using Africa/Lagos");
                chrono_tz::Africa::Lagos
            }),
            None => chrono_tz::Africa::Lagos,
        };

        Self {
            work_dir: env_opt("WORK_DIR").unwrap_or_else(|| "./data".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: env_opt("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            log_level: env_opt("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: env_or("LOG_JSON", false),

            timezone,
            business_phone: env_opt("BUSINESS_PHONE").unwrap_or_default(),
            business_hours: env_opt("BUSINESS_HOURS")
                .unwrap_or_else(|| "Mon-Sat 8am-6pm".into()),
            order_number_prefix: env_opt("ORDER_NUMBER_PREFIX").unwrap_or_else(|| "LD".into()),
            service_areas: parse_list(
                &env_opt("SERVICE_AREAS").unwrap_or_else(|| DEFAULT_SERVICE_AREAS.into()),
            ),

            paystack: PaystackConfig {
                secret_key: env_opt("PAYSTACK_SECRET_KEY"),
                base_url: env_opt("PAYSTACK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
                callback_url: env_opt("PAYSTACK_CALLBACK_URL"),
            },
            reconcile_interval_secs: env_or("RECONCILE_INTERVAL_SECS", 5),
            reconcile_max_attempts: env_or("RECONCILE_MAX_ATTEMPTS", 10),

            messaging: MessagingConfig {
                api_url: env_opt("MESSAGING_API_URL"),
                access_token: env_opt("MESSAGING_ACCESS_TOKEN"),
                phone_number_id: env_opt("MESSAGING_PHONE_NUMBER_ID"),
            },

            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10_000),
            jwt: JwtConfig::from_env(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 启动前校验
    pub fn validate(&self) -> Result<(), ServerError> {
        self.jwt
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        if self.is_production() && self.jwt.ephemeral {
            return Err(ServerError::Config(
                "JWT_SECRET must be set in production".into(),
            ));
        }
        let prefix = &self.order_number_prefix;
        if prefix.is_empty() || prefix.len() > 8 || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ServerError::Config(format!(
                "ORDER_NUMBER_PREFIX must be 1-8 ASCII letters or digits, got {prefix:?}"
            )));
        }
        if self.reconcile_interval_secs == 0 || self.reconcile_max_attempts == 0 {
            return Err(ServerError::Config(
                "RECONCILE_INTERVAL_SECS and RECONCILE_MAX_ATTEMPTS must be positive".into(),
            ));
        }
        if self.paystack.secret_key.is_none() {
            tracing::warn!("PAYSTACK_SECRET_KEY not set, online payments disabled");
        }
        if self.messaging.credentials().is_none() {
            tracing::info!("Messaging not configured, notifications disabled");
        }
        Ok(())
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn orders_db_path(&self) -> PathBuf {
        self.database_dir().join("orders.redb")
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.database_dir().join("catalog.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
