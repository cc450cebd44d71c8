use thiserror::Error;

use crate::db::StorageError;
use crate::notifications::NotifyError;
use crate::payments::PaymentError;

/// 启动与运行期错误 (HTTP 请求错误统一使用 `AppError`)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("支付网关初始化失败: {0}")]
    Payment(#[from] PaymentError),

    #[error("消息服务初始化失败: {0}")]
    Notify(#[from] NotifyError),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
