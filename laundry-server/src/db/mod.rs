//! redb 存储公共部分
//!
//! 两个数据库文件：
//! - `orders.redb` - 订单、明细、状态历史、支付索引 ([`crate::orders::OrderStorage`])
//! - `catalog.redb` - 服务、时段、用户档案 ([`crate::catalog::CatalogStorage`])
//!
//! 值统一以 JSON 序列化存储。

use redb::Database;
use std::path::Path;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// 为模块错误类型实现 redb/serde_json 错误的 `From`，统一包装为 `Self::Storage`
macro_rules! impl_from_storage_errors {
    ($target:ty) => {
        impl_from_storage_errors!(
            @each $target,
            redb::DatabaseError,
            redb::TransactionError,
            redb::TableError,
            redb::StorageError,
            redb::CommitError,
            serde_json::Error
        );
    };
    (@each $target:ty, $($source:ty),+) => {
        $(
            impl From<$source> for $target {
                fn from(err: $source) -> Self {
                    Self::Storage($crate::db::StorageError::from(err))
                }
            }
        )+
    };
}

pub(crate) use impl_from_storage_errors;

/// Open or create a database file
///
/// redb commits with `Durability::Immediate` by default: a commit is persistent
/// as soon as `commit()` returns.
pub fn open_database(path: impl AsRef<Path>) -> StorageResult<Database> {
    Ok(Database::create(path)?)
}

/// In-memory database (tests)
#[cfg(test)]
pub fn in_memory_database() -> StorageResult<Database> {
    Ok(Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?)
}
