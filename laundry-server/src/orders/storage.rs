//! redb-based order storage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Current order record |
//! | `order_items` | `(order_id, line_no)` | `OrderItem` | Line items (written once) |
//! | `status_history` | `(order_id, sequence)` | `StatusChange` | Append-only status log |
//! | `order_numbers` | `order_number` | `order_id` | Number uniqueness + lookup |
//! | `payment_references` | `reference` | `order_id` | Gateway reference lookup |
//! | `pending_reconciliation` | `reference` | `PendingReconciliation` | Durable verify queue |
//!
//! Every multi-record change goes through one `WriteTransaction`; the
//! `*_txn` methods take the caller's transaction.

use std::path::Path;
use std::sync::Arc;

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::{Deserialize, Serialize};
use shared::order::{Order, OrderItem, OrderStatus, StatusChange};

use crate::db::{StorageResult, open_database};

const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

const ORDER_ITEMS_TABLE: TableDefinition<(&str, u32), &[u8]> =
    TableDefinition::new("order_items");

const STATUS_HISTORY_TABLE: TableDefinition<(&str, u64), &[u8]> =
    TableDefinition::new("status_history");

const ORDER_NUMBERS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("order_numbers");

const PAYMENT_REFERENCES_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("payment_references");

const PENDING_RECONCILIATION_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("pending_reconciliation");

/// Payment awaiting gateway confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingReconciliation {
    pub reference: String,
    pub order_id: String,
    /// Automatic verification attempts so far
    pub attempts: u32,
    pub created_at: i64,
    pub last_checked_at: Option<i64>,
}

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::init(open_database(path)?)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(crate::db::in_memory_database()?)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDER_ITEMS_TABLE)?;
            let _ = write_txn.open_table(STATUS_HISTORY_TABLE)?;
            let _ = write_txn.open_table(ORDER_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(PAYMENT_REFERENCES_TABLE)?;
            let _ = write_txn.open_table(PENDING_RECONCILIATION_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Orders ==========

    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Read an order inside a write transaction (sees uncommitted writes)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        let order = match table.get(order_id)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(order)
    }

    /// All orders, newest first
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::with_capacity(table.len()? as usize);
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice::<Order>(value.value())?);
        }
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });
        Ok(orders)
    }

    pub fn count_orders(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        Ok(table.len()?)
    }

    // ========== Items ==========

    pub fn store_items(&self, txn: &WriteTransaction, items: &[OrderItem]) -> StorageResult<()> {
        let mut table = txn.open_table(ORDER_ITEMS_TABLE)?;
        for item in items {
            let value = serde_json::to_vec(item)?;
            table.insert((item.order_id.as_str(), item.line_no), value.as_slice())?;
        }
        Ok(())
    }

    /// Items of an order, by line number
    pub fn get_items(&self, order_id: &str) -> StorageResult<Vec<OrderItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_ITEMS_TABLE)?;

        let mut items = Vec::new();
        for result in table.range((order_id, 0u32)..=(order_id, u32::MAX))? {
            let (_key, value) = result?;
            items.push(serde_json::from_slice::<OrderItem>(value.value())?);
        }
        Ok(items)
    }

    // ========== Status history ==========

    /// Append a status change with the next dense sequence number.
    ///
    /// The sequence is derived from the last key inside `txn`, so two
    /// writers can never produce the same `(order_id, sequence)`.
    pub fn append_status(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
        status: OrderStatus,
        timestamp: i64,
        actor_id: &str,
        notes: Option<String>,
    ) -> StorageResult<StatusChange> {
        let mut table = txn.open_table(STATUS_HISTORY_TABLE)?;
        let last = match table.range((order_id, 0u64)..=(order_id, u64::MAX))?.next_back() {
            Some(result) => {
                let (key, _value) = result?;
                key.value().1
            }
            None => 0,
        };

        let change = StatusChange {
            order_id: order_id.to_string(),
            sequence: last + 1,
            status,
            timestamp,
            actor_id: actor_id.to_string(),
            notes,
        };
        let value = serde_json::to_vec(&change)?;
        table.insert((order_id, change.sequence), value.as_slice())?;
        Ok(change)
    }

    /// Status history of an order, by sequence
    pub fn get_history(&self, order_id: &str) -> StorageResult<Vec<StatusChange>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STATUS_HISTORY_TABLE)?;

        let mut history = Vec::new();
        for result in table.range((order_id, 0u64)..=(order_id, u64::MAX))? {
            let (_key, value) = result?;
            history.push(serde_json::from_slice::<StatusChange>(value.value())?);
        }
        Ok(history)
    }

    // ========== Order number index ==========

    pub fn order_number_exists_txn(
        &self,
        txn: &WriteTransaction,
        order_number: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(ORDER_NUMBERS_TABLE)?;
        Ok(table.get(order_number)?.is_some())
    }

    pub fn index_order_number(
        &self,
        txn: &WriteTransaction,
        order_number: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(ORDER_NUMBERS_TABLE)?;
        table.insert(order_number, order_id)?;
        Ok(())
    }

    pub fn find_by_number(&self, order_number: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_NUMBERS_TABLE)?;
        Ok(table.get(order_number)?.map(|v| v.value().to_string()))
    }

    // ========== Payment references ==========

    pub fn index_payment_reference(
        &self,
        txn: &WriteTransaction,
        reference: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PAYMENT_REFERENCES_TABLE)?;
        table.insert(reference, order_id)?;
        Ok(())
    }

    pub fn find_by_reference(&self, reference: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAYMENT_REFERENCES_TABLE)?;
        Ok(table.get(reference)?.map(|v| v.value().to_string()))
    }

    // ========== Pending reconciliation ==========

    pub fn put_pending(
        &self,
        txn: &WriteTransaction,
        pending: &PendingReconciliation,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PENDING_RECONCILIATION_TABLE)?;
        let value = serde_json::to_vec(pending)?;
        table.insert(pending.reference.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Remove a marker; returns whether one existed
    pub fn remove_pending(&self, txn: &WriteTransaction, reference: &str) -> StorageResult<bool> {
        let mut table = txn.open_table(PENDING_RECONCILIATION_TABLE)?;
        let removed = table.remove(reference)?.is_some();
        Ok(removed)
    }

    pub fn get_pending(&self, reference: &str) -> StorageResult<Option<PendingReconciliation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_RECONCILIATION_TABLE)?;
        match table.get(reference)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Pending markers, oldest first
    pub fn list_pending(&self) -> StorageResult<Vec<PendingReconciliation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_RECONCILIATION_TABLE)?;

        let mut pending = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            pending.push(serde_json::from_slice::<PendingReconciliation>(value.value())?);
        }
        pending.sort_by_key(|p| p.created_at);
        Ok(pending)
    }

    /// Record a verification attempt (only if the marker still exists)
    pub fn record_attempt(&self, reference: &str, now: i64) -> StorageResult<Option<u32>> {
        let txn = self.db.begin_write()?;
        let attempts = {
            let mut table = txn.open_table(PENDING_RECONCILIATION_TABLE)?;
            let existing: Option<PendingReconciliation> = match table.get(reference)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            match existing {
                Some(mut pending) => {
                    pending.attempts += 1;
                    pending.last_checked_at = Some(now);
                    let value = serde_json::to_vec(&pending)?;
                    table.insert(reference, value.as_slice())?;
                    Some(pending.attempts)
                }
                None => None,
            }
        };
        txn.commit()?;
        Ok(attempts)
    }

    /// Reset the attempt counter (manual retry path)
    pub fn reset_attempts(&self, reference: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let found = {
            let mut table = txn.open_table(PENDING_RECONCILIATION_TABLE)?;
            let existing: Option<PendingReconciliation> = match table.get(reference)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            match existing {
                Some(mut pending) => {
                    pending.attempts = 0;
                    let value = serde_json::to_vec(&pending)?;
                    table.insert(reference, value.as_slice())?;
                    true
                }
                None => false,
            }
        };
        txn.commit()?;
        Ok(found)
    }
}
