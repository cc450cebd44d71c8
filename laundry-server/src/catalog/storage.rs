//! redb-backed catalog storage
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `services` | `service_id` | `Service` |
//! | `time_slots` | `slot_id` | `TimeSlot` |
//! | `users` | `user_id` | `User` |

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveTime;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::{
    Role, Service, ServiceCreate, ServiceUpdate, TimeSlot, TimeSlotCreate, User, UserUpdate,
};

use super::{CatalogError, CatalogResult};
use crate::db::{StorageResult, open_database};

const SERVICES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("services");
const TIME_SLOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("time_slots");
const USERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Catalog storage (services, time slots, user profiles)
#[derive(Clone)]
pub struct CatalogStorage {
    db: Arc<Database>,
}

impl CatalogStorage {
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::init(open_database(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(crate::db::in_memory_database()?)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SERVICES_TABLE)?;
            let _ = write_txn.open_table(TIME_SLOTS_TABLE)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    // ========== Services ==========

    pub fn create_service(&self, create: ServiceCreate, now: i64) -> CatalogResult<Service> {
        validate_prices(create.base_price, create.price_per_kg, create.price_per_item)?;
        if create.name.trim().is_empty() {
            return Err(CatalogError::Validation("name must not be empty".into()));
        }

        let service = Service {
            id: uuid::Uuid::new_v4().to_string(),
            name: create.name.trim().to_string(),
            service_type: create.service_type,
            description: create.description,
            base_price: create.base_price,
            price_per_kg: create.price_per_kg,
            price_per_item: create.price_per_item,
            is_active: create.is_active,
            coverage_areas: create.coverage_areas,
            estimated_hours: create.estimated_hours,
            created_at: now,
            updated_at: now,
        };

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SERVICES_TABLE)?;
            let value = serde_json::to_vec(&service)?;
            table.insert(service.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(service)
    }

    pub fn update_service(
        &self,
        id: &str,
        update: ServiceUpdate,
        now: i64,
    ) -> CatalogResult<Service> {
        let txn = self.db.begin_write()?;
        let service = {
            let mut table = txn.open_table(SERVICES_TABLE)?;
            let existing = match table.get(id)? {
                Some(value) => serde_json::from_slice::<Service>(value.value())?,
                None => return Err(CatalogError::ServiceNotFound(id.to_string())),
            };

            let mut service = existing;
            if let Some(name) = update.name {
                if name.trim().is_empty() {
                    return Err(CatalogError::Validation("name must not be empty".into()));
                }
                service.name = name.trim().to_string();
            }
            if let Some(service_type) = update.service_type {
                service.service_type = service_type;
            }
            if update.description.is_some() {
                service.description = update.description;
            }
            if let Some(base_price) = update.base_price {
                service.base_price = base_price;
            }
            if update.price_per_kg.is_some() {
                service.price_per_kg = update.price_per_kg;
            }
            if update.price_per_item.is_some() {
                service.price_per_item = update.price_per_item;
            }
            if let Some(is_active) = update.is_active {
                service.is_active = is_active;
            }
            if let Some(areas) = update.coverage_areas {
                service.coverage_areas = areas;
            }
            if update.estimated_hours.is_some() {
                service.estimated_hours = update.estimated_hours;
            }
            validate_prices(service.base_price, service.price_per_kg, service.price_per_item)?;
            service.updated_at = now;

            let value = serde_json::to_vec(&service)?;
            table.insert(id, value.as_slice())?;
            service
        };
        txn.commit()?;
        Ok(service)
    }

    pub fn get_service(&self, id: &str) -> CatalogResult<Option<Service>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SERVICES_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// List services sorted by name
    pub fn list_services(&self, active_only: bool) -> CatalogResult<Vec<Service>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SERVICES_TABLE)?;

        let mut services = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let service: Service = serde_json::from_slice(value.value())?;
            if !active_only || service.is_active {
                services.push(service);
            }
        }
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    // ========== Time slots ==========

    pub fn create_time_slot(&self, create: TimeSlotCreate) -> CatalogResult<TimeSlot> {
        if chrono::NaiveDate::parse_from_str(&create.date, "%Y-%m-%d").is_err() {
            return Err(CatalogError::Validation(format!(
                "Invalid date: {} (expected YYYY-MM-DD)",
                create.date
            )));
        }
        let start = parse_hhmm(&create.start_time)?;
        let end = parse_hhmm(&create.end_time)?;
        if start >= end {
            return Err(CatalogError::Validation(
                "start_time must be before end_time".into(),
            ));
        }
        if create.max_orders == 0 {
            return Err(CatalogError::Validation("max_orders must be at least 1".into()));
        }

        let slot = TimeSlot {
            id: uuid::Uuid::new_v4().to_string(),
            date: create.date,
            start_time: start.format("%H:%M").to_string(),
            end_time: end.format("%H:%M").to_string(),
            max_orders: create.max_orders,
            booked_orders: 0,
            is_active: true,
        };

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(TIME_SLOTS_TABLE)?;
            let value = serde_json::to_vec(&slot)?;
            table.insert(slot.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(slot)
    }

    /// List time slots (optionally for one date), sorted by date then start time
    pub fn list_time_slots(&self, date: Option<&str>) -> CatalogResult<Vec<TimeSlot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TIME_SLOTS_TABLE)?;

        let mut slots = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let slot: TimeSlot = serde_json::from_slice(value.value())?;
            if date.is_none_or(|d| slot.date == d) {
                slots.push(slot);
            }
        }
        slots.sort_by(|a, b| (&a.date, &a.start_time).cmp(&(&b.date, &b.start_time)));
        Ok(slots)
    }

    /// Book one order into a slot. Fails when the slot is full or inactive.
    pub fn reserve_slot(&self, id: &str) -> CatalogResult<TimeSlot> {
        self.update_slot(id, |slot| {
            if !slot.is_active {
                return Err(CatalogError::TimeSlotInactive(slot.id.clone()));
            }
            if slot.is_full() {
                return Err(CatalogError::TimeSlotFull(slot.id.clone()));
            }
            slot.booked_orders += 1;
            Ok(())
        })
    }

    /// Release one booking; never goes below zero.
    pub fn release_slot(&self, id: &str) -> CatalogResult<TimeSlot> {
        self.update_slot(id, |slot| {
            slot.booked_orders = slot.booked_orders.saturating_sub(1);
            Ok(())
        })
    }

    fn update_slot<F>(&self, id: &str, apply: F) -> CatalogResult<TimeSlot>
    where
        F: FnOnce(&mut TimeSlot) -> CatalogResult<()>,
    {
        let txn = self.db.begin_write()?;
        let slot = {
            let mut table = txn.open_table(TIME_SLOTS_TABLE)?;
            let mut slot: TimeSlot = match table.get(id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(CatalogError::TimeSlotNotFound(id.to_string())),
            };
            apply(&mut slot)?;
            let value = serde_json::to_vec(&slot)?;
            table.insert(id, value.as_slice())?;
            slot
        };
        txn.commit()?;
        Ok(slot)
    }

    // ========== Users ==========

    pub fn get_user(&self, id: &str) -> CatalogResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Create or update a profile.
    ///
    /// A new profile takes `initial_role` (from the token); an existing
    /// profile keeps its stored role.
    pub fn upsert_profile(
        &self,
        id: &str,
        update: UserUpdate,
        initial_role: Role,
        now: i64,
    ) -> CatalogResult<User> {
        let txn = self.db.begin_write()?;
        let user = {
            let mut table = txn.open_table(USERS_TABLE)?;
            let existing: Option<User> = match table.get(id)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };

            let mut user = match existing {
                Some(user) => user,
                None => User {
                    id: id.to_string(),
                    full_name: String::new(),
                    email: String::new(),
                    phone: None,
                    role: initial_role,
                    default_address: None,
                    created_at: now,
                    updated_at: now,
                },
            };
            if let Some(full_name) = update.full_name {
                user.full_name = full_name.trim().to_string();
            }
            if let Some(email) = update.email {
                user.email = email.trim().to_string();
            }
            if update.phone.is_some() {
                user.phone = update.phone;
            }
            if update.default_address.is_some() {
                user.default_address = update.default_address;
            }
            user.updated_at = now;

            let value = serde_json::to_vec(&user)?;
            table.insert(id, value.as_slice())?;
            user
        };
        txn.commit()?;
        Ok(user)
    }

    pub fn set_role(&self, id: &str, role: Role, now: i64) -> CatalogResult<User> {
        let txn = self.db.begin_write()?;
        let user = {
            let mut table = txn.open_table(USERS_TABLE)?;
            let mut user: User = match table.get(id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(CatalogError::UserNotFound(id.to_string())),
            };
            user.role = role;
            user.updated_at = now;
            let value = serde_json::to_vec(&user)?;
            table.insert(id, value.as_slice())?;
            user
        };
        txn.commit()?;
        Ok(user)
    }

    /// List all users sorted by creation time
    pub fn list_users(&self) -> CatalogResult<Vec<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;

        let mut users = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            users.push(serde_json::from_slice::<User>(value.value())?);
        }
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }
}

fn validate_prices(
    base_price: i64,
    price_per_kg: Option<i64>,
    price_per_item: Option<i64>,
) -> CatalogResult<()> {
    if base_price < 0 {
        return Err(CatalogError::InvalidPrice("base_price must not be negative".into()));
    }
    if price_per_kg.is_some_and(|p| p < 0) {
        return Err(CatalogError::InvalidPrice("price_per_kg must not be negative".into()));
    }
    if price_per_item.is_some_and(|p| p < 0) {
        return Err(CatalogError::InvalidPrice("price_per_item must not be negative".into()));
    }
    Ok(())
}

fn parse_hhmm(value: &str) -> CatalogResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| CatalogError::Validation(format!("Invalid time: {value} (expected HH:MM)")))
}
