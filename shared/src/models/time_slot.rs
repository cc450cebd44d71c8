//! Time Slot Model

use serde::{Deserialize, Serialize};

/// Capacity-limited pickup window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub start_time: String,
    /// HH:MM
    pub end_time: String,
    pub max_orders: u32,
    pub booked_orders: u32,
    pub is_active: bool,
}

impl TimeSlot {
    pub fn is_full(&self) -> bool {
        self.booked_orders >= self.max_orders
    }

    pub fn remaining(&self) -> u32 {
        self.max_orders.saturating_sub(self.booked_orders)
    }
}

/// Create time slot payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlotCreate {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub max_orders: u32,
}
