//! Analytics aggregation for the owner dashboard
//!
//! Pure, in-memory computation over orders created in `[from, to)`.
//! Recomputed from scratch on every request.

use std::collections::HashMap;

use serde::Serialize;
use shared::order::{Order, OrderItem, OrderStatus};

/// Area name used when no configured area matches
pub const OTHER_AREA: &str = "Other";

/// Customers listed in the spend ranking
pub const TOP_CUSTOMERS_LIMIT: usize = 10;

/// Half-open time range (Unix millis)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    pub fn contains(&self, millis: i64) -> bool {
        millis >= self.from && millis < self.to
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevenueSummary {
    /// Σ amount_paid of paid orders
    pub total_revenue: i64,
    /// Σ final_amount of non-cancelled orders
    pub gross_order_value: i64,
    /// gross_order_value / non-cancelled orders
    pub average_order_value: i64,
    pub paid_orders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSpend {
    pub customer_id: String,
    pub total_spent: i64,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaSummary {
    pub area: String,
    pub order_count: usize,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePopularity {
    pub service_id: String,
    pub service_name: String,
    pub quantity: u64,
    pub revenue: i64,
}

/// Dashboard report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub range: TimeRange,
    pub total_orders: usize,
    pub revenue: RevenueSummary,
    /// delivered / (orders - cancelled)
    pub completion_rate: f64,
    pub status_counts: Vec<StatusCount>,
    pub top_customers: Vec<CustomerSpend>,
    pub areas: Vec<AreaSummary>,
    pub services: Vec<ServicePopularity>,
}

/// Build the report
///
/// `orders` may contain orders outside `range`; they are ignored.
pub fn summarize(
    orders: &[(Order, Vec<OrderItem>)],
    areas: &[String],
    range: TimeRange,
) -> AnalyticsReport {
    let in_range: Vec<&(Order, Vec<OrderItem>)> = orders
        .iter()
        .filter(|(order, _)| range.contains(order.created_at))
        .collect();

    let mut revenue = RevenueSummary::default();
    let mut status_counts: HashMap<OrderStatus, usize> = HashMap::new();
    let mut customers: HashMap<&str, CustomerSpend> = HashMap::new();
    let mut area_totals: Vec<AreaSummary> = areas
        .iter()
        .map(|area| AreaSummary {
            area: area.clone(),
            order_count: 0,
            revenue: 0,
        })
        .collect();
    let mut other_area = AreaSummary {
        area: OTHER_AREA.to_string(),
        order_count: 0,
        revenue: 0,
    };
    let mut services: HashMap<&str, ServicePopularity> = HashMap::new();
    let mut active_orders = 0usize;

    for (order, items) in &in_range {
        *status_counts.entry(order.status).or_default() += 1;
        let cancelled = order.status == OrderStatus::Cancelled;
        let paid = if order.is_paid() { order.amount_paid } else { 0 };

        if order.is_paid() {
            revenue.total_revenue += order.amount_paid;
            revenue.paid_orders += 1;
        }
        if !cancelled {
            active_orders += 1;
            revenue.gross_order_value += order.final_amount;
        }

        let customer = customers
            .entry(order.customer_id.as_str())
            .or_insert_with(|| CustomerSpend {
                customer_id: order.customer_id.clone(),
                total_spent: 0,
                order_count: 0,
            });
        customer.total_spent += paid;
        customer.order_count += 1;

        let area = match match_area(&order.address_text(), areas) {
            Some(idx) => &mut area_totals[idx],
            None => &mut other_area,
        };
        area.order_count += 1;
        area.revenue += paid;

        if cancelled {
            continue;
        }
        for item in items {
            let entry = services
                .entry(item.service_id.as_str())
                .or_insert_with(|| ServicePopularity {
                    service_id: item.service_id.clone(),
                    service_name: item.service_name.clone(),
                    quantity: 0,
                    revenue: 0,
                });
            entry.quantity += u64::from(item.quantity);
            entry.revenue += item.total_price;
        }
    }

    if active_orders > 0 {
        revenue.average_order_value = revenue.gross_order_value / active_orders as i64;
    }

    let delivered = status_counts
        .get(&OrderStatus::Delivered)
        .copied()
        .unwrap_or(0);
    let completion_rate = if active_orders == 0 {
        0.0
    } else {
        delivered as f64 / active_orders as f64
    };

    let status_counts = OrderStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: status_counts.get(status).copied().unwrap_or(0),
        })
        .collect();

    let mut top_customers: Vec<CustomerSpend> = customers.into_values().collect();
    top_customers.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then(b.order_count.cmp(&a.order_count))
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    top_customers.truncate(TOP_CUSTOMERS_LIMIT);

    area_totals.push(other_area);

    let mut services: Vec<ServicePopularity> = services.into_values().collect();
    services.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then(b.revenue.cmp(&a.revenue))
            .then_with(|| a.service_name.cmp(&b.service_name))
    });

    AnalyticsReport {
        range,
        total_orders: in_range.len(),
        revenue,
        completion_rate,
        status_counts,
        top_customers,
        areas: area_totals,
        services,
    }
}

/// First configured area whose name appears in the address (case-insensitive)
fn match_area(address: &str, areas: &[String]) -> Option<usize> {
    if address.is_empty() {
        return None;
    }
    let address = address.to_lowercase();
    areas.iter().position(|area| {
        let area = area.trim().to_lowercase();
        !area.is_empty() && address.contains(&area)
    })
}
