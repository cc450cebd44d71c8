//! Order number generation
//!
//! `PREFIX + YY + MM + DD + last6(epoch millis)`; the date is taken in the
//! business timezone. Uniqueness is enforced by the manager through the
//! `order_numbers` index (collision → advance one millisecond).

use chrono::TimeZone;
use chrono_tz::Tz;

/// Format an order number for the given instant
pub fn format_order_number(prefix: &str, millis: i64, tz: Tz) -> String {
    let date = tz
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%y%m%d").to_string())
        .unwrap_or_else(|| "000000".to_string());
    format!("{}{}{:06}", prefix, date, millis.rem_euclid(1_000_000))
}
