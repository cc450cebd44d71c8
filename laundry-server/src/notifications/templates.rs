//! 订单状态消息模板

use shared::order::OrderStatus;

/// Values substituted into a template
#[derive(Debug, Clone)]
pub struct TemplateContext<'a> {
    pub customer_name: &'a str,
    pub order_number: &'a str,
    /// kobo
    pub amount: i64,
    pub business_phone: &'a str,
    pub business_hours: &'a str,
}

/// Statuses that have a customer-facing message
pub const NOTIFIABLE: [OrderStatus; 6] = [
    OrderStatus::Confirmed,
    OrderStatus::PickedUp,
    OrderStatus::InProgress,
    OrderStatus::Ready,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
];

/// Render the message for `status`; `None` when the status has no template
pub fn render(status: OrderStatus, ctx: &TemplateContext<'_>) -> Option<String> {
    let name = if ctx.customer_name.trim().is_empty() {
        "there"
    } else {
        ctx.customer_name.trim()
    };
    let order = ctx.order_number;
    let amount = format_naira(ctx.amount);
    let footer = format!(
        "Questions? Call us on {} ({}).",
        ctx.business_phone, ctx.business_hours
    );

    let body = match status {
        OrderStatus::Pending => return None,
        OrderStatus::Confirmed => format!(
            "Hi {name}, your laundry order {order} is confirmed. Total: {amount}. \
             We will be at your pickup address at the scheduled time."
        ),
        OrderStatus::PickedUp => format!(
            "Hi {name}, we have picked up your items for order {order}. \
             We will let you know when they are being cleaned."
        ),
        OrderStatus::InProgress => format!(
            "Hi {name}, your order {order} is now being processed."
        ),
        OrderStatus::Ready => format!(
            "Hi {name}, good news! Your order {order} is ready. Amount: {amount}."
        ),
        OrderStatus::Delivered => format!(
            "Hi {name}, your order {order} has been delivered. Thank you for choosing us!"
        ),
        OrderStatus::Cancelled => format!(
            "Hi {name}, your order {order} has been cancelled."
        ),
    };
    Some(format!("{body}\n\n{footer}"))
}

/// `300000` kobo → `₦3,000.00`
pub fn format_naira(kobo: i64) -> String {
    let sign = if kobo < 0 { "-" } else { "" };
    let kobo = kobo.unsigned_abs();
    let naira = (kobo / 100).to_string();
    let mut grouped = String::with_capacity(naira.len() + naira.len() / 3);
    for (i, ch) in naira.chars().enumerate() {
        if i > 0 && (naira.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}₦{grouped}.{:02}", kobo % 100)
}
