//! Role → capability mapping
//!
//! 单一用户实体 + 角色标签，能力由角色推导：
//! - customer: 下单、查看/取消自己的订单
//! - staff: 处理订单状态、记录线下付款、维护服务与时段、发送通知
//! - owner: 全部能力 (含退款、用户管理、数据分析)

use shared::models::{Capability, Role};

const CUSTOMER_CAPABILITIES: &[Capability] = &[Capability::PlaceOrders];

const STAFF_CAPABILITIES: &[Capability] = &[
    Capability::PlaceOrders,
    Capability::ViewAllOrders,
    Capability::UpdateOrderStatus,
    Capability::RecordPayments,
    Capability::SendNotifications,
    Capability::ManageCatalog,
];

const OWNER_CAPABILITIES: &[Capability] = &[
    Capability::PlaceOrders,
    Capability::ViewAllOrders,
    Capability::UpdateOrderStatus,
    Capability::RecordPayments,
    Capability::RefundPayments,
    Capability::ManageCatalog,
    Capability::ManageUsers,
    Capability::ViewAnalytics,
    Capability::SendNotifications,
];

/// Capabilities granted to a role
pub fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Customer => CUSTOMER_CAPABILITIES,
        Role::Staff => STAFF_CAPABILITIES,
        Role::Owner => OWNER_CAPABILITIES,
    }
}

/// Check whether a role grants a capability
pub fn role_has(role: Role, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}
