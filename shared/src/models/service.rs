//! Service Model (洗衣服务目录)

use serde::{Deserialize, Serialize};

/// 服务类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    WashAndFold,
    WashAndIron,
    DryCleaning,
    Ironing,
    SpecialCare,
}

/// Catalog entry. All prices in kobo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub service_type: ServiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub base_price: i64,
    /// 按公斤加价（叠加在 base_price 上）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_kg: Option<i64>,
    /// 按件定价（覆盖其他计价）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_item: Option<i64>,
    pub is_active: bool,
    #[serde(default)]
    pub coverage_areas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<u32>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create service payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCreate {
    pub name: String,
    pub service_type: ServiceType,
    pub description: Option<String>,
    pub base_price: i64,
    pub price_per_kg: Option<i64>,
    pub price_per_item: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub coverage_areas: Vec<String>,
    pub estimated_hours: Option<u32>,
}

fn default_active() -> bool {
    true
}

/// Update service payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub service_type: Option<ServiceType>,
    pub description: Option<String>,
    pub base_price: Option<i64>,
    pub price_per_kg: Option<i64>,
    pub price_per_item: Option<i64>,
    pub is_active: Option<bool>,
    pub coverage_areas: Option<Vec<String>>,
    pub estimated_hours: Option<u32>,
}
