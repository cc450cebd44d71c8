//! Service API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};
use shared::models::{Capability, Service, ServiceCreate, ServiceUpdate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 包含已停用的服务 (需要 ManageCatalog)
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/services - 服务列表 (默认仅启用)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Service>>> {
    let active_only = !(query.include_inactive && user.has(Capability::ManageCatalog));
    let services = state.catalog.list_services(active_only)?;
    Ok(Json(services))
}

/// GET /api/services/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Service>> {
    let service = state
        .catalog
        .get_service(&id)?
        .ok_or_else(|| AppError::not_found(format!("Service {}", id)))?;
    Ok(Json(service))
}

/// POST /api/services - 创建服务
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ServiceCreate>,
) -> AppResult<Json<Service>> {
    user.require(Capability::ManageCatalog)?;
    let service = state.catalog.create_service(payload, now_millis())?;

    audit_log!(user.id, "service_created", format!("service:{}", service.id), service.name);
    Ok(Json(service))
}

/// PUT /api/services/:id - 更新服务
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ServiceUpdate>,
) -> AppResult<Json<Service>> {
    user.require(Capability::ManageCatalog)?;
    let service = state.catalog.update_service(&id, payload, now_millis())?;

    audit_log!(user.id, "service_updated", format!("service:{}", service.id));
    Ok(Json(service))
}
