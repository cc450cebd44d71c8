//! User API Handlers
//!
//! 首次访问 `/me` 时以令牌中的 email/name/role 建档，
//! 之后角色只能由 owner 通过 `/{id}/role` 修改。

use axum::{
    Json,
    extract::{Path, State},
};

use crate::audit_log;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_address, validate_email, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Capability, RoleUpdate, User, UserUpdate};

/// GET /api/users/me - 当前用户档案
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<User>> {
    if let Some(profile) = state.catalog.get_user(&user.id)? {
        return Ok(Json(profile));
    }

    let seed = UserUpdate {
        full_name: user.name.clone(),
        email: user.email.clone(),
        ..Default::default()
    };
    let profile = state
        .catalog
        .upsert_profile(&user.id, seed, user.role, now_millis())?;
    tracing::info!(user_id = %user.id, role = %profile.role, "User profile created");
    Ok(Json(profile))
}

/// PUT /api/users/me - 更新当前用户档案
pub async fn update_me(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(mut payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    if let Some(full_name) = &payload.full_name {
        validate_required_text(full_name, "full_name", MAX_NAME_LEN)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email.trim())?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    if let Some(address) = &payload.default_address {
        payload.default_address = Some(validate_address(address, "default_address")?);
    }

    let profile = state
        .catalog
        .upsert_profile(&user.id, payload, user.role, now_millis())?;
    Ok(Json(profile))
}

/// GET /api/users - 所有用户 (ManageUsers)
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<User>>> {
    user.require(Capability::ManageUsers)?;
    Ok(Json(state.catalog.list_users()?))
}

/// PUT /api/users/:id/role - 修改角色 (ManageUsers)
pub async fn set_role(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<User>> {
    user.require(Capability::ManageUsers)?;
    if id == user.id && payload.role != user.role {
        return Err(AppError::validation("Cannot change your own role"));
    }

    let updated = state.catalog.set_role(&id, payload.role, now_millis())?;
    audit_log!(user.id, "role_changed", format!("user:{}", id), payload.role);
    Ok(Json(updated))
}
