//! Time Slot API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::time::parse_date;
use shared::models::{Capability, TimeSlot, TimeSlotCreate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// YYYY-MM-DD
    pub date: Option<String>,
}

/// GET /api/time-slots?date=
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<TimeSlot>>> {
    if let Some(date) = &query.date {
        parse_date(date)?;
    }
    let slots = state.catalog.list_time_slots(query.date.as_deref())?;
    Ok(Json(slots))
}

/// POST /api/time-slots
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<TimeSlotCreate>,
) -> AppResult<Json<TimeSlot>> {
    user.require(Capability::ManageCatalog)?;
    let slot = state.catalog.create_time_slot(payload)?;
    tracing::info!(slot_id = %slot.id, date = %slot.date, "Time slot created");
    Ok(Json(slot))
}

/// POST /api/time-slots/:id/reserve - 占用一个名额
pub async fn reserve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<TimeSlot>> {
    user.require(Capability::PlaceOrders)?;
    let slot = state.catalog.reserve_slot(&id)?;
    Ok(Json(slot))
}

/// POST /api/time-slots/:id/release - 释放一个名额
pub async fn release(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<TimeSlot>> {
    user.require(Capability::ManageCatalog)?;
    let slot = state.catalog.release_slot(&id)?;
    Ok(Json(slot))
}
