//! Analytics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Days;
use serde::Deserialize;

use crate::analytics::{self, AnalyticsReport, TimeRange};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::time::{day_end_millis, day_start_millis, local_date, now_millis, parse_date};
use crate::utils::{AppError, AppResult};
use shared::models::Capability;

/// 未指定 from 时回溯的天数
const DEFAULT_RANGE_DAYS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// YYYY-MM-DD (含)
    pub from: Option<String>,
    /// YYYY-MM-DD (含)，默认今天
    pub to: Option<String>,
}

/// GET /api/analytics?from=&to= - 经营报表
pub async fn report(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<AnalyticsReport>> {
    user.require(Capability::ViewAnalytics)?;
    let tz = state.config.timezone;

    let to_date = match &query.to {
        Some(to) => parse_date(to)?,
        None => local_date(now_millis(), tz),
    };
    let from_date = match &query.from {
        Some(from) => parse_date(from)?,
        None => to_date
            .checked_sub_days(Days::new(DEFAULT_RANGE_DAYS))
            .unwrap_or(to_date),
    };
    if from_date > to_date {
        return Err(AppError::validation("from must not be after to"));
    }

    let range = TimeRange {
        from: day_start_millis(from_date, tz),
        to: day_end_millis(to_date, tz),
    };
    let orders = state.orders.orders_with_items(range.from, range.to)?;
    let report = analytics::summarize(&orders, &state.config.service_areas, range);
    Ok(Json(report))
}
