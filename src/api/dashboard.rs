//! Dashboard and audit-trail endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::activity::ActivityLog, AppState};

use super::AuthenticatedUser;

/// Fleet counters shown on the dashboard
#[derive(Serialize, ToSchema)]
pub struct DashboardStats {
    /// All registered assets
    pub total_assets: i64,
    /// Assets in an employee's custody (damaged ones excluded)
    pub assigned: i64,
    /// Everything not assigned, including damaged and under repair
    pub unassigned: i64,
    /// Ready to hand out: in stock, no custody, no open repair
    pub available: i64,
    /// Open repairs (the same source the derived status uses)
    pub under_repair: i64,
    /// Under repair while in nobody's custody
    pub under_repair_not_assigned: i64,
    /// Assets in status damaged
    pub damaged: i64,
    /// Assets in status auctioned
    pub auctioned: i64,
    /// Buyback return records
    pub buyback_count: i64,
    /// available + under_repair_not_assigned
    pub stock_count: i64,
}

/// Activity feed query
#[derive(Deserialize, IntoParams)]
pub struct ActivityQuery {
    /// Number of entries to return (default 10)
    pub limit: Option<i64>,
}

/// Dashboard statistics
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Fleet counters", body = DashboardStats)
    )
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.dashboard.stats().await?;
    Ok(Json(stats))
}

/// Recent activity entries
#[utoipa::path(
    get,
    path = "/activity-logs",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(ActivityQuery),
    responses(
        (status = 200, description = "Audit entries, newest first", body = Vec<ActivityLog>)
    )
)]
pub async fn activity_logs(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<ActivityLog>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let logs = state.services.dashboard.recent_activities(limit).await?;
    Ok(Json(logs))
}
