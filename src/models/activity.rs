//! Activity log model (append-only audit trail)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One audit-trail entry. Written as a side effect of every
/// lifecycle-changing operation, inside the same transaction; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ActivityLog {
    pub id: i32,
    pub activity_type: String,
    pub oracle_number: Option<String>,
    pub asset_type: Option<String>,
    pub brand_name: Option<String>,
    pub asset_name: Option<String>,
    pub employee_name: Option<String>,
    pub department_name: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}
