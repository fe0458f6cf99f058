//! Activity log repository (append-only audit trail)

use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::AppResult,
    models::{activity::ActivityLog, enums::ActivityType},
};

/// Snapshot fields captured with every audit entry.
#[derive(Debug, Clone, Default)]
pub struct ActivityEntry {
    pub oracle_number: Option<String>,
    pub asset_type: Option<String>,
    pub brand_name: Option<String>,
    pub asset_name: Option<String>,
    pub employee_name: Option<String>,
    pub department_name: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Clone)]
pub struct ActivityRepository {
    pool: Pool<Postgres>,
}

impl ActivityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append one audit entry. Runs on the operation's transaction so the
    /// entry commits or rolls back together with the lifecycle change.
    pub async fn record(
        &self,
        executor: impl PgExecutor<'_>,
        activity_type: ActivityType,
        entry: &ActivityEntry,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (
                activity_type, oracle_number, asset_type, brand_name,
                asset_name, employee_name, department_name, remarks
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(activity_type.as_str())
        .bind(&entry.oracle_number)
        .bind(&entry.asset_type)
        .bind(&entry.brand_name)
        .bind(&entry.asset_name)
        .bind(&entry.employee_name)
        .bind(&entry.department_name)
        .bind(&entry.remarks)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Most recent entries, newest first
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<ActivityLog>> {
        let rows = sqlx::query_as::<_, ActivityLog>(
            "SELECT * FROM activity_logs ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
