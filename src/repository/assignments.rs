//! Assignments repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        assignment::{Assignment, AssignmentListRow},
        enums::AssignmentStatus,
    },
};

/// Column values for a new assignment row (dates already resolved).
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub oracle_number: String,
    pub employee_name: String,
    pub designation: String,
    pub department: String,
    pub assignment_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub allocation_voucher_path: Option<String>,
}

#[derive(Clone)]
pub struct AssignmentsRepository {
    pool: Pool<Postgres>,
}

impl AssignmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Whether an active assignment exists for the oracle number
    pub async fn active_exists(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assignments WHERE oracle_number = $1 AND status = 'assigned')",
        )
        .bind(oracle_number)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    /// Get the active assignment for an asset, if any
    pub async fn get_active(&self, oracle_number: &str) -> AppResult<Option<Assignment>> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE oracle_number = $1 AND status = 'assigned'",
        )
        .bind(oracle_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(assignment)
    }

    /// Insert a new active assignment
    pub async fn insert(
        &self,
        executor: impl PgExecutor<'_>,
        new: &NewAssignment,
    ) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO assignments (
                oracle_number, employee_name, designation, department,
                assignment_date, expected_return_date, status, notes,
                allocation_voucher_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'assigned', $7, $8)
            RETURNING id
            "#,
        )
        .bind(&new.oracle_number)
        .bind(&new.employee_name)
        .bind(&new.designation)
        .bind(&new.department)
        .bind(new.assignment_date)
        .bind(new.expected_return_date)
        .bind(&new.notes)
        .bind(&new.allocation_voucher_path)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    /// Close the active assignment to a terminal status, stamping the actual
    /// return date. No-op when no active row exists.
    pub async fn close_active(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
        status: AssignmentStatus,
        actual_return_date: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE assignments
            SET status = $1, actual_return_date = $2
            WHERE oracle_number = $3 AND status = 'assigned'
            "#,
        )
        .bind(status)
        .bind(actual_return_date)
        .bind(oracle_number)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// List active assignments joined with their assets
    pub async fn list_active(&self) -> AppResult<Vec<AssignmentListRow>> {
        let rows = sqlx::query_as::<_, AssignmentListRow>(
            r#"
            SELECT g.id, g.oracle_number, g.employee_name, g.designation, g.department,
                   g.assignment_date, g.expected_return_date, g.actual_return_date,
                   g.status, g.notes, g.allocation_voucher_path,
                   a.device_type, a.brand_name, a.model_name, a.serial_number,
                   a.status AS asset_status,
                   EXISTS(
                       SELECT 1 FROM open_repairs r
                       WHERE r.oracle_number = g.oracle_number
                   ) AS has_open_repair
            FROM assignments g
            LEFT JOIN assets a ON a.oracle_number = g.oracle_number
            WHERE g.status = 'assigned'
            ORDER BY g.assignment_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Assignment history for one asset, newest first
    pub async fn history_for(&self, oracle_number: &str) -> AppResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE oracle_number = $1 ORDER BY assignment_date DESC",
        )
        .bind(oracle_number)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count active assignments
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM assignments WHERE status = 'assigned'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
