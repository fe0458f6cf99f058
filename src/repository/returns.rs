//! Returns repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::ReturnType,
        return_record::{ReturnListRow, ReturnRecord, ReturnStats},
    },
};

/// Column values for a new return row.
#[derive(Debug, Clone)]
pub struct NewReturn {
    pub oracle_number: String,
    pub return_type: ReturnType,
    pub return_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub voucher_filename: Option<String>,
}

#[derive(Clone)]
pub struct ReturnsRepository {
    pool: Pool<Postgres>,
}

impl ReturnsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new return record
    pub async fn insert(&self, executor: impl PgExecutor<'_>, new: &NewReturn) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO return_records (
                oracle_number, return_type, return_date, reason, notes, voucher_filename
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&new.oracle_number)
        .bind(new.return_type)
        .bind(new.return_date)
        .bind(&new.reason)
        .bind(&new.notes)
        .bind(&new.voucher_filename)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    /// Get one return record by id
    pub async fn get_by_id(&self, id: i32) -> AppResult<ReturnRecord> {
        sqlx::query_as::<_, ReturnRecord>("SELECT * FROM return_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Return record with id {} not found", id)))
    }

    /// All return records joined with their assets, newest first
    pub async fn list(&self) -> AppResult<Vec<ReturnListRow>> {
        let rows = sqlx::query_as::<_, ReturnListRow>(
            r#"
            SELECT t.*, a.device_type, a.brand_name, a.model_name, a.serial_number
            FROM return_records t
            LEFT JOIN assets a ON a.oracle_number = t.oracle_number
            ORDER BY t.return_date DESC, t.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Return history for one asset, newest first
    pub async fn history_for(&self, oracle_number: &str) -> AppResult<Vec<ReturnRecord>> {
        let rows = sqlx::query_as::<_, ReturnRecord>(
            "SELECT * FROM return_records WHERE oracle_number = $1 ORDER BY return_date DESC, id DESC",
        )
        .bind(oracle_number)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Latest return record for one asset
    pub async fn latest_for(&self, oracle_number: &str) -> AppResult<Option<ReturnRecord>> {
        let row = sqlx::query_as::<_, ReturnRecord>(
            r#"
            SELECT * FROM return_records
            WHERE oracle_number = $1
            ORDER BY return_date DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(oracle_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Attach or replace the voucher file of a return record
    pub async fn set_voucher(&self, id: i32, voucher_filename: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE return_records SET voucher_filename = $1 WHERE id = $2")
            .bind(voucher_filename)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Return record with id {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Counts by disposition
    pub async fn stats(&self) -> AppResult<ReturnStats> {
        let row: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE return_type = 'damaged'),
                   COUNT(*) FILTER (WHERE return_type = 'buyback')
            FROM return_records
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(ReturnStats {
            total: row.0,
            damaged: row.1,
            buyback: row.2,
        })
    }

    /// Count buyback returns (dashboard)
    pub async fn count_buyback(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM return_records WHERE return_type = 'buyback'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
