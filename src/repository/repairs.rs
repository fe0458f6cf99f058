//! Repairs repository: the open-repair table plus the completed history

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        enums::RepairOutcome,
        repair::{CompletedRepair, OpenRepair, RepairStats},
    },
};

/// Column values for a new open repair row.
#[derive(Debug, Clone)]
pub struct NewOpenRepair {
    pub oracle_number: String,
    pub asset_type: Option<String>,
    pub asset_model: Option<String>,
    pub repair_description: String,
    pub start_date: DateTime<Utc>,
    pub technician: Option<String>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
    pub vendor_name: Option<String>,
    pub employee_name: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub voucher_file: Option<String>,
}

#[derive(Clone)]
pub struct RepairsRepository {
    pool: Pool<Postgres>,
}

impl RepairsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Whether an open repair exists for the oracle number. This is the fact
    /// behind the derived "under repair" status.
    pub async fn open_exists(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM open_repairs WHERE oracle_number = $1)",
        )
        .bind(oracle_number)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    /// Get the open repair row for an asset, if any
    pub async fn get_open(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
    ) -> AppResult<Option<OpenRepair>> {
        let repair = sqlx::query_as::<_, OpenRepair>(
            "SELECT * FROM open_repairs WHERE oracle_number = $1",
        )
        .bind(oracle_number)
        .fetch_optional(executor)
        .await?;
        Ok(repair)
    }

    /// Insert a new open repair row
    pub async fn insert_open(
        &self,
        executor: impl PgExecutor<'_>,
        new: &NewOpenRepair,
    ) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO open_repairs (
                oracle_number, asset_type, asset_model, repair_description,
                start_date, technician, cost, notes, vendor_name,
                employee_name, department, designation, voucher_file
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&new.oracle_number)
        .bind(&new.asset_type)
        .bind(&new.asset_model)
        .bind(&new.repair_description)
        .bind(new.start_date)
        .bind(&new.technician)
        .bind(new.cost)
        .bind(&new.notes)
        .bind(&new.vendor_name)
        .bind(&new.employee_name)
        .bind(&new.department)
        .bind(&new.designation)
        .bind(&new.voucher_file)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    /// Copy an open row into the completed history. The caller deletes the
    /// open row in the same transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_completed(
        &self,
        executor: impl PgExecutor<'_>,
        open: &OpenRepair,
        completion_date: DateTime<Utc>,
        outcome: RepairOutcome,
        return_date: Option<DateTime<Utc>>,
        notes: Option<&str>,
        voucher_file: Option<&str>,
    ) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO completed_repairs (
                oracle_number, asset_type, asset_model, repair_description,
                start_date, technician, cost, notes, vendor_name,
                employee_name, department, designation,
                completion_date, outcome, return_date, voucher_file
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(&open.oracle_number)
        .bind(&open.asset_type)
        .bind(&open.asset_model)
        .bind(&open.repair_description)
        .bind(open.start_date)
        .bind(&open.technician)
        .bind(open.cost)
        .bind(notes.map(str::to_string).or_else(|| open.notes.clone()))
        .bind(&open.vendor_name)
        .bind(&open.employee_name)
        .bind(&open.department)
        .bind(&open.designation)
        .bind(completion_date)
        .bind(outcome)
        .bind(return_date)
        .bind(voucher_file.map(str::to_string).or_else(|| open.voucher_file.clone()))
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    /// Delete one open repair row by id
    pub async fn delete_open(&self, executor: impl PgExecutor<'_>, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM open_repairs WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Delete any open repair rows for an oracle number without keeping
    /// history (auction purge)
    pub async fn purge_open(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM open_repairs WHERE oracle_number = $1")
            .bind(oracle_number)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// All open repairs, newest first
    pub async fn list_open(&self) -> AppResult<Vec<OpenRepair>> {
        let rows =
            sqlx::query_as::<_, OpenRepair>("SELECT * FROM open_repairs ORDER BY start_date DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    /// All completed repairs, newest first
    pub async fn list_completed(&self) -> AppResult<Vec<CompletedRepair>> {
        let rows = sqlx::query_as::<_, CompletedRepair>(
            "SELECT * FROM completed_repairs ORDER BY completion_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Open and completed repairs for one asset
    pub async fn history_for(
        &self,
        oracle_number: &str,
    ) -> AppResult<(Option<OpenRepair>, Vec<CompletedRepair>)> {
        let open = self.get_open(&self.pool, oracle_number).await?;
        let completed = sqlx::query_as::<_, CompletedRepair>(
            "SELECT * FROM completed_repairs WHERE oracle_number = $1 ORDER BY completion_date DESC",
        )
        .bind(oracle_number)
        .fetch_all(&self.pool)
        .await?;
        Ok((open, completed))
    }

    /// Oracle numbers with an open repair
    pub async fn open_oracle_numbers(&self) -> AppResult<Vec<String>> {
        let numbers: Vec<String> =
            sqlx::query_scalar("SELECT oracle_number FROM open_repairs ORDER BY oracle_number")
                .fetch_all(&self.pool)
                .await?;
        Ok(numbers)
    }

    /// Count open repairs
    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM open_repairs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Aggregate counts and cost over both repair tables
    pub async fn stats(&self) -> AppResult<RepairStats> {
        let row: (i64, i64, Option<Decimal>) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM open_repairs),
                (SELECT COUNT(*) FROM completed_repairs),
                (SELECT COALESCE(SUM(cost), 0)
                 FROM (
                     SELECT cost FROM open_repairs
                     UNION ALL
                     SELECT cost FROM completed_repairs
                 ) c)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(RepairStats {
            in_progress: row.0,
            completed: row.1,
            total: row.0 + row.1,
            total_cost: row.2.unwrap_or_default(),
        })
    }
}
