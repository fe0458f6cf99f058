//! Assets repository for database operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        asset::{Asset, AssetListRow, AssetQuery},
        enums::AssetStatus,
    },
};

#[derive(Clone)]
pub struct AssetsRepository {
    pool: Pool<Postgres>,
}

/// Custody fields stamped on the asset row when an assignment opens.
#[derive(Debug, Clone)]
pub struct CustodyFields {
    pub assigned_to: String,
    pub assignment_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
}

/// Column values for a new asset row (dates already resolved).
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub oracle_number: String,
    pub device_type: String,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub serial_number: Option<String>,
    pub unit_price: Option<Decimal>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub warranty_expiry: Option<DateTime<Utc>>,
    pub vendor_name: Option<String>,
    pub tender_no: Option<String>,
    pub notes: Option<String>,
}

impl AssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get asset by oracle number
    pub async fn get_by_oracle(&self, oracle_number: &str) -> AppResult<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE oracle_number = $1")
            .bind(oracle_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(asset)
    }

    /// Get asset by oracle number, row-locked for the current transaction.
    /// Every lifecycle operation reads through this so two concurrent
    /// transitions on the same asset serialize instead of both committing.
    pub async fn get_for_update(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
    ) -> AppResult<Option<Asset>> {
        let asset =
            sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE oracle_number = $1 FOR UPDATE")
                .bind(oracle_number)
                .fetch_optional(executor)
                .await?;
        Ok(asset)
    }

    /// Create a new asset with status `new`
    pub async fn create(&self, executor: impl PgExecutor<'_>, new: &NewAsset) -> AppResult<Asset> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (
                oracle_number, device_type, brand_name, model_name, serial_number,
                unit_price, purchase_date, warranty_expiry, vendor_name, tender_no,
                notes, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'new')
            RETURNING *
            "#,
        )
        .bind(&new.oracle_number)
        .bind(&new.device_type)
        .bind(&new.brand_name)
        .bind(&new.model_name)
        .bind(&new.serial_number)
        .bind(new.unit_price)
        .bind(new.purchase_date)
        .bind(new.warranty_expiry)
        .bind(&new.vendor_name)
        .bind(&new.tender_no)
        .bind(&new.notes)
        .fetch_one(executor)
        .await?;
        Ok(asset)
    }

    /// List assets with the joined facts derived views need. Status/view
    /// filters are applied by the service on the derived status.
    pub async fn list(&self, query: &AssetQuery) -> AppResult<Vec<AssetListRow>> {
        let rows = sqlx::query_as::<_, AssetListRow>(
            r#"
            SELECT a.*,
                   EXISTS(
                       SELECT 1 FROM open_repairs r
                       WHERE r.oracle_number = a.oracle_number
                   ) AS has_open_repair,
                   g.employee_name AS current_holder
            FROM assets a
            LEFT JOIN assignments g
              ON g.oracle_number = a.oracle_number AND g.status = 'assigned'
            WHERE ($1::text IS NULL OR a.device_type = $1)
              AND ($2::text IS NULL OR a.brand_name = $2)
              AND ($3::text IS NULL OR a.oracle_number ILIKE '%' || $3 || '%')
              AND ($4::text IS NULL
                   OR a.oracle_number ILIKE '%' || $4 || '%'
                   OR a.brand_name ILIKE '%' || $4 || '%'
                   OR a.model_name ILIKE '%' || $4 || '%'
                   OR a.serial_number ILIKE '%' || $4 || '%')
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(&query.device_type)
        .bind(&query.brand_name)
        .bind(&query.oracle_number)
        .bind(&query.search)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// One asset with the same joined facts as `list`
    pub async fn get_overview_row(&self, oracle_number: &str) -> AppResult<Option<AssetListRow>> {
        let row = sqlx::query_as::<_, AssetListRow>(
            r#"
            SELECT a.*,
                   EXISTS(
                       SELECT 1 FROM open_repairs r
                       WHERE r.oracle_number = a.oracle_number
                   ) AS has_open_repair,
                   g.employee_name AS current_holder
            FROM assets a
            LEFT JOIN assignments g
              ON g.oracle_number = a.oracle_number AND g.status = 'assigned'
            WHERE a.oracle_number = $1
            "#,
        )
        .bind(oracle_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Check whether an oracle number is already taken
    pub async fn oracle_exists(&self, oracle_number: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM assets WHERE oracle_number = $1)")
                .bind(oracle_number)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Check whether a serial number is already taken
    pub async fn serial_exists(&self, serial_number: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM assets WHERE serial_number = $1)")
                .bind(serial_number)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Oracle numbers eligible for assignment for one device type: in stock,
    /// no custody, no open repair, never auctioned.
    pub async fn available_for_assignment(&self, device_type: &str) -> AppResult<Vec<String>> {
        let numbers: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT a.oracle_number
            FROM assets a
            WHERE a.device_type = $1
              AND a.status IN ('new', 'used')
              AND NOT EXISTS(
                  SELECT 1 FROM assignments g
                  WHERE g.oracle_number = a.oracle_number AND g.status = 'assigned'
              )
              AND NOT EXISTS(
                  SELECT 1 FROM open_repairs r WHERE r.oracle_number = a.oracle_number
              )
              AND NOT EXISTS(
                  SELECT 1 FROM auctions x WHERE x.oracle_number = a.oracle_number
              )
            ORDER BY a.oracle_number
            "#,
        )
        .bind(device_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(numbers)
    }

    /// Oracle numbers currently in custody
    pub async fn assigned_oracle_numbers(&self) -> AppResult<Vec<String>> {
        let numbers: Vec<String> = sqlx::query_scalar(
            "SELECT oracle_number FROM assignments WHERE status = 'assigned' ORDER BY oracle_number",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(numbers)
    }

    /// Device types: the seeded catalogue plus anything discovered on assets
    pub async fn device_types(&self) -> AppResult<Vec<String>> {
        let types: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT device_type FROM device_brand_mappings
            UNION
            SELECT DISTINCT device_type FROM assets
            ORDER BY 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(types)
    }

    /// Brand list for one device type
    pub async fn brands_for(&self, device_type: &str) -> AppResult<Option<Vec<String>>> {
        let brands: Option<sqlx::types::Json<Vec<String>>> = sqlx::query_scalar(
            "SELECT brands FROM device_brand_mappings WHERE device_type = $1",
        )
        .bind(device_type)
        .fetch_optional(&self.pool)
        .await?;
        Ok(brands.map(|b| b.0))
    }

    /// Brand names actually seen on assets of one device type
    pub async fn asset_brands_for(&self, device_type: &str) -> AppResult<Vec<String>> {
        let brands: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT brand_name FROM assets
            WHERE device_type = $1 AND brand_name IS NOT NULL AND brand_name != ''
            "#,
        )
        .bind(device_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(brands)
    }

    /// Add a brand to a device type's list, creating the mapping if needed
    pub async fn add_brand(&self, device_type: &str, brand_name: &str) -> AppResult<Vec<String>> {
        let mut brands = self.brands_for(device_type).await?.unwrap_or_default();
        if !brands.iter().any(|b| b.eq_ignore_ascii_case(brand_name)) {
            brands.push(brand_name.to_string());
            brands.sort();
        }
        sqlx::query(
            r#"
            INSERT INTO device_brand_mappings (device_type, brands)
            VALUES ($1, $2)
            ON CONFLICT (device_type) DO UPDATE SET brands = EXCLUDED.brands
            "#,
        )
        .bind(device_type)
        .bind(sqlx::types::Json(&brands))
        .execute(&self.pool)
        .await?;
        Ok(brands)
    }

    /// Update the stored status
    pub async fn set_status(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
        status: AssetStatus,
    ) -> AppResult<()> {
        sqlx::query("UPDATE assets SET status = $1, updated_at = NOW() WHERE oracle_number = $2")
            .bind(status)
            .bind(oracle_number)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Stamp custody fields when an assignment opens
    pub async fn set_custody(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
        custody: &CustodyFields,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE assets
            SET assigned_to = $1, assignment_date = $2, expected_return_date = $3,
                updated_at = NOW()
            WHERE oracle_number = $4
            "#,
        )
        .bind(&custody.assigned_to)
        .bind(custody.assignment_date)
        .bind(custody.expected_return_date)
        .bind(oracle_number)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Clear custody fields when the asset leaves an employee's hands
    pub async fn clear_custody(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE assets
            SET assigned_to = NULL, assignment_date = NULL, expected_return_date = NULL,
                updated_at = NOW()
            WHERE oracle_number = $1
            "#,
        )
        .bind(oracle_number)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Count assets grouped for the dashboard
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_with_status(&self, status: AssetStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Assets currently held by an employee (custody set, not damaged)
    pub async fn count_assigned(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM assets
            WHERE assigned_to IS NOT NULL AND assigned_to != '' AND status != 'damaged'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Assets ready to hand out: in stock, no custody, no open repair
    pub async fn count_available(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM assets a
            WHERE a.status IN ('new', 'used')
              AND (a.assigned_to IS NULL OR a.assigned_to = '')
              AND NOT EXISTS(
                  SELECT 1 FROM open_repairs r WHERE r.oracle_number = a.oracle_number
              )
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Assets under repair that are not in anyone's custody
    pub async fn count_under_repair_unassigned(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM assets a
            WHERE (a.assigned_to IS NULL OR a.assigned_to = '')
              AND EXISTS(
                  SELECT 1 FROM open_repairs r WHERE r.oracle_number = a.oracle_number
              )
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
