//! Return record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::ReturnType;

/// Return record from database. Append-only; the latest row per oracle
/// number reflects the current disposition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnRecord {
    pub id: i32,
    pub oracle_number: String,
    pub return_type: ReturnType,
    pub return_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub voucher_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Internal row structure for return list queries (joined with the asset).
#[derive(Debug, Clone, FromRow)]
pub struct ReturnListRow {
    pub id: i32,
    pub oracle_number: String,
    pub return_type: ReturnType,
    pub return_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub voucher_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub device_type: Option<String>,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub serial_number: Option<String>,
}

/// Return record with asset details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReturnDetails {
    pub id: i32,
    pub oracle_number: String,
    pub return_type: ReturnType,
    pub return_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub voucher_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub device_type: Option<String>,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub serial_number: Option<String>,
}

impl From<ReturnListRow> for ReturnDetails {
    fn from(row: ReturnListRow) -> Self {
        ReturnDetails {
            id: row.id,
            oracle_number: row.oracle_number,
            return_type: row.return_type,
            return_date: row.return_date,
            reason: row.reason,
            notes: row.notes,
            voucher_filename: row.voucher_filename,
            created_at: row.created_at,
            device_type: row.device_type,
            brand_name: row.brand_name,
            model_name: row.model_name,
            serial_number: row.serial_number,
        }
    }
}

/// Create return request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReturn {
    #[validate(length(min = 1, max = 64, message = "Oracle number is required"))]
    pub oracle_number: String,
    /// Wire value; accepts the legacy aliases `employee_buyback` and
    /// `marked_as_damaged`.
    #[validate(length(min = 1, message = "Return type is required"))]
    pub return_type: String,
    /// `YYYY-MM-DD`; defaults to today.
    pub return_date: Option<chrono::NaiveDate>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Return statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnStats {
    pub total: i64,
    pub damaged: i64,
    pub buyback: i64,
}
