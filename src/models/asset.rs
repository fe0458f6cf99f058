//! Asset model and related types.
//!
//! The asset is the root entity of the system; every other record references
//! it by oracle number (a soft foreign key, history tables are kept even if
//! the asset row disappears).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::AssetStatus;
use crate::lifecycle;

/// Asset model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Asset {
    pub id: i32,
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
    /// Stored status; display paths report the derived status instead
    /// whenever an open repair exists.
    pub status: AssetStatus,
    pub assigned_to: Option<String>,
    pub assignment_date: Option<DateTime<Utc>>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Internal row structure for list queries: the asset plus the joined facts
/// needed to derive the reported status.
#[derive(Debug, Clone, FromRow)]
pub struct AssetListRow {
    pub id: i32,
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
    pub status: AssetStatus,
    pub assigned_to: Option<String>,
    pub assignment_date: Option<DateTime<Utc>>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub has_open_repair: bool,
    pub current_holder: Option<String>,
}

/// Asset representation for listings and details: status is the *derived*
/// one, custody is resolved from the active assignment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetOverview {
    pub id: i32,
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
    /// Derived status (open repair overrides the stored value).
    pub status: AssetStatus,
    pub under_repair: bool,
    pub current_holder: Option<String>,
    pub assigned_to: Option<String>,
    pub assignment_date: Option<DateTime<Utc>>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AssetListRow> for AssetOverview {
    fn from(row: AssetListRow) -> Self {
        AssetOverview {
            id: row.id,
            oracle_number: row.oracle_number,
            device_type: row.device_type,
            brand_name: row.brand_name,
            model_name: row.model_name,
            serial_number: row.serial_number,
            unit_price: row.unit_price,
            purchase_date: row.purchase_date,
            warranty_expiry: row.warranty_expiry,
            vendor_name: row.vendor_name,
            tender_no: row.tender_no,
            notes: row.notes,
            status: lifecycle::effective_status(row.status, row.has_open_repair),
            under_repair: row.has_open_repair,
            current_holder: row.current_holder,
            assigned_to: row.assigned_to,
            assignment_date: row.assignment_date,
            expected_return_date: row.expected_return_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Asset query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AssetQuery {
    pub device_type: Option<String>,
    pub brand_name: Option<String>,
    /// Substring match on the oracle number.
    pub oracle_number: Option<String>,
    /// Free-text search over oracle number, brand, model and serial.
    pub search: Option<String>,
    /// Filter on the derived status.
    pub status: Option<String>,
    /// Only assets ready to hand out: no custody, derived status new/used.
    pub new_only: Option<bool>,
    /// In-stock view: no custody and not damaged/auctioned/bought back
    /// (assets under repair without a holder count as stock).
    pub stock: Option<bool>,
    /// Only assets with no custody, whatever their status.
    pub unassigned: Option<bool>,
}

/// Create asset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 64, message = "Oracle number is required"))]
    pub oracle_number: String,
    #[validate(length(min = 1, max = 128, message = "Device type is required"))]
    pub device_type: String,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    #[validate(length(max = 128, message = "Serial number too long"))]
    pub serial_number: Option<String>,
    pub unit_price: Option<Decimal>,
    /// Purchase date (`YYYY-MM-DD`).
    pub purchase_date: Option<chrono::NaiveDate>,
    /// Either an ISO date (`YYYY-MM-DD`) or a duration phrase such as
    /// "3 years" resolved against the current date.
    pub warranty_expiry: Option<String>,
    pub vendor_name: Option<String>,
    pub tender_no: Option<String>,
    pub notes: Option<String>,
}

/// Brand list for one device type
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeviceBrands {
    pub device_type: String,
    pub brands: Vec<String>,
}

/// Add a brand to a device type's catalogue
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddBrand {
    #[validate(length(min = 1, max = 128, message = "Device type is required"))]
    pub device_type: String,
    #[validate(length(min = 1, max = 128, message = "Brand name is required"))]
    pub brand_name: String,
}

/// Existence probe response for oracle/serial checks
#[derive(Debug, Serialize, ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
}
