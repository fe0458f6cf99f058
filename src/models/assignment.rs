//! Assignment (custody) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{AssetStatus, AssignmentStatus};

/// Assignment model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Assignment {
    pub id: i32,
    pub oracle_number: String,
    pub employee_name: String,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub assignment_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    pub notes: Option<String>,
    pub allocation_voucher_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Internal row structure for assignment list queries (assignment joined
/// with its asset and the open-repair fact).
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentListRow {
    pub id: i32,
    pub oracle_number: String,
    pub employee_name: String,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub assignment_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    pub notes: Option<String>,
    pub allocation_voucher_path: Option<String>,
    pub device_type: Option<String>,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub serial_number: Option<String>,
    pub asset_status: Option<AssetStatus>,
    pub has_open_repair: bool,
}

/// Assignment with asset details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentDetails {
    pub id: i32,
    pub oracle_number: String,
    pub employee_name: String,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub assignment_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    pub notes: Option<String>,
    pub allocation_voucher_path: Option<String>,
    pub device_type: Option<String>,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub serial_number: Option<String>,
    /// Derived asset status.
    pub asset_status: Option<AssetStatus>,
}

/// Create assignment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssignment {
    #[validate(length(min = 1, max = 64, message = "Oracle number is required"))]
    pub oracle_number: String,
    #[validate(length(min = 1, max = 128, message = "Employee name is required"))]
    pub employee_name: String,
    #[validate(length(min = 1, max = 128, message = "Designation is required"))]
    pub designation: String,
    #[validate(length(min = 1, max = 128, message = "Department is required"))]
    pub department: String,
    /// `YYYY-MM-DD`
    pub assignment_date: chrono::NaiveDate,
    /// `YYYY-MM-DD`
    pub expected_return_date: chrono::NaiveDate,
    pub notes: Option<String>,
}
