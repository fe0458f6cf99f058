//! Repair models: the open-repair row whose existence marks an asset as
//! "under repair", and the append-only completed-repair history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::RepairOutcome;

/// Open repair row. At most one exists per oracle number; its presence is
/// what derived views read as "under repair".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OpenRepair {
    pub id: i32,
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
    pub created_at: DateTime<Utc>,
}

/// Completed repair history row. Append-only; never updated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CompletedRepair {
    pub id: i32,
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
    pub completion_date: DateTime<Utc>,
    pub outcome: RepairOutcome,
    pub return_date: Option<DateTime<Utc>>,
    pub voucher_file: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Progress marker used by the unified repair listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RepairState {
    InProgress,
    Completed,
}

/// One row of the unified repair listing (open and completed merged).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RepairRecord {
    pub id: i32,
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
    pub state: RepairState,
    pub completion_date: Option<DateTime<Utc>>,
    pub outcome: Option<RepairOutcome>,
    pub return_date: Option<DateTime<Utc>>,
}

impl From<OpenRepair> for RepairRecord {
    fn from(r: OpenRepair) -> Self {
        RepairRecord {
            id: r.id,
            oracle_number: r.oracle_number,
            asset_type: r.asset_type,
            asset_model: r.asset_model,
            repair_description: r.repair_description,
            start_date: r.start_date,
            technician: r.technician,
            cost: r.cost,
            notes: r.notes,
            vendor_name: r.vendor_name,
            employee_name: r.employee_name,
            department: r.department,
            designation: r.designation,
            voucher_file: r.voucher_file,
            state: RepairState::InProgress,
            completion_date: None,
            outcome: None,
            return_date: None,
        }
    }
}

impl From<CompletedRepair> for RepairRecord {
    fn from(r: CompletedRepair) -> Self {
        RepairRecord {
            id: r.id,
            oracle_number: r.oracle_number,
            asset_type: r.asset_type,
            asset_model: r.asset_model,
            repair_description: r.repair_description,
            start_date: r.start_date,
            technician: r.technician,
            cost: r.cost,
            notes: r.notes,
            vendor_name: r.vendor_name,
            department: r.department,
            designation: r.designation,
            employee_name: r.employee_name,
            voucher_file: r.voucher_file,
            state: RepairState::Completed,
            completion_date: Some(r.completion_date),
            outcome: Some(r.outcome),
            return_date: r.return_date,
        }
    }
}

/// Create repair request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRepairRequest {
    #[validate(length(min = 1, max = 64, message = "Oracle number is required"))]
    pub oracle_number: String,
    #[validate(length(min = 1, message = "Repair description is required"))]
    pub repair_description: String,
    /// `YYYY-MM-DD`; defaults to today.
    pub start_date: Option<chrono::NaiveDate>,
    pub technician: Option<String>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
    pub vendor_name: Option<String>,
    pub employee_name: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
}

/// Complete repair request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompleteRepair {
    #[validate(length(min = 1, max = 64, message = "Oracle number is required"))]
    pub oracle_number: String,
    /// `YYYY-MM-DD`; defaults to today.
    pub completion_date: Option<chrono::NaiveDate>,
    /// `fixed` or `not_fixed`; defaults to `not_fixed`.
    pub outcome: Option<RepairOutcome>,
    /// `YYYY-MM-DD`
    pub return_date: Option<chrono::NaiveDate>,
    pub notes: Option<String>,
}

/// Repair statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct RepairStats {
    pub in_progress: i64,
    pub completed: i64,
    pub total: i64,
    pub total_cost: Decimal,
}
