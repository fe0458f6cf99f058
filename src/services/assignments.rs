//! Assignment service: the assign lifecycle operation plus custody listings

use chrono::Utc;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    lifecycle::{self, AssignmentEffect, Operation},
    models::{
        assignment::{Assignment, AssignmentDetails, CreateAssignment},
        enums::ActivityType,
    },
    repository::{
        activity::ActivityEntry,
        assets::CustodyFields,
        assignments::NewAssignment,
        Repository,
    },
    services::date_to_utc,
};

#[derive(Clone)]
pub struct AssignmentsService {
    repository: Repository,
}

impl AssignmentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Assign an asset to an employee. One transaction: snapshot read (row
    /// locked), lifecycle decision, assignment insert, custody stamp, audit
    /// entry.
    pub async fn assign(
        &self,
        payload: CreateAssignment,
        voucher_path: Option<String>,
    ) -> AppResult<i32> {
        let mut tx = self.repository.pool.begin().await?;

        let (asset, snapshot) = self
            .repository
            .lifecycle_snapshot(&mut tx, &payload.oracle_number)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Asset with oracle number {} not found",
                    payload.oracle_number
                ))
            })?;

        let delta = lifecycle::decide(snapshot, Operation::Assign)?;

        let assignment_date = date_to_utc(payload.assignment_date);
        let expected_return_date = Some(date_to_utc(payload.expected_return_date));

        let mut assignment_id = None;
        if delta.assignment == AssignmentEffect::Open {
            let id = self
                .repository
                .assignments
                .insert(
                    &mut *tx,
                    &NewAssignment {
                        oracle_number: asset.oracle_number.clone(),
                        employee_name: payload.employee_name.clone(),
                        designation: payload.designation.clone(),
                        department: payload.department.clone(),
                        assignment_date,
                        expected_return_date,
                        notes: payload.notes.clone(),
                        allocation_voucher_path: voucher_path,
                    },
                )
                .await?;
            self.repository
                .assets
                .set_custody(
                    &mut *tx,
                    &asset.oracle_number,
                    &CustodyFields {
                        assigned_to: payload.employee_name.clone(),
                        assignment_date,
                        expected_return_date,
                    },
                )
                .await?;
            assignment_id = Some(id);
        }
        let assignment_id = assignment_id
            .ok_or_else(|| AppError::Internal("assign delta missing open effect".to_string()))?;

        self.repository
            .apply_lifecycle_delta(&mut tx, &asset, &delta, Utc::now())
            .await?;

        self.repository
            .activity
            .record(
                &mut *tx,
                ActivityType::Assigned,
                &ActivityEntry {
                    oracle_number: Some(asset.oracle_number.clone()),
                    asset_type: Some(asset.device_type.clone()),
                    brand_name: asset.brand_name.clone(),
                    asset_name: asset.model_name.clone(),
                    employee_name: Some(payload.employee_name.clone()),
                    department_name: Some(payload.department.clone()),
                    remarks: Some(format!(
                        "Asset {} assigned to {}",
                        asset.oracle_number, payload.employee_name
                    )),
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            oracle_number = %asset.oracle_number,
            employee = %payload.employee_name,
            "Asset assigned"
        );
        Ok(assignment_id)
    }

    /// Active assignments with asset details, derived status applied
    pub async fn list_active(&self) -> AppResult<Vec<AssignmentDetails>> {
        let rows = self.repository.assignments.list_active().await?;
        Ok(rows
            .into_iter()
            .map(|row| AssignmentDetails {
                id: row.id,
                oracle_number: row.oracle_number,
                employee_name: row.employee_name,
                designation: row.designation,
                department: row.department,
                assignment_date: row.assignment_date,
                expected_return_date: row.expected_return_date,
                actual_return_date: row.actual_return_date,
                status: row.status,
                notes: row.notes,
                allocation_voucher_path: row.allocation_voucher_path,
                device_type: row.device_type,
                brand_name: row.brand_name,
                model_name: row.model_name,
                serial_number: row.serial_number,
                asset_status: row
                    .asset_status
                    .map(|s| lifecycle::effective_status(s, row.has_open_repair)),
            })
            .collect())
    }

    /// Count active assignments
    pub async fn count_active(&self) -> AppResult<i64> {
        self.repository.assignments.count_active().await
    }

    /// Active assignment for one asset
    pub async fn active_for(&self, oracle_number: &str) -> AppResult<Assignment> {
        self.repository
            .assignments
            .get_active(oracle_number)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No active assignment for oracle number {}",
                    oracle_number
                ))
            })
    }

    /// Assignment history for one asset
    pub async fn history_for(&self, oracle_number: &str) -> AppResult<Vec<Assignment>> {
        if self.repository.assets.get_by_oracle(oracle_number).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Asset with oracle number {} not found",
                oracle_number
            )));
        }
        self.repository.assignments.history_for(oracle_number).await
    }
}
