//! Repair service: request and completion lifecycle operations plus listings

use chrono::Utc;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    lifecycle::{self, Operation, RepairEffect},
    models::{
        enums::ActivityType,
        repair::{CompleteRepair, CreateRepairRequest, RepairRecord, RepairState, RepairStats},
    },
    repository::{activity::ActivityEntry, repairs::NewOpenRepair, Repository},
    services::date_to_utc,
};

#[derive(Clone)]
pub struct RepairsService {
    repository: Repository,
}

impl RepairsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Open a repair for an asset. The stored asset status is left alone;
    /// the new open row is what flips the derived status.
    pub async fn request(&self, payload: CreateRepairRequest) -> AppResult<i32> {
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

        let delta = lifecycle::decide(snapshot, Operation::RequestRepair)?;

        let mut repair_id = None;
        if delta.repair == RepairEffect::Open {
            let start_date = payload
                .start_date
                .map(date_to_utc)
                .unwrap_or_else(Utc::now);
            let id = self
                .repository
                .repairs
                .insert_open(
                    &mut *tx,
                    &NewOpenRepair {
                        oracle_number: asset.oracle_number.clone(),
                        // Snapshot taken from the asset row, not the caller.
                        asset_type: Some(asset.device_type.clone()),
                        asset_model: asset.model_name.clone(),
                        repair_description: payload.repair_description.clone(),
                        start_date,
                        technician: payload.technician.clone(),
                        cost: payload.cost,
                        notes: payload.notes.clone(),
                        vendor_name: payload.vendor_name.clone(),
                        employee_name: payload
                            .employee_name
                            .clone()
                            .or_else(|| asset.assigned_to.clone()),
                        department: payload.department.clone(),
                        designation: payload.designation.clone(),
                        voucher_file: None,
                    },
                )
                .await?;
            repair_id = Some(id);
        }
        let repair_id = repair_id
            .ok_or_else(|| AppError::Internal("repair delta missing open effect".to_string()))?;

        self.repository
            .apply_lifecycle_delta(&mut tx, &asset, &delta, Utc::now())
            .await?;

        self.repository
            .activity
            .record(
                &mut *tx,
                ActivityType::RepairRequested,
                &ActivityEntry {
                    oracle_number: Some(asset.oracle_number.clone()),
                    asset_type: Some(asset.device_type.clone()),
                    brand_name: asset.brand_name.clone(),
                    asset_name: asset.model_name.clone(),
                    employee_name: payload.employee_name.clone(),
                    department_name: payload.department.clone(),
                    remarks: Some(format!(
                        "Repair requested for {}: {}",
                        asset.oracle_number, payload.repair_description
                    )),
                },
            )
            .await?;

        tx.commit().await?;

        info!(oracle_number = %asset.oracle_number, "Repair requested");
        Ok(repair_id)
    }

    /// Close the open repair for an asset: copy the row into the completed
    /// history, delete it, and let the stored status stand as the pre-repair
    /// status. All inside one transaction.
    pub async fn complete(
        &self,
        payload: CompleteRepair,
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

        let delta = lifecycle::decide(snapshot, Operation::CompleteRepair)?;

        let mut completed_id = None;
        if delta.repair == RepairEffect::Close {
            let open = self
                .repository
                .repairs
                .get_open(&mut *tx, &asset.oracle_number)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "No open repair for oracle number {}",
                        asset.oracle_number
                    ))
                })?;
            let completion_date = payload
                .completion_date
                .map(date_to_utc)
                .unwrap_or_else(Utc::now);
            let id = self
                .repository
                .repairs
                .insert_completed(
                    &mut *tx,
                    &open,
                    completion_date,
                    payload.outcome.unwrap_or_default(),
                    payload.return_date.map(date_to_utc),
                    payload.notes.as_deref(),
                    voucher_path.as_deref(),
                )
                .await?;
            self.repository.repairs.delete_open(&mut *tx, open.id).await?;
            completed_id = Some(id);
        }
        let completed_id = completed_id
            .ok_or_else(|| AppError::Internal("repair delta missing close effect".to_string()))?;

        self.repository
            .apply_lifecycle_delta(&mut tx, &asset, &delta, Utc::now())
            .await?;

        self.repository
            .activity
            .record(
                &mut *tx,
                ActivityType::RepairCompleted,
                &ActivityEntry {
                    oracle_number: Some(asset.oracle_number.clone()),
                    asset_type: Some(asset.device_type.clone()),
                    brand_name: asset.brand_name.clone(),
                    asset_name: asset.model_name.clone(),
                    employee_name: asset.assigned_to.clone(),
                    department_name: None,
                    remarks: Some(format!("Repair completed for {}", asset.oracle_number)),
                },
            )
            .await?;

        tx.commit().await?;

        info!(oracle_number = %asset.oracle_number, "Repair completed");
        Ok(completed_id)
    }

    /// Unified listing, optionally filtered by progress state
    pub async fn list(&self, state: Option<RepairState>) -> AppResult<Vec<RepairRecord>> {
        let mut records = Vec::new();
        if state != Some(RepairState::Completed) {
            records.extend(
                self.repository
                    .repairs
                    .list_open()
                    .await?
                    .into_iter()
                    .map(RepairRecord::from),
            );
        }
        if state != Some(RepairState::InProgress) {
            records.extend(
                self.repository
                    .repairs
                    .list_completed()
                    .await?
                    .into_iter()
                    .map(RepairRecord::from),
            );
        }
        Ok(records)
    }

    /// Repair history for one asset (open row first, then completed)
    pub async fn history_for(&self, oracle_number: &str) -> AppResult<Vec<RepairRecord>> {
        let (open, completed) = self.repository.repairs.history_for(oracle_number).await?;
        let mut records: Vec<RepairRecord> = open.into_iter().map(RepairRecord::from).collect();
        records.extend(completed.into_iter().map(RepairRecord::from));
        Ok(records)
    }

    /// Oracle numbers currently under repair
    pub async fn open_oracle_numbers(&self) -> AppResult<Vec<String>> {
        self.repository.repairs.open_oracle_numbers().await
    }

    /// Aggregate repair statistics
    pub async fn stats(&self) -> AppResult<RepairStats> {
        self.repository.repairs.stats().await
    }
}
