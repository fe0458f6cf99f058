//! Return service: the return lifecycle operation plus listings

use tracing::info;

use crate::{
    error::{AppError, AppResult},
    lifecycle::{self, Operation},
    models::{
        enums::{ActivityType, ReturnType},
        return_record::{CreateReturn, ReturnDetails, ReturnRecord, ReturnStats},
    },
    repository::{activity::ActivityEntry, returns::NewReturn, Repository},
    services::date_to_utc,
};

#[derive(Clone)]
pub struct ReturnsService {
    repository: Repository,
}

impl ReturnsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Take an asset out of custody with the requested disposition. One
    /// transaction: snapshot, decision, return insert, asset update,
    /// assignment close, audit entry.
    pub async fn process(
        &self,
        payload: CreateReturn,
        voucher_filename: Option<String>,
    ) -> AppResult<i32> {
        let return_type = ReturnType::parse(&payload.return_type).ok_or_else(|| {
            AppError::Validation(format!("Invalid return type: {}", payload.return_type))
        })?;

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

        let delta = lifecycle::decide(snapshot, Operation::Return(return_type))?;

        let return_date = payload
            .return_date
            .map(date_to_utc)
            .unwrap_or_else(chrono::Utc::now);

        let return_id = self
            .repository
            .returns
            .insert(
                &mut *tx,
                &NewReturn {
                    oracle_number: asset.oracle_number.clone(),
                    return_type,
                    return_date,
                    reason: payload.reason.clone(),
                    notes: payload.notes.clone(),
                    voucher_filename,
                },
            )
            .await?;

        // The closed assignment's actual_return_date is the return date.
        self.repository
            .apply_lifecycle_delta(&mut tx, &asset, &delta, return_date)
            .await?;

        self.repository
            .activity
            .record(
                &mut *tx,
                ActivityType::Returned,
                &ActivityEntry {
                    oracle_number: Some(asset.oracle_number.clone()),
                    asset_type: Some(asset.device_type.clone()),
                    brand_name: asset.brand_name.clone(),
                    asset_name: asset.model_name.clone(),
                    employee_name: asset.assigned_to.clone(),
                    department_name: None,
                    remarks: Some(format!(
                        "Asset {} returned as {}",
                        asset.oracle_number, return_type
                    )),
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            oracle_number = %asset.oracle_number,
            return_type = %return_type,
            "Asset returned"
        );
        Ok(return_id)
    }

    /// All return records with asset details
    pub async fn list(&self) -> AppResult<Vec<ReturnDetails>> {
        let rows = self.repository.returns.list().await?;
        Ok(rows.into_iter().map(ReturnDetails::from).collect())
    }

    /// Return history for one asset
    pub async fn history_for(&self, oracle_number: &str) -> AppResult<Vec<ReturnRecord>> {
        if self.repository.assets.get_by_oracle(oracle_number).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Asset with oracle number {} not found",
                oracle_number
            )));
        }
        self.repository.returns.history_for(oracle_number).await
    }

    /// Attach or replace the voucher of a return record
    pub async fn attach_voucher(&self, id: i32, voucher_filename: &str) -> AppResult<()> {
        self.repository.returns.set_voucher(id, voucher_filename).await
    }

    /// Counts by disposition
    pub async fn stats(&self) -> AppResult<ReturnStats> {
        self.repository.returns.stats().await
    }
}
