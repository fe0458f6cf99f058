//! Auction service: the auction lifecycle operation plus listings

use chrono::Utc;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    lifecycle::{self, Operation},
    models::{
        auction::{Auction, CreateAuction},
        enums::ActivityType,
    },
    repository::{activity::ActivityEntry, auctions::NewAuction, Repository},
    services::date_to_utc,
};

#[derive(Clone)]
pub struct AuctionsService {
    repository: Repository,
}

impl AuctionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Sell an asset at auction. One transaction: snapshot, decision,
    /// auction snapshot insert, asset/assignment updates, repair purge,
    /// audit entry.
    pub async fn auction(&self, payload: CreateAuction) -> AppResult<i32> {
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

        let delta = lifecycle::decide(snapshot, Operation::Auction)?;

        let auction_date = payload
            .auction_date
            .map(date_to_utc)
            .unwrap_or_else(Utc::now);

        let auction_id = self
            .repository
            .auctions
            .insert(
                &mut *tx,
                &NewAuction {
                    oracle_number: asset.oracle_number.clone(),
                    asset_type: Some(asset.device_type.clone()),
                    brand_name: asset.brand_name.clone(),
                    model_name: asset.model_name.clone(),
                    serial_number: asset.serial_number.clone(),
                    price: payload.price,
                    auction_date,
                },
            )
            .await?;

        // The closed assignment is stamped with the sale moment, not the
        // auction form date.
        self.repository
            .apply_lifecycle_delta(&mut tx, &asset, &delta, Utc::now())
            .await?;

        self.repository
            .activity
            .record(
                &mut *tx,
                ActivityType::Auctioned,
                &ActivityEntry {
                    oracle_number: Some(asset.oracle_number.clone()),
                    asset_type: Some(asset.device_type.clone()),
                    brand_name: asset.brand_name.clone(),
                    asset_name: asset.model_name.clone(),
                    employee_name: asset.assigned_to.clone(),
                    department_name: None,
                    remarks: Some(format!("Asset {} auctioned", asset.oracle_number)),
                },
            )
            .await?;

        tx.commit().await?;

        info!(oracle_number = %asset.oracle_number, "Asset auctioned");
        Ok(auction_id)
    }

    /// All auctions
    pub async fn list(&self) -> AppResult<Vec<Auction>> {
        self.repository.auctions.list().await
    }

    /// Auction record for one asset
    pub async fn get_by_oracle(&self, oracle_number: &str) -> AppResult<Auction> {
        self.repository
            .auctions
            .get_by_oracle(oracle_number)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No auction record for oracle number {}",
                    oracle_number
                ))
            })
    }

    /// Oracle numbers that have been auctioned
    pub async fn auctioned_oracle_numbers(&self) -> AppResult<Vec<String>> {
        self.repository.auctions.auctioned_oracle_numbers().await
    }
}
