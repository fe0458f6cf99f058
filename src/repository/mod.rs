//! Repository layer for database operations

pub mod activity;
pub mod assets;
pub mod assignments;
pub mod auctions;
pub mod repairs;
pub mod returns;
pub mod users;

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::AppResult,
    lifecycle::{AssignmentEffect, Delta, RepairEffect, Snapshot},
    models::asset::Asset,
};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub assets: assets::AssetsRepository,
    pub assignments: assignments::AssignmentsRepository,
    pub repairs: repairs::RepairsRepository,
    pub returns: returns::ReturnsRepository,
    pub auctions: auctions::AuctionsRepository,
    pub activity: activity::ActivityRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            assets: assets::AssetsRepository::new(pool.clone()),
            assignments: assignments::AssignmentsRepository::new(pool.clone()),
            repairs: repairs::RepairsRepository::new(pool.clone()),
            returns: returns::ReturnsRepository::new(pool.clone()),
            auctions: auctions::AuctionsRepository::new(pool.clone()),
            activity: activity::ActivityRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Read the asset and everything the lifecycle rules need, inside the
    /// given transaction. The asset row is locked FOR UPDATE so concurrent
    /// transitions on the same oracle number serialize. Returns None when
    /// the asset does not exist.
    pub async fn lifecycle_snapshot(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        oracle_number: &str,
    ) -> AppResult<Option<(Asset, Snapshot)>> {
        let asset = match self.assets.get_for_update(&mut **tx, oracle_number).await? {
            Some(asset) => asset,
            None => return Ok(None),
        };
        let has_open_repair = self.repairs.open_exists(&mut **tx, oracle_number).await?;
        let has_active_assignment = self
            .assignments
            .active_exists(&mut **tx, oracle_number)
            .await?;
        let previously_auctioned = self.auctions.exists_for(&mut **tx, oracle_number).await?;

        let snapshot = Snapshot {
            status: asset.status,
            has_open_repair,
            has_active_assignment,
            previously_auctioned,
        };
        Ok(Some((asset, snapshot)))
    }

    /// Apply the asset-row and side-record parts of an approved delta inside
    /// the given transaction: status update, custody clearing, closing the
    /// active assignment, purging stray open repairs. The operation's own
    /// entity inserts (`AssignmentEffect::Open`, `RepairEffect::Open`/
    /// `Close`) carry payloads and are performed by the owning service on
    /// the same transaction.
    pub async fn apply_lifecycle_delta(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        asset: &Asset,
        delta: &Delta,
        closed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(status) = delta.status {
            self.assets
                .set_status(&mut **tx, &asset.oracle_number, status)
                .await?;
        }
        if delta.clear_custody {
            self.assets
                .clear_custody(&mut **tx, &asset.oracle_number)
                .await?;
        }
        if let AssignmentEffect::Close(status) = delta.assignment {
            self.assignments
                .close_active(&mut **tx, &asset.oracle_number, status, closed_at)
                .await?;
        }
        if delta.repair == RepairEffect::Purge {
            self.repairs
                .purge_open(&mut **tx, &asset.oracle_number)
                .await?;
        }
        Ok(())
    }
}
