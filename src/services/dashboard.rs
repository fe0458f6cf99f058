//! Dashboard service: fleet counters and the recent-activity feed

use crate::{
    api::dashboard::DashboardStats,
    error::AppResult,
    models::{activity::ActivityLog, enums::AssetStatus},
    repository::Repository,
};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Fleet counters. `under_repair` comes from the open-repair table, the
    /// same source the derived status uses, so the two can never disagree.
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let total_assets = self.repository.assets.count_all().await?;
        let assigned = self.repository.assets.count_assigned().await?;
        let available = self.repository.assets.count_available().await?;
        let under_repair = self.repository.repairs.count_open().await?;
        let under_repair_not_assigned = self
            .repository
            .assets
            .count_under_repair_unassigned()
            .await?;
        let damaged = self
            .repository
            .assets
            .count_with_status(AssetStatus::Damaged)
            .await?;
        let auctioned = self
            .repository
            .assets
            .count_with_status(AssetStatus::Auctioned)
            .await?;
        let buyback_count = self.repository.returns.count_buyback().await?;

        Ok(DashboardStats {
            total_assets,
            assigned,
            unassigned: total_assets - assigned,
            available,
            under_repair,
            under_repair_not_assigned,
            damaged,
            auctioned,
            buyback_count,
            stock_count: available + under_repair_not_assigned,
        })
    }

    /// Most recent audit entries, newest first
    pub async fn recent_activities(&self, limit: i64) -> AppResult<Vec<ActivityLog>> {
        self.repository.activity.recent(limit).await
    }
}
