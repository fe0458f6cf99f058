//! Business logic services

pub mod assets;
pub mod assignments;
pub mod auctions;
pub mod dashboard;
pub mod repairs;
pub mod returns;
pub mod storage;
pub mod users;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::{
    config::{AuthConfig, StorageConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub assets: assets::AssetsService,
    pub assignments: assignments::AssignmentsService,
    pub repairs: repairs::RepairsService,
    pub returns: returns::ReturnsService,
    pub auctions: auctions::AuctionsService,
    pub dashboard: dashboard::DashboardService,
    pub users: users::UsersService,
    pub storage: storage::StorageService,
}

impl Services {
    /// Create all services with the given repository
    pub async fn new(
        repository: Repository,
        auth_config: AuthConfig,
        storage_config: StorageConfig,
    ) -> AppResult<Self> {
        let storage = storage::StorageService::new(storage_config).await?;
        Ok(Self {
            assets: assets::AssetsService::new(repository.clone()),
            assignments: assignments::AssignmentsService::new(repository.clone()),
            repairs: repairs::RepairsService::new(repository.clone()),
            returns: returns::ReturnsService::new(repository.clone()),
            auctions: auctions::AuctionsService::new(repository.clone()),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            users: users::UsersService::new(repository, auth_config),
            storage,
        })
    }
}

/// Wire dates arrive as bare `YYYY-MM-DD`; everything is stored as UTC
/// midnight of that day.
pub(crate) fn date_to_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
