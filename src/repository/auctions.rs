//! Auctions repository for database operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, Pool, Postgres};

use crate::{error::AppResult, models::auction::Auction};

/// Column values for a new auction row (asset snapshot taken at sale time).
#[derive(Debug, Clone)]
pub struct NewAuction {
    pub oracle_number: String,
    pub asset_type: Option<String>,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub serial_number: Option<String>,
    pub price: Option<Decimal>,
    pub auction_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuctionsRepository {
    pool: Pool<Postgres>,
}

impl AuctionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Whether an auction record exists for the oracle number
    pub async fn exists_for(
        &self,
        executor: impl PgExecutor<'_>,
        oracle_number: &str,
    ) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM auctions WHERE oracle_number = $1)")
                .bind(oracle_number)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    /// Insert a new auction record
    pub async fn insert(&self, executor: impl PgExecutor<'_>, new: &NewAuction) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO auctions (
                oracle_number, asset_type, brand_name, model_name, serial_number,
                price, auction_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&new.oracle_number)
        .bind(&new.asset_type)
        .bind(&new.brand_name)
        .bind(&new.model_name)
        .bind(&new.serial_number)
        .bind(new.price)
        .bind(new.auction_date)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    /// All auctions, newest first
    pub async fn list(&self) -> AppResult<Vec<Auction>> {
        let rows =
            sqlx::query_as::<_, Auction>("SELECT * FROM auctions ORDER BY auction_date DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    /// Auction record for one asset, if any
    pub async fn get_by_oracle(&self, oracle_number: &str) -> AppResult<Option<Auction>> {
        let row = sqlx::query_as::<_, Auction>("SELECT * FROM auctions WHERE oracle_number = $1")
            .bind(oracle_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Oracle numbers that have been auctioned
    pub async fn auctioned_oracle_numbers(&self) -> AppResult<Vec<String>> {
        let numbers: Vec<String> =
            sqlx::query_scalar("SELECT oracle_number FROM auctions ORDER BY oracle_number")
                .fetch_all(&self.pool)
                .await?;
        Ok(numbers)
    }

    /// Count auctions
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM auctions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
