//! Auction model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Auction record from database. Carries a snapshot of the asset at sale
/// time; at most one auction exists per asset lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Auction {
    pub id: i32,
    pub oracle_number: String,
    pub asset_type: Option<String>,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub serial_number: Option<String>,
    pub price: Option<Decimal>,
    pub auction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Create auction request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuction {
    #[validate(length(min = 1, max = 64, message = "Oracle number is required"))]
    pub oracle_number: String,
    pub price: Option<Decimal>,
    /// `YYYY-MM-DD`; defaults to today.
    pub auction_date: Option<chrono::NaiveDate>,
}
