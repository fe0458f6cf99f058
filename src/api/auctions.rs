//! Auction endpoints: final disposal of assets

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::auction::{Auction, CreateAuction},
    AppState,
};

use super::{repairs::OracleNumbers, AuthenticatedUser};

/// Auction creation response
#[derive(Serialize, ToSchema)]
pub struct AuctionResponse {
    /// Auction record ID
    pub id: i32,
    /// Status message
    pub message: String,
}

/// Send an asset to auction
#[utoipa::path(
    post,
    path = "/auctions",
    tag = "auctions",
    security(("bearer_auth" = [])),
    request_body = CreateAuction,
    responses(
        (status = 201, description = "Asset auctioned", body = AuctionResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Asset under repair or already auctioned")
    )
)]
pub async fn create_auction(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateAuction>,
) -> AppResult<(StatusCode, Json<AuctionResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state.services.auctions.auction(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuctionResponse {
            id,
            message: "Auction details saved successfully".to_string(),
        }),
    ))
}

/// List all auctions
#[utoipa::path(
    get,
    path = "/auctions",
    tag = "auctions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Auction records, newest first", body = Vec<Auction>)
    )
)]
pub async fn list_auctions(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<Vec<Auction>>> {
    let auctions = state.services.auctions.list().await?;
    Ok(Json(auctions))
}

/// Auction record for one asset
#[utoipa::path(
    get,
    path = "/auctions/{oracle_number}",
    tag = "auctions",
    security(("bearer_auth" = [])),
    params(
        ("oracle_number" = String, Path, description = "Oracle number")
    ),
    responses(
        (status = 200, description = "Auction record", body = Auction),
        (status = 404, description = "Asset was never auctioned")
    )
)]
pub async fn get_auction(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(oracle_number): Path<String>,
) -> AppResult<Json<Auction>> {
    let auction = state.services.auctions.get_by_oracle(&oracle_number).await?;
    Ok(Json(auction))
}

/// Oracle numbers of auctioned assets
#[utoipa::path(
    get,
    path = "/auctions/auctioned/oracle-numbers",
    tag = "auctions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Auctioned oracle numbers", body = OracleNumbers)
    )
)]
pub async fn auctioned_oracle_numbers(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<OracleNumbers>> {
    let numbers = state.services.auctions.auctioned_oracle_numbers().await?;
    Ok(Json(OracleNumbers::new(numbers)))
}
