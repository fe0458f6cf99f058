//! Asset management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{AddBrand, Asset, AssetOverview, AssetQuery, CreateAsset, DeviceBrands,
                ExistsResponse},
        assignment::Assignment,
        auction::Auction,
        return_record::ReturnRecord,
    },
    AppState,
};

use super::AuthenticatedUser;

/// Aggregate view returned by the asset detail endpoint
#[derive(Serialize, ToSchema)]
pub struct AssetDetails {
    /// The asset with its derived status
    pub asset: AssetOverview,
    /// Active assignment, if the asset is in someone's custody
    pub active_assignment: Option<Assignment>,
    /// Open repair count (0 or 1)
    pub open_repairs: i64,
    /// Completed repair count
    pub completed_repairs: i64,
    /// Most recent return record
    pub latest_return: Option<ReturnRecord>,
    /// Auction record, if the asset was auctioned
    pub auction: Option<Auction>,
}

/// Register a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset registered", body = Asset),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Oracle or serial number already exists")
    )
)]
pub async fn create_asset(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let asset = state.services.assets.create(payload).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// List assets with filters and views
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "Matching assets with derived status", body = Vec<AssetOverview>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_assets(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<Vec<AssetOverview>>> {
    let assets = state.services.assets.list(query).await?;
    Ok(Json(assets))
}

/// Get the full detail view for one asset
#[utoipa::path(
    get,
    path = "/assets/{oracle_number}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("oracle_number" = String, Path, description = "Oracle number")
    ),
    responses(
        (status = 200, description = "Asset details", body = AssetDetails),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(oracle_number): Path<String>,
) -> AppResult<Json<AssetDetails>> {
    let details = state.services.assets.detail(&oracle_number).await?;
    Ok(Json(details))
}

/// Assignment history for one asset
#[utoipa::path(
    get,
    path = "/assets/{oracle_number}/history",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("oracle_number" = String, Path, description = "Oracle number")
    ),
    responses(
        (status = 200, description = "Assignment history, newest first", body = Vec<Assignment>)
    )
)]
pub async fn assignment_history(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(oracle_number): Path<String>,
) -> AppResult<Json<Vec<Assignment>>> {
    let history = state
        .services
        .assignments
        .history_for(&oracle_number)
        .await?;
    Ok(Json(history))
}

/// Active assignment for one asset
#[utoipa::path(
    get,
    path = "/assets/{oracle_number}/assignment",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("oracle_number" = String, Path, description = "Oracle number")
    ),
    responses(
        (status = 200, description = "Active assignment", body = Assignment),
        (status = 404, description = "No active assignment")
    )
)]
pub async fn active_assignment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(oracle_number): Path<String>,
) -> AppResult<Json<Assignment>> {
    let assignment = state
        .services
        .assignments
        .active_for(&oracle_number)
        .await?;
    Ok(Json(assignment))
}

/// Oracle numbers currently in custody
#[utoipa::path(
    get,
    path = "/assets/assigned",
    tag = "assets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Assigned oracle numbers", body = Vec<String>)
    )
)]
pub async fn assigned_oracle_numbers(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<Vec<String>>> {
    let numbers = state.services.assets.assigned_oracle_numbers().await?;
    Ok(Json(numbers))
}

/// Check whether an oracle number is taken
#[utoipa::path(
    get,
    path = "/assets/check-oracle/{oracle_number}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("oracle_number" = String, Path, description = "Oracle number to probe")
    ),
    responses(
        (status = 200, description = "Existence flag", body = ExistsResponse)
    )
)]
pub async fn check_oracle(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(oracle_number): Path<String>,
) -> AppResult<Json<ExistsResponse>> {
    let exists = state.services.assets.oracle_exists(&oracle_number).await?;
    Ok(Json(ExistsResponse { exists }))
}

/// Check whether a serial number is taken
#[utoipa::path(
    get,
    path = "/assets/check-serial/{serial_number}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("serial_number" = String, Path, description = "Serial number to probe")
    ),
    responses(
        (status = 200, description = "Existence flag", body = ExistsResponse)
    )
)]
pub async fn check_serial(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(serial_number): Path<String>,
) -> AppResult<Json<ExistsResponse>> {
    let exists = state.services.assets.serial_exists(&serial_number).await?;
    Ok(Json(ExistsResponse { exists }))
}

/// Known device types
#[utoipa::path(
    get,
    path = "/assets/device-types",
    tag = "assets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Seeded and discovered device types", body = Vec<String>)
    )
)]
pub async fn device_types(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<Vec<String>>> {
    let types = state.services.assets.device_types().await?;
    Ok(Json(types))
}

/// Brand catalogue for one device type
#[utoipa::path(
    get,
    path = "/assets/device-types/{device_type}/brands",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("device_type" = String, Path, description = "Device type")
    ),
    responses(
        (status = 200, description = "Brand list", body = DeviceBrands)
    )
)]
pub async fn get_brands(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(device_type): Path<String>,
) -> AppResult<Json<DeviceBrands>> {
    let brands = state.services.assets.brands_for(&device_type).await?;
    Ok(Json(brands))
}

/// Add a brand to a device type's catalogue
#[utoipa::path(
    post,
    path = "/assets/brands",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = AddBrand,
    responses(
        (status = 200, description = "Updated brand list", body = DeviceBrands),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn add_brand(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<AddBrand>,
) -> AppResult<Json<DeviceBrands>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let brands = state.services.assets.add_brand(payload).await?;
    Ok(Json(brands))
}

/// Oracle numbers of one device type eligible for assignment
#[utoipa::path(
    get,
    path = "/assets/device-types/{device_type}/available",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("device_type" = String, Path, description = "Device type")
    ),
    responses(
        (status = 200, description = "Assignable oracle numbers", body = Vec<String>)
    )
)]
pub async fn available_assets(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(device_type): Path<String>,
) -> AppResult<Json<Vec<String>>> {
    let numbers = state.services.assets.available_for(&device_type).await?;
    Ok(Json(numbers))
}
