//! Repair endpoints: sending assets out for repair and bringing them back

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use axum_extra::extract::Multipart;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RepairOutcome,
        repair::{CompleteRepair, CreateRepairRequest, RepairRecord, RepairState, RepairStats},
    },
    services::storage::FileKind,
    AppState,
};

use super::{parse_date_field, required, AuthenticatedUser};

/// Repair operation response
#[derive(Serialize, ToSchema)]
pub struct RepairResponse {
    /// Repair record ID
    pub id: i32,
    /// Status message
    pub message: String,
}

/// Oracle number collection response
#[derive(Serialize, ToSchema)]
pub struct OracleNumbers {
    pub oracle_numbers: Vec<String>,
    pub count: usize,
}

impl OracleNumbers {
    pub fn new(oracle_numbers: Vec<String>) -> Self {
        let count = oracle_numbers.len();
        OracleNumbers {
            oracle_numbers,
            count,
        }
    }
}

/// Repair listing filter
#[derive(Deserialize, IntoParams)]
pub struct RepairQuery {
    /// `in_progress` or `completed`; both when absent
    pub status: Option<String>,
}

/// Send an asset out for repair
#[utoipa::path(
    post,
    path = "/repairs/request",
    tag = "repairs",
    security(("bearer_auth" = [])),
    request_body = CreateRepairRequest,
    responses(
        (status = 201, description = "Repair opened", body = RepairResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Asset already under repair or auctioned")
    )
)]
pub async fn request_repair(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateRepairRequest>,
) -> AppResult<(StatusCode, Json<RepairResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state.services.repairs.request(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RepairResponse {
            id,
            message: "Repair request created".to_string(),
        }),
    ))
}

/// Complete the open repair for an asset.
///
/// Multipart form: `oracle_number`, optional `completion_date`, `is_fixed`
/// (`fixed`/`not_fixed`), `return_date`, `notes` and an optional
/// `voucher_file`.
#[utoipa::path(
    post,
    path = "/repairs/complete",
    tag = "repairs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Repair completed", body = RepairResponse),
        (status = 400, description = "Missing or malformed form field"),
        (status = 404, description = "Asset not found or no open repair for it")
    )
)]
pub async fn complete_repair(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<RepairResponse>> {
    let mut oracle_number = None;
    let mut completion_date = None;
    let mut outcome = None;
    let mut return_date = None;
    let mut notes = None;
    let mut voucher_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "voucher_file" {
            let original = field.file_name().unwrap_or("voucher").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Cannot read upload: {e}")))?;
            if !bytes.is_empty() {
                voucher_path = Some(
                    state
                        .services
                        .storage
                        .store(FileKind::Voucher, &original, &bytes)
                        .await?,
                );
            }
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Cannot read form field {name}: {e}")))?;
        match name.as_str() {
            "oracle_number" => oracle_number = Some(value),
            "completion_date" => {
                completion_date = Some(parse_date_field("completion_date", &value)?)
            }
            "is_fixed" => {
                outcome = Some(RepairOutcome::parse(&value).ok_or_else(|| {
                    AppError::Validation(format!("is_fixed must be fixed or not_fixed, got {value}"))
                })?)
            }
            "return_date" => return_date = Some(parse_date_field("return_date", &value)?),
            "notes" => notes = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }

    let payload = CompleteRepair {
        oracle_number: required(oracle_number, "oracle_number")?,
        completion_date,
        outcome,
        return_date,
        notes,
    };
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state
        .services
        .repairs
        .complete(payload, voucher_path)
        .await?;
    Ok(Json(RepairResponse {
        id,
        message: "Repair completed".to_string(),
    }))
}

/// List repairs, optionally filtered by progress state
#[utoipa::path(
    get,
    path = "/repairs",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(RepairQuery),
    responses(
        (status = 200, description = "Repair records", body = Vec<RepairRecord>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_repairs(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<RepairQuery>,
) -> AppResult<Json<Vec<RepairRecord>>> {
    let filter = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some("in_progress") | Some("in-progress") => Some(RepairState::InProgress),
        Some("completed") => Some(RepairState::Completed),
        Some(other) => {
            return Err(AppError::Validation(format!(
                "status must be in_progress or completed, got {other}"
            )))
        }
        None => None,
    };

    let records = state.services.repairs.list(filter).await?;
    Ok(Json(records))
}

/// Repair statistics
#[utoipa::path(
    get,
    path = "/repairs/stats",
    tag = "repairs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Repair counters", body = RepairStats)
    )
)]
pub async fn repair_stats(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<RepairStats>> {
    let stats = state.services.repairs.stats().await?;
    Ok(Json(stats))
}

/// Oracle numbers currently under repair
#[utoipa::path(
    get,
    path = "/repairs/open/oracle-numbers",
    tag = "repairs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Oracle numbers with an open repair", body = OracleNumbers)
    )
)]
pub async fn open_oracle_numbers(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<OracleNumbers>> {
    let numbers = state.services.repairs.open_oracle_numbers().await?;
    Ok(Json(OracleNumbers::new(numbers)))
}

/// Repair history for one asset
#[utoipa::path(
    get,
    path = "/repairs/{oracle_number}",
    tag = "repairs",
    security(("bearer_auth" = [])),
    params(
        ("oracle_number" = String, Path, description = "Oracle number")
    ),
    responses(
        (status = 200, description = "Open and completed repairs, newest first", body = Vec<RepairRecord>)
    )
)]
pub async fn repair_history(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(oracle_number): Path<String>,
) -> AppResult<Json<Vec<RepairRecord>>> {
    let records = state.services.repairs.history_for(&oracle_number).await?;
    Ok(Json(records))
}
