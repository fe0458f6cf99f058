//! Return endpoints: taking assets back from employees

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::return_record::{CreateReturn, ReturnDetails, ReturnRecord, ReturnStats},
    services::storage::FileKind,
    AppState,
};

use super::{parse_date_field, required, AuthenticatedUser};

/// Return operation response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return record ID
    pub id: i32,
    /// Status message
    pub message: String,
}

/// Process a return.
///
/// Multipart form: `oracle_number`, `return_type` (`returned_to_inventory`,
/// `damaged` or `buyback`; the legacy values `marked_as_damaged` and
/// `employee_buyback` are accepted), optional `return_date`, `reason`,
/// `notes` and an optional `voucher` file.
#[utoipa::path(
    post,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Return processed", body = ReturnResponse),
        (status = 400, description = "Missing or malformed form field"),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Asset not returnable in its current state")
    )
)]
pub async fn create_return(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ReturnResponse>)> {
    let mut oracle_number = None;
    let mut return_type = None;
    let mut return_date = None;
    let mut reason = None;
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
        if name == "voucher" {
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
            "return_type" => return_type = Some(value),
            "return_date" => return_date = Some(parse_date_field("return_date", &value)?),
            "reason" => reason = Some(value).filter(|v| !v.is_empty()),
            "notes" => notes = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }

    let payload = CreateReturn {
        oracle_number: required(oracle_number, "oracle_number")?,
        return_type: required(return_type, "return_type")?,
        return_date,
        reason,
        notes,
    };
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state.services.returns.process(payload, voucher_path).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReturnResponse {
            id,
            message: "Return processed".to_string(),
        }),
    ))
}

/// List all returns with asset details
#[utoipa::path(
    get,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Return records, newest first", body = Vec<ReturnDetails>)
    )
)]
pub async fn list_returns(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<Vec<ReturnDetails>>> {
    let returns = state.services.returns.list().await?;
    Ok(Json(returns))
}

/// Return statistics
#[utoipa::path(
    get,
    path = "/returns/stats",
    tag = "returns",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counts by disposition", body = ReturnStats)
    )
)]
pub async fn return_stats(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<ReturnStats>> {
    let stats = state.services.returns.stats().await?;
    Ok(Json(stats))
}

/// Return history for one asset
#[utoipa::path(
    get,
    path = "/returns/{oracle_number}",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(
        ("oracle_number" = String, Path, description = "Oracle number")
    ),
    responses(
        (status = 200, description = "Return records for the asset", body = Vec<ReturnRecord>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn return_history(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(oracle_number): Path<String>,
) -> AppResult<Json<Vec<ReturnRecord>>> {
    let records = state.services.returns.history_for(&oracle_number).await?;
    Ok(Json(records))
}

/// Attach or replace the voucher of a return record (multipart field `voucher`)
#[utoipa::path(
    post,
    path = "/returns/{id}/voucher",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Return record ID")
    ),
    responses(
        (status = 200, description = "Voucher stored", body = ReturnResponse),
        (status = 400, description = "No file in request"),
        (status = 404, description = "Return record not found")
    )
)]
pub async fn attach_voucher(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(return_id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<Json<ReturnResponse>> {
    let mut stored = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("voucher") {
            let original = field.file_name().unwrap_or("voucher").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Cannot read upload: {e}")))?;
            if bytes.is_empty() {
                continue;
            }
            stored = Some(
                state
                    .services
                    .storage
                    .store(FileKind::Voucher, &original, &bytes)
                    .await?,
            );
        }
    }

    let path = stored.ok_or_else(|| AppError::Validation("voucher file is required".to_string()))?;
    state.services.returns.attach_voucher(return_id, &path).await?;

    Ok(Json(ReturnResponse {
        id: return_id,
        message: "Voucher updated".to_string(),
    }))
}
