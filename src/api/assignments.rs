//! Assignment endpoints: handing assets to employees

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Multipart;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::assignment::{AssignmentDetails, CreateAssignment},
    services::storage::FileKind,
    AppState,
};

use super::{parse_date_field, required, AuthenticatedUser};

/// Assignment creation response
#[derive(Serialize, ToSchema)]
pub struct AssignmentResponse {
    /// Assignment ID
    pub id: i32,
    /// Status message
    pub message: String,
}

/// Active assignment count
#[derive(Serialize, ToSchema)]
pub struct AssignmentCount {
    pub assigned_count: i64,
}

/// Assign an asset to an employee.
///
/// Multipart form: `oracle_number`, `employee_name`, `designation`,
/// `department`, `assignment_date`, `expected_return_date`, optional `notes`
/// and an optional `allocation_voucher` file.
#[utoipa::path(
    post,
    path = "/assignments",
    tag = "assignments",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Asset assigned", body = AssignmentResponse),
        (status = 400, description = "Missing or malformed form field"),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset already has an active assignment"),
        (status = 422, description = "Asset not assignable in its current state")
    )
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<AssignmentResponse>)> {
    let mut oracle_number = None;
    let mut employee_name = None;
    let mut designation = None;
    let mut department = None;
    let mut assignment_date = None;
    let mut expected_return_date = None;
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
        if name == "allocation_voucher" {
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
            "employee_name" => employee_name = Some(value),
            "designation" => designation = Some(value),
            "department" => department = Some(value),
            "assignment_date" => {
                assignment_date = Some(parse_date_field("assignment_date", &value)?)
            }
            "expected_return_date" => {
                expected_return_date = Some(parse_date_field("expected_return_date", &value)?)
            }
            "notes" => notes = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }

    let payload = CreateAssignment {
        oracle_number: required(oracle_number, "oracle_number")?,
        employee_name: required(employee_name, "employee_name")?,
        designation: required(designation, "designation")?,
        department: required(department, "department")?,
        assignment_date: assignment_date
            .ok_or_else(|| AppError::Validation("assignment_date is required".to_string()))?,
        expected_return_date: expected_return_date.ok_or_else(|| {
            AppError::Validation("expected_return_date is required".to_string())
        })?,
        notes,
    };
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state
        .services
        .assignments
        .assign(payload, voucher_path)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse {
            id,
            message: "Asset assigned successfully".to_string(),
        }),
    ))
}

/// List active assignments with asset details
#[utoipa::path(
    get,
    path = "/assignments",
    tag = "assignments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active assignments", body = Vec<AssignmentDetails>)
    )
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<Vec<AssignmentDetails>>> {
    let assignments = state.services.assignments.list_active().await?;
    Ok(Json(assignments))
}

/// Count active assignments
#[utoipa::path(
    get,
    path = "/assignments/count",
    tag = "assignments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active assignment count", body = AssignmentCount)
    )
)]
pub async fn count_assignments(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<Json<AssignmentCount>> {
    let assigned_count = state.services.assignments.count_active().await?;
    Ok(Json(AssignmentCount { assigned_count }))
}
