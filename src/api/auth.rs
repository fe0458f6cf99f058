//! Authentication and profile endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Multipart;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{RegisterUser, UpdateProfile, User},
    services::storage::FileKind,
    AppState,
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

/// Public view of a user account
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    /// User ID
    pub id: i32,
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Full name
    pub full_name: Option<String>,
    /// Stored profile picture path, served under /files
    pub profile_picture: Option<String>,
    /// Last successful login
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            profile_picture: user.profile_picture,
            last_login: user.last_login,
        }
    }
}

/// Login response with JWT token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Authenticated user
    pub user: UserInfo,
}

/// Profile picture upload response
#[derive(Serialize, ToSchema)]
pub struct ProfilePictureResponse {
    /// Stored path, served under /files
    pub profile_picture: String,
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = UserInfo),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(user))))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user: UserInfo::from(user),
    }))
}

/// Get the current user from the token
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(UserInfo::from(user)))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserInfo),
        (status = 400, description = "Current password missing or wrong"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<UpdateProfile>,
) -> AppResult<Json<UserInfo>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state
        .services
        .users
        .update_profile(claims.user_id, payload)
        .await?;
    Ok(Json(UserInfo::from(user)))
}

/// Upload a profile picture (multipart field `profile_picture`)
#[utoipa::path(
    post,
    path = "/auth/profile/picture",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Picture stored", body = ProfilePictureResponse),
        (status = 400, description = "No file in request")
    )
)]
pub async fn upload_profile_picture(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<ProfilePictureResponse>> {
    let mut stored = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("profile_picture") {
            let original = field.file_name().unwrap_or("profile").to_string();
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
                    .store(FileKind::Profile, &original, &bytes)
                    .await?,
            );
        }
    }

    let path =
        stored.ok_or_else(|| AppError::Validation("profile_picture file is required".to_string()))?;
    state
        .services
        .users
        .set_profile_picture(claims.user_id, &path)
        .await?;

    Ok(Json(ProfilePictureResponse {
        profile_picture: path,
    }))
}
