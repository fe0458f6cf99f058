//! Authentication and user profile service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use tracing::info;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterUser, UpdateProfile, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user. Username and email must both be free.
    pub async fn register(&self, payload: RegisterUser) -> AppResult<User> {
        if self.repository.users.username_exists(&payload.username).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.repository.users.email_exists(&payload.email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let hash = self.hash_password(&payload.password)?;
        let user = self
            .repository
            .users
            .create(
                &payload.username,
                &hash,
                &payload.email,
                payload.full_name.as_deref(),
            )
            .await?;

        info!(username = %user.username, "User registered");
        Ok(user)
    }

    /// Authenticate by username and password, returning a JWT and the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !self.verify_password(&user.password, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.create_token(&user)?;
        self.repository.users.touch_last_login(user.id).await?;

        info!(username = %user.username, "User logged in");
        Ok((token, user))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Update the caller's profile. A password change requires the current
    /// password to verify.
    pub async fn update_profile(&self, user_id: i32, payload: UpdateProfile) -> AppResult<User> {
        let user = self.repository.users.get_by_id(user_id).await?;

        if let Some(ref email) = payload.email {
            if self.repository.users.email_exists(email, Some(user_id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let password_hash = match payload.new_password {
            Some(ref new_password) => {
                let current = payload.current_password.as_deref().ok_or_else(|| {
                    AppError::Validation(
                        "Current password is required to change password".to_string(),
                    )
                })?;
                if !self.verify_password(&user.password, current)? {
                    return Err(AppError::Authentication(
                        "Current password is incorrect".to_string(),
                    ));
                }
                Some(self.hash_password(new_password)?)
            }
            None => None,
        };

        self.repository
            .users
            .update_profile(
                user_id,
                payload.full_name.as_deref(),
                payload.email.as_deref(),
                password_hash.as_deref(),
            )
            .await
    }

    /// Record the stored path of an uploaded profile picture
    pub async fn set_profile_picture(&self, user_id: i32, path: &str) -> AppResult<()> {
        self.repository.users.set_profile_picture(user_id, path).await
    }

    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, hash: &str, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
