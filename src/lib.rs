//! Oriel IT Asset Management System
//!
//! A Rust implementation of the Oriel asset management server, providing a
//! REST JSON API for tracking IT assets through their whole lifecycle:
//! registration, assignment, repair, return and final disposal.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub pool: sqlx::PgPool,
}
