//! Oriel Server - IT Asset Management System
//!
//! REST API server tracking IT assets through their lifecycle.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oriel_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("oriel_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Oriel Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool.clone());
    let services = Services::new(repository, config.auth.clone(), config.storage.clone())
        .await
        .expect("Failed to create services");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        pool,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Voucher scans can be large; the storage service enforces the real
    // limit, this just keeps axum from cutting uploads off at its default.
    let body_limit = state.config.storage.max_upload_bytes + 64 * 1024;

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication & profile
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_profile))
        .route("/auth/profile/picture", post(api::auth::upload_profile_picture))
        // Assets
        .route("/assets", post(api::assets::create_asset))
        .route("/assets", get(api::assets::list_assets))
        .route("/assets/assigned", get(api::assets::assigned_oracle_numbers))
        .route("/assets/brands", post(api::assets::add_brand))
        .route("/assets/device-types", get(api::assets::device_types))
        .route(
            "/assets/device-types/:device_type/brands",
            get(api::assets::get_brands),
        )
        .route(
            "/assets/device-types/:device_type/available",
            get(api::assets::available_assets),
        )
        .route(
            "/assets/check-oracle/:oracle_number",
            get(api::assets::check_oracle),
        )
        .route(
            "/assets/check-serial/:serial_number",
            get(api::assets::check_serial),
        )
        .route("/assets/:oracle_number", get(api::assets::get_asset))
        .route(
            "/assets/:oracle_number/history",
            get(api::assets::assignment_history),
        )
        .route(
            "/assets/:oracle_number/assignment",
            get(api::assets::active_assignment),
        )
        // Assignments
        .route("/assignments", post(api::assignments::create_assignment))
        .route("/assignments", get(api::assignments::list_assignments))
        .route("/assignments/count", get(api::assignments::count_assignments))
        // Repairs
        .route("/repairs/request", post(api::repairs::request_repair))
        .route("/repairs/complete", post(api::repairs::complete_repair))
        .route("/repairs", get(api::repairs::list_repairs))
        .route("/repairs/stats", get(api::repairs::repair_stats))
        .route(
            "/repairs/open/oracle-numbers",
            get(api::repairs::open_oracle_numbers),
        )
        .route("/repairs/:oracle_number", get(api::repairs::repair_history))
        // Returns
        .route("/returns", post(api::returns::create_return))
        .route("/returns", get(api::returns::list_returns))
        .route("/returns/stats", get(api::returns::return_stats))
        .route("/returns/:oracle_number", get(api::returns::return_history))
        // Voucher attachment; the path value is the numeric return record id
        .route(
            "/returns/:oracle_number/voucher",
            post(api::returns::attach_voucher),
        )
        // Auctions
        .route("/auctions", post(api::auctions::create_auction))
        .route("/auctions", get(api::auctions::list_auctions))
        .route(
            "/auctions/auctioned/oracle-numbers",
            get(api::auctions::auctioned_oracle_numbers),
        )
        .route("/auctions/:oracle_number", get(api::auctions::get_auction))
        // Dashboard & audit trail
        .route("/dashboard", get(api::dashboard::dashboard_stats))
        .route("/activity-logs", get(api::dashboard::activity_logs))
        // Stored files
        .route("/files/*path", get(api::files::serve_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
