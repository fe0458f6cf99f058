//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, assignments, auctions, auth, dashboard, files, health, repairs, returns};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Oriel API",
        version = "1.0.0",
        description = "IT Asset Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Oriel Team", email = "contact@oriel.dev")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        auth::update_profile,
        auth::upload_profile_picture,
        // Assets
        assets::create_asset,
        assets::list_assets,
        assets::get_asset,
        assets::assignment_history,
        assets::active_assignment,
        assets::assigned_oracle_numbers,
        assets::check_oracle,
        assets::check_serial,
        assets::device_types,
        assets::get_brands,
        assets::add_brand,
        assets::available_assets,
        // Assignments
        assignments::create_assignment,
        assignments::list_assignments,
        assignments::count_assignments,
        // Repairs
        repairs::request_repair,
        repairs::complete_repair,
        repairs::list_repairs,
        repairs::repair_stats,
        repairs::open_oracle_numbers,
        repairs::repair_history,
        // Returns
        returns::create_return,
        returns::list_returns,
        returns::return_stats,
        returns::return_history,
        returns::attach_voucher,
        // Auctions
        auctions::create_auction,
        auctions::list_auctions,
        auctions::get_auction,
        auctions::auctioned_oracle_numbers,
        // Dashboard
        dashboard::dashboard_stats,
        dashboard::activity_logs,
        // Files
        files::serve_file,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            auth::ProfilePictureResponse,
            crate::models::user::User,
            crate::models::user::RegisterUser,
            crate::models::user::UpdateProfile,
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::AssetOverview,
            crate::models::asset::AssetQuery,
            crate::models::asset::CreateAsset,
            crate::models::asset::DeviceBrands,
            crate::models::asset::AddBrand,
            crate::models::asset::ExistsResponse,
            assets::AssetDetails,
            // Assignments
            crate::models::assignment::Assignment,
            crate::models::assignment::AssignmentDetails,
            crate::models::assignment::CreateAssignment,
            assignments::AssignmentResponse,
            assignments::AssignmentCount,
            // Repairs
            crate::models::repair::OpenRepair,
            crate::models::repair::CompletedRepair,
            crate::models::repair::RepairRecord,
            crate::models::repair::RepairState,
            crate::models::repair::CreateRepairRequest,
            crate::models::repair::CompleteRepair,
            crate::models::repair::RepairStats,
            repairs::RepairResponse,
            repairs::OracleNumbers,
            // Returns
            crate::models::return_record::ReturnRecord,
            crate::models::return_record::ReturnDetails,
            crate::models::return_record::CreateReturn,
            crate::models::return_record::ReturnStats,
            returns::ReturnResponse,
            // Auctions
            crate::models::auction::Auction,
            crate::models::auction::CreateAuction,
            auctions::AuctionResponse,
            // Dashboard
            dashboard::DashboardStats,
            crate::models::activity::ActivityLog,
            // Enums
            crate::models::enums::AssetStatus,
            crate::models::enums::AssignmentStatus,
            crate::models::enums::ReturnType,
            crate::models::enums::RepairOutcome,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and profile endpoints"),
        (name = "assets", description = "Asset registration and catalogue"),
        (name = "assignments", description = "Custody management"),
        (name = "repairs", description = "Repair lifecycle"),
        (name = "returns", description = "Asset returns"),
        (name = "auctions", description = "Asset disposal"),
        (name = "dashboard", description = "Fleet counters and audit trail"),
        (name = "files", description = "Stored file serving")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
