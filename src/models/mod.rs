//! Data models for Oriel

pub mod activity;
pub mod asset;
pub mod assignment;
pub mod auction;
pub mod enums;
pub mod repair;
pub mod return_record;
pub mod user;

// Re-export commonly used types
pub use activity::ActivityLog;
pub use asset::{Asset, AssetOverview};
pub use assignment::{Assignment, AssignmentDetails};
pub use auction::Auction;
pub use enums::{ActivityType, AssetStatus, AssignmentStatus, RepairOutcome, ReturnType};
pub use repair::{CompletedRepair, OpenRepair, RepairRecord};
pub use return_record::{ReturnDetails, ReturnRecord};
pub use user::{User, UserClaims};
