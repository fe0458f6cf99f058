//! Shared domain enums
//!
//! Every status that used to travel as a free-form string is a closed enum
//! here, mapped to a Postgres ENUM type so illegal values cannot be stored.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// AssetStatus
// ---------------------------------------------------------------------------

/// Stored lifecycle status of an asset.
///
/// Note that "under repair" is usually *derived* from the open-repair table
/// rather than stored; see `lifecycle::effective_status`. The variant exists
/// because derived views report it and legacy rows may carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "asset_status", rename_all = "snake_case")]
pub enum AssetStatus {
    New,
    Used,
    Assigned,
    UnderRepair,
    Damaged,
    Auctioned,
    Buyback,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::New => "new",
            AssetStatus::Used => "used",
            AssetStatus::Assigned => "assigned",
            AssetStatus::UnderRepair => "under_repair",
            AssetStatus::Damaged => "damaged",
            AssetStatus::Auctioned => "auctioned",
            AssetStatus::Buyback => "buyback",
        }
    }

    /// Human-readable label used in guard-rejection messages.
    pub fn label(&self) -> &'static str {
        match self {
            AssetStatus::UnderRepair => "under repair",
            other => other.as_str(),
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(AssetStatus::New),
            "used" => Ok(AssetStatus::Used),
            "assigned" => Ok(AssetStatus::Assigned),
            "under_repair" | "under repair" => Ok(AssetStatus::UnderRepair),
            "damaged" => Ok(AssetStatus::Damaged),
            "auctioned" => Ok(AssetStatus::Auctioned),
            "buyback" => Ok(AssetStatus::Buyback),
            _ => Err(format!("Invalid asset status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// AssignmentStatus
// ---------------------------------------------------------------------------

/// Custody state of one assignment row. At most one `Assigned` row may exist
/// per oracle number; closed rows are kept as history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "assignment_status", rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Returned,
    Auctioned,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Returned => "returned",
            AssignmentStatus::Auctioned => "auctioned",
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReturnType
// ---------------------------------------------------------------------------

/// Disposition of a return operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "return_type", rename_all = "snake_case")]
pub enum ReturnType {
    ReturnedToInventory,
    Damaged,
    Buyback,
}

impl ReturnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnType::ReturnedToInventory => "returned_to_inventory",
            ReturnType::Damaged => "damaged",
            ReturnType::Buyback => "buyback",
        }
    }

    /// Parse a wire value, accepting the legacy frontend aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "returned_to_inventory" | "returned" => Some(ReturnType::ReturnedToInventory),
            "damaged" | "marked_as_damaged" => Some(ReturnType::Damaged),
            "buyback" | "employee_buyback" => Some(ReturnType::Buyback),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReturnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RepairOutcome
// ---------------------------------------------------------------------------

/// Result recorded when a repair completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "repair_outcome", rename_all = "snake_case")]
pub enum RepairOutcome {
    Fixed,
    NotFixed,
}

impl RepairOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairOutcome::Fixed => "fixed",
            RepairOutcome::NotFixed => "not_fixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixed" | "yes" => Some(RepairOutcome::Fixed),
            "not_fixed" | "not fixed" | "no" => Some(RepairOutcome::NotFixed),
            _ => None,
        }
    }
}

impl Default for RepairOutcome {
    fn default() -> Self {
        RepairOutcome::NotFixed
    }
}

impl std::fmt::Display for RepairOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActivityType
// ---------------------------------------------------------------------------

/// Kind of audit-trail entry. Stored as text in the append-only log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    AssetAdded,
    Assigned,
    RepairRequested,
    RepairCompleted,
    Returned,
    Auctioned,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::AssetAdded => "asset_added",
            ActivityType::Assigned => "assigned",
            ActivityType::RepairRequested => "repair_requested",
            ActivityType::RepairCompleted => "repair_completed",
            ActivityType::Returned => "returned",
            ActivityType::Auctioned => "auctioned",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
