//! Asset lifecycle rules
//!
//! The one place where "is this operation legal given the asset's current
//! state" is decided. `decide` takes a snapshot of everything the rules need
//! and returns either an approved [`Delta`] or a typed rejection; it performs
//! no I/O, so every guard is testable without a database. Services load the
//! snapshot inside the operation transaction, call `decide`, and apply the
//! delta verbatim.

use thiserror::Error;

use crate::models::enums::{AssetStatus, AssignmentStatus, ReturnType};

/// Current persisted state of one asset, as read inside the operation
/// transaction (asset row locked with FOR UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Stored status of the asset row.
    pub status: AssetStatus,
    /// An open repair row exists for the oracle number.
    pub has_open_repair: bool,
    /// An assignment row with status `assigned` exists.
    pub has_active_assignment: bool,
    /// An auction record exists for the oracle number.
    pub previously_auctioned: bool,
}

impl Snapshot {
    /// The status derived views must report: an open repair overrides
    /// whatever the asset row stores.
    pub fn effective_status(&self) -> AssetStatus {
        effective_status(self.status, self.has_open_repair)
    }
}

/// Single source of truth for the derived "under repair" override. All read
/// and write paths go through this instead of re-deriving inline.
pub fn effective_status(stored: AssetStatus, has_open_repair: bool) -> AssetStatus {
    if has_open_repair {
        AssetStatus::UnderRepair
    } else {
        stored
    }
}

/// Requested lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Put the asset into an employee's custody.
    Assign,
    /// Open a repair for the asset.
    RequestRepair,
    /// Close the open repair, moving it to history.
    CompleteRepair,
    /// Take the asset out of custody with the given disposition.
    Return(ReturnType),
    /// Sell the asset at auction.
    Auction,
}

/// What happens to the assignment table when a delta is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentEffect {
    /// Leave assignment rows alone.
    None,
    /// Insert a new row with status `assigned`.
    Open,
    /// Close the active row to the given terminal status, stamping
    /// `actual_return_date`.
    Close(AssignmentStatus),
}

/// What happens to the repair tables when a delta is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairEffect {
    /// Leave repair rows alone.
    None,
    /// Insert a new open repair row.
    Open,
    /// Move the open row to the completed-repair history and delete it.
    Close,
    /// Delete any open repair rows without keeping history.
    Purge,
}

/// Approved outcome of a lifecycle decision. Services apply every field of
/// the delta inside one transaction; they never add or skip effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    /// New stored status, if it changes.
    pub status: Option<AssetStatus>,
    pub assignment: AssignmentEffect,
    pub repair: RepairEffect,
    /// Clear `assigned_to` / `assignment_date` / `expected_return_date` on
    /// the asset row.
    pub clear_custody: bool,
}

impl Delta {
    fn unchanged() -> Self {
        Delta {
            status: None,
            assignment: AssignmentEffect::None,
            repair: RepairEffect::None,
            clear_custody: false,
        }
    }
}

/// Rejection reasons. The display strings are returned verbatim to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("This asset is already under repair. Complete the current repair before proceeding.")]
    UnderRepair,

    #[error("This asset has been auctioned and can no longer change state.")]
    AlreadyAuctioned,

    #[error("An active assignment already exists for this asset.")]
    DuplicateActiveAssignment,

    #[error("Cannot assign an asset with status '{0}'.")]
    NotAssignable(AssetStatus),

    #[error("Cannot return an asset with status '{0}'.")]
    NotReturnable(AssetStatus),

    #[error("No open repair exists for this asset.")]
    NoOpenRepair,
}

impl From<LifecycleError> for crate::error::AppError {
    fn from(err: LifecycleError) -> Self {
        use crate::error::AppError;
        match err {
            LifecycleError::DuplicateActiveAssignment => {
                AppError::DuplicateAssignment(err.to_string())
            }
            LifecycleError::NoOpenRepair => AppError::NotFound(err.to_string()),
            other => AppError::IllegalTransition(other.to_string()),
        }
    }
}

/// Decide whether the requested operation is legal for the given snapshot.
///
/// Returns the delta to apply on approval. Every rejection aborts the whole
/// operation before any write; there is no partial application.
pub fn decide(snapshot: Snapshot, operation: Operation) -> Result<Delta, LifecycleError> {
    match operation {
        Operation::Assign => assign(snapshot),
        Operation::RequestRepair => request_repair(snapshot),
        Operation::CompleteRepair => complete_repair(snapshot),
        Operation::Return(return_type) => process_return(snapshot, return_type),
        Operation::Auction => auction(snapshot),
    }
}

fn assign(snapshot: Snapshot) -> Result<Delta, LifecycleError> {
    if snapshot.has_active_assignment {
        return Err(LifecycleError::DuplicateActiveAssignment);
    }
    if snapshot.has_open_repair {
        return Err(LifecycleError::UnderRepair);
    }
    if snapshot.previously_auctioned || snapshot.status == AssetStatus::Auctioned {
        return Err(LifecycleError::AlreadyAuctioned);
    }
    match snapshot.status {
        AssetStatus::New | AssetStatus::Used => Ok(Delta {
            status: Some(AssetStatus::Assigned),
            assignment: AssignmentEffect::Open,
            repair: RepairEffect::None,
            clear_custody: false,
        }),
        other => Err(LifecycleError::NotAssignable(other)),
    }
}

fn request_repair(snapshot: Snapshot) -> Result<Delta, LifecycleError> {
    if snapshot.has_open_repair {
        return Err(LifecycleError::UnderRepair);
    }
    if snapshot.previously_auctioned || snapshot.status == AssetStatus::Auctioned {
        return Err(LifecycleError::AlreadyAuctioned);
    }
    // Stored status stays untouched: the open row alone makes derived views
    // report "under repair", and completion restores nothing.
    Ok(Delta {
        status: None,
        assignment: AssignmentEffect::None,
        repair: RepairEffect::Open,
        clear_custody: false,
    })
}

fn complete_repair(snapshot: Snapshot) -> Result<Delta, LifecycleError> {
    if !snapshot.has_open_repair {
        return Err(LifecycleError::NoOpenRepair);
    }
    // A legacy row may physically store `under_repair`; closing the repair
    // must leave a valid non-derived status behind.
    let restored = match snapshot.status {
        AssetStatus::UnderRepair => Some(AssetStatus::Assigned),
        _ => None,
    };
    Ok(Delta {
        status: restored,
        assignment: AssignmentEffect::None,
        repair: RepairEffect::Close,
        clear_custody: false,
    })
}

fn process_return(snapshot: Snapshot, return_type: ReturnType) -> Result<Delta, LifecycleError> {
    if snapshot.has_open_repair {
        return Err(LifecycleError::UnderRepair);
    }
    if snapshot.previously_auctioned || snapshot.status == AssetStatus::Auctioned {
        return Err(LifecycleError::AlreadyAuctioned);
    }
    match snapshot.status {
        AssetStatus::New | AssetStatus::Used | AssetStatus::Assigned => {}
        // A stored under_repair only survives from legacy rows; once no open
        // repair exists the asset is still returnable.
        AssetStatus::UnderRepair => {}
        other => return Err(LifecycleError::NotReturnable(other)),
    }
    let target = match return_type {
        ReturnType::ReturnedToInventory => AssetStatus::Used,
        ReturnType::Damaged => AssetStatus::Damaged,
        ReturnType::Buyback => AssetStatus::Buyback,
    };
    let assignment = if snapshot.has_active_assignment {
        AssignmentEffect::Close(AssignmentStatus::Returned)
    } else {
        AssignmentEffect::None
    };
    Ok(Delta {
        status: Some(target),
        assignment,
        repair: RepairEffect::None,
        clear_custody: true,
    })
}

fn auction(snapshot: Snapshot) -> Result<Delta, LifecycleError> {
    if snapshot.has_open_repair {
        return Err(LifecycleError::UnderRepair);
    }
    if snapshot.previously_auctioned || snapshot.status == AssetStatus::Auctioned {
        return Err(LifecycleError::AlreadyAuctioned);
    }
    let assignment = if snapshot.has_active_assignment {
        AssignmentEffect::Close(AssignmentStatus::Auctioned)
    } else {
        AssignmentEffect::None
    };
    Ok(Delta {
        status: Some(AssetStatus::Auctioned),
        assignment,
        // Stray open rows are purged so the sold asset can never read as
        // under repair again. The guard above already rejected real ones.
        repair: RepairEffect::Purge,
        clear_custody: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: AssetStatus) -> Snapshot {
        Snapshot {
            status,
            has_open_repair: false,
            has_active_assignment: false,
            previously_auctioned: false,
        }
    }

    // -- derived status ----------------------------------------------------

    #[test]
    fn open_repair_overrides_stored_status() {
        assert_eq!(
            effective_status(AssetStatus::Assigned, true),
            AssetStatus::UnderRepair
        );
        assert_eq!(
            effective_status(AssetStatus::Assigned, false),
            AssetStatus::Assigned
        );
        assert_eq!(effective_status(AssetStatus::New, true), AssetStatus::UnderRepair);
    }

    // -- assign ------------------------------------------------------------

    #[test]
    fn assign_new_asset() {
        let delta = decide(snapshot(AssetStatus::New), Operation::Assign).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Assigned));
        assert_eq!(delta.assignment, AssignmentEffect::Open);
        assert_eq!(delta.repair, RepairEffect::None);
        assert!(!delta.clear_custody);
    }

    #[test]
    fn assign_used_asset() {
        let delta = decide(snapshot(AssetStatus::Used), Operation::Assign).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Assigned));
        assert_eq!(delta.assignment, AssignmentEffect::Open);
    }

    #[test]
    fn assign_rejects_damaged_asset() {
        let err = decide(snapshot(AssetStatus::Damaged), Operation::Assign).unwrap_err();
        assert_eq!(err, LifecycleError::NotAssignable(AssetStatus::Damaged));
    }

    #[test]
    fn assign_rejects_buyback_asset() {
        let err = decide(snapshot(AssetStatus::Buyback), Operation::Assign).unwrap_err();
        assert_eq!(err, LifecycleError::NotAssignable(AssetStatus::Buyback));
    }

    #[test]
    fn assign_rejects_auctioned_asset() {
        let err = decide(snapshot(AssetStatus::Auctioned), Operation::Assign).unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyAuctioned);
    }

    #[test]
    fn assign_rejects_duplicate_active_assignment() {
        let mut snap = snapshot(AssetStatus::Assigned);
        snap.has_active_assignment = true;
        let err = decide(snap, Operation::Assign).unwrap_err();
        assert_eq!(err, LifecycleError::DuplicateActiveAssignment);
    }

    #[test]
    fn assign_rejects_asset_under_repair() {
        let mut snap = snapshot(AssetStatus::Used);
        snap.has_open_repair = true;
        let err = decide(snap, Operation::Assign).unwrap_err();
        assert_eq!(err, LifecycleError::UnderRepair);
    }

    #[test]
    fn assign_duplicate_check_precedes_status_check() {
        // A drifted row can be both damaged and actively assigned; the
        // duplicate rejection is the one callers must see.
        let mut snap = snapshot(AssetStatus::Damaged);
        snap.has_active_assignment = true;
        let err = decide(snap, Operation::Assign).unwrap_err();
        assert_eq!(err, LifecycleError::DuplicateActiveAssignment);
    }

    // -- repair request ----------------------------------------------------

    #[test]
    fn repair_request_leaves_stored_status_untouched() {
        let mut snap = snapshot(AssetStatus::Assigned);
        snap.has_active_assignment = true;
        let delta = decide(snap, Operation::RequestRepair).unwrap();
        assert_eq!(delta.status, None);
        assert_eq!(delta.repair, RepairEffect::Open);
        assert_eq!(delta.assignment, AssignmentEffect::None);
        assert!(!delta.clear_custody);
    }

    #[test]
    fn repair_request_rejects_existing_open_repair() {
        let mut snap = snapshot(AssetStatus::Assigned);
        snap.has_open_repair = true;
        let err = decide(snap, Operation::RequestRepair).unwrap_err();
        assert_eq!(err, LifecycleError::UnderRepair);
    }

    #[test]
    fn repair_request_rejects_auctioned_asset() {
        let err = decide(snapshot(AssetStatus::Auctioned), Operation::RequestRepair).unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyAuctioned);

        let mut snap = snapshot(AssetStatus::Used);
        snap.previously_auctioned = true;
        let err = decide(snap, Operation::RequestRepair).unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyAuctioned);
    }

    #[test]
    fn repair_request_allowed_for_unassigned_asset() {
        let delta = decide(snapshot(AssetStatus::Used), Operation::RequestRepair).unwrap();
        assert_eq!(delta.repair, RepairEffect::Open);
        assert_eq!(delta.status, None);
    }

    // -- repair completion -------------------------------------------------

    #[test]
    fn complete_repair_restores_pre_repair_status() {
        // Scenario C: the stored status never changed, so nothing needs
        // restoring; the open row just closes.
        let mut snap = snapshot(AssetStatus::Assigned);
        snap.has_open_repair = true;
        snap.has_active_assignment = true;
        let delta = decide(snap, Operation::CompleteRepair).unwrap();
        assert_eq!(delta.status, None);
        assert_eq!(delta.repair, RepairEffect::Close);
        assert_eq!(delta.assignment, AssignmentEffect::None);
    }

    #[test]
    fn complete_repair_fixes_up_legacy_stored_status() {
        let mut snap = snapshot(AssetStatus::UnderRepair);
        snap.has_open_repair = true;
        let delta = decide(snap, Operation::CompleteRepair).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Assigned));
        assert_eq!(delta.repair, RepairEffect::Close);
    }

    #[test]
    fn complete_repair_requires_open_row() {
        let err = decide(snapshot(AssetStatus::Assigned), Operation::CompleteRepair).unwrap_err();
        assert_eq!(err, LifecycleError::NoOpenRepair);
    }

    // -- return ------------------------------------------------------------

    #[test]
    fn return_to_inventory_marks_asset_used() {
        let mut snap = snapshot(AssetStatus::Assigned);
        snap.has_active_assignment = true;
        let delta = decide(snap, Operation::Return(ReturnType::ReturnedToInventory)).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Used));
        assert_eq!(delta.assignment, AssignmentEffect::Close(AssignmentStatus::Returned));
        assert!(delta.clear_custody);
    }

    #[test]
    fn return_as_damaged_clears_custody_and_closes_assignment() {
        // Scenario E.
        let mut snap = snapshot(AssetStatus::Assigned);
        snap.has_active_assignment = true;
        let delta = decide(snap, Operation::Return(ReturnType::Damaged)).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Damaged));
        assert_eq!(delta.assignment, AssignmentEffect::Close(AssignmentStatus::Returned));
        assert!(delta.clear_custody);
    }

    #[test]
    fn return_as_buyback() {
        let mut snap = snapshot(AssetStatus::Assigned);
        snap.has_active_assignment = true;
        let delta = decide(snap, Operation::Return(ReturnType::Buyback)).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Buyback));
        assert!(delta.clear_custody);
    }

    #[test]
    fn return_without_active_assignment_still_updates_status() {
        let delta = decide(snapshot(AssetStatus::Used), Operation::Return(ReturnType::Damaged)).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Damaged));
        assert_eq!(delta.assignment, AssignmentEffect::None);
    }

    #[test]
    fn return_rejects_open_repair() {
        let mut snap = snapshot(AssetStatus::Assigned);
        snap.has_open_repair = true;
        let err = decide(snap, Operation::Return(ReturnType::ReturnedToInventory)).unwrap_err();
        assert_eq!(err, LifecycleError::UnderRepair);
    }

    #[test]
    fn return_recovers_legacy_stored_under_repair() {
        // Rows written by the old system can read under_repair with no open
        // repair left; a return is the recovery path.
        let mut snap = snapshot(AssetStatus::UnderRepair);
        snap.has_active_assignment = true;
        let delta = decide(snap, Operation::Return(ReturnType::ReturnedToInventory)).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Used));
        assert_eq!(delta.assignment, AssignmentEffect::Close(AssignmentStatus::Returned));
        assert!(delta.clear_custody);
    }

    #[test]
    fn return_rejects_terminal_statuses() {
        for status in [AssetStatus::Damaged, AssetStatus::Buyback] {
            let err = decide(snapshot(status), Operation::Return(ReturnType::ReturnedToInventory))
                .unwrap_err();
            assert_eq!(err, LifecycleError::NotReturnable(status));
        }
        let err = decide(
            snapshot(AssetStatus::Auctioned),
            Operation::Return(ReturnType::ReturnedToInventory),
        )
        .unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyAuctioned);
    }

    // -- auction -----------------------------------------------------------

    #[test]
    fn auction_rejected_while_repair_open() {
        // Scenario D.
        let mut snap = snapshot(AssetStatus::Assigned);
        snap.has_open_repair = true;
        let err = decide(snap, Operation::Auction).unwrap_err();
        assert_eq!(err, LifecycleError::UnderRepair);
    }

    #[test]
    fn auction_damaged_asset_closes_assignment_as_auctioned() {
        // Scenario F, first half: a damaged asset still in custody is sold.
        let mut snap = snapshot(AssetStatus::Damaged);
        snap.has_active_assignment = true;
        let delta = decide(snap, Operation::Auction).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Auctioned));
        assert_eq!(delta.assignment, AssignmentEffect::Close(AssignmentStatus::Auctioned));
        assert_eq!(delta.repair, RepairEffect::Purge);
        assert!(delta.clear_custody);
    }

    #[test]
    fn second_auction_is_rejected() {
        // Scenario F, second half.
        let err = decide(snapshot(AssetStatus::Auctioned), Operation::Auction).unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyAuctioned);

        let mut snap = snapshot(AssetStatus::Used);
        snap.previously_auctioned = true;
        let err = decide(snap, Operation::Auction).unwrap_err();
        assert_eq!(err, LifecycleError::AlreadyAuctioned);
    }

    #[test]
    fn auction_from_stock() {
        let delta = decide(snapshot(AssetStatus::Used), Operation::Auction).unwrap();
        assert_eq!(delta.status, Some(AssetStatus::Auctioned));
        assert_eq!(delta.assignment, AssignmentEffect::None);
        assert!(delta.clear_custody);
    }

    // -- full walk-through -------------------------------------------------

    #[test]
    fn lifecycle_walkthrough() {
        // Scenarios A through F chained on one asset, applying each approved
        // delta to the snapshot by hand.
        let mut snap = snapshot(AssetStatus::New);

        // A: assign.
        let delta = decide(snap, Operation::Assign).unwrap();
        snap.status = delta.status.unwrap();
        snap.has_active_assignment = true;
        assert_eq!(snap.status, AssetStatus::Assigned);

        // B: request repair; stored status untouched, derived view flips.
        let delta = decide(snap, Operation::RequestRepair).unwrap();
        assert_eq!(delta.status, None);
        snap.has_open_repair = true;
        assert_eq!(snap.effective_status(), AssetStatus::UnderRepair);
        assert_eq!(snap.status, AssetStatus::Assigned);

        // D: auction while under repair is rejected.
        assert_eq!(decide(snap, Operation::Auction).unwrap_err(), LifecycleError::UnderRepair);

        // C: complete repair; pre-repair status is what was stored all along.
        let delta = decide(snap, Operation::CompleteRepair).unwrap();
        assert_eq!(delta.status, None);
        snap.has_open_repair = false;
        assert_eq!(snap.effective_status(), AssetStatus::Assigned);

        // E: return as damaged.
        let delta = decide(snap, Operation::Return(ReturnType::Damaged)).unwrap();
        snap.status = delta.status.unwrap();
        snap.has_active_assignment = false;
        assert_eq!(snap.status, AssetStatus::Damaged);

        // F: auction the damaged asset, then fail the second attempt.
        let delta = decide(snap, Operation::Auction).unwrap();
        snap.status = delta.status.unwrap();
        snap.previously_auctioned = true;
        assert_eq!(snap.status, AssetStatus::Auctioned);
        assert_eq!(decide(snap, Operation::Auction).unwrap_err(), LifecycleError::AlreadyAuctioned);
    }
}
