//! The migration planner: a pure decision procedure.
//!
//! Turns a [`SchemaDelta`] plus the preserve flag and the backend's
//! capability flags into exactly one [`SyncOutcome`] and the action
//! needed to reach it. No IO happens here; the executor in the driver
//! crate carries the plan out.

use std::fmt;

use crate::column::GeneratedKind;
use crate::diff::SchemaDelta;

/// Capabilities of the connected SQLite library, resolved once at
/// startup from its reported version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// `ALTER TABLE ... DROP COLUMN` (SQLite 3.35.0+).
    pub drop_column: bool,
    /// Generated columns and `PRAGMA table_xinfo` reporting them
    /// (SQLite 3.31.0+).
    pub generated_columns: bool,
    /// `ALTER TABLE ... RENAME COLUMN` (SQLite 3.25.0+).
    pub rename_column: bool,
}

impl BackendCapabilities {
    /// Capabilities implied by a SQLite version triple.
    #[must_use]
    pub fn from_version(major: u32, minor: u32, patch: u32) -> Self {
        let v = (major, minor, patch);
        Self {
            drop_column: v >= (3, 35, 0),
            generated_columns: v >= (3, 31, 0),
            rename_column: v >= (3, 25, 0),
        }
    }
}

impl Default for BackendCapabilities {
    /// Everything on — what any SQLite from the last few years
    /// supports.
    fn default() -> Self {
        Self {
            drop_column: true,
            generated_columns: true,
            rename_column: true,
        }
    }
}

/// The externally observable result of one synchronization call.
///
/// Exactly one outcome is produced per call; a failed call produces an
/// error and no outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The live schema already matched the mapping; nothing executed.
    AlreadyInSync,
    /// The table did not exist and was created.
    NewTableCreated,
    /// Undeclared columns were present; they were dropped, or kept
    /// when preservation was requested.
    OldColumnsRemoved,
    /// Declared columns were missing and were added in place.
    NewColumnsAdded,
    /// Both of the above in one call.
    NewColumnsAddedAndOldColumnsRemoved,
    /// The table was rebuilt: recreated under a temporary name, data
    /// copied, original dropped, temporary renamed into place.
    DroppedAndRecreated,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AlreadyInSync => "already in sync",
            Self::NewTableCreated => "new table created",
            Self::OldColumnsRemoved => "old columns removed",
            Self::NewColumnsAdded => "new columns added",
            Self::NewColumnsAddedAndOldColumnsRemoved => {
                "new columns added and old columns removed"
            }
            Self::DroppedAndRecreated => "dropped and recreated",
        };
        f.write_str(text)
    }
}

/// What the executor must do to reach the planned outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// No statements to execute.
    Nothing,
    /// Emit one `CREATE TABLE` from the declared schema.
    CreateTable,
    /// Create-copy-drop-rename.
    Rebuild,
    /// In-place alteration: `DROP COLUMN` per entry in `drop`, then
    /// `ADD COLUMN` per entry in `add`. Both lists name declared or
    /// excess columns; either may be empty.
    AlterInPlace {
        /// Excess columns to drop (empty when preserving).
        drop: Vec<String>,
        /// Declared columns to add.
        add: Vec<String>,
    },
}

/// A planned synchronization: the outcome to report and the action
/// that reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// The outcome `synchronize` will report on success.
    pub outcome: SyncOutcome,
    /// The DDL work to perform.
    pub action: SyncAction,
}

impl SyncPlan {
    fn rebuild() -> Self {
        Self {
            outcome: SyncOutcome::DroppedAndRecreated,
            action: SyncAction::Rebuild,
        }
    }
}

/// Decides how to reconcile one table.
///
/// Total over every combination of inputs; rebuild dominates
/// column-adds whenever both are implicated, since adding columns to a
/// table that is about to be rebuilt would be wasted work.
#[must_use]
pub fn plan_sync(
    table_exists: bool,
    delta: &SchemaDelta,
    preserve_extra_columns: bool,
    caps: &BackendCapabilities,
) -> SyncPlan {
    if !table_exists {
        return SyncPlan {
            outcome: SyncOutcome::NewTableCreated,
            action: SyncAction::CreateTable,
        };
    }

    if delta.structurally_different {
        return SyncPlan::rebuild();
    }

    let has_excess = !delta.excess.is_empty();
    let mut drop = Vec::new();
    if has_excess {
        if !preserve_extra_columns {
            if !caps.drop_column {
                // No native DROP COLUMN: removing the extras means
                // rebuilding the whole table.
                return SyncPlan::rebuild();
            }
            drop = delta.excess.iter().map(|c| c.name.clone()).collect();
        }
        // With preservation requested the extras stay in place, but
        // the table still reports as pruned rather than in sync.
    }

    let mut add = Vec::new();
    for col in &delta.to_add {
        match col.generated {
            // Stored generated columns cannot be appended to an
            // existing table.
            Some(GeneratedKind::Stored) => return SyncPlan::rebuild(),
            // Virtual ones can: their values are computed on read, so
            // existing rows need no backfill.
            Some(GeneratedKind::Virtual) => add.push(col.name.clone()),
            None => {
                if col.not_null && col.default_value.is_none() {
                    // Un-addable: existing rows would have no value to
                    // satisfy the constraint.
                    return SyncPlan::rebuild();
                }
                add.push(col.name.clone());
            }
        }
    }

    let outcome = match (add.is_empty(), has_excess) {
        (false, true) => SyncOutcome::NewColumnsAddedAndOldColumnsRemoved,
        (false, false) => SyncOutcome::NewColumnsAdded,
        (true, true) => SyncOutcome::OldColumnsRemoved,
        (true, false) => SyncOutcome::AlreadyInSync,
    };
    let action = if add.is_empty() && drop.is_empty() {
        SyncAction::Nothing
    } else {
        SyncAction::AlterInPlace { drop, add }
    };

    SyncPlan { outcome, action }
}
