//! Column-level schema diffing.
//!
//! Compares the declared descriptor list against the live one and
//! partitions the result into missing columns, a structural-mismatch
//! flag, and excess columns. The planner consumes the delta as-is;
//! no DDL decisions are made here.

use crate::info::ColumnInfo;

/// Result of comparing a declared column list against the actual one.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDelta {
    /// Declared columns absent from the actual schema.
    pub to_add: Vec<ColumnInfo>,
    /// True if any name-matched pair disagrees on NOT NULL, default
    /// presence, or primary-key position.
    pub structurally_different: bool,
    /// Columns present in the database but not declared: whatever is
    /// left of the actual list after consuming all name matches.
    pub excess: Vec<ColumnInfo>,
}

impl SchemaDelta {
    /// Returns `true` if the two schemas are indistinguishable to the
    /// engine.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.to_add.is_empty() && !self.structurally_different && self.excess.is_empty()
    }
}

/// Diffs `declared` against `actual`, matching columns by name.
///
/// Each declared column is looked up in a working copy of the actual
/// list (linear scan; column counts are small). A match is consumed
/// from the working copy whether or not it is structurally equal. On
/// the first structurally unequal match the scan stops: the only
/// remedy is a full rebuild, so finer classification of the remaining
/// columns would be unused.
#[must_use]
pub fn diff_columns(declared: &[ColumnInfo], actual: &[ColumnInfo]) -> SchemaDelta {
    let mut remaining: Vec<ColumnInfo> = actual.to_vec();
    let mut to_add = Vec::new();
    let mut structurally_different = false;

    for col in declared {
        match remaining.iter().position(|a| a.name == col.name) {
            None => to_add.push(col.clone()),
            Some(idx) => {
                let matched = remaining.remove(idx);
                if !col.matches(&matched) {
                    structurally_different = true;
                    break;
                }
            }
        }
    }

    SchemaDelta {
        to_add,
        structurally_different,
        excess: remaining,
    }
}
