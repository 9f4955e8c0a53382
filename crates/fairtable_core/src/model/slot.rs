//! Slot, project and assignment records.
//!
//! # Responsibility
//! - Carry the slot/project fields of the import contract.
//! - Provide the output record shape of the assignment engine.
//!
//! # Invariants
//! - `SlotAssignment::is_unassigned()` is true iff `placement` is `None`.
//! - Records are read-only once produced; only re-hydration from an
//!   exported file builds `SlotAssignment` outside the engine.

use serde::{Deserialize, Serialize};

/// Row number on the floor plan (1-based).
pub type RowNumber = u32;
/// Slot number within one row (1-based).
pub type SlotId = u32;
/// External project identifier.
pub type ProjectId = u32;

/// One physical position in a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub row: RowNumber,
    /// Slot count declared for this row by the slots input.
    pub row_slot_count: u32,
    pub slot_id: SlotId,
    /// Reserved slots are never assigned.
    pub reserved: bool,
}

impl Slot {
    pub fn new(row: RowNumber, row_slot_count: u32, slot_id: SlotId, reserved: bool) -> Self {
        Self {
            row,
            row_slot_count,
            slot_id,
            reserved,
        }
    }

    /// Returns whether this slot may receive a project.
    pub fn is_available(&self) -> bool {
        !self.reserved
    }
}

/// One project waiting for placement.
///
/// Input order is the consumption order; projects sharing a category are
/// expected to be contiguous, with `is_first_in_category` on the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    /// Team projects occupy two consecutive slots.
    pub is_team: bool,
    pub is_first_in_category: bool,
    pub category: String,
}

impl Project {
    pub fn new(
        project_id: ProjectId,
        is_team: bool,
        is_first_in_category: bool,
        category: impl Into<String>,
    ) -> Self {
        Self {
            project_id,
            is_team,
            is_first_in_category,
            category: category.into(),
        }
    }
}

/// Project data copied onto an assigned slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub project_id: ProjectId,
    pub is_team: bool,
    pub category: String,
}

impl From<&Project> for Placement {
    fn from(project: &Project) -> Self {
        Self {
            project_id: project.project_id,
            is_team: project.is_team,
            category: project.category.clone(),
        }
    }
}

/// Assignment result for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub row: RowNumber,
    pub slot_id: SlotId,
    /// `None` for reserved, spacing, skipped or leftover slots.
    pub placement: Option<Placement>,
}

impl SlotAssignment {
    /// Builds an empty record for one slot.
    pub fn unassigned(row: RowNumber, slot_id: SlotId) -> Self {
        Self {
            row,
            slot_id,
            placement: None,
        }
    }

    /// Builds a record holding `project`.
    pub fn assigned(row: RowNumber, slot_id: SlotId, project: &Project) -> Self {
        Self {
            row,
            slot_id,
            placement: Some(Placement::from(project)),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.placement.is_none()
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.placement.as_ref().map(|placement| placement.project_id)
    }

    /// Returns `true` only for slots held by a team project.
    pub fn is_team(&self) -> bool {
        self.placement
            .as_ref()
            .is_some_and(|placement| placement.is_team)
    }

    pub fn category(&self) -> Option<&str> {
        self.placement
            .as_ref()
            .map(|placement| placement.category.as_str())
    }
}
