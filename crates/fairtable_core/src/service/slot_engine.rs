//! Single-pass slot assignment engine.
//!
//! # Responsibility
//! - Walk slots in `(row, slot_id)` order exactly once.
//! - Consume projects strictly in input order, never rewinding.
//! - Emit exactly one `SlotAssignment` per input slot.
//!
//! # Invariants
//! - Reserved slots are always unassigned and never consume a project.
//! - A team project starts on an odd slot that is not its row's last slot
//!   and occupies that slot plus the next one in the walk.
//! - A blank spacing slot is inserted at most once per category, and only
//!   when the category neither starts a row nor follows a row-end finish.
//! - No backtracking: an emitted record is never revisited.

use crate::layout::geometry::{GeometryError, RowGeometry};
use crate::model::slot::{Project, ProjectId, RowNumber, Slot, SlotAssignment, SlotId};
use log::{debug, trace, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors detected before the pass starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    /// Project category is blank after trim.
    EmptyCategory { project_id: ProjectId },
    /// Slot ids are 1-based.
    InvalidSlotId { row: RowNumber },
    /// The same `(row, slot_id)` appears twice.
    DuplicateSlot { row: RowNumber, slot_id: SlotId },
    /// A row cannot be resolved to a slot count.
    Geometry(GeometryError),
}

impl Display for AssignError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCategory { project_id } => {
                write!(f, "project {project_id} has an empty category")
            }
            Self::InvalidSlotId { row } => write!(f, "row {row} contains slot id 0"),
            Self::DuplicateSlot { row, slot_id } => {
                write!(f, "slot {slot_id} of row {row} appears more than once")
            }
            Self::Geometry(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssignError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Geometry(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GeometryError> for AssignError {
    fn from(value: GeometryError) -> Self {
        Self::Geometry(value)
    }
}

/// Why a slot ended up the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDecision {
    Reserved,
    NoProjectsLeft,
    /// Team project cannot start on the last slot of a row.
    TeamAtRowEnd,
    /// Blank gap before a new category.
    CategorySpacing,
    /// Team project must start on an odd slot.
    TeamEvenStart,
    /// Team project would spill onto a reserved slot.
    TeamPartnerReserved,
    /// Project placed; first slot of a team.
    Placed,
    /// Second slot of a team placed on the previous slot.
    TeamSecondHalf,
}

/// Full result of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignmentRun {
    /// One record per slot, in `(row, slot_id)` order.
    pub assignments: Vec<SlotAssignment>,
    /// Parallel to `assignments`.
    pub decisions: Vec<SlotDecision>,
    /// Count of projects taken from the front of the queue.
    pub projects_consumed: usize,
}

impl AssignmentRun {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            assignments: Vec::with_capacity(capacity),
            decisions: Vec::with_capacity(capacity),
            projects_consumed: 0,
        }
    }

    fn push(&mut self, assignment: SlotAssignment, decision: SlotDecision) {
        trace!(
            "event=slot_decision module=engine row={} slot={} decision={:?} project={:?}",
            assignment.row,
            assignment.slot_id,
            decision,
            assignment.project_id()
        );
        self.assignments.push(assignment);
        self.decisions.push(decision);
    }

    fn push_empty(&mut self, slot: &Slot, decision: SlotDecision) {
        self.push(SlotAssignment::unassigned(slot.row, slot.slot_id), decision);
    }

    fn push_placed(&mut self, slot: &Slot, project: &Project, decision: SlotDecision) {
        self.push(
            SlotAssignment::assigned(slot.row, slot.slot_id, project),
            decision,
        );
    }
}

/// State threaded through one pass; reset per run.
#[derive(Debug, Default)]
struct PassState {
    project_cursor: usize,
    previous_ended_at_row_end: bool,
    category_spacing_used: bool,
}

/// Greedy forward-only slot filler.
pub struct SlotAssignmentEngine<'g> {
    geometry: &'g RowGeometry,
}

impl<'g> SlotAssignmentEngine<'g> {
    pub fn new(geometry: &'g RowGeometry) -> Self {
        Self { geometry }
    }

    /// Assigns projects to slots and returns one record per slot.
    ///
    /// # Errors
    /// - Returns an error when inputs fail validation (blank category,
    ///   slot id 0, duplicate slot, unresolvable row).
    pub fn assign(
        &self,
        slots: &[Slot],
        projects: &[Project],
    ) -> Result<Vec<SlotAssignment>, AssignError> {
        Ok(self.assign_traced(slots, projects)?.assignments)
    }

    /// Same as [`Self::assign`], also reporting a decision per slot.
    pub fn assign_traced(
        &self,
        slots: &[Slot],
        projects: &[Project],
    ) -> Result<AssignmentRun, AssignError> {
        validate_projects(projects)?;
        let ordered = self.ordered_slots(slots)?;

        let mut state = PassState::default();
        let mut run = AssignmentRun::with_capacity(ordered.len());
        let mut index = 0usize;

        while let Some(&slot) = ordered.get(index) {
            index += 1;

            if slot.reserved {
                run.push_empty(slot, SlotDecision::Reserved);
                continue;
            }

            let Some(project) = projects.get(state.project_cursor) else {
                run.push_empty(slot, SlotDecision::NoProjectsLeft);
                continue;
            };

            let at_row_end = self.geometry.is_row_end(slot.row, slot.slot_id)?;

            if project.is_team && at_row_end {
                run.push_empty(slot, SlotDecision::TeamAtRowEnd);
                continue;
            }

            if project.is_first_in_category
                && slot.slot_id > 1
                && !state.previous_ended_at_row_end
                && !state.category_spacing_used
            {
                state.category_spacing_used = true;
                run.push_empty(slot, SlotDecision::CategorySpacing);
                continue;
            }

            if project.is_team && slot.slot_id % 2 == 0 {
                run.push_empty(slot, SlotDecision::TeamEvenStart);
                continue;
            }

            if project.is_team && ordered.get(index).is_some_and(|next| next.reserved) {
                run.push_empty(slot, SlotDecision::TeamPartnerReserved);
                continue;
            }

            run.push_placed(slot, project, SlotDecision::Placed);
            if project.is_team {
                match ordered.get(index) {
                    Some(&partner) => {
                        index += 1;
                        run.push_placed(partner, project, SlotDecision::TeamSecondHalf);
                        state.previous_ended_at_row_end =
                            self.geometry.is_row_end(partner.row, partner.slot_id)?;
                    }
                    None => warn!(
                        "event=team_partial_placement module=engine status=warn project={} row={} slot={}",
                        project.project_id, slot.row, slot.slot_id
                    ),
                }
            } else {
                state.previous_ended_at_row_end = at_row_end;
            }

            state.project_cursor += 1;
            if projects
                .get(state.project_cursor)
                .is_some_and(|next| next.category != project.category)
            {
                state.category_spacing_used = false;
            }
        }

        run.projects_consumed = state.project_cursor;
        debug!(
            "event=assign_pass module=engine status=ok slots={} projects={} consumed={}",
            run.assignments.len(),
            projects.len(),
            run.projects_consumed
        );
        Ok(run)
    }

    /// Sorts slots by `(row, slot_id)` and rejects malformed layouts.
    fn ordered_slots<'s>(&self, slots: &'s [Slot]) -> Result<Vec<&'s Slot>, AssignError> {
        let mut ordered = slots.iter().collect::<Vec<_>>();
        ordered.sort_by_key(|slot| (slot.row, slot.slot_id));

        let mut rows = BTreeSet::new();
        for pair in ordered.windows(2) {
            if (pair[0].row, pair[0].slot_id) == (pair[1].row, pair[1].slot_id) {
                return Err(AssignError::DuplicateSlot {
                    row: pair[1].row,
                    slot_id: pair[1].slot_id,
                });
            }
        }
        for slot in &ordered {
            if slot.slot_id == 0 {
                return Err(AssignError::InvalidSlotId { row: slot.row });
            }
            if rows.insert(slot.row) {
                self.geometry.slot_count(slot.row)?;
            }
        }
        Ok(ordered)
    }
}

fn validate_projects(projects: &[Project]) -> Result<(), AssignError> {
    match projects
        .iter()
        .find(|project| project.category.trim().is_empty())
    {
        Some(project) => Err(AssignError::EmptyCategory {
            project_id: project.project_id,
        }),
        None => Ok(()),
    }
}
