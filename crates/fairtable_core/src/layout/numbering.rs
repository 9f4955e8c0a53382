//! Table grouping and snake numbering.
//!
//! # Responsibility
//! - Pair consecutive slots of a row into tables (1+2, 3+4, ...).
//! - Number tables globally, row after row, left to right.
//! - Produce a display layout where even rows run right to left, walking
//!   rows in an optional caller-chosen order.
//!
//! # Invariants
//! - Numbering is a pure function of the assignments; walk order and gaps
//!   never change a table number.
//! - A row contributes `floor(slots / 2)` tables to the rows after it, even
//!   when a trailing one-slot table exists and receives its own number.

use crate::model::slot::{ProjectId, RowNumber, SlotAssignment};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Gap after the first, third, fifth... row of the walk.
pub const DEFAULT_SMALL_GAP: u32 = 1;
/// Gap after the second, fourth, sixth... row of the walk.
pub const DEFAULT_LARGE_GAP: u32 = 2;

/// Row-order override errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Override names a row that has no assignments.
    UnknownRow(RowNumber),
    /// Override names the same row twice.
    DuplicateRow(RowNumber),
    /// Override leaves out a row that has assignments.
    MissingRow(RowNumber),
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRow(row) => write!(f, "row order names unknown row {row}"),
            Self::DuplicateRow(row) => write!(f, "row order lists row {row} more than once"),
            Self::MissingRow(row) => write!(f, "row order does not include row {row}"),
        }
    }
}

impl Error for LayoutError {}

/// Horizontal walking direction of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

impl Direction {
    /// Even-numbered rows are displayed mirrored.
    pub fn for_row(row: RowNumber) -> Self {
        if row % 2 == 0 {
            Self::RightToLeft
        } else {
            Self::LeftToRight
        }
    }
}

/// What occupies a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// At least one slot holds a team project.
    Team,
    /// At least one slot holds a solo project and none a team.
    Solo,
    /// No slot holds a project.
    Empty,
}

/// One displayed table: one or two slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub number: u32,
    /// Slot drawn on the left in display order.
    pub left: SlotAssignment,
    pub right: Option<SlotAssignment>,
    pub kind: TableKind,
}

impl TableCell {
    fn new(
        number: u32,
        first: SlotAssignment,
        second: Option<SlotAssignment>,
        direction: Direction,
    ) -> Self {
        let has_team = first.is_team() || second.as_ref().is_some_and(SlotAssignment::is_team);
        let is_empty =
            first.is_unassigned() && second.as_ref().map_or(true, SlotAssignment::is_unassigned);
        let kind = if has_team {
            TableKind::Team
        } else if is_empty {
            TableKind::Empty
        } else {
            TableKind::Solo
        };

        let (left, right) = match (direction, second) {
            (Direction::RightToLeft, Some(second)) => (second, Some(first)),
            (_, second) => (first, second),
        };
        Self {
            number,
            left,
            right,
            kind,
        }
    }

    /// Slots in display order.
    pub fn slots(&self) -> impl Iterator<Item = &SlotAssignment> {
        std::iter::once(&self.left).chain(self.right.iter())
    }
}

/// One displayed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowLayout {
    pub row: RowNumber,
    pub direction: Direction,
    /// Spacing drawn below this row.
    pub gap_after: u32,
    /// Tables in display order.
    pub tables: Vec<TableCell>,
}

/// Full display layout, rows in walk order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FloorLayout {
    pub rows: Vec<RowLayout>,
}

/// Headline counts shown above a rendered layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    pub team_projects: usize,
    pub total_projects: usize,
    pub tables: usize,
}

impl FloorLayout {
    pub fn stats(&self) -> LayoutStats {
        let mut team = BTreeSet::<ProjectId>::new();
        let mut all = BTreeSet::<ProjectId>::new();
        let mut slots = 0usize;
        for slot in self
            .rows
            .iter()
            .flat_map(|row| row.tables.iter())
            .flat_map(TableCell::slots)
        {
            slots += 1;
            if let Some(placement) = &slot.placement {
                all.insert(placement.project_id);
                if placement.is_team {
                    team.insert(placement.project_id);
                }
            }
        }
        LayoutStats {
            team_projects: team.len(),
            total_projects: all.len(),
            tables: slots / 2,
        }
    }
}

/// Caller-supplied presentation overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Walk order of rows; ascending row number when `None`.
    pub row_order: Option<Vec<RowNumber>>,
    /// Per-row gap overrides.
    pub row_gaps: BTreeMap<RowNumber, u32>,
    pub small_gap: u32,
    pub large_gap: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            row_order: None,
            row_gaps: BTreeMap::new(),
            small_gap: DEFAULT_SMALL_GAP,
            large_gap: DEFAULT_LARGE_GAP,
        }
    }
}

impl LayoutOptions {
    /// Gap below the row at `position` (0-based) of the walk.
    pub fn gap_after(&self, row: RowNumber, position: usize) -> u32 {
        self.row_gaps.get(&row).copied().unwrap_or(if position % 2 == 0 {
            self.small_gap
        } else {
            self.large_gap
        })
    }
}

/// Groups assignments by row, each row sorted by slot id.
pub fn group_by_row(assignments: &[SlotAssignment]) -> BTreeMap<RowNumber, Vec<SlotAssignment>> {
    let mut by_row = BTreeMap::<RowNumber, Vec<SlotAssignment>>::new();
    for assignment in assignments {
        by_row
            .entry(assignment.row)
            .or_default()
            .push(assignment.clone());
    }
    for row in by_row.values_mut() {
        row.sort_by_key(|assignment| assignment.slot_id);
    }
    by_row
}

/// Assigns a global number to each table of each row.
///
/// Rows are numbered in ascending row order regardless of how they are
/// later walked for display. The k-th table (1-based) of a row gets
/// `1 + tables_before + (k - 1)`, where `tables_before` sums
/// `floor(slots / 2)` over all lower-numbered rows.
pub fn number_tables(
    by_row: &BTreeMap<RowNumber, Vec<SlotAssignment>>,
) -> BTreeMap<RowNumber, Vec<u32>> {
    let mut numbers = BTreeMap::new();
    let mut tables_before = 0u32;
    for (&row, slots) in by_row {
        let table_count = slots.len().div_ceil(2);
        let row_numbers = (0..table_count)
            .map(|index| 1 + tables_before + index as u32)
            .collect::<Vec<_>>();
        numbers.insert(row, row_numbers);
        tables_before += (slots.len() / 2) as u32;
    }
    numbers
}

/// Builds the display layout in walk order.
pub fn build_floor_layout(
    by_row: &BTreeMap<RowNumber, Vec<SlotAssignment>>,
    options: &LayoutOptions,
) -> Result<FloorLayout, LayoutError> {
    let walk = resolve_row_order(by_row, options.row_order.as_deref())?;
    let numbers = number_tables(by_row);

    let mut rows = Vec::with_capacity(walk.len());
    for (position, row) in walk.into_iter().enumerate() {
        let direction = Direction::for_row(row);
        let slots = by_row.get(&row).map(Vec::as_slice).unwrap_or_default();
        let row_numbers = numbers.get(&row).map(Vec::as_slice).unwrap_or_default();

        let mut tables = slots
            .chunks(2)
            .zip(row_numbers)
            .map(|(pair, &number)| {
                TableCell::new(number, pair[0].clone(), pair.get(1).cloned(), direction)
            })
            .collect::<Vec<_>>();
        if direction == Direction::RightToLeft {
            tables.reverse();
        }

        rows.push(RowLayout {
            row,
            direction,
            gap_after: options.gap_after(row, position),
            tables,
        });
    }
    Ok(FloorLayout { rows })
}

fn resolve_row_order(
    by_row: &BTreeMap<RowNumber, Vec<SlotAssignment>>,
    row_order: Option<&[RowNumber]>,
) -> Result<Vec<RowNumber>, LayoutError> {
    let Some(order) = row_order else {
        return Ok(by_row.keys().copied().collect());
    };

    let mut seen = BTreeSet::new();
    for &row in order {
        if !by_row.contains_key(&row) {
            return Err(LayoutError::UnknownRow(row));
        }
        if !seen.insert(row) {
            return Err(LayoutError::DuplicateRow(row));
        }
    }
    if let Some(&missing) = by_row.keys().find(|row| !seen.contains(*row)) {
        return Err(LayoutError::MissingRow(missing));
    }
    Ok(order.to_vec())
}

#[cfg(test)]
mod tests {
    use super::{resolve_row_order, LayoutError};
    use crate::model::slot::SlotAssignment;
    use std::collections::BTreeMap;

    fn rows(numbers: &[u32]) -> BTreeMap<u32, Vec<SlotAssignment>> {
        numbers
            .iter()
            .map(|&row| (row, vec![SlotAssignment::unassigned(row, 1)]))
            .collect()
    }

    #[test]
    fn resolve_row_order_defaults_to_ascending() {
        assert_eq!(resolve_row_order(&rows(&[3, 1, 2]), None).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn resolve_row_order_validates_override() {
        let by_row = rows(&[1, 2]);
        assert_eq!(
            resolve_row_order(&by_row, Some(&[2, 9])),
            Err(LayoutError::UnknownRow(9))
        );
        assert_eq!(
            resolve_row_order(&by_row, Some(&[2, 2])),
            Err(LayoutError::DuplicateRow(2))
        );
        assert_eq!(
            resolve_row_order(&by_row, Some(&[2])),
            Err(LayoutError::MissingRow(1))
        );
        assert_eq!(resolve_row_order(&by_row, Some(&[2, 1])).unwrap(), vec![2, 1]);
    }
}
