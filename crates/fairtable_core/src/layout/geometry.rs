//! Row geometry resolver.
//!
//! # Responsibility
//! - Map a row number to its slot count.
//! - Answer "is this the last slot of its row" for the engine.
//!
//! # Invariants
//! - Explicit row entries win over the fallback.
//! - Without a fallback, unknown rows are an error rather than a guess.

use crate::model::slot::{RowNumber, Slot, SlotId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot count used by the default venue for rows it does not list.
pub const DEFAULT_ROW_SLOTS: u32 = 12;

/// Geometry lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Row has no table entry and no fallback is configured.
    UnknownRow(RowNumber),
    /// A row was configured with zero slots.
    EmptyRow(RowNumber),
    /// The fallback slot count is zero.
    EmptyFallback,
}

impl Display for GeometryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRow(row) => {
                write!(f, "row {row} has no slot count and no fallback is configured")
            }
            Self::EmptyRow(row) => write!(f, "row {row} is configured with zero slots"),
            Self::EmptyFallback => write!(f, "fallback row slot count must be positive"),
        }
    }
}

impl Error for GeometryError {}

/// Row-number to slot-count table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowGeometry {
    rows: BTreeMap<RowNumber, u32>,
    fallback: Option<u32>,
}

impl RowGeometry {
    /// Builds a geometry from explicit entries.
    pub fn new(
        rows: BTreeMap<RowNumber, u32>,
        fallback: Option<u32>,
    ) -> Result<Self, GeometryError> {
        if let Some((&row, _)) = rows.iter().find(|&(_, &count)| count == 0) {
            return Err(GeometryError::EmptyRow(row));
        }
        if fallback == Some(0) {
            return Err(GeometryError::EmptyFallback);
        }
        Ok(Self { rows, fallback })
    }

    /// Venue layout the tool was built for: rows 1-3 hold 12 slots,
    /// rows 4-5 hold 14, anything else falls back to 12.
    pub fn venue_default() -> Self {
        let mut rows = BTreeMap::new();
        for row in 1..=3 {
            rows.insert(row, 12);
        }
        for row in 4..=5 {
            rows.insert(row, 14);
        }
        Self {
            rows,
            fallback: Some(DEFAULT_ROW_SLOTS),
        }
    }

    /// Takes each row's count from the slots input (first value per row).
    pub fn from_slots(slots: &[Slot], fallback: Option<u32>) -> Result<Self, GeometryError> {
        let mut rows = BTreeMap::new();
        for slot in slots {
            rows.entry(slot.row).or_insert(slot.row_slot_count);
        }
        Self::new(rows, fallback)
    }

    pub fn fallback(&self) -> Option<u32> {
        self.fallback
    }

    /// Explicitly configured rows, ascending.
    pub fn rows(&self) -> impl Iterator<Item = (RowNumber, u32)> + '_ {
        self.rows.iter().map(|(&row, &count)| (row, count))
    }

    /// Returns the number of slots in `row`.
    pub fn slot_count(&self, row: RowNumber) -> Result<u32, GeometryError> {
        self.rows
            .get(&row)
            .copied()
            .or(self.fallback)
            .ok_or(GeometryError::UnknownRow(row))
    }

    /// Returns whether `slot_id` is the final slot of `row`.
    pub fn is_row_end(&self, row: RowNumber, slot_id: SlotId) -> Result<bool, GeometryError> {
        Ok(slot_id == self.slot_count(row)?)
    }
}

impl Default for RowGeometry {
    fn default() -> Self {
        Self::venue_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{GeometryError, RowGeometry};
    use crate::model::slot::Slot;
    use std::collections::BTreeMap;

    #[test]
    fn venue_default_matches_known_rows_and_falls_back() {
        let geometry = RowGeometry::venue_default();
        assert_eq!(geometry.slot_count(1).unwrap(), 12);
        assert_eq!(geometry.slot_count(3).unwrap(), 12);
        assert_eq!(geometry.slot_count(4).unwrap(), 14);
        assert_eq!(geometry.slot_count(5).unwrap(), 14);
        assert_eq!(geometry.slot_count(9).unwrap(), 12);
        assert!(geometry.is_row_end(4, 14).unwrap());
        assert!(!geometry.is_row_end(4, 12).unwrap());
    }

    #[test]
    fn missing_fallback_rejects_unknown_rows() {
        let geometry = RowGeometry::new(BTreeMap::from([(1, 6)]), None).unwrap();
        assert_eq!(geometry.slot_count(1).unwrap(), 6);
        assert_eq!(geometry.slot_count(2), Err(GeometryError::UnknownRow(2)));
    }

    #[test]
    fn zero_slot_rows_are_rejected() {
        let err = RowGeometry::new(BTreeMap::from([(2, 0)]), Some(12)).unwrap_err();
        assert_eq!(err, GeometryError::EmptyRow(2));
    }

    #[test]
    fn from_slots_uses_first_declared_count_per_row() {
        let slots = vec![
            Slot::new(1, 4, 1, false),
            Slot::new(1, 9, 2, false),
            Slot::new(2, 6, 1, true),
        ];
        let geometry = RowGeometry::from_slots(&slots, None).unwrap();
        assert_eq!(geometry.slot_count(1).unwrap(), 4);
        assert_eq!(geometry.slot_count(2).unwrap(), 6);
        assert!(geometry.slot_count(3).is_err());
    }
}
