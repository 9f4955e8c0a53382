//! Domain model for floor-plan slot assignment.
//!
//! # Responsibility
//! - Define the immutable inputs (`Slot`, `Project`) consumed by the engine.
//! - Define the per-slot output record (`SlotAssignment`).
//! - Define the records of the scoring-based matching mode.
//!
//! # Invariants
//! - A `Slot` is identified by `(row, slot_id)`.
//! - A `SlotAssignment` is unassigned exactly when it carries no placement.

pub mod matching;
pub mod slot;
