//! Floor geometry and table presentation.
//!
//! # Responsibility
//! - Resolve how many slots each row holds.
//! - Group assigned slots into numbered two-slot tables in snake order.

pub mod geometry;
pub mod numbering;
