//! Flat-file import/export.
//!
//! # Responsibility
//! - Read slots and projects, write and re-read assignment results.
//! - Keep column names identical to the exchange format used by existing
//!   data files.
//!
//! # Invariants
//! - Columns are located by header name; column order is free.
//! - Required identity fields never fall back to defaults.

pub mod csv_codec;
