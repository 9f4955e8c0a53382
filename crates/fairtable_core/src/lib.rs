//! Core domain logic for fairtable.
//! Slot assignment, table numbering, layout rendering and run summaries for
//! science-fair floor plans.

pub mod config;
pub mod io;
pub mod layout;
pub mod logging;
pub mod model;
pub mod render;
pub mod service;

pub use config::{ConfigError, FairConfig, GeometrySource, LOG_LEVEL_ENV};
pub use io::csv_codec::{CsvIoError, CsvResult};
pub use layout::geometry::{GeometryError, RowGeometry, DEFAULT_ROW_SLOTS};
pub use layout::numbering::{
    build_floor_layout, group_by_row, number_tables, Direction, FloorLayout, LayoutError,
    LayoutOptions, LayoutStats, RowLayout, TableCell, TableKind,
};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget, LoggingError,
};
pub use model::matching::{MatchAssignment, MatchProject, MatchTable};
pub use model::slot::{Placement, Project, ProjectId, RowNumber, Slot, SlotAssignment, SlotId};
pub use render::render_json;
pub use render::text::render_text;
pub use service::matching::{assign_by_score, MatchSummary};
pub use service::pipeline::{
    inspect_inputs, render_from_assignments, run_assignment, run_matching, AssignmentRequest,
    CancelToken, InputOverview, MatchReport, MatchRequest, PipelineError, PipelineReport,
    RenderFormat,
};
pub use service::slot_engine::{AssignError, AssignmentRun, SlotAssignmentEngine, SlotDecision};
pub use service::summary::{AssignmentSummary, UnassignedProject};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
