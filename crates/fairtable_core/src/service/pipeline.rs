//! End-to-end runs over files.
//!
//! # Responsibility
//! - Chain CSV loading, assignment, numbering, rendering and summary.
//! - Write run artifacts into one output directory.
//!
//! # Invariants
//! - Every run carries a fresh `run_id` that appears in all its log events.
//! - Cancellation is only observed between stages; a stage never stops halfway.
//! - Nothing is written before assignment and layout both succeed.

use crate::config::{ConfigError, FairConfig};
use crate::io::csv_codec::{
    self, read_assignments_path, read_match_projects_path, read_match_tables_path,
    read_projects_path, read_slots_path, write_assignments_path, write_match_assignments_path,
    CsvIoError,
};
use crate::layout::numbering::{
    build_floor_layout, group_by_row, FloorLayout, LayoutError, LayoutOptions, LayoutStats,
};
use crate::model::slot::{Project, Slot};
use crate::render::render_json;
use crate::render::text::render_text;
use crate::service::matching::{assign_by_score, MatchSummary};
use crate::service::slot_engine::{AssignError, SlotAssignmentEngine};
use crate::service::summary::AssignmentSummary;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub const ASSIGNMENTS_FILE: &str = "assignments.csv";
pub const LAYOUT_TEXT_FILE: &str = "layout.txt";
pub const LAYOUT_JSON_FILE: &str = "layout.json";
pub const SUMMARY_FILE: &str = "summary.txt";
const OUTPUT_DIR_PREFIX: &str = "fairtable-output-";

/// Errors from pipeline runs.
#[derive(Debug)]
pub enum PipelineError {
    Csv(CsvIoError),
    Config(ConfigError),
    Assign(AssignError),
    Layout(LayoutError),
    Json(serde_json::Error),
    /// Failure writing an artifact or creating the output directory.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The cancel token was set before `stage` started.
    Cancelled { stage: &'static str },
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Assign(err) => write!(f, "assignment failed: {err}"),
            Self::Layout(err) => write!(f, "layout failed: {err}"),
            Self::Json(err) => write!(f, "json rendering failed: {err}"),
            Self::Io { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
            Self::Cancelled { stage } => write!(f, "run cancelled before stage `{stage}`"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Assign(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }
}

impl From<CsvIoError> for PipelineError {
    fn from(value: CsvIoError) -> Self {
        Self::Csv(value)
    }
}

impl From<ConfigError> for PipelineError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<AssignError> for PipelineError {
    fn from(value: AssignError) -> Self {
        Self::Assign(value)
    }
}

impl From<LayoutError> for PipelineError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Shared cancellation flag.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Output format for a rendered layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Text,
    Json,
}

/// Inputs of one assignment run.
#[derive(Debug, Clone)]
pub struct AssignmentRequest {
    pub slots_path: PathBuf,
    pub projects_path: PathBuf,
    /// `fairtable-output-<run id prefix>` in the working directory when `None`.
    pub output_dir: Option<PathBuf>,
    pub config: FairConfig,
    pub cancel: CancelToken,
}

impl AssignmentRequest {
    pub fn new(slots_path: impl Into<PathBuf>, projects_path: impl Into<PathBuf>) -> Self {
        Self {
            slots_path: slots_path.into(),
            projects_path: projects_path.into(),
            output_dir: None,
            config: FairConfig::default(),
            cancel: CancelToken::default(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_config(mut self, config: FairConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Artifacts and counts of a finished assignment run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub output_dir: PathBuf,
    pub assignments_path: PathBuf,
    pub layout_text_path: PathBuf,
    pub layout_json_path: PathBuf,
    pub summary_path: PathBuf,
    pub summary: AssignmentSummary,
    pub stats: LayoutStats,
}

/// Default output directory name for `run_id`.
pub fn default_output_dir(run_id: &Uuid) -> PathBuf {
    let simple = run_id.simple().to_string();
    PathBuf::from(format!("{OUTPUT_DIR_PREFIX}{}", &simple[..8]))
}

/// Runs the full assignment flow and writes its artifacts.
///
/// # Side effects
/// - Creates the output directory when missing.
/// - Writes `assignments.csv`, `layout.txt`, `layout.json`, `summary.txt`.
/// - Emits `pipeline_stage` and `pipeline_run` logging events.
///
/// # Errors
/// - Any load, validation, layout or write failure.
/// - [`PipelineError::Cancelled`] when the token is set between stages.
pub fn run_assignment(request: &AssignmentRequest) -> PipelineResult<PipelineReport> {
    let run_id = Uuid::new_v4();
    let started_at = Instant::now();
    info!("event=pipeline_run module=pipeline status=start run_id={run_id} mode=assign");

    match execute_assignment(run_id, request) {
        Ok(report) => {
            info!(
                "event=pipeline_run module=pipeline status=ok run_id={} duration_ms={} assigned_projects={} unassigned_projects={} output_dir={}",
                run_id,
                started_at.elapsed().as_millis(),
                report.summary.assigned_projects,
                report.summary.unassigned_projects,
                report.output_dir.display()
            );
            Ok(report)
        }
        Err(err) => {
            error!(
                "event=pipeline_run module=pipeline status=error run_id={} duration_ms={} error={}",
                run_id,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn execute_assignment(run_id: Uuid, request: &AssignmentRequest) -> PipelineResult<PipelineReport> {
    let stage = Stages::new(run_id, &request.cancel);

    stage.enter("load")?;
    let slots = read_slots_path(&request.slots_path)?;
    let projects = read_projects_path(&request.projects_path)?;
    info!(
        "event=inputs_loaded module=pipeline status=ok run_id={run_id} slots={} projects={}",
        slots.len(),
        projects.len()
    );

    stage.enter("assign")?;
    let geometry = request.config.row_geometry(&slots)?;
    let assignments = SlotAssignmentEngine::new(&geometry).assign(&slots, &projects)?;

    stage.enter("layout")?;
    let layout = build_floor_layout(&group_by_row(&assignments), &request.config.layout_options())?;
    let layout_text = render_text(&layout);
    let layout_json = render_json(&layout)?;
    let summary = AssignmentSummary::from_run(&slots, &projects, &assignments);

    stage.enter("write")?;
    let output_dir = request
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&run_id));
    std::fs::create_dir_all(&output_dir).map_err(|source| PipelineError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let assignments_path = output_dir.join(ASSIGNMENTS_FILE);
    let layout_text_path = output_dir.join(LAYOUT_TEXT_FILE);
    let layout_json_path = output_dir.join(LAYOUT_JSON_FILE);
    let summary_path = output_dir.join(SUMMARY_FILE);

    write_assignments_path(&assignments_path, &assignments)?;
    write_text(&layout_text_path, &layout_text)?;
    write_text(&layout_json_path, &layout_json)?;
    write_text(&summary_path, &summary.to_string())?;

    Ok(PipelineReport {
        run_id,
        output_dir,
        assignments_path,
        layout_text_path,
        layout_json_path,
        summary_path,
        stats: layout.stats(),
        summary,
    })
}

/// Re-hydrates an exported assignment file and renders its layout.
pub fn render_from_assignments(
    assignments_path: &Path,
    options: &LayoutOptions,
    format: RenderFormat,
) -> PipelineResult<String> {
    let layout = layout_from_assignments(assignments_path, options)?;
    info!(
        "event=layout_render module=pipeline status=ok format={:?} rows={}",
        format,
        layout.rows.len()
    );
    match format {
        RenderFormat::Text => Ok(render_text(&layout)),
        RenderFormat::Json => Ok(render_json(&layout)?),
    }
}

/// Re-hydrates an exported assignment file into a display layout.
pub fn layout_from_assignments(
    assignments_path: &Path,
    options: &LayoutOptions,
) -> PipelineResult<FloorLayout> {
    let assignments = read_assignments_path(assignments_path)?;
    Ok(build_floor_layout(&group_by_row(&assignments), options)?)
}

/// Inputs of one scoring-mode run.
#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub projects_path: PathBuf,
    pub tables_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MatchReport {
    pub run_id: Uuid,
    pub output_path: PathBuf,
    pub summary: MatchSummary,
}

/// Runs the scoring mode and writes the assignment CSV.
pub fn run_matching(request: &MatchRequest) -> PipelineResult<MatchReport> {
    let run_id = Uuid::new_v4();
    let started_at = Instant::now();
    info!("event=pipeline_run module=pipeline status=start run_id={run_id} mode=match");

    let outcome = execute_matching(run_id, request);

    match &outcome {
        Ok(report) => info!(
            "event=pipeline_run module=pipeline status=ok run_id={} duration_ms={} assigned_tables={} unassigned_projects={}",
            run_id,
            started_at.elapsed().as_millis(),
            report.summary.assigned_tables,
            report.summary.unassigned.len()
        ),
        Err(err) => error!(
            "event=pipeline_run module=pipeline status=error run_id={} duration_ms={} error={}",
            run_id,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    outcome
}

fn execute_matching(run_id: Uuid, request: &MatchRequest) -> PipelineResult<MatchReport> {
    let projects = read_match_projects_path(&request.projects_path)?;
    let tables = read_match_tables_path(&request.tables_path)?;
    let assignments = assign_by_score(&projects, &tables);
    write_match_assignments_path(&request.output_path, &assignments, &projects)?;
    Ok(MatchReport {
        run_id,
        output_path: request.output_path.clone(),
        summary: MatchSummary::from_run(&assignments, &projects),
    })
}

/// Quick look at the two assignment inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOverview {
    pub slot_count: usize,
    pub reserved_count: usize,
    pub row_count: usize,
    pub first_slot: Option<Slot>,
    pub last_slot: Option<Slot>,
    pub project_count: usize,
    pub team_count: usize,
    pub first_project: Option<Project>,
    pub last_project: Option<Project>,
}

/// Loads both inputs and summarizes them without assigning.
pub fn inspect_inputs(slots_path: &Path, projects_path: &Path) -> PipelineResult<InputOverview> {
    let slots = read_slots_path(slots_path)?;
    let projects = read_projects_path(projects_path)?;
    let mut rows = slots.iter().map(|slot| slot.row).collect::<Vec<_>>();
    rows.sort_unstable();
    rows.dedup();

    Ok(InputOverview {
        slot_count: slots.len(),
        reserved_count: slots.iter().filter(|slot| slot.reserved).count(),
        row_count: rows.len(),
        first_slot: slots.first().cloned(),
        last_slot: slots.last().cloned(),
        project_count: projects.len(),
        team_count: projects.iter().filter(|project| project.is_team).count(),
        first_project: projects.first().cloned(),
        last_project: projects.last().cloned(),
    })
}

impl Display for InputOverview {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Slots: {} ({} reserved) across {} rows",
            self.slot_count, self.reserved_count, self.row_count
        )?;
        if let Some(slot) = &self.first_slot {
            writeln!(f, "First slot: {}", describe_slot(slot))?;
        }
        if let Some(slot) = &self.last_slot {
            writeln!(f, "Last slot: {}", describe_slot(slot))?;
        }
        writeln!(
            f,
            "Projects: {} ({} teams)",
            self.project_count, self.team_count
        )?;
        if let Some(project) = &self.first_project {
            writeln!(f, "First project: {}", describe_project(project))?;
        }
        if let Some(project) = &self.last_project {
            writeln!(f, "Last project: {}", describe_project(project))?;
        }
        Ok(())
    }
}

fn describe_slot(slot: &Slot) -> String {
    format!(
        "{}={} {}={} {}={} {}={}",
        csv_codec::SLOT_COLUMNS[0],
        slot.row,
        csv_codec::SLOT_COLUMNS[1],
        slot.row_slot_count,
        csv_codec::SLOT_COLUMNS[2],
        slot.slot_id,
        csv_codec::SLOT_COLUMNS[3],
        csv_codec::format_flag(slot.reserved)
    )
}

fn describe_project(project: &Project) -> String {
    format!(
        "{}={} {}={} {}={} {}={}",
        csv_codec::PROJECT_COLUMNS[0],
        project.project_id,
        csv_codec::PROJECT_COLUMNS[1],
        csv_codec::format_flag(project.is_team),
        csv_codec::PROJECT_COLUMNS[2],
        csv_codec::format_flag(project.is_first_in_category),
        csv_codec::PROJECT_COLUMNS[3],
        project.category
    )
}

fn write_text(path: &Path, contents: &str) -> PipelineResult<()> {
    std::fs::write(path, contents).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

struct Stages<'a> {
    run_id: Uuid,
    cancel: &'a CancelToken,
}

impl<'a> Stages<'a> {
    fn new(run_id: Uuid, cancel: &'a CancelToken) -> Self {
        Self { run_id, cancel }
    }

    fn enter(&self, stage: &'static str) -> PipelineResult<()> {
        if self.cancel.is_cancelled() {
            info!(
                "event=pipeline_stage module=pipeline status=cancelled run_id={} stage={stage}",
                self.run_id
            );
            return Err(PipelineError::Cancelled { stage });
        }
        info!(
            "event=pipeline_stage module=pipeline status=start run_id={} stage={stage}",
            self.run_id
        );
        Ok(())
    }
}
