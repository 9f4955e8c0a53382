//! CSV codec for slot, project and assignment files.

use crate::model::matching::{MatchAssignment, MatchProject, MatchTable};
use crate::model::slot::{Placement, Project, Slot, SlotAssignment};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::warn;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const SLOT_COLUMNS: [&str; 4] = ["Row", "rowNumSlots", "tableSlotID", "isReserved"];
pub const PROJECT_COLUMNS: [&str; 4] = ["projectID", "isTeam", "isFirstInCat", "Category"];
pub const ASSIGNMENT_COLUMNS: [&str; 6] = [
    "Row",
    "tableSlotID",
    "isUnassigned",
    "projectID",
    "isTeam",
    "Category",
];
pub const MATCH_PROJECT_COLUMNS: [&str; 9] = [
    "projectId",
    "projectName",
    "studentName",
    "category",
    "grade",
    "requiresElectricity",
    "requiresWater",
    "specialRequirements",
    "estimatedSpace",
];
pub const MATCH_TABLE_COLUMNS: [&str; 9] = [
    "tableId",
    "location",
    "capacity",
    "hasElectricity",
    "hasWater",
    "category",
    "gradeRange",
    "isAccessible",
    "notes",
];
pub const MATCH_ASSIGNMENT_COLUMNS: [&str; 7] = [
    "tableId",
    "projectId",
    "studentName",
    "projectName",
    "category",
    "assignmentReason",
    "compatibilityScore",
];

const DEFAULT_ESTIMATED_SPACE: u32 = 10;
const DEFAULT_TABLE_CAPACITY: u32 = 20;

/// CSV import/export errors.
#[derive(Debug)]
pub enum CsvIoError {
    /// File could not be opened or created.
    File { path: PathBuf, source: std::io::Error },
    Io(std::io::Error),
    Csv(csv::Error),
    /// Header row lacks a required column.
    MissingColumn { column: &'static str },
    /// A field could not be interpreted.
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for CsvIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { path, source } => write!(f, "cannot access `{}`: {source}", path.display()),
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "malformed csv: {err}"),
            Self::MissingColumn { column } => write!(f, "missing required column `{column}`"),
            Self::InvalidField {
                line,
                column,
                value,
                reason,
            } => write!(
                f,
                "line {line}, column `{column}`: {reason} (got `{value}`)"
            ),
        }
    }
}

impl Error for CsvIoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::File { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::MissingColumn { .. } | Self::InvalidField { .. } => None,
        }
    }
}

impl From<std::io::Error> for CsvIoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for CsvIoError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type CsvResult<T> = Result<T, CsvIoError>;

/// Parses `TRUE/FALSE`, `YES/NO`, `1/0` (case-insensitive).
///
/// Empty input reads as `false`; anything else is `None`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRUE" | "YES" | "1" => Some(true),
        "FALSE" | "NO" | "0" | "" => Some(false),
        _ => None,
    }
}

/// Writes the `TRUE`/`FALSE` form used by exports.
pub fn format_flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Header name to column position.
struct Columns {
    positions: BTreeMap<String, usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), index))
            .collect();
        Self { positions }
    }

    fn require(&self, columns: &[&'static str]) -> CsvResult<()> {
        match columns
            .iter()
            .find(|column| !self.positions.contains_key(**column))
        {
            Some(column) => Err(CsvIoError::MissingColumn { column: *column }),
            None => Ok(()),
        }
    }

    fn row<'r>(&'r self, record: &'r StringRecord) -> Row<'r> {
        Row {
            columns: self,
            record,
            line: record.position().map_or(0, csv::Position::line),
        }
    }
}

/// One data record with header-based access.
struct Row<'r> {
    columns: &'r Columns,
    record: &'r StringRecord,
    line: u64,
}

impl Row<'_> {
    fn text(&self, column: &'static str) -> &str {
        self.columns
            .positions
            .get(column)
            .and_then(|&index| self.record.get(index))
            .map_or("", str::trim)
    }

    fn invalid(&self, column: &'static str, reason: &'static str) -> CsvIoError {
        CsvIoError::InvalidField {
            line: self.line,
            column,
            value: self.text(column).to_string(),
            reason,
        }
    }

    fn required_u32(&self, column: &'static str) -> CsvResult<u32> {
        let value = self.text(column);
        if value.is_empty() {
            return Err(self.invalid(column, "required value is empty"));
        }
        value
            .parse::<u32>()
            .map_err(|_| self.invalid(column, "expected a non-negative integer"))
    }

    fn optional_u32(&self, column: &'static str) -> CsvResult<Option<u32>> {
        let value = self.text(column);
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| self.invalid(column, "expected a non-negative integer"))
    }

    fn u32_or(&self, column: &'static str, default: u32) -> u32 {
        self.text(column).parse::<u32>().unwrap_or(default)
    }

    fn flag(&self, column: &'static str) -> CsvResult<bool> {
        parse_flag(self.text(column))
            .ok_or_else(|| self.invalid(column, "expected TRUE/FALSE, YES/NO or 1/0"))
    }

    fn required_text(&self, column: &'static str) -> CsvResult<String> {
        let value = self.text(column);
        if value.is_empty() {
            return Err(self.invalid(column, "required value is empty"));
        }
        Ok(value.to_string())
    }

    fn optional_text(&self, column: &'static str) -> Option<String> {
        let value = self.text(column);
        (!value.is_empty()).then(|| value.to_string())
    }
}

fn read_records<R: Read, T>(
    reader: R,
    required: &[&'static str],
    mut parse: impl FnMut(&Row<'_>) -> CsvResult<T>,
) -> CsvResult<Vec<T>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let columns = Columns::new(csv_reader.headers()?);
    columns.require(required)?;

    let mut items = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        items.push(parse(&columns.row(&record))?);
    }
    Ok(items)
}

fn open(path: &Path) -> CsvResult<File> {
    File::open(path).map_err(|source| CsvIoError::File {
        path: path.to_path_buf(),
        source,
    })
}

fn create(path: &Path) -> CsvResult<File> {
    File::create(path).map_err(|source| CsvIoError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads `Row,rowNumSlots,tableSlotID,isReserved`.
pub fn read_slots<R: Read>(reader: R) -> CsvResult<Vec<Slot>> {
    read_records(reader, &SLOT_COLUMNS, |row| {
        Ok(Slot {
            row: row.required_u32("Row")?,
            row_slot_count: row.required_u32("rowNumSlots")?,
            slot_id: row.required_u32("tableSlotID")?,
            reserved: row.flag("isReserved")?,
        })
    })
}

pub fn read_slots_path(path: &Path) -> CsvResult<Vec<Slot>> {
    read_slots(open(path)?)
}

/// Reads `projectID,isTeam,isFirstInCat,Category`, keeping file order.
pub fn read_projects<R: Read>(reader: R) -> CsvResult<Vec<Project>> {
    read_records(reader, &PROJECT_COLUMNS, |row| {
        Ok(Project {
            project_id: row.required_u32("projectID")?,
            is_team: row.flag("isTeam")?,
            is_first_in_category: row.flag("isFirstInCat")?,
            category: row.text("Category").to_string(),
        })
    })
}

pub fn read_projects_path(path: &Path) -> CsvResult<Vec<Project>> {
    read_projects(open(path)?)
}

/// Re-hydrates an exported assignment file.
///
/// A record is assigned iff `projectID` is non-empty.
pub fn read_assignments<R: Read>(reader: R) -> CsvResult<Vec<SlotAssignment>> {
    read_records(reader, &ASSIGNMENT_COLUMNS, |row| {
        let slot_row = row.required_u32("Row")?;
        let slot_id = row.required_u32("tableSlotID")?;
        let flagged_unassigned = row.flag("isUnassigned")?;
        let placement = match row.optional_u32("projectID")? {
            Some(project_id) => Some(Placement {
                project_id,
                is_team: row.flag("isTeam")?,
                category: row.text("Category").to_string(),
            }),
            None => None,
        };

        if flagged_unassigned != placement.is_none() {
            warn!(
                "event=assignment_flag_mismatch module=csv_io status=warn line={} row={} slot={} is_unassigned={}",
                row.line, slot_row, slot_id, flagged_unassigned
            );
        }
        Ok(SlotAssignment {
            row: slot_row,
            slot_id,
            placement,
        })
    })
}

pub fn read_assignments_path(path: &Path) -> CsvResult<Vec<SlotAssignment>> {
    read_assignments(open(path)?)
}

/// Writes `Row,tableSlotID,isUnassigned,projectID,isTeam,Category`.
///
/// Project fields are empty strings on unassigned records.
pub fn write_assignments<W: Write>(writer: W, assignments: &[SlotAssignment]) -> CsvResult<()> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(ASSIGNMENT_COLUMNS)?;
    for assignment in assignments {
        let row = assignment.row.to_string();
        let slot_id = assignment.slot_id.to_string();
        let unassigned = format_flag(assignment.is_unassigned());
        match &assignment.placement {
            Some(placement) => {
                let project_id = placement.project_id.to_string();
                csv_writer.write_record([
                    row.as_str(),
                    slot_id.as_str(),
                    unassigned,
                    project_id.as_str(),
                    format_flag(placement.is_team),
                    placement.category.as_str(),
                ])?;
            }
            None => {
                csv_writer.write_record([row.as_str(), slot_id.as_str(), unassigned, "", "", ""])?;
            }
        }
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_assignments_path(path: &Path, assignments: &[SlotAssignment]) -> CsvResult<()> {
    write_assignments(create(path)?, assignments)
}

/// Reads matching-mode projects.
///
/// `estimatedSpace` falls back to 10 when blank or unreadable.
pub fn read_match_projects<R: Read>(reader: R) -> CsvResult<Vec<MatchProject>> {
    read_records(reader, &["projectId"], |row| {
        Ok(MatchProject {
            project_id: row.required_text("projectId")?,
            project_name: row.text("projectName").to_string(),
            student_name: row.text("studentName").to_string(),
            category: row.text("category").to_string(),
            grade: row.optional_text("grade"),
            requires_electricity: row.flag("requiresElectricity")?,
            requires_water: row.flag("requiresWater")?,
            special_requirements: row.text("specialRequirements").to_string(),
            estimated_space: row.u32_or("estimatedSpace", DEFAULT_ESTIMATED_SPACE),
        })
    })
}

pub fn read_match_projects_path(path: &Path) -> CsvResult<Vec<MatchProject>> {
    read_match_projects(open(path)?)
}

/// Reads matching-mode tables.
///
/// `capacity` falls back to 20 when blank or unreadable.
pub fn read_match_tables<R: Read>(reader: R) -> CsvResult<Vec<MatchTable>> {
    read_records(reader, &["tableId"], |row| {
        Ok(MatchTable {
            table_id: row.required_text("tableId")?,
            location: row.text("location").to_string(),
            capacity: row.u32_or("capacity", DEFAULT_TABLE_CAPACITY),
            has_electricity: row.flag("hasElectricity")?,
            has_water: row.flag("hasWater")?,
            category: row.optional_text("category"),
            grade_range: row.optional_text("gradeRange"),
            is_accessible: row.flag("isAccessible")?,
            notes: row.text("notes").to_string(),
        })
    })
}

pub fn read_match_tables_path(path: &Path) -> CsvResult<Vec<MatchTable>> {
    read_match_tables(open(path)?)
}

/// Writes matching results joined with project details.
pub fn write_match_assignments<W: Write>(
    writer: W,
    assignments: &[MatchAssignment],
    projects: &[MatchProject],
) -> CsvResult<()> {
    let by_id = projects
        .iter()
        .map(|project| (project.project_id.as_str(), project))
        .collect::<BTreeMap<_, _>>();

    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(MATCH_ASSIGNMENT_COLUMNS)?;
    for assignment in assignments {
        let project = assignment
            .project_id
            .as_deref()
            .filter(|_| assignment.is_assigned())
            .and_then(|id| by_id.get(id).copied());
        let score = assignment.compatibility_score.to_string();
        csv_writer.write_record([
            assignment.table_id.as_str(),
            assignment.project_id.as_deref().unwrap_or(""),
            project.map_or("", |p| p.student_name.as_str()),
            project.map_or("", |p| p.project_name.as_str()),
            project.map_or("", |p| p.category.as_str()),
            assignment.reason.as_str(),
            score.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_match_assignments_path(
    path: &Path,
    assignments: &[MatchAssignment],
    projects: &[MatchProject],
) -> CsvResult<()> {
    write_match_assignments(create(path)?, assignments, projects)
}
