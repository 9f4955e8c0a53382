//! Scoring-based table matching.
//!
//! # Responsibility
//! - Order projects by placement priority.
//! - Give each project the best-scoring free table that can host it.
//! - Report every table, matched or not, sorted by table id.
//!
//! # Invariants
//! - A table hosts at most one project; a project id is placed at most once.
//! - Among equally scored tables the earliest in input order wins.

use crate::model::matching::{MatchAssignment, MatchProject, MatchTable};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Reason recorded on tables left without a project.
pub const NO_MATCH_REASON: &str = "No suitable project found";
const FALLBACK_REASON: &str = "Best available match";
const EFFICIENT_REASON_PERCENT: u32 = 80;

/// Runs the greedy matching.
pub fn assign_by_score(projects: &[MatchProject], tables: &[MatchTable]) -> Vec<MatchAssignment> {
    let mut taken_tables = BTreeSet::<&str>::new();
    let mut placed_projects = BTreeSet::<&str>::new();
    let mut assignments = Vec::with_capacity(tables.len());

    for project in prioritize(projects) {
        if placed_projects.contains(project.project_id.as_str()) {
            continue;
        }
        let Some((table, score)) = best_table(project, tables, &taken_tables) else {
            debug!(
                "event=match_skip module=matching project={} reason=no_table",
                project.project_id
            );
            continue;
        };

        assignments.push(MatchAssignment {
            table_id: table.table_id.clone(),
            project_id: Some(project.project_id.clone()),
            reason: assignment_reason(project, table),
            compatibility_score: score,
        });
        taken_tables.insert(table.table_id.as_str());
        placed_projects.insert(project.project_id.as_str());
    }

    for table in tables {
        if !taken_tables.contains(table.table_id.as_str()) {
            assignments.push(MatchAssignment {
                table_id: table.table_id.clone(),
                project_id: None,
                reason: NO_MATCH_REASON.to_string(),
                compatibility_score: 0,
            });
        }
    }

    assignments.sort_by(|a, b| a.table_id.cmp(&b.table_id));
    assignments
}

/// Stable priority order: more special requirements, then more space,
/// then younger grade.
pub fn prioritize(projects: &[MatchProject]) -> Vec<&MatchProject> {
    let mut ordered = projects.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|project| {
        (
            Reverse(project.special_requirement_count()),
            Reverse(project.estimated_space),
            project.grade_rank(),
        )
    });
    ordered
}

fn best_table<'t>(
    project: &MatchProject,
    tables: &'t [MatchTable],
    taken: &BTreeSet<&str>,
) -> Option<(&'t MatchTable, i32)> {
    let mut best: Option<(&MatchTable, i32)> = None;
    for table in tables {
        if taken.contains(table.table_id.as_str()) || !table.can_accommodate(project) {
            continue;
        }
        let score = table.compatibility_score(project);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((table, score));
        }
    }
    best
}

fn assignment_reason(project: &MatchProject, table: &MatchTable) -> String {
    let mut reasons = Vec::new();
    if table.matches_category(project) {
        reasons.push("Category match");
    }
    if project.requires_electricity && table.has_electricity {
        reasons.push("Electricity available");
    }
    if project.requires_water && table.has_water {
        reasons.push("Water available");
    }
    if table.is_grade_compatible(project) {
        reasons.push("Grade-appropriate");
    }
    if table.space_efficiency_percent(project) > EFFICIENT_REASON_PERCENT {
        reasons.push("Efficient space use");
    }

    if reasons.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        reasons.join(", ")
    }
}

/// Counts for one matching run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub total_tables: usize,
    pub assigned_tables: usize,
    pub total_projects: usize,
    /// `(project name, student name)` in input order.
    pub unassigned: Vec<(String, String)>,
}

impl MatchSummary {
    pub fn from_run(assignments: &[MatchAssignment], projects: &[MatchProject]) -> Self {
        let placed = assignments
            .iter()
            .filter(|assignment| assignment.is_assigned())
            .filter_map(|assignment| assignment.project_id.as_deref())
            .collect::<BTreeSet<_>>();
        let unassigned = projects
            .iter()
            .filter(|project| !placed.contains(project.project_id.as_str()))
            .map(|project| (project.project_name.clone(), project.student_name.clone()))
            .collect();

        Self {
            total_tables: assignments.len(),
            assigned_tables: placed.len(),
            total_projects: projects.len(),
            unassigned,
        }
    }
}

impl Display for MatchSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== ASSIGNMENT SUMMARY ===")?;
        writeln!(f, "Total tables: {}", self.total_tables)?;
        writeln!(f, "Tables assigned: {}", self.assigned_tables)?;
        writeln!(
            f,
            "Tables unassigned: {}",
            self.total_tables.saturating_sub(self.assigned_tables)
        )?;
        writeln!(f, "Total projects: {}", self.total_projects)?;
        writeln!(f, "Projects assigned: {}", self.assigned_tables)?;
        writeln!(f, "Projects unassigned: {}", self.unassigned.len())?;
        if !self.unassigned.is_empty() {
            writeln!(f)?;
            writeln!(f, "=== UNASSIGNED PROJECTS ===")?;
            for (project_name, student_name) in &self.unassigned {
                writeln!(f, "- {project_name} ({student_name})")?;
            }
        }
        Ok(())
    }
}
