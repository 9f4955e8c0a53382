//! Aggregate counts over one assignment run.

use crate::model::slot::{Project, ProjectId, Slot, SlotAssignment};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Project that did not receive any slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedProject {
    pub project_id: ProjectId,
    pub category: String,
}

/// Read-only statistics of an assignment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub total_slots: usize,
    pub available_slots: usize,
    pub reserved_slots: usize,
    pub assigned_slots: usize,
    /// Available slots left empty.
    pub unassigned_slots: usize,
    pub total_projects: usize,
    /// Distinct projects holding at least one slot.
    pub assigned_projects: usize,
    pub unassigned_projects: usize,
    /// Project count per category of the input list, sorted by category.
    pub projects_by_category: BTreeMap<String, usize>,
    /// In input order.
    pub unassigned: Vec<UnassignedProject>,
}

impl AssignmentSummary {
    pub fn from_run(slots: &[Slot], projects: &[Project], assignments: &[SlotAssignment]) -> Self {
        let available_slots = slots.iter().filter(|slot| slot.is_available()).count();
        let reserved_slots = slots.len() - available_slots;
        let assigned_slots = assignments
            .iter()
            .filter(|assignment| !assignment.is_unassigned())
            .count();

        let placed = assignments
            .iter()
            .filter_map(SlotAssignment::project_id)
            .collect::<BTreeSet<_>>();
        let unassigned = projects
            .iter()
            .filter(|project| !placed.contains(&project.project_id))
            .map(|project| UnassignedProject {
                project_id: project.project_id,
                category: project.category.clone(),
            })
            .collect::<Vec<_>>();

        let mut projects_by_category = BTreeMap::<String, usize>::new();
        for project in projects {
            *projects_by_category
                .entry(project.category.clone())
                .or_default() += 1;
        }

        Self {
            total_slots: slots.len(),
            available_slots,
            reserved_slots,
            assigned_slots,
            unassigned_slots: available_slots.saturating_sub(assigned_slots),
            total_projects: projects.len(),
            assigned_projects: projects.len() - unassigned.len(),
            unassigned_projects: unassigned.len(),
            projects_by_category,
            unassigned,
        }
    }
}

impl Display for AssignmentSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== SCIENCE FAIR ASSIGNMENT SUMMARY ===")?;
        writeln!(f, "Total table slots: {}", self.total_slots)?;
        writeln!(f, "Available slots: {}", self.available_slots)?;
        writeln!(f, "Reserved slots: {}", self.reserved_slots)?;
        writeln!(f, "Slots assigned: {}", self.assigned_slots)?;
        writeln!(f, "Slots unassigned: {}", self.unassigned_slots)?;
        writeln!(f, "Total projects: {}", self.total_projects)?;
        writeln!(f, "Projects assigned: {}", self.assigned_projects)?;
        writeln!(f, "Projects unassigned: {}", self.unassigned_projects)?;

        writeln!(f)?;
        writeln!(f, "=== PROJECTS BY CATEGORY ===")?;
        for (category, count) in &self.projects_by_category {
            writeln!(f, "- {category}: {count} projects")?;
        }

        if !self.unassigned.is_empty() {
            writeln!(f)?;
            writeln!(f, "=== UNASSIGNED PROJECTS ===")?;
            for project in &self.unassigned {
                writeln!(f, "- Project {} ({})", project.project_id, project.category)?;
            }
        }
        Ok(())
    }
}
