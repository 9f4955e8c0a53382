//! Records for the scoring-based table matching mode.
//!
//! # Responsibility
//! - Describe exhibit tables with their hard capabilities.
//! - Describe projects with their requirements and grade.
//! - Score one table against one project.
//!
//! # Invariants
//! - A table that cannot accommodate a project scores `0`.
//! - Grade `K` ranks as grade `0`; unparsable grades rank last.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Rank used for grades that cannot be read.
pub const UNKNOWN_GRADE_RANK: u32 = 999;

const BASE_SCORE: i32 = 100;
const CATEGORY_MATCH_BONUS: i32 = 50;
const GRADE_MATCH_BONUS: i32 = 30;
const EFFICIENT_SPACE_BONUS: i32 = 20;
const OVERSIZED_TABLE_PENALTY: i32 = 10;
const EFFICIENT_SPACE_PERCENT: u32 = 80;
const OVERSIZED_SPACE_PERCENT: u32 = 40;

static GRADE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([Kk]|\d{1,2})\s*-\s*([Kk]|\d{1,2})\s*$").expect("valid grade range regex")
});

/// Project entry for the matching mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchProject {
    pub project_id: String,
    pub project_name: String,
    pub student_name: String,
    pub category: String,
    /// `K`, `1`..`12`; `None` when blank.
    pub grade: Option<String>,
    pub requires_electricity: bool,
    pub requires_water: bool,
    pub special_requirements: String,
    /// Square feet.
    pub estimated_space: u32,
}

impl MatchProject {
    /// Count of special requirements used for priority ordering.
    pub fn special_requirement_count(&self) -> u32 {
        u32::from(self.requires_electricity) + u32::from(self.requires_water)
    }

    pub fn grade_rank(&self) -> u32 {
        self.grade.as_deref().map_or(UNKNOWN_GRADE_RANK, grade_rank)
    }
}

/// Exhibit table for the matching mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTable {
    pub table_id: String,
    pub location: String,
    /// Square feet.
    pub capacity: u32,
    pub has_electricity: bool,
    pub has_water: bool,
    /// Preferred category, if any.
    pub category: Option<String>,
    /// Grade range such as `K-2` or `9-12`.
    pub grade_range: Option<String>,
    pub is_accessible: bool,
    pub notes: String,
}

impl MatchTable {
    /// Checks the hard constraints: space, electricity and water.
    pub fn can_accommodate(&self, project: &MatchProject) -> bool {
        if project.estimated_space > self.capacity {
            return false;
        }
        if project.requires_electricity && !self.has_electricity {
            return false;
        }
        if project.requires_water && !self.has_water {
            return false;
        }
        true
    }

    /// Higher is better; `0` when the table cannot host the project.
    pub fn compatibility_score(&self, project: &MatchProject) -> i32 {
        if !self.can_accommodate(project) {
            return 0;
        }

        let mut score = BASE_SCORE;
        if self.matches_category(project) {
            score += CATEGORY_MATCH_BONUS;
        }
        if self.is_grade_compatible(project) {
            score += GRADE_MATCH_BONUS;
        }

        let efficiency = self.space_efficiency_percent(project);
        if efficiency > EFFICIENT_SPACE_PERCENT {
            score += EFFICIENT_SPACE_BONUS;
        } else if efficiency < OVERSIZED_SPACE_PERCENT {
            score -= OVERSIZED_TABLE_PENALTY;
        }
        score
    }

    pub fn matches_category(&self, project: &MatchProject) -> bool {
        self.category
            .as_deref()
            .is_some_and(|category| category.eq_ignore_ascii_case(project.category.as_str()))
    }

    /// Blank grade or range means no restriction; unreadable ranges too.
    pub fn is_grade_compatible(&self, project: &MatchProject) -> bool {
        let (Some(range), Some(grade)) = (self.grade_range.as_deref(), project.grade.as_deref())
        else {
            return true;
        };
        match parse_grade_range(range) {
            Some((low, high)) => {
                let rank = grade_rank(grade);
                rank != UNKNOWN_GRADE_RANK && (low..=high).contains(&rank)
            }
            None => true,
        }
    }

    /// Integer percentage of the table surface the project uses.
    ///
    /// Zero-capacity tables report `0`.
    pub fn space_efficiency_percent(&self, project: &MatchProject) -> u32 {
        if self.capacity == 0 {
            return 0;
        }
        project.estimated_space.saturating_mul(100) / self.capacity
    }
}

/// Result record of the matching mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAssignment {
    pub table_id: String,
    pub project_id: Option<String>,
    pub reason: String,
    pub compatibility_score: i32,
}

impl MatchAssignment {
    pub fn is_assigned(&self) -> bool {
        self.project_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }
}

/// Converts `K`, `0`..`12` to an ordering rank.
pub fn grade_rank(grade: &str) -> u32 {
    let trimmed = grade.trim();
    if trimmed.eq_ignore_ascii_case("k") {
        return 0;
    }
    trimmed.parse::<u32>().unwrap_or(UNKNOWN_GRADE_RANK)
}

/// Parses `low-high` into inclusive grade ranks.
pub fn parse_grade_range(range: &str) -> Option<(u32, u32)> {
    let captures = GRADE_RANGE.captures(range)?;
    let low = grade_rank(captures.get(1)?.as_str());
    let high = grade_rank(captures.get(2)?.as_str());
    (low <= high).then_some((low, high))
}

#[cfg(test)]
mod tests {
    use super::{grade_rank, parse_grade_range, UNKNOWN_GRADE_RANK};

    #[test]
    fn grade_rank_reads_kindergarten_and_numbers() {
        assert_eq!(grade_rank("K"), 0);
        assert_eq!(grade_rank(" k "), 0);
        assert_eq!(grade_rank("11"), 11);
        assert_eq!(grade_rank("senior"), UNKNOWN_GRADE_RANK);
    }

    #[test]
    fn parse_grade_range_accepts_standard_bands() {
        assert_eq!(parse_grade_range("K-2"), Some((0, 2)));
        assert_eq!(parse_grade_range("9-12"), Some((9, 12)));
        assert_eq!(parse_grade_range(" 3 - 5 "), Some((3, 5)));
        assert_eq!(parse_grade_range("12-9"), None);
        assert_eq!(parse_grade_range("middle"), None);
    }
}
