//! Text floor plan.

use crate::layout::numbering::{Direction, FloorLayout, RowLayout, TableCell};
use crate::model::slot::SlotAssignment;
use crate::render::category::{category_abbreviation, known_categories};

const SLOT_WIDTH: usize = 12;

/// Renders rows in walk order, tables in display order.
pub fn render_text(layout: &FloorLayout) -> String {
    let stats = layout.stats();
    let mut out = String::new();
    out.push_str("Science Fair Table Assignment - Floor Layout\n");
    out.push_str("============================================\n");
    out.push_str(&format!(
        "Team projects: {}  Total projects: {}  Tables: {}\n\n",
        stats.team_projects, stats.total_projects, stats.tables
    ));

    for row in &layout.rows {
        out.push_str(&render_row(row));
        out.push('\n');
        for _ in 0..row.gap_after {
            out.push('\n');
        }
    }

    out.push_str(&legend());
    out
}

fn render_row(row: &RowLayout) -> String {
    let arrow = match row.direction {
        Direction::LeftToRight => "->",
        Direction::RightToLeft => "<-",
    };
    let tables = row
        .tables
        .iter()
        .map(render_table)
        .collect::<Vec<_>>()
        .join(" ");
    format!("Row {:>2} {arrow} {tables}", row.row)
}

fn render_table(table: &TableCell) -> String {
    let slots = table
        .slots()
        .map(|slot| format!("{:<width$}", slot_label(slot), width = SLOT_WIDTH))
        .collect::<Vec<_>>()
        .join("|");
    format!("T{}[{slots}]", table.number)
}

fn slot_label(slot: &SlotAssignment) -> String {
    match &slot.placement {
        Some(placement) => {
            let marker = if placement.is_team { "*" } else { "" };
            format!(
                "P{}-{}{marker}",
                placement.project_id,
                category_abbreviation(&placement.category)
            )
        }
        None => "EMPTY".to_string(),
    }
}

fn legend() -> String {
    let mut out = String::from("Legend:\n");
    out.push_str("  P123-ANIM   = project 123 (Animal Sciences)\n");
    out.push_str("  P123-BEHA*  = team project 123, spans both slots of its table\n");
    out.push_str("  EMPTY       = reserved, spacing or unassigned slot\n");
    out.push_str("  -> / <-     = numbering direction of the row\n");
    out.push_str("\nCategory codes:\n");
    for (name, code) in known_categories() {
        out.push_str(&format!("  {code} = {name}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{legend, render_text, slot_label};
    use crate::layout::numbering::{build_floor_layout, group_by_row, LayoutOptions};
    use crate::model::slot::{Project, SlotAssignment};

    #[test]
    fn slot_label_marks_team_projects() {
        let team = Project::new(7, true, false, "Chemistry");
        let solo = Project::new(8, false, false, "Mathematics");
        assert_eq!(slot_label(&SlotAssignment::assigned(1, 1, &team)), "P7-CHEM*");
        assert_eq!(slot_label(&SlotAssignment::assigned(1, 3, &solo)), "P8-MATH");
        assert_eq!(slot_label(&SlotAssignment::unassigned(1, 4)), "EMPTY");
    }

    #[test]
    fn header_and_legend_lines_are_terminated() {
        let team = Project::new(1, true, true, "Chemistry");
        let assignments = vec![
            SlotAssignment::assigned(1, 1, &team),
            SlotAssignment::assigned(1, 2, &team),
        ];
        let layout =
            build_floor_layout(&group_by_row(&assignments), &LayoutOptions::default()).unwrap();
        let text = render_text(&layout);

        assert!(text.contains("\nTeam projects: 1  Total projects: 1  Tables: 1\n\nRow  1 -> "));
        assert!(legend().ends_with("\n"));
        assert!(legend().contains("  CHEM = Chemistry\n"));
    }
}
