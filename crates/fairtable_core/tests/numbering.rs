use fairtable_core::{
    build_floor_layout, group_by_row, number_tables, Direction, LayoutError, LayoutOptions,
    Project, RowLayout, SlotAssignment, TableKind,
};
use std::collections::BTreeMap;

fn empty_row(row: u32, count: u32) -> Vec<SlotAssignment> {
    (1..=count)
        .map(|slot_id| SlotAssignment::unassigned(row, slot_id))
        .collect()
}

fn venue_rows() -> Vec<SlotAssignment> {
    let mut all = Vec::new();
    for (row, count) in [(1, 12), (2, 12), (3, 12), (4, 14)] {
        all.extend(empty_row(row, count));
    }
    all
}

#[test]
fn numbers_increase_across_rows_in_ascending_order() {
    let by_row = group_by_row(&venue_rows());
    let numbers = number_tables(&by_row);

    assert_eq!(numbers[&1], (1..=6).collect::<Vec<_>>());
    assert_eq!(numbers[&2], (7..=12).collect::<Vec<_>>());
    assert_eq!(numbers[&3], (13..=18).collect::<Vec<_>>());
    assert_eq!(numbers[&4], (19..=25).collect::<Vec<_>>());
}

#[test]
fn group_by_row_sorts_each_row_by_slot_id() {
    let shuffled = vec![
        SlotAssignment::unassigned(2, 2),
        SlotAssignment::unassigned(1, 3),
        SlotAssignment::unassigned(2, 1),
        SlotAssignment::unassigned(1, 1),
        SlotAssignment::unassigned(1, 2),
    ];
    let by_row = group_by_row(&shuffled);

    assert_eq!(by_row.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    let row_one = by_row[&1]
        .iter()
        .map(|assignment| assignment.slot_id)
        .collect::<Vec<_>>();
    assert_eq!(row_one, vec![1, 2, 3]);
}

#[test]
fn odd_slot_count_numbers_trailing_table_but_counts_floor() {
    let mut assignments = empty_row(1, 5);
    assignments.extend(empty_row(2, 4));
    let numbers = number_tables(&group_by_row(&assignments));

    assert_eq!(numbers[&1], vec![1, 2, 3]);
    // Row 1 contributes floor(5 / 2) = 2 tables, so row 2 restarts at 3.
    assert_eq!(numbers[&2], vec![3, 4]);
}

#[test]
fn row_order_override_only_changes_the_walk() {
    let mut assignments = empty_row(1, 5);
    assignments.extend(empty_row(2, 4));
    let by_row = group_by_row(&assignments);

    let natural = build_floor_layout(&by_row, &LayoutOptions::default()).unwrap();
    let reordered = build_floor_layout(
        &by_row,
        &LayoutOptions {
            row_order: Some(vec![2, 1]),
            ..LayoutOptions::default()
        },
    )
    .unwrap();

    let walk = reordered.rows.iter().map(|row| row.row).collect::<Vec<_>>();
    assert_eq!(walk, vec![2, 1]);
    assert_eq!(reordered.rows[0].tables, natural.rows[1].tables);
    assert_eq!(reordered.rows[1].tables, natural.rows[0].tables);

    let numbers = |row: &RowLayout| row.tables.iter().map(|table| table.number).collect::<Vec<_>>();
    assert_eq!(numbers(&reordered.rows[1]), vec![1, 2, 3]);
    // Row 2 runs right to left.
    assert_eq!(numbers(&reordered.rows[0]), vec![4, 3]);
}

#[test]
fn row_order_override_must_cover_rows_exactly() {
    let by_row = group_by_row(&venue_rows());
    let with_order = |order: Vec<u32>| {
        build_floor_layout(
            &by_row,
            &LayoutOptions {
                row_order: Some(order),
                ..LayoutOptions::default()
            },
        )
    };

    assert_eq!(with_order(vec![1, 2, 3, 4, 7]), Err(LayoutError::UnknownRow(7)));
    assert_eq!(with_order(vec![1, 1, 2, 3, 4]), Err(LayoutError::DuplicateRow(1)));
    assert_eq!(with_order(vec![1, 2, 4]), Err(LayoutError::MissingRow(3)));
}

#[test]
fn even_rows_are_mirrored_for_display() {
    let projects = (1..=4)
        .map(|id| Project::new(id, false, id == 1, "Physics"))
        .collect::<Vec<_>>();
    let mut assignments = empty_row(1, 4);
    assignments.extend(
        projects
            .iter()
            .enumerate()
            .map(|(index, project)| SlotAssignment::assigned(2, index as u32 + 1, project)),
    );

    let layout = build_floor_layout(&group_by_row(&assignments), &LayoutOptions::default())
        .unwrap();

    let row_one = &layout.rows[0];
    assert_eq!(row_one.direction, Direction::LeftToRight);
    assert_eq!(
        row_one
            .tables
            .iter()
            .map(|table| table.number)
            .collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(row_one.tables[0].left.slot_id, 1);

    let row_two = &layout.rows[1];
    assert_eq!(row_two.direction, Direction::RightToLeft);
    let numbers = row_two
        .tables
        .iter()
        .map(|table| table.number)
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec![4, 3]);

    let first_displayed = &row_two.tables[0];
    assert_eq!(first_displayed.left.project_id(), Some(4));
    assert_eq!(
        first_displayed
            .right
            .as_ref()
            .and_then(SlotAssignment::project_id),
        Some(3)
    );
    let display_order = row_two
        .tables
        .iter()
        .flat_map(|table| table.slots())
        .map(|slot| slot.slot_id)
        .collect::<Vec<_>>();
    assert_eq!(display_order, vec![4, 3, 2, 1]);
}

#[test]
fn table_kind_reflects_occupants() {
    let team = Project::new(1, true, true, "Robotics");
    let solo = Project::new(2, false, false, "Robotics");
    let assignments = vec![
        SlotAssignment::assigned(1, 1, &team),
        SlotAssignment::assigned(1, 2, &team),
        SlotAssignment::assigned(1, 3, &solo),
        SlotAssignment::unassigned(1, 4),
        SlotAssignment::unassigned(1, 5),
        SlotAssignment::unassigned(1, 6),
        SlotAssignment::unassigned(1, 7),
    ];

    let layout = build_floor_layout(&group_by_row(&assignments), &LayoutOptions::default())
        .unwrap();
    let kinds = layout.rows[0]
        .tables
        .iter()
        .map(|table| table.kind)
        .collect::<Vec<_>>();

    assert_eq!(
        kinds,
        vec![
            TableKind::Team,
            TableKind::Solo,
            TableKind::Empty,
            TableKind::Empty
        ]
    );
    assert!(layout.rows[0].tables[3].right.is_none());
}

#[test]
fn gaps_alternate_small_and_large_unless_overridden() {
    let mut assignments = empty_row(1, 2);
    assignments.extend(empty_row(2, 2));
    assignments.extend(empty_row(3, 2));
    assignments.extend(empty_row(4, 2));
    let by_row = group_by_row(&assignments);

    let layout = build_floor_layout(&by_row, &LayoutOptions::default()).unwrap();
    let gaps = layout
        .rows
        .iter()
        .map(|row| row.gap_after)
        .collect::<Vec<_>>();
    assert_eq!(gaps, vec![1, 2, 1, 2]);

    let options = LayoutOptions {
        row_order: Some(vec![3, 1, 2, 4]),
        row_gaps: BTreeMap::from([(2, 5)]),
        small_gap: 0,
        large_gap: 3,
    };
    let layout = build_floor_layout(&by_row, &options).unwrap();
    let walk = layout
        .rows
        .iter()
        .map(|row| (row.row, row.gap_after))
        .collect::<Vec<_>>();
    assert_eq!(walk, vec![(3, 0), (1, 3), (2, 5), (4, 3)]);
    assert_eq!(layout.rows[0].tables[0].number, 3);
    assert_eq!(layout.rows[0].direction, Direction::LeftToRight);
}

#[test]
fn numbering_is_idempotent() {
    let by_row = group_by_row(&venue_rows());
    let options = LayoutOptions {
        row_order: Some(vec![4, 3, 2, 1]),
        ..LayoutOptions::default()
    };

    let first = build_floor_layout(&by_row, &options).unwrap();
    let second = build_floor_layout(&by_row, &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(number_tables(&by_row), number_tables(&by_row));
    let walked = first
        .rows
        .iter()
        .map(|row| (row.row, row.tables.len()))
        .collect::<Vec<_>>();
    assert_eq!(walked, vec![(4, 7), (3, 6), (2, 6), (1, 6)]);
    assert_eq!(first.rows[3].tables[0].number, 1);
}

#[test]
fn stats_count_distinct_projects_and_slot_pairs() {
    let team = Project::new(10, true, true, "Chemistry");
    let solo = Project::new(11, false, false, "Chemistry");
    let assignments = vec![
        SlotAssignment::assigned(1, 1, &team),
        SlotAssignment::assigned(1, 2, &team),
        SlotAssignment::assigned(1, 3, &solo),
        SlotAssignment::unassigned(1, 4),
        SlotAssignment::unassigned(2, 1),
    ];

    let layout = build_floor_layout(&group_by_row(&assignments), &LayoutOptions::default())
        .unwrap();
    let stats = layout.stats();

    assert_eq!(stats.team_projects, 1);
    assert_eq!(stats.total_projects, 2);
    assert_eq!(stats.tables, 2);
}

#[test]
fn empty_input_builds_empty_layout() {
    let by_row = group_by_row(&[]);
    assert!(number_tables(&by_row).is_empty());
    let layout = build_floor_layout(&by_row, &LayoutOptions::default()).unwrap();
    assert!(layout.rows.is_empty());
}
