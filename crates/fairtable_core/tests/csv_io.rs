use fairtable_core::io::csv_codec::{
    read_assignments, read_assignments_path, read_match_projects, read_match_tables,
    read_projects, read_slots, read_slots_path, write_assignments, write_assignments_path,
    write_match_assignments, CsvIoError,
};
use fairtable_core::{MatchAssignment, Project, SlotAssignment};

#[test]
fn reads_slots_with_any_boolean_encoding() {
    let raw = "Row,rowNumSlots,tableSlotID,isReserved\n\
               1,12,1,FALSE\n\
               1,12,2,yes\n\
               1,12,3,0\n\
               1,12,4,True\n\
               1,12,5,\n";
    let slots = read_slots(raw.as_bytes()).unwrap();

    let reserved = slots.iter().map(|slot| slot.reserved).collect::<Vec<_>>();
    assert_eq!(reserved, vec![false, true, false, true, false]);
    assert_eq!(slots[4].row_slot_count, 12);
    assert_eq!(slots[4].slot_id, 5);
}

#[test]
fn columns_are_located_by_header_name() {
    let raw = "isReserved, tableSlotID ,Row,rowNumSlots\nNO,7,3,12\n";
    let slots = read_slots(raw.as_bytes()).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].row, 3);
    assert_eq!(slots[0].slot_id, 7);
    assert!(!slots[0].reserved);
}

#[test]
fn byte_order_mark_and_blank_lines_are_ignored() {
    let raw = "\u{feff}projectID,isTeam,isFirstInCat,Category\n\
               10,TRUE,TRUE,Robotics\n\
               ,,,\n\
               11,FALSE,FALSE,Robotics\n";
    let projects = read_projects(raw.as_bytes()).unwrap();

    assert_eq!(
        projects,
        vec![
            Project::new(10, true, true, "Robotics"),
            Project::new(11, false, false, "Robotics"),
        ]
    );
}

#[test]
fn missing_required_column_is_reported() {
    let raw = "Row,tableSlotID,isReserved\n1,1,FALSE\n";
    let err = read_slots(raw.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        CsvIoError::MissingColumn {
            column: "rowNumSlots"
        }
    ));
}

#[test]
fn invalid_identity_field_reports_line_and_value() {
    let raw = "Row,rowNumSlots,tableSlotID,isReserved\n1,12,1,FALSE\n1,12,two,FALSE\n";
    let err = read_slots(raw.as_bytes()).unwrap_err();

    let CsvIoError::InvalidField {
        line,
        column,
        value,
        ..
    } = err
    else {
        panic!("expected an invalid field error");
    };
    assert_eq!(line, 3);
    assert_eq!(column, "tableSlotID");
    assert_eq!(value, "two");
}

#[test]
fn empty_identity_field_is_rejected() {
    let raw = "projectID,isTeam,isFirstInCat,Category\n,FALSE,TRUE,Physics\n";
    let err = read_projects(raw.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        CsvIoError::InvalidField {
            column: "projectID",
            ..
        }
    ));
}

#[test]
fn unknown_boolean_is_rejected() {
    let raw = "projectID,isTeam,isFirstInCat,Category\n4,maybe,TRUE,Physics\n";
    let err = read_projects(raw.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        CsvIoError::InvalidField {
            column: "isTeam",
            line: 2,
            ..
        }
    ));
    assert!(err.to_string().contains("maybe"));
}

#[test]
fn writes_assignments_with_empty_project_fields_when_unassigned() {
    let project = Project::new(42, true, true, "Earth Science");
    let assignments = vec![
        SlotAssignment::assigned(1, 1, &project),
        SlotAssignment::unassigned(1, 2),
    ];

    let mut out = Vec::new();
    write_assignments(&mut out, &assignments).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(
        text,
        "Row,tableSlotID,isUnassigned,projectID,isTeam,Category\n\
         1,1,FALSE,42,TRUE,Earth Science\n\
         1,2,TRUE,,,\n"
    );
}

#[test]
fn exported_assignments_rehydrate_to_the_same_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assignments.csv");
    let solo = Project::new(7, false, true, "Botany");
    let team = Project::new(8, true, false, "Botany");
    let assignments = vec![
        SlotAssignment::assigned(2, 1, &solo),
        SlotAssignment::unassigned(2, 2),
        SlotAssignment::assigned(2, 3, &team),
        SlotAssignment::assigned(2, 4, &team),
    ];

    write_assignments_path(&path, &assignments).unwrap();
    let loaded = read_assignments_path(&path).unwrap();
    assert_eq!(loaded, assignments);
}

#[test]
fn rehydration_trusts_project_id_over_unassigned_flag() {
    let raw = "Row,tableSlotID,isUnassigned,projectID,isTeam,Category\n\
               1,1,TRUE,5,FALSE,Zoology\n\
               1,2,FALSE,,,\n";
    let loaded = read_assignments(raw.as_bytes()).unwrap();

    assert_eq!(loaded[0].project_id(), Some(5));
    assert_eq!(loaded[0].category(), Some("Zoology"));
    assert!(loaded[1].is_unassigned());
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = read_slots_path(&path).unwrap_err();

    assert!(matches!(err, CsvIoError::File { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn match_inputs_fall_back_to_default_sizes() {
    let projects = "projectId,projectName,studentName,category,grade,requiresElectricity,requiresWater,specialRequirements,estimatedSpace\n\
                    P1,Volcano,Ada,Earth Science,5,TRUE,FALSE,,\n\
                    P2,Circuits,Lin,Physics,,no,no,needs outlet,abc\n\
                    P3,Plants,Sam,Botany,K,0,1,,16\n";
    let tables = "tableId,location,capacity,hasElectricity,hasWater,category,gradeRange,isAccessible,notes\n\
                  T1,Gym,,TRUE,TRUE,Physics,3-5,TRUE,\n\
                  T2,Hall,30,FALSE,FALSE,,,FALSE,by door\n";

    let projects = read_match_projects(projects.as_bytes()).unwrap();
    let tables = read_match_tables(tables.as_bytes()).unwrap();

    assert_eq!(projects[0].estimated_space, 10);
    assert_eq!(projects[1].estimated_space, 10);
    assert_eq!(projects[2].estimated_space, 16);
    assert_eq!(projects[1].grade, None);
    assert!(projects[2].requires_water);
    assert_eq!(tables[0].capacity, 20);
    assert_eq!(tables[0].grade_range.as_deref(), Some("3-5"));
    assert_eq!(tables[1].capacity, 30);
    assert_eq!(tables[1].category, None);
    assert_eq!(tables[1].notes, "by door");
}

#[test]
fn match_assignments_join_project_details() {
    let projects = read_match_projects(
        "projectId,projectName,studentName,category\nP1,Volcano,Ada,Earth Science\n".as_bytes(),
    )
    .unwrap();
    let assignments = vec![
        MatchAssignment {
            table_id: "T1".to_string(),
            project_id: Some("P1".to_string()),
            reason: "Grade-appropriate".to_string(),
            compatibility_score: 130,
        },
        MatchAssignment {
            table_id: "T2".to_string(),
            project_id: None,
            reason: "No suitable project found".to_string(),
            compatibility_score: 0,
        },
    ];

    let mut out = Vec::new();
    write_match_assignments(&mut out, &assignments, &projects).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(
        text,
        "tableId,projectId,studentName,projectName,category,assignmentReason,compatibilityScore\n\
         T1,P1,Ada,Volcano,Earth Science,Grade-appropriate,130\n\
         T2,,,,,No suitable project found,0\n"
    );
}
