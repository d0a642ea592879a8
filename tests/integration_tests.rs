use std::fs;

use student_grades::analyzers::aggregate::aggregate;
use student_grades::config::StoreConfig;
use student_grades::editor::GradeEditor;
use student_grades::error::RecordError;
use student_grades::record::StudentRecord;
use student_grades::repository::Repository;
use student_grades::storage::CsvStorage;

fn seeded_repo(dir: &tempfile::TempDir) -> Repository<CsvStorage> {
    let config = StoreConfig::in_dir(dir.path());
    let mut repo = Repository::new(CsvStorage::from_config(&config));
    repo.initialize().unwrap();
    repo.save(&[
        StudentRecord::new("A", "G1", "C1"),
        StudentRecord::new("B", "G1", "C1"),
        StudentRecord::new("C", "G2", "C1"),
    ])
    .unwrap();
    repo
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = seeded_repo(&dir);

    let mut records = repo.load().unwrap();
    for (position, grades) in [(1, "90"), (2, "60 80"), (3, "100")] {
        GradeEditor::new(&mut repo)
            .apply(&mut records, position, grades)
            .unwrap();
    }

    let reloaded = repo.load().unwrap();
    assert_eq!(reloaded, records);
    assert_eq!(reloaded[1].grades, vec![60, 80]);
    assert_eq!(reloaded[1].average, Some(70.0));

    let report = aggregate(&reloaded);
    repo.save_aggregates(&report.rows).unwrap();

    let averages = fs::read_to_string(repo.store().averages_path()).unwrap();
    let lines: Vec<_> = averages.lines().collect();
    assert_eq!(lines[0], "group,course,mean_of_means");
    assert_eq!(lines[1], "G1,C1,80");
    assert_eq!(lines[2], "G2,C1,100");
    assert!(lines[3].starts_with("-,-,86.66"));
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_grades_accumulate_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = seeded_repo(&dir);

    let mut records = repo.load().unwrap();
    GradeEditor::new(&mut repo)
        .apply(&mut records, 1, "80 90")
        .unwrap();

    let config = StoreConfig::in_dir(dir.path());
    let mut later = Repository::new(CsvStorage::from_config(&config));
    let mut records = later.load().unwrap();
    let position = later.find_by_name("A", &records).unwrap().position;
    GradeEditor::new(&mut later)
        .apply(&mut records, position, "70")
        .unwrap();

    let stored = later.load().unwrap();
    assert_eq!(stored[0].grades, vec![80, 90, 70]);
    assert_eq!(stored[0].average, Some(80.0));
}

#[test]
fn test_rejected_input_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = seeded_repo(&dir);
    let before = fs::read_to_string(repo.store().students_path()).unwrap();

    let mut records = repo.load().unwrap();
    let err = GradeEditor::new(&mut repo)
        .apply(&mut records, 2, "abc")
        .unwrap_err();

    assert!(matches!(err, RecordError::InvalidGradeInput { .. }));
    let after = fs::read_to_string(repo.store().students_path()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_aggregate_rerun_replaces_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = seeded_repo(&dir);

    let mut records = repo.load().unwrap();
    GradeEditor::new(&mut repo)
        .apply(&mut records, 3, "50")
        .unwrap();
    repo.save_aggregates(&aggregate(&records).rows).unwrap();
    let first = fs::read_to_string(repo.store().averages_path()).unwrap();

    let reloaded = repo.load().unwrap();
    repo.save_aggregates(&aggregate(&reloaded).rows).unwrap();
    let second = fs::read_to_string(repo.store().averages_path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.lines().count(), 3);
}

#[test]
fn test_load_without_initialize_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = Repository::new(CsvStorage::from_config(&StoreConfig::in_dir(dir.path())));

    let err = repo.load().unwrap_err();
    assert!(matches!(err, RecordError::StorageUnavailable(_)));
}
