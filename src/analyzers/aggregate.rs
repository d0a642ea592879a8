use crate::analyzers::types::{AggregateKey, AggregateReport, AggregateRow};
use crate::analyzers::utility::mean;
use crate::record::StudentRecord;
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info};

/// Aggregates student averages per `(group, course)` and overall.
///
/// Each group row is the unweighted mean of its students' averages, so a
/// student with one grade counts as much as one with ten. Students without
/// an average are skipped. Rows follow the order in which each key is first
/// seen, with the overall row last. No eligible students yields an empty
/// report rather than an error.
pub fn aggregate(records: &[StudentRecord]) -> AggregateReport {
    let mut order: Vec<AggregateKey> = Vec::new();
    let mut series: HashMap<AggregateKey, Vec<f64>> = HashMap::new();

    let mut total_sum = 0.0;
    let mut total_count = 0usize;

    for record in records {
        let Some(avg) = record.average else {
            debug!(student = %record.full_name, "Skipping student without average");
            continue;
        };

        let key = AggregateKey::group(&record.group, &record.course);
        series
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(avg);

        total_sum += avg;
        total_count += 1;
    }

    let mut rows = Vec::with_capacity(order.len() + 1);

    for key in order {
        let averages = &series[&key];
        if let Some(mean_of_means) = mean(averages) {
            rows.push(AggregateRow {
                key,
                mean_of_means,
                students: averages.len(),
            });
        }
    }

    if total_count > 0 {
        rows.push(AggregateRow {
            key: AggregateKey::Overall,
            mean_of_means: total_sum / total_count as f64,
            students: total_count,
        });
    } else {
        info!("No student has an average yet, aggregate table left empty");
    }

    AggregateReport {
        generated_at: Utc::now(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, group: &str, course: &str, grades: Vec<i32>) -> StudentRecord {
        StudentRecord::new(name, group, course).with_grades(grades)
    }

    fn scenario() -> Vec<StudentRecord> {
        vec![
            student("A", "G1", "C1", vec![90]),
            student("B", "G1", "C1", vec![70]),
            student("C", "G2", "C1", vec![100]),
        ]
    }

    #[test]
    fn test_groups_and_overall() {
        let report = aggregate(&scenario());

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].key, AggregateKey::group("G1", "C1"));
        assert_eq!(report.rows[0].mean_of_means, 80.0);
        assert_eq!(report.rows[0].students, 2);
        assert_eq!(report.rows[1].key, AggregateKey::group("G2", "C1"));
        assert_eq!(report.rows[1].mean_of_means, 100.0);

        let overall = report.overall().unwrap();
        assert!((overall.mean_of_means - 260.0 / 3.0).abs() < 1e-9);
        assert_eq!(overall.students, 3);
    }

    #[test]
    fn test_empty_dataset_emits_nothing() {
        let report = aggregate(&[]);
        assert!(report.is_empty());
        assert!(report.overall().is_none());
    }

    #[test]
    fn test_students_without_average_are_skipped() {
        let records = vec![
            StudentRecord::new("Nobody", "G9", "C9"),
            student("A", "G1", "C1", vec![60]),
        ];
        let report = aggregate(&records);

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.groups().count(), 1);
        assert_eq!(report.overall().unwrap().mean_of_means, 60.0);
    }

    #[test]
    fn test_only_ungraded_students_yields_empty_report() {
        let records = vec![StudentRecord::new("X", "G1", "C1")];
        assert!(aggregate(&records).is_empty());
    }

    #[test]
    fn test_unweighted_by_grade_count() {
        let records = vec![
            student("A", "G1", "C1", vec![100, 100, 100, 100]),
            student("B", "G1", "C1", vec![50]),
        ];
        let report = aggregate(&records);
        assert_eq!(report.rows[0].mean_of_means, 75.0);
    }

    #[test]
    fn test_first_encounter_order() {
        let records = vec![
            student("A", "G2", "C1", vec![10]),
            student("B", "G1", "C1", vec![20]),
            student("C", "G2", "C1", vec![30]),
            student("D", "G1", "C2", vec![40]),
        ];
        let keys: Vec<_> = aggregate(&records)
            .rows
            .into_iter()
            .map(|r| r.key)
            .collect();

        assert_eq!(
            keys,
            vec![
                AggregateKey::group("G2", "C1"),
                AggregateKey::group("G1", "C1"),
                AggregateKey::group("G1", "C2"),
                AggregateKey::Overall,
            ]
        );
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let records = vec![
            student("A", "g1", "C1", vec![10]),
            student("B", "G1", "C1", vec![20]),
        ];
        assert_eq!(aggregate(&records).groups().count(), 2);
    }

    #[test]
    fn test_idempotent() {
        let records = scenario();
        assert_eq!(aggregate(&records).rows, aggregate(&records).rows);
    }
}
