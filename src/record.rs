use serde::Serialize;

use crate::analyzers::utility::mean;

/// One student's identity, classification and grade history.
///
/// `average` is derived from `grades` and is `None` while no grade has been
/// recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentRecord {
    pub full_name: String,
    pub group: String,
    pub course: String,
    pub average: Option<f64>,
    pub grades: Vec<i32>,
}

impl StudentRecord {
    pub fn new(full_name: &str, group: &str, course: &str) -> Self {
        StudentRecord {
            full_name: full_name.to_string(),
            group: group.to_string(),
            course: course.to_string(),
            ..Default::default()
        }
    }

    /// Replace the grade history and recompute the average.
    pub fn with_grades(mut self, grades: Vec<i32>) -> Self {
        self.grades = grades;
        self.recompute_average();
        self
    }

    /// Append grades after the existing ones and recompute the average over
    /// the whole history.
    pub fn push_grades(&mut self, grades: &[i32]) {
        self.grades.extend_from_slice(grades);
        self.recompute_average();
    }

    pub fn recompute_average(&mut self) {
        let values: Vec<f64> = self.grades.iter().map(|&g| g as f64).collect();
        self.average = mean(&values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_no_average() {
        let r = StudentRecord::new("Ivanov Ivan", "G1", "1");
        assert!(r.grades.is_empty());
        assert_eq!(r.average, None);
    }

    #[test]
    fn test_with_grades_sets_average() {
        let r = StudentRecord::new("A", "G1", "C1").with_grades(vec![80, 90]);
        assert_eq!(r.average, Some(85.0));
    }

    #[test]
    fn test_push_grades_is_cumulative() {
        let mut r = StudentRecord::new("A", "G1", "C1").with_grades(vec![80, 90]);
        r.push_grades(&[70]);
        assert_eq!(r.grades, vec![80, 90, 70]);
        assert_eq!(r.average, Some(80.0));
    }

    #[test]
    fn test_clearing_grades_unsets_average() {
        let mut r = StudentRecord::new("A", "G1", "C1").with_grades(vec![50]);
        r.grades.clear();
        r.recompute_average();
        assert_eq!(r.average, None);
    }
}
