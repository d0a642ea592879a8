//! Grade entry.
//!
//! Input is a whitespace-separated list of integers on a 100-point scale.
//! The scale is not enforced; any value that parses as an integer is
//! accepted. A rejected input or a failed save leaves the record as it was.

use tracing::{info, warn};

use crate::error::{RecordError, Result};
use crate::record::StudentRecord;
use crate::repository::Repository;
use crate::storage::Storage;

/// Parses grade input, rejecting the whole line on the first bad token.
pub fn parse_grades(input: &str) -> Result<Vec<i32>> {
    let grades = input
        .split_whitespace()
        .map(|token| {
            token.parse::<i32>().map_err(|_| RecordError::InvalidGradeInput {
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if grades.is_empty() {
        return Err(RecordError::InvalidGradeInput {
            token: String::new(),
        });
    }
    Ok(grades)
}

/// Returns a copy of `record` with `grades` appended and the average taken
/// over every grade it now holds.
pub fn apply_grades(record: &StudentRecord, grades: &[i32]) -> StudentRecord {
    let mut updated = record.clone();
    updated.push_grades(grades);
    updated
}

/// Appends grades to a selected student and persists the result.
pub struct GradeEditor<'r, S: Storage> {
    repo: &'r mut Repository<S>,
}

impl<'r, S: Storage> GradeEditor<'r, S> {
    pub fn new(repo: &'r mut Repository<S>) -> Self {
        Self { repo }
    }

    /// Adds the grades in `input` to the student at 1-based `position` in
    /// `records`.
    ///
    /// The store is written before `records` is touched, so on any error both
    /// still hold the previous grades and average.
    #[tracing::instrument(skip(self, records))]
    pub fn apply<'a>(
        &mut self,
        records: &'a mut [StudentRecord],
        position: usize,
        input: &str,
    ) -> Result<&'a StudentRecord> {
        let count = records.len();
        let slot = position
            .checked_sub(1)
            .and_then(|i| records.get_mut(i))
            .ok_or_else(|| RecordError::InvalidPosition {
                input: position.to_string(),
                count,
            })?;

        let grades =
            parse_grades(input).inspect_err(|e| warn!(error = %e, "Grade input rejected"))?;
        let updated = apply_grades(slot, &grades);

        self.repo.save_student(position, &updated)?;

        info!(
            student = %updated.full_name,
            added = grades.len(),
            total = updated.grades.len(),
            average = updated.average,
            "Grades added"
        );
        *slot = updated;
        Ok(slot)
    }
}
