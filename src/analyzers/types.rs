//! Data types produced by the aggregation pass.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder written in the group and course columns of the overall row.
pub const OVERALL_MARKER: &str = "-";

/// Trailing cell that marks the overall row, so a real `("-", "-")` group
/// stays distinguishable from it.
pub const OVERALL_LABEL: &str = "overall";

/// Identifies what an aggregate row summarizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum AggregateKey {
    /// Every student sharing exactly this group and course.
    Group { group: String, course: String },
    /// Every eligible student in the dataset.
    Overall,
}

impl AggregateKey {
    pub fn group(group: &str, course: &str) -> Self {
        AggregateKey::Group {
            group: group.to_string(),
            course: course.to_string(),
        }
    }

    /// The `(group, course)` cells used when the row is stored.
    pub fn columns(&self) -> (&str, &str) {
        match self {
            AggregateKey::Group { group, course } => (group, course),
            AggregateKey::Overall => (OVERALL_MARKER, OVERALL_MARKER),
        }
    }
}

/// Unweighted mean of the per-student averages under one key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: AggregateKey,
    pub mean_of_means: f64,
    pub students: usize,
}

/// Result of one aggregation run, serialized for `aggregate --json`.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateReport {
    /// True when no record had an average, so nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn overall(&self) -> Option<&AggregateRow> {
        self.rows
            .last()
            .filter(|row| row.key == AggregateKey::Overall)
    }

    /// Rows for individual `(group, course)` pairs, in first-seen order.
    pub fn groups(&self) -> impl Iterator<Item = &AggregateRow> {
        self.rows
            .iter()
            .filter(|row| row.key != AggregateKey::Overall)
    }
}
