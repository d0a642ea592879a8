use crate::analyzers::types::AggregateRow;
use crate::error::{RecordError, Result};
use crate::record::StudentRecord;

use super::Storage;

/// A [`Storage`] that never touches the filesystem.
///
/// `set_unavailable` makes every call fail with
/// [`RecordError::StorageUnavailable`], which lets callers check that a
/// failed persist leaves their state untouched.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    students: Vec<StudentRecord>,
    aggregates: Vec<AggregateRow>,
    initialized: bool,
    unavailable: bool,
    closes: usize,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds these students.
    pub fn with_students(students: Vec<StudentRecord>) -> Self {
        Self {
            students,
            initialized: true,
            ..Default::default()
        }
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn aggregates(&self) -> &[AggregateRow] {
        &self.aggregates
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn close_count(&self) -> usize {
        self.closes
    }

    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    fn check(&self) -> Result<()> {
        if self.unavailable {
            return Err(RecordError::StorageUnavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Storage for InMemoryStorage {
    fn initialize_if_absent(&mut self) -> Result<()> {
        self.check()?;
        self.initialized = true;
        Ok(())
    }

    fn read_all_students(&mut self) -> Result<Vec<StudentRecord>> {
        self.check()?;
        Ok(self.students.clone())
    }

    fn write_student(&mut self, position: usize, record: &StudentRecord) -> Result<()> {
        self.check()?;
        let count = self.students.len();
        let slot = position
            .checked_sub(1)
            .and_then(|i| self.students.get_mut(i))
            .ok_or_else(|| RecordError::InvalidPosition {
                input: position.to_string(),
                count,
            })?;
        *slot = record.clone();
        Ok(())
    }

    fn write_all_students(&mut self, records: &[StudentRecord]) -> Result<()> {
        self.check()?;
        self.students = records.to_vec();
        Ok(())
    }

    fn write_all_aggregates(&mut self, rows: &[AggregateRow]) -> Result<()> {
        self.check()?;
        self.aggregates = rows.to_vec();
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}
