//! Loading, saving and selecting student records.

use tracing::{debug, info};

use crate::analyzers::types::AggregateRow;
use crate::error::{RecordError, Result};
use crate::record::StudentRecord;
use crate::storage::{Storage, StoreGuard};

/// A record picked out of a loaded list, with its 1-based position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub position: usize,
    pub record: &'a StudentRecord,
}

/// Owns the storage handle for the duration of a session.
///
/// Every call opens the store through a [`StoreGuard`], so the handle is
/// released whether the call succeeds or fails.
pub struct Repository<S: Storage> {
    store: S,
}

impl<S: Storage> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn open(&mut self) -> StoreGuard<'_, S> {
        StoreGuard::new(&mut self.store)
    }

    /// Creates empty tables on first run.
    pub fn initialize(&mut self) -> Result<()> {
        self.open().initialize_if_absent()
    }

    /// All students in stored order.
    #[tracing::instrument(skip(self))]
    pub fn load(&mut self) -> Result<Vec<StudentRecord>> {
        let records = self.open().read_all_students()?;
        debug!(count = records.len(), "Loaded students");
        Ok(records)
    }

    /// Rewrites the whole student table from `records`.
    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    pub fn save(&mut self, records: &[StudentRecord]) -> Result<()> {
        self.open().write_all_students(records)
    }

    #[tracing::instrument(skip(self, record), fields(student = %record.full_name))]
    pub fn save_student(&mut self, position: usize, record: &StudentRecord) -> Result<()> {
        self.open().write_student(position, record)?;
        info!(position, "Student saved");
        Ok(())
    }

    /// Replaces the stored aggregate table with `rows`.
    #[tracing::instrument(skip(self, rows), fields(count = rows.len()))]
    pub fn save_aggregates(&mut self, rows: &[AggregateRow]) -> Result<()> {
        self.open().write_all_aggregates(rows)
    }

    /// Selects by 1-based position. `index` must parse as an integer in
    /// `[1, records.len()]`.
    pub fn find_by_position<'a>(
        &self,
        index: &str,
        records: &'a [StudentRecord],
    ) -> Result<Selection<'a>> {
        let invalid = || RecordError::InvalidPosition {
            input: index.to_string(),
            count: records.len(),
        };

        let position: usize = index.trim().parse().map_err(|_| invalid())?;
        let record = position
            .checked_sub(1)
            .and_then(|i| records.get(i))
            .ok_or_else(invalid)?;

        Ok(Selection { position, record })
    }

    /// Selects the first record whose name equals `name` exactly.
    pub fn find_by_name<'a>(
        &self,
        name: &str,
        records: &'a [StudentRecord],
    ) -> Result<Selection<'a>> {
        records
            .iter()
            .enumerate()
            .find(|(_, r)| r.full_name == name)
            .map(|(i, record)| Selection {
                position: i + 1,
                record,
            })
            .ok_or_else(|| RecordError::NotFound(name.to_string()))
    }
}
