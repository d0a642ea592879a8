//! Persistence collaborator for the record store.
//!
//! [`Storage`] is the contract the repository needs from a backing store.
//! [`CsvStorage`] keeps students and aggregates in two CSV files.
//! [`InMemoryStorage`] keeps everything in memory and is used by tests.
//! [`StoreGuard`] releases the store when an operation finishes, whatever
//! the outcome.

mod csv_store;
mod memory;

pub use csv_store::CsvStorage;
pub use memory::InMemoryStorage;

use std::ops::{Deref, DerefMut};

use crate::analyzers::types::AggregateRow;
use crate::error::Result;
use crate::record::StudentRecord;

/// Column names of the student table. Grades follow as unnamed trailing columns.
pub const STUDENT_HEADER: [&str; 4] = ["full_name", "group", "course", "average"];

/// Column names of the aggregate table.
pub const AGGREGATE_HEADER: [&str; 3] = ["group", "course", "mean_of_means"];

pub trait Storage {
    /// Create empty student and aggregate tables if none exist yet.
    fn initialize_if_absent(&mut self) -> Result<()>;

    /// All student rows in stored order.
    fn read_all_students(&mut self) -> Result<Vec<StudentRecord>>;

    /// Overwrite the student at 1-based `position`.
    fn write_student(&mut self, position: usize, record: &StudentRecord) -> Result<()>;

    /// Replace the whole student table.
    fn write_all_students(&mut self, records: &[StudentRecord]) -> Result<()>;

    /// Replace the whole aggregate table.
    fn write_all_aggregates(&mut self, rows: &[AggregateRow]) -> Result<()>;

    /// Release any handle held open by the previous calls.
    fn close(&mut self);
}

/// Scoped access to a [`Storage`]; calls [`Storage::close`] on drop.
pub struct StoreGuard<'a, S: Storage> {
    store: &'a mut S,
}

impl<'a, S: Storage> StoreGuard<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }
}

impl<S: Storage> Deref for StoreGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: Storage> DerefMut for StoreGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: Storage> Drop for StoreGuard<'_, S> {
    fn drop(&mut self) {
        self.store.close();
    }
}
