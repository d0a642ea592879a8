//! CSV persistence for students and aggregates.
//!
//! The student table has a fixed four-column header; each student's grades
//! follow the average as trailing columns, so rows have variable width.
//! Writes go to a sibling `.tmp` file that is renamed over the target once
//! complete.

use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analyzers::types::{AggregateKey, AggregateRow, OVERALL_LABEL};
use crate::config::StoreConfig;
use crate::error::{RecordError, Result};
use crate::record::StudentRecord;

use super::{AGGREGATE_HEADER, STUDENT_HEADER, Storage};

/// Students and aggregates stored as two CSV files.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    students_path: PathBuf,
    averages_path: PathBuf,
}

impl CsvStorage {
    pub fn new(students_path: impl Into<PathBuf>, averages_path: impl Into<PathBuf>) -> Self {
        Self {
            students_path: students_path.into(),
            averages_path: averages_path.into(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.students_file, &config.averages_file)
    }

    pub fn students_path(&self) -> &Path {
        &self.students_path
    }

    pub fn averages_path(&self) -> &Path {
        &self.averages_path
    }
}

impl Storage for CsvStorage {
    #[tracing::instrument(skip(self))]
    fn initialize_if_absent(&mut self) -> Result<()> {
        create_with_header(&self.students_path, &STUDENT_HEADER)?;
        create_with_header(&self.averages_path, &AGGREGATE_HEADER)?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn read_all_students(&mut self) -> Result<Vec<StudentRecord>> {
        let path = &self.students_path;
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| unavailable(path, e))?;

        let header = rdr.headers().map_err(|e| unavailable(path, e))?;
        if !header.iter().take(STUDENT_HEADER.len()).eq(STUDENT_HEADER) {
            return Err(RecordError::MalformedRow {
                row: 0,
                reason: format!(
                    "expected header {:?}, found {:?}",
                    STUDENT_HEADER.join(","),
                    header.iter().collect::<Vec<_>>().join(",")
                ),
            });
        }

        let mut students = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = result.map_err(|e| unavailable(path, e))?;
            students.push(decode_student(i + 1, &row)?);
        }

        debug!(path = %path.display(), count = students.len(), "Students loaded");
        Ok(students)
    }

    #[tracing::instrument(skip(self, record), fields(student = %record.full_name))]
    fn write_student(&mut self, position: usize, record: &StudentRecord) -> Result<()> {
        let mut students = self.read_all_students()?;
        let count = students.len();
        let slot = position
            .checked_sub(1)
            .and_then(|i| students.get_mut(i))
            .ok_or_else(|| RecordError::InvalidPosition {
                input: position.to_string(),
                count,
            })?;
        *slot = record.clone();
        self.write_all_students(&students)
    }

    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    fn write_all_students(&mut self, records: &[StudentRecord]) -> Result<()> {
        replace_file(&self.students_path, |writer| {
            writer.write_record(STUDENT_HEADER)?;
            for record in records {
                writer.write_record(encode_student(record))?;
            }
            Ok(())
        })
    }

    #[tracing::instrument(skip(self, rows), fields(count = rows.len()))]
    fn write_all_aggregates(&mut self, rows: &[AggregateRow]) -> Result<()> {
        replace_file(&self.averages_path, |writer| {
            writer.write_record(AGGREGATE_HEADER)?;
            for row in rows {
                let (group, course) = row.key.columns();
                let mean = row.mean_of_means.to_string();
                match row.key {
                    AggregateKey::Group { .. } => {
                        writer.write_record([group, course, mean.as_str()])?
                    }
                    AggregateKey::Overall => {
                        writer.write_record([group, course, mean.as_str(), OVERALL_LABEL])?
                    }
                }
            }
            Ok(())
        })
    }

    fn close(&mut self) {
        // Files are opened and closed inside each call.
    }
}

fn unavailable(path: &Path, e: impl std::fmt::Display) -> RecordError {
    RecordError::StorageUnavailable(format!("{}: {}", path.display(), e))
}

fn create_with_header(path: &Path, header: &[&str]) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| unavailable(dir, e))?;
    }
    replace_file(path, |writer| {
        writer.write_record(header)?;
        Ok(())
    })?;
    info!(path = %path.display(), "Created empty table");
    Ok(())
}

/// Writes the whole file through a temporary sibling, leaving the previous
/// contents in place if anything fails.
fn replace_file<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut Writer<File>) -> Result<()>,
{
    let tmp = path.with_extension("csv.tmp");
    let written = WriterBuilder::new()
        .flexible(true)
        .from_path(&tmp)
        .map_err(RecordError::from)
        .and_then(|mut writer| {
            fill(&mut writer)?;
            writer.flush()?;
            Ok(())
        });

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(match e {
            RecordError::StorageUnavailable(reason) => unavailable(path, reason),
            other => other,
        });
    }

    fs::rename(&tmp, path).map_err(|e| unavailable(path, e))?;
    debug!(path = %path.display(), "Table written");
    Ok(())
}

fn encode_student(record: &StudentRecord) -> Vec<String> {
    let mut fields = vec![
        record.full_name.clone(),
        record.group.clone(),
        record.course.clone(),
        record.average.map(|a| a.to_string()).unwrap_or_default(),
    ];
    fields.extend(record.grades.iter().map(|g| g.to_string()));
    fields
}

fn decode_student(row: usize, fields: &StringRecord) -> Result<StudentRecord> {
    let malformed = |reason: String| RecordError::MalformedRow { row, reason };

    if fields.len() < 3 {
        return Err(malformed(format!(
            "expected at least 3 columns, found {}",
            fields.len()
        )));
    }

    let stored_average = match fields.get(3).map(str::trim) {
        None | Some("") => None,
        Some(cell) => Some(
            cell.parse::<f64>()
                .map_err(|_| malformed(format!("average {cell:?} is not a number")))?,
        ),
    };

    let grades = fields
        .iter()
        .skip(STUDENT_HEADER.len())
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            cell.parse::<i32>()
                .map_err(|_| malformed(format!("grade {cell:?} is not an integer")))
        })
        .collect::<Result<Vec<_>>>()?;

    let student = StudentRecord::new(&fields[0], &fields[1], &fields[2]).with_grades(grades);

    match (stored_average, student.average) {
        (Some(stored), Some(actual)) if (stored - actual).abs() > 1e-9 => {
            warn!(row, stored, actual, "Stored average disagrees with grades, using grades");
        }
        (Some(stored), None) => {
            warn!(row, stored, "Stored average without grades ignored");
        }
        _ => {}
    }

    Ok(student)
}
