//! Text and JSON rendering of students and aggregates.

use anyhow::Result;
use std::io::Write;

use crate::analyzers::types::AggregateReport;
use crate::record::StudentRecord;

fn format_average(average: Option<f64>) -> String {
    average.map_or_else(|| "-".to_string(), |a| format!("{a:.2}"))
}

/// Writes the numbered student table, in stored order.
pub fn write_student_table(out: &mut impl Write, records: &[StudentRecord]) -> Result<()> {
    writeln!(out, "No.\tFull name\tGroup\tCourse\tAverage")?;
    for (i, r) in records.iter().enumerate() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            i + 1,
            r.full_name,
            r.group,
            r.course,
            format_average(r.average)
        )?;
    }
    Ok(())
}

/// Writes one student's details and grade history.
pub fn write_student(out: &mut impl Write, record: &StudentRecord) -> Result<()> {
    let grades = record
        .grades
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    writeln!(out, "Full name: {}", record.full_name)?;
    writeln!(out, "Group: {}", record.group)?;
    writeln!(out, "Course: {}", record.course)?;
    writeln!(out, "Average: {}", format_average(record.average))?;
    writeln!(out, "Grades: {}", if grades.is_empty() { "-" } else { grades.as_str() })?;
    Ok(())
}

/// Writes the aggregate table; the overall row is labelled as such.
pub fn write_aggregates(out: &mut impl Write, report: &AggregateReport) -> Result<()> {
    if report.is_empty() {
        writeln!(out, "No graded students yet, nothing to aggregate.")?;
        return Ok(());
    }

    writeln!(out, "Group\tCourse\tAverage")?;
    for row in report.groups() {
        let (group, course) = row.key.columns();
        writeln!(out, "{}\t{}\t{:.2}", group, course, row.mean_of_means)?;
    }
    if let Some(overall) = report.overall() {
        writeln!(out, "All students\t\t{:.2}", overall.mean_of_means)?;
    }
    Ok(())
}

/// Writes the aggregate report as pretty-printed JSON.
pub fn write_json(out: &mut impl Write, report: &AggregateReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
