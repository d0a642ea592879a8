//! Group and overall averages.
//!
//! This module scans the student records, collects per-student averages
//! under each `(group, course)` pair, and produces the aggregate table that
//! replaces the stored one on every run.

pub mod aggregate;
pub mod types;
pub mod utility;
