//! Interactive menu over a [`Repository`].
//!
//! Record errors (bad number, unknown name, bad grades, unreachable store)
//! are shown to the user and the menu starts over. Only terminal I/O
//! failures end the session early.

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

use crate::analyzers::aggregate::aggregate;
use crate::editor::GradeEditor;
use crate::error::RecordError;
use crate::output::{write_aggregates, write_student, write_student_table};
use crate::record::StudentRecord;
use crate::repository::Repository;
use crate::storage::Storage;

pub struct Session<S: Storage, R: BufRead, W: Write> {
    repo: Repository<S>,
    input: R,
    output: W,
}

impl<S: Storage, R: BufRead, W: Write> Session<S, R, W> {
    pub fn new(repo: Repository<S>, input: R, output: W) -> Self {
        Self {
            repo,
            input,
            output,
        }
    }

    pub fn into_parts(self) -> (Repository<S>, W) {
        (self.repo, self.output)
    }

    /// Runs the menu until the user quits or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "=== Student grades ===")?;
            writeln!(self.output, "1. Add grades to a student")?;
            writeln!(self.output, "2. View a student")?;
            writeln!(self.output, "3. Calculate averages")?;
            writeln!(self.output, "4. List students")?;
            writeln!(self.output, "5. Quit")?;

            let Some(choice) = self.prompt("Choose an action (1-5): ")? else {
                debug!("Input closed, leaving menu");
                return Ok(());
            };

            let outcome = match choice.trim() {
                "1" => self.add_grades(),
                "2" => self.view_student(),
                "3" => self.calculate_averages(),
                "4" => self.list_students(),
                "5" | "q" | "quit" => {
                    writeln!(self.output, "Exiting...")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Error: invalid choice, try again.")?;
                    continue;
                }
            };

            self.recover(outcome)?;
        }
    }

    /// Shows record errors to the user; anything else ends the session.
    fn recover(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(e) => match e.downcast_ref::<RecordError>() {
                Some(record_error) => {
                    warn!(error = %record_error, "Action failed");
                    writeln!(self.output, "Error: {record_error}")?;
                    Ok(())
                }
                None => Err(e),
            },
        }
    }

    /// Reads one line with the line ending removed, or `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Asks for a number or a name and returns the chosen 1-based position.
    fn select(&mut self, records: &[StudentRecord]) -> Result<Option<usize>> {
        writeln!(self.output)?;
        write_student_table(&mut self.output, records)?;
        writeln!(self.output)?;
        writeln!(self.output, "Find the student:")?;
        writeln!(self.output, "1 - by number")?;
        writeln!(self.output, "2 - by full name")?;

        let Some(method) = self.prompt("Your choice: ")? else {
            return Ok(None);
        };

        let position = match method.trim() {
            "1" => {
                let Some(number) = self.prompt("Student number: ")? else {
                    return Ok(None);
                };
                self.repo.find_by_position(&number, records)?.position
            }
            "2" => {
                let Some(name) = self.prompt("Student full name: ")? else {
                    return Ok(None);
                };
                self.repo.find_by_name(&name, records)?.position
            }
            _ => {
                writeln!(self.output, "Error: invalid choice.")?;
                return Ok(None);
            }
        };
        Ok(Some(position))
    }

    fn add_grades(&mut self) -> Result<()> {
        let mut records = self.repo.load()?;
        let Some(position) = self.select(&records)? else {
            return Ok(());
        };

        writeln!(
            self.output,
            "\nAdding grades for: {}",
            records[position - 1].full_name
        )?;
        let Some(input) = self.prompt("Enter grades separated by spaces (100-point scale): ")?
        else {
            return Ok(());
        };

        let updated = GradeEditor::new(&mut self.repo).apply(&mut records, position, &input)?;
        let average = updated.average.unwrap_or_default();
        writeln!(self.output, "Grades added. Average is now {average:.2}.")?;
        Ok(())
    }

    fn view_student(&mut self) -> Result<()> {
        let records = self.repo.load()?;
        let Some(position) = self.select(&records)? else {
            return Ok(());
        };

        writeln!(self.output, "\nStudent details:")?;
        write_student(&mut self.output, &records[position - 1])?;
        Ok(())
    }

    fn calculate_averages(&mut self) -> Result<()> {
        let records = self.repo.load()?;
        let report = aggregate(&records);
        self.repo.save_aggregates(&report.rows)?;

        writeln!(self.output)?;
        write_aggregates(&mut self.output, &report)?;
        writeln!(self.output, "Averages calculated and saved.")?;
        Ok(())
    }

    fn list_students(&mut self) -> Result<()> {
        let records = self.repo.load()?;
        writeln!(self.output)?;
        write_student_table(&mut self.output, &records)?;
        Ok(())
    }
}
