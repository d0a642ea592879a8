use std::path::{Path, PathBuf};

pub const STUDENTS_FILE_NAME: &str = "students.csv";
pub const AVERAGES_FILE_NAME: &str = "averages.csv";

/// Where the student and aggregate tables live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub students_file: PathBuf,
    pub averages_file: PathBuf,
}

impl StoreConfig {
    /// Both tables under `data_dir` with their default file names.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            students_file: dir.join(STUDENTS_FILE_NAME),
            averages_file: dir.join(AVERAGES_FILE_NAME),
        }
    }

    /// Replaces individual paths where an override is given.
    pub fn with_overrides(mut self, students: Option<PathBuf>, averages: Option<PathBuf>) -> Self {
        if let Some(path) = students {
            self.students_file = path;
        }
        if let Some(path) = averages {
            self.averages_file = path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir() {
        let cfg = StoreConfig::in_dir("data");
        assert_eq!(cfg.students_file, PathBuf::from("data/students.csv"));
        assert_eq!(cfg.averages_file, PathBuf::from("data/averages.csv"));
    }

    #[test]
    fn test_overrides() {
        let cfg = StoreConfig::in_dir("data")
            .with_overrides(Some(PathBuf::from("/tmp/s.csv")), None);
        assert_eq!(cfg.students_file, PathBuf::from("/tmp/s.csv"));
        assert_eq!(cfg.averages_file, PathBuf::from("data/averages.csv"));
    }
}
