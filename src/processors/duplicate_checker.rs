use crate::error::Result;
use crate::readers::CsvTableReader;
use crate::utils::constants::NA;
use crate::utils::filename::dedup_path;
use crate::writers::create_csv;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    pub total_rows: usize,
    pub duplicate_rows: usize,
    /// Companion file with duplicates removed, written only when some were found
    pub dedup_file: Option<PathBuf>,
}

impl DuplicateReport {
    pub fn has_duplicates(&self) -> bool {
        self.duplicate_rows > 0
    }

    pub fn summary(&self) -> String {
        match &self.dedup_file {
            Some(path) => format!(
                "Duplicates: {} of {} rows, deduplicated copy at {}",
                self.duplicate_rows,
                self.total_rows,
                path.display()
            ),
            None => format!("No duplicate rows found in {} rows", self.total_rows),
        }
    }
}

/// Finds rows equal, column for column, to an earlier row of the same file.
///
/// Columns holding `NA` take part in the comparison like any other value, so
/// rows that only match after a merge filled them count as duplicates.
pub struct DuplicateChecker {
    reader: CsvTableReader,
}

impl DuplicateChecker {
    pub fn new() -> Self {
        Self {
            reader: CsvTableReader::new(),
        }
    }

    /// Count duplicates in `path` and, if any, write first occurrences in
    /// their original order to `<stem>.dedup.<ext>`. `path` is left as is.
    ///
    /// Rows are compared after projection onto the header. Absent, empty and
    /// `NA` cells all compare as missing, so a short record equals its padded
    /// form. A companion left by an earlier check is removed when the file
    /// turns out clean.
    pub fn check(&self, path: &Path) -> Result<DuplicateReport> {
        let table = self.reader.read_table(path)?;

        let mut seen: HashSet<Vec<&str>> = HashSet::with_capacity(table.rows.len());
        let mut unique = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let fields = row.project(&table.header);
            if seen.insert(comparison_key(&fields)) {
                unique.push(fields);
            }
        }
        let total_rows = table.rows.len();

        let mut report = DuplicateReport {
            total_rows,
            duplicate_rows: total_rows - unique.len(),
            dedup_file: None,
        };

        let target = dedup_path(path);
        if !report.has_duplicates() {
            if target.exists() {
                std::fs::remove_file(&target)?;
                info!(dedup_file = %target.display(), "Removed stale deduplicated copy");
            }
            info!(path = %path.display(), "No duplicate rows found");
            return Ok(report);
        }

        let mut writer = create_csv(&target)?;
        writer.write_record(&table.header)?;
        for fields in &unique {
            writer.write_record(fields)?;
        }
        writer.flush()?;

        warn!(
            duplicates = report.duplicate_rows,
            dedup_file = %target.display(),
            "Duplicate rows found; deduplicated copy written"
        );
        report.dedup_file = Some(target);
        Ok(report)
    }
}

fn comparison_key<'a>(fields: &[&'a str]) -> Vec<&'a str> {
    fields
        .iter()
        .map(|field| if field.is_empty() { NA } else { *field })
        .collect()
}

impl Default for DuplicateChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_duplicates_removed_into_companion_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("merged.csv");
        let original = "city_name,date\nBeijing,2024-07-01\nShanghai,2024-07-01\nBeijing,2024-07-01\nBeijing,2024-07-02\n";
        std::fs::write(&path, original)?;

        let report = DuplicateChecker::new().check(&path)?;

        assert_eq!(report.total_rows, 4);
        assert_eq!(report.duplicate_rows, 1);
        let dedup = report.dedup_file.clone().unwrap();
        assert_eq!(dedup, dir.path().join("merged.dedup.csv"));

        let table = CsvTableReader::new().read_table(&dedup)?;
        let cities: Vec<_> = table.rows.iter().map(|r| r.get("city_name").unwrap()).collect();
        assert_eq!(cities, vec!["Beijing", "Shanghai", "Beijing"]);
        assert_eq!(table.rows[2].get("date"), Some("2024-07-02"));

        assert_eq!(std::fs::read_to_string(&path)?, original);
        Ok(())
    }

    #[test]
    fn test_dedup_is_idempotent() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("merged.csv");
        std::fs::write(&path, "a,b\n1,NA\n1,NA\n2,3\n")?;

        let checker = DuplicateChecker::new();
        let first = checker.check(&path)?;
        assert_eq!(first.duplicate_rows, 1);

        let second = checker.check(&first.dedup_file.unwrap())?;
        assert_eq!(second.duplicate_rows, 0);
        assert!(second.dedup_file.is_none());
        Ok(())
    }

    #[test]
    fn test_no_duplicates_writes_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("merged.csv");
        std::fs::write(&path, "a\n1\n2\n")?;

        let report = DuplicateChecker::new().check(&path)?;
        assert!(!report.has_duplicates());
        assert!(!dir.path().join("merged.dedup.csv").exists());
        Ok(())
    }

    #[test]
    fn test_clean_check_removes_stale_companion() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("merged.csv");
        let checker = DuplicateChecker::new();

        std::fs::write(&path, "city_name,date\nA,2024-07-01\nA,2024-07-01\n")?;
        let first = checker.check(&path)?;
        assert_eq!(first.duplicate_rows, 1);
        assert!(dir.path().join("merged.dedup.csv").exists());

        std::fs::write(&path, "city_name,date\nA,2024-07-01\nB,2024-07-01\n")?;
        let second = checker.check(&path)?;
        assert_eq!(second.duplicate_rows, 0);
        assert!(second.dedup_file.is_none());
        assert!(!dir.path().join("merged.dedup.csv").exists());
        Ok(())
    }

    #[test]
    fn test_short_record_matches_padded_record() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("merged.csv");
        std::fs::write(&path, "a,b\n1\n1,\n1,NA\n2,3\n")?;

        let report = DuplicateChecker::new().check(&path)?;

        assert_eq!(report.total_rows, 4);
        assert_eq!(report.duplicate_rows, 2);
        let table = CsvTableReader::new().read_table(&report.dedup_file.unwrap())?;
        assert_eq!(table.rows[0].project(&table.header), vec!["1", "NA"]);
        assert_eq!(table.rows[1].project(&table.header), vec!["2", "3"]);
        Ok(())
    }
}
