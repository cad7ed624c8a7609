use crate::error::{PipelineError, Result};
use crate::models::Row;
use crate::readers::CsvTableReader;
use crate::utils::constants::DATE_COLUMN;
use crate::writers::create_csv;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"))
}

/// Literal `YYYY-MM-DD` shape check. `2024-13-40` passes: no calendar check.
pub fn is_valid_date_format(value: &str) -> bool {
    date_pattern().is_match(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDate {
    /// 1-based data row, header excluded
    pub row: usize,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct DateFormatReport {
    pub rows_checked: usize,
    pub empty_dates: usize,
    pub invalid_dates: Vec<InvalidDate>,
}

impl DateFormatReport {
    pub fn has_warnings(&self) -> bool {
        !self.invalid_dates.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Date check: {} rows, {} empty, {} malformed",
            self.rows_checked,
            self.empty_dates,
            self.invalid_dates.len()
        );
        for invalid in self.invalid_dates.iter().take(10) {
            summary.push_str(&format!("\n  row {}: '{}'", invalid.row, invalid.value));
        }
        summary
    }
}

/// Observes the `date` column; never changes or drops a row.
pub struct DateValidator {
    column: String,
}

impl DateValidator {
    pub fn new() -> Self {
        Self {
            column: DATE_COLUMN.to_string(),
        }
    }

    /// Record the row in `report`; empty or absent dates are skipped.
    pub fn check_row(&self, row: &Row, report: &mut DateFormatReport) {
        report.rows_checked += 1;

        match row.get(&self.column) {
            Some(value) if !value.is_empty() => {
                if !is_valid_date_format(value) {
                    debug!(row = report.rows_checked, value, "Malformed date");
                    report.invalid_dates.push(InvalidDate {
                        row: report.rows_checked,
                        value: value.to_string(),
                    });
                }
            }
            _ => report.empty_dates += 1,
        }
    }

    /// Copy `input` to `output` unchanged while checking every date.
    pub fn validate_and_copy(&self, input: &Path, output: &Path) -> Result<DateFormatReport> {
        let reader = CsvTableReader::new();
        let header = reader.read_header(input)?;
        if !header.iter().any(|c| c == &self.column) {
            return Err(PipelineError::MissingColumns {
                missing: vec![self.column.clone()],
            });
        }

        let mut writer = create_csv(output)?;
        writer.write_record(&header)?;

        let mut report = DateFormatReport::default();
        reader.for_each_row(input, |row| {
            self.check_row(&row, &mut report);
            writer.write_record(row.project(&header))?;
            Ok(())
        })?;
        writer.flush()?;

        if report.has_warnings() {
            warn!(
                malformed = report.invalid_dates.len(),
                "Incorrect date format found. Manual checking is required."
            );
        }

        Ok(report)
    }
}

impl Default for DateValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_date_format_acceptance() {
        assert!(is_valid_date_format("2024-07-01"));
        assert!(is_valid_date_format("2024-13-40"));
        assert!(!is_valid_date_format("2024-7-1"));
        assert!(!is_valid_date_format("abcd-ef-gh"));
        assert!(!is_valid_date_format("2024-07-01 "));
        assert!(!is_valid_date_format("2024-07-01\n"));
        assert!(!is_valid_date_format("٢٠٢٤-٠٧-٠١"));
    }

    #[test]
    fn test_empty_date_is_skipped() {
        let validator = DateValidator::new();
        let mut report = DateFormatReport::default();

        let row: Row = [("date", ""), ("city_name", "Beijing")].into_iter().collect();
        validator.check_row(&row, &mut report);

        assert_eq!(report.empty_dates, 1);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_validate_and_copy_keeps_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        let mut file = std::fs::File::create(&input)?;
        file.write_all(b"city_name,date\nBeijing,2024-07-01\nShanghai,2024-7-2\nShenzhen,\n")?;

        let report = DateValidator::new().validate_and_copy(&input, &output)?;

        assert_eq!(report.rows_checked, 3);
        assert_eq!(report.empty_dates, 1);
        assert_eq!(
            report.invalid_dates,
            vec![InvalidDate {
                row: 2,
                value: "2024-7-2".to_string()
            }]
        );

        let table = CsvTableReader::new().read_table(&output)?;
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].get("date"), Some("2024-7-2"));
        assert_eq!(table.rows[2].get("date"), Some(""));
        Ok(())
    }

    #[test]
    fn test_missing_date_column() -> Result<()> {
        let dir = TempDir::new()?;
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "city_name\nBeijing\n")?;

        let result = DateValidator::new().validate_and_copy(&input, &dir.path().join("out.csv"));
        assert!(matches!(result, Err(PipelineError::MissingColumns { .. })));
        Ok(())
    }
}
