use crate::config::AggregatorConfig;
use crate::error::{PipelineError, Result};
use crate::processors::date_validator::{DateFormatReport, DateValidator};
use crate::processors::duplicate_checker::{DuplicateChecker, DuplicateReport};
use crate::readers::CsvTableReader;
use crate::utils::confirm::Confirm;
use crate::utils::constants::REQUIRED_COLUMNS;
use crate::utils::filename::{backup_path, dedup_path, normalize_path, parent_dir};
use std::collections::BTreeSet;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct AggregationSummary {
    pub inputs: Vec<PathBuf>,
    pub output_file: PathBuf,
    pub columns: Vec<String>,
    pub rows_written: usize,
    pub duplicates: DuplicateReport,
    pub date_formats: DateFormatReport,
}

impl AggregationSummary {
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("=== Aggregation Report ===\n");
        summary.push_str(&format!("Input files: {}\n", self.inputs.len()));
        for input in &self.inputs {
            summary.push_str(&format!("  • {}\n", input.display()));
        }
        summary.push_str(&format!("Rows written: {}\n", self.rows_written));
        summary.push_str(&format!("Total number of columns: {}\n", self.columns.len()));
        summary.push_str(&format!("Columns: {}\n", self.columns.join(", ")));
        summary.push_str(&format!("{}\n", self.duplicates.summary()));
        summary.push_str(&format!("{}\n", self.date_formats.summary()));
        summary.push_str(&format!("Output file: {}", self.output_file.display()));
        summary
    }
}

/// Merges every per-run CSV in a directory into one file over the union of
/// their headers.
pub struct Aggregator {
    input_dir: PathBuf,
    pattern: String,
    output_file: PathBuf,
    reader: CsvTableReader,
}

impl Aggregator {
    pub fn new(config: &AggregatorConfig) -> Self {
        Self {
            input_dir: config.input_dir.clone(),
            pattern: config.input_pattern.clone(),
            output_file: config.aggregated_file.clone(),
            reader: CsvTableReader::new(),
        }
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Aggregate behind an overwrite confirmation.
    ///
    /// An existing output is moved to its `_old` name while the merge runs,
    /// deleted once the merge succeeds and moved back if it fails.
    pub fn run(&self, confirm: &mut dyn Confirm) -> Result<AggregationSummary> {
        if !self.output_file.exists() {
            return self.aggregate();
        }

        let prompt = format!(
            "Warning: the aggregated file '{}' already exists. Do you want to overwrite it?",
            self.output_file.display()
        );
        if !confirm.confirm(&prompt) {
            return Err(PipelineError::Cancelled);
        }

        let backup = backup_path(&self.output_file);
        fs::rename(&self.output_file, &backup)?;

        match self.aggregate() {
            Ok(summary) => {
                fs::remove_file(&backup)?;
                Ok(summary)
            }
            Err(e) => {
                if self.output_file.exists() {
                    fs::remove_file(&self.output_file)?;
                }
                fs::rename(&backup, &self.output_file)?;
                warn!(
                    output = %self.output_file.display(),
                    "Aggregation failed; previous output restored"
                );
                Err(e)
            }
        }
    }

    /// Merge, validate dates and check duplicates without asking anything.
    pub fn aggregate(&self) -> Result<AggregationSummary> {
        let inputs = self.discover_inputs()?;
        if inputs.is_empty() {
            error!(pattern = %self.pattern, dir = %self.input_dir.display(), "No CSV files found");
            return Err(PipelineError::NoInputFiles {
                dir: self.input_dir.clone(),
                pattern: self.pattern.clone(),
            });
        }

        let columns = self.union_header(&inputs)?;
        check_required_columns(&columns)?;
        info!(count = columns.len(), "Total number of columns");
        info!(columns = %columns.join(", "), "Columns");

        let out_dir = parent_dir(&self.output_file);
        fs::create_dir_all(out_dir)?;
        let merged = NamedTempFile::new_in(out_dir)?;
        let rows_written = self.merge_into(&inputs, &columns, merged.path())?;

        let date_formats = DateValidator::new().validate_and_copy(merged.path(), &self.output_file)?;
        drop(merged);

        let duplicates = DuplicateChecker::new().check(&self.output_file)?;

        info!(output = %self.output_file.display(), rows = rows_written, "Aggregation complete");
        Ok(AggregationSummary {
            inputs,
            output_file: self.output_file.clone(),
            columns,
            rows_written,
            duplicates,
            date_formats,
        })
    }

    /// Files matching the pattern, sorted, excluding this aggregator's own
    /// output and the files derived from it.
    pub fn discover_inputs(&self) -> Result<Vec<PathBuf>> {
        let dir = glob::Pattern::escape(&self.input_dir.to_string_lossy());
        let pattern = Path::new(&dir).join(&self.pattern);

        let excluded: Vec<PathBuf> = [
            self.output_file.clone(),
            backup_path(&self.output_file),
            dedup_path(&self.output_file),
        ]
        .iter()
        .map(|p| normalize_path(p))
        .collect();

        let mut inputs = Vec::new();
        for entry in glob::glob(&pattern.to_string_lossy())? {
            let path = entry?;
            if !path.is_file() {
                continue;
            }
            if excluded.contains(&normalize_path(&path)) {
                info!(path = %path.display(), "Skipping aggregator output");
                continue;
            }
            inputs.push(path);
        }

        inputs.sort();
        Ok(inputs)
    }

    /// Sorted union of every input header.
    pub fn union_header(&self, inputs: &[PathBuf]) -> Result<Vec<String>> {
        let mut columns = BTreeSet::new();
        for input in inputs {
            columns.extend(self.reader.read_header(input)?);
        }
        Ok(columns.into_iter().collect())
    }

    /// Stream every input row into `dest` projected onto `columns`.
    pub fn merge_into(&self, inputs: &[PathBuf], columns: &[String], dest: &Path) -> Result<usize> {
        let mut writer = csv::Writer::from_writer(BufWriter::new(fs::File::create(dest)?));
        writer.write_record(columns)?;

        let mut rows = 0;
        for input in inputs {
            info!(file = %input.display(), "Processing");
            self.reader.for_each_row(input, |row| {
                writer.write_record(row.project(columns))?;
                rows += 1;
                Ok(())
            })?;
        }
        writer.flush()?;

        Ok(rows)
    }
}

fn check_required_columns(columns: &[String]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        error!(missing = %missing.join(", "), "'date' and 'city_name' columns are required");
        Err(PipelineError::MissingColumns { missing })
    }
}
