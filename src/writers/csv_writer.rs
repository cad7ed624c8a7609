use crate::error::{PipelineError, Result};
use crate::models::Row;
use crate::readers::CsvTableReader;
use crate::utils::constants::UTF8_BOM;
use crate::utils::filename::parent_dir;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Columns a single write added to, or left out of, the file header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaChange {
    pub added: Vec<String>,
    pub missing: Vec<String>,
}

impl SchemaChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.missing.is_empty()
    }
}

/// Appends rows with heterogeneous keys to one CSV file whose header is the
/// union of every key seen so far.
///
/// The header starts as the first row's keys and only ever grows. When a row
/// brings a column the file has not seen, the whole file is rewritten through
/// a temporary sibling with `NA` backfilled into every earlier row, then
/// renamed over the original. Cost is O(rows) per header change, which is fine
/// for a few cities over a few weeks but grows quadratically on long runs
/// where the upstream schema keeps drifting.
///
/// Rows missing some header columns are appended with `NA` in those columns.
pub struct SchemaReconcilingWriter {
    path: PathBuf,
    header: Vec<String>,
    rows_written: usize,
    rewrites: usize,
}

impl SchemaReconcilingWriter {
    /// Writer for a fresh file. Nothing touches the disk until the first row,
    /// which truncates whatever was at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: Vec::new(),
            rows_written: 0,
            rewrites: 0,
        }
    }

    /// Continue appending to a file written by an earlier run.
    pub fn resume(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (header, records) = CsvTableReader::new().read_records(&path)?;

        Ok(Self {
            path,
            header,
            rows_written: records.len(),
            rewrites: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Number of full-file rewrites caused by new columns.
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    pub fn write_row(&mut self, row: &Row) -> Result<SchemaChange> {
        if row.is_empty() {
            return Err(PipelineError::InvalidFormat(
                "cannot write a row without columns".to_string(),
            ));
        }

        if self.header.is_empty() {
            self.header = row.columns().map(str::to_string).collect();
            {
                let mut writer = create_csv(&self.path)?;
                writer.write_record(&self.header)?;
                writer.flush()?;
            }
            self.append(row)?;
            return Ok(SchemaChange::default());
        }

        let change = SchemaChange {
            added: row
                .columns()
                .filter(|column| !self.header.iter().any(|h| h == column))
                .map(str::to_string)
                .collect(),
            missing: row
                .missing_from(&self.header)
                .into_iter()
                .map(str::to_string)
                .collect(),
        };

        if !change.added.is_empty() {
            self.header.extend(change.added.iter().cloned());
            self.rewrite_with_header()?;
        }

        self.append(row)?;
        Ok(change)
    }

    fn append(&mut self, row: &Row) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        writer.write_record(row.project(&self.header))?;
        writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    fn rewrite_with_header(&mut self) -> Result<()> {
        let mut temp = NamedTempFile::new_in(parent_dir(&self.path))?;
        temp.write_all(UTF8_BOM)?;

        {
            let mut writer = csv::Writer::from_writer(BufWriter::new(temp.as_file_mut()));
            writer.write_record(&self.header)?;

            CsvTableReader::new().for_each_row(&self.path, |row| {
                writer.write_record(row.project(&self.header))?;
                Ok(())
            })?;
            writer.flush()?;
        }

        // The temp file is created 0600; keep the original's mode.
        let permissions = std::fs::metadata(&self.path)?.permissions();
        temp.as_file().set_permissions(permissions)?;
        temp.persist(&self.path)?;
        self.rewrites += 1;
        debug!(
            path = %self.path.display(),
            columns = self.header.len(),
            rows = self.rows_written,
            "Rewrote CSV with extended header"
        );
        Ok(())
    }
}

/// Create (or truncate) `path` and return a CSV writer positioned after the BOM.
pub fn create_csv(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    std::fs::create_dir_all(parent_dir(path))?;

    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;
    Ok(csv::Writer::from_writer(file))
}
