use crate::error::{PipelineError, Result};
use crate::models::Row;
use csv::StringRecord;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::warn;

/// Header plus rows of one CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

/// Reads the UTF-8 (optionally BOM-prefixed) CSV files this crate produces.
pub struct CsvTableReader;

impl CsvTableReader {
    pub fn new() -> Self {
        Self
    }

    /// Read only the header line.
    pub fn read_header(&self, path: &Path) -> Result<Vec<String>> {
        let mut reader = self.open(path)?;
        Ok(header_of(&mut reader)?)
    }

    /// Read the whole file into memory.
    pub fn read_table(&self, path: &Path) -> Result<CsvTable> {
        let mut rows = Vec::new();
        let header = self.for_each_row(path, |row| {
            rows.push(row);
            Ok(())
        })?;

        Ok(CsvTable { header, rows })
    }

    /// Stream rows one by one, returning the file's header when done.
    ///
    /// Records shorter than the header leave the trailing columns absent;
    /// longer ones are an error.
    pub fn for_each_row<F>(&self, path: &Path, mut f: F) -> Result<Vec<String>>
    where
        F: FnMut(Row) -> Result<()>,
    {
        let mut reader = self.open(path)?;
        let header = header_of(&mut reader)?;

        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            if record.len() > header.len() {
                let line = record.position().map_or(0, |p| p.line());
                return Err(PipelineError::InvalidFormat(format!(
                    "{}:{}: record has {} fields but the header has {}",
                    path.display(),
                    line,
                    record.len(),
                    header.len()
                )));
            }
            f(Row::from_record(&header, record.iter()))?;
        }

        Ok(header)
    }

    /// Read raw records without mapping them onto the header.
    pub fn read_records(&self, path: &Path) -> Result<(Vec<String>, Vec<StringRecord>)> {
        let mut reader = self.open(path)?;
        let header = header_of(&mut reader)?;
        let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((header, records))
    }

    fn open(&self, path: &Path) -> Result<csv::Reader<Cursor<String>>> {
        let bytes = fs::read(path)?;
        let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
        if had_errors {
            warn!(path = %path.display(), "Invalid UTF-8 replaced while reading CSV");
        }

        Ok(csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(Cursor::new(text.into_owned())))
    }
}

impl Default for CsvTableReader {
    fn default() -> Self {
        Self::new()
    }
}

fn header_of<R: std::io::Read>(reader: &mut csv::Reader<R>) -> csv::Result<Vec<String>> {
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_bom_prefixed_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"\xEF\xBB\xBFdate,city_name\n2024-07-01,Shenzhen\n")?;

        let table = CsvTableReader::new().read_table(file.path())?;

        assert_eq!(table.header, vec!["date", "city_name"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("date"), Some("2024-07-01"));
        Ok(())
    }

    #[test]
    fn test_short_record_leaves_columns_absent() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"a,b,c\n1,2\n")?;

        let table = CsvTableReader::new().read_table(file.path())?;

        assert_eq!(table.rows[0].get("b"), Some("2"));
        assert!(!table.rows[0].contains("c"));
        Ok(())
    }

    #[test]
    fn test_long_record_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"a,b\n1,2,3\n")?;

        let result = CsvTableReader::new().read_table(file.path());
        assert!(matches!(result, Err(PipelineError::InvalidFormat(_))));
        Ok(())
    }

    #[test]
    fn test_header_only_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"a,b\n")?;

        let reader = CsvTableReader::new();
        assert_eq!(reader.read_header(file.path())?, vec!["a", "b"]);
        assert!(reader.read_table(file.path())?.rows.is_empty());
        Ok(())
    }
}
