use crate::utils::constants::NA;

/// A single flat record: column names mapped to their rendered values.
///
/// Insertion order is preserved because it decides the column order of a
/// freshly created CSV file. Rows carry a few dozen columns at most, so
/// lookups are linear scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from a header and one record aligned with it.
    ///
    /// Short records leave the trailing columns absent rather than empty.
    pub fn from_record<'a, I>(header: &[String], record: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        header
            .iter()
            .zip(record)
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect()
    }

    /// Set `column` to `value`, replacing the old value in place if present.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let column = column.into();
        let value = value.into();

        match self.position(&column) {
            Some(idx) => Some(std::mem::replace(&mut self.values[idx], value)),
            None => {
                self.columns.push(column);
                self.values.push(value);
                None
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.position(column).map(|idx| self.values[idx].as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Values laid out in `header` order, `NA` for every column this row lacks.
    pub fn project<'a>(&'a self, header: &'a [String]) -> Vec<&'a str> {
        header
            .iter()
            .map(|column| self.get(column).unwrap_or(NA))
            .collect()
    }

    /// Header columns this row has no value for.
    pub fn missing_from<'a>(&self, header: &'a [String]) -> Vec<&'a str> {
        header
            .iter()
            .filter(|column| !self.contains(column))
            .map(String::as_str)
            .collect()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}
