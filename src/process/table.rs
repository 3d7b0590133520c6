use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fmt;

use crate::error::TableError;
use crate::process::headers::clean_header;

/// One cell of a raw data table. Values that parse as numbers are stored as
/// numbers; everything else stays text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Parse a raw field, trimming whitespace and trying numeric first.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(trimmed.to_string()),
        }
    }

    /// Numeric coercion: numbers pass through, text is re-parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A rectangular raw data table with named columns.
///
/// Headers are unique after cleanup and every row has exactly one cell per
/// column; both invariants are established at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Build a table from already-cleaned headers. Rows are padded or
    /// truncated to the header width.
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, CellValue::Text(String::new()));
        }
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Replace the named column, or append it if absent.
    ///
    /// `values` must hold exactly one cell per row.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }
}

/// Parse a tab-delimited text file into a [`RawTable`].
///
/// The first line is the header row; names are cleaned with
/// [`clean_header`]. Fully-empty data rows are dropped, matching what the
/// upstream instruments occasionally emit at the end of a run.
pub fn parse_tab_table(text: &str) -> Result<RawTable, TableError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(TableError::DuplicateColumn {
                name: header.clone(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
        row.resize(headers.len(), CellValue::Text(String::new()));
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(TableError::Empty);
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_numeric_cells() {
        let table = parse_tab_table("Time/s\tCapacity/mA.h\n1\t0.5\n2\t0.7\n").unwrap();
        assert_eq!(table.headers(), ["Time/s", "Capacity/mA.h"]);
        assert_eq!(table.row_count(), 2);

        let capacity = table.column_index("Capacity/mA.h").unwrap();
        let values: Vec<f64> = table.column(capacity).map(|c| c.as_f64().unwrap()).collect();
        assert_eq!(values, [0.5, 0.7]);
    }

    #[test]
    fn cleans_header_whitespace() {
        let table = parse_tab_table(" Time/s \tCapacity/mA.h\n1\t0.5\n").unwrap();
        assert_eq!(table.headers()[0], "Time/s");
    }

    #[test]
    fn drops_fully_empty_rows() {
        let table = parse_tab_table("A\tB\n\t\n1\t2\n \t \n").unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn pads_short_rows_to_header_width() {
        let table = parse_tab_table("A\tB\n1\n").unwrap();
        assert_eq!(table.rows()[0].len(), 2);
        assert_eq!(table.rows()[0][1], CellValue::Text(String::new()));
    }

    #[test]
    fn rejects_duplicate_columns_after_cleanup() {
        let err = parse_tab_table("A\t A\n1\t2\n").unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn { name } if name == "A"));
    }

    #[test]
    fn rejects_tables_with_no_data_rows() {
        assert!(matches!(parse_tab_table("A\tB\n"), Err(TableError::Empty)));
        assert!(matches!(
            parse_tab_table("A\tB\n\t\n"),
            Err(TableError::Empty)
        ));
    }

    #[test]
    fn non_numeric_cells_stay_text() {
        let table = parse_tab_table("A\n rest \n").unwrap();
        assert_eq!(table.rows()[0][0], CellValue::Text("rest".to_string()));
    }
}
