//! Experiment metadata: flat per-cell records and the partition tables they
//! are cut from. A partition is one spreadsheet tab, selected by the cell
//! identifier's initials prefix.

use std::collections::BTreeMap;

use crate::error::MetadataError;
use crate::process::headers::clean_header;

/// Header column identifying the cell a metadata row belongs to.
pub const CELL_ID_FIELD: &str = "Cell ID";

/// One cell's metadata: field name to string value, keys cleaned with
/// [`clean_header`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    fields: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// Build a record from raw pairs, cleaning each key.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(key, value)| (clean_header(&key), value))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A parsed metadata partition: cleaned headers plus one row per cell.
#[derive(Debug, Clone)]
pub struct PartitionTable {
    partition: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PartitionTable {
    /// Parse the raw value grid of a partition. The first row is the header
    /// row; names are cleaned before the required-header check so embedded
    /// newlines in the sheet do not fail validation.
    pub fn from_values(
        partition: &str,
        values: Vec<Vec<String>>,
        required: &[String],
    ) -> Result<Self, MetadataError> {
        let mut iter = values.into_iter();
        let header_row = iter.next().unwrap_or_default();
        if header_row.is_empty() {
            return Err(MetadataError::EmptyPartition {
                partition: partition.to_string(),
            });
        }

        let headers: Vec<String> = header_row.iter().map(|h| clean_header(h)).collect();
        let rows: Vec<Vec<String>> = iter.collect();
        if rows.is_empty() {
            return Err(MetadataError::EmptyPartition {
                partition: partition.to_string(),
            });
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|r| !headers.contains(*r))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(MetadataError::MissingHeaders {
                partition: partition.to_string(),
                missing,
                found: headers,
            });
        }

        Ok(Self {
            partition: partition.to_string(),
            headers,
            rows,
        })
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Extract the first row whose `Cell ID` matches, as a record. Short
    /// rows are padded with empty values, as the Sheets API omits trailing
    /// blanks.
    pub fn find_cell(&self, cell_id: &str) -> Option<MetadataRecord> {
        let id_index = self.headers.iter().position(|h| h == CELL_ID_FIELD)?;
        let row = self
            .rows
            .iter()
            .find(|row| row.get(id_index).map(|v| v.trim()) == Some(cell_id))?;

        let pairs = self.headers.iter().enumerate().map(|(i, header)| {
            (
                header.clone(),
                row.get(i).cloned().unwrap_or_default(),
            )
        });
        Some(MetadataRecord::from_pairs(pairs))
    }
}
