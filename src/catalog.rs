//! Cell identifiers and the catalog mapping them to remote files.
//!
//! A cell identifier is `<initials><digits>`: two or more ASCII letters
//! followed by four or more digits, e.g. `MEN0001`. The letters prefix
//! selects the metadata partition; it is a pure derivation from the
//! identifier, recomputed on each lookup.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

static CELL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,}[0-9]{4,}$").expect("cell id pattern should compile"));

static FILE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{2,}[0-9]{4,})_").expect("file name pattern should compile")
});

/// Identifier of a single electrochemical test cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(String);

impl CellId {
    /// Parse a full identifier, e.g. `MEN0001`.
    pub fn parse(raw: &str) -> Option<Self> {
        CELL_ID_PATTERN.is_match(raw).then(|| Self(raw.to_string()))
    }

    /// Extract the identifier from a data file name, e.g. `MEN0001_run3.txt`.
    /// The name must start with `<initials><digits>_`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        FILE_NAME_PATTERN
            .captures(name)
            .map(|caps| Self(caps[1].to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The letters prefix selecting this cell's metadata partition.
    pub fn initials(&self) -> &str {
        let digits_start = self
            .0
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(self.0.len());
        &self.0[..digits_start]
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a remote data file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDescriptor {
    pub id: String,
    pub name: String,
    pub modified: Option<DateTime<Utc>>,
    pub size: Option<u64>,
}

/// Mapping from cell identifier to the remote file carrying its raw data.
#[derive(Debug, Clone, Default)]
pub struct CellCatalog {
    entries: BTreeMap<CellId, FileDescriptor>,
}

impl CellCatalog {
    pub fn get(&self, id: &CellId) -> Option<&FileDescriptor> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &CellId> + '_ {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellId, &FileDescriptor)> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build a catalog from remote descriptors in arrival order.
///
/// Files without a `.txt` extension are skipped silently; `.txt` files whose
/// name does not start with `<initials><digits>_` are skipped with a logged
/// reason. The first descriptor seen for an identifier wins, so callers that
/// list newest-first get newest-wins behavior.
pub fn build_catalog(files: impl IntoIterator<Item = FileDescriptor>) -> CellCatalog {
    let mut entries: BTreeMap<CellId, FileDescriptor> = BTreeMap::new();

    for file in files {
        if !file.name.ends_with(".txt") {
            continue;
        }
        let Some(id) = CellId::from_file_name(&file.name) else {
            warn!(
                name = %file.name,
                "skipping file: name does not match <initials><digits>_ pattern"
            );
            continue;
        };
        entries.entry(id).or_insert(file);
    }

    CellCatalog { entries }
}
