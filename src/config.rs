//! Runtime configuration: remote locations, column/field names, batch policy.
//!
//! Everything has a sensible default so a config file only needs to name the
//! Drive folder and spreadsheet. The access token is deliberately not part of
//! the file; it comes from the environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fs, path::Path};

use crate::loader::BatchPolicy;

/// Capacity column expected in every raw data file.
pub const DEFAULT_CAPACITY_COLUMN: &str = "Capacity/mA.h";

/// Metadata field holding the working electrode active material mass.
pub const DEFAULT_MASS_FIELD: &str = "WE Active Material Mass (mg)";

/// Headers every metadata partition must carry.
pub const REQUIRED_FIELDS: [&str; 3] = [
    "Cell ID",
    "Working Electrode",
    "WE Active Material Mass (mg)",
];

/// Environment variable holding the bearer token for Drive/Sheets requests.
pub const TOKEN_ENV: &str = "CELLHARVEST_TOKEN";

/// Column/field names consumed by validation and normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Columns {
    /// Name of the raw capacity column.
    pub capacity: String,
    /// Name of the metadata mass field.
    pub mass: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY_COLUMN.to_string(),
            mass: DEFAULT_MASS_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Drive folder holding the raw `.txt` data files.
    pub drive_folder_id: String,
    /// Spreadsheet holding one metadata partition (tab) per initials prefix.
    pub spreadsheet_id: String,
    pub columns: Columns,
    /// Headers every metadata partition must carry.
    pub required_fields: Vec<String>,
    /// Abort the batch on the first failing cell instead of collecting
    /// per-cell outcomes.
    pub fail_fast: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            drive_folder_id: String::new(),
            spreadsheet_id: String::new(),
            columns: Columns::default(),
            required_fields: REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            fail_fast: false,
        }
    }
}

impl Config {
    /// Read a YAML config file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn policy(&self) -> BatchPolicy {
        if self.fail_fast {
            BatchPolicy::FailFast
        } else {
            BatchPolicy::CollectErrors
        }
    }
}

/// Bearer token for the remote collaborators, from [`TOKEN_ENV`].
pub fn access_token() -> Result<String> {
    env::var(TOKEN_ENV).with_context(|| {
        format!("{TOKEN_ENV} must be set to a Drive/Sheets read-only access token")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_reference_names() {
        let columns = Columns::default();
        assert_eq!(columns.capacity, "Capacity/mA.h");
        assert_eq!(columns.mass, "WE Active Material Mass (mg)");

        let config = Config::default();
        assert_eq!(config.required_fields.len(), 3);
        assert!(config
            .required_fields
            .iter()
            .any(|f| f == "Working Electrode"));
        assert_eq!(config.policy(), BatchPolicy::CollectErrors);
    }

    #[test]
    fn partial_yaml_fills_defaults() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "drive_folder_id: folder123")?;
        writeln!(file, "spreadsheet_id: sheet456")?;
        writeln!(file, "fail_fast: true")?;

        let config = Config::load(file.path())?;
        assert_eq!(config.drive_folder_id, "folder123");
        assert_eq!(config.spreadsheet_id, "sheet456");
        assert_eq!(config.policy(), BatchPolicy::FailFast);
        assert_eq!(config.columns, Columns::default());
        Ok(())
    }

    #[test]
    fn column_overrides_are_honored() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "columns:")?;
        writeln!(file, "  capacity: Q/mA.h")?;

        let config = Config::load(file.path())?;
        assert_eq!(config.columns.capacity, "Q/mA.h");
        assert_eq!(config.columns.mass, DEFAULT_MASS_FIELD);
        Ok(())
    }
}
