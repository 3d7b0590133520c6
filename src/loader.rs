//! Per-cell pipeline orchestration: fetch raw table and metadata, validate,
//! normalize, and collect per-identifier outcomes.
//!
//! The two stores are injected explicitly so tests (and offline tooling) can
//! substitute in-memory fakes; nothing here caches process-wide state.

use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use crate::catalog::CellId;
use crate::config::Columns;
use crate::error::{FetchError, LoadError};
use crate::meta::MetadataRecord;
use crate::process::normalize::add_normalized_capacity;
use crate::process::table::RawTable;
use crate::process::validate::validate;

/// Source of raw tabular data, keyed by cell identifier.
#[allow(async_fn_in_trait)]
pub trait RawTableStore {
    async fn fetch_raw_table(&self, id: &CellId) -> Result<RawTable, FetchError>;
}

/// Source of per-cell metadata records, keyed by cell identifier.
#[allow(async_fn_in_trait)]
pub trait MetadataStore {
    async fn fetch_metadata(&self, id: &CellId) -> Result<MetadataRecord, FetchError>;
}

/// What to do with the rest of the batch when one cell fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Record the failure and keep going; every requested identifier gets an
    /// outcome.
    #[default]
    CollectErrors,
    /// Stop issuing work after the first failure. The returned map holds the
    /// outcomes produced up to and including the failing cell.
    FailFast,
}

/// A successfully loaded cell: the augmented raw table plus its metadata.
/// Not mutated after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCellData {
    pub table: RawTable,
    pub metadata: MetadataRecord,
}

/// Per-cell outcome of a batch load.
pub type CellOutcome = Result<NormalizedCellData, LoadError>;

pub struct Loader<R, M> {
    raw_store: R,
    metadata_store: M,
    columns: Columns,
    policy: BatchPolicy,
}

impl<R: RawTableStore, M: MetadataStore> Loader<R, M> {
    pub fn new(raw_store: R, metadata_store: M, columns: Columns) -> Self {
        Self {
            raw_store,
            metadata_store,
            columns,
            policy: BatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full pipeline for one cell. The two fetches have no ordering
    /// dependency and are awaited together.
    #[instrument(level = "info", skip(self), fields(cell = %id))]
    pub async fn load_cell(&self, id: &CellId) -> CellOutcome {
        let (raw, meta) = tokio::join!(
            self.raw_store.fetch_raw_table(id),
            self.metadata_store.fetch_metadata(id)
        );
        let table = raw?;
        let metadata = meta?;

        log_headers(id, &table);

        let mass_mg = validate(&table, &metadata, &self.columns)?;
        let table = add_normalized_capacity(table, mass_mg, &self.columns.capacity)?;

        Ok(NormalizedCellData { table, metadata })
    }

    /// Load every requested identifier, in order. Each cell's outcome is
    /// independent; the batch policy decides whether a failure stops the
    /// remaining work. Dropping the returned future stops issuing further
    /// per-cell work.
    pub async fn load_all<'a, I>(&self, ids: I) -> BTreeMap<CellId, CellOutcome>
    where
        I: IntoIterator<Item = &'a CellId>,
    {
        let mut outcomes = BTreeMap::new();

        for id in ids {
            let outcome = self.load_cell(id).await;
            let failed = match &outcome {
                Ok(data) => {
                    info!(cell = %id, rows = data.table.row_count(), "loaded and normalized");
                    false
                }
                Err(err) => {
                    warn!(cell = %id, error = %err, "cell failed to load");
                    true
                }
            };
            outcomes.insert(id.clone(), outcome);

            if failed && self.policy == BatchPolicy::FailFast {
                break;
            }
        }

        outcomes
    }
}

fn log_headers(id: &CellId, table: &RawTable) {
    debug!(cell = %id, "raw data headers:");
    for column in table.headers() {
        debug!("  - {column}");
    }
}
