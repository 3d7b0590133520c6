//! Google Sheets collaborator: fetches metadata partitions (one tab per
//! initials prefix) and serves per-cell records out of them.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::catalog::CellId;
use crate::error::FetchError;
use crate::fetch::send_with_retry;
use crate::loader::MetadataStore;
use crate::meta::{MetadataRecord, PartitionTable};

const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

pub struct SheetsClient {
    http: Client,
    token: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(
        http: Client,
        token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// Fetch the full value grid of one partition tab. A 400/404 from the
    /// values endpoint means the tab does not exist.
    pub async fn fetch_partition(&self, partition: &str) -> Result<Vec<Vec<String>>, FetchError> {
        let url = format!(
            "{SHEETS_URL}/{}/values/'{partition}'!A:ZZ",
            self.spreadsheet_id
        );

        match send_with_retry(|| self.http.get(&url).bearer_auth(&self.token)).await {
            Ok(response) => {
                let range: ValueRange = response.json().await?;
                debug!(partition, rows = range.values.len(), "fetched partition values");
                Ok(range.values)
            }
            Err(FetchError::Status {
                status: 400 | 404, ..
            }) => Err(FetchError::PartitionNotFound {
                partition: partition.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    /// Cheap probe that the spreadsheet is reachable with this token.
    pub async fn validate_access(&self) -> Result<(), FetchError> {
        let url = format!("{SHEETS_URL}/{}/values/A1", self.spreadsheet_id);
        send_with_retry(|| self.http.get(&url).bearer_auth(&self.token)).await?;
        Ok(())
    }
}

/// [`MetadataStore`] backed by a spreadsheet. Partition tables are fetched
/// once and reused for every cell sharing the initials prefix.
pub struct SheetMetadataStore {
    client: SheetsClient,
    required_fields: Vec<String>,
    mass_field: String,
    partitions: Mutex<HashMap<String, Arc<PartitionTable>>>,
}

impl SheetMetadataStore {
    pub fn new(
        client: SheetsClient,
        required_fields: Vec<String>,
        mass_field: impl Into<String>,
    ) -> Self {
        Self {
            client,
            required_fields,
            mass_field: mass_field.into(),
            partitions: Mutex::new(HashMap::new()),
        }
    }

    async fn partition_table(&self, partition: &str) -> Result<Arc<PartitionTable>, FetchError> {
        let mut cache = self.partitions.lock().await;
        if let Some(table) = cache.get(partition) {
            return Ok(table.clone());
        }

        let values = self.client.fetch_partition(partition).await?;
        let table = Arc::new(PartitionTable::from_values(
            partition,
            values,
            &self.required_fields,
        )?);
        cache.insert(partition.to_string(), table.clone());
        Ok(table)
    }
}

impl MetadataStore for SheetMetadataStore {
    async fn fetch_metadata(&self, id: &CellId) -> Result<MetadataRecord, FetchError> {
        let partition = self.partition_table(id.initials()).await?;
        let record = partition
            .find_cell(id.as_str())
            .ok_or_else(|| FetchError::NotFound { id: id.to_string() })?;

        // Advisory only; the validator makes the authoritative call.
        if let Some(raw) = record.get(&self.mass_field) {
            if raw.trim().parse::<f64>().is_err() {
                warn!(
                    cell = %id,
                    value = raw,
                    "mass field is not numeric; normalization will fail for this cell"
                );
            }
        }

        Ok(record)
    }
}
