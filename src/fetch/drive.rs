//! Google Drive collaborator: lists the raw data files in the configured
//! folder and downloads their text content.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::catalog::{CellCatalog, CellId, FileDescriptor};
use crate::error::FetchError;
use crate::fetch::send_with_retry;
use crate::loader::RawTableStore;
use crate::process::table::{parse_tab_table, RawTable};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const PAGE_SIZE: &str = "1000";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    modified_time: Option<DateTime<Utc>>,
    // Drive reports size as a decimal string.
    size: Option<String>,
}

impl From<DriveFile> for FileDescriptor {
    fn from(file: DriveFile) -> Self {
        FileDescriptor {
            id: file.id,
            name: file.name,
            modified: file.modified_time,
            size: file.size.and_then(|s| s.parse().ok()),
        }
    }
}

pub struct DriveClient {
    http: Client,
    token: String,
    folder_id: String,
}

impl DriveClient {
    pub fn new(http: Client, token: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            folder_id: folder_id.into(),
        }
    }

    /// List the plain-text files in the folder, newest first, following
    /// pagination to the end.
    #[instrument(level = "info", skip(self), fields(folder = %self.folder_id))]
    pub async fn list_data_files(&self) -> Result<Vec<FileDescriptor>, FetchError> {
        let query = format!(
            "'{}' in parents and mimeType='text/plain' and trashed=false",
            self.folder_id
        );

        let mut descriptors = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = send_with_retry(|| {
                let mut request = self
                    .http
                    .get(DRIVE_FILES_URL)
                    .bearer_auth(&self.token)
                    .query(&[
                        ("q", query.as_str()),
                        ("fields", "nextPageToken, files(id, name, modifiedTime, size)"),
                        ("orderBy", "modifiedTime desc"),
                        ("pageSize", PAGE_SIZE),
                    ]);
                if let Some(token) = &page_token {
                    request = request.query(&[("pageToken", token.as_str())]);
                }
                request
            })
            .await?;

            let list: FileList = page.json().await?;
            debug!(count = list.files.len(), "drive listing page");
            descriptors.extend(list.files.into_iter().map(FileDescriptor::from));

            match list.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(descriptors)
    }

    /// Download a file's content as UTF-8 text.
    pub async fn download_text(&self, file_id: &str) -> Result<String, FetchError> {
        let url = format!("{DRIVE_FILES_URL}/{file_id}");
        let response = send_with_retry(|| {
            self.http
                .get(&url)
                .bearer_auth(&self.token)
                .query(&[("alt", "media")])
        })
        .await?;
        Ok(response.text().await?)
    }

    /// Cheap probe that the token can list the Drive API at all.
    pub async fn validate_access(&self) -> Result<(), FetchError> {
        send_with_retry(|| {
            self.http
                .get(DRIVE_FILES_URL)
                .bearer_auth(&self.token)
                .query(&[("pageSize", "1"), ("fields", "files(id)")])
        })
        .await?;
        Ok(())
    }
}

/// [`RawTableStore`] backed by a Drive folder, resolving identifiers through
/// a catalog built once per run.
pub struct DriveTableStore {
    client: DriveClient,
    catalog: CellCatalog,
}

impl DriveTableStore {
    pub fn new(client: DriveClient, catalog: CellCatalog) -> Self {
        Self { client, catalog }
    }

    pub fn catalog(&self) -> &CellCatalog {
        &self.catalog
    }
}

impl RawTableStore for DriveTableStore {
    async fn fetch_raw_table(&self, id: &CellId) -> Result<RawTable, FetchError> {
        let descriptor = self
            .catalog
            .get(id)
            .ok_or_else(|| FetchError::NotFound { id: id.to_string() })?;
        let text = self.client.download_text(&descriptor.id).await?;
        Ok(parse_tab_table(&text)?)
    }
}
