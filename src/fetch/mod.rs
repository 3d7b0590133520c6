// src/fetch/mod.rs
//! HTTP collaborators: Google Drive for raw data files, Google Sheets for
//! metadata partitions. Both consume a ready-made read-only bearer token;
//! how that token is minted is outside this crate.

use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::FetchError;

pub mod drive;
pub mod sheets;

pub use drive::{DriveClient, DriveTableStore};
pub use sheets::{SheetMetadataStore, SheetsClient};

const MAX_RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Send a request, retrying transport errors and 5xx responses a bounded
/// number of times. Non-retryable statuses surface as [`FetchError::Status`].
pub(crate) async fn send_with_retry<F>(build: F) -> Result<Response, FetchError>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match build().send().await {
            Ok(resp) if resp.status().is_success() => return Ok(resp),
            Ok(resp) => {
                if attempt < MAX_RETRIES && resp.status().is_server_error() {
                    sleep(RETRY_DELAY).await;
                    continue;
                }
                let status = resp.status().as_u16();
                let url = resp.url().to_string();
                let message = error_message(resp).await;
                return Err(FetchError::Status {
                    status,
                    url,
                    message,
                });
            }
            Err(err) => {
                if attempt < MAX_RETRIES {
                    sleep(RETRY_DELAY).await;
                    continue;
                }
                return Err(FetchError::Http(err));
            }
        }
    }
}

/// Pull the human-readable message out of a Google API error body, falling
/// back to a snippet of the raw body.
async fn error_message(resp: Response) -> String {
    let Ok(body) = resp.text().await else {
        return "no response body".to_string();
    };
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
