// src/bin/check_access.rs
// Verifies that the configured token can reach both remote collaborators
// before a real run.

use anyhow::{bail, Result};
use cellharvest::{
    config::{self, Config},
    fetch::{DriveClient, SheetsClient},
};
use reqwest::Client;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "cellharvest.yaml".to_string());
    let config = Config::load(&config_path)?;
    let token = config::access_token()?;

    let http = Client::new();
    let drive = DriveClient::new(http.clone(), token.clone(), config.drive_folder_id.clone());
    let sheets = SheetsClient::new(http, token, config.spreadsheet_id.clone());

    let mut ok = true;

    match drive.validate_access().await {
        Ok(()) => info!("Google Drive access validated."),
        Err(err) => {
            ok = false;
            error!("Google Drive access failed: {err}");
        }
    }

    match sheets.validate_access().await {
        Ok(()) => info!("Google Sheets access validated."),
        Err(err) => {
            ok = false;
            error!("Google Sheets access failed: {err}");
        }
    }

    if !ok {
        bail!("access validation FAILED");
    }
    info!("access validation PASSED");
    Ok(())
}
