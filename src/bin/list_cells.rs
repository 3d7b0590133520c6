// src/bin/list_cells.rs
// Enumerates the Drive folder and prints the deduplicated cell catalog.

use anyhow::Result;
use cellharvest::{
    build_catalog,
    config::{self, Config},
    fetch::DriveClient,
};
use reqwest::Client;
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

    let drive = DriveClient::new(Client::new(), token, config.drive_folder_id.clone());
    let files = drive.list_data_files().await?;
    let catalog = build_catalog(files);

    println!("Found {} cells in Drive folder.\n", catalog.len());
    for (id, descriptor) in catalog.iter() {
        let modified = descriptor
            .modified
            .map(|m| m.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
        println!("{id}: {} (modified {modified})", descriptor.name);
    }

    Ok(())
}
