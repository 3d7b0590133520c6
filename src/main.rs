use anyhow::{bail, Result};
use cellharvest::{
    build_catalog,
    catalog::CellId,
    config::{self, Config},
    fetch::{DriveClient, DriveTableStore, SheetMetadataStore, SheetsClient},
    loader::Loader,
};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cellharvest=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config + token ──────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "cellharvest.yaml".to_string());
    let config = Config::load(&config_path)?;
    if config.drive_folder_id.is_empty() {
        bail!("drive_folder_id must be set in {config_path}");
    }
    if config.spreadsheet_id.is_empty() {
        bail!("spreadsheet_id must be set in {config_path}");
    }
    let token = config::access_token()?;

    // ─── 3) build collaborators ──────────────────────────────────────
    let http = Client::new();
    let drive = DriveClient::new(http.clone(), token.clone(), config.drive_folder_id.clone());
    let sheets = SheetsClient::new(http, token, config.spreadsheet_id.clone());

    // ─── 4) enumerate available cells ────────────────────────────────
    let files = drive.list_data_files().await?;
    let catalog = build_catalog(files);
    info!("found {} cells in drive folder", catalog.len());
    if catalog.is_empty() {
        info!("nothing to load; exit");
        return Ok(());
    }

    // ─── 5) load + normalize every cell ──────────────────────────────
    let ids: Vec<CellId> = catalog.ids().cloned().collect();
    let raw_store = DriveTableStore::new(drive, catalog);
    let metadata_store = SheetMetadataStore::new(
        sheets,
        config.required_fields.clone(),
        config.columns.mass.clone(),
    );
    let loader =
        Loader::new(raw_store, metadata_store, config.columns.clone()).with_policy(config.policy());

    let outcomes = loader.load_all(ids.iter()).await;

    // ─── 6) per-cell summary ─────────────────────────────────────────
    let mut failures = 0usize;
    for (id, outcome) in &outcomes {
        match outcome {
            Ok(data) => {
                let electrode = data.metadata.get("Working Electrode").unwrap_or("N/A");
                println!(
                    "{id}: {electrode} | {} rows loaded | columns: {}",
                    data.table.row_count(),
                    data.table.headers().len()
                );
            }
            Err(err) => {
                failures += 1;
                println!("{id}: FAILED: {err}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} cells failed to load", outcomes.len());
    }
    info!("all done");
    Ok(())
}
