use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use shared::CatalogSnapshot;
use variant_scan::terminal::{LineReader, TerminalOperator};
use variant_scan::{
    CatalogRpc, Config, InMemoryOrder, LocalCatalog, ScanDispatcherBuilder, ScanOutcome,
    init_logger, init_logger_with_file,
};

/// Scan barcodes from stdin into an order
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// POS server base URL
    #[arg(long, env = "POS_SERVER_URL")]
    server_url: Option<String>,

    /// POS configuration id
    #[arg(long, env = "POS_CONFIG_ID")]
    config_id: Option<i64>,

    /// Bearer token for the POS server
    #[arg(long, env = "POS_API_TOKEN")]
    token: Option<String>,

    /// Serve lookups from a local JSON catalog instead of the server
    #[arg(long, env = "POS_CATALOG_FILE")]
    catalog: Option<PathBuf>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for daily rotating log files
    #[arg(long)]
    log_dir: Option<String>,

    /// JSON formatted logs
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn apply(self, mut config: Config) -> (Config, Option<PathBuf>) {
        if let Some(url) = self.server_url {
            config.server_url = url;
        }
        if let Some(id) = self.config_id {
            config.pos_config_id = id;
        }
        if let Some(token) = self.token {
            config.api_token = Some(token);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = Some(dir);
        }
        config.log_json |= self.log_json;
        (config, self.catalog)
    }
}

fn load_local_catalog(path: &Path) -> anyhow::Result<LocalCatalog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    let snapshot: CatalogSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("invalid catalog file {}", path.display()))?;
    Ok(LocalCatalog::from_snapshot(snapshot)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let (config, catalog_file) = Args::parse().apply(Config::from_env());
    match config.log_dir.as_deref() {
        Some(dir) => init_logger_with_file(&config.log_level, config.log_json, Some(dir))?,
        None => init_logger(&config.log_level, config.log_json)?,
    }

    let rpc: Arc<dyn CatalogRpc> = match &catalog_file {
        Some(path) => {
            tracing::info!(file = %path.display(), "Using local catalog");
            Arc::new(load_local_catalog(path)?)
        }
        None => {
            tracing::info!(server = %config.server_url, pos_config_id = config.pos_config_id, "Using POS server");
            Arc::new(config.client_config().build_http_client()?)
        }
    };

    let input = Arc::new(LineReader::stdin());
    let order = Arc::new(InMemoryOrder::new());
    let dispatcher = ScanDispatcherBuilder::new()
        .config(&config)
        .rpc(rpc)
        .order(order.clone())
        .operator(Arc::new(TerminalOperator::new(input.clone())))
        .build()?;

    match dispatcher.load_catalog().await {
        Ok(count) => tracing::info!(products = count, "Session catalog loaded"),
        Err(e) => tracing::warn!(error = %e, "Starting without a local catalog"),
    }

    println!("Scan a barcode (one per line, Ctrl-D to finish)");
    while let Some(line) = input.next_line().await {
        let code = line.trim();
        if code.is_empty() {
            continue;
        }
        match dispatcher.on_scan(code).await {
            ScanOutcome::Appended { product_id } => {
                println!("+ product {product_id} (x{})", order.quantity_of(product_id))
            }
            ScanOutcome::Cancelled => println!("- selection cancelled"),
            ScanOutcome::NotFound => println!("- not found"),
            ScanOutcome::Error(code) => println!("- error {code}: {}", code.message()),
            ScanOutcome::Handled => println!("- handled by host"),
        }
    }

    println!("\nOrder:");
    for line in order.lines() {
        println!("  {:>3} x {} (#{})", line.quantity, line.product.name, line.product.id);
    }
    Ok(())
}
