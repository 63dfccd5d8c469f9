use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use textarr::config::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_config_path() -> Option<PathBuf> {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(v) = arg
            .strip_prefix("--config=")
            .or_else(|| arg.strip_prefix("-config="))
        {
            return Some(PathBuf::from(v));
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    match dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let config_path = parse_config_path();
    match &config_path {
        Some(p) => info!("Loading config from {}", p.display()),
        None => info!("No --config given, using environment only"),
    }
    let config = Config::load(config_path.as_deref()).context("config error")?;
    info!("Configuration loaded: {:?}", config);

    textarr::app::run_server(config).await
}
