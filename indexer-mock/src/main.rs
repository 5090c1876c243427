/// Indexer Mock Server
///
/// Serves the indexer/broadcast API from a JSON fixture for local development.

use anyhow::{Context, Result};
use indexer_mock::{run_server, MockChain};
use std::env;
use std::sync::Arc;

#[derive(Debug)]
struct Config {
    fixture_path: Option<String>,
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let fixture_path = env::var("FIXTURE_PATH").ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "17779".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            fixture_path,
            server_host,
            server_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting indexer mock...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let chain = match &config.fixture_path {
        Some(path) => {
            log::info!("Loading fixture from {}", path);
            MockChain::load(path)?
        }
        None => {
            log::info!("No FIXTURE_PATH set, starting with an empty chain");
            MockChain::new()
        }
    };

    run_server(Arc::new(chain), config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
