use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::application::{clean_orders, seed_orders};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::{AnalyticsRepository, OrderRepository};
use crate::interfaces::http;

#[derive(Debug, Parser)]
#[command(
    name = "ordersight",
    version,
    about = "Retail orders analytics dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clean a raw orders CSV export
    Clean {
        /// Raw CSV file to clean
        #[arg(long)]
        input: PathBuf,

        /// Where to write the cleaned CSV
        #[arg(long)]
        output: PathBuf,
    },

    /// Load a cleaned CSV into the analytics database
    Seed {
        /// Cleaned CSV file to load
        #[arg(long)]
        input: PathBuf,

        /// Database path (overrides configuration)
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Serve the dashboard and JSON API
    Serve {
        /// Bind address (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides configuration)
        #[arg(long)]
        port: Option<u16>,

        /// Database path (overrides configuration)
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Command::Clean { input, output } => {
                let orders = clean_orders(&input, &output)?;
                info!(rows = orders.len(), "Cleaning complete");
                Ok(())
            }
            Command::Seed { input, database } => {
                let config = AppConfig::load()?;
                let db_path =
                    database.unwrap_or_else(|| PathBuf::from(&config.database_path));
                let loaded = seed_orders(&input, &db_path).await?;
                info!(rows = loaded, "Seeding complete");
                Ok(())
            }
            Command::Serve {
                host,
                port,
                database,
            } => {
                let config = AppConfig::load()?;
                let host = host.unwrap_or(config.host);
                let port = port.unwrap_or(config.port);
                let db_path =
                    database.unwrap_or_else(|| PathBuf::from(&config.database_path));

                let orders = Arc::new(OrderRepository::connect(&db_path).await?);
                let analytics = Arc::new(AnalyticsRepository::new(orders.pool().clone()));

                info!(
                    host = %host,
                    port,
                    database = %db_path.display(),
                    "Starting dashboard server"
                );

                let server = http::start_server(orders, analytics, &host, port)
                    .map_err(|e| AppError::Internal(format!("Failed to start server: {e}")))?;
                server
                    .await
                    .map_err(|e| AppError::Internal(format!("Server error: {e}")))
            }
        }
    }
}
