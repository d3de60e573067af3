use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use contacts_etl::app::ports::{ContactSource, ContactStoreOpener};
use contacts_etl::config::EtlConfig;
use contacts_etl::constants::ENV_METRICS_PORT;
use contacts_etl::infra::html_source::HtmlTableSource;
use contacts_etl::infra::http_client::RetryingHttpClient;
use contacts_etl::infra::tracker_client::HttpRunTracker;
use contacts_etl::pipeline::processing::eligibility::EligibilityFilter;
use contacts_etl::pipeline::storage::{InMemoryStoreOpener, SqliteStoreOpener};
use contacts_etl::pipeline::Orchestrator;
use contacts_etl::{logging, metrics};

#[derive(Parser)]
#[command(name = "contacts_etl")]
#[command(about = "Business contacts ETL: extract, filter, deduplicate, persist and report")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (defaults to ./etl.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline once
    Run {
        /// Keep contacts in memory instead of the SQLite store
        #[arg(long)]
        memory_store: bool,
    },
    /// Extract and filter only; print eligible contacts without storing or reporting
    Preview,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = EtlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let _log_guard = logging::init_logging(&config.log_level);
    if let Ok(port) = std::env::var(ENV_METRICS_PORT) {
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("Invalid {ENV_METRICS_PORT}: '{port}'"))?;
        metrics::init_metrics(port);
    }

    let http = RetryingHttpClient::from_config(&config).context("Failed to build HTTP client")?;
    let source = Arc::new(HtmlTableSource::new(http.clone(), config.web_url.clone()));
    let filter = EligibilityFilter::new(&config.filter);

    match cli.command {
        Commands::Run { memory_store } => {
            info!("Business contacts ETL starting");
            let store_opener: Arc<dyn ContactStoreOpener> = if memory_store {
                Arc::new(InMemoryStoreOpener::default())
            } else {
                Arc::new(SqliteStoreOpener::new(&config.database_path))
            };
            let tracker = Arc::new(HttpRunTracker::new(http, &config.api_base_url));

            let orchestrator = Orchestrator::new(source, filter, store_opener, tracker);
            let report = orchestrator.run().await;

            if report.success {
                info!("ETL run {} completed successfully", report.run_id);
                Ok(ExitCode::SUCCESS)
            } else {
                error!("ETL run {} failed", report.run_id);
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Preview => {
            let raw = match source.extract().await {
                Ok(raw) => raw,
                Err(e) => {
                    error!("Extraction failed: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            };
            let eligible = filter.filter(&raw);

            println!("Extracted {} contacts, {} eligible:", raw.len(), eligible.len());
            for record in &eligible {
                let r = record.record();
                println!(
                    "  {} | {} {} | {} | {}",
                    r.company, r.given_name, r.family_name, r.title, r.email
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
