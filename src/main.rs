use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use risk_ledger::api::{self, AppState};
use risk_ledger::audit::AuditLedger;
use risk_ledger::config::AppConfig;
use risk_ledger::database::Database;
use risk_ledger::events::{spawn_event_logger, EventBus};
use risk_ledger::verification::{authority_from_config, SimulatedAuthority, VerificationRegistry};

#[derive(Parser)]
#[command(name = "risk-ledger")]
#[command(about = "Audit ledger and verification registry for token-pair risk reports")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Print the number of audit records
    Count,
    /// Print one audit record
    Record {
        record_id: u64,
    },
    /// Print the risk report stored under a key
    Report {
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "risk_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    info!("Configuration loaded");

    let database = Database::new(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    database.run_migrations().await?;
    info!("Database migrations completed");

    let events = EventBus::new();

    // Only `serve` may seed the configured owner; inspection must not claim the ledger.
    match cli.command {
        Commands::Serve => serve(config, database, events).await,
        Commands::Count => {
            let ledger = AuditLedger::open_read_only(&database, events).await?;
            println!("{}", serde_json::json!({ "count": ledger.count().await }));
            Ok(())
        }
        Commands::Record { record_id } => {
            let ledger = AuditLedger::open_read_only(&database, events).await?;
            let record = ledger.get_record(record_id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Report { key } => {
            // Reads never reach the authority, so a simulated one is enough here.
            let registry = VerificationRegistry::new(
                &database,
                Arc::new(SimulatedAuthority),
                events,
                config.verification.timeout(),
            );
            let report = registry.get_report(&key).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, database: Database, events: EventBus) -> Result<()> {
    let ledger = AuditLedger::open(&database, events.clone(), &config.ledger.owner).await?;
    let authority = authority_from_config(&config.verification)?;
    let registry = VerificationRegistry::new(
        &database,
        authority,
        events.clone(),
        config.verification.timeout(),
    );

    spawn_event_logger(&events);
    info!("Event logger started ({} subscribers)", events.subscriber_count());

    let app = api::router(AppState {
        ledger: Arc::new(ledger),
        registry: Arc::new(registry),
    });

    let addr = config.bind_address();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
