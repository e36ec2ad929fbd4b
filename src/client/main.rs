/**
 * fieldreport CLI
 *
 * Command-line host for the offline-first client core: files reports,
 * inspects the offline queue and drives the sync engine.
 */

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use fieldreport::client::api::{HttpReportApi, ReportApi};
use fieldreport::client::config::{API_URL_ENV, DB_PATH_ENV};
use fieldreport::client::local_db::LocalDatabase;
use fieldreport::client::offline::{QueueStore, ReportSubmitter};
use fieldreport::client::sync::{
    attach_connectivity, ConnectivityMonitor, NotificationSink, SyncConfig, SyncEngine, SyncTrigger,
};
use fieldreport::client::Config;
use fieldreport::shared::config::AppConfigBuilder;
use fieldreport::shared::{Category, Priority, ReportDraft};

#[derive(Parser)]
#[command(name = "fieldreport")]
#[command(about = "File incident reports, online or offline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, env = "FIELDREPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Report server base URL
    #[arg(long, env = API_URL_ENV)]
    server: Option<String>,

    /// Offline queue database file
    #[arg(long, env = DB_PATH_ENV)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// File a new report; it is queued if the server cannot be reached
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: String,
        /// general-services, technology, safety or other
        #[arg(long)]
        category: Category,
        #[arg(long, default_value = "")]
        description: String,
        /// low, normal or high
        #[arg(long, default_value = "normal")]
        priority: Priority,
        /// Reporter name; defaults to the last name used
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        anonymous: bool,
        /// Skip the network and queue immediately
        #[arg(long)]
        offline: bool,
    },
    /// Show reports waiting in the offline queue
    Pending,
    /// Send queued reports now
    Sync,
    /// List reports stored on the server
    List,
    /// Drop every queued report without sending it
    Clear,
    /// Keep probing the server and sync whenever it comes back
    Watch,
}

fn print_notification(message: &str) {
    println!(">> {}", message);
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::new(),
    };

    if cli.server.is_none() && cli.db.is_none() {
        return Ok(config);
    }
    let mut builder = AppConfigBuilder::from_config(config.app().clone());
    if let Some(url) = &cli.server {
        builder = builder.server_url(url.clone());
    }
    if let Some(path) = &cli.db {
        builder = builder.database_path(path.clone());
    }
    Ok(Config::with_builder(builder)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let db = LocalDatabase::open(config.database_path()).await?;
    let store = Arc::new(db.clone());
    let queue = Arc::new(QueueStore::new(store.clone()));
    let api: Arc<dyn ReportApi> = Arc::new(HttpReportApi::new(&config)?);
    let notifier: Arc<dyn NotificationSink> = Arc::new(print_notification);

    match cli.command {
        Commands::Submit {
            title,
            location,
            category,
            description,
            priority,
            name,
            anonymous,
            offline,
        } => {
            let online = !offline && api.check_status().await.is_ok();
            let monitor = ConnectivityMonitor::with_initial(Some(online));
            let submitter = ReportSubmitter::new(api.clone(), queue.clone(), store, monitor.subscribe());

            let reporter_name = match name {
                Some(name) => name,
                None => submitter.last_reporter_name().await.unwrap_or_default(),
            };
            let draft = ReportDraft {
                title,
                description,
                location,
                category: Some(category),
                priority,
                images: Vec::new(),
                reporter_name,
                is_anonymous: anonymous,
            };

            let outcome = submitter.submit(draft).await?;
            println!("{}", outcome.message());
            if let Some(local_id) = outcome.local_id() {
                println!("Queued as {}", local_id);
            }
        }
        Commands::Pending => {
            let items = queue.list_all().await?;
            if items.is_empty() {
                println!("No reports waiting.");
            }
            for item in items {
                println!(
                    "{}  {}  [{}] {} @ {}",
                    item.local_id,
                    item.queued_at.format("%Y-%m-%d %H:%M"),
                    item.payload.category.label(),
                    item.payload.title,
                    item.payload.location
                );
            }
        }
        Commands::Sync => {
            let engine = SyncEngine::new(queue, api.clone(), notifier, SyncConfig::from(&config));
            let online = api.check_status().await.is_ok();
            engine.on_trigger(SyncTrigger::ConnectivityChanged(online)).await?;

            let outcome = engine.on_trigger(SyncTrigger::Manual).await?;
            tracing::debug!(?outcome, "Manual sync finished");
            let status = engine.status().await?;
            println!("{} report(s) still pending.", status.pending);
        }
        Commands::List => {
            let reports = api.list().await?;
            if reports.is_empty() {
                println!("No reports on the server.");
            }
            for report in reports {
                println!(
                    "{}  {}  {:<12} [{}] {} @ {} by {}",
                    report.id,
                    report.timestamp.format("%Y-%m-%d %H:%M"),
                    report.status,
                    report.payload.category.label(),
                    report.payload.title,
                    report.payload.location,
                    report.payload.reporter_name
                );
            }
        }
        Commands::Clear => {
            let dropped = queue.pending_count().await?;
            queue.clear_all().await?;
            println!("Dropped {} queued report(s).", dropped);
        }
        Commands::Watch => {
            let engine = Arc::new(SyncEngine::new(queue, api.clone(), notifier, SyncConfig::from(&config)));
            let monitor = Arc::new(ConnectivityMonitor::new());

            // learn the real state before draining what an earlier run left behind
            let online = monitor.probe(api.as_ref()).await;
            engine.dispatch(SyncTrigger::ConnectivityChanged(online)).await;
            engine.dispatch(SyncTrigger::Manual).await;

            let adapter = attach_connectivity(engine.clone(), monitor.subscribe());
            let poller = monitor.clone().spawn_polling(api, config.probe_interval());

            println!("Watching {} (Ctrl+C to stop)", config.server_url());
            tokio::signal::ctrl_c().await?;
            poller.abort();
            adapter.abort();
        }
    }

    db.close().await;
    Ok(())
}
