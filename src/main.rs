use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use std::fs;
use std::path::PathBuf;

use plugsync::catalog::{BridgeClient, CatalogSource, FileCatalog};
use plugsync::domain::Origin;
use plugsync::id::external_key;
use plugsync::notify::ConsoleNotifier;
use plugsync::storage::{JsonlStore, PluginStore};
use plugsync::sync::SyncPass;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, SyncArgs};
use config::Config;

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plugsync")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("plugsync.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.unwrap_or("info")))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn open_store(config: &Config) -> Result<PluginStore<JsonlStore>> {
    let storage = JsonlStore::new(&config.storage.dir)
        .context(format!("Failed to open storage at {}", config.storage.dir.display()))?;
    Ok(PluginStore::new(storage, config.storage.key.clone()))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<bool> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => handle_sync_command(&SyncArgs::default(), config).await,
        Some(Commands::Sync(args)) => handle_sync_command(args, config).await,
        Some(Commands::List { managed }) => handle_list_command(*managed, config).await.map(|_| true),
        Some(Commands::Wrapper { tool }) => handle_wrapper_command(tool, config).await.map(|_| true),
    }
}

async fn handle_sync_command(args: &SyncArgs, config: &Config) -> Result<bool> {
    let mut bridge = config.bridge.clone();
    if let Some(url) = &args.bridge {
        bridge.base_url = url.clone();
    }
    info!("Sync requested - bridge: {}, dry run: {}", bridge.base_url, args.dry_run);

    let client = BridgeClient::new(bridge.to_client_config()).context("Failed to create bridge client")?;
    let file_catalog = args.catalog_file.as_ref().map(|path| FileCatalog::new(path.clone()));
    let catalog: &dyn CatalogSource = match &file_catalog {
        Some(file) => file,
        None => &client,
    };

    let store = open_store(config)?;
    let notifier = ConsoleNotifier;

    let result = SyncPass::new(catalog, &store, &notifier, client.base_url())
        .with_dry_run(args.dry_run)
        .run()
        .await;

    // The pass has already reported its outcome through the notifier
    match result {
        Ok(outcome) => {
            println!(
                "{} {}",
                "Finished at".dimmed(),
                outcome.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

async fn handle_list_command(managed_only: bool, config: &Config) -> Result<()> {
    info!("Listing plugins - managed only: {}", managed_only);
    let store = open_store(config)?;
    let records = store.list_all().await.context("Failed to read stored plugins")?;

    let shown: Vec<_> = records.iter().filter(|r| !managed_only || r.is_managed()).collect();
    if shown.is_empty() {
        println!("{}", "No plugins stored".yellow());
        return Ok(());
    }

    for record in shown {
        let origin = match record.origin() {
            Origin::Managed => "managed".green(),
            Origin::Foreign => "foreign".blue(),
        };
        match record.as_managed() {
            Some(managed) => println!(
                "{:<8} {:<32} {} {}",
                origin, managed.external_key, managed.identity, managed.display.title
            ),
            None => println!("{:<8} {}", origin, record.external_key().unwrap_or("-")),
        }
    }
    Ok(())
}

async fn handle_wrapper_command(tool: &str, config: &Config) -> Result<()> {
    info!("Printing wrapper for tool: {}", tool);
    let store = open_store(config)?;
    let records = store.list_all().await.context("Failed to read stored plugins")?;

    let key = external_key(tool);
    let record = records
        .iter()
        .filter_map(|r| r.as_managed())
        .find(|r| r.external_key == key)
        .ok_or_else(|| eyre!("No synced plugin for tool '{}'", tool))?;

    println!("{}", record.wrapper_body);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Config picks the default log level, RUST_LOG still wins
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    let ok = run_application(&cli, &config).await.context("Application failed")?;
    if !ok {
        std::process::exit(1);
    }

    Ok(())
}
