//! settings-guard command line.
//!
//! Inspects and edits a validated settings file, or watches it for external
//! edits and reports consistency transitions.
//!
//! ```text
//! settings-guard [--config store.toml] [--file settings.toml] <command>
//!
//!   get KEY          validated value (fallback while inconsistent)
//!   set KEY VALUE    write a value (ignored while inconsistent)
//!   reset KEY        restore a key's fallback
//!   remove KEY       delete a key
//!   clear            delete every key
//!   keys [GROUP]     stored keys of a group (default: General)
//!   check [--json]   report unrecognized and invalid settings
//!   watch            follow the file until Ctrl-C
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;

use settings_guard::backend::DEFAULT_GROUP;
use settings_guard::config::{load_config, StoreConfig};
use settings_guard::handler::scalar_string;
use settings_guard::observability::logging::init_logging;
use settings_guard::{ConfigEvent, ConfigStore, StoreError};

#[derive(Parser)]
#[command(name = "settings-guard")]
#[command(about = "Validated settings file with consistency monitoring", long_about = None)]
struct Cli {
    /// Store configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Settings file, overriding the configured location
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the validated value of a key
    Get { key: String },
    /// Write a value
    Set { key: String, value: String },
    /// Restore a key's fallback value
    Reset { key: String },
    /// Delete a key
    Remove { key: String },
    /// Delete every key
    Clear,
    /// List the stored keys of a group
    Keys { group: Option<String> },
    /// Report unrecognized and invalid settings
    Check {
        #[arg(long)]
        json: bool,
    },
    /// Follow the settings file and print consistency events
    Watch,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => StoreConfig::default(),
    };
    if let Some(file) = cli.file {
        config.file = Some(file);
    }
    config.watch = matches!(cli.command, Commands::Watch);

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("logging disabled: {}", e);
    }

    let store = ConfigStore::open(&config)?;

    match cli.command {
        Commands::Get { key } => {
            if !store.registry().contains(&key) {
                return Err(StoreError::UnrecognizedKey(key).into());
            }
            let text = store
                .value(&key)
                .and_then(|v| scalar_string(&v))
                .unwrap_or_default();
            println!("{}", text);
            if store.has_error() {
                eprintln!("{}", store.error_message());
            }
        }
        Commands::Set { key, value } => {
            store.set_value(&key, value)?;
            if store.has_error() {
                eprintln!("{}", store.error_message());
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Reset { key } => store.reset_value(&key)?,
        Commands::Remove { key } => store.remove(&key)?,
        Commands::Clear => store.clear_settings()?,
        Commands::Keys { group } => {
            let group = group.as_deref().unwrap_or(DEFAULT_GROUP);
            for key in store.keys_from_group(group) {
                println!("{}", key);
            }
        }
        Commands::Check { json } => {
            let unrecognized = store.unrecognized_settings()?;
            let invalid = store.invalid_settings()?;
            let consistent = unrecognized.is_empty() && invalid.is_empty();

            if json {
                let schema: BTreeMap<&str, &str> = store
                    .registry()
                    .iter()
                    .map(|(key, handler)| (key, handler.expected()))
                    .collect();
                let report = serde_json::json!({
                    "file": store.file_path(),
                    "consistent": consistent,
                    "unrecognized": unrecognized,
                    "invalid": invalid,
                    "schema": schema,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("file: {}", store.file_path().display());
                for key in &unrecognized {
                    println!("unrecognized: {}", key);
                }
                for key in &invalid {
                    println!("invalid: {}", key);
                }
                if consistent {
                    println!("consistent");
                } else {
                    println!("{}", store.error_message());
                }
            }
            if !consistent {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Watch => watch(&store).await,
    }

    Ok(ExitCode::SUCCESS)
}

async fn watch(store: &ConfigStore) {
    let mut events = store.subscribe();
    let Some(mut file_events) = store.take_file_events() else {
        tracing::error!("File watching is disabled");
        return;
    };

    // Report the initial state before following changes.
    store.check_and_handle_error();
    println!(
        "watching {} ({})",
        store.file_path().display(),
        if store.has_error() { "inconsistent" } else { "consistent" }
    );

    loop {
        tokio::select! {
            Some(event) = file_events.recv() => store.on_file_event(&event),
            event = events.recv() => match event {
                Ok(ConfigEvent::Error) => println!("error: {}", store.error_message()),
                Ok(ConfigEvent::ErrorResolved) => println!("resolved"),
                Ok(ConfigEvent::FileChanged(path)) => println!("changed: {}", path.display()),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event consumer lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }
}
