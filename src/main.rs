//! CLI entry point for ftcr.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ftcr_core::{Added, ClientConfig, ItemId, Library};
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod progress;
mod summary;

use app_config::{LoadedConfig, load_config};
use cli::Args;
use summary::{CollectionSummary, FailureSummary, ItemSummary, Summary};

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(value: ProcessExit) -> Self {
        match value {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let loaded = load_config(args.config.as_deref())?;

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config file > info
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => loaded
                .config
                .as_ref()
                .and_then(|config| config.verbosity)
                .map_or("info", app_config::VerbositySetting::filter_level),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, config_path = ?loaded.path, "CLI arguments parsed");

    if args.urls.is_empty() {
        info!("No URLs provided. Pass image or page URLs as arguments.");
        info!("Example: ftcr cdn.example.com/photo.jpg example.com/gallery");
        return Ok(ProcessExit::Success.into());
    }

    let config = client_config(&args, &loaded);
    debug!(?config, "client configuration");
    let library = Library::new(config);

    let mut added = Vec::new();
    let mut summary = Summary::default();
    for raw in &args.urls {
        match library.add(raw).await {
            Ok(entry) => added.push(entry),
            Err(error) => {
                warn!(input = %raw, %error, "could not add");
                summary.failures.push(FailureSummary {
                    input: raw.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    let use_spinner = !args.no_progress && !args.quiet && !args.json && io::stderr().is_terminal();
    let (spinner, stop) = progress::spawn_progress_ui(
        use_spinner,
        Arc::clone(library.registry()),
        tracked_ids(&added),
    );

    for entry in &added {
        match entry {
            Added::Item(item) => {
                let fetch = item.wait_for_fetch().await;
                summary.items.push(ItemSummary::new(item, fetch));
            }
            Added::Collection(collection) => {
                let fetches = collection.wait_for_fetches().await;
                summary
                    .collections
                    .push(CollectionSummary::new(collection, fetches));
            }
        }
    }

    stop.store(true, std::sync::atomic::Ordering::SeqCst);
    if let Some(spinner) = spinner {
        let _ = spinner.await;
    }

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{rendered}");
    } else {
        print!("{}", summary.render_text());
        for failure in &summary.failures {
            eprintln!("error: {}: {}", failure.input, failure.error);
        }
    }

    info!(
        items = summary.items.len(),
        collections = summary.collections.len(),
        failed = summary.failures.len(),
        "Run complete"
    );

    let outcome = if summary.has_failures() {
        ProcessExit::Failure
    } else {
        ProcessExit::Success
    };
    Ok(outcome.into())
}

/// Defaults, then config file, then command-line flags.
fn client_config(args: &Args, loaded: &LoadedConfig) -> ClientConfig {
    let mut config = ClientConfig::default();
    if let Some(file) = &loaded.config {
        file.apply_to(&mut config);
    }
    if args.lan_only {
        config.restrict_to_lan = true;
    }
    if let Some(scheme) = args.scheme {
        config.default_scheme = scheme.into();
    }
    config
}

fn tracked_ids(added: &[Added]) -> Vec<ItemId> {
    added
        .iter()
        .flat_map(|entry| match entry {
            Added::Item(item) => vec![item.id()],
            Added::Collection(collection) => {
                collection.members().iter().map(|item| item.id()).collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_config::FileConfig;
    use ftcr_core::Scheme;

    #[test]
    fn client_config_flags_override_file() {
        let args = Args::parse_from(["ftcr", "--scheme", "https", "--lan-only"]);
        let loaded = LoadedConfig {
            path: None,
            config: Some(FileConfig {
                default_scheme: Some(Scheme::Http),
                read_timeout_secs: Some(10),
                ..FileConfig::default()
            }),
        };

        let config = client_config(&args, &loaded);
        assert!(config.restrict_to_lan);
        assert_eq!(config.default_scheme, Scheme::Https);
        assert_eq!(config.read_timeout_secs, 10);
    }

    #[test]
    fn client_config_defaults_without_file() {
        let args = Args::parse_from(["ftcr"]);
        let config = client_config(&args, &LoadedConfig::default());
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn tracked_ids_is_empty_without_additions() {
        assert!(tracked_ids(&[]).is_empty());
    }
}
