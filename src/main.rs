// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! anirename: anime filename inference and renaming
//!
//! Command line front end: parse-only previews, one-shot renames, inbox
//! watching and the HTTP health/inference surface.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use anirename::config::AppConfig;
use anirename::engine::InferenceEngine;
use anirename::intake::{RenameOutcome, RenameStatus, Renamer};
use anirename::watcher::{arrived_file, should_process, wait_for_stable, FileWatcher, WatchEvent};
use anirename::{web, RenameError, Result};

/// anirename CLI - anime filename inference and renaming
#[derive(Parser, Debug)]
#[command(name = "anirename")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Infer series and episode from anime filenames and rename them", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (shows which rule matched)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json", "jsonl"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show what a filename would be renamed to, without touching disk
    Infer {
        /// Filenames to parse
        #[arg(required = true)]
        filenames: Vec<String>,
    },

    /// Rename files, directories of files, or glob matches
    Rename {
        /// Files, directories or glob patterns
        #[arg(required = true)]
        paths: Vec<String>,

        /// Show the new names without renaming
        #[arg(long)]
        dry_run: bool,

        /// Move renamed files here (overrides config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Watch inbox directories and rename new files as they arrive
    Watch {
        /// Directories to watch (overrides config)
        #[arg(short, long)]
        dir: Vec<PathBuf>,

        /// Dry run mode (don't actually rename files)
        #[arg(long)]
        dry_run: bool,

        /// Rename files already sitting in the inboxes on startup
        #[arg(long)]
        process_existing: bool,

        /// Enable recursive directory watching
        #[arg(short, long)]
        recursive: bool,
    },

    /// Run only the HTTP health check and inference API
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Create a config file and inbox directory
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load(&cli.config)?;
    let engine = InferenceEngine::new();

    match cli.command {
        Commands::Infer { filenames } => run_infer(engine, &filenames, &cli.format),
        Commands::Rename { paths, dry_run, output_dir, recursive } => {
            if let Some(out) = output_dir {
                config.intake.output_dir = Some(out.to_string_lossy().to_string());
            }
            let renamer = Renamer::new(engine, &config).with_dry_run(dry_run || config.rules.dry_run);
            run_rename(&renamer, &paths, recursive, &cli.format)
        }
        Commands::Watch { dir, dry_run, process_existing, recursive } => {
            config.apply_env(std::env::var("PORT").ok().as_deref())?;
            run_watch(engine, config, dir, dry_run, process_existing, recursive).await
        }
        Commands::Serve { host, port } => {
            config.apply_env(std::env::var("PORT").ok().as_deref())?;
            if let Some(host) = host {
                config.web.host = host;
            }
            if let Some(port) = port {
                config.web.port = port;
            }
            web::start_server(engine, config).await
        }
        Commands::Config { action } => run_config_command(config, action, &cli.config),
        Commands::Init { dir, force } => run_init(dir, force),
    }
}

/// Parse-only previews
fn run_infer(engine: InferenceEngine, filenames: &[String], format: &str) -> Result<()> {
    let previews: Vec<_> = filenames.iter().map(|f| engine.preview(f)).collect();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&previews)?),
        "jsonl" => {
            for preview in &previews {
                println!("{}", serde_json::to_string(preview)?);
            }
        }
        _ => {
            for (i, preview) in previews.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("{}", preview);
            }
        }
    }

    Ok(())
}

/// Expand CLI arguments into concrete files.
///
/// Release names are full of `[` and `]`, so an argument naming an existing
/// path is taken literally and only otherwise treated as a glob.
fn collect_files(args: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for arg in args {
        let literal = PathBuf::from(arg);
        let matches: Vec<PathBuf> = if literal.exists() {
            vec![literal]
        } else {
            glob::glob(arg)?.filter_map(|p| p.ok()).collect()
        };

        if matches.is_empty() {
            warn!("No files match {:?}", arg);
        }

        for path in matches {
            if path.is_dir() {
                files.extend(list_dir(&path, recursive));
            } else if path.is_file() {
                files.push(path);
            }
        }
    }

    Ok(files)
}

fn list_dir(path: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            let p = entry.path();
            if p.is_dir() {
                if recursive {
                    files.extend(list_dir(&p, recursive));
                }
            } else if p.is_file() {
                files.push(p);
            }
        }
    }

    files.sort();
    files
}

/// One-shot rename of the given paths
fn run_rename(renamer: &Renamer, args: &[String], recursive: bool, format: &str) -> Result<()> {
    let files = collect_files(args, recursive)?;
    let mut outcomes: Vec<RenameOutcome> = Vec::new();
    let mut failed = 0;

    for file in files {
        if !should_process(&file) {
            debug!("Skipping {:?}", file);
            continue;
        }

        match renamer.process(&file) {
            Ok(outcome) => {
                if format == "text" {
                    let verb = match outcome.status {
                        RenameStatus::Renamed => "renamed",
                        RenameStatus::DryRun => "would rename",
                        RenameStatus::Unchanged => "unchanged",
                    };
                    println!("{} -> {} ({})", file.display(), outcome.target.display(), verb);
                }
                outcomes.push(outcome);
            }
            Err(e) => {
                failed += 1;
                match e {
                    RenameError::UnsupportedMediaType(_) | RenameError::FileTooLarge { .. } => {
                        warn!("Skipping {}: {}", file.display(), e)
                    }
                    _ => error!("Failed to rename {}: {}", file.display(), e),
                }
            }
        }
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        "jsonl" => {
            for outcome in &outcomes {
                println!("{}", serde_json::to_string(outcome)?);
            }
        }
        _ => {
            if !outcomes.is_empty() || failed > 0 {
                println!("\nProcessed {} files, {} skipped or failed", outcomes.len(), failed);
            }
        }
    }

    Ok(())
}

/// Watch mode: rename files as they land in the inboxes
async fn run_watch(
    engine: InferenceEngine,
    config: AppConfig,
    dir_overrides: Vec<PathBuf>,
    dry_run: bool,
    process_existing: bool,
    recursive: bool,
) -> Result<()> {
    let watch_paths: Vec<PathBuf> = if dir_overrides.is_empty() {
        config.watch_paths.iter().map(PathBuf::from).collect()
    } else {
        dir_overrides
    };

    info!("Inbox directories: {:?}", watch_paths);

    let renamer = Renamer::new(engine, &config).with_dry_run(dry_run || config.rules.dry_run);
    if renamer.is_dry_run() {
        warn!("DRY RUN MODE - files will not be renamed");
    }

    if config.web.enabled {
        let web_config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = web::start_server(engine, web_config).await {
                error!("Web server stopped: {}", e);
            }
        });
    }

    let mut watcher = FileWatcher::new(recursive)?;
    for path in &watch_paths {
        watcher.watch(path)?;
    }

    if process_existing {
        info!("Processing existing files...");
        for dir in &watch_paths {
            for path in list_dir(dir, recursive) {
                if should_process(&path) {
                    log_outcome(&path, renamer.process(&path));
                }
            }
        }
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = terminate => info!("Received SIGTERM, shutting down..."),
        }

        let _ = shutdown_tx.send(true);
    });

    info!("Watching for new episodes. Press Ctrl+C to stop.");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let Some(event) = watcher.next_event(Duration::from_millis(100)) else {
            continue;
        };

        match arrived_file(&event) {
            Some(path) => {
                let path = path.to_path_buf();
                let renamer = renamer.clone();
                tokio::spawn(async move {
                    if !wait_for_stable(&path, Duration::from_secs(10)).await {
                        debug!("File disappeared during stability check: {:?}", path);
                        return;
                    }
                    log_outcome(&path, renamer.process(&path));
                });
            }
            None => {
                if let WatchEvent::Error(e) = event {
                    warn!("Watch error: {}", e);
                }
            }
        }
    }

    info!("anirename stopped.");
    Ok(())
}

fn log_outcome(path: &Path, outcome: Result<RenameOutcome>) {
    match outcome {
        Ok(o) if o.status == RenameStatus::Unchanged => debug!("{:?} already clean", path),
        Ok(o) => info!("{} ({:?})", o.preview.caption(), o.target),
        Err(e) => warn!("{:?} not renamed: {} [{}]", path, e, e.user_notice()),
    }
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Inboxes: {:?}", config.watch_paths);
            println!("  Extensions: {:?}", config.intake.extensions);
            println!("  Max file size: {} bytes", config.intake.max_file_size);
        }
    }

    Ok(())
}

/// Initialize a config file and inbox
fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("config.json");

    if config_path.exists() && !force {
        return Err(RenameError::Config(
            "config.json already exists. Use --force to overwrite".to_string()
        ));
    }

    let inbox = target.join("inbox");
    std::fs::create_dir_all(&inbox)?;

    let config = AppConfig {
        watch_paths: vec![inbox.to_string_lossy().to_string()],
        ..AppConfig::default()
    };
    config.save(&config_path)?;

    println!("anirename initialized in {:?}", target);
    println!("\nCreated:");
    println!("  - config.json");
    println!("  - inbox/");
    println!("\nNext: anirename watch");

    Ok(())
}
