// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Taxein CLI - plan, review and apply category moves for a directory

use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use taxein::applier::Applier;
use taxein::classifier::LlmClassifier;
use taxein::config::AppConfig;
use taxein::extractors::ExtractorRegistry;
use taxein::ollama::OllamaClient;
use taxein::plan::SortingPlan;
use taxein::planner::Planner;
use taxein::prefs::ModelPrefs;
use taxein::progress::{ProgressSink, ProgressUpdate};
use taxein::{Result, TaxeinError};

/// Taxein CLI - Local AI File Sorter
#[derive(Parser, Debug)]
#[command(name = "taxein")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "0.4.0")]
#[command(about = "Sort files into category folders with a local AI model", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan, review and apply moves from SOURCE into category folders under TARGET
    Sort {
        /// Directory containing the files to sort
        source: PathBuf,

        /// Directory receiving the category folders
        target: PathBuf,

        /// Model to use (overrides the remembered and configured one)
        #[arg(short, long)]
        model: Option<String>,

        /// Apply the plan without interactive review
        #[arg(short = 'y', long)]
        yes: bool,

        /// Build and print the plan, but move nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Build and print a sorting plan without applying it
    Plan {
        /// Directory containing the files to sort
        source: PathBuf,

        /// Directory receiving the category folders
        target: PathBuf,

        /// Model to use (overrides the remembered and configured one)
        #[arg(short, long)]
        model: Option<String>,

        /// Output format for the plan
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// List the models available at the inference endpoint
    Models,

    /// Show endpoint, model and category status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
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

    // Initialize tracing
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
        .init();

    if !cli.quiet {
        info!("Taxein v0.4.0 - Local AI File Sorter");
    }

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Sort {
            source,
            target,
            model,
            yes,
            dry_run,
        } => run_sort(config, source, target, model, yes, dry_run).await,
        Commands::Plan {
            source,
            target,
            model,
            format,
        } => run_plan(config, source, target, model, &format).await,
        Commands::Models => run_models(config).await,
        Commands::Status => run_status(config).await,
        Commands::Config { action } => run_config_command(config, action, &cli.config),
    }
}

/// Plan, review and apply a full sort run
async fn run_sort(
    config: AppConfig,
    source: PathBuf,
    target: PathBuf,
    model: Option<String>,
    yes: bool,
    dry_run: bool,
) -> Result<()> {
    let mut plan = build_plan(&config, &source, &target, model).await?;

    if plan.is_empty() {
        println!("No supported files found under {}.", source.display());
        return Ok(());
    }

    print_plan(&plan);

    if dry_run {
        println!("\nDry run - no files will be moved.");
        return Ok(());
    }

    if !yes && !review_plan(&mut plan)? {
        println!("Cancelled; no files were moved.");
        return Ok(());
    }

    let pairs = plan.finalize();
    if pairs.is_empty() {
        println!("Every entry is excluded; nothing to move.");
        return Ok(());
    }

    let (sink, rx) = ProgressSink::channel();
    let printer = spawn_progress_printer(rx);
    let report = {
        let applier = Applier::new(sink);
        applier.apply(&pairs)
    };
    let _ = printer.await;

    println!("\nMoved {} files, {} failed.", report.moved(), report.failed());
    for outcome in report.outcomes.iter().filter(|o| !o.succeeded()) {
        println!(
            "  failed: {} ({})",
            outcome.source.display(),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

/// Plan-only run with selectable output format
async fn run_plan(
    config: AppConfig,
    source: PathBuf,
    target: PathBuf,
    model: Option<String>,
    format: &str,
) -> Result<()> {
    let plan = build_plan(&config, &source, &target, model).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
        _ => {
            if plan.is_empty() {
                println!("No supported files found under {}.", source.display());
            } else {
                print_plan(&plan);
                println!("\nNothing was moved. Run 'taxein sort' to apply a plan.");
            }
        }
    }

    Ok(())
}

/// Resolve the model, then build the plan with live progress output
async fn build_plan(
    config: &AppConfig,
    source: &PathBuf,
    target: &PathBuf,
    model: Option<String>,
) -> Result<SortingPlan> {
    let client = OllamaClient::new(&config.ai_engine.url, config.ai_engine.timeout_secs);
    let model = resolve_model(&client, config, model).await?;

    let prefs = ModelPrefs::default_location();
    if let Err(e) = prefs.save(&model) {
        warn!("Could not remember model choice: {}", e);
    }

    info!("Source: {}", source.display());
    info!("Target: {}", target.display());
    info!("Model: {}", model);

    let classifier = LlmClassifier::new(
        client,
        model,
        config.categories.clone(),
        config.prompts.classify.clone(),
    );

    let (sink, rx) = ProgressSink::channel();
    let printer = spawn_progress_printer(rx);
    let plan = {
        let planner = Planner::new(config.categories.clone(), sink);
        planner.plan(source, target, &classifier).await
    };
    let _ = printer.await;

    plan
}

/// Pick the model to use: CLI flag, then remembered choice, then the
/// configured default, then whatever the endpoint offers first.
///
/// Fails before any planning when the endpoint is unreachable or has no
/// models at all.
async fn resolve_model(
    client: &OllamaClient,
    config: &AppConfig,
    requested: Option<String>,
) -> Result<String> {
    client.health_check().await?;

    let models = client.list_models().await?;
    if models.is_empty() {
        return Err(TaxeinError::OllamaUnavailable(
            "no models are installed; pull one with 'ollama pull <model>'".to_string(),
        ));
    }

    if let Some(model) = requested {
        if !models.iter().any(|m| m == &model || m.starts_with(&model)) {
            warn!("Model '{}' is not in the installed list; using it anyway", model);
        }
        return Ok(model);
    }

    if let Some(remembered) = ModelPrefs::default_location().load() {
        if models.contains(&remembered) {
            info!("Using remembered model '{}'", remembered);
            return Ok(remembered);
        }
    }

    if models.contains(&config.ai_engine.model) {
        return Ok(config.ai_engine.model.clone());
    }

    Ok(models[0].clone())
}

/// Drain progress updates into a terminal progress bar
fn spawn_progress_printer(mut rx: UnboundedReceiver<ProgressUpdate>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("[{bar:40}] {pos}/{len} {wide_msg}")
                .expect("valid progress template")
                .progress_chars("=> "),
        );

        while let Some(update) = rx.recv().await {
            match update {
                ProgressUpdate::Message(message) => bar.println(message),
                ProgressUpdate::Progress {
                    done,
                    total,
                    message,
                } => {
                    if bar.length() != Some(total as u64) {
                        bar.set_length(total as u64);
                    }
                    bar.set_position(done as u64);
                    bar.set_message(message);
                }
            }
        }

        bar.finish_and_clear();
    })
}

fn print_plan(plan: &SortingPlan) {
    println!("\nSorting plan into {}:", plan.target_root().display());
    println!("{:>4}  {:<40} {:>10}  {}", "#", "File", "Size", "Category");
    for entry in plan.entries() {
        println!(
            "{:>4}  {:<40} {:>10}  {}",
            entry.index,
            entry.file_name,
            format_size(entry.size_bytes),
            entry.category().unwrap_or("[excluded]")
        );
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Interactive review loop. Returns false when the user cancels.
fn review_plan(plan: &mut SortingPlan) -> Result<bool> {
    loop {
        let action = Select::new()
            .with_prompt("Review the plan")
            .items(&["Apply plan", "Reassign a file", "Toggle exclusion", "Cancel"])
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        match action {
            0 => return Ok(true),
            1 => {
                let index = prompt_entry_index(plan)?;
                let keys: Vec<String> = plan.categories().keys().map(String::from).collect();
                let choice = Select::new()
                    .with_prompt("New category")
                    .items(&keys)
                    .default(0)
                    .interact()
                    .map_err(prompt_error)?;
                plan.reassign(index, &keys[choice])?;
                print_plan(plan);
            }
            2 => {
                let index = prompt_entry_index(plan)?;
                if plan.entries()[index].excluded() {
                    plan.restore(index)?;
                } else {
                    plan.exclude(index)?;
                }
                print_plan(plan);
            }
            _ => return Ok(false),
        }
    }
}

fn prompt_entry_index(plan: &SortingPlan) -> Result<usize> {
    let len = plan.len();
    Input::new()
        .with_prompt(format!("Entry number (0-{})", len - 1))
        .validate_with(move |value: &usize| {
            if *value < len {
                Ok(())
            } else {
                Err("no entry with that number")
            }
        })
        .interact_text()
        .map_err(prompt_error)
}

fn prompt_error(e: dialoguer::Error) -> TaxeinError {
    TaxeinError::Plan(format!("interactive prompt failed: {}", e))
}

/// List available models, marking the remembered one
async fn run_models(config: AppConfig) -> Result<()> {
    let client = OllamaClient::new(&config.ai_engine.url, config.ai_engine.timeout_secs);
    client.health_check().await?;

    let models = client.list_models().await?;
    if models.is_empty() {
        println!("No models installed. Pull one with 'ollama pull <model>'.");
        return Ok(());
    }

    let remembered = ModelPrefs::default_location().load();
    println!("Available models:");
    for model in &models {
        let marker = if Some(model) == remembered.as_ref() {
            "→"
        } else {
            " "
        };
        println!("  {} {}", marker, model);
    }

    Ok(())
}

/// Run status check
async fn run_status(config: AppConfig) -> Result<()> {
    let client = OllamaClient::new(&config.ai_engine.url, config.ai_engine.timeout_secs);

    println!("Taxein v0.4.0 Status");
    println!("====================");

    match client.health_check().await {
        Ok(()) => println!("Ollama: Running at {}", client.base_url()),
        Err(e) => println!("Ollama: Error - {}", e),
    }

    match client.list_models().await {
        Ok(models) => {
            println!("\nAvailable models:");
            for m in &models {
                let marker = if m == &config.ai_engine.model { "→" } else { " " };
                println!("  {} {}", marker, m);
            }
        }
        Err(e) => println!("  Error listing models: {}", e),
    }

    println!("\nCategories:");
    for category in config.categories.iter() {
        let marker = if category.key == config.categories.catch_all() {
            " (catch-all)"
        } else {
            ""
        };
        println!("  {} -> {}{}", category.key, category.folder, marker);
    }

    let registry = ExtractorRegistry::new();
    println!("\nSupported extensions: {}", registry.supported_extensions().join(", "));

    let prefs = ModelPrefs::default_location();
    match prefs.load() {
        Some(model) => println!("Remembered model: {}", model),
        None => println!("Remembered model: none"),
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &PathBuf) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.categories.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Endpoint: {}", config.ai_engine.url);
            println!("  Default model: {}", config.ai_engine.model);
            println!("  Categories: {}", config.categories.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_sort_command() {
        let cli = Cli::try_parse_from([
            "taxein", "sort", "/tmp/in", "/tmp/out", "--model", "phi4-mini", "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Sort {
                source,
                target,
                model,
                yes,
                dry_run,
            } => {
                assert_eq!(source, PathBuf::from("/tmp/in"));
                assert_eq!(target, PathBuf::from("/tmp/out"));
                assert_eq!(model.as_deref(), Some("phi4-mini"));
                assert!(!yes);
                assert!(dry_run);
            }
            _ => panic!("Expected Sort command"),
        }
    }

    #[test]
    fn test_cli_plan_json_format() {
        let cli = Cli::try_parse_from(["taxein", "plan", "/tmp/in", "/tmp/out", "--format", "json"])
            .unwrap();

        match cli.command {
            Commands::Plan { format, .. } => assert_eq!(format, "json"),
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(
            Cli::try_parse_from(["taxein", "plan", "/tmp/in", "/tmp/out", "--format", "xml"])
                .is_err()
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
