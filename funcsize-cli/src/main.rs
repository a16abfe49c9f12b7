//! funcsize CLI - find the largest functions across repositories

// Global invariants enforced:
// - Reports keep the order repositories were given in
// - Identical input yields identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use funcsize_core::config::{self, ResolvedConfig};
use funcsize_core::scan::RepositorySource;
use funcsize_core::{read_repository_list, render_json, render_text, scan_repositories};
use funcsize_core::{Language, RepositoryReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter when no `-v` is given
const LOG_ENV: &str = "FUNCSIZE_LOG";

#[derive(Parser)]
#[command(name = "funcsize")]
#[command(
    about = "Find the largest functions in JavaScript, TypeScript, Java, C#, and Python repositories"
)]
#[command(version = env!("FUNCSIZE_VERSION"))]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan repositories and rank their largest functions
    Scan {
        /// Local paths or remote URLs (http://, https://, git@)
        repos: Vec<String>,

        /// File listing one repository per line
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Repositories scanned in parallel (overrides config file)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Show only top N functions per repository (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Minimum function size in lines (overrides config file)
        #[arg(long)]
        min_size: Option<usize>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without scanning
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            repos,
            input,
            output,
            format,
            jobs,
            top,
            min_size,
            config: config_path,
        } => {
            let working_dir = std::env::current_dir()?;
            let mut resolved = config::load_and_resolve(&working_dir, config_path.as_deref())
                .context("failed to load configuration")?;
            apply_overrides(&mut resolved, jobs, top, min_size)?;

            let mut sources = repos;
            if let Some(ref list) = input {
                sources.extend(read_repository_list(list)?);
            }
            if sources.is_empty() {
                anyhow::bail!("no repositories given; pass paths or URLs, or use --input");
            }

            tracing::debug!(repositories = sources.len(), jobs = resolved.jobs, "starting scan");
            let reports = run_scan(&sources, &resolved)?;
            let rendered = match format {
                OutputFormat::Text => render_text(&reports),
                OutputFormat::Json => render_json(&reports),
            };
            write_output(&rendered, output.as_deref())?;

            if reports.iter().all(|r| r.error.is_some()) {
                eprintln!("All {} repositories failed to scan", reports.len());
                std::process::exit(1);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let working_dir = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&working_dir, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let working_dir = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&working_dir, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Apply CLI flags on top of the resolved config
fn apply_overrides(
    resolved: &mut ResolvedConfig,
    jobs: Option<usize>,
    top: Option<usize>,
    min_size: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(jobs) = jobs {
        if jobs < 1 {
            anyhow::bail!("--jobs must be at least 1 (got {})", jobs);
        }
        resolved.jobs = jobs;
    }
    if let Some(top) = top {
        if top < 1 {
            anyhow::bail!("--top must be at least 1 (got {})", top);
        }
        resolved.top = top;
    }
    if let Some(min_size) = min_size {
        resolved.min_size = min_size.max(1);
    }
    Ok(())
}

fn run_scan(sources: &[String], resolved: &ResolvedConfig) -> anyhow::Result<Vec<RepositoryReport>> {
    let progress = ProgressBar::new(sources.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30}] {pos}/{len} {msg}")
            .context("invalid progress template")?
            .progress_chars("=> "),
    );

    let cancel = AtomicBool::new(false);
    let results = scan_repositories(sources, resolved, &cancel, |source, result| {
        if let Ok(scan) = result {
            tracing::info!(repository = %scan.name, functions = scan.functions.len(), "scanned");
        }
        progress.set_message(RepositorySource::parse(source).name());
        progress.inc(1);
    })?;
    progress.finish_and_clear();

    Ok(sources
        .iter()
        .zip(results)
        .map(|(source, result)| match result {
            Ok(scan) => RepositoryReport::from_scan(&scan, resolved.min_size, resolved.top),
            Err(e) => RepositoryReport::failed(
                RepositorySource::parse(source).name(),
                source.as_str(),
                format!("{:#}", e),
            ),
        })
        .collect())
}

fn write_output(rendered: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write report: {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Scan:");
    println!("  jobs: {}", resolved.jobs);
    println!("  clone_timeout_secs: {}", resolved.clone_timeout.as_secs());
    println!(
        "  skip_dirs: {}",
        display_list(&resolved.skip_dirs)
    );
    println!();
    println!("Filters:");
    println!("  min_size: {}", resolved.min_size);
    println!("  top: {}", resolved.top);
    println!("  include: {}", display_list(&resolved.include_patterns));
    println!("  exclude: {}", display_list(&resolved.exclude_patterns));
    println!();
    println!("Languages:");
    for language in [
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::CSharp,
        Language::Python,
    ] {
        println!("  {}: {}", language.name(), language.extensions().join(", "));
    }
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
