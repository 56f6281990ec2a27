//! gridrunner - parallel WebDriver test runner
//!
//! Dispatches declarative browser test suites across per-capability worker
//! pools, aggregates pass/fail outcomes, and re-runs only the failed tasks
//! up to a configured retry budget.
//!
//! ## Usage
//!
//! ```bash
//! # Run every spec under the spec dir on all registered capabilities
//! gridrunner run
//!
//! # Run selected specs on selected capabilities
//! gridrunner run --spec spec/landing.yaml,spec/checkout.yaml --cap chrome
//!
//! # Override the retry budget and output JSON
//! gridrunner run --retries 3 --format json-pretty
//!
//! # Show what the runner would pick up
//! gridrunner list --specs --detailed
//!
//! # Write an example configuration
//! gridrunner config init
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod cli;
mod config;
mod driver;
mod executor;
mod models;
mod output;
mod suite;
mod utils;

use cli::{Args, Command, ConfigAction};
use config::{CapabilityRegistry, ConfigError, ConfigFile};
use driver::{Driver, WebDriverClient};
use executor::{BrowserPool, Reporter, RetryRunner, Task};
use output::{OutputFormat, ReportFormatter};
use suite::{discover_specs, TestSpec};
use utils::LogLevel;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    utils::init_logger(level);

    match args.command {
        Command::Run(run_args) => {
            let converged = run_suites(run_args).await?;
            if !converged {
                std::process::exit(1);
            }
        }
        Command::List(list_args) => {
            list_command(list_args)?;
        }
        Command::Config(config_args) => {
            config_command(config_args)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<ConfigFile, ConfigError> {
    match path {
        Some(path) => ConfigFile::load(path),
        None => ConfigFile::load_default(),
    }
}

/// Resolve the capability selection against the registry.
///
/// An unknown name is fatal before any dispatch.
fn select_capabilities(
    registry: &CapabilityRegistry,
    selection: Option<&str>,
) -> Result<Vec<String>, ConfigError> {
    let names: Vec<String> = match selection {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => registry.names().iter().map(|s| s.to_string()).collect(),
    };

    if names.is_empty() {
        return Err(ConfigError::NoCapabilities);
    }
    for name in &names {
        registry.get(name)?;
    }
    Ok(names)
}

/// Resolve the spec file selection.
///
/// Explicit paths must exist; otherwise specs are discovered under the
/// configured spec directory.
fn select_specs(config: &ConfigFile, selection: Option<&str>) -> Result<Vec<PathBuf>, ConfigError> {
    match selection {
        Some(list) => {
            let paths: Vec<PathBuf> = list
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
            for path in &paths {
                if !path.exists() {
                    return Err(ConfigError::SpecNotFound(path.clone()));
                }
            }
            Ok(paths)
        }
        None => discover_specs(&config.spec_dir),
    }
}

async fn run_suites(args: cli::RunArgs) -> Result<bool> {
    let config = load_config(args.config.as_deref())?;
    let registry = config.registry();
    if registry.is_empty() {
        return Err(ConfigError::NoCapabilities.into());
    }

    let capabilities = select_capabilities(&registry, args.cap.as_deref())?;
    let spec_paths = select_specs(&config, args.spec.as_deref())?;
    if spec_paths.is_empty() {
        anyhow::bail!("no spec files found under {}", config.spec_dir.display());
    }

    let specs = spec_paths
        .iter()
        .map(TestSpec::load)
        .collect::<Result<Vec<_>, _>>()?;

    info!(">>> Selected capabilities: {}", capabilities.join(", "));
    info!(">>> Running {} spec file(s)", specs.len());

    let webdriver_url = args
        .webdriver
        .as_deref()
        .unwrap_or(&config.webdriver_url)
        .to_string();
    let retries = args.retries.unwrap_or(config.retries);

    let driver: Arc<dyn Driver> = Arc::new(WebDriverClient::new(&webdriver_url)?);
    let reporter = Arc::new(Reporter::new());
    let pool = Arc::new(BrowserPool::new(registry.clone(), driver));

    let mut tasks: Vec<Arc<Task>> = Vec::new();
    for capability in &capabilities {
        for spec in &specs {
            tasks.extend(spec.into_tasks(capability, &reporter));
        }
        let instances = registry.get(capability)?.instances;
        if let Err(err) = pool.add_workers(capability, instances).await {
            // Quit the sessions opened so far before bailing out.
            pool.cleanup().await;
            return Err(err.into());
        }
    }

    let runner = RetryRunner::new(Arc::clone(&pool), Arc::clone(&reporter), retries);
    let result = runner.run(tasks).await;

    pool.cleanup().await;
    let outcome = result?;

    let format = OutputFormat::from_str(&args.format).unwrap_or(OutputFormat::Text);
    let formatter = if args.no_color {
        ReportFormatter::new(format).no_color()
    } else {
        ReportFormatter::new(format)
    };

    for report in &outcome.rounds {
        println!("{}", formatter.format_report(report));
    }
    println!("{}", formatter.format_outcome(&outcome));

    Ok(outcome.converged)
}

fn list_command(args: cli::ListArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    println!("Registered capabilities:");
    for capability in config.registry().iter() {
        if args.detailed {
            println!(
                "  {:12} browser={} instances={} headless={} platform={}",
                capability.name,
                capability.browser,
                capability.instances,
                capability.headless,
                capability.platform.as_deref().unwrap_or("any"),
            );
        } else {
            println!("  {capability}");
        }
    }

    if args.specs {
        let specs = discover_specs(&config.spec_dir)?;
        println!(
            "\nSpec files under {} ({} found):",
            config.spec_dir.display(),
            specs.len()
        );
        for path in specs {
            if args.detailed {
                match TestSpec::load(&path) {
                    Ok(spec) => println!(
                        "  {} - '{}', {} test(s)",
                        path.display(),
                        spec.suite,
                        spec.tests.len()
                    ),
                    Err(err) => println!("  {} - unreadable: {err}", path.display()),
                }
            } else {
                println!("  {}", path.display());
            }
        }
    }

    Ok(())
}

fn config_command(args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Init { path } => {
            ConfigFile::example().save(&path)?;
            println!("Wrote example configuration to {path}");
        }
        ConfigAction::Show => {
            let config = ConfigFile::load_default()?;
            println!("{}", serde_yaml::to_string(&config)?);
        }
        ConfigAction::Path => match ConfigFile::find() {
            Some(path) => println!("{}", path.display()),
            None => println!("no configuration file found, using defaults"),
        },
    }
    Ok(())
}
