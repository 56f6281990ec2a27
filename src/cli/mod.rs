//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Parallel WebDriver test runner with bounded retries
#[derive(Parser, Debug)]
#[command(name = "gridrunner")]
#[command(version)]
#[command(about = "Run browser test suites across per-capability worker pools")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run test suites
    Run(RunArgs),

    /// List registered capabilities and discovered spec files
    List(ListArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Spec files to run, comma-separated (default: discover under the spec dir)
    #[arg(short, long)]
    pub spec: Option<String>,

    /// Capabilities to run on, comma-separated (default: all registered)
    #[arg(short, long)]
    pub cap: Option<String>,

    /// Override the configured retry budget
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Output format (text, json, json-pretty, summary)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// WebDriver server URL
    #[arg(short, long)]
    pub webdriver: Option<String>,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show discovered spec files
    #[arg(short, long)]
    pub specs: bool,

    /// Show detailed capability information
    #[arg(short, long)]
    pub detailed: bool,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Destination path
        #[arg(short, long, default_value = "./gridrunner.yaml")]
        path: String,
    },

    /// Print the active configuration
    Show,

    /// Print the configuration file lookup result
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["gridrunner", "list", "--specs"]);
        match args.command {
            Command::List(list_args) => {
                assert!(list_args.specs);
                assert!(!list_args.detailed);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "gridrunner",
            "run",
            "--spec",
            "spec/landing.yaml,spec/checkout.yaml",
            "--cap",
            "chrome,firefox",
            "--retries",
            "3",
        ]);
        match args.command {
            Command::Run(run_args) => {
                assert_eq!(
                    run_args.spec.as_deref(),
                    Some("spec/landing.yaml,spec/checkout.yaml")
                );
                assert_eq!(run_args.cap.as_deref(), Some("chrome,firefox"));
                assert_eq!(run_args.retries, Some(3));
                assert_eq!(run_args.format, "text");
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_config_init_args() {
        let args = Args::parse_from(["gridrunner", "config", "init", "--path", "custom.yaml"]);
        match args.command {
            Command::Config(config_args) => match config_args.action {
                ConfigAction::Init { path } => assert_eq!(path, "custom.yaml"),
                _ => panic!("Expected Init action"),
            },
            _ => panic!("Expected Config command"),
        }
    }
}
