//! ACDCN bootstrap check tool.
//!
//! Loads the configuration exactly as the services do and reports whether it
//! would start.
//!
//! ```text
//! acdcn-bootstrap check   → validate env + credential file, print redacted snapshot
//! acdcn-bootstrap vars    → list recognised variables and defaults
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use acdcn_bootstrap::config::schema::VARIABLES;
use acdcn_bootstrap::database::ServiceAccountKey;
use acdcn_bootstrap::observability::logging::{init_logging, LogFormat};
use acdcn_bootstrap::ConfigLoader;

#[derive(Parser)]
#[command(name = "acdcn-bootstrap")]
#[command(about = "Validate ACDCN configuration and Firebase credentials", long_about = None)]
struct Cli {
    /// Env override file. Defaults to ./.env when present.
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Log output format (pretty or json).
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and credential file
    Check,
    /// List recognised environment variables
    Vars,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_format) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Check => check(cli.env_file),
        Commands::Vars => {
            print_vars();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn check(env_file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let loader = match env_file {
        Some(path) => ConfigLoader::with_env_file(&path),
        None => ConfigLoader::from_env(),
    };

    let config = loader.get_configuration()?;
    let key = ServiceAccountKey::from_file(&config.credential_path)?;

    let report = json!({
        "configuration": config.redacted(),
        "credentials": {
            "project_id": key.project_id(),
            "private_key_id": key.private_key_id(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_vars() {
    let width = VARIABLES.iter().map(|v| v.name.len()).max().unwrap_or(0);
    for var in VARIABLES {
        println!(
            "{:width$}  {:28}  {}",
            var.name,
            var.default,
            var.description,
            width = width
        );
    }
}
