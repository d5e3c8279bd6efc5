use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tally_cli::cli::{handle_category_command, handle_validate_command, ValidateArgs};
use tally_cli::config::{paths::TallyPaths, settings::Settings};
use tally_cli::storage::Storage;

#[derive(Parser)]
#[command(
    name = "tally",
    author = "Kaylee Beyene",
    version,
    about = "Pre-flight validation for split transactions",
    long_about = "tally checks a proposed split of a transaction before it is \
                  submitted to the finance API: required fields, categories \
                  against a local cache, restricted category groups, and that \
                  the splits add up to the transaction total within one cent."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a split list; exits non-zero on blocking issues
    #[command(alias = "check")]
    Validate(ValidateArgs),

    /// Category cache commands
    #[command(subcommand)]
    Category(tally_cli::cli::CategoryCommands),

    /// Show current configuration and paths
    Config {
        /// Write the current settings to the settings file
        #[arg(long)]
        init: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = TallyPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let storage = Storage::new(paths.clone())?;
    storage.load_all();
    debug!(base_dir = %paths.base_dir().display(), "storage ready");

    match cli.command {
        Some(Commands::Validate(args)) => {
            if !handle_validate_command(&storage, &settings, args)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Commands::Category(cmd)) => {
            handle_category_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Config { init }) => {
            if init {
                settings.save(&paths)?;
                info!(path = %paths.settings_file().display(), "settings written");
            }

            println!("tally configuration");
            println!("===================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Category cache: {}", paths.categories_file().display());
            println!();
            println!("Settings:");
            println!("  API URL:          {}", settings.api_url);
            println!("  Token variable:   {}", settings.token_env);
            println!(
                "  Restricted types: {}",
                settings
                    .restricted_group_types
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("  Currency symbol:  {}", settings.currency_symbol);
        }
        None => {
            println!("tally - pre-flight validation for split transactions");
            println!();
            println!("Run 'tally --help' for usage information.");
            println!("Run 'tally category refresh' to populate the category cache.");
        }
    }

    Ok(ExitCode::SUCCESS)
}
