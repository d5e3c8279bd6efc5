//! Validate CLI command
//!
//! Reads a split list, validates it against the cached categories and the
//! expected total, and prints the report.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::Settings;
use crate::display::format_report;
use crate::error::{TallyError, TallyResult};
use crate::models::Money;
use crate::services::{read_splits, SplitValidator, ValidationRules};
use crate::storage::Storage;

/// Arguments for `tally validate`
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Split list: a JSON array or a CSV file with a header row ('-' reads stdin)
    pub file: PathBuf,

    /// Expected transaction total (e.g. "-40.91")
    #[arg(short, long, allow_hyphen_values = true)]
    pub total: Option<String>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Handle the validate command; returns whether the split list is valid
pub fn handle_validate_command(
    storage: &Storage,
    settings: &Settings,
    args: ValidateArgs,
) -> TallyResult<bool> {
    let expected_total = args
        .total
        .as_deref()
        .map(|total| {
            Money::parse(total)
                .map_err(|e| TallyError::Input(format!("Invalid total amount: {}", e)))
        })
        .transpose()?;

    let splits = read_splits(&args.file)?;

    let cache = storage.categories.snapshot();
    let validator = SplitValidator::with_rules(ValidationRules::from_settings(settings));
    let report = validator.validate(&splits, expected_total, cache.as_deref());

    info!(
        splits = report.split_count(),
        issues = report.issues().len(),
        warnings = report.warnings().len(),
        "validated splits"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report, &settings.currency_symbol));
    }

    Ok(report.is_valid())
}
