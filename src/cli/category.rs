//! Category CLI commands
//!
//! Implements CLI commands for inspecting and refreshing the category cache.

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use tracing::{info, warn};

use crate::config::Settings;
use crate::display::category::{
    format_cache_status, format_category_details, format_category_tree,
};
use crate::error::TallyResult;
use crate::services::CategoryService;
use crate::source::{CategorySource, GraphqlCategorySource, JsonFileCategorySource};
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List cached categories (organized by group)
    List {
        /// Only show this group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Show category details
    Show {
        /// Category ID or name
        category: String,
    },

    /// Fetch categories and replace the cache
    Refresh {
        /// Read an exported JSON file instead of calling the API
        #[arg(long)]
        from_file: Option<PathBuf>,
    },

    /// Show cache location, size and age
    Status,

    /// Delete the cached categories
    Clear,
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CategoryCommands,
) -> TallyResult<()> {
    let restricted = &settings.restricted_group_types;

    match cmd {
        CategoryCommands::List { group } => {
            let Some(cache) = storage.categories.snapshot() else {
                print!("{}", format_category_tree(&[], restricted));
                return Ok(());
            };

            let service = CategoryService::new(&cache);
            let groups = match group {
                Some(name) => service.list_group(&name),
                None => service.list_groups(),
            };
            print!("{}", format_category_tree(&groups, restricted));
        }

        CategoryCommands::Show { category } => {
            let Some(cache) = storage.categories.snapshot() else {
                println!("No category cache. Run 'tally category refresh' first.");
                return Ok(());
            };

            let service = CategoryService::new(&cache);
            let found = service.get(&category)?;
            print!("{}", format_category_details(found, restricted));

            if found.has_group_type_in(restricted) {
                if let Some(alt) = service.suggest_alternative(found, restricted) {
                    println!("  Suggested:  {} ({})", alt.name, alt.id);
                }
            }
        }

        CategoryCommands::Refresh { from_file } => {
            let source: Box<dyn CategorySource> = match from_file {
                Some(path) => Box::new(JsonFileCategorySource::new(path)),
                None => Box::new(GraphqlCategorySource::new(
                    settings.api_url.clone(),
                    settings.api_token()?,
                )?),
            };

            let runtime = tokio::runtime::Runtime::new()?;
            let cache = runtime.block_on(storage.categories.refresh(source.as_ref()))?;

            if cache.is_empty() {
                warn!(source = source.name(), "source returned no categories");
            }
            info!(count = cache.len(), "refresh complete");
            println!(
                "Fetched {} categories from {}",
                cache.len(),
                cache.source()
            );
        }

        CategoryCommands::Status => {
            let cache = storage.categories.snapshot();
            print!(
                "{}",
                format_cache_status(cache.as_deref(), storage.categories.path(), Utc::now())
            );
        }

        CategoryCommands::Clear => {
            if storage.categories.clear()? {
                println!("Category cache cleared.");
            } else {
                println!("No category cache to clear.");
            }
        }
    }

    Ok(())
}
