//! Category display formatting
//!
//! Formats cached categories for terminal output in tree and detail views.

use chrono::{DateTime, Utc};

use crate::models::{Category, GroupType};
use crate::services::category::CategoryGroupWithCategories;
use crate::storage::CategoryCache;

/// Format categories as a tree grouped by category group
///
/// Groups whose type is in `restricted` are marked, since splits cannot use them.
pub fn format_category_tree(
    groups_with_categories: &[CategoryGroupWithCategories],
    restricted: &[GroupType],
) -> String {
    if groups_with_categories.is_empty() {
        return "No categories found.\n\nRun 'tally category refresh' to fetch categories.\n"
            .to_string();
    }

    let mut output = String::new();

    for (i, gwc) in groups_with_categories.iter().enumerate() {
        let marker = if restricted.contains(&gwc.group_type) {
            " [restricted for splits]"
        } else {
            ""
        };
        output.push_str(&format!("{} ({}){}\n", gwc.group_name, gwc.group_type, marker));

        for (j, category) in gwc.categories.iter().enumerate() {
            let is_last = j == gwc.categories.len() - 1;
            let prefix = if is_last { "└── " } else { "├── " };
            output.push_str(&format!("  {}{}  {}\n", prefix, category.name, category.id));
        }

        if i < groups_with_categories.len() - 1 {
            output.push('\n');
        }
    }

    output
}

/// Format category details
pub fn format_category_details(category: &Category, restricted: &[GroupType]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:         {}\n", category.id));
    output.push_str(&format!(
        "  Group:      {} ({})\n",
        category.group_name, category.group_id
    ));
    output.push_str(&format!("  Group Type: {}\n", category.group_type));
    output.push_str(&format!(
        "  Splits:     {}\n",
        if category.has_group_type_in(restricted) {
            "rejected upstream"
        } else {
            "allowed"
        }
    ));

    output
}

/// Format the state of the category cache
pub fn format_cache_status(
    cache: Option<&CategoryCache>,
    path: &std::path::Path,
    now: DateTime<Utc>,
) -> String {
    let mut output = String::new();
    output.push_str(&format!("Category cache: {}\n", path.display()));

    match cache {
        Some(cache) => {
            output.push_str(&format!("  Categories: {}\n", cache.len()));
            output.push_str(&format!("  Source:     {}\n", cache.source()));
            output.push_str(&format!(
                "  Fetched:    {} ({})\n",
                cache.fetched_at().format("%Y-%m-%d %H:%M UTC"),
                format_age(cache.age(now))
            ));
        }
        None => {
            output.push_str("  Status:     absent (category checks will be skipped)\n");
            output.push_str("  Run 'tally category refresh' to populate it.\n");
        }
    }

    output
}

fn format_age(age: chrono::Duration) -> String {
    if age.num_days() > 0 {
        format!("{} days ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{} hours ago", age.num_hours())
    } else if age.num_minutes() > 0 {
        format!("{} minutes ago", age.num_minutes())
    } else {
        "just now".to_string()
    }
}
