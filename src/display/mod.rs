//! Display formatting for terminal output
//!
//! Provides utilities for formatting reports and categories for terminal
//! display.

pub mod category;
pub mod validation;

pub use category::{format_cache_status, format_category_details, format_category_tree};
pub use validation::format_report;
