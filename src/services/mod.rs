//! Business logic layer for tally-cli
//!
//! Services sit between the CLI and the models/storage: split validation,
//! category queries, and split input parsing.

pub mod category;
pub mod input;
pub mod validation;

pub use category::{CategoryGroupWithCategories, CategoryService};
pub use input::{parse_splits, read_splits, SplitFormat};
pub use validation::{
    validate, Issue, SplitValidator, ValidationReport, ValidationRules, Warning, TOLERANCE,
};
