//! Core data models for tally-cli
//!
//! This module contains the data structures of the split-validation domain:
//! money amounts, categories and their identifiers, and split records.

pub mod category;
pub mod ids;
pub mod money;
pub mod split;

pub use category::{Category, CategoryValidationError, GroupType};
pub use ids::{CategoryGroupId, CategoryId};
pub use money::{Money, MoneyParseError};
pub use split::{RawSplit, Split, SplitField};
