//! tally-cli - pre-flight validation for split transactions
//!
//! This library checks a proposed split of a personal-finance transaction
//! before it is submitted upstream: every split must carry a merchant, an
//! amount and a category, categories must exist in the locally cached
//! taxonomy and must not belong to a group type the upstream API rejects, and
//! the split amounts must reconcile with the parent total within one cent.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (money, categories, splits)
//! - `storage`: JSON file storage and the category cache
//! - `source`: Category sources used to refresh the cache
//! - `services`: Split validation, category queries, split input parsing
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust
//! use tally_cli::models::{Money, RawSplit};
//! use tally_cli::services::validate;
//!
//! let splits = vec![
//!     RawSplit::new("Costco", Money::from_cents(-2078), "catX", Some("groceries")),
//!     RawSplit::new("Costco", Money::from_cents(-2013), "catY", Some("household")),
//! ];
//! let report = validate(&splits, Some(Money::from_cents(-4091)), None);
//! assert!(report.is_valid());
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod source;
pub mod storage;

pub use error::{TallyError, TallyResult};
