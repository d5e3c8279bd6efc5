//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod category;
pub mod validate;

pub use category::{handle_category_command, CategoryCommands};
pub use validate::{handle_validate_command, ValidateArgs};
