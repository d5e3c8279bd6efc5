//! Storage layer for tally-cli
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation for the category cache.

pub mod categories;
pub mod file_io;

pub use categories::{CategoryCache, CategoryCacheFile, CategoryRepository};
pub use file_io::{read_json_soft, remove_file_if_exists, write_json_atomic};

use crate::config::paths::TallyPaths;
use crate::error::TallyError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TallyPaths,
    pub categories: CategoryRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: TallyPaths) -> Result<Self, TallyError> {
        paths.ensure_directories()?;

        Ok(Self {
            categories: CategoryRepository::new(paths.categories_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TallyPaths {
        &self.paths
    }

    /// Load all data from disk; absent data is not an error
    pub fn load_all(&self) {
        self.categories.load();
    }
}
