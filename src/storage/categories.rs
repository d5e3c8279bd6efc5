//! Category cache and its repository
//!
//! [`CategoryCache`] is an immutable snapshot of the upstream category
//! taxonomy with O(1) lookup by identifier. [`CategoryRepository`] owns the
//! persisted `categories.json` and the process-wide current snapshot: loading
//! is soft (a missing or corrupt file means "absent"), and a refresh persists
//! the new snapshot with an atomic rename before swapping it in memory, so
//! readers only ever see the old snapshot or the new one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::TallyResult;
use crate::models::{Category, CategoryId};
use crate::source::CategorySource;

use super::file_io::{read_json_soft, remove_file_if_exists, write_json_atomic};

/// Serializable form of the category cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCacheFile {
    pub fetched_at: DateTime<Utc>,
    #[serde(default)]
    pub source: String,
    pub categories: Vec<Category>,
}

/// An immutable snapshot of the category taxonomy
#[derive(Debug, Clone)]
pub struct CategoryCache {
    fetched_at: DateTime<Utc>,
    source: String,
    categories: HashMap<CategoryId, Category>,
}

impl CategoryCache {
    /// Build a snapshot, dropping entries that fail validation
    pub fn from_categories(
        categories: impl IntoIterator<Item = Category>,
        source: impl Into<String>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let mut map = HashMap::new();

        for category in categories {
            if let Err(e) = category.validate() {
                warn!(error = %e, "skipping invalid category");
                continue;
            }
            if let Some(previous) = map.insert(category.id.clone(), category) {
                warn!(id = %previous.id, "duplicate category id, keeping the later entry");
            }
        }

        Self {
            fetched_at,
            source: source.into(),
            categories: map,
        }
    }

    /// Look up a category by identifier
    pub fn lookup(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Find a category by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let name_lower = name.trim().to_lowercase();
        self.sorted()
            .into_iter()
            .find(|c| c.name.to_lowercase() == name_lower)
    }

    /// All categories, ordered by group name, group id, name, then id
    ///
    /// Each group's categories are contiguous even when two groups share a name.
    pub fn sorted(&self) -> Vec<&Category> {
        let mut list: Vec<_> = self.categories.values().collect();
        list.sort_by(|a, b| {
            (
                a.group_name.as_str(),
                a.group_id.as_str(),
                a.name.as_str(),
                a.id.as_str(),
            )
                .cmp(&(
                    b.group_name.as_str(),
                    b.group_id.as_str(),
                    b.name.as_str(),
                    b.id.as_str(),
                ))
        });
        list
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// When the snapshot was fetched from its source
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Name of the source the snapshot came from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Age of the snapshot relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Convert into the persisted form
    pub fn to_file(&self) -> CategoryCacheFile {
        CategoryCacheFile {
            fetched_at: self.fetched_at,
            source: self.source.clone(),
            categories: self.sorted().into_iter().cloned().collect(),
        }
    }

    /// Rebuild from the persisted form
    pub fn from_file(file: CategoryCacheFile) -> Self {
        Self::from_categories(file.categories, file.source, file.fetched_at)
    }
}

/// Repository for the persisted category cache
pub struct CategoryRepository {
    path: PathBuf,
    current: RwLock<Option<Arc<CategoryCache>>>,
}

impl CategoryRepository {
    /// Create a new category repository; nothing is read until `load`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            current: RwLock::new(None),
        }
    }

    /// Path of the persisted cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted cache without any network I/O
    ///
    /// Returns `None` when no cache has been written yet or the file cannot be
    /// parsed. Never fails.
    pub fn load(&self) -> Option<Arc<CategoryCache>> {
        let loaded = read_json_soft::<CategoryCacheFile, _>(&self.path)
            .map(|file| Arc::new(CategoryCache::from_file(file)));

        match &loaded {
            Some(cache) => debug!(
                path = %self.path.display(),
                count = cache.len(),
                "loaded category cache"
            ),
            None => info!(
                path = %self.path.display(),
                "no usable category cache; category checks will be skipped"
            ),
        }

        self.swap(loaded.clone());
        loaded
    }

    /// The current in-memory snapshot, if any
    pub fn snapshot(&self) -> Option<Arc<CategoryCache>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Fetch from `source`, persist atomically, then swap the snapshot in
    ///
    /// A failed fetch or persist leaves both the file and the in-memory
    /// snapshot untouched.
    pub async fn refresh(&self, source: &dyn CategorySource) -> TallyResult<Arc<CategoryCache>> {
        info!(source = source.name(), "refreshing categories");
        let categories = source.fetch_categories().await?;
        self.install(categories, source.name(), Utc::now())
    }

    /// Persist a freshly fetched category list and make it current
    pub fn install(
        &self,
        categories: Vec<Category>,
        source_name: &str,
        fetched_at: DateTime<Utc>,
    ) -> TallyResult<Arc<CategoryCache>> {
        let cache = Arc::new(CategoryCache::from_categories(
            categories,
            source_name,
            fetched_at,
        ));

        write_json_atomic(&self.path, &cache.to_file())?;
        self.swap(Some(Arc::clone(&cache)));

        info!(count = cache.len(), path = %self.path.display(), "category cache updated");
        Ok(cache)
    }

    /// Remove the persisted cache; returns whether a file was removed
    pub fn clear(&self) -> TallyResult<bool> {
        self.swap(None);
        let removed = remove_file_if_exists(&self.path)?;
        if removed {
            info!(path = %self.path.display(), "category cache removed");
        }
        Ok(removed)
    }

    fn swap(&self, next: Option<Arc<CategoryCache>>) {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = next;
    }
}
