//! Category service
//!
//! Read-only queries over a category cache snapshot: grouped listing, lookup
//! by id or name, and finding an unrestricted stand-in for a category the
//! upstream API refuses.

use crate::error::{TallyError, TallyResult};
use crate::models::{Category, CategoryGroupId, GroupType};
use crate::storage::CategoryCache;

/// Service for category queries
pub struct CategoryService<'a> {
    cache: &'a CategoryCache,
}

/// A category group with its categories
#[derive(Debug, Clone)]
pub struct CategoryGroupWithCategories {
    pub group_id: CategoryGroupId,
    pub group_name: String,
    pub group_type: GroupType,
    pub categories: Vec<Category>,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(cache: &'a CategoryCache) -> Self {
        Self { cache }
    }

    /// All categories grouped by group, groups and categories sorted by name
    pub fn list_groups(&self) -> Vec<CategoryGroupWithCategories> {
        let mut groups: Vec<CategoryGroupWithCategories> = Vec::new();

        // sorted() orders by group name then group id, so groups arrive contiguously
        for category in self.cache.sorted() {
            match groups.last_mut() {
                Some(last) if last.group_id == category.group_id => {
                    last.categories.push(category.clone());
                }
                _ => groups.push(CategoryGroupWithCategories {
                    group_id: category.group_id.clone(),
                    group_name: category.group_name.clone(),
                    group_type: category.group_type,
                    categories: vec![category.clone()],
                }),
            }
        }

        groups
    }

    /// Groups whose name matches `name` (case-insensitive)
    pub fn list_group(&self, name: &str) -> Vec<CategoryGroupWithCategories> {
        let name_lower = name.trim().to_lowercase();
        self.list_groups()
            .into_iter()
            .filter(|g| g.group_name.to_lowercase() == name_lower)
            .collect()
    }

    /// Find a category by ID or name
    pub fn find(&self, identifier: &str) -> Option<&'a Category> {
        let identifier = identifier.trim();
        self.cache
            .lookup(identifier)
            .or_else(|| self.cache.find_by_name(identifier))
    }

    /// Get a category by ID or name, or a not-found error
    pub fn get(&self, identifier: &str) -> TallyResult<&'a Category> {
        self.find(identifier)
            .ok_or_else(|| TallyError::category_not_found(identifier))
    }

    /// Suggest an unrestricted replacement for `category`
    pub fn suggest_alternative(
        &self,
        category: &Category,
        restricted: &[GroupType],
    ) -> Option<&'a Category> {
        suggest_alternative(self.cache, category, restricted)
    }
}

/// Find an unrestricted category that can stand in for `category`
///
/// Prefers an exact (case-insensitive) name match, then a category whose name
/// contains the other's. Ties go to the first in sorted order.
pub fn suggest_alternative<'c>(
    cache: &'c CategoryCache,
    category: &Category,
    restricted: &[GroupType],
) -> Option<&'c Category> {
    let name = category.name.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }

    let candidates: Vec<&Category> = cache
        .sorted()
        .into_iter()
        .filter(|c| c.id != category.id && !c.has_group_type_in(restricted))
        .collect();

    candidates
        .iter()
        .find(|c| c.name.to_lowercase() == name)
        .or_else(|| {
            candidates.iter().find(|c| {
                let other = c.name.to_lowercase();
                other.contains(&name) || name.contains(&other)
            })
        })
        .copied()
}
