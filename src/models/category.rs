//! Category model
//!
//! Categories are taxonomy leaves fetched from the upstream finance API. Each
//! category belongs to a group, and the group's type decides whether the
//! upstream API accepts the category for split allocations.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryGroupId, CategoryId};

/// Type tag carried by a category group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Income,
    Expense,
    Transfer,
    Personal,
    Business,
}

impl GroupType {
    /// Get all group types in display order
    pub fn all() -> &'static [Self] {
        &[
            Self::Income,
            Self::Expense,
            Self::Transfer,
            Self::Personal,
            Self::Business,
        ]
    }

    /// Wire name of this group type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
            Self::Personal => "personal",
            Self::Business => "business",
        }
    }

    /// Parse a wire name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category as known to the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Upstream identifier
    pub id: CategoryId,

    /// Category name
    pub name: String,

    /// The group this category belongs to
    pub group_id: CategoryGroupId,

    /// Group display name
    #[serde(default)]
    pub group_name: String,

    /// Group type tag
    pub group_type: GroupType,
}

impl Category {
    /// Create a new category
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        group_id: impl Into<CategoryGroupId>,
        group_name: impl Into<String>,
        group_type: GroupType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group_id: group_id.into(),
            group_name: group_name.into(),
            group_type,
        }
    }

    /// Check whether this category's group type is in the given set
    pub fn has_group_type_in(&self, types: &[GroupType]) -> bool {
        types.contains(&self.group_type)
    }

    /// Validate a category received from a source
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(CategoryValidationError::EmptyId);
        }

        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName(self.id.to_string()));
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyId,
    EmptyName(String),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Category id cannot be empty"),
            Self::EmptyName(id) => write!(f, "Category {} has an empty name", id),
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn groceries() -> Category {
        Category::new("cat_1", "Groceries", "grp_1", "Food & Dining", GroupType::Expense)
    }

    #[test]
    fn test_new_category() {
        let category = groceries();
        assert_eq!(category.id.as_str(), "cat_1");
        assert_eq!(category.group_id.as_str(), "grp_1");
        assert_eq!(category.to_string(), "Groceries");
    }

    #[test]
    fn test_group_type_membership() {
        let category = groceries();
        assert!(!category.has_group_type_in(&[GroupType::Business]));
        assert!(category.has_group_type_in(&[GroupType::Business, GroupType::Expense]));
    }

    #[test]
    fn test_group_type_parse() {
        assert_eq!(GroupType::parse("Business"), Some(GroupType::Business));
        assert_eq!(GroupType::parse(" income "), Some(GroupType::Income));
        assert_eq!(GroupType::parse("other"), None);
    }

    #[test]
    fn test_category_validation() {
        let mut category = groceries();
        assert!(category.validate().is_ok());

        category.name = "  ".into();
        assert_eq!(
            category.validate(),
            Err(CategoryValidationError::EmptyName("cat_1".into()))
        );

        category.id = CategoryId::new("");
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptyId));
    }

    #[test]
    fn test_serialization() {
        let category = groceries();
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["group_type"], "expense");

        let deserialized: Category = serde_json::from_value(json).unwrap();
        assert_eq!(category, deserialized);
    }
}
