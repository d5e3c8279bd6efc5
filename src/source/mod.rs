//! Category sources
//!
//! A [`CategorySource`] returns the full current set of categories. The
//! repository's refresh is the only caller; the validator never talks to a
//! source directly.

pub mod file;
pub mod graphql;

pub use file::JsonFileCategorySource;
pub use graphql::GraphqlCategorySource;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{TallyError, TallyResult};
use crate::models::{Category, GroupType};

/// Something that can produce the complete category taxonomy
#[async_trait]
pub trait CategorySource: Send + Sync {
    /// Short name used in logs, errors and the cache file
    fn name(&self) -> &str;

    /// Fetch every category. Takes no arguments by contract.
    async fn fetch_categories(&self) -> TallyResult<Vec<Category>>;
}

/// A category as the upstream GraphQL API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub group: GroupNode,
}

/// The group embedded in a [`CategoryNode`]
#[derive(Debug, Clone, Deserialize)]
pub struct GroupNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: String,
}

impl CategoryNode {
    /// Convert to a [`Category`]; unknown group types are rejected
    pub fn into_category(self, source_name: &str) -> TallyResult<Category> {
        let group_type = GroupType::parse(&self.group.group_type).ok_or_else(|| {
            TallyError::source_failed(
                source_name,
                format!(
                    "unknown group type '{}' for category {}",
                    self.group.group_type, self.id
                ),
            )
        })?;

        Ok(Category::new(
            self.id,
            self.name,
            self.group.id,
            self.group.name,
            group_type,
        ))
    }
}

/// Convert a list of nodes, failing on the first unknown group type
pub fn nodes_into_categories(
    nodes: Vec<CategoryNode>,
    source_name: &str,
) -> TallyResult<Vec<Category>> {
    nodes
        .into_iter()
        .map(|node| node.into_category(source_name))
        .collect()
}
