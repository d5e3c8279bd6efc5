//! JSON file category source
//!
//! Reads categories from an exported file. Accepts a bare array of
//! categories, a bare array of GraphQL category nodes, a persisted cache file,
//! or a raw GraphQL response body.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use super::graphql::{CategoriesData, GraphqlResponse};
use super::{nodes_into_categories, CategoryNode, CategorySource};
use crate::error::{TallyError, TallyResult};
use crate::models::Category;
use crate::storage::CategoryCacheFile;

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryExport {
    Cache(CategoryCacheFile),
    Plain(Vec<Category>),
    Nodes(Vec<CategoryNode>),
    Graphql(GraphqlResponse<CategoriesData>),
}

/// Category source reading an exported JSON file
pub struct JsonFileCategorySource {
    path: PathBuf,
    name: String,
}

impl JsonFileCategorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }
}

#[async_trait]
impl CategorySource for JsonFileCategorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_categories(&self) -> TallyResult<Vec<Category>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| TallyError::source_failed(&self.name, e))?;

        let export: CategoryExport = serde_json::from_str(&text).map_err(|_| {
            TallyError::source_failed(&self.name, "file is not a recognized category export")
        })?;

        match export {
            CategoryExport::Cache(file) => Ok(file.categories),
            CategoryExport::Plain(categories) => Ok(categories),
            CategoryExport::Nodes(nodes) => nodes_into_categories(nodes, &self.name),
            CategoryExport::Graphql(response) => match response.data {
                Some(data) => nodes_into_categories(data.categories, &self.name),
                None => Err(TallyError::source_failed(&self.name, "export has no data")),
            },
        }
    }
}
