//! GraphQL category source
//!
//! Fetches the category taxonomy from the finance API's GraphQL endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{nodes_into_categories, CategoryNode, CategorySource};
use crate::error::{TallyError, TallyResult};
use crate::models::Category;

const SOURCE_NAME: &str = "graphql";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CATEGORIES_QUERY: &str = "query GetCategories {
  categories {
    id
    name
    group {
      id
      name
      type
    }
  }
}";

/// Generic GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// `data` payload of the categories query
#[derive(Debug, Deserialize)]
pub struct CategoriesData {
    pub categories: Vec<CategoryNode>,
}

/// Category source backed by the upstream GraphQL API
pub struct GraphqlCategorySource {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl GraphqlCategorySource {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> TallyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TallyError::source_failed(SOURCE_NAME, e))?;

        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        })
    }
}

#[async_trait]
impl CategorySource for GraphqlCategorySource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_categories(&self) -> TallyResult<Vec<Category>> {
        let body = serde_json::json!({
            "operationName": "GetCategories",
            "query": CATEGORIES_QUERY,
            "variables": {},
        });

        debug!(endpoint = %self.endpoint, "requesting categories");

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Token {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| TallyError::source_failed(SOURCE_NAME, e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TallyError::source_failed(SOURCE_NAME, e))?;

        if !status.is_success() {
            return Err(TallyError::source_failed(
                SOURCE_NAME,
                format!("HTTP {}: {}", status, text.trim()),
            ));
        }

        parse_categories_response(&text)
    }
}

/// Parse a categories query response body
pub fn parse_categories_response(body: &str) -> TallyResult<Vec<Category>> {
    let response: GraphqlResponse<CategoriesData> = serde_json::from_str(body)
        .map_err(|e| TallyError::source_failed(SOURCE_NAME, format!("invalid response: {}", e)))?;

    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(TallyError::source_failed(
            SOURCE_NAME,
            format!("GraphQL error: {}", messages.join("; ")),
        ));
    }

    let data = response
        .data
        .ok_or_else(|| TallyError::source_failed(SOURCE_NAME, "response has no data"))?;

    debug!(count = data.categories.len(), "received categories");
    nodes_into_categories(data.categories, SOURCE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupType;

    #[test]
    fn test_parse_success() {
        let body = r#"{
            "data": {
                "categories": [
                    {"id": "1", "name": "Groceries", "group": {"id": "g1", "name": "Food", "type": "expense"}},
                    {"id": "2", "name": "Paycheck", "group": {"id": "g2", "name": "Income", "type": "income"}}
                ]
            }
        }"#;

        let categories = parse_categories_response(body).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1].group_type, GroupType::Income);
    }

    #[test]
    fn test_parse_graphql_errors() {
        let body = r#"{"data": null, "errors": [{"message": "Unauthorized"}, {"message": "Try again"}]}"#;
        let err = parse_categories_response(body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not fetch categories from graphql: GraphQL error: Unauthorized; Try again"
        );
    }

    #[test]
    fn test_parse_missing_data() {
        let err = parse_categories_response(r#"{"data": null}"#).unwrap_err();
        assert!(err.to_string().contains("response has no data"));
    }

    #[test]
    fn test_parse_invalid_body() {
        let err = parse_categories_response("<html>502</html>").unwrap_err();
        assert!(err.to_string().contains("invalid response"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_source_error() {
        // Port 9 (discard) on localhost is not expected to speak HTTP
        let source = GraphqlCategorySource::new("http://127.0.0.1:9/graphql", "token").unwrap();
        let err = source.fetch_categories().await.unwrap_err();
        assert!(matches!(err, TallyError::Source { .. }));
    }
}
