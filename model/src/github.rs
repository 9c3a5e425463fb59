use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ParseError;

// GraphQL 响应外层结构
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLResponse {
    pub data: Option<SearchData>,
    #[serde(default)]
    pub errors: Option<Vec<GitHubError>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    pub search: SearchResult,
}

/// One page of search results. Nodes are kept as raw JSON so that a single
/// malformed repository does not discard the whole page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
pub struct GitHubError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub type_: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name: String,
    pub owner: Owner,
    pub stargazer_count: i64,
    pub created_at: String,
    pub updated_at: String,
    pub primary_language: Option<Language>,
    pub issues: Count,
    pub closed_issues: Count,
    pub pull_requests: Count,
    pub releases: Count,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Count {
    pub total_count: i64,
}

/// A repository as reported by the search API, before any metric is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRepository {
    pub owner: String,
    pub name: String,
    pub stars: i64,
    pub created_at: String,
    pub updated_at: String,
    pub primary_language: Option<String>,
    pub total_issues: i64,
    pub closed_issues: i64,
    pub merged_pull_requests: i64,
    pub releases: i64,
}

impl RawRepository {
    /// Decodes one search node. Nodes that are not repositories (or are
    /// missing fields) fail here.
    pub fn from_node(node: Value) -> Result<Self, ParseError> {
        let node: RepositoryNode = serde_json::from_value(node)?;
        Ok(node.into())
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl From<RepositoryNode> for RawRepository {
    fn from(node: RepositoryNode) -> Self {
        Self {
            owner: node.owner.login,
            name: node.name,
            stars: node.stargazer_count,
            created_at: node.created_at,
            updated_at: node.updated_at,
            primary_language: node.primary_language.map(|l| l.name),
            total_issues: node.issues.total_count,
            closed_issues: node.closed_issues.total_count,
            merged_pull_requests: node.pull_requests.total_count,
            releases: node.releases.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_flattens_counts() {
        let node = json!({
            "name": "rust",
            "owner": {"login": "rust-lang"},
            "stargazerCount": 100000,
            "createdAt": "2010-06-16T20:39:03Z",
            "updatedAt": "2024-05-01T00:00:00Z",
            "primaryLanguage": {"name": "Rust"},
            "issues": {"totalCount": 50},
            "closedIssues": {"totalCount": 40},
            "pullRequests": {"totalCount": 900},
            "releases": {"totalCount": 12}
        });
        let raw = RawRepository::from_node(node).unwrap();
        assert_eq!(raw.full_name(), "rust-lang/rust");
        assert_eq!(raw.primary_language.as_deref(), Some("Rust"));
        assert_eq!(raw.total_issues, 50);
        assert_eq!(raw.closed_issues, 40);
        assert_eq!(raw.merged_pull_requests, 900);
        assert_eq!(raw.releases, 12);
    }

    #[test]
    fn test_null_language_and_empty_node() {
        let node = json!({
            "name": "awesome",
            "owner": {"login": "someone"},
            "stargazerCount": 10,
            "createdAt": "2020-01-01T00:00:00Z",
            "updatedAt": "2020-01-02T00:00:00Z",
            "primaryLanguage": null,
            "issues": {"totalCount": 0},
            "closedIssues": {"totalCount": 0},
            "pullRequests": {"totalCount": 0},
            "releases": {"totalCount": 0}
        });
        assert!(RawRepository::from_node(node).unwrap().primary_language.is_none());
        assert!(matches!(
            RawRepository::from_node(json!({})),
            Err(ParseError::Node(_))
        ));
    }

    #[test]
    fn test_response_with_errors_only() {
        let body = r#"{"data": null, "errors": [{"message": "timeout", "type": "TIMEOUT"}]}"#;
        let resp: GraphQLResponse = serde_json::from_str(body).unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.errors.unwrap()[0].message, "timeout");
    }
}
