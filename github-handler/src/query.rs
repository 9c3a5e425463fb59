use serde_json::{json, Value};

/// Most-starred repositories, one page per request. `$first` and `$after`
/// drive the pagination.
pub const SEARCH_REPOSITORIES: &str = r#"
query SearchRepositories($first: Int!, $after: String) {
  search(query: "stars:>0 sort:stars-desc", type: REPOSITORY, first: $first, after: $after) {
    pageInfo {
      hasNextPage
      endCursor
    }
    nodes {
      ... on Repository {
        name
        owner {
          login
        }
        stargazerCount
        createdAt
        updatedAt
        primaryLanguage {
          name
        }
        issues {
          totalCount
        }
        closedIssues: issues(states: CLOSED) {
          totalCount
        }
        pullRequests(states: MERGED) {
          totalCount
        }
        releases {
          totalCount
        }
      }
    }
  }
}
"#;

pub fn variables(first: usize, after: Option<&str>) -> Value {
    json!({
        "first": first,
        "after": after,
    })
}
