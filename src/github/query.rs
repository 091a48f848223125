//! Search document and the slice of the response schema we read

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::RepositoryRecord;

/// Built-in repository search.
///
/// Variables: `$searchQuery` (GitHub search syntax), `$pageSize`, `$cursor`.
pub const DEFAULT_QUERY: &str = r#"query ($searchQuery: String!, $pageSize: Int!, $cursor: String) {
  search(query: $searchQuery, type: REPOSITORY, first: $pageSize, after: $cursor) {
    repositoryCount
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        ... on Repository {
          name
          owner { login }
          url
          stargazerCount
          createdAt
          pushedAt
          defaultBranchRef { name }
          releases { totalCount }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConnection {
    #[serde(default)]
    pub edges: Vec<SearchEdge>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SearchEdge {
    pub node: RepositoryNode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name: String,
    pub owner: Owner,
    pub url: String,
    pub stargazer_count: u64,
    pub created_at: DateTime<Utc>,
    pub pushed_at: DateTime<Utc>,
    pub default_branch_ref: Option<BranchRef>,
    pub releases: Option<Releases>,
}

#[derive(Debug, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct BranchRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Releases {
    pub total_count: u64,
}

impl From<RepositoryNode> for RepositoryRecord {
    fn from(node: RepositoryNode) -> Self {
        RepositoryRecord {
            name: node.name,
            owner: node.owner.login,
            url: node.url,
            stars: node.stargazer_count,
            created_at: node.created_at,
            pushed_at: node.pushed_at,
            default_branch: node.default_branch_ref.map(|b| b.name),
            releases: node.releases.map_or(0, |r| r.total_count),
        }
    }
}
