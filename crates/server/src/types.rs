use newsletter::{Article, Author};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

// --- Request Payloads ---

/// A list of article ids, used by the import and issue-status endpoints.
#[derive(Debug, Deserialize)]
pub struct ArticleIdsRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorIdsRequest {
    pub author_ids: Vec<i64>,
}

/// Raw query parameters of the admin article list. Empty values mean "no filter".
#[derive(Debug, Deserialize, Default)]
pub struct ArticleListQuery {
    pub q: Option<String>,
    pub article_type: Option<String>,
    pub is_current_issue: Option<String>,
}

// --- Response Payloads ---

/// An article together with the authors credited on it.
#[derive(Debug, Serialize)]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: Article,
    pub path: String,
    pub authors: Vec<Author>,
}

#[derive(Debug, Serialize)]
pub struct AuthorPage {
    pub author: Author,
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatedCount {
    pub updated: u64,
}
