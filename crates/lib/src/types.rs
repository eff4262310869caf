use crate::{
    constants::{AUTHOR_SLUG_MAX_LEN, SHORT_TITLE_MAX_LEN, UNTITLED_SLUG},
    ingest::identifier::extract_document_id,
    slug::{slugify, truncate_chars},
};
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Imported Documents ---

/// The identifier of a Google Doc, as found in its sharing URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A date from a document's metadata block.
///
/// When the text does not parse as `month/day/two-digit-year` it is kept verbatim so
/// the caller can decide what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DateValue {
    Date(NaiveDate),
    Raw(String),
}

impl DateValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Date(date) => Some(*date),
            DateValue::Raw(_) => None,
        }
    }
}

/// Fields read from the labeled lines at the top of an exported document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedMetadata {
    pub title: Option<String>,
    pub writer: Option<String>,
    pub date: Option<DateValue>,
    pub issue_number: Option<u32>,
    pub article_type: Option<String>,
    /// Non-fatal problems met while parsing, such as an unreadable date.
    pub warnings: Vec<String>,
}

impl ParsedMetadata {
    /// True when no labeled line matched.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.writer.is_none()
            && self.date.is_none()
            && self.issue_number.is_none()
            && self.article_type.is_none()
    }
}

// --- Articles ---

/// The section an article is published under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArticleType {
    #[serde(rename = "op-ed")]
    OpEd,
    #[default]
    #[serde(rename = "news")]
    News,
    #[serde(rename = "features")]
    Features,
    #[serde(rename = "other")]
    Other,
}

impl ArticleType {
    pub const ALL: [ArticleType; 4] = [
        ArticleType::OpEd,
        ArticleType::News,
        ArticleType::Features,
        ArticleType::Other,
    ];

    /// The value stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            ArticleType::OpEd => "op-ed",
            ArticleType::News => "news",
            ArticleType::Features => "features",
            ArticleType::Other => "other",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ArticleType::OpEd => "Op-Ed",
            ArticleType::News => "News",
            ArticleType::Features => "Features",
            ArticleType::Other => "Other",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Matches a free-text label such as `"Op-Ed"`, `"feature"` or `"NEWS"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "op-ed" | "oped" | "op ed" | "op-eds" => Some(ArticleType::OpEd),
            "news" => Some(ArticleType::News),
            "features" | "feature" => Some(ArticleType::Features),
            "other" => Some(ArticleType::Other),
            _ => None,
        }
    }
}

/// An article as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub writer: String,
    pub date: Option<NaiveDate>,
    pub volume_number: u32,
    pub issue_number: u32,
    pub short_title: String,
    pub preview_text: String,
    pub article_type: ArticleType,
    pub doc_url: String,
    pub doc_id: Option<DocumentId>,
    pub content_html: String,
    pub is_current_issue: bool,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Builds an unsaved article (id 0) from admin input.
    pub fn from_draft(draft: ArticleDraft) -> Self {
        let now = Utc::now().trunc_subsecs(6);
        let mut article = Self {
            id: 0,
            title: String::new(),
            writer: String::new(),
            date: None,
            volume_number: 1,
            issue_number: 1,
            short_title: String::new(),
            preview_text: String::new(),
            article_type: ArticleType::default(),
            doc_url: String::new(),
            doc_id: None,
            content_html: String::new(),
            is_current_issue: false,
            display_order: 0,
            created_at: now,
            updated_at: now,
        };
        article.apply_draft(draft);
        article
    }

    /// Overwrites the editable fields with admin input. Imported content is kept.
    pub fn apply_draft(&mut self, draft: ArticleDraft) {
        self.title = draft.title;
        self.writer = draft.writer;
        self.date = draft.date;
        self.volume_number = draft.volume_number;
        self.issue_number = draft.issue_number;
        self.short_title = draft.short_title;
        self.preview_text = draft.preview_text;
        self.article_type = draft.article_type;
        self.doc_url = draft.doc_url;
        self.doc_id = draft
            .doc_id
            .filter(|id| !id.trim().is_empty())
            .map(DocumentId::new);
        self.is_current_issue = draft.is_current_issue;
        self.display_order = draft.display_order;
    }

    /// Fills in derived fields. Called by the store before every write.
    ///
    /// - `doc_id` is extracted from `doc_url` unless one is already set.
    /// - `short_title` is never left empty: it falls back to the slugified title, or
    ///   to `untitled`. A placeholder slug is replaced once the article has a title.
    pub fn prepare_for_save(&mut self) {
        if self.doc_id.is_none() && !self.doc_url.trim().is_empty() {
            self.doc_id = extract_document_id(&self.doc_url);
        }

        self.short_title = self.short_title.trim().to_string();
        let title_slug = truncate_chars(&slugify(&self.title), SHORT_TITLE_MAX_LEN);
        if self.short_title.is_empty()
            || (self.short_title == UNTITLED_SLUG && !title_slug.is_empty())
        {
            self.short_title = if title_slug.is_empty() {
                UNTITLED_SLUG.to_string()
            } else {
                title_slug
            };
        }
    }

    /// The canonical public path, `/{volume}/{issue}/{short_title}/`.
    pub fn public_path(&self) -> String {
        format!(
            "/{}/{}/{}/",
            self.volume_number, self.issue_number, self.short_title
        )
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.title.trim().is_empty() {
            "Untitled"
        } else {
            self.title.as_str()
        };
        write!(
            f,
            "{title} (Vol {}, Issue {})",
            self.volume_number, self.issue_number
        )
    }
}

fn default_one() -> u32 {
    1
}

/// Admin input for creating or editing an article.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub writer: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default = "default_one")]
    pub volume_number: u32,
    #[serde(default = "default_one")]
    pub issue_number: u32,
    #[serde(default)]
    pub short_title: String,
    #[serde(default)]
    pub preview_text: String,
    #[serde(default)]
    pub article_type: ArticleType,
    #[serde(default)]
    pub doc_url: String,
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub is_current_issue: bool,
    #[serde(default)]
    pub display_order: i64,
}

impl Default for ArticleDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            writer: String::new(),
            date: None,
            volume_number: 1,
            issue_number: 1,
            short_title: String::new(),
            preview_text: String::new(),
            article_type: ArticleType::default(),
            doc_url: String::new(),
            doc_id: None,
            is_current_issue: false,
            display_order: 0,
        }
    }
}

/// Admin list filters. Empty fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleFilter {
    /// Case-insensitive substring matched against title, writer and short title.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub article_type: Option<ArticleType>,
    #[serde(default)]
    pub is_current_issue: Option<bool>,
}

// --- Authors ---

/// A staff role shown on the about page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorRole {
    #[serde(rename = "director")]
    Director,
    #[serde(rename = "lead editor")]
    LeadEditor,
    #[serde(rename = "lead publisher")]
    LeadPublisher,
    #[serde(rename = "treasurer")]
    Treasurer,
    #[serde(rename = "social chair")]
    SocialChair,
    #[serde(rename = "writer")]
    Writer,
    #[default]
    #[serde(rename = "contributor")]
    Contributor,
}

impl AuthorRole {
    pub const ALL: [AuthorRole; 7] = [
        AuthorRole::Director,
        AuthorRole::LeadEditor,
        AuthorRole::LeadPublisher,
        AuthorRole::Treasurer,
        AuthorRole::SocialChair,
        AuthorRole::Writer,
        AuthorRole::Contributor,
    ];

    pub fn code(self) -> &'static str {
        match self {
            AuthorRole::Director => "director",
            AuthorRole::LeadEditor => "lead editor",
            AuthorRole::LeadPublisher => "lead publisher",
            AuthorRole::Treasurer => "treasurer",
            AuthorRole::SocialChair => "social chair",
            AuthorRole::Writer => "writer",
            AuthorRole::Contributor => "contributor",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AuthorRole::Director => "Director",
            AuthorRole::LeadEditor => "Lead Editor",
            AuthorRole::LeadPublisher => "Lead Publisher",
            AuthorRole::Treasurer => "Treasurer",
            AuthorRole::SocialChair => "Social Chair",
            AuthorRole::Writer => "Writer",
            AuthorRole::Contributor => "Contributor",
        }
    }

    /// Accepts either the stored code or the display name, in any case.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|role| {
            role.code().eq_ignore_ascii_case(code) || role.display_name().eq_ignore_ascii_case(code)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub role: AuthorRole,
    pub bio: String,
}

impl Author {
    /// Derives the slug from the name when none was given.
    pub fn prepare_for_save(&mut self) {
        self.slug = self.slug.trim().to_string();
        if self.slug.is_empty() {
            self.slug = truncate_chars(&slugify(&self.name), AUTHOR_SLUG_MAX_LEN);
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorDraft {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub role: AuthorRole,
    #[serde(default)]
    pub bio: String,
}

/// An author with the number of articles credited to them.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    #[serde(flatten)]
    pub author: Author,
    pub article_count: i64,
}
