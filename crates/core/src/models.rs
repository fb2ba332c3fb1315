//! Data models for frontend breadcrumbs
//!
//! This module defines the resolved view of a request (`ViewContext`), the
//! host records the builder reads from, and the trail the builder produces.

use serde::{Deserialize, Serialize};

/// Identifier of a post, page, attachment or custom post
pub type PostId = u64;

/// Identifier of a taxonomy term
pub type TermId = u64;

/// Identifier of an author
pub type AuthorId = u64;

/// Built-in post types that never get a post type archive crumb
pub const BUILTIN_POST_TYPES: [&str; 3] = ["post", "page", "attachment"];

/// The resolved identity of the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewContext {
    /// A single post, page, attachment or custom post
    Singular {
        post_id: PostId,
        post_type: String,
        /// Immediate parent, `None` for top-level content
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<PostId>,
        /// Categories in the order the host returns them
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        category_ids: Vec<TermId>,
    },

    /// Any archive listing
    Archive(ArchiveKind),

    /// Search results
    Search { query: String },

    /// Nothing matched the request
    NotFound,

    /// Blog home or static front page
    Home,
}

/// Kinds of archive listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "archive", rename_all = "snake_case")]
pub enum ArchiveKind {
    Category { term_id: TermId },
    Tag { term_id: TermId },
    Taxonomy { term_id: TermId },
    Author { author_id: AuthorId },
    Date {
        year: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        month: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day: Option<u32>,
    },
    PostTypeArchive { post_type: String },
}

impl ArchiveKind {
    /// Term shown by a category, tag or taxonomy archive
    pub fn term_id(&self) -> Option<TermId> {
        match self {
            ArchiveKind::Category { term_id }
            | ArchiveKind::Tag { term_id }
            | ArchiveKind::Taxonomy { term_id } => Some(*term_id),
            _ => None,
        }
    }
}

impl ViewContext {
    /// Short label for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            ViewContext::Singular { .. } => "singular",
            ViewContext::Archive(ArchiveKind::Category { .. }) => "category archive",
            ViewContext::Archive(ArchiveKind::Tag { .. }) => "tag archive",
            ViewContext::Archive(ArchiveKind::Taxonomy { .. }) => "taxonomy archive",
            ViewContext::Archive(ArchiveKind::Author { .. }) => "author archive",
            ViewContext::Archive(ArchiveKind::Date { .. }) => "date archive",
            ViewContext::Archive(ArchiveKind::PostTypeArchive { .. }) => "post type archive",
            ViewContext::Search { .. } => "search",
            ViewContext::NotFound => "404",
            ViewContext::Home => "home",
        }
    }

    /// Check if this is the blog home or front page
    pub fn is_home(&self) -> bool {
        matches!(self, ViewContext::Home)
    }
}

/// A view context together with the pagination state of the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub view: ViewContext,

    /// Requested page number (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paged: Option<u32>,
}

impl PageRequest {
    /// Create an unpaginated request
    pub fn new(view: ViewContext) -> Self {
        Self { view, paged: None }
    }

    /// Set page number (builder pattern)
    pub fn with_paged(mut self, page: u32) -> Self {
        self.paged = Some(page);
        self
    }

    /// Page number if the request is past the first page
    pub fn page(&self) -> Option<u32> {
        self.paged.filter(|&p| p > 1)
    }
}

/// One linked crumb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFragment {
    /// Target URL, already validated
    pub href: String,

    /// Plain-text label, escaped at render time
    pub label: String,
}

impl LinkFragment {
    pub fn new(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
        }
    }
}

/// The terminal, unlinked crumb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCrumb {
    /// Text placed before the crumb, outside of the `current` span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    pub label: String,
}

impl CurrentCrumb {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            prefix: None,
            label: label.into(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            label: label.into(),
        }
    }

    /// Prefix and label as plain text
    pub fn display(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, self.label),
            None => self.label.clone(),
        }
    }
}

/// A crumb between the home link and the current crumb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Crumb {
    /// A validated link
    Link(LinkFragment),

    /// A label whose URL failed validation
    Text { label: String },
}

impl Crumb {
    pub fn label(&self) -> &str {
        match self {
            Crumb::Link(link) => &link.label,
            Crumb::Text { label } => label,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Crumb::Link(link) => Some(&link.href),
            Crumb::Text { .. } => None,
        }
    }
}

/// The full breadcrumb trail for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trail {
    /// Link to the site root
    pub home: LinkFragment,

    /// The request is the blog home or front page
    #[serde(default)]
    pub front_page: bool,

    /// Ancestor crumbs, root first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<Crumb>,

    /// Terminal crumb
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentCrumb>,

    /// Page number for paginated listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// An ancestor walk stopped before reaching the root
    #[serde(default)]
    pub truncated: bool,
}

impl Trail {
    /// Check if the breadcrumb is suppressed entirely
    pub fn is_suppressed(&self) -> bool {
        self.front_page && self.page.is_none()
    }

    /// Labels from home to current, in display order
    pub fn labels(&self) -> Vec<String> {
        if self.is_suppressed() {
            return Vec::new();
        }

        let mut labels = vec![self.home.label.clone()];
        labels.extend(self.ancestors.iter().map(|c| c.label().to_string()));
        if let Some(current) = &self.current {
            labels.push(current.display());
        }
        labels
    }

    /// Plain-text path joined with the given separator
    pub fn path(&self, separator: &str) -> String {
        self.labels().join(separator)
    }

    /// Number of crumbs including home
    pub fn depth(&self) -> usize {
        self.labels().len()
    }
}

/// A post, page, attachment or custom post as the host reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    pub title: String,

    #[serde(default = "default_post_type")]
    pub post_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<PostId>,

    pub permalink: String,

    /// Category ids in host order, used when the view carries none
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<TermId>,
}

fn default_post_type() -> String {
    "post".to_string()
}

/// A taxonomy term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub id: TermId,
    pub name: String,
    pub taxonomy: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<TermId>,

    pub link: String,
}

/// A registered taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyRecord {
    pub name: String,
    pub singular_name: String,
}

/// A registered post type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypeRecord {
    pub name: String,
    pub singular_name: String,

    /// Archive URL, `None` when the type has no archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_link: Option<String>,
}

/// An author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub id: AuthorId,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail() -> Trail {
        Trail {
            home: LinkFragment::new("https://example.com/", "Home"),
            front_page: false,
            ancestors: vec![Crumb::Link(LinkFragment::new(
                "https://example.com/news/",
                "News",
            ))],
            current: Some(CurrentCrumb::new("Hello")),
            page: None,
            truncated: false,
        }
    }

    #[test]
    fn test_view_context_from_json() {
        let view: ViewContext = serde_json::from_str(
            r#"{"kind":"singular","post_id":7,"post_type":"post","category_ids":[3,4]}"#,
        )
        .unwrap();

        assert_eq!(
            view,
            ViewContext::Singular {
                post_id: 7,
                post_type: "post".to_string(),
                parent_id: None,
                category_ids: vec![3, 4],
            }
        );
    }

    #[test]
    fn test_archive_from_yaml() {
        let view: ViewContext =
            serde_yaml::from_str("kind: archive\narchive: date\nyear: 2024\nmonth: 3\n").unwrap();

        assert_eq!(
            view,
            ViewContext::Archive(ArchiveKind::Date {
                year: 2024,
                month: Some(3),
                day: None,
            })
        );
        assert_eq!(view.label(), "date archive");
    }

    #[test]
    fn test_page_only_counts_past_first() {
        assert_eq!(PageRequest::new(ViewContext::Home).page(), None);
        assert_eq!(PageRequest::new(ViewContext::Home).with_paged(1).page(), None);
        assert_eq!(PageRequest::new(ViewContext::Home).with_paged(3).page(), Some(3));
    }

    #[test]
    fn test_trail_path() {
        let trail = trail();
        assert_eq!(trail.path(" > "), "Home > News > Hello");
        assert_eq!(trail.depth(), 3);
    }

    #[test]
    fn test_suppressed_trail_has_no_labels() {
        let trail = Trail {
            front_page: true,
            ancestors: Vec::new(),
            current: None,
            ..trail()
        };
        assert!(trail.is_suppressed());
        assert!(trail.labels().is_empty());
    }
}
