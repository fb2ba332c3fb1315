//! Site lookups
//!
//! The builder never owns content. Everything it needs about posts, terms,
//! taxonomies, post types and authors comes through [`SiteQuery`], which the
//! host implements over its own storage. [`SiteIndex`] is an in-memory
//! implementation loaded from a YAML or JSON site description.

use crate::models::{
    AuthorId, AuthorRecord, PostId, PostRecord, PostTypeRecord, TaxonomyRecord, TermId,
    TermRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Site loading errors
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: u64 },
}

/// Read-only lookups the builder performs against the host
pub trait SiteQuery: Send + Sync {
    /// Root URL of the site
    fn home_url(&self) -> &Url;

    fn post(&self, id: PostId) -> Option<&PostRecord>;

    fn term(&self, id: TermId) -> Option<&TermRecord>;

    fn taxonomy(&self, name: &str) -> Option<&TaxonomyRecord>;

    fn post_type(&self, name: &str) -> Option<&PostTypeRecord>;

    fn author(&self, id: AuthorId) -> Option<&AuthorRecord>;

    /// Year archive URL
    fn year_link(&self, year: i32) -> String {
        format!("{}{}/", self.home_url(), year)
    }

    /// Month archive URL
    fn month_link(&self, year: i32, month: u32) -> String {
        format!("{}{}/{:02}/", self.home_url(), year, month)
    }
}

/// In-memory site description
///
/// Records are kept private so the lookup tables always match them. The
/// tables are built on deserialization and kept current by the builders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSite", into = "RawSite")]
pub struct SiteIndex {
    home_url: Url,
    posts: Vec<PostRecord>,
    terms: Vec<TermRecord>,
    taxonomies: Vec<TaxonomyRecord>,
    post_types: Vec<PostTypeRecord>,
    authors: Vec<AuthorRecord>,
    index: Lookup,
}

/// Serialized form of [`SiteIndex`]
#[derive(Debug, Serialize, Deserialize)]
struct RawSite {
    home_url: Url,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    posts: Vec<PostRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    terms: Vec<TermRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    taxonomies: Vec<TaxonomyRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    post_types: Vec<PostTypeRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    authors: Vec<AuthorRecord>,
}

/// Positions of records by key
#[derive(Debug, Clone, Default)]
struct Lookup {
    posts: HashMap<PostId, usize>,
    terms: HashMap<TermId, usize>,
    taxonomies: HashMap<String, usize>,
    post_types: HashMap<String, usize>,
    authors: HashMap<AuthorId, usize>,
}

/// Insert `record` under `key`, replacing any record already stored there
fn upsert<K, T>(records: &mut Vec<T>, index: &mut HashMap<K, usize>, key: K, record: T)
where
    K: std::hash::Hash + Eq,
{
    match index.get(&key) {
        Some(&pos) => records[pos] = record,
        None => {
            index.insert(key, records.len());
            records.push(record);
        }
    }
}

impl TryFrom<RawSite> for SiteIndex {
    type Error = SiteError;

    /// Build the lookup tables, rejecting duplicate post, term and author ids
    fn try_from(raw: RawSite) -> Result<Self, SiteError> {
        let mut index = Lookup::default();

        for (pos, post) in raw.posts.iter().enumerate() {
            if index.posts.insert(post.id, pos).is_some() {
                return Err(SiteError::DuplicateId { kind: "post", id: post.id });
            }
        }
        for (pos, term) in raw.terms.iter().enumerate() {
            if index.terms.insert(term.id, pos).is_some() {
                return Err(SiteError::DuplicateId { kind: "term", id: term.id });
            }
        }
        for (pos, author) in raw.authors.iter().enumerate() {
            if index.authors.insert(author.id, pos).is_some() {
                return Err(SiteError::DuplicateId { kind: "author", id: author.id });
            }
        }
        // Later registrations win, as re-registering a type does on the host
        for (pos, taxonomy) in raw.taxonomies.iter().enumerate() {
            index.taxonomies.insert(taxonomy.name.clone(), pos);
        }
        for (pos, post_type) in raw.post_types.iter().enumerate() {
            index.post_types.insert(post_type.name.clone(), pos);
        }

        Ok(Self {
            home_url: raw.home_url,
            posts: raw.posts,
            terms: raw.terms,
            taxonomies: raw.taxonomies,
            post_types: raw.post_types,
            authors: raw.authors,
            index,
        })
    }
}

impl From<SiteIndex> for RawSite {
    fn from(site: SiteIndex) -> Self {
        Self {
            home_url: site.home_url,
            posts: site.posts,
            terms: site.terms,
            taxonomies: site.taxonomies,
            post_types: site.post_types,
            authors: site.authors,
        }
    }
}

impl SiteIndex {
    /// Create an empty site rooted at `home_url`
    pub fn new(home_url: Url) -> Self {
        Self {
            home_url,
            posts: Vec::new(),
            terms: Vec::new(),
            taxonomies: Vec::new(),
            post_types: Vec::new(),
            authors: Vec::new(),
            index: Lookup::default(),
        }
    }

    /// Add a post, replacing any post with the same id (builder pattern)
    pub fn with_post(mut self, post: PostRecord) -> Self {
        upsert(&mut self.posts, &mut self.index.posts, post.id, post);
        self
    }

    /// Add a term, replacing any term with the same id (builder pattern)
    pub fn with_term(mut self, term: TermRecord) -> Self {
        upsert(&mut self.terms, &mut self.index.terms, term.id, term);
        self
    }

    /// Register a taxonomy (builder pattern)
    pub fn with_taxonomy(mut self, taxonomy: TaxonomyRecord) -> Self {
        let key = taxonomy.name.clone();
        upsert(&mut self.taxonomies, &mut self.index.taxonomies, key, taxonomy);
        self
    }

    /// Register a post type (builder pattern)
    pub fn with_post_type(mut self, post_type: PostTypeRecord) -> Self {
        let key = post_type.name.clone();
        upsert(&mut self.post_types, &mut self.index.post_types, key, post_type);
        self
    }

    /// Add an author, replacing any author with the same id (builder pattern)
    pub fn with_author(mut self, author: AuthorRecord) -> Self {
        upsert(&mut self.authors, &mut self.index.authors, author.id, author);
        self
    }

    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    pub fn terms(&self) -> &[TermRecord] {
        &self.terms
    }

    pub fn taxonomies(&self) -> &[TaxonomyRecord] {
        &self.taxonomies
    }

    pub fn post_types(&self) -> &[PostTypeRecord] {
        &self.post_types
    }

    pub fn authors(&self) -> &[AuthorRecord] {
        &self.authors
    }

    /// Parse a JSON site description
    pub fn from_json_str(source: &str) -> Result<Self, SiteError> {
        let raw: RawSite = serde_json::from_str(source)?;
        Self::try_from(raw)
    }

    /// Parse a YAML site description
    pub fn from_yaml_str(source: &str) -> Result<Self, SiteError> {
        let raw: RawSite = serde_yaml::from_str(source)?;
        Self::try_from(raw)
    }

    /// Load a site description, choosing the parser by file extension
    pub fn load(path: &Path) -> Result<Self, SiteError> {
        let source = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }
}

impl SiteQuery for SiteIndex {
    fn home_url(&self) -> &Url {
        &self.home_url
    }

    fn post(&self, id: PostId) -> Option<&PostRecord> {
        self.index.posts.get(&id).and_then(|&pos| self.posts.get(pos))
    }

    fn term(&self, id: TermId) -> Option<&TermRecord> {
        self.index.terms.get(&id).and_then(|&pos| self.terms.get(pos))
    }

    fn taxonomy(&self, name: &str) -> Option<&TaxonomyRecord> {
        self.index
            .taxonomies
            .get(name)
            .and_then(|&pos| self.taxonomies.get(pos))
    }

    fn post_type(&self, name: &str) -> Option<&PostTypeRecord> {
        self.index
            .post_types
            .get(name)
            .and_then(|&pos| self.post_types.get(pos))
    }

    fn author(&self, id: AuthorId) -> Option<&AuthorRecord> {
        self.index.authors.get(&id).and_then(|&pos| self.authors.get(pos))
    }
}
