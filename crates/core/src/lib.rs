//! frontend_breadcrumb_core - Core library for frontend breadcrumb trails
//!
//! This crate turns the resolved view of a request (a single post, an
//! archive, search results, a 404 or the home page) into a breadcrumb trail
//! and renders it as an HTML fragment for insertion into a page template.
//!
//! # Features
//!
//! - **Explicit view context**: the host resolves the request once into a
//!   [`ViewContext`]; the builder matches it exhaustively.
//! - **Ancestor walks**: post parents and term parents are walked up to the
//!   root, guarded against cycles and runaway depth.
//! - **Escaping at the boundary**: labels are HTML-escaped and URLs are
//!   validated before they reach the output.
//! - **Multiple Output Formats**: HTML, JSON, YAML, ANSI-colored and plain
//!   text.
//!
//! # Example
//!
//! ```rust
//! use frontend_breadcrumb_core::{BreadcrumbBuilder, PageRequest, SiteIndex, ViewContext};
//!
//! let site = SiteIndex::from_yaml_str("home_url: https://example.com/").unwrap();
//! let builder = BreadcrumbBuilder::default();
//!
//! let html = builder.render(&PageRequest::new(ViewContext::NotFound), &site);
//! assert!(html.contains("Error 404"));
//! ```

pub mod config;
pub mod engine;
pub mod html;
pub mod integration;
pub mod models;
pub mod output;
pub mod site;

// Re-exports for convenience
pub use config::{BreadcrumbConfig, ConfigError, Labels, NumberFormat};
pub use engine::BreadcrumbBuilder;
pub use html::{Markup, SafeUrl};
pub use integration::{dashboard_panel, expand_shortcodes, SHORTCODE_TAG};
pub use models::{
    ArchiveKind, AuthorRecord, Crumb, CurrentCrumb, LinkFragment, PageRequest, PostRecord,
    PostTypeRecord, TaxonomyRecord, TermRecord, Trail, ViewContext,
};
pub use output::{format_batch, format_trail, FormatError, OutputFormat};
pub use site::{SiteError, SiteIndex, SiteQuery};
