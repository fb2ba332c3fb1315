//! Output formatting module
//!
//! This module renders a built [`Trail`] as HTML (the page fragment), JSON,
//! YAML, ANSI-colored text or a plain summary.

pub mod ansi;
mod json;
mod yaml;

pub use ansi::format_trail_ansi;
pub use json::format_json;
pub use yaml::format_yaml;

use crate::engine::BreadcrumbBuilder;
use crate::models::{PageRequest, Trail};
use crate::site::SiteQuery;
use thiserror::Error;

/// Output format errors
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// HTML fragment, as inserted by the shortcode
    #[default]
    Html,
    /// JSON trail
    Json,
    /// YAML trail
    Yaml,
    /// ANSI colored text
    Ansi,
    /// Plain text path
    Summary,
}

/// Format a trail in the specified format
pub fn format_trail(
    trail: &Trail,
    builder: &BreadcrumbBuilder,
    site: &dyn SiteQuery,
    format: OutputFormat,
) -> Result<String, FormatError> {
    match format {
        OutputFormat::Html => Ok(builder.render_trail(trail, site).into_string()),
        OutputFormat::Json => format_json(trail),
        OutputFormat::Yaml => format_yaml(trail),
        OutputFormat::Ansi => Ok(format_trail_ansi(trail)),
        OutputFormat::Summary => Ok(format_summary(trail)),
    }
}

/// Build and format the trails of several requests
///
/// HTML and summary output put one trail per line; JSON and YAML emit a
/// list.
pub fn format_batch(
    trails: &[Trail],
    builder: &BreadcrumbBuilder,
    site: &dyn SiteQuery,
    format: OutputFormat,
) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(trails).map_err(FormatError::from),
        OutputFormat::Yaml => serde_yaml::to_string(trails).map_err(FormatError::from),
        _ => trails
            .iter()
            .map(|trail| format_trail(trail, builder, site, format))
            .collect::<Result<Vec<_>, _>>()
            .map(|lines| lines.join("\n")),
    }
}

/// Format as plain text path
fn format_summary(trail: &Trail) -> String {
    let mut output = trail.path(" » ");

    if let Some(page) = trail.page {
        if !output.is_empty() {
            output.push(' ');
        }
        output.push_str(&format!("(page {})", page));
    }
    if trail.truncated {
        output.push_str(" [truncated]");
    }

    output
}

/// Describe a request for log lines and summaries
pub fn describe_request(request: &PageRequest) -> String {
    match request.page() {
        Some(page) => format!("{} (page {})", request.view.label(), page),
        None => request.view.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentCrumb, LinkFragment, ViewContext};
    use crate::site::SiteIndex;
    use url::Url;

    fn trail() -> Trail {
        Trail {
            home: LinkFragment::new("https://example.com/", "Home"),
            front_page: false,
            ancestors: Vec::new(),
            current: Some(CurrentCrumb::new("Error 404")),
            page: Some(2),
            truncated: false,
        }
    }

    #[test]
    fn test_format_summary() {
        assert_eq!(format_summary(&trail()), "Home » Error 404 (page 2)");
    }

    #[test]
    fn test_format_html_matches_builder() {
        let site = SiteIndex::new(Url::parse("https://example.com/").unwrap());
        let builder = BreadcrumbBuilder::default();
        let request = PageRequest::new(ViewContext::NotFound).with_paged(2);
        let trail = builder.build(&request, &site);

        let html = format_trail(&trail, &builder, &site, OutputFormat::Html).unwrap();
        assert_eq!(html, builder.render(&request, &site));
    }

    #[test]
    fn test_format_batch_json_is_list() {
        let site = SiteIndex::new(Url::parse("https://example.com/").unwrap());
        let builder = BreadcrumbBuilder::default();
        let json = format_batch(&[trail(), trail()], &builder, &site, OutputFormat::Json).unwrap();

        let parsed: Vec<Trail> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_describe_request() {
        let request = PageRequest::new(ViewContext::Search {
            query: "x".to_string(),
        })
        .with_paged(3);
        assert_eq!(describe_request(&request), "search (page 3)");
    }
}
