//! Page integration
//!
//! Shortcode expansion, the stylesheet and script tags emitted in the page
//! footer, and the static dashboard help panel.

use crate::engine::BreadcrumbBuilder;
use crate::html::{Markup, SafeUrl};
use crate::models::PageRequest;
use crate::site::SiteQuery;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

/// Tag placed in templates
pub const SHORTCODE_TAG: &str = "bcff_display_breadcrumb";

/// Registration key of the dashboard panel
pub const DASHBOARD_PANEL_KEY: &str = "bcff_help_widget";

/// Title of the dashboard panel
pub const DASHBOARD_PANEL_TITLE: &str = "Breadcrumb For Frontend Plugin Support";

const DASHBOARD_PANEL_BODY: &str = "<p>Welcome to Breadcrumb For Frontend Plugin! \
Place <code>[bcff_display_breadcrumb]</code> in a template to show the trail. \
<a title=\"More About Breadcrumb For Frontend Plugin\" \
href=\"https://wordpress.org/plugins/breadcrumb-for-frontend/\" target=\"_blank\">\
For more details click here &raquo;</a></p>";

/// A stylesheet or script loaded in the page footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Style {
        handle: &'static str,
        path: &'static str,
    },
    Script {
        handle: &'static str,
        path: &'static str,
        deps: &'static [&'static str],
    },
}

/// Assets the breadcrumb needs on every page that shows it
pub const ASSETS: [Asset; 2] = [
    Asset::Style {
        handle: "bcff_breadcrumb_style",
        path: "assets/css/breadcrumb-for-frontend.css",
    },
    Asset::Script {
        handle: "bcff_breadcrumb_js",
        path: "assets/js/breadcrumb-for-frontend.js",
        deps: &["jquery"],
    },
];

impl Asset {
    pub fn handle(&self) -> &'static str {
        match self {
            Asset::Style { handle, .. } | Asset::Script { handle, .. } => *handle,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Asset::Style { path, .. } | Asset::Script { path, .. } => *path,
        }
    }
}

/// Footer tags for all assets, resolved against the plugin base URL
///
/// Assets whose URL fails validation are skipped.
pub fn asset_tags(plugin_base: &Url) -> Markup {
    let mut out = Markup::new();

    for asset in &ASSETS {
        let Some(href) = SafeUrl::parse(asset.path(), plugin_base) else {
            debug!(handle = asset.handle(), "skipping asset with invalid URL");
            continue;
        };
        let href = html_escape::encode_double_quoted_attribute(href.as_str()).into_owned();

        match asset {
            Asset::Style { handle, .. } => {
                out.raw(&format!(
                    "<link rel=\"stylesheet\" id=\"{}-css\" href=\"{}\" media=\"all\" />\n",
                    handle, href
                ));
            }
            Asset::Script { handle, .. } => {
                out.raw(&format!(
                    "<script id=\"{}-js\" src=\"{}\"></script>\n",
                    handle, href
                ));
            }
        }
    }

    out
}

/// Script handles that must load before the breadcrumb script
pub fn script_dependencies() -> Vec<&'static str> {
    ASSETS
        .iter()
        .filter_map(|asset| match asset {
            Asset::Script { deps, .. } => Some(*deps),
            Asset::Style { .. } => None,
        })
        .flatten()
        .copied()
        .collect()
}

fn shortcode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"\[{}\s*/?\]", regex::escape(SHORTCODE_TAG)))
            .expect("shortcode pattern is valid")
    })
}

/// Count shortcode occurrences in a template
pub fn count_shortcodes(template: &str) -> usize {
    shortcode_pattern().find_iter(template).count()
}

/// Replace every shortcode in `template` with the rendered breadcrumb
///
/// When `plugin_base` is given the asset tags are inserted once before
/// `</body>` (or appended if the template has no body end tag), whether or
/// not the template shows a trail, as the host footer hook does.
pub fn expand_shortcodes(
    template: &str,
    builder: &BreadcrumbBuilder,
    request: &PageRequest,
    site: &dyn SiteQuery,
    plugin_base: Option<&Url>,
) -> String {
    let count = count_shortcodes(template);
    let mut output = if count == 0 {
        template.to_string()
    } else {
        let html = builder.render(request, site);
        shortcode_pattern()
            .replace_all(template, regex::NoExpand(html.as_str()))
            .into_owned()
    };

    debug!(count, "expanded breadcrumb shortcodes");

    if let Some(base) = plugin_base {
        let tags = asset_tags(base);
        match output.rfind("</body>") {
            Some(pos) => output.insert_str(pos, tags.as_str()),
            None => output.push_str(tags.as_str()),
        }
    }

    output
}

/// Static HTML body of the dashboard help panel
pub fn dashboard_panel() -> &'static str {
    DASHBOARD_PANEL_BODY
}
