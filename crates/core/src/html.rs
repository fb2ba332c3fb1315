//! HTML assembly with escaping at the boundary
//!
//! [`Markup`] only grows through [`Markup::text`] (escaped), [`Markup::raw`]
//! (trusted, crate-internal constants) and [`Markup::link`] (validated URL,
//! escaped label). Labels and URLs coming from the host never reach the
//! output unescaped.

use std::fmt;
use url::Url;

/// URL schemes allowed in `href` attributes
const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// A fragment of HTML that is safe to emit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Append escaped text
    pub fn text(&mut self, text: &str) -> &mut Self {
        self.0.push_str(&html_escape::encode_text(text));
        self
    }

    /// Append trusted markup
    pub(crate) fn raw(&mut self, markup: &str) -> &mut Self {
        self.0.push_str(markup);
        self
    }

    /// Append another fragment
    pub fn push(&mut self, other: &Markup) -> &mut Self {
        self.0.push_str(&other.0);
        self
    }

    /// Append `<a{attrs} href="url">label</a>`
    pub(crate) fn link(&mut self, attrs: &str, href: &SafeUrl, label: &str) -> &mut Self {
        self.raw("<a")
            .raw(attrs)
            .raw(" href=\"")
            .raw(&html_escape::encode_double_quoted_attribute(href.as_str()))
            .raw("\">")
            .text(label)
            .raw("</a>")
    }

    /// Append a `<span class="...">text</span>`
    pub(crate) fn span(&mut self, class: &str, text: &str) -> &mut Self {
        self.raw("<span class=\"")
            .raw(&html_escape::encode_double_quoted_attribute(class))
            .raw("\">")
            .text(text)
            .raw("</span>")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A URL that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeUrl(String);

impl SafeUrl {
    /// Validate `raw`, resolving relative references against `base`
    ///
    /// Returns `None` for empty input, unparseable URLs and schemes other
    /// than http and https.
    pub fn parse(raw: &str, base: &Url) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => base.join(raw).ok()?,
            Err(_) => return None,
        };

        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return None;
        }

        Some(Self(url.into()))
    }

    /// Wrap an already parsed URL
    pub fn from_url(url: &Url) -> Option<Self> {
        ALLOWED_SCHEMES
            .contains(&url.scheme())
            .then(|| Self(url.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
