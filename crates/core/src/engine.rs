//! Breadcrumb engine module
//!
//! This module provides the builder that turns a [`PageRequest`] into a
//! [`Trail`] and renders it as HTML.

use crate::config::BreadcrumbConfig;
use crate::html::{Markup, SafeUrl};
use crate::models::{
    ArchiveKind, AuthorId, Crumb, CurrentCrumb, LinkFragment, PageRequest, PostId, Trail,
    TermId, ViewContext, BUILTIN_POST_TYPES,
};
use crate::site::SiteQuery;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Opening tag of a linked crumb
const LINK_BEFORE: &str = "<span typeof=\"v:Breadcrumb\">";

/// Closing tag of a linked crumb
const LINK_AFTER: &str = "</span>";

/// Microdata attributes on crumb anchors
const LINK_ATTRS: &str = " rel=\"v:url\" property=\"v:title\"";

/// Result of walking a parent chain
struct Walk {
    /// Crumbs from the root down to the starting node's parent
    crumbs: Vec<Crumb>,
    truncated: bool,
}

/// Builds and renders breadcrumb trails
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbBuilder {
    config: BreadcrumbConfig,
}

impl BreadcrumbBuilder {
    /// Create a new builder with the given configuration
    pub fn new(config: BreadcrumbConfig) -> Self {
        Self { config }
    }

    /// Build the trail for a request
    pub fn build(&self, request: &PageRequest, site: &dyn SiteQuery) -> Trail {
        let labels = &self.config.labels;
        let home = LinkFragment::new(site.home_url().as_str(), labels.home.as_str());

        let mut trail = Trail {
            home,
            front_page: request.view.is_home(),
            ancestors: Vec::new(),
            current: None,
            page: request.page(),
            truncated: false,
        };

        match &request.view {
            ViewContext::Home => {}
            ViewContext::Singular {
                post_id,
                post_type,
                parent_id,
                category_ids,
            } => self.build_singular(
                &mut trail,
                site,
                *post_id,
                post_type,
                *parent_id,
                category_ids,
            ),
            ViewContext::Archive(kind) => self.build_archive(&mut trail, site, kind),
            ViewContext::Search { query } => {
                trail.current = Some(CurrentCrumb::with_prefix(
                    labels.search_results.as_str(),
                    query.as_str(),
                ));
            }
            ViewContext::NotFound => {
                trail.current = Some(CurrentCrumb::new(labels.not_found.as_str()));
            }
        }

        debug!(
            view = request.view.label(),
            crumbs = trail.ancestors.len(),
            truncated = trail.truncated,
            "built breadcrumb trail"
        );

        trail
    }

    /// Build and render the trail for a request as HTML
    pub fn render(&self, request: &PageRequest, site: &dyn SiteQuery) -> String {
        let trail = self.build(request, site);
        self.render_trail(&trail, site).into_string()
    }

    /// Render an already built trail as HTML
    pub fn render_trail(&self, trail: &Trail, site: &dyn SiteQuery) -> Markup {
        let config = &self.config;
        let mut out = Markup::new();

        out.raw("<div class=\"")
            .raw(&html_escape::encode_double_quoted_attribute(
                &config.container_class,
            ))
            .raw("\">");

        if !trail.is_suppressed() {
            let home = SafeUrl::from_url(site.home_url());

            out.text(&config.labels.here).raw(&config.delimiter);

            if trail.front_page {
                match &home {
                    Some(href) => out.link("", href, &trail.home.label),
                    None => out.text(&trail.home.label),
                };
            } else {
                match &home {
                    Some(href) => out.link(LINK_ATTRS, href, &trail.home.label),
                    None => out.text(&trail.home.label),
                };

                let body = self.render_crumbs(trail, site);
                if !body.is_empty() {
                    out.raw(&config.delimiter).push(&body);
                }
            }

            if let Some(page) = trail.page {
                let number = config.number_format.format(u64::from(page));
                out.span(&config.current_class, &config.labels.page_suffix(&number));
            }
        }

        out.raw("</div><!-- .breadcrumb -->");
        out
    }

    /// Ancestors and current crumb joined by the delimiter
    fn render_crumbs(&self, trail: &Trail, site: &dyn SiteQuery) -> Markup {
        let mut out = Markup::new();
        let mut first = true;

        for crumb in &trail.ancestors {
            if !first {
                out.raw(&self.config.delimiter);
            }
            first = false;

            match crumb {
                Crumb::Link(link) => {
                    // Trails may be deserialized, so links are checked again here
                    match SafeUrl::parse(&link.href, site.home_url()) {
                        Some(href) => {
                            out.raw(LINK_BEFORE)
                                .link(LINK_ATTRS, &href, &link.label)
                                .raw(LINK_AFTER);
                        }
                        None => {
                            out.text(&link.label);
                        }
                    }
                }
                Crumb::Text { label } => {
                    out.text(label);
                }
            }
        }

        if let Some(current) = &trail.current {
            if !first {
                out.raw(&self.config.delimiter);
            }
            if let Some(prefix) = &current.prefix {
                out.text(prefix);
            }
            out.span(&self.config.current_class, &current.label);
        }

        out
    }

    fn build_singular(
        &self,
        trail: &mut Trail,
        site: &dyn SiteQuery,
        post_id: PostId,
        post_type: &str,
        parent_id: Option<PostId>,
        category_ids: &[TermId],
    ) {
        let current = site.post(post_id);
        if current.is_none() {
            warn!(post_id, "current post not found");
        }
        let title = current.map(|post| post.title.clone());

        if post_type == "post" {
            // The view's categories take precedence over the stored record's
            let category = category_ids
                .first()
                .or_else(|| current.and_then(|post| post.categories.first()));
            if let Some(&category) = category {
                let mut walk = self.walk_terms(site, Some(category), None);
                trail.truncated |= walk.truncated;
                trail.ancestors.append(&mut walk.crumbs);
            }
        }

        if !BUILTIN_POST_TYPES.contains(&post_type) {
            match site.post_type(post_type) {
                Some(object) => {
                    let link = object.archive_link.as_deref().unwrap_or_default();
                    trail
                        .ancestors
                        .push(self.crumb(site, link, &object.singular_name));
                }
                None => warn!(post_type, "post type not registered"),
            }
        }

        let mut walk = self.walk_posts(site, post_id, parent_id);
        trail.truncated |= walk.truncated;
        trail.ancestors.append(&mut walk.crumbs);

        trail.current = title.map(CurrentCrumb::new);
    }

    fn build_archive(&self, trail: &mut Trail, site: &dyn SiteQuery, kind: &ArchiveKind) {
        match kind {
            ArchiveKind::Category { term_id }
            | ArchiveKind::Tag { term_id }
            | ArchiveKind::Taxonomy { term_id } => {
                let Some(term) = site.term(*term_id) else {
                    warn!(term_id, "archive term not found");
                    return;
                };

                let mut walk = self.walk_terms(site, term.parent, Some(*term_id));
                trail.truncated |= walk.truncated;
                trail.ancestors.append(&mut walk.crumbs);

                let label = match site.taxonomy(&term.taxonomy) {
                    Some(taxonomy) => format!("{}: {}", taxonomy.singular_name, term.name),
                    None => {
                        warn!(taxonomy = %term.taxonomy, "taxonomy not registered");
                        term.name.clone()
                    }
                };
                trail.current = Some(CurrentCrumb::new(label));
            }
            ArchiveKind::Author { author_id } => {
                trail.current = self.author_crumb(site, *author_id);
            }
            ArchiveKind::Date { year, month, day } => {
                self.build_date(trail, site, *year, *month, *day);
            }
            ArchiveKind::PostTypeArchive { post_type } => match site.post_type(post_type) {
                Some(object) => {
                    trail.current = Some(CurrentCrumb::new(object.singular_name.as_str()));
                }
                None => warn!(post_type = %post_type, "post type not registered"),
            },
        }
    }

    fn author_crumb(&self, site: &dyn SiteQuery, author_id: AuthorId) -> Option<CurrentCrumb> {
        let Some(author) = site.author(author_id) else {
            warn!(author_id, "author not found");
            return None;
        };
        Some(CurrentCrumb::with_prefix(
            self.config.labels.author_archive.as_str(),
            author.display_name.as_str(),
        ))
    }

    fn build_date(
        &self,
        trail: &mut Trail,
        site: &dyn SiteQuery,
        year: i32,
        month: Option<u32>,
        day: Option<u32>,
    ) {
        let labels = &self.config.labels;
        let month_name = month.and_then(|m| labels.month_name(m));

        match (month, month_name, day) {
            (Some(month), Some(name), Some(day)) => {
                trail
                    .ancestors
                    .push(self.crumb(site, &site.year_link(year), &year.to_string()));
                trail
                    .ancestors
                    .push(self.crumb(site, &site.month_link(year, month), &name));
                trail.current = Some(CurrentCrumb::new(day.to_string()));
            }
            (Some(_), Some(name), None) => {
                trail
                    .ancestors
                    .push(self.crumb(site, &site.year_link(year), &year.to_string()));
                trail.current = Some(CurrentCrumb::new(name));
            }
            (Some(month), None, _) => {
                warn!(year, month, "month out of range, showing year only");
                trail.current = Some(CurrentCrumb::new(year.to_string()));
            }
            (None, _, _) => {
                trail.current = Some(CurrentCrumb::new(year.to_string()));
            }
        }
    }

    /// Walk post parents from `parent_id` up to the root
    fn walk_posts(&self, site: &dyn SiteQuery, start: PostId, parent_id: Option<PostId>) -> Walk {
        let mut crumbs = Vec::new();
        let mut seen = HashSet::from([start]);
        let mut next = parent_id;
        let mut truncated = false;

        while let Some(id) = next {
            if !seen.insert(id) {
                warn!(post_id = id, "cycle in post hierarchy, stopping walk");
                truncated = true;
                break;
            }
            if crumbs.len() >= self.config.max_ancestor_depth {
                warn!(
                    post_id = id,
                    max = self.config.max_ancestor_depth,
                    "post hierarchy too deep, stopping walk"
                );
                truncated = true;
                break;
            }
            let Some(post) = site.post(id) else {
                warn!(post_id = id, "parent post not found, stopping walk");
                break;
            };

            crumbs.push(self.crumb(site, &post.permalink, &post.title));
            next = post.parent;
        }

        crumbs.reverse();
        Walk { crumbs, truncated }
    }

    /// Walk terms from `start` up to the root, `start` included
    ///
    /// `visited` is a term already on the trail, such as the archive's own
    /// term, that must not reappear as an ancestor.
    fn walk_terms(
        &self,
        site: &dyn SiteQuery,
        start: Option<TermId>,
        visited: Option<TermId>,
    ) -> Walk {
        let mut crumbs = Vec::new();
        let mut seen: HashSet<TermId> = visited.into_iter().collect();
        let mut next = start;
        let mut truncated = false;

        while let Some(id) = next {
            if !seen.insert(id) {
                warn!(term_id = id, "cycle in term hierarchy, stopping walk");
                truncated = true;
                break;
            }
            if crumbs.len() >= self.config.max_ancestor_depth {
                warn!(
                    term_id = id,
                    max = self.config.max_ancestor_depth,
                    "term hierarchy too deep, stopping walk"
                );
                truncated = true;
                break;
            }
            let Some(term) = site.term(id) else {
                warn!(term_id = id, "term not found, stopping walk");
                break;
            };

            crumbs.push(self.crumb(site, &term.link, &term.name));
            next = term.parent;
        }

        crumbs.reverse();
        Walk { crumbs, truncated }
    }

    /// A linked crumb, or plain text if the URL does not validate
    fn crumb(&self, site: &dyn SiteQuery, href: &str, label: &str) -> Crumb {
        match SafeUrl::parse(href, site.home_url()) {
            Some(url) => Crumb::Link(LinkFragment::new(url.into_string(), label)),
            None => {
                debug!(href, "rejected crumb URL");
                Crumb::Text {
                    label: label.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuthorRecord, PostRecord, PostTypeRecord, TaxonomyRecord, TermRecord,
    };
    use crate::site::SiteIndex;
    use url::Url;

    fn post(id: PostId, title: &str, post_type: &str, parent: Option<PostId>) -> PostRecord {
        PostRecord {
            id,
            title: title.to_string(),
            post_type: post_type.to_string(),
            parent,
            permalink: format!("https://example.com/{}/", title.to_lowercase()),
            categories: Vec::new(),
        }
    }

    fn term(id: TermId, name: &str, taxonomy: &str, parent: Option<TermId>) -> TermRecord {
        TermRecord {
            id,
            name: name.to_string(),
            taxonomy: taxonomy.to_string(),
            parent,
            link: format!("https://example.com/{}/{}/", taxonomy, name.to_lowercase()),
        }
    }

    fn site() -> SiteIndex {
        SiteIndex::new(Url::parse("https://example.com/").unwrap())
            .with_post(post(1, "Hello", "post", None))
            .with_post(post(2, "Root", "page", None))
            .with_post(post(3, "Mid", "page", Some(2)))
            .with_post(post(4, "Leaf", "page", Some(3)))
            .with_post(post(5, "Widget", "product", None))
            .with_term(term(10, "CatA", "category", None))
            .with_term(term(11, "Top", "category", None))
            .with_term(term(12, "Sub", "category", Some(11)))
            .with_taxonomy(TaxonomyRecord {
                name: "category".to_string(),
                singular_name: "Category".to_string(),
            })
            .with_post_type(PostTypeRecord {
                name: "product".to_string(),
                singular_name: "Product".to_string(),
                archive_link: Some("https://example.com/products/".to_string()),
            })
            .with_author(AuthorRecord {
                id: 9,
                display_name: "Ada Lovelace".to_string(),
            })
    }

    fn singular(post_id: PostId, post_type: &str, parent_id: Option<PostId>) -> ViewContext {
        ViewContext::Singular {
            post_id,
            post_type: post_type.to_string(),
            parent_id,
            category_ids: Vec::new(),
        }
    }

    fn build(view: ViewContext) -> Trail {
        BreadcrumbBuilder::default().build(&PageRequest::new(view), &site())
    }

    #[test]
    fn test_home_is_suppressed() {
        let site = site();
        let html = BreadcrumbBuilder::default().render(&PageRequest::new(ViewContext::Home), &site);

        assert_eq!(
            html,
            "<div class=\"breadcrumb-for-frontend\"></div><!-- .breadcrumb -->"
        );
    }

    #[test]
    fn test_paged_home_shows_home_and_page() {
        let site = site();
        let request = PageRequest::new(ViewContext::Home).with_paged(2);
        let html = BreadcrumbBuilder::default().render(&request, &site);

        assert_eq!(
            html,
            "<div class=\"breadcrumb-for-frontend\">You are here! &raquo; \
             <a href=\"https://example.com/\">Home</a>\
             <span class=\"current\"> ( Page 2 )</span></div><!-- .breadcrumb -->"
        );
    }

    #[test]
    fn test_post_with_category() {
        let view = ViewContext::Singular {
            post_id: 1,
            post_type: "post".to_string(),
            parent_id: None,
            category_ids: vec![10],
        };
        let trail = build(view);

        assert_eq!(trail.path(" » "), "Home » CatA » Hello");
        assert_eq!(
            trail.ancestors[0].href(),
            Some("https://example.com/category/cata/")
        );
    }

    #[test]
    fn test_first_category_wins() {
        let view = ViewContext::Singular {
            post_id: 1,
            post_type: "post".to_string(),
            parent_id: None,
            category_ids: vec![12, 10],
        };

        assert_eq!(build(view).path(" » "), "Home » Top » Sub » Hello");
    }

    #[test]
    fn test_page_hierarchy_root_first() {
        let trail = build(singular(4, "page", Some(3)));

        assert_eq!(trail.path(" » "), "Home » Root » Mid » Leaf");
        assert!(!trail.truncated);
    }

    #[test]
    fn test_custom_post_type_links_archive() {
        let trail = build(singular(5, "product", None));

        assert_eq!(trail.path(" » "), "Home » Product » Widget");
        assert_eq!(
            trail.ancestors[0].href(),
            Some("https://example.com/products/")
        );
    }

    #[test]
    fn test_category_archive() {
        let trail = build(ViewContext::Archive(ArchiveKind::Category { term_id: 12 }));

        assert_eq!(trail.path(" » "), "Home » Top » Category: Sub");
        assert!(matches!(trail.ancestors[0], Crumb::Link(_)));
    }

    #[test]
    fn test_date_archives() {
        let day = build(ViewContext::Archive(ArchiveKind::Date {
            year: 2024,
            month: Some(3),
            day: Some(15),
        }));
        assert_eq!(day.path(" » "), "Home » 2024 » March » 15");
        assert_eq!(day.ancestors[0].href(), Some("https://example.com/2024/"));
        assert_eq!(day.ancestors[1].href(), Some("https://example.com/2024/03/"));

        let month = build(ViewContext::Archive(ArchiveKind::Date {
            year: 2024,
            month: Some(3),
            day: None,
        }));
        assert_eq!(month.path(" » "), "Home » 2024 » March");

        let year = build(ViewContext::Archive(ArchiveKind::Date {
            year: 2024,
            month: None,
            day: None,
        }));
        assert_eq!(year.path(" » "), "Home » 2024");
        assert!(year.ancestors.is_empty());
    }

    #[test]
    fn test_author_search_and_404() {
        let author = build(ViewContext::Archive(ArchiveKind::Author { author_id: 9 }));
        assert_eq!(author.path(" » "), "Home » Author archive for Ada Lovelace");

        let search = build(ViewContext::Search {
            query: "rust".to_string(),
        });
        assert_eq!(search.path(" » "), "Home » Search results for: rust");

        let missing = build(ViewContext::NotFound);
        assert_eq!(missing.path(" » "), "Home » Error 404");
    }

    #[test]
    fn test_post_type_archive() {
        let trail = build(ViewContext::Archive(ArchiveKind::PostTypeArchive {
            post_type: "product".to_string(),
        }));
        assert_eq!(trail.path(" » "), "Home » Product");
    }

    #[test]
    fn test_cycle_is_truncated() {
        let site = SiteIndex::new(Url::parse("https://example.com/").unwrap())
            .with_post(post(1, "A", "page", Some(2)))
            .with_post(post(2, "B", "page", Some(3)))
            .with_post(post(3, "C", "page", Some(2)));
        let trail = BreadcrumbBuilder::default()
            .build(&PageRequest::new(singular(1, "page", Some(2))), &site);

        assert!(trail.truncated);
        assert_eq!(trail.path(" » "), "Home » C » B » A");
    }

    fn category_site(terms: Vec<TermRecord>) -> SiteIndex {
        terms.into_iter().fold(
            SiteIndex::new(Url::parse("https://example.com/").unwrap()).with_taxonomy(
                TaxonomyRecord {
                    name: "category".to_string(),
                    singular_name: "Category".to_string(),
                },
            ),
            SiteIndex::with_term,
        )
    }

    #[test]
    fn test_term_cycle_excludes_current_term() {
        let site = category_site(vec![
            term(12, "Sub", "category", Some(11)),
            term(11, "Top", "category", Some(12)),
        ]);
        let trail = BreadcrumbBuilder::default().build(
            &PageRequest::new(ViewContext::Archive(ArchiveKind::Category { term_id: 12 })),
            &site,
        );

        assert!(trail.truncated);
        assert_eq!(trail.path(" » "), "Home » Top » Category: Sub");
    }

    #[test]
    fn test_self_parented_term() {
        let site = category_site(vec![term(12, "Sub", "category", Some(12))]);
        let trail = BreadcrumbBuilder::default().build(
            &PageRequest::new(ViewContext::Archive(ArchiveKind::Category { term_id: 12 })),
            &site,
        );

        assert!(trail.truncated);
        assert_eq!(trail.path(" » "), "Home » Category: Sub");
    }

    #[test]
    fn test_stored_categories_used_when_view_has_none() {
        let site = site().with_post(PostRecord {
            categories: vec![12, 10],
            ..post(7, "Stored", "post", None)
        });
        let trail = BreadcrumbBuilder::default()
            .build(&PageRequest::new(singular(7, "post", None)), &site);

        assert_eq!(trail.path(" » "), "Home » Top » Sub » Stored");

        let view = ViewContext::Singular {
            post_id: 7,
            post_type: "post".to_string(),
            parent_id: None,
            category_ids: vec![10],
        };
        let trail = BreadcrumbBuilder::default().build(&PageRequest::new(view), &site);
        assert_eq!(trail.path(" » "), "Home » CatA » Stored");
    }

    #[test]
    fn test_depth_cap_is_truncated() {
        let site = site();
        let builder = BreadcrumbBuilder::new(BreadcrumbConfig::new().with_max_ancestor_depth(1));
        let trail = builder.build(&PageRequest::new(singular(4, "page", Some(3))), &site);

        assert!(trail.truncated);
        assert_eq!(trail.path(" » "), "Home » Mid » Leaf");
    }

    #[test]
    fn test_missing_parent_stops_walk() {
        let trail = build(singular(4, "page", Some(404)));

        assert!(!trail.truncated);
        assert_eq!(trail.path(" » "), "Home » Leaf");
    }

    #[test]
    fn test_missing_term_degrades() {
        let site = site();
        let html = BreadcrumbBuilder::default().render(
            &PageRequest::new(ViewContext::Archive(ArchiveKind::Tag { term_id: 77 })),
            &site,
        );

        assert!(html.ends_with("href=\"https://example.com/\">Home</a></div><!-- .breadcrumb -->"));
    }

    #[test]
    fn test_unsafe_link_becomes_text() {
        let site = SiteIndex::new(Url::parse("https://example.com/").unwrap())
            .with_post(PostRecord {
                permalink: "javascript:alert(1)".to_string(),
                ..post(1, "Evil", "page", None)
            })
            .with_post(post(2, "Child", "page", Some(1)));
        let html = BreadcrumbBuilder::default()
            .render(&PageRequest::new(singular(2, "page", Some(1))), &site);

        assert!(!html.contains("javascript:"));
        assert!(html.contains(" &raquo; Evil &raquo; "));
    }

    #[test]
    fn test_render_post_markup() {
        let site = site();
        let view = ViewContext::Singular {
            post_id: 1,
            post_type: "post".to_string(),
            parent_id: None,
            category_ids: vec![10],
        };
        let html = BreadcrumbBuilder::default().render(&PageRequest::new(view), &site);

        assert_eq!(
            html,
            "<div class=\"breadcrumb-for-frontend\">You are here! &raquo; \
             <a rel=\"v:url\" property=\"v:title\" href=\"https://example.com/\">Home</a> &raquo; \
             <span typeof=\"v:Breadcrumb\"><a rel=\"v:url\" property=\"v:title\" \
             href=\"https://example.com/category/cata/\">CatA</a></span> &raquo; \
             <span class=\"current\">Hello</span></div><!-- .breadcrumb -->"
        );
    }

    #[test]
    fn test_paged_archive_uses_number_format() {
        let site = site();
        let request = PageRequest::new(ViewContext::NotFound).with_paged(1234);
        let html = BreadcrumbBuilder::default().render(&request, &site);

        assert!(html.contains(
            "<span class=\"current\">Error 404</span><span class=\"current\"> ( Page 1,234 )</span>"
        ));
    }
}
