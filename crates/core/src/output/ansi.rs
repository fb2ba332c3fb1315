//! ANSI colored output formatter
//!
//! This module provides colorful terminal output for breadcrumb trails.

use crate::models::{Crumb, Trail};

// ANSI escape codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const YELLOW: &str = "\x1b[33m";
const BRIGHT_RED: &str = "\x1b[91m";
const BRIGHT_GREEN: &str = "\x1b[92m";
const BRIGHT_BLUE: &str = "\x1b[94m";
const BRIGHT_CYAN: &str = "\x1b[96m";

/// Color for a crumb
fn crumb_color(crumb: &Crumb) -> &'static str {
    match crumb {
        Crumb::Link(_) => BRIGHT_CYAN,
        Crumb::Text { .. } => YELLOW,
    }
}

/// Format a trail as ANSI colored text
pub fn format_trail_ansi(trail: &Trail) -> String {
    if trail.is_suppressed() {
        return format!("{}(breadcrumbs hidden on home){}", DIM, RESET);
    }

    let separator = format!(" {}»{} ", DIM, RESET);
    let mut parts = vec![format!("{}{}{}", BRIGHT_BLUE, trail.home.label, RESET)];

    if !trail.front_page {
        parts.extend(
            trail
                .ancestors
                .iter()
                .map(|c| format!("{}{}{}", crumb_color(c), c.label(), RESET)),
        );

        if let Some(current) = &trail.current {
            let prefix = current.prefix.as_deref().unwrap_or("");
            parts.push(format!(
                "{}{}{}{}{}{}{}",
                DIM, prefix, RESET, BOLD, BRIGHT_GREEN, current.label, RESET
            ));
        }
    }

    let mut output = parts.join(&separator);

    if let Some(page) = trail.page {
        output.push_str(&format!(" {}(page {}){}", DIM, page, RESET));
    }

    if trail.truncated {
        output.push_str(&format!(" {}⚠ truncated{}", BRIGHT_RED, RESET));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentCrumb, LinkFragment};

    fn trail() -> Trail {
        Trail {
            home: LinkFragment::new("https://example.com/", "Home"),
            front_page: false,
            ancestors: vec![
                Crumb::Link(LinkFragment::new("https://example.com/root/", "Root")),
                Crumb::Text {
                    label: "Mid".to_string(),
                },
            ],
            current: Some(CurrentCrumb::new("Leaf")),
            page: None,
            truncated: true,
        }
    }

    #[test]
    fn test_format_trail_ansi() {
        let output = format_trail_ansi(&trail());

        assert!(output.contains("Home"));
        assert!(output.contains(&format!("{}Root{}", BRIGHT_CYAN, RESET)));
        assert!(output.contains(&format!("{}Mid{}", YELLOW, RESET)));
        assert!(output.contains("Leaf"));
        assert!(output.contains("truncated"));
    }

    #[test]
    fn test_suppressed_trail() {
        let trail = Trail {
            front_page: true,
            ancestors: Vec::new(),
            current: None,
            truncated: false,
            ..trail()
        };

        assert!(format_trail_ansi(&trail).contains("hidden"));
    }
}
