//! YAML output formatter

use crate::models::Trail;
use crate::output::FormatError;

/// Format a trail as YAML
pub fn format_yaml(trail: &Trail) -> Result<String, FormatError> {
    serde_yaml::to_string(trail).map_err(FormatError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentCrumb, LinkFragment};

    #[test]
    fn test_format_yaml() {
        let trail = Trail {
            home: LinkFragment::new("https://example.com/", "Home"),
            front_page: false,
            ancestors: Vec::new(),
            current: Some(CurrentCrumb::with_prefix("Search results for: ", "rust")),
            page: None,
            truncated: false,
        };

        let yaml = format_yaml(&trail).unwrap();
        assert!(yaml.contains("home:"));
        assert!(yaml.contains("Search results for:"));
        assert!(yaml.contains("label: rust"));
    }
}
