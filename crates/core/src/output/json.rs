//! JSON output formatter

use crate::models::Trail;
use crate::output::FormatError;

/// Format a trail as pretty-printed JSON
pub fn format_json(trail: &Trail) -> Result<String, FormatError> {
    serde_json::to_string_pretty(trail).map_err(FormatError::from)
}
