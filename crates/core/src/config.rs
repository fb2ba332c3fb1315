//! Configuration module for the breadcrumb builder
//!
//! This module provides the translatable label table, locale number
//! formatting and the builder configuration. A YAML file may override any
//! subset of fields; everything else keeps its default.

use chrono::Month;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Translatable strings used in the trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Text placed before the home crumb
    pub here: String,

    pub home: String,

    /// Prefix before an author's name
    pub author_archive: String,

    /// Prefix before a search query
    pub search_results: String,

    pub not_found: String,

    /// Page suffix, `%s` is replaced with the formatted page number
    pub page: String,

    /// Month names, January first; empty uses English names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<String>,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            here: "You are here!".to_string(),
            home: "Home".to_string(),
            author_archive: "Author archive for ".to_string(),
            search_results: "Search results for: ".to_string(),
            not_found: "Error 404".to_string(),
            page: " ( Page %s )".to_string(),
            months: Vec::new(),
        }
    }
}

impl Labels {
    /// Name of a month (1-12)
    pub fn month_name(&self, month: u32) -> Option<String> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        if let Some(name) = self.months.get(index) {
            return Some(name.clone());
        }

        let month = u8::try_from(month).ok()?;
        Month::try_from(month).ok().map(|m| m.name().to_string())
    }

    /// Page suffix for page `formatted`
    pub fn page_suffix(&self, formatted: &str) -> String {
        self.page.replacen("%s", formatted, 1)
    }
}

/// Locale digit grouping for page numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub thousands_separator: String,

    /// Digits per group
    pub grouping: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            thousands_separator: ",".to_string(),
            grouping: 3,
        }
    }
}

impl NumberFormat {
    /// Format an integer with digit grouping
    pub fn format(&self, value: u64) -> String {
        let digits = value.to_string();
        if self.grouping == 0 || digits.len() <= self.grouping {
            return digits;
        }

        let mut output = String::with_capacity(digits.len() * 2);
        let lead = digits.len() % self.grouping;
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (idx + self.grouping - lead) % self.grouping == 0 {
                output.push_str(&self.thousands_separator);
            }
            output.push(ch);
        }
        output
    }
}

/// Configuration for the breadcrumb builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreadcrumbConfig {
    pub labels: Labels,

    pub number_format: NumberFormat,

    /// Markup placed between crumbs
    pub delimiter: String,

    /// Class of the container element
    pub container_class: String,

    /// Class of the current crumb span
    pub current_class: String,

    /// Maximum hops of a single ancestor walk
    pub max_ancestor_depth: usize,
}

impl Default for BreadcrumbConfig {
    fn default() -> Self {
        Self {
            labels: Labels::default(),
            number_format: NumberFormat::default(),
            delimiter: " &raquo; ".to_string(),
            container_class: "breadcrumb-for-frontend".to_string(),
            current_class: "current".to_string(),
            max_ancestor_depth: 32,
        }
    }
}

impl BreadcrumbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set labels (builder pattern)
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Set number format (builder pattern)
    pub fn with_number_format(mut self, number_format: NumberFormat) -> Self {
        self.number_format = number_format;
        self
    }

    /// Set delimiter markup (builder pattern)
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set container class (builder pattern)
    pub fn with_container_class(mut self, class: impl Into<String>) -> Self {
        self.container_class = class.into();
        self
    }

    /// Set ancestor walk cap (builder pattern)
    pub fn with_max_ancestor_depth(mut self, depth: usize) -> Self {
        self.max_ancestor_depth = depth;
        self
    }

    /// Parse a YAML configuration
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: BreadcrumbConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ancestor_depth == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_ancestor_depth must be at least 1".to_string(),
            ));
        }
        if !self.labels.months.is_empty() && self.labels.months.len() != 12 {
            return Err(ConfigError::InvalidConfig(format!(
                "labels.months needs 12 entries, got {}",
                self.labels.months.len()
            )));
        }
        if !self.labels.page.contains("%s") {
            return Err(ConfigError::InvalidConfig(
                "labels.page must contain %s".to_string(),
            ));
        }
        Ok(())
    }
}
