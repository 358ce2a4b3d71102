//! Loader configuration.

use serde::{Deserialize, Serialize};

/// How price and quantity sheets are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Grouping character stripped from numbers before parsing (default: `,`)
    pub thousands_separator: char,

    /// Header prefix marking columns to ignore (default: `Unnamed`)
    pub skip_column_prefix: String,

    /// Explicit start-date column; the earliest column, or the one before
    /// `end_column`, when `None`
    pub start_column: Option<String>,

    /// Explicit end-date column; the next column after the start when `None`
    pub end_column: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            thousands_separator: ',',
            skip_column_prefix: "Unnamed".to_string(),
            start_column: None,
            end_column: None,
        }
    }
}

impl LoaderConfig {
    /// Parse a cell into a number, stripping the thousands separator.
    ///
    /// Returns `None` for blank, unparseable or non-finite values.
    ///
    /// ```
    /// use spreadmap_data::LoaderConfig;
    ///
    /// let config = LoaderConfig::default();
    /// assert_eq!(config.parse_number("1,234.5"), Some(1234.5));
    /// assert_eq!(config.parse_number(" -50 "), Some(-50.0));
    /// assert_eq!(config.parse_number("n/a"), None);
    /// ```
    pub fn parse_number(&self, raw: &str) -> Option<f64> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| *c != self.thousands_separator)
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Whether a header names a column the loader should consider.
    pub fn is_usable_column(&self, header: &str) -> bool {
        let header = header.trim();
        !header.is_empty() && !header.starts_with(&self.skip_column_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.thousands_separator, ',');
        assert_eq!(config.skip_column_prefix, "Unnamed");
        assert!(config.start_column.is_none());
    }

    #[test]
    fn test_parse_number_edge_cases() {
        let config = LoaderConfig::default();
        assert_eq!(config.parse_number(""), None);
        assert_eq!(config.parse_number("   "), None);
        assert_eq!(config.parse_number("1,000,000"), Some(1_000_000.0));
        assert_eq!(config.parse_number("NaN"), None);
        assert_eq!(config.parse_number("inf"), None);
    }

    #[test]
    fn test_custom_separator() {
        let config = LoaderConfig {
            thousands_separator: '\'',
            ..Default::default()
        };
        assert_eq!(config.parse_number("1'250"), Some(1250.0));
        assert_eq!(config.parse_number("1,250"), None);
    }

    #[test]
    fn test_usable_column() {
        let config = LoaderConfig::default();
        assert!(config.is_usable_column("2024-01-31"));
        assert!(!config.is_usable_column("Unnamed: 3"));
        assert!(!config.is_usable_column("  "));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LoaderConfig = serde_json::from_str(r#"{"start_column": "Jan"}"#).unwrap();
        assert_eq!(config.start_column.as_deref(), Some("Jan"));
        assert_eq!(config.thousands_separator, ',');
    }
}
