use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One row of the external URL list. Only `url` matters to the pipeline;
/// `label` is carried through to the results file for humans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRow {
    pub url: Option<String>,
    pub label: Option<String>,
}

impl UrlRow {
    /// The trimmed product URL, or `None` when the cell is empty.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct RowsFile {
    pub rows: Vec<UrlRow>,
}

/// Load the URL rows from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or contains
/// no rows at all.
pub fn load_rows(path: &Path) -> Result<RowsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RowsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let rows_file: RowsFile = serde_yaml::from_str(&content)?;

    if rows_file.rows.is_empty() {
        return Err(ConfigError::Validation(
            "rows file contains no rows".to_string(),
        ));
    }

    Ok(rows_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_trimmed() {
        let row = UrlRow {
            url: Some("  https://example.com/x  ".to_string()),
            label: None,
        };
        assert_eq!(row.url(), Some("https://example.com/x"));
    }

    #[test]
    fn blank_url_reads_as_absent() {
        let row = UrlRow {
            url: Some("   ".to_string()),
            label: Some("placeholder".to_string()),
        };
        assert_eq!(row.url(), None);
    }

    #[test]
    fn missing_url_reads_as_absent() {
        let row = UrlRow {
            url: None,
            label: None,
        };
        assert_eq!(row.url(), None);
    }

    #[test]
    fn parses_rows_yaml() {
        let yaml = r"
rows:
  - url: https://www.alibaba.com/product-detail/widget_123.html
    label: widget
  - url:
    label: no link yet
";
        let rows_file: RowsFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rows_file.rows.len(), 2);
        assert_eq!(
            rows_file.rows[0].url(),
            Some("https://www.alibaba.com/product-detail/widget_123.html")
        );
        assert_eq!(rows_file.rows[1].url(), None);
    }
}
