use std::path::Path;

use chunktab_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

/// Names and options needed to open a summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Name of the table within the container.
    pub table: String,
    /// String-array attribute listing the column names, in column order.
    pub column_names_attribute: String,
    /// Name of the event identifier column. The product columns follow it.
    pub event_column: String,
    /// Verify once, when the event row map is first built, that every event
    /// occupies a single contiguous run of rows.
    pub verify_event_contiguity: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            table: "summary".to_string(),
            column_names_attribute: "column_names".to_string(),
            event_column: "event_id".to_string(),
            verify_event_contiguity: false,
        }
    }
}

impl ReaderConfig {
    pub fn from_json_str(json: &str) -> Result<ReaderConfig> {
        serde_json::from_str(json).map_err(|e| Error::serialization("reader config", e))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<ReaderConfig> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::io(path.display().to_string(), e))?;
        ReaderConfig::from_json_str(&json)
    }

    pub fn with_table(mut self, table: impl Into<String>) -> ReaderConfig {
        self.table = table.into();
        self
    }

    pub fn with_column_names_attribute(mut self, attribute: impl Into<String>) -> ReaderConfig {
        self.column_names_attribute = attribute.into();
        self
    }

    pub fn with_event_column(mut self, column: impl Into<String>) -> ReaderConfig {
        self.event_column = column.into();
        self
    }

    pub fn with_verify_event_contiguity(mut self, verify: bool) -> ReaderConfig {
        self.verify_event_contiguity = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::ReaderConfig;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ReaderConfig::from_json_str(r#"{ "table": "charge/calib_prompt_hits" }"#)
            .unwrap();
        assert_eq!(config.table, "charge/calib_prompt_hits");
        assert_eq!(config.column_names_attribute, "column_names");
        assert_eq!(config.event_column, "event_id");
        assert!(!config.verify_event_contiguity);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(ReaderConfig::from_json_str(r#"{ "tabel": "x" }"#).is_err());
    }

    #[test]
    fn test_from_file_and_builders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reader.json");
        let config = ReaderConfig::default()
            .with_table("hits")
            .with_event_column("evid")
            .with_verify_event_contiguity(true);
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(ReaderConfig::from_json_file(&path).unwrap(), config);
        assert!(ReaderConfig::from_json_file(dir.path().join("none.json")).is_err());
    }
}
