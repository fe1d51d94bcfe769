//! Pipeline configuration.

use std::path::{Path, PathBuf};

use crate::classify::RuleSet;
use crate::error::ConfigError;
use crate::parser::ColumnLayout;

/// Raw workbook read when no input is given.
pub const DEFAULT_INPUT: &str = "donnees_brutes.xlsx";

/// Directory shared by the splitter, the variation computer and the mapper.
pub const DEFAULT_OUTPUT_DIR: &str = "donnees_traitees";

/// Everything a pipeline run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw input workbook or CSV
    pub input: PathBuf,
    /// Where split and variation files are written
    pub output_dir: PathBuf,
    /// Label and excluded columns of the raw input
    pub layout: ColumnLayout,
    /// Classification tables
    pub rules: RuleSet,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            layout: ColumnLayout::default(),
            rules: RuleSet::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Replace the built-in rules with the ones in `path`.
    pub fn with_rules_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        self.rules = RuleSet::from_json_file(path)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.input, PathBuf::from("donnees_brutes.xlsx"));
        assert_eq!(config.output_dir, PathBuf::from("donnees_traitees"));
        assert_eq!(config.layout.label_column, "Libellé");
        assert_eq!(config.layout.excluded_columns.len(), 3);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::default()
            .with_input("export.csv")
            .with_output_dir("/tmp/out");
        assert_eq!(config.input, PathBuf::from("export.csv"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_missing_rules_file() {
        let result = PipelineConfig::default().with_rules_file(Path::new("/nonexistent/rules.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
