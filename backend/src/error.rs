//! Error types for the CPI splitting pipeline.
//!
//! - [`TableError`] - Raw column layout errors
//! - [`CsvError`] - CSV reading/writing errors
//! - [`SpreadsheetError`] - XLSX workbook errors
//! - [`DecodeError`] - Filename decoding failures (skippable)
//! - [`IndexError`] - Sidecar catalog errors
//! - [`VariationError`] - Variation computation errors
//! - [`ConfigError`] - Rule file / configuration errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Table Errors
// =============================================================================

/// Errors while sorting raw columns into a series table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Required column missing from the header row.
    #[error("Missing column '{0}'")]
    MissingColumn(String),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or writing CSV series files.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read or write a file.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content or a failed record write.
    #[error("CSV error: {0}")]
    Format(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Required column missing from the header row.
    #[error("Missing column '{0}'")]
    MissingColumn(String),
}

impl From<TableError> for CsvError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::MissingColumn(column) => CsvError::MissingColumn(column),
        }
    }
}

// =============================================================================
// Spreadsheet Errors
// =============================================================================

/// Errors while loading the raw workbook.
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    /// Workbook could not be opened or parsed.
    #[error("Cannot open workbook '{}': {message}", .path.display())]
    Open { path: PathBuf, message: String },

    /// The workbook has no worksheet.
    #[error("Workbook '{}' has no worksheet", .0.display())]
    NoSheet(PathBuf),

    /// The first sheet has no header row.
    #[error("Worksheet '{0}' is empty")]
    EmptySheet(String),

    /// Required column missing from the header row.
    #[error("Missing column '{0}'")]
    MissingColumn(String),

    /// Unsupported input extension.
    #[error("Unsupported input format: '{}' (expected .xlsx, .xls, .ods or .csv)", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl From<TableError> for SpreadsheetError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::MissingColumn(column) => SpreadsheetError::MissingColumn(column),
        }
    }
}

// =============================================================================
// Filename Decoding Errors
// =============================================================================

/// Reasons a data filename cannot be decoded into a series key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("not a .csv file")]
    NotCsv,

    #[error("expected at least 5 underscore-separated tokens, found {0}")]
    TooFewTokens(usize),

    #[error("unknown nomenclature token '{0}'")]
    UnknownNomenclature(String),

    #[error("unknown variation type '{0}'")]
    UnknownVariation(String),

    #[error("HouseholdType not found")]
    UnknownHousehold,

    #[error("Region not found")]
    UnknownRegion,

    #[error("IndexType not found")]
    MissingIndexType,
}

// =============================================================================
// Sidecar Index Errors
// =============================================================================

/// Errors from the `_index.json` catalog.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Index IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Variation Errors
// =============================================================================

/// Errors while computing a variation file.
#[derive(Debug, Error)]
pub enum VariationError {
    /// Unknown variation kind (expected "yoy" or "mom").
    #[error("Unknown variation kind '{0}' (expected 'yoy' or 'mom')")]
    UnknownKind(String),

    /// The split file the variation derives from does not exist.
    #[error("Source file not found: {}", .0.display())]
    MissingSource(PathBuf),

    /// Reading the source or writing the result failed.
    #[error(transparent)]
    Csv(#[from] CsvError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read rules file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rules file: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] SpreadsheetError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Variation error: {0}")]
    Variation(#[from] VariationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing left to write once excluded rows are removed.
    #[error("No series to split")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type TableResult<T> = Result<T, TableError>;

pub type CsvResult<T> = Result<T, CsvError>;

pub type SpreadsheetResult<T> = Result<T, SpreadsheetError>;

pub type IndexResult<T> = Result<T, IndexError>;

pub type VariationResult<T> = Result<T, VariationError>;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> VariationError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let variation_err: VariationError = csv_err.into();
        let pipeline_err: PipelineError = variation_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        let missing = VariationError::MissingSource(PathBuf::from("donnees_traitees/x.csv"));
        let pipeline_err: PipelineError = missing.into();
        assert!(pipeline_err.to_string().contains("x.csv"));
    }

    #[test]
    fn test_missing_column_keeps_its_name() {
        let csv_err: CsvError = TableError::MissingColumn("Libellé".into()).into();
        assert!(matches!(csv_err, CsvError::MissingColumn(ref c) if c == "Libellé"));

        let sheet_err: SpreadsheetError = TableError::MissingColumn("Libellé".into()).into();
        assert_eq!(sheet_err.to_string(), "Missing column 'Libellé'");
    }

    #[test]
    fn test_decode_error_format() {
        assert_eq!(
            DecodeError::TooFewTokens(3).to_string(),
            "expected at least 5 underscore-separated tokens, found 3"
        );
        assert_eq!(DecodeError::UnknownRegion.to_string(), "Region not found");
    }
}
