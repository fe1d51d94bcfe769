//! # ipc-split - French CPI series splitter
//!
//! Turns an INSEE consumer price index export into one CSV per category,
//! derives variation files from them, and catalogs what exists.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │  Raw XLSX   │────▶│  Classify   │────▶│    Split    │────▶│ donnees_traitees │
//! │  (or CSV)   │     │  (labels)   │     │ (per key)   │     │  *.csv + index   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────────────────┘
//!                                                                │          │
//!                                                      ┌─────────▼─┐   ┌────▼────┐
//!                                                      │ Variation │   │ Mapping │
//!                                                      │ (yoy/mom) │   │ (index) │
//!                                                      └───────────┘   └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ipc_split::{run_split, run_default_variations, run_mappings, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! run_split(&config)?;
//! run_default_variations(&config)?;
//! println!("{}", run_mappings(&config, false)?.to_json()?);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Category values and series tables
//! - [`parser`] - Workbook/CSV loading and CSV writing
//! - [`classify`] - Label classification rules
//! - [`codec`] - Filename encoding/decoding and the sidecar index
//! - [`transform`] - Split, variation, mapping and pipeline
//! - [`config`] - Run configuration
//! - [`logs`] - Progress logging

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Classification and naming
pub mod classify;
pub mod codec;

// Transformation
pub mod transform;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    ConfigError, CsvError, DecodeError, IndexError, PipelineError, PipelineResult, SpreadsheetError, TableError,
    VariationError,
};

pub use models::{
    HouseholdType, IndexType, Nomenclature, Region, SeriesKey, SeriesRow, SeriesTable, VariationType,
};

pub use config::{PipelineConfig, DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};

pub use parser::{
    detect_delimiter, detect_encoding, load_workbook, parse_csv_file_auto, read_series_csv, write_series_csv,
    ColumnLayout,
};

pub use classify::{Classification, Rule, RuleSet};

pub use codec::{decode, encode, sanitize, DataIndex};

pub use transform::{
    build_mappings, compute_variation, load_raw, parse_filenames, percent_change, percent_change_with,
    run_default_variations, run_mappings, run_split, run_variations, split_table, Dimension, GapFill, MappingTable,
    SplitReport, VariationKind, VariationRequest,
};
