//! High-level pipeline API.
//!
//! Combines loading, splitting, variation computation and mapping so the CLI
//! (or any embedding program) drives a run with a single call per step.
//!
//! ```rust,ignore
//! use ipc_split::{PipelineConfig, run_split, run_default_variations};
//!
//! let config = PipelineConfig::default();
//! let report = run_split(&config)?;
//! println!("{} files written", report.written.len());
//! run_default_variations(&config)?;
//! ```

use std::path::Path;

use crate::codec::DataIndex;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult, SpreadsheetError};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::SeriesTable;
use crate::parser::{load_workbook, parse_csv_file_auto, ColumnLayout};

use super::mapping::{build_mappings, list_data_files, parse_filenames, MappingTable};
use super::split::{split_table, SplitReport};
use super::variation::{compute_default_variations, compute_variation, VariationRequest};

/// Load a raw workbook or CSV export.
pub fn load_raw(path: &Path, layout: &ColumnLayout) -> PipelineResult<SeriesTable> {
    log_info(format!("📖 Reading {}...", path.display()));

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" => {
            let parsed = parse_csv_file_auto(path, layout)?;
            log_success(format!("Detected encoding: {}", parsed.encoding));
            log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));
            parsed.table
        }
        "xlsx" | "xlsm" | "xls" | "ods" => load_workbook(path, layout)?,
        _ => return Err(SpreadsheetError::UnsupportedFormat(path.to_path_buf()).into()),
    };

    log_success(format!("Read {} rows", table.len()));
    log_info_indent(
        format!(
            "{} period columns, {} other columns",
            table.periods.len(),
            table.attributes.len()
        ),
        1,
    );
    Ok(table)
}

/// Load the configured input and write one file per series key.
pub fn run_split(config: &PipelineConfig) -> PipelineResult<SplitReport> {
    let table = load_raw(&config.input, &config.layout)?;
    if table.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let report = split_table(&table, &config.rules, &config.output_dir)?;
    if report.failed.is_empty() {
        log_success(format!("{} files written", report.written.len()));
    } else {
        log_warning(format!(
            "{} files written, {} failed",
            report.written.len(),
            report.failed.len()
        ));
    }
    Ok(report)
}

/// Compute the requested variation files; stops at the first failure.
pub fn run_variations(config: &PipelineConfig, requests: &[VariationRequest]) -> PipelineResult<Vec<String>> {
    let mut written = Vec::new();
    for request in requests {
        written.push(compute_variation(
            &config.output_dir,
            request,
            &config.layout.label_column,
        )?);
    }
    Ok(written)
}

/// Year-over-year and month-over-month for every overseas region.
pub fn run_default_variations(config: &PipelineConfig) -> PipelineResult<Vec<String>> {
    Ok(compute_default_variations(&config.output_dir, &config.layout.label_column)?)
}

/// Build the mapping table of the output directory.
///
/// With `from_index`, keys come from the sidecar index instead of decoding
/// filenames. Index entries whose file no longer exists are left out.
pub fn run_mappings(config: &PipelineConfig, from_index: bool) -> PipelineResult<MappingTable> {
    let keys = if from_index {
        let mut index = DataIndex::load(&config.output_dir)?;
        for file in index.retain_existing() {
            log_warning(format!("{} listed in the index but missing. Skipping.", file));
        }
        index.keys()
    } else {
        let files = list_data_files(&config.output_dir)?;
        parse_filenames(&files)
    };
    log_info(format!("{} data files catalogued", keys.len()));
    Ok(build_mappings(&keys))
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
