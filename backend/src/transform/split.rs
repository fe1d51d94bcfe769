//! Split a raw table into one file per series key.
//!
//! ```text
//! Raw table (all series)                     →  donnees_traitees/
//! ┌──────────────────────────────────────┐      ┌─────────────────────────────────────────────┐
//! │ IPC - Guadeloupe                     │  →   │ Ensemble_des_menages_Guadeloupe_IPC_None_…  │
//! │ IPC - Glissement annuel - Guadeloupe │  →   │ Ensemble_des_menages_Guadeloupe_IPC_Gliss…  │
//! │ IPC - base 100 en 2015 - Guyane      │  ✗   │ (excluded)                                  │
//! └──────────────────────────────────────┘      └─────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::classify::RuleSet;
use crate::codec::{self, DataIndex, INDEX_FILE_NAME};
use crate::error::PipelineResult;
use crate::logs::{log_error, log_info, log_success, log_warning};
use crate::models::{SeriesKey, SeriesTable};
use crate::parser::write_series_csv;

/// Outcome of a split run.
#[derive(Debug, Clone, Default)]
pub struct SplitReport {
    /// Rows in the source table
    pub rows_read: usize,
    /// Rows dropped as base-100 or frozen series
    pub rows_excluded: usize,
    /// Files written, in write order
    pub written: Vec<String>,
    /// Files that could not be written, with the reason
    pub failed: Vec<(String, String)>,
    /// Why the sidecar index could not be read or saved, if it could not
    pub index_error: Option<String>,
}

/// Classify every row and group the kept ones by series key.
///
/// Groups come back in ascending key order; rows keep their source order
/// inside a group.
pub fn group_rows(table: &SeriesTable, rules: &RuleSet) -> (BTreeMap<SeriesKey, SeriesTable>, usize) {
    let mut groups: BTreeMap<SeriesKey, SeriesTable> = BTreeMap::new();
    let mut excluded = 0;

    for row in &table.rows {
        let classification = rules.classify(&row.label);
        if classification.is_excluded() {
            excluded += 1;
            continue;
        }
        groups
            .entry(classification.key())
            .or_insert_with(|| table.empty_like())
            .rows
            .push(row.clone());
    }

    (groups, excluded)
}

/// Write one CSV per series key into `output_dir`.
///
/// A group that fails to write is logged and recorded in the report; the
/// remaining groups are still written. The sidecar index is best effort: an
/// unreadable index is replaced by one listing this run's files, and a failed
/// save is recorded in [`SplitReport::index_error`].
pub fn split_table(table: &SeriesTable, rules: &RuleSet, output_dir: &Path) -> PipelineResult<SplitReport> {
    fs::create_dir_all(output_dir)?;

    let (groups, rows_excluded) = group_rows(table, rules);
    let mut report = SplitReport {
        rows_read: table.len(),
        rows_excluded,
        ..SplitReport::default()
    };
    log_info(format!(
        "{} series kept, {} excluded, {} groups",
        report.rows_read - rows_excluded,
        rows_excluded,
        groups.len()
    ));

    let mut index = match DataIndex::load(output_dir) {
        Ok(index) => index,
        Err(e) => {
            log_warning(format!("Cannot read {}: {}. Rebuilding it.", INDEX_FILE_NAME, e));
            report.index_error = Some(e.to_string());
            DataIndex::new(output_dir)
        }
    };
    for (key, group) in &groups {
        let filename = codec::encode(key);
        match write_series_csv(&output_dir.join(&filename), group) {
            Ok(()) => {
                log_success(format!("File written: {}", filename));
                index.upsert(filename.clone(), key.clone());
                report.written.push(filename);
            }
            Err(e) => {
                log_error(format!("Error writing file {}: {}", filename, e));
                report.failed.push((filename, e.to_string()));
            }
        }
    }
    if let Err(e) = index.save() {
        log_error(format!("Error writing {}: {}", INDEX_FILE_NAME, e));
        report.index_error = Some(e.to_string());
    }

    Ok(report)
}
