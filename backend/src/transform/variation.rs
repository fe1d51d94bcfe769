//! Period-over-period variations derived from split files.

use std::path::Path;
use std::str::FromStr;

use crate::codec::{self, DataIndex, INDEX_FILE_NAME};
use crate::error::{VariationError, VariationResult};
use crate::logs::{log_error, log_success, log_warning};
use crate::models::{HouseholdType, IndexType, Nomenclature, Region, SeriesKey, SeriesRow, SeriesTable, VariationType};
use crate::parser::{read_series_csv, write_series_csv};

/// Supported variation computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationKind {
    /// Year over year, 12 periods back.
    Yoy,
    /// Month over month, 1 period back.
    Mom,
}

impl VariationKind {
    pub const ALL: [VariationKind; 2] = [Self::Yoy, Self::Mom];

    pub fn period(&self) -> usize {
        match self {
            Self::Yoy => 12,
            Self::Mom => 1,
        }
    }

    pub fn variation_type(&self) -> VariationType {
        match self {
            Self::Yoy => VariationType::YearOverYear,
            Self::Mom => VariationType::MonthOverMonth,
        }
    }
}

impl FromStr for VariationKind {
    type Err = VariationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yoy" => Ok(Self::Yoy),
            "mom" => Ok(Self::Mom),
            other => Err(VariationError::UnknownKind(other.to_string())),
        }
    }
}

/// How gaps inside a series are treated before taking the ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapFill {
    /// Carry the last known value forward over gaps. Leading gaps stay missing.
    #[default]
    Pad,
    /// Leave gaps as they are: any missing operand gives a missing result.
    Strict,
}

/// Which split file to derive from, and how.
#[derive(Debug, Clone)]
pub struct VariationRequest {
    pub region: Region,
    pub kind: VariationKind,
    pub index_type: IndexType,
    pub nomenclature: Nomenclature,
    pub household: HouseholdType,
    pub gap_fill: GapFill,
}

impl VariationRequest {
    /// IPC, non-nomenclature, all households.
    pub fn new(region: Region, kind: VariationKind) -> Self {
        Self {
            region,
            kind,
            index_type: IndexType::Ipc,
            nomenclature: Nomenclature::Aggregate,
            household: HouseholdType::All,
            gap_fill: GapFill::Pad,
        }
    }

    /// Key of the split file the variation is computed from.
    pub fn source_key(&self) -> SeriesKey {
        SeriesKey {
            household: self.household,
            region: self.region,
            index_type: self.index_type.clone(),
            variation_type: VariationType::None,
            nomenclature: self.nomenclature,
        }
    }
}

/// `100 * (v[i] / v[i - period] - 1)` with gaps padded forward first.
///
/// The first `period` values are missing. A zero base gives an infinite
/// change; `0 / 0` is missing.
pub fn percent_change(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    percent_change_with(values, period, GapFill::Pad)
}

/// [`percent_change`] with an explicit gap policy.
pub fn percent_change_with(values: &[Option<f64>], period: usize, gap_fill: GapFill) -> Vec<Option<f64>> {
    let filled: Vec<Option<f64>> = match gap_fill {
        GapFill::Strict => values.to_vec(),
        GapFill::Pad => values
            .iter()
            .scan(None, |last, v| {
                if v.is_some() {
                    *last = *v;
                }
                Some(*last)
            })
            .collect(),
    };

    (0..filled.len())
        .map(|i| {
            let previous = filled[i.checked_sub(period)?]?;
            let current = filled[i]?;
            Some(100.0 * (current / previous - 1.0)).filter(|v| !v.is_nan())
        })
        .collect()
}

/// Apply [`percent_change_with`] to every row, keeping labels and columns.
pub fn variation_table(table: &SeriesTable, period: usize, gap_fill: GapFill) -> SeriesTable {
    let mut out = table.empty_like();
    out.rows = table
        .rows
        .iter()
        .map(|row| SeriesRow {
            label: row.label.clone(),
            attributes: row.attributes.clone(),
            values: percent_change_with(&row.values, period, gap_fill),
        })
        .collect();
    out
}

/// Compute one variation file in `data_dir` and return its filename.
///
/// The source split file must exist; a missing source is an error the caller
/// is expected to propagate. Index failures are logged and do not fail the call.
pub fn compute_variation(data_dir: &Path, request: &VariationRequest, label_column: &str) -> VariationResult<String> {
    let source_key = request.source_key();
    let source_name = codec::encode(&source_key);
    let source_path = data_dir.join(&source_name);
    if !source_path.is_file() {
        return Err(VariationError::MissingSource(source_path));
    }

    let table = read_series_csv(&source_path, label_column)?;
    let result = variation_table(&table, request.kind.period(), request.gap_fill);

    let target_key = source_key.with_variation(request.kind.variation_type());
    let output_name = variation_filename(&source_name, request.kind.variation_type());
    write_series_csv(&data_dir.join(&output_name), &result)?;

    let mut index = DataIndex::load(data_dir).unwrap_or_else(|e| {
        log_warning(format!("Cannot read {}: {}. Rebuilding it.", INDEX_FILE_NAME, e));
        DataIndex::new(data_dir)
    });
    index.upsert(output_name.clone(), target_key);
    if let Err(e) = index.save() {
        log_error(format!("Error writing {}: {}", INDEX_FILE_NAME, e));
    }

    log_success(format!(
        "Saved computed {} data for {} for {}",
        codec::variation_token(request.kind.variation_type()),
        request.index_type.label(),
        request.region.label()
    ));
    Ok(output_name)
}

/// Swap the `None` variation marker of a split filename for `variation`.
pub fn variation_filename(source_name: &str, variation: VariationType) -> String {
    let none = format!("_{}_", codec::variation_token(VariationType::None));
    let with = format!("_{}_", codec::variation_token(variation));
    match source_name.rfind(&none) {
        Some(pos) => format!("{}{}{}", &source_name[..pos], with, &source_name[pos + none.len()..]),
        None => source_name.to_string(),
    }
}

/// Year-over-year then month-over-month for every overseas region.
pub fn compute_default_variations(data_dir: &Path, label_column: &str) -> VariationResult<Vec<String>> {
    let mut written = Vec::new();
    for region in Region::OVERSEAS {
        for kind in VariationKind::ALL {
            written.push(compute_variation(data_dir, &VariationRequest::new(region, kind), label_column)?);
        }
    }
    Ok(written)
}
