//! Domain models for the CPI splitting pipeline.
//!
//! - [`HouseholdType`], [`Region`], [`IndexType`], [`VariationType`],
//!   [`Nomenclature`] - the five categorical dimensions of a series
//! - [`SeriesKey`] - one combination of the five dimensions (one output file)
//! - [`SeriesTable`] - labelled rows of monthly values, as read or written

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Household Type
// =============================================================================

/// Household population the index is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HouseholdType {
    #[default]
    #[serde(rename = "Ensemble des ménages")]
    All,
    #[serde(rename = "Ménages urbains dont le chef est ouvrier ou employé")]
    UrbanWorker,
    #[serde(rename = "Ménages du premier quintile de la distribution des niveaux de vie")]
    FirstQuintile,
}

impl HouseholdType {
    pub const ALL: [HouseholdType; 3] = [Self::All, Self::UrbanWorker, Self::FirstQuintile];

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "Ensemble des ménages",
            Self::UrbanWorker => "Ménages urbains dont le chef est ouvrier ou employé",
            Self::FirstQuintile => "Ménages du premier quintile de la distribution des niveaux de vie",
        }
    }
}

// =============================================================================
// Region
// =============================================================================

/// Geographic coverage. Labels are title-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Region {
    Mayotte,
    Guadeloupe,
    Martinique,
    #[serde(rename = "La Réunion")]
    LaReunion,
    Guyane,
    #[serde(rename = "France Métropolitaine")]
    FranceMetropolitaine,
    #[default]
    France,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Self::Mayotte,
        Self::Guadeloupe,
        Self::Martinique,
        Self::LaReunion,
        Self::Guyane,
        Self::FranceMetropolitaine,
        Self::France,
    ];

    /// Overseas departments the batch variation run covers.
    pub const OVERSEAS: [Region; 4] = [Self::Guadeloupe, Self::Guyane, Self::LaReunion, Self::Martinique];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mayotte => "Mayotte",
            Self::Guadeloupe => "Guadeloupe",
            Self::Martinique => "Martinique",
            Self::LaReunion => "La Réunion",
            Self::Guyane => "Guyane",
            Self::FranceMetropolitaine => "France Métropolitaine",
            Self::France => "France",
        }
    }

    /// Parse a region name, ignoring case and accents.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = crate::codec::sanitize(name.trim()).to_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| crate::codec::sanitize(r.label()).to_lowercase() == wanted)
    }
}

// =============================================================================
// Index Type
// =============================================================================

/// Kind of price index.
///
/// `Other` only appears when decoding a filename whose index part matches no
/// known index type; it keeps the decoded words verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexType {
    #[default]
    #[serde(rename = "IPC")]
    Ipc,
    #[serde(rename = "Indice CVS des prix à la consommation")]
    SeasonallyAdjusted,
    #[serde(rename = "Indice d'inflation sous-jacente")]
    UnderlyingInflation,
    #[serde(rename = "Secteurs conjoncturels")]
    CyclicalSectors,
    #[serde(untagged)]
    Other(String),
}

impl IndexType {
    pub const KNOWN: [IndexType; 4] = [
        Self::Ipc,
        Self::SeasonallyAdjusted,
        Self::UnderlyingInflation,
        Self::CyclicalSectors,
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::Ipc => "IPC",
            Self::SeasonallyAdjusted => "Indice CVS des prix à la consommation",
            Self::UnderlyingInflation => "Indice d'inflation sous-jacente",
            Self::CyclicalSectors => "Secteurs conjoncturels",
            Self::Other(text) => text,
        }
    }

    /// Known index type with this label, or `Other`.
    pub fn from_label(label: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|t| t.label() == label)
            .unwrap_or_else(|| Self::Other(label.to_string()))
    }
}

// =============================================================================
// Variation Type
// =============================================================================

/// Which transformation the values carry. `None` means index levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VariationType {
    #[default]
    None,
    #[serde(rename = "Glissement annuel")]
    YearOverYear,
    #[serde(rename = "Variations mensuelles")]
    MonthOverMonth,
}

impl VariationType {
    pub const ALL: [VariationType; 3] = [Self::None, Self::YearOverYear, Self::MonthOverMonth];

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::YearOverYear => "Glissement annuel",
            Self::MonthOverMonth => "Variations mensuelles",
        }
    }
}

// =============================================================================
// Nomenclature
// =============================================================================

/// Whether the series belongs to a nomenclature breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Nomenclature {
    #[serde(rename = "Nomenclature")]
    Detailed,
    #[default]
    #[serde(rename = "NonNomenclature")]
    Aggregate,
}

impl Nomenclature {
    pub const ALL: [Nomenclature; 2] = [Self::Detailed, Self::Aggregate];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Detailed => "Nomenclature",
            Self::Aggregate => "NonNomenclature",
        }
    }

    pub fn is_nomenclature(&self) -> bool {
        matches!(self, Self::Detailed)
    }
}

impl From<bool> for Nomenclature {
    fn from(is_nomenclature: bool) -> Self {
        if is_nomenclature {
            Self::Detailed
        } else {
            Self::Aggregate
        }
    }
}

// =============================================================================
// Series Key
// =============================================================================

/// The five-part category tuple identifying one output file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeriesKey {
    #[serde(rename = "HouseholdType")]
    pub household: HouseholdType,
    pub region: Region,
    pub index_type: IndexType,
    pub variation_type: VariationType,
    pub nomenclature: Nomenclature,
}

impl SeriesKey {
    /// Same key with another variation type.
    pub fn with_variation(&self, variation_type: VariationType) -> Self {
        Self {
            variation_type,
            ..self.clone()
        }
    }

    fn sort_key(&self) -> (&str, &str, &str, &str, bool) {
        (
            self.household.label(),
            self.region.label(),
            self.index_type.label(),
            self.variation_type.label(),
            self.nomenclature.is_nomenclature(),
        )
    }
}

/// Keys order by their display labels, the order output groups are written in.
impl Ord for SeriesKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for SeriesKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {} / {}",
            self.household.label(),
            self.region.label(),
            self.index_type.label(),
            self.variation_type.label(),
            self.nomenclature.label()
        )
    }
}

// =============================================================================
// Series Table
// =============================================================================

/// One labelled series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    /// The `Libellé` text.
    pub label: String,
    /// Extra text columns carried through untouched, aligned with
    /// [`SeriesTable::attributes`].
    pub attributes: Vec<String>,
    /// One value per period column; `None` when missing or not numeric.
    pub values: Vec<Option<f64>>,
}

/// A table of series sharing the same period columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    /// Header of the label column.
    pub label_column: String,
    /// Headers of non-period columns kept from the source.
    pub attributes: Vec<String>,
    /// Period column headers (`YYYY-MM`) in source order.
    pub periods: Vec<String>,
    pub rows: Vec<SeriesRow>,
}

impl SeriesTable {
    pub fn new(label_column: impl Into<String>, attributes: Vec<String>, periods: Vec<String>) -> Self {
        Self {
            label_column: label_column.into(),
            attributes,
            periods,
            rows: Vec::new(),
        }
    }

    /// Empty table with the same columns.
    pub fn empty_like(&self) -> Self {
        Self::new(self.label_column.clone(), self.attributes.clone(), self.periods.clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
