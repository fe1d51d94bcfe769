//! Cross-index of available parameter combinations.
//!
//! Given the keys of the files that exist, answer questions such as "which
//! regions have data for the first-quintile households?". Each dimension maps
//! every observed value to the sorted, distinct values of the four other
//! dimensions found alongside it.
//!
//! ```json
//! {
//!   "Region": {
//!     "Guadeloupe": {
//!       "HouseholdTypes": ["Ensemble des ménages"],
//!       "IndexTypes": ["IPC"],
//!       "Nomenclatures": ["NonNomenclature"],
//!       "VariationTypes": ["Glissement annuel", "None"]
//!     }
//!   }
//! }
//! ```

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::codec::{self, INDEX_FILE_NAME};
use crate::logs::log_warning;
use crate::models::SeriesKey;

/// The five filterable dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dimension {
    HouseholdType,
    Region,
    IndexType,
    VariationType,
    Nomenclature,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Self::HouseholdType,
        Self::Region,
        Self::IndexType,
        Self::VariationType,
        Self::Nomenclature,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::HouseholdType => "HouseholdType",
            Self::Region => "Region",
            Self::IndexType => "IndexType",
            Self::VariationType => "VariationType",
            Self::Nomenclature => "Nomenclature",
        }
    }

    /// Key used for this dimension inside another dimension's entry.
    pub fn plural(&self) -> &'static str {
        match self {
            Self::HouseholdType => "HouseholdTypes",
            Self::Region => "Regions",
            Self::IndexType => "IndexTypes",
            Self::VariationType => "VariationTypes",
            Self::Nomenclature => "Nomenclatures",
        }
    }

    /// Display value of this dimension in `key`.
    pub fn value_of<'a>(&self, key: &'a SeriesKey) -> &'a str {
        match self {
            Self::HouseholdType => key.household.label(),
            Self::Region => key.region.label(),
            Self::IndexType => key.index_type.label(),
            Self::VariationType => key.variation_type.label(),
            Self::Nomenclature => key.nomenclature.label(),
        }
    }
}

/// Companion values of one dimension value, keyed by plural dimension name.
pub type Companions = BTreeMap<&'static str, Vec<String>>;

/// Dimension name → value → companions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MappingTable {
    pub dimensions: BTreeMap<&'static str, BTreeMap<String, Companions>>,
}

impl MappingTable {
    /// Values of `other` found together with `value` of `dimension`.
    pub fn companions(&self, dimension: Dimension, value: &str, other: Dimension) -> Option<&[String]> {
        self.dimensions
            .get(dimension.name())?
            .get(value)?
            .get(other.plural())
            .map(Vec::as_slice)
    }

    /// Observed values of `dimension`, sorted.
    pub fn values(&self, dimension: Dimension) -> Vec<&str> {
        self.dimensions
            .get(dimension.name())
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Decode data filenames, skipping anything that is not a decodable `.csv`.
pub fn parse_filenames<S: AsRef<str>>(filenames: &[S]) -> Vec<SeriesKey> {
    filenames
        .iter()
        .map(|name| AsRef::<str>::as_ref(name))
        .filter(|name| name.ends_with(".csv"))
        .filter_map(|name| match codec::decode(name) {
            Ok(key) => Some(key),
            Err(e) => {
                log_warning(format!("{} in filename '{}'. Skipping.", e, name));
                None
            }
        })
        .collect()
}

/// Build the cross-index from a set of keys. Pure and deterministic.
pub fn build_mappings(keys: &[SeriesKey]) -> MappingTable {
    let mut sets: BTreeMap<Dimension, BTreeMap<String, BTreeMap<Dimension, BTreeSet<String>>>> = BTreeMap::new();

    for key in keys {
        for dimension in Dimension::ALL {
            let entry = sets
                .entry(dimension)
                .or_default()
                .entry(dimension.value_of(key).to_string())
                .or_default();
            for other in Dimension::ALL.into_iter().filter(|d| *d != dimension) {
                entry.entry(other).or_default().insert(other.value_of(key).to_string());
            }
        }
    }

    let dimensions = sets
        .into_iter()
        .map(|(dimension, values)| {
            let values: BTreeMap<String, Companions> = values
                .into_iter()
                .map(|(value, others)| {
                    let companions: Companions = others
                        .into_iter()
                        .map(|(other, set)| (other.plural(), set.into_iter().collect()))
                        .collect();
                    (value, companions)
                })
                .collect();
            (dimension.name(), values)
        })
        .collect();

    MappingTable { dimensions }
}

/// Names of the files in a data directory, sorted. The sidecar index is left out.
pub fn list_data_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name != INDEX_FILE_NAME)
        .collect();
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HouseholdType, Region};

    #[test]
    fn test_parse_filenames_skips_bad_entries() {
        let names = [
            "Ensemble_des_menages_Guadeloupe_IPC_None_NonNomenclature.csv",
            "README.md",
            "IPC_None_NonNomenclature.csv",
            "Ensemble_des_menages_Corse_IPC_None_NonNomenclature.csv",
            "Ensemble_des_menages_Mayotte_IPC_Glissement_annuel_Nomenclature.csv",
        ];
        let keys = parse_filenames(&names);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].region, Region::Guadeloupe);
        assert_eq!(keys[1].region, Region::Mayotte);
    }

    #[test]
    fn test_regions_differing_only_in_region() {
        let keys = parse_filenames(&[
            "Ensemble_des_menages_Guadeloupe_IPC_None_NonNomenclature.csv",
            "Ensemble_des_menages_La_Reunion_IPC_None_NonNomenclature.csv",
        ]);
        let table = build_mappings(&keys);

        let regions = table
            .companions(Dimension::HouseholdType, "Ensemble des ménages", Dimension::Region)
            .unwrap();
        assert_eq!(regions, ["Guadeloupe", "La Réunion"]);
        for (dimension, value) in [
            (Dimension::IndexType, "IPC"),
            (Dimension::VariationType, "None"),
            (Dimension::Nomenclature, "NonNomenclature"),
        ] {
            assert_eq!(
                table.companions(dimension, value, Dimension::Region).unwrap(),
                ["Guadeloupe", "La Réunion"]
            );
        }
        assert_eq!(table.values(Dimension::Region), vec!["Guadeloupe", "La Réunion"]);
    }

    #[test]
    fn test_entry_excludes_own_dimension() {
        let keys = vec![SeriesKey::default()];
        let table = build_mappings(&keys);
        let entry = &table.dimensions["Region"]["France"];
        assert_eq!(entry.len(), 4);
        assert!(!entry.contains_key("Regions"));
    }

    #[test]
    fn test_values_are_sorted_and_unique() {
        let mut keys = Vec::new();
        for household in [HouseholdType::UrbanWorker, HouseholdType::All, HouseholdType::UrbanWorker] {
            keys.push(SeriesKey {
                household,
                region: Region::Martinique,
                ..SeriesKey::default()
            });
        }
        let table = build_mappings(&keys);
        assert_eq!(
            table.companions(Dimension::Region, "Martinique", Dimension::HouseholdType).unwrap(),
            ["Ensemble des ménages", "Ménages urbains dont le chef est ouvrier ou employé"]
        );
    }

    #[test]
    fn test_empty_input() {
        let table = build_mappings(&[]);
        assert!(table.dimensions.is_empty());
        assert_eq!(table.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_json_shape() {
        let table = build_mappings(&[SeriesKey::default()]);
        let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        assert_eq!(json["Region"]["France"]["HouseholdTypes"][0], "Ensemble des ménages");
        assert_eq!(json["Nomenclature"]["NonNomenclature"]["VariationTypes"][0], "None");
    }

    #[test]
    fn test_list_data_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.csv"), "").unwrap();
        fs::write(dir.path().join(INDEX_FILE_NAME), "[]").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert_eq!(list_data_files(dir.path()).unwrap(), vec!["a.csv", "b.csv"]);
    }
}
