//! Label classification.
//!
//! Each dimension is an ordered list of `(pattern, value)` rules with an
//! explicit default. A rule matches when its pattern occurs in the label,
//! ignoring case; every matching rule assigns its value, so the last match in
//! the list wins. Dimensions never influence each other.
//!
//! The built-in tables live in [`RuleSet::default`]; a JSON file with the same
//! shape can replace them (see [`RuleSet::from_json_file`]).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::models::{HouseholdType, IndexType, Nomenclature, Region, SeriesKey, VariationType};

/// Case-insensitive substring test.
fn contains_ignore_case(haystack_lower: &str, pattern: &str) -> bool {
    haystack_lower.contains(&pattern.to_lowercase())
}

/// One pattern and the value it assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule<T> {
    pub pattern: String,
    pub value: T,
}

impl<T> Rule<T> {
    pub fn new(pattern: impl Into<String>, value: T) -> Self {
        Self {
            pattern: pattern.into(),
            value,
        }
    }
}

/// Ordered rules for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRules<T> {
    pub default: T,
    pub rules: Vec<Rule<T>>,
}

impl<T: Clone> DimensionRules<T> {
    /// Value of the last matching rule, or the default.
    fn resolve(&self, label_lower: &str) -> T {
        self.rules
            .iter()
            .rev()
            .find(|rule| contains_ignore_case(label_lower, &rule.pattern))
            .map(|rule| rule.value.clone())
            .unwrap_or_else(|| self.default.clone())
    }
}

/// Patterns for the independent boolean flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagRules {
    pub nomenclature: Vec<String>,
    pub base_100: Vec<String>,
    pub serie_arretee: Vec<String>,
}

/// Complete classification tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub household: DimensionRules<HouseholdType>,
    pub region: DimensionRules<Region>,
    pub index_type: DimensionRules<IndexType>,
    pub variation_type: DimensionRules<VariationType>,
    pub flags: FlagRules,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            household: DimensionRules {
                default: HouseholdType::All,
                rules: vec![
                    Rule::new(
                        "Ménages urbains dont le chef est ouvrier ou employé",
                        HouseholdType::UrbanWorker,
                    ),
                    Rule::new(
                        "Ménages du premier quintile de la distribution des niveaux de vie",
                        HouseholdType::FirstQuintile,
                    ),
                ],
            },
            region: DimensionRules {
                default: Region::France,
                rules: vec![
                    Rule::new("Mayotte", Region::Mayotte),
                    Rule::new("Guadeloupe", Region::Guadeloupe),
                    Rule::new("Martinique", Region::Martinique),
                    Rule::new("La Réunion", Region::LaReunion),
                    Rule::new("Guyane", Region::Guyane),
                    Rule::new("France métropolitaine", Region::FranceMetropolitaine),
                ],
            },
            index_type: DimensionRules {
                default: IndexType::Ipc,
                rules: vec![
                    Rule::new("Indice CVS des prix à la consommation", IndexType::SeasonallyAdjusted),
                    Rule::new("Indice d'inflation sous-jacente", IndexType::UnderlyingInflation),
                    Rule::new("Secteurs conjoncturels", IndexType::CyclicalSectors),
                ],
            },
            variation_type: DimensionRules {
                default: VariationType::None,
                rules: vec![
                    Rule::new("Glissement annuel", VariationType::YearOverYear),
                    Rule::new("Variations mensuelles", VariationType::MonthOverMonth),
                ],
            },
            flags: FlagRules {
                nomenclature: vec!["nomenclature".into()],
                base_100: vec!["base 100".into()],
                serie_arretee: vec!["série arrêtée".into()],
            },
        }
    }
}

impl RuleSet {
    /// Load rules from a JSON file shaped like the serialized default.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Classify one label. Never fails; unmatched dimensions get defaults.
    pub fn classify(&self, label: &str) -> Classification {
        let lower = label.to_lowercase();
        let any = |patterns: &[String]| patterns.iter().any(|p| contains_ignore_case(&lower, p));

        Classification {
            household: self.household.resolve(&lower),
            region: self.region.resolve(&lower),
            index_type: self.index_type.resolve(&lower),
            variation_type: self.variation_type.resolve(&lower),
            is_nomenclature: any(&self.flags.nomenclature),
            is_base_100: any(&self.flags.base_100),
            is_serie_arretee: any(&self.flags.serie_arretee),
        }
    }
}

/// Everything the classifier infers from one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub household: HouseholdType,
    pub region: Region,
    pub index_type: IndexType,
    pub variation_type: VariationType,
    pub is_nomenclature: bool,
    pub is_base_100: bool,
    pub is_serie_arretee: bool,
}

impl Classification {
    /// Base-100 and frozen series never reach an output file.
    pub fn is_excluded(&self) -> bool {
        self.is_base_100 || self.is_serie_arretee
    }

    /// Output file key for the row.
    pub fn key(&self) -> SeriesKey {
        SeriesKey {
            household: self.household,
            region: self.region,
            index_type: self.index_type.clone(),
            variation_type: self.variation_type,
            nomenclature: Nomenclature::from(self.is_nomenclature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_example() {
        let rules = RuleSet::default();
        let c = rules.classify(
            "Indice CVS des prix à la consommation - Ménages urbains dont le chef est ouvrier ou employé - Guadeloupe",
        );
        assert_eq!(c.index_type.label(), "Indice CVS des prix à la consommation");
        assert_eq!(c.household.label(), "Ménages urbains dont le chef est ouvrier ou employé");
        assert_eq!(c.region.label(), "Guadeloupe");
        assert_eq!(c.variation_type, VariationType::None);
        assert!(!c.is_nomenclature);
        assert!(!c.is_excluded());
    }

    #[test]
    fn test_urban_worker_case_insensitive() {
        let rules = RuleSet::default();
        let labels = [
            "ménages urbains dont le chef est ouvrier ou employé - Martinique",
            "IPC - MÉNAGES URBAINS DONT LE CHEF EST OUVRIER OU EMPLOYÉ",
            "Indice - Ménages Urbains Dont Le Chef Est Ouvrier Ou Employé - Nomenclature Coicop",
        ];
        for label in labels {
            assert_eq!(rules.classify(label).household, HouseholdType::UrbanWorker, "{label}");
        }
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let c = RuleSet::default().classify("Indice des prix - Ensemble");
        assert_eq!(c.household, HouseholdType::All);
        assert_eq!(c.region, Region::France);
        assert_eq!(c.index_type, IndexType::Ipc);
        assert_eq!(c.variation_type, VariationType::None);
        assert!(!c.is_nomenclature && !c.is_base_100 && !c.is_serie_arretee);
    }

    #[test]
    fn test_later_rule_wins_within_dimension() {
        let rules = RuleSet::default();
        // Both variation phrases: the later rule (monthly) wins.
        let c = rules.classify("Glissement annuel et Variations mensuelles - Guyane");
        assert_eq!(c.variation_type, VariationType::MonthOverMonth);
        // "France métropolitaine" is listed after the overseas regions.
        let c = rules.classify("Guadeloupe comparée à la France métropolitaine");
        assert_eq!(c.region, Region::FranceMetropolitaine);
    }

    #[test]
    fn test_flags_are_independent() {
        let c = RuleSet::default().classify("IPC - Nomenclature Coicop - base 100 en 2015 - Série arrêtée");
        assert!(c.is_nomenclature);
        assert!(c.is_base_100);
        assert!(c.is_serie_arretee);
        assert!(c.is_excluded());
        assert_eq!(c.key().nomenclature, Nomenclature::Detailed);
    }

    #[test]
    fn test_rules_json_roundtrip() {
        let rules = RuleSet::default();
        let json = rules.to_json().unwrap();
        assert!(json.contains("La Réunion"));
        let back: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rules);
    }

    #[test]
    fn test_custom_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut rules = RuleSet::default();
        rules.region.rules.push(Rule::new("Saint-Martin", Region::Guadeloupe));
        let path = dir.path().join("rules.json");
        std::fs::write(&path, rules.to_json().unwrap()).unwrap();

        let loaded = RuleSet::from_json_file(&path).unwrap();
        assert_eq!(loaded.classify("IPC - Saint-Martin").region, Region::Guadeloupe);
        assert!(RuleSet::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
