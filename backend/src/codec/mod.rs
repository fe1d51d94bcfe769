//! Filename codec: series keys to and from data filenames.
//!
//! ```text
//! {Household}_{Region}_{IndexType}_{Variation|None}_{Nomenclature|NonNomenclature}.csv
//! ```
//!
//! Every part is ASCII-folded and whitespace becomes `_`, so word boundaries
//! between parts are lost. Decoding recovers them by matching the leading
//! tokens against the known household and region phrases, longest phrase
//! first, and by reading the variation and nomenclature from the tail.
//! The sidecar [`index`] records the structured key of every written file
//! for consumers that need an unambiguous catalog.

pub mod index;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::DecodeError;
use crate::models::{HouseholdType, IndexType, Nomenclature, Region, SeriesKey, VariationType};

pub use index::{DataIndex, IndexEntry, INDEX_FILE_NAME};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));

/// Fold accents, turn whitespace runs into `_` and drop anything outside
/// `[A-Za-z0-9_]`.
pub fn sanitize(value: &str) -> String {
    let ascii: String = value.nfd().filter(char::is_ascii).collect();
    let underscored = WHITESPACE.replace_all(&ascii, "_");
    DISALLOWED.replace_all(&underscored, "").into_owned()
}

/// Filename for a series key, `.csv` included.
pub fn encode(key: &SeriesKey) -> String {
    let raw = format!(
        "{}_{}_{}_{}_{}",
        key.household.label(),
        key.region.label(),
        key.index_type.label(),
        key.variation_type.label(),
        key.nomenclature.label()
    );
    format!("{}.csv", sanitize(&raw))
}

/// Filename token of a variation type (`None`, `Glissement_annuel`, ...).
pub fn variation_token(variation: VariationType) -> String {
    sanitize(variation.label())
}

/// Underscore tokens of a label once sanitized.
fn phrase_tokens(label: &str) -> Vec<String> {
    sanitize(label).split('_').map(String::from).collect()
}

/// Longest phrase first, so "France Metropolitaine" wins over "France".
fn by_word_count_desc<T: Copy>(values: &[T], label: impl Fn(T) -> &'static str) -> Vec<(T, Vec<String>)> {
    let mut phrases: Vec<(T, Vec<String>)> = values.iter().map(|&v| (v, phrase_tokens(label(v)))).collect();
    phrases.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    phrases
}

fn match_prefix<T: Copy>(tokens: &[&str], phrases: &[(T, Vec<String>)]) -> Option<(T, usize)> {
    phrases.iter().find_map(|(value, words)| {
        let matches = tokens.len() >= words.len() && tokens.iter().zip(words).all(|(t, w)| *t == w.as_str());
        matches.then_some((*value, words.len()))
    })
}

/// Recover the series key from a data filename.
pub fn decode(filename: &str) -> Result<SeriesKey, DecodeError> {
    let stem = filename.strip_suffix(".csv").ok_or(DecodeError::NotCsv)?;
    let tokens: Vec<&str> = stem.split('_').collect();
    let n = tokens.len();
    if n < 5 {
        return Err(DecodeError::TooFewTokens(n));
    }

    let nomenclature = Nomenclature::ALL
        .into_iter()
        .find(|nom| nom.label() == tokens[n - 1])
        .ok_or_else(|| DecodeError::UnknownNomenclature(tokens[n - 1].to_string()))?;

    let (variation_type, main) = if tokens[n - 2].eq_ignore_ascii_case("none") {
        (VariationType::None, &tokens[..n - 2])
    } else {
        let phrase = &tokens[n - 3..n - 1];
        let variation = VariationType::ALL
            .into_iter()
            .filter(|v| *v != VariationType::None)
            .find(|v| phrase_tokens(v.label()).iter().map(String::as_str).eq(phrase.iter().copied()))
            .ok_or_else(|| DecodeError::UnknownVariation(phrase.join(" ")))?;
        (variation, &tokens[..n - 3])
    };

    let households = by_word_count_desc(&HouseholdType::ALL, |h| h.label());
    let (household, used) = match_prefix(main, &households).ok_or(DecodeError::UnknownHousehold)?;
    let rest = &main[used..];

    let regions = by_word_count_desc(&Region::ALL, |r| r.label());
    let (region, used) = match_prefix(rest, &regions).ok_or(DecodeError::UnknownRegion)?;
    let index_tokens = &rest[used..];
    if index_tokens.is_empty() {
        return Err(DecodeError::MissingIndexType);
    }

    let joined = index_tokens.join("_");
    let index_type = IndexType::KNOWN
        .into_iter()
        .find(|t| sanitize(t.label()) == joined)
        .unwrap_or_else(|| IndexType::Other(index_tokens.join(" ")));

    Ok(SeriesKey {
        household,
        region,
        index_type,
        variation_type,
        nomenclature,
    })
}
