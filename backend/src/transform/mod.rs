//! Transformation module.
//!
//! - Split: raw table to one file per series key
//! - Variation: percent change files derived from split files
//! - Mapping: cross-index of the available combinations
//! - Pipeline: high-level runs used by the CLI

pub mod mapping;
pub mod pipeline;
pub mod split;
pub mod variation;

pub use mapping::{build_mappings, list_data_files, parse_filenames, Dimension, MappingTable};
pub use pipeline::*;
pub use split::{group_rows, split_table, SplitReport};
pub use variation::{
    compute_default_variations, compute_variation, percent_change, percent_change_with, variation_filename, GapFill,
    VariationKind, VariationRequest,
};
