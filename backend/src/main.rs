//! ipc-split CLI - Split CPI exports into per-category CSV files
//!
//! # Main Commands
//!
//! ```bash
//! ipc-split run                      # Split then compute default variations
//! ipc-split split donnees_brutes.xlsx
//! ipc-split variations               # yoy + mom for the overseas regions
//! ipc-split variations --region Guyane --kind mom
//! ipc-split mappings -o mappings.json
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! ipc-split classify "Indice CVS des prix à la consommation - Guadeloupe"
//! ipc-split rules > rules.json       # Dump built-in classification rules
//! ```

use clap::{Parser, Subcommand};
use ipc_split::codec::sanitize;
use ipc_split::{
    run_default_variations, run_mappings, run_split, run_variations, GapFill, HouseholdType, IndexType, Nomenclature,
    PipelineConfig, Region, RuleSet, VariationKind, VariationRequest, DEFAULT_INPUT, DEFAULT_OUTPUT_DIR,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ipc-split")]
#[command(about = "Split French CPI spreadsheets into per-category CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the raw workbook into one CSV per category
    Split {
        /// Raw .xlsx/.csv input
        #[arg(env = "IPC_INPUT", default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "IPC_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// JSON classification rules replacing the built-in ones
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Compute variation files from split files
    Variations {
        /// Data directory
        #[arg(short, long, env = "IPC_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Regions (default: Guadeloupe, Guyane, La Réunion, Martinique)
        #[arg(long)]
        region: Vec<String>,

        /// Variation kinds: yoy, mom (default: both)
        #[arg(short, long)]
        kind: Vec<String>,

        /// Index type label
        #[arg(long, default_value = "IPC")]
        index_type: String,

        /// Household type label
        #[arg(long, default_value = "Ensemble des ménages")]
        household: String,

        /// Use the nomenclature split files
        #[arg(long)]
        nomenclature: bool,

        /// Leave gaps unfilled instead of carrying the last value forward
        #[arg(long)]
        no_fill: bool,
    },

    /// Build the parameter mapping table from the data directory
    Mappings {
        /// Data directory
        #[arg(short, long, env = "IPC_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Read keys from the sidecar index instead of decoding filenames
        #[arg(long)]
        from_index: bool,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Split, then compute the default variations
    Run {
        #[arg(env = "IPC_INPUT", default_value = DEFAULT_INPUT)]
        input: PathBuf,

        #[arg(short, long, env = "IPC_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Show how a label is classified
    Classify {
        label: String,

        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Print the built-in classification rules as JSON
    Rules,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    ipc_split::logs::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Split {
            input,
            output_dir,
            rules,
        } => cmd_split(input, output_dir, rules.as_deref()),

        Commands::Variations {
            output_dir,
            region,
            kind,
            index_type,
            household,
            nomenclature,
            no_fill,
        } => cmd_variations(output_dir, &region, &kind, &index_type, &household, nomenclature, no_fill),

        Commands::Mappings {
            output_dir,
            from_index,
            output,
        } => cmd_mappings(output_dir, from_index, output.as_deref()),

        Commands::Run {
            input,
            output_dir,
            rules,
        } => cmd_run(input, output_dir, rules.as_deref()),

        Commands::Classify { label, rules } => cmd_classify(&label, rules.as_deref()),

        Commands::Rules => cmd_rules(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn build_config(
    input: Option<PathBuf>,
    output_dir: PathBuf,
    rules: Option<&Path>,
) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::default().with_output_dir(output_dir);
    if let Some(input) = input {
        config = config.with_input(input);
    }
    if let Some(path) = rules {
        config = config.with_rules_file(path)?;
    }
    Ok(config)
}

fn cmd_split(input: PathBuf, output_dir: PathBuf, rules: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(Some(input), output_dir, rules)?;
    let report = run_split(&config)?;
    eprintln!(
        "📦 {} files in {} ({} rows excluded)",
        report.written.len(),
        config.output_dir.display(),
        report.rows_excluded
    );
    Ok(())
}

fn cmd_variations(
    output_dir: PathBuf,
    regions: &[String],
    kinds: &[String],
    index_type: &str,
    household: &str,
    nomenclature: bool,
    no_fill: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(None, output_dir, None)?;

    let regions: Vec<Region> = if regions.is_empty() {
        Region::OVERSEAS.to_vec()
    } else {
        regions
            .iter()
            .map(|name| Region::from_name(name).ok_or_else(|| format!("Unknown region: {}", name)))
            .collect::<Result<_, _>>()?
    };
    let kinds: Vec<VariationKind> = if kinds.is_empty() {
        VariationKind::ALL.to_vec()
    } else {
        kinds.iter().map(|k| k.parse()).collect::<Result<_, _>>()?
    };
    let household = parse_household(household)?;
    let gap_fill = if no_fill { GapFill::Strict } else { GapFill::Pad };

    let mut requests = Vec::new();
    for region in regions {
        for &kind in &kinds {
            requests.push(VariationRequest {
                index_type: IndexType::from_label(index_type),
                nomenclature: Nomenclature::from(nomenclature),
                household,
                gap_fill,
                ..VariationRequest::new(region, kind)
            });
        }
    }

    run_variations(&config, &requests)?;
    Ok(())
}

fn parse_household(name: &str) -> Result<HouseholdType, String> {
    let wanted = sanitize(name.trim()).to_lowercase();
    HouseholdType::ALL
        .into_iter()
        .find(|h| sanitize(h.label()).to_lowercase() == wanted)
        .ok_or_else(|| format!("Unknown household type: {}", name))
}

fn cmd_mappings(output_dir: PathBuf, from_index: bool, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(None, output_dir, None)?;
    let table = run_mappings(&config, from_index)?;
    write_output(&table.to_json()?, output)
}

fn cmd_run(input: PathBuf, output_dir: PathBuf, rules: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(Some(input), output_dir, rules)?;
    let report = run_split(&config)?;
    let variations = run_default_variations(&config)?;
    eprintln!(
        "✨ Done: {} split files, {} variation files",
        report.written.len(),
        variations.len()
    );
    Ok(())
}

fn cmd_classify(label: &str, rules: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let rules = match rules {
        Some(path) => RuleSet::from_json_file(path)?,
        None => RuleSet::default(),
    };
    let classification = rules.classify(label);
    println!("{}", serde_json::to_string_pretty(&classification)?);
    if classification.is_excluded() {
        eprintln!("⚠️  Excluded from output (base 100 or série arrêtée)");
    } else {
        eprintln!("📄 {}", ipc_split::encode(&classification.key()));
    }
    Ok(())
}

fn cmd_rules() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", RuleSet::default().to_json()?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
