//! Distances command - import XPLOR distance restraint tables.
//!
//! Ambiguous restraints keep every atom their selections name. TSV output
//! expands them into one row per atom pair sharing the restraint id.

use std::path::PathBuf;

use clap::Args;

use crate::cli::input::read_inputs;
use crate::cli::{ChainArgs, OutputFormat};
use crate::core::restraint::{BoundsConvention, DistanceRestraint};
use crate::core::types::AtomLabel;
use crate::restraints::extract_distances;

/// How to turn the two trailing fields of a distance restraint into limits
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum BoundsMode {
    /// Report the fields as written, without limits
    #[default]
    Raw,
    /// Limits are target - first and target + second
    Delta,
    /// Limits are the two fields themselves
    Absolute,
}

impl BoundsMode {
    fn convention(self) -> Option<BoundsConvention> {
        match self {
            Self::Raw => None,
            Self::Delta => Some(BoundsConvention::Delta),
            Self::Absolute => Some(BoundsConvention::Absolute),
        }
    }
}

/// Arguments for the distances command
#[derive(Args)]
pub struct DistancesArgs {
    /// Distance restraint tables, in the same order as --chains
    /// Use '-' for stdin
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub chains: ChainArgs,

    /// How to read the two trailing fields of each restraint
    #[arg(long, value_enum, default_value = "raw")]
    pub bounds: BoundsMode,
}

struct FileRestraints {
    file: String,
    restraints: Vec<DistanceRestraint>,
}

/// Execute the distances command
///
/// # Errors
///
/// Returns an error if an input cannot be read, a table does not parse, or
/// an atom cannot be given a chain.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DistancesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.chains.chain_config();
    config.check_file_count(args.inputs.len())?;

    let lookup = args.chains.sequence_lookup(verbose)?;
    let inputs = read_inputs(&args.inputs)?;

    let mut files = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        let restraints = extract_distances(&input.text, &config.for_file(index), &lookup)
            .map_err(|e| anyhow::anyhow!("{}: {e}", input.name))?;
        if verbose {
            let ambiguous = restraints.iter().filter(|r| r.is_ambiguous()).count();
            eprintln!(
                "Read {} distance restraints ({ambiguous} ambiguous) from {}",
                restraints.len(),
                input.name
            );
        }
        files.push(FileRestraints {
            file: input.name,
            restraints,
        });
    }

    let convention = args.bounds.convention();
    match format {
        OutputFormat::Text => print_text_results(&files, convention),
        OutputFormat::Json => print_json_results(&files, convention)?,
        OutputFormat::Tsv => print_tsv_results(&files, convention),
    }

    Ok(())
}

fn print_text_results(files: &[FileRestraints], convention: Option<BoundsConvention>) {
    for file in files {
        println!("{}: {} distance restraints", file.file, file.restraints.len());
        for r in &file.restraints {
            let [first, second] = &r.atoms;
            let side = |atoms: &Vec<AtomLabel>| {
                atoms
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("|")
            };
            let limits = match convention {
                Some(convention) => {
                    let bounds = r.bounds(convention);
                    format!("limits {} to {}", bounds.lower, bounds.upper)
                }
                None => format!("bounds {} {}", r.first_bound, r.second_bound),
            };
            println!(
                "  {:>4}  {}  {}  target {}  {limits}",
                r.id,
                side(first),
                side(second),
                r.target_value
            );
        }
    }
}

fn print_json_results(
    files: &[FileRestraints],
    convention: Option<BoundsConvention>,
) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = files
        .iter()
        .map(|file| {
            let restraints: Vec<serde_json::Value> = file
                .restraints
                .iter()
                .map(|r| {
                    let mut json = serde_json::json!(r);
                    json["ambiguous"] = serde_json::json!(r.is_ambiguous());
                    if let Some(convention) = convention {
                        json["bounds"] = serde_json::json!(r.bounds(convention));
                    }
                    json
                })
                .collect();
            serde_json::json!({
                "file": file.file,
                "restraints": restraints,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(files: &[FileRestraints], convention: Option<BoundsConvention>) {
    println!(
        "file\trestraint_id\tline\t\
         chain_code_1\tsequence_code_1\tresidue_name_1\tatom_name_1\t\
         chain_code_2\tsequence_code_2\tresidue_name_2\tatom_name_2\t\
         target_value\tfirst_bound\tsecond_bound\tlower_limit\tupper_limit"
    );

    for file in files {
        for r in &file.restraints {
            let (lower, upper) = convention
                .map(|c| r.bounds(c))
                .map_or((String::new(), String::new()), |b| {
                    (b.lower.to_string(), b.upper.to_string())
                });
            for (a, b) in r.atom_pairs() {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{lower}\t{upper}",
                    file.file,
                    r.id,
                    r.line,
                    a.chain_code,
                    a.sequence_code,
                    a.residue_name,
                    a.atom_name,
                    b.chain_code,
                    b.sequence_code,
                    b.residue_name,
                    b.atom_name,
                    r.target_value,
                    r.first_bound,
                    r.second_bound,
                );
            }
        }
    }
}
