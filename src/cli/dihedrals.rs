//! Dihedrals command - import XPLOR dihedral restraint tables.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::cli::input::read_inputs;
use crate::cli::{ChainArgs, OutputFormat};
use crate::core::restraint::DihedralRestraint;
use crate::restraints::extract_dihedrals;

/// Arguments for the dihedrals command
#[derive(Args)]
pub struct DihedralsArgs {
    /// Dihedral restraint tables, in the same order as --chains
    /// Use '-' for stdin
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub chains: ChainArgs,
}

#[derive(Serialize)]
struct FileRestraints {
    file: String,
    restraints: Vec<DihedralRestraint>,
}

/// Execute the dihedrals command
///
/// # Errors
///
/// Returns an error if an input cannot be read, a table does not parse, or
/// an atom cannot be given a chain.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DihedralsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.chains.chain_config();
    config.check_file_count(args.inputs.len())?;

    let lookup = args.chains.sequence_lookup(verbose)?;
    let inputs = read_inputs(&args.inputs)?;

    let mut files = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        let restraints = extract_dihedrals(&input.text, &config.for_file(index), &lookup)
            .map_err(|e| anyhow::anyhow!("{}: {e}", input.name))?;
        if verbose {
            eprintln!(
                "Read {} dihedral restraints from {}",
                restraints.len(),
                input.name
            );
        }
        files.push(FileRestraints {
            file: input.name,
            restraints,
        });
    }

    match format {
        OutputFormat::Text => print_text_results(&files),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
        OutputFormat::Tsv => print_tsv_results(&files),
    }

    Ok(())
}

fn print_text_results(files: &[FileRestraints]) {
    for file in files {
        println!("{}: {} dihedral restraints", file.file, file.restraints.len());
        for r in &file.restraints {
            let atoms: Vec<String> = r.atoms.iter().map(ToString::to_string).collect();
            println!(
                "  {:>4}  {}  angle {} +/- {}  k {}  exponent {}",
                r.id,
                atoms.join("  "),
                r.angle,
                r.range,
                r.energy_constant,
                r.exponent
            );
        }
    }
}

fn print_tsv_results(files: &[FileRestraints]) {
    let mut header = vec!["file".to_string(), "restraint_id".into(), "line".into()];
    for i in 1..=4 {
        for column in ["chain_code", "sequence_code", "residue_name", "atom_name"] {
            header.push(format!("{column}_{i}"));
        }
    }
    header.extend(
        [
            "energy_constant",
            "angle",
            "range",
            "exponent",
            "lower_limit",
            "upper_limit",
        ]
        .map(String::from),
    );
    println!("{}", header.join("\t"));

    for file in files {
        for r in &file.restraints {
            let mut row = vec![file.file.clone(), r.id.to_string(), r.line.to_string()];
            for atom in &r.atoms {
                row.push(atom.chain_code.clone());
                row.push(atom.sequence_code.to_string());
                row.push(atom.residue_name.clone());
                row.push(atom.atom_name.clone());
            }
            let bounds = r.bounds();
            row.extend([
                r.energy_constant.to_string(),
                r.angle.to_string(),
                r.range.to_string(),
                r.exponent.to_string(),
                bounds.lower.to_string(),
                bounds.upper.to_string(),
            ]);
            println!("{}", row.join("\t"));
        }
    }
}
