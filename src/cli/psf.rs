//! Psf command - list the residues of a PSF topology file.

use std::path::PathBuf;

use clap::Args;

use crate::cli::input::read_input;
use crate::cli::OutputFormat;
use crate::core::types::SequenceResidue;
use crate::parsing::psf::parse_psf_text;

#[derive(Args)]
pub struct PsfArgs {
    /// PSF topology file
    /// Use '-' for stdin
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Execute the psf command
///
/// # Errors
///
/// Returns an error if the input cannot be read or is not a valid PSF file.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PsfArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let input = read_input(&args.input)?;
    let residues = parse_psf_text(&input.text, &input.name)?;

    if verbose {
        let mut chains: Vec<&str> = residues.iter().map(|r| r.chain_code.as_str()).collect();
        chains.dedup();
        eprintln!(
            "Parsed {} residues in {} chains from {}",
            residues.len(),
            chains.len(),
            input.name
        );
    }

    match format {
        OutputFormat::Text => print_text_results(&residues),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&residues)?),
        OutputFormat::Tsv => print_tsv_results(&residues),
    }

    Ok(())
}

fn print_text_results(residues: &[SequenceResidue]) {
    for residue in residues {
        println!("{residue}");
    }
}

fn print_tsv_results(residues: &[SequenceResidue]) {
    println!("chain_code\tsequence_code\tresidue_name");
    for r in residues {
        println!("{}\t{}\t{}", r.chain_code, r.sequence_code, r.residue_name);
    }
}
