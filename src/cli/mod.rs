//! Command-line interface for xplor-nef.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **dihedrals**: Import XPLOR dihedral restraint tables
//! - **distances**: Import XPLOR distance restraint tables
//! - **psf**: List the residues of a PSF topology file
//!
//! ## Usage
//!
//! ```text
//! # Dihedral restraints, one declared chain per file
//! xplor-nef dihedrals phi.tbl psi.tbl --chains A,B
//!
//! # Distance restraints with residue names from a PSF file
//! xplor-nef distances noe.tbl --chains A --psf protein.psf --format tsv
//!
//! # Read a table from stdin
//! cat noe.tbl | xplor-nef distances - --chains A
//!
//! # Residues of a topology file as JSON
//! xplor-nef psf protein.psf --format json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::types::SequenceLookup;
use crate::parsing::psf::parse_psf_file;
use crate::restraints::chains::{parse_chain_codes, ChainConfig, ExtraChains};

pub mod dihedrals;
pub mod distances;
pub mod input;
pub mod psf;

#[derive(Parser)]
#[command(name = "xplor-nef")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Import XPLOR restraint tables and PSF topology files")]
#[command(
    long_about = "xplor-nef reads XPLOR dihedral and distance restraint tables and PSF topology files.\n\nEvery restrained atom is resolved to a chain code, sequence code, residue name and atom name:\n- Chain codes come from the selection's segid or the chain declared for the file\n- Residue names come from a PSF file when one is given, '.' otherwise\n- Ambiguous distance selections keep every atom they name"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import dihedral restraint tables
    Dihedrals(dihedrals::DihedralsArgs),

    /// Import distance restraint tables
    Distances(distances::DistancesArgs),

    /// List the residues of a PSF topology file
    Psf(psf::PsfArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Chain and sequence options shared by the restraint commands
#[derive(Args)]
pub struct ChainArgs {
    /// Chain code for each restraint file, in file order (comma separated or repeated)
    #[arg(short, long)]
    pub chains: Vec<String>,

    /// Use the declared chain even when a selection names a segid
    #[arg(long)]
    pub use_chains: bool,

    /// Fail when more chains are declared than there are restraint files
    #[arg(long)]
    pub reject_extra_chains: bool,

    /// PSF topology file supplying residue names
    #[arg(long)]
    pub psf: Option<PathBuf>,
}

impl ChainArgs {
    #[must_use]
    pub fn chain_config(&self) -> ChainConfig {
        let extra_chains = if self.reject_extra_chains {
            ExtraChains::Reject
        } else {
            ExtraChains::Ignore
        };
        ChainConfig::new(parse_chain_codes(&self.chains), self.use_chains)
            .with_extra_chains(extra_chains)
    }

    /// Residue names from `--psf`, or an empty lookup
    ///
    /// # Errors
    ///
    /// Returns an error if the PSF file cannot be read or parsed.
    pub fn sequence_lookup(&self, verbose: bool) -> anyhow::Result<SequenceLookup> {
        let Some(path) = &self.psf else {
            return Ok(SequenceLookup::new());
        };

        let residues = parse_psf_file(path)?;
        if verbose {
            eprintln!(
                "Loaded {} residues from {}",
                residues.len(),
                path.display()
            );
        }
        Ok(residues.into_iter().collect())
    }
}
