//! # xplor-nef
//!
//! A library for importing XPLOR NMR restraint tables and PSF topology files.
//!
//! XPLOR restraint tables name atoms with selection expressions such as
//! `(segid A and resid 23 and name HA)`. To exchange them as NEF style
//! records every atom needs a chain code, a sequence code, a residue name and
//! an atom name. `xplor-nef` parses the tables, resolves chain codes from the
//! selections and the declared chains, and fills residue names from a
//! sequence, typically one read from a PSF file.
//!
//! ## Features
//!
//! - **Selection grammar**: nested `and`/`or` selections with precise error positions
//! - **Dihedral tables**: four single-atom selections plus four numeric fields
//! - **Distance tables**: two atom sets (ambiguity kept) plus three numeric fields
//! - **Chain policy**: per-file declared chains, optional override of embedded segids
//! - **PSF topology**: strict parsing of the atom block into sorted residues
//!
//! ## Example
//!
//! ```rust
//! use xplor_nef::{extract_distances, ChainConfig, SequenceLookup, SequenceResidue};
//!
//! let lookup: SequenceLookup = vec![SequenceResidue::new("A", 5, "LEU")].into_iter().collect();
//! let config = ChainConfig::new(vec!["A".to_string()], false);
//!
//! let table = "assign (resid 5 and name HA) (resid 6 and name HN) 3.0 1.2 0.8";
//! let restraints = extract_distances(table, &config.for_file(0), &lookup).unwrap();
//!
//! let [first, second] = &restraints[0].atoms;
//! assert_eq!(first[0].to_string(), "A.5.LEU.HA");
//! assert_eq!(second[0].residue_name, ".");
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Residue, atom and restraint types
//! - [`parsing`]: Tokenizer, selection and restraint grammars, PSF parser
//! - [`restraints`]: Chain resolution and restraint extraction
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod parsing;
pub mod restraints;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::restraint::{Bounds, BoundsConvention, DihedralRestraint, DistanceRestraint};
pub use core::types::*;
pub use parsing::error::GrammarParseError;
pub use parsing::psf::{parse_psf_file, parse_psf_text, PsfError};
pub use parsing::selection::{Grammar, SelectionNode};
pub use restraints::chains::{ChainConfig, ChainResolutionError, ExtraChains};
pub use restraints::{extract_dihedrals, extract_distances, RestraintError};
