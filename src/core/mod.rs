//! Core data types shared by the parsers and restraint extraction.
//!
//! - [`SequenceResidue`](types::SequenceResidue): a residue of a chain from a topology source
//! - [`AtomLabel`](types::AtomLabel): a residue descriptor plus atom name
//! - [`SequenceLookup`](types::SequenceLookup): `(chain, sequence code) -> residue name`
//! - [`DihedralRestraint`](restraint::DihedralRestraint) and
//!   [`DistanceRestraint`](restraint::DistanceRestraint): resolved restraint records
//!
//! ## Residue Names
//!
//! A residue missing from the lookup is labelled with
//! [`UNKNOWN_RESIDUE_NAME`](types::UNKNOWN_RESIDUE_NAME) (`.`), never with a guess.

pub mod restraint;
pub mod types;
