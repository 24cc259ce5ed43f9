use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Residue name used when the sequence lookup has no entry for a residue.
///
/// This is the exchange-format null marker; it is never replaced by a guessed name.
pub const UNKNOWN_RESIDUE_NAME: &str = ".";

/// A residue of a chain as declared by a topology or sequence source
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceResidue {
    pub chain_code: String,
    pub sequence_code: i64,
    pub residue_name: String,
}

impl SequenceResidue {
    pub fn new(
        chain_code: impl Into<String>,
        sequence_code: i64,
        residue_name: impl Into<String>,
    ) -> Self {
        Self {
            chain_code: chain_code.into(),
            sequence_code,
            residue_name: residue_name.into(),
        }
    }
}

impl std::fmt::Display for SequenceResidue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.chain_code, self.sequence_code, self.residue_name
        )
    }
}

/// A fully resolved atom reference: residue descriptor plus atom name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtomLabel {
    pub chain_code: String,
    pub sequence_code: i64,
    pub residue_name: String,
    /// Atom name exactly as written in the restraint file (wildcards included)
    pub atom_name: String,
}

impl AtomLabel {
    #[must_use]
    pub fn has_known_residue(&self) -> bool {
        self.residue_name != UNKNOWN_RESIDUE_NAME
    }
}

impl std::fmt::Display for AtomLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.chain_code, self.sequence_code, self.residue_name, self.atom_name
        )
    }
}

/// Read-only map from `(chain_code, sequence_code)` to residue name.
///
/// Built by the caller from an earlier sequence import (for example the
/// residues of a PSF file) and consulted while resolving restraint atoms.
#[derive(Debug, Clone, Default)]
pub struct SequenceLookup {
    chains: HashMap<String, HashMap<i64, String>>,
}

impl SequenceLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a residue; a later entry for the same key replaces the earlier one
    pub fn insert(&mut self, residue: SequenceResidue) {
        self.chains
            .entry(residue.chain_code)
            .or_default()
            .insert(residue.sequence_code, residue.residue_name);
    }

    #[must_use]
    pub fn get(&self, chain_code: &str, sequence_code: i64) -> Option<&str> {
        self.chains
            .get(chain_code)
            .and_then(|residues| residues.get(&sequence_code))
            .map(String::as_str)
    }

    /// Residue name for a key, or [`UNKNOWN_RESIDUE_NAME`] when absent
    #[must_use]
    pub fn residue_name(&self, chain_code: &str, sequence_code: i64) -> &str {
        self.get(chain_code, sequence_code)
            .unwrap_or(UNKNOWN_RESIDUE_NAME)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<SequenceResidue> for SequenceLookup {
    fn from_iter<I: IntoIterator<Item = SequenceResidue>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for residue in iter {
            lookup.insert(residue);
        }
        lookup
    }
}

impl<'a> FromIterator<&'a SequenceResidue> for SequenceLookup {
    fn from_iter<I: IntoIterator<Item = &'a SequenceResidue>>(iter: I) -> Self {
        iter.into_iter().cloned().collect()
    }
}
