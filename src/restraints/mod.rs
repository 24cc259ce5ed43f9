//! Extraction of resolved restraints from XPLOR restraint tables.
//!
//! Extraction parses a table with the restraint grammars, resolves the chain
//! of every selected atom with [`chains::FileChains`] and fills residue names
//! from a [`SequenceLookup`]. It is a pure function of its inputs.
//!
//! ## Example
//!
//! ```rust
//! use xplor_nef::core::types::SequenceLookup;
//! use xplor_nef::restraints::chains::ChainConfig;
//! use xplor_nef::restraints::extract_dihedrals;
//!
//! let table = "assign (resid 1 and name C) (resid 2 and name N) \
//!              (resid 2 and name CA) (resid 2 and name C) 1.0 -60.0 20.0 2";
//! let config = ChainConfig::new(vec!["A".to_string()], false);
//!
//! let restraints = extract_dihedrals(table, &config.for_file(0), &SequenceLookup::new()).unwrap();
//! assert_eq!(restraints[0].atoms[0].chain_code, "A");
//! ```

pub mod chains;

use thiserror::Error;
use tracing::debug;

use crate::core::restraint::{DihedralRestraint, DistanceRestraint};
use crate::core::types::{AtomLabel, SequenceLookup, UNKNOWN_RESIDUE_NAME};
use crate::parsing::error::GrammarParseError;
use crate::parsing::restraints::{ArityError, RestraintKind, TableError};
use crate::parsing::selection::{AtomSelector, Grammar, SelectionNode};
use chains::{ChainResolutionError, FileChains};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestraintError {
    #[error(transparent)]
    Grammar(#[from] GrammarParseError),

    #[error(transparent)]
    Arity(#[from] ArityError),

    #[error(transparent)]
    Chain(#[from] ChainResolutionError),
}

impl From<TableError> for RestraintError {
    fn from(error: TableError) -> Self {
        match error {
            TableError::Grammar(e) => Self::Grammar(e),
            TableError::Arity(e) => Self::Arity(e),
        }
    }
}

/// Extract dihedral restraints with the default grammar
///
/// # Errors
///
/// Returns `RestraintError::Grammar` or `RestraintError::Arity` if the table
/// does not parse, `RestraintError::Arity` if a selection does not name
/// exactly one atom, and `RestraintError::Chain` if an atom has no chain.
pub fn extract_dihedrals(
    text: &str,
    chains: &FileChains<'_>,
    lookup: &SequenceLookup,
) -> Result<Vec<DihedralRestraint>, RestraintError> {
    Extractor::new(chains, lookup).dihedrals(text)
}

/// Extract distance restraints with the default grammar
///
/// # Errors
///
/// Returns `RestraintError::Grammar` or `RestraintError::Arity` if the table
/// does not parse, `RestraintError::Arity` if a selection names no atoms, and
/// `RestraintError::Chain` if an atom has no chain.
pub fn extract_distances(
    text: &str,
    chains: &FileChains<'_>,
    lookup: &SequenceLookup,
) -> Result<Vec<DistanceRestraint>, RestraintError> {
    Extractor::new(chains, lookup).distances(text)
}

/// Extraction settings for one restraint file
pub struct Extractor<'c> {
    grammar: Grammar,
    chains: &'c FileChains<'c>,
    lookup: &'c SequenceLookup,
}

impl<'c> Extractor<'c> {
    #[must_use]
    pub fn new(chains: &'c FileChains<'c>, lookup: &'c SequenceLookup) -> Self {
        Self {
            grammar: Grammar::default(),
            chains,
            lookup,
        }
    }

    #[must_use]
    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = grammar;
        self
    }

    /// # Errors
    ///
    /// See [`extract_dihedrals`].
    pub fn dihedrals(&self, text: &str) -> Result<Vec<DihedralRestraint>, RestraintError> {
        let records = self.grammar.parse_dihedral_table(text)?;

        let mut restraints = Vec::with_capacity(records.len());
        for (i, record) in records.into_iter().enumerate() {
            let [a, b, c, d] = &record.selections;
            let single = |position: usize, node: &SelectionNode| {
                self.single_atom(record.line, position, node)
            };
            let atoms = [single(1, a)?, single(2, b)?, single(3, c)?, single(4, d)?];

            restraints.push(DihedralRestraint {
                id: i + 1,
                line: record.line,
                atoms,
                energy_constant: record.energy_constant,
                angle: record.angle,
                range: record.range,
                exponent: record.exponent,
            });
        }

        debug!(count = restraints.len(), "Extracted dihedral restraints");
        Ok(restraints)
    }

    /// # Errors
    ///
    /// See [`extract_distances`].
    pub fn distances(&self, text: &str) -> Result<Vec<DistanceRestraint>, RestraintError> {
        let records = self.grammar.parse_distance_table(text)?;

        let mut restraints = Vec::with_capacity(records.len());
        for (i, record) in records.into_iter().enumerate() {
            let [first, second] = &record.selections;
            let atoms = [
                self.non_empty(record.line, 1, first)?,
                self.non_empty(record.line, 2, second)?,
            ];

            restraints.push(DistanceRestraint {
                id: i + 1,
                line: record.line,
                atoms,
                target_value: record.target_value,
                first_bound: record.first_bound,
                second_bound: record.second_bound,
            });
        }

        debug!(count = restraints.len(), "Extracted distance restraints");
        Ok(restraints)
    }

    fn single_atom(
        &self,
        line: usize,
        position: usize,
        node: &SelectionNode,
    ) -> Result<AtomLabel, RestraintError> {
        let mut atoms = self.atom_set(node)?;
        if atoms.len() != 1 {
            return Err(ArityError {
                kind: RestraintKind::Dihedral,
                line,
                message: format!(
                    "selection {position} names {} atoms, expected exactly one",
                    atoms.len()
                ),
            }
            .into());
        }
        Ok(atoms.remove(0))
    }

    fn non_empty(
        &self,
        line: usize,
        position: usize,
        node: &SelectionNode,
    ) -> Result<Vec<AtomLabel>, RestraintError> {
        let atoms = self.atom_set(node)?;
        if atoms.is_empty() {
            return Err(ArityError {
                kind: RestraintKind::Distance,
                line,
                message: format!("selection {position} names 0 atoms"),
            }
            .into());
        }
        Ok(atoms)
    }

    /// Resolved atoms of a selection, in first-seen order without repeats.
    ///
    /// Leaves are resolved to labels before `and`/`or` are applied.
    fn atom_set(&self, node: &SelectionNode) -> Result<Vec<AtomLabel>, RestraintError> {
        match node {
            SelectionNode::Leaf(leaf) => {
                let mut atoms = Vec::with_capacity(leaf.atom_names.len());
                for selector in leaf.selectors() {
                    let label = self.label(selector)?;
                    if !atoms.contains(&label) {
                        atoms.push(label);
                    }
                }
                Ok(atoms)
            }
            SelectionNode::Or(left, right) => {
                let mut atoms = self.atom_set(left)?;
                for label in self.atom_set(right)? {
                    if !atoms.contains(&label) {
                        atoms.push(label);
                    }
                }
                Ok(atoms)
            }
            SelectionNode::And(left, right) => {
                let right = self.atom_set(right)?;
                Ok(self
                    .atom_set(left)?
                    .into_iter()
                    .filter(|label| right.contains(label))
                    .collect())
            }
        }
    }

    fn label(&self, selector: AtomSelector) -> Result<AtomLabel, RestraintError> {
        let chain_code = self.chains.resolve(selector.segment_id.as_deref())?;
        let residue_name = match self.lookup.get(&chain_code, selector.residue_number) {
            Some(name) => name.to_string(),
            None => {
                debug!(
                    chain = %chain_code,
                    residue = selector.residue_number,
                    "No residue name in sequence, using the unknown marker"
                );
                UNKNOWN_RESIDUE_NAME.to_string()
            }
        };

        Ok(AtomLabel {
            chain_code,
            sequence_code: selector.residue_number,
            residue_name,
            atom_name: selector.atom_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SequenceResidue;
    use chains::ChainConfig;

    const DIHEDRAL: &str = "assign (SEGID AAAA and resid 10 and name HA) \
        (SEGID BBBB and resid 11 and name CA) \
        (SEGID CCCC and resid 12 and name C) \
        (SEGID DDDD and resid 13 and name O) 1.234 4.567 7.891 2";

    fn no_chains() -> ChainConfig {
        ChainConfig::default()
    }

    #[test]
    fn test_end_to_end_dihedral() {
        let config = no_chains();
        let restraints =
            extract_dihedrals(DIHEDRAL, &config.for_file(0), &SequenceLookup::new()).unwrap();
        assert_eq!(restraints.len(), 1);

        let restraint = &restraints[0];
        assert_eq!(restraint.id, 1);
        let chains: Vec<&str> = restraint
            .atoms
            .iter()
            .map(|a| a.chain_code.as_str())
            .collect();
        assert_eq!(chains, vec!["AAAA", "BBBB", "CCCC", "DDDD"]);
        let numbers: Vec<i64> = restraint.atoms.iter().map(|a| a.sequence_code).collect();
        assert_eq!(numbers, vec![10, 11, 12, 13]);
        assert!(restraint
            .atoms
            .iter()
            .all(|a| a.residue_name == UNKNOWN_RESIDUE_NAME));
        assert!((restraint.energy_constant - 1.234).abs() < 1e-12);
        assert!((restraint.angle - 4.567).abs() < 1e-12);
        assert!((restraint.range - 7.891).abs() < 1e-12);
        assert_eq!(restraint.exponent, 2);
    }

    #[test]
    fn test_residue_names_come_from_lookup() {
        let lookup: SequenceLookup = vec![
            SequenceResidue::new("A", 1, "MET"),
            SequenceResidue::new("A", 2, "ALA"),
        ]
        .into_iter()
        .collect();
        let config = ChainConfig::new(vec!["A".to_string()], false);
        let text = "assign (resid 1 and name C) (resid 2 and name N) (resid 2 and name CA) (resid 3 and name N) 1 -60 20 2";

        let restraints = extract_dihedrals(text, &config.for_file(0), &lookup).unwrap();
        let names: Vec<&str> = restraints[0]
            .atoms
            .iter()
            .map(|a| a.residue_name.as_str())
            .collect();
        assert_eq!(names, vec!["MET", "ALA", "ALA", UNKNOWN_RESIDUE_NAME]);
    }

    #[test]
    fn test_override_chain_replaces_segids() {
        let config = ChainConfig::new(vec!["X".to_string()], true);
        let restraints =
            extract_dihedrals(DIHEDRAL, &config.for_file(0), &SequenceLookup::new()).unwrap();
        assert!(restraints[0].atoms.iter().all(|a| a.chain_code == "X"));
    }

    #[test]
    fn test_missing_chain_is_error() {
        let text = "assign (resid 1 and name HA) (resid 2 and name HA) 3.0 1.0 1.0";
        let config = no_chains();
        let err = extract_distances(text, &config.for_file(0), &SequenceLookup::new()).unwrap_err();
        assert!(matches!(err, RestraintError::Chain(_)));
        assert!(err.to_string().contains("i need a chain but none was provided"));
    }

    #[test]
    fn test_ambiguous_dihedral_selection_is_arity_error() {
        let text = "assign (resid 1 and (name C or name CA)) (resid 2 and name N) (resid 2 and name CA) (resid 2 and name C) 1 -60 20 2";
        let config = ChainConfig::new(vec!["A".to_string()], false);
        let err = extract_dihedrals(text, &config.for_file(0), &SequenceLookup::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "dihedral restraint at line 1: selection 1 names 2 atoms, expected exactly one"
        );
    }

    #[test]
    fn test_ambiguous_distance() {
        let text = "assign (segid A and resid 23 and (name HA or name HB)) (segid B and resid -4 and name HN) 3.5 1.7 0.5";
        let config = no_chains();
        let restraints =
            extract_distances(text, &config.for_file(0), &SequenceLookup::new()).unwrap();

        let restraint = &restraints[0];
        assert!(restraint.is_ambiguous());
        let names: Vec<&str> = restraint.atoms[0]
            .iter()
            .map(|a| a.atom_name.as_str())
            .collect();
        assert_eq!(names, vec!["HA", "HB"]);
        assert_eq!(restraint.atoms[1][0].chain_code, "B");
        assert_eq!(restraint.atoms[1][0].sequence_code, -4);
        assert!((restraint.first_bound - 1.7).abs() < 1e-12);
        assert!((restraint.second_bound - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_intersection_is_arity_error() {
        let text = "assign ((resid 1 and name HA) and (resid 2 and name HA)) (resid 3 and name HN) 3.0 1.0 1.0";
        let config = ChainConfig::new(vec!["A".to_string()], false);
        let err = extract_distances(text, &config.for_file(0), &SequenceLookup::new()).unwrap_err();
        assert!(matches!(err, RestraintError::Arity(_)));
        assert_eq!(
            err.to_string(),
            "distance restraint at line 1: selection 1 names 0 atoms"
        );
    }

    #[test]
    fn test_intersection_compares_resolved_chains() {
        let text = "assign ((segid A and resid 1 and name HA) and (resid 1 and name HA)) (resid 3 and name HN) 3.0 1.0 1.0";
        let config = ChainConfig::new(vec!["A".to_string()], false);
        let restraints =
            extract_distances(text, &config.for_file(0), &SequenceLookup::new()).unwrap();
        let first = &restraints[0].atoms[0];
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].to_string(), "A.1...HA");
    }

    #[test]
    fn test_empty_dihedral_selection_is_arity_error() {
        let text = "assign ((resid 1 and name C) and (resid 1 and name N)) (resid 2 and name N) (resid 2 and name CA) (resid 2 and name C) 1 -60 20 2";
        let config = ChainConfig::new(vec!["A".to_string()], false);
        let err = extract_dihedrals(text, &config.for_file(0), &SequenceLookup::new()).unwrap_err();
        assert!(err.to_string().contains("selection 1 names 0 atoms"));
    }

    #[test]
    fn test_trailing_garbage_fails_extraction() {
        let text = format!("{DIHEDRAL}\nassign (");
        let config = no_chains();
        let err = extract_dihedrals(&text, &config.for_file(0), &SequenceLookup::new()).unwrap_err();
        let RestraintError::Grammar(err) = err else {
            panic!("expected a grammar error");
        };
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_declared_chain_by_file_index() {
        let text = "assign (resid 5 and name HA) (resid 6 and name HA) 3.0 1.0 1.0";
        let config = ChainConfig::new(vec!["A".to_string(), "B".to_string()], false);
        for (index, expected) in ["A", "B"].iter().enumerate() {
            let restraints =
                extract_distances(text, &config.for_file(index), &SequenceLookup::new()).unwrap();
            assert_eq!(&restraints[0].atoms[0][0].chain_code, expected);
        }
    }

    #[test]
    fn test_custom_grammar() {
        let text = "assign (resid 5 and name HA) (resid 6 and name HA) 3.0 1.0 1.0 # note";
        let chains = FileChains::single(Some("A"), false);
        let lookup = SequenceLookup::new();
        let extractor =
            Extractor::new(&chains, &lookup).with_grammar(Grammar::new().with_comment_marker('#'));
        assert_eq!(extractor.distances(text).unwrap().len(), 1);
    }
}
