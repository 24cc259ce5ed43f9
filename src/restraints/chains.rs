//! Chain resolution for restraint files.
//!
//! Each restraint file has at most one declared chain, taken by position from
//! the configured chain list. For every selection the chain code is chosen as:
//!
//! 1. the declared chain, when `use_chains` is set;
//! 2. otherwise the selection's own `segid`, verbatim;
//! 3. otherwise the declared chain.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainResolutionError {
    #[error("i need a chain but none was provided (restraint file {file_number} has selections without a segid and no chain was declared for it)")]
    Missing { file_number: usize },

    #[error("i need a chain but none was provided (restraint file {file_number} has no declared chain to override segids with)")]
    MissingOverride { file_number: usize },

    #[error("{declared} chains were declared but there are only {files} restraint files")]
    ExtraChains { declared: usize, files: usize },
}

/// What to do when more chains are declared than there are restraint files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraChains {
    /// Log a warning and ignore the surplus chains
    #[default]
    Ignore,
    /// Fail with [`ChainResolutionError::ExtraChains`]
    Reject,
}

/// Chain options for one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Declared chain codes, one per restraint file in order
    pub chains: Vec<String>,
    /// Use the declared chain even when a selection carries a segid
    pub use_chains: bool,
    pub extra_chains: ExtraChains,
}

impl ChainConfig {
    pub fn new(chains: Vec<String>, use_chains: bool) -> Self {
        Self {
            chains,
            use_chains,
            extra_chains: ExtraChains::default(),
        }
    }

    #[must_use]
    pub fn with_extra_chains(mut self, extra_chains: ExtraChains) -> Self {
        self.extra_chains = extra_chains;
        self
    }

    /// Check the declared chain count against the number of restraint files
    ///
    /// # Errors
    ///
    /// Returns `ChainResolutionError::ExtraChains` when there are more chains
    /// than files and the policy is [`ExtraChains::Reject`].
    pub fn check_file_count(&self, files: usize) -> Result<(), ChainResolutionError> {
        let declared = self.chains.len();
        if declared <= files {
            return Ok(());
        }
        match self.extra_chains {
            ExtraChains::Ignore => {
                warn!(
                    declared,
                    files,
                    ignored = ?&self.chains[files..],
                    "More chains declared than restraint files, ignoring the extra chains"
                );
                Ok(())
            }
            ExtraChains::Reject => Err(ChainResolutionError::ExtraChains { declared, files }),
        }
    }

    /// Resolution context for the restraint file at `file_index` (0-based)
    #[must_use]
    pub fn for_file(&self, file_index: usize) -> FileChains<'_> {
        FileChains {
            file_number: file_index + 1,
            declared: self.chains.get(file_index).map(String::as_str),
            use_chains: self.use_chains,
        }
    }
}

/// Chain resolution state for a single restraint file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileChains<'a> {
    file_number: usize,
    declared: Option<&'a str>,
    use_chains: bool,
}

impl<'a> FileChains<'a> {
    /// Context for a lone file with an optional declared chain
    #[must_use]
    pub fn single(declared: Option<&'a str>, use_chains: bool) -> Self {
        Self {
            file_number: 1,
            declared,
            use_chains,
        }
    }

    #[must_use]
    pub fn declared(&self) -> Option<&'a str> {
        self.declared
    }

    /// Chain code for a selection with the given embedded segment id
    ///
    /// # Errors
    ///
    /// Returns `ChainResolutionError` when the rules yield no chain: no
    /// declared chain for this file together with `use_chains` or a
    /// selection without a segid.
    pub fn resolve(&self, segment_id: Option<&str>) -> Result<String, ChainResolutionError> {
        let file_number = self.file_number;
        if self.use_chains {
            return self
                .declared
                .map(str::to_string)
                .ok_or(ChainResolutionError::MissingOverride { file_number });
        }
        segment_id
            .or(self.declared)
            .map(str::to_string)
            .ok_or(ChainResolutionError::Missing { file_number })
    }
}

/// Split chain code arguments on commas and whitespace.
///
/// `["A,B", "C D"]` gives `["A", "B", "C", "D"]`; empty pieces are dropped.
#[must_use]
pub fn parse_chain_codes<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| {
            value
                .as_ref()
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chains: &[&str], use_chains: bool) -> ChainConfig {
        ChainConfig::new(chains.iter().map(|c| (*c).to_string()).collect(), use_chains)
    }

    #[test]
    fn test_segid_wins_without_override() {
        let config = config(&["A"], false);
        let chains = config.for_file(0);
        assert_eq!(chains.resolve(Some("AAAA")).unwrap(), "AAAA");
    }

    #[test]
    fn test_declared_chain_used_without_segid() {
        let config = config(&["A", "B"], false);
        assert_eq!(config.for_file(0).resolve(None).unwrap(), "A");
        assert_eq!(config.for_file(1).resolve(None).unwrap(), "B");
    }

    #[test]
    fn test_override_beats_segid() {
        let config = config(&["A", "B"], true);
        assert_eq!(config.for_file(1).resolve(Some("AAAA")).unwrap(), "B");
    }

    #[test]
    fn test_override_without_declared_chain_fails() {
        let config = config(&["A"], true);
        let err = config.for_file(1).resolve(Some("AAAA")).unwrap_err();
        assert_eq!(err, ChainResolutionError::MissingOverride { file_number: 2 });
        assert!(err.to_string().contains("i need a chain but none was provided"));
    }

    #[test]
    fn test_no_chain_at_all_fails() {
        let config = config(&[], false);
        let chains = config.for_file(0);
        assert_eq!(chains.declared(), None);
        assert_eq!(chains.resolve(Some("S1")).unwrap(), "S1");

        let err = chains.resolve(None).unwrap_err();
        assert_eq!(err, ChainResolutionError::Missing { file_number: 1 });
    }

    #[test]
    fn test_extra_chain_policy() {
        let ignoring = config(&["A", "B", "C"], false);
        assert!(ignoring.check_file_count(2).is_ok());
        assert!(ignoring.check_file_count(3).is_ok());

        let rejecting = ignoring.with_extra_chains(ExtraChains::Reject);
        assert!(rejecting.check_file_count(3).is_ok());
        assert_eq!(
            rejecting.check_file_count(2).unwrap_err(),
            ChainResolutionError::ExtraChains {
                declared: 3,
                files: 2
            }
        );
    }

    #[test]
    fn test_single_file_context() {
        let chains = FileChains::single(Some("X"), false);
        assert_eq!(chains.resolve(None).unwrap(), "X");
        assert_eq!(chains.resolve(Some("Y")).unwrap(), "Y");
    }

    #[test]
    fn test_parse_chain_codes() {
        assert_eq!(parse_chain_codes(&["A,B", "C D"]), vec!["A", "B", "C", "D"]);
        assert_eq!(parse_chain_codes(&["A,,B "]), vec!["A", "B"]);
        assert!(parse_chain_codes::<&str>(&[]).is_empty());
    }
}
