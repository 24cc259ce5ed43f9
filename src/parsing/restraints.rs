//! Dihedral and distance restraint table grammars.
//!
//! ```text
//! dihedral_restraint := "assign" selection{4} float float float integer
//! distance_restraint := "assign" selection{2} float float float
//! table              := restraint* END
//! ```
//!
//! Both kinds share one record grammar, `"assign" selection+ number+`; the
//! per-kind arity is checked once a record has been read so that a record
//! with a missing or extra field is reported as such rather than as a
//! confusing token mismatch further on.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::parsing::error::{Found, GrammarParseError};
use crate::parsing::selection::{Cursor, Grammar, Match, Number, SelectionNode};
use crate::utils::validation::parse_signed_integer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestraintKind {
    Dihedral,
    Distance,
}

impl RestraintKind {
    fn value_names(self) -> &'static str {
        match self {
            Self::Dihedral => "energy constant, angle, range, exponent",
            Self::Distance => "target, first bound, second bound",
        }
    }

    fn table_rule(self) -> &'static str {
        match self {
            Self::Dihedral => "dihedral restraint table",
            Self::Distance => "distance restraint table",
        }
    }

    fn record_rule(self) -> &'static str {
        match self {
            Self::Dihedral => "dihedral restraint",
            Self::Distance => "distance restraint",
        }
    }
}

impl std::fmt::Display for RestraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dihedral => write!(f, "dihedral"),
            Self::Distance => write!(f, "distance"),
        }
    }
}

/// A record or selection with the wrong number of parts for its restraint kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} restraint at line {line}: {message}")]
pub struct ArityError {
    pub kind: RestraintKind,
    /// Line of the record's `assign` keyword
    pub line: usize,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error(transparent)]
    Grammar(#[from] GrammarParseError),

    #[error(transparent)]
    Arity(#[from] ArityError),
}

/// A parsed dihedral `assign` record, selections not yet resolved
#[derive(Debug, Clone, PartialEq)]
pub struct DihedralRecord {
    pub line: usize,
    pub selections: [SelectionNode; 4],
    pub energy_constant: f64,
    pub angle: f64,
    pub range: f64,
    pub exponent: i64,
}

/// A parsed distance `assign` record, selections not yet resolved
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRecord {
    pub line: usize,
    pub selections: [SelectionNode; 2],
    pub target_value: f64,
    pub first_bound: f64,
    pub second_bound: f64,
}

struct RawRecord<'a> {
    line: usize,
    selections: Vec<SelectionNode>,
    values: Vec<Number<'a>>,
}

impl<'a> RawRecord<'a> {
    fn split<const S: usize, const V: usize>(
        self,
        kind: RestraintKind,
    ) -> Result<(usize, [SelectionNode; S], [Number<'a>; V]), ArityError> {
        let line = self.line;
        let found_selections = self.selections.len();
        let found_values = self.values.len();

        let selections = self.selections.try_into().map_err(|_| ArityError {
            kind,
            line,
            message: format!("expected {S} atom selections, found {found_selections}"),
        })?;
        let values = self.values.try_into().map_err(|_| ArityError {
            kind,
            line,
            message: format!(
                "expected {V} numeric fields ({}), found {found_values}",
                kind.value_names()
            ),
        })?;
        Ok((line, selections, values))
    }
}

impl DihedralRecord {
    fn from_raw(raw: RawRecord<'_>) -> Result<Self, TableError> {
        let kind = RestraintKind::Dihedral;
        let (line, selections, [energy_constant, angle, range, exponent]) =
            raw.split::<4, 4>(kind)?;

        let exponent_value =
            parse_signed_integer(exponent.token.text).ok_or_else(|| GrammarParseError {
                line: exponent.token.position.line,
                column: exponent.token.position.column,
                expected: vec!["an integer exponent".to_string()],
                found: Found::Token(exponent.token.text.to_string()),
                context: kind.record_rule().to_string(),
            })?;

        Ok(Self {
            line,
            selections,
            energy_constant: energy_constant.value,
            angle: angle.value,
            range: range.value,
            exponent: exponent_value,
        })
    }
}

impl DistanceRecord {
    fn from_raw(raw: RawRecord<'_>) -> Result<Self, TableError> {
        let (line, selections, [target, first, second]) =
            raw.split::<2, 3>(RestraintKind::Distance)?;

        Ok(Self {
            line,
            selections,
            target_value: target.value,
            first_bound: first.value,
            second_bound: second.value,
        })
    }
}

fn record<'a>(c: &mut Cursor<'_, 'a>) -> Match<RawRecord<'a>> {
    let line = c.peek().map_or(0, |token| token.position.line);
    c.keyword("assign")?;

    let mut selections = vec![c.selection()?];
    while c.at_open() {
        selections.push(c.selection()?);
    }

    let mut values = vec![c.number()?];
    while let Some(value) = c.try_number() {
        values.push(value);
    }

    Ok(RawRecord {
        line,
        selections,
        values,
    })
}

impl Grammar {
    /// Parse a whole dihedral restraint table
    ///
    /// # Errors
    ///
    /// Returns `TableError::Grammar` on a token mismatch anywhere in the text
    /// (including a trailing incomplete record) and `TableError::Arity` when a
    /// record has the wrong number of selections or numeric fields.
    pub fn parse_dihedral_table(&self, text: &str) -> Result<Vec<DihedralRecord>, TableError> {
        let records = self.parse_table(text, RestraintKind::Dihedral)?;
        let records = records
            .into_iter()
            .map(DihedralRecord::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), "Parsed dihedral restraint records");
        Ok(records)
    }

    /// Parse a whole distance restraint table
    ///
    /// # Errors
    ///
    /// Same conditions as [`Grammar::parse_dihedral_table`].
    pub fn parse_distance_table(&self, text: &str) -> Result<Vec<DistanceRecord>, TableError> {
        let records = self.parse_table(text, RestraintKind::Distance)?;
        let records = records
            .into_iter()
            .map(DistanceRecord::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), "Parsed distance restraint records");
        Ok(records)
    }

    fn parse_table<'a>(
        &self,
        text: &'a str,
        kind: RestraintKind,
    ) -> Result<Vec<RawRecord<'a>>, GrammarParseError> {
        let stream = self.tokenize(text);
        let mut cursor = Cursor::new(&stream, self.max_depth());
        let parsed = cursor.rule(kind.table_rule(), |c| {
            let mut records = Vec::new();
            while !c.at_end() {
                c.expect("end of text");
                records.push(c.rule(kind.record_rule(), |c| record(c))?);
            }
            Ok(records)
        });
        parsed.map_err(|_| cursor.into_error())
    }
}

/// Parse a dihedral restraint table with the default grammar
///
/// # Errors
///
/// See [`Grammar::parse_dihedral_table`].
pub fn parse_dihedral_table(text: &str) -> Result<Vec<DihedralRecord>, TableError> {
    Grammar::default().parse_dihedral_table(text)
}

/// Parse a distance restraint table with the default grammar
///
/// # Errors
///
/// See [`Grammar::parse_dihedral_table`].
pub fn parse_distance_table(text: &str) -> Result<Vec<DistanceRecord>, TableError> {
    Grammar::default().parse_distance_table(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIHEDRAL: &str = "assign (SEGID AAAA and resid 10 and name HA) \
        (SEGID BBBB and resid 11 and name CA) \
        (SEGID CCCC and resid 12 and name C) \
        (SEGID DDDD and resid 13 and name O) 1.234 4.567 7.891 2";

    fn segment_of(node: &SelectionNode) -> Option<String> {
        node.atoms()[0].segment_id.clone()
    }

    #[test]
    fn test_parse_single_dihedral() {
        let records = parse_dihedral_table(DIHEDRAL).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.line, 1);
        let segments: Vec<_> = record.selections.iter().filter_map(segment_of).collect();
        assert_eq!(segments, vec!["AAAA", "BBBB", "CCCC", "DDDD"]);
        assert!((record.energy_constant - 1.234).abs() < 1e-12);
        assert!((record.angle - 4.567).abs() < 1e-12);
        assert!((record.range - 7.891).abs() < 1e-12);
        assert_eq!(record.exponent, 2);
    }

    #[test]
    fn test_parse_table_with_comments() {
        let text = r"! phi/psi restraints for residue 2
assign (resid 1 and name C) (resid 2 and name N)
       (resid 2 and name CA) (resid 2 and name C)   1.0 -60.0 20.0 2 ! phi
assign (resid 2 and name N) (resid 2 and name CA) ! psi
       (resid 2 and name C) (resid 3 and name N)    1.0 -40.0 30.0 2
";
        let records = parse_dihedral_table(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].line, 4);
        assert!((records[1].angle - -40.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_table() {
        assert!(parse_dihedral_table("").unwrap().is_empty());
        assert!(parse_distance_table("! nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn test_dangling_assign_fails_whole_table() {
        let text = format!("{DIHEDRAL}\nassign (");
        let err = parse_dihedral_table(&text).unwrap_err();
        match err {
            TableError::Grammar(err) => {
                assert_eq!(err.line, 2);
                assert_eq!(err.column, 9);
                assert_eq!(err.found, Found::EndOfText);
                assert!(err.expected.contains(&"'resid'".to_string()));
                assert!(err.expected.contains(&"'('".to_string()));
            }
            other @ TableError::Arity(_) => panic!("expected a grammar error, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_between_records() {
        let text = format!("{DIHEDRAL}\nfoo");
        let err = parse_dihedral_table(&text).unwrap_err();
        let TableError::Grammar(err) = err else {
            panic!("expected a grammar error");
        };
        assert_eq!(err.found, Found::Token("foo".to_string()));
        assert!(err.expected.contains(&"end of text".to_string()));
        assert!(err.expected.contains(&"'assign'".to_string()));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_dihedral_with_three_selections_is_arity_error() {
        let text = "\nassign (resid 1 and name C) (resid 2 and name N) (resid 2 and name CA) 1.0 -60.0 20.0 2";
        let err = parse_dihedral_table(text).unwrap_err();
        assert_eq!(
            err,
            TableError::Arity(ArityError {
                kind: RestraintKind::Dihedral,
                line: 2,
                message: "expected 4 atom selections, found 3".to_string(),
            })
        );
    }

    #[test]
    fn test_dihedral_with_missing_field_is_arity_error() {
        let text = "assign (resid 1 and name C) (resid 2 and name N) (resid 2 and name CA) (resid 2 and name C) 1.0 -60.0 20.0";
        let err = parse_dihedral_table(text).unwrap_err();
        assert!(matches!(err, TableError::Arity(_)));
        assert!(err.to_string().contains("expected 4 numeric fields"));
    }

    #[test]
    fn test_fractional_exponent_is_rejected() {
        let text = "assign (resid 1 and name C) (resid 2 and name N) (resid 2 and name CA) (resid 2 and name C) 1.0 -60.0 20.0 2.5";
        let err = parse_dihedral_table(text).unwrap_err();
        let TableError::Grammar(err) = err else {
            panic!("expected a grammar error");
        };
        assert_eq!(err.expected, vec!["an integer exponent".to_string()]);
        assert_eq!(err.found, Found::Token("2.5".to_string()));
    }

    #[test]
    fn test_parse_distance_table() {
        let text = r"assign (segid A and resid 5 and name HA) (segid A and resid 8 and (name HB2 or name HB3)) 3.0 1.2 0.5
assign (resid -1 and name HN) (resid 2 and name HN#) 4.5 2.7 1.0";
        let records = parse_distance_table(text).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].selections[1].atoms().len(), 2);
        assert!((records[0].target_value - 3.0).abs() < 1e-12);
        assert!((records[0].first_bound - 1.2).abs() < 1e-12);
        assert!((records[0].second_bound - 0.5).abs() < 1e-12);

        let atoms = records[1].selections[0].atoms();
        assert_eq!(atoms[0].residue_number, -1);
        assert_eq!(records[1].selections[1].atoms()[0].atom_name, "HN#");
    }

    #[test]
    fn test_distance_with_dihedral_arity_fails() {
        let err = parse_distance_table(DIHEDRAL).unwrap_err();
        assert!(err.to_string().contains("expected 2 atom selections, found 4"));
    }
}
