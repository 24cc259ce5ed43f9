use thiserror::Error;

/// What the grammar saw where it gave up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    Token(String),
    EndOfText,
}

impl std::fmt::Display for Found {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(text) => write!(f, "'{text}'"),
            Self::EndOfText => write!(f, "end of text"),
        }
    }
}

/// A token mismatch in the selection or restraint grammar.
///
/// Positions are 1-based. `expected` holds every alternative that could have
/// continued the parse at the failure point, already rendered for display
/// (`'resid'`, `a number`, `end of text`, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "expected {}, found {found} at line {line}, column {column} (in {context})",
    describe_expected(.expected)
)]
pub struct GrammarParseError {
    pub line: usize,
    pub column: usize,
    pub expected: Vec<String>,
    pub found: Found,
    /// Grammar rule being matched at the failure point
    pub context: String,
}

fn describe_expected(expected: &[String]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("one of {} or {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_expectation_message() {
        let error = GrammarParseError {
            line: 3,
            column: 1,
            expected: vec!["end of text".to_string()],
            found: Found::Token("foo".to_string()),
            context: "restraint table".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "expected end of text, found 'foo' at line 3, column 1 (in restraint table)"
        );
    }

    #[test]
    fn test_multiple_expectations_message() {
        let error = GrammarParseError {
            line: 1,
            column: 9,
            expected: vec!["'segid'".into(), "'resid'".into(), "'('".into()],
            found: Found::EndOfText,
            context: "selection".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "expected one of 'segid', 'resid' or '(', found end of text at line 1, column 9 (in selection)"
        );
    }
}
