//! Centralized validation and helper functions.

/// Deepest parenthesis nesting accepted in a selection (stack protection)
pub const MAX_SELECTION_DEPTH: usize = 64;

/// Validate an atom name token: letters, digits and the markers `#`, `'`, `"`.
///
/// # Examples
///
/// ```
/// use xplor_nef::utils::validation::is_atom_name;
///
/// assert!(is_atom_name("HB#"));
/// assert!(is_atom_name("H5''"));
/// assert!(!is_atom_name("HB*"));
/// assert!(!is_atom_name(""));
/// ```
#[must_use]
pub fn is_atom_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '\'' | '"'))
}

/// Validate a segment identifier token (letters, digits, underscore).
#[must_use]
pub fn is_segment_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse an optionally signed decimal integer such as `-12` or `+3`.
///
/// # Examples
///
/// ```
/// use xplor_nef::utils::validation::parse_signed_integer;
///
/// assert_eq!(parse_signed_integer("-12"), Some(-12));
/// assert_eq!(parse_signed_integer("+3"), Some(3));
/// assert_eq!(parse_signed_integer("1.0"), None);
/// ```
#[must_use]
pub fn parse_signed_integer(s: &str) -> Option<i64> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse a plain decimal or exponent-form number.
///
/// Rejects the spellings Rust would otherwise accept for non-finite values
/// (`inf`, `NaN`), which never appear in restraint tables.
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    let plausible = s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !plausible {
        return None;
    }
    s.parse().ok()
}

/// Check whether entering one more level of nesting would exceed `max_depth`.
///
/// Call this with the current depth BEFORE descending.
/// Returns an error message if the limit is exceeded, None if safe.
#[must_use]
pub fn check_selection_depth(depth: usize, max_depth: usize) -> Option<String> {
    if depth >= max_depth {
        Some(format!("at most {max_depth} levels of nested selections"))
    } else {
        None
    }
}
