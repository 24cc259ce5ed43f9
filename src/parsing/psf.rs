//! Parser for PSF topology files.
//!
//! Only the atom block is read. The file must start with a `PSF` line; the
//! atom block is announced by a `<natom> !NATOM` line and followed by exactly
//! `natom` atom lines of 9 whitespace separated fields:
//!
//! ```text
//! <index> <segid> <resid> <resname> <atom name> <atom type> <charge> <mass> <flag>
//! ```
//!
//! Every atom contributes its `(segid, resid, resname)` residue; the result is
//! the distinct residues in natural order: chain codes compare digit runs by
//! value (`A2` before `A10`), then sequence codes numerically.

use std::cmp::Ordering;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::types::SequenceResidue;
use crate::utils::validation::parse_signed_integer;

/// Literal first line of a PSF file
pub const PSF_HEADER: &str = "PSF";

/// Second field of the line announcing the atom block
pub const NATOM_KEYWORD: &str = "!NATOM";

const ATOM_FIELD_COUNT: usize = 9;

#[derive(Error, Debug)]
pub enum PsfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message} [file: {file}, line {line}: '{text}']")]
    Format {
        file: String,
        line: usize,
        text: String,
        message: String,
    },
}

/// One line of the atom block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsfAtom {
    pub segment_id: String,
    pub residue_number: i64,
    pub residue_name: String,
    pub atom_name: String,
}

impl From<&PsfAtom> for SequenceResidue {
    fn from(atom: &PsfAtom) -> Self {
        SequenceResidue::new(
            atom.segment_id.clone(),
            atom.residue_number,
            atom.residue_name.clone(),
        )
    }
}

enum State {
    ExpectHeader,
    ScanForNatomBlock,
    InAtomBlock { natom: usize },
    Done,
}

/// Parse a PSF file into its distinct residues
///
/// # Errors
///
/// Returns `PsfError::Io` if the file cannot be read, or `PsfError::Format`
/// for any violation of the layout described in the module docs.
pub fn parse_psf_file(path: &Path) -> Result<Vec<SequenceResidue>, PsfError> {
    let content = std::fs::read_to_string(path)?;
    parse_psf_text(&content, &path.display().to_string())
}

/// Parse PSF text into its distinct residues in natural chain order, then by sequence code
///
/// `file_name` is only used in error messages.
///
/// # Errors
///
/// Returns `PsfError::Format` for a bad header, a bad or missing `!NATOM`
/// block, an atom line without 9 fields or with a non-integer residue number,
/// fewer atom lines than declared, or no residues at all.
pub fn parse_psf_text(text: &str, file_name: &str) -> Result<Vec<SequenceResidue>, PsfError> {
    let atoms = parse_psf_atoms(text, file_name)?;

    let mut residues: Vec<SequenceResidue> = atoms.iter().map(SequenceResidue::from).collect();
    residues.sort_by(natural_residue_order);
    residues.dedup();
    if residues.is_empty() {
        let (line, text) = natom_line(text);
        return Err(format_error(file_name, line, text, "no residues found".to_string()));
    }

    debug!(
        file = file_name,
        atoms = atoms.len(),
        residues = residues.len(),
        "Parsed PSF topology"
    );
    Ok(residues)
}

/// Parse the atom block of PSF text, one entry per atom line in file order
///
/// # Errors
///
/// Same conditions as [`parse_psf_text`] except the empty-residue check.
pub fn parse_psf_atoms(text: &str, file_name: &str) -> Result<Vec<PsfAtom>, PsfError> {
    let mut state = State::ExpectHeader;
    let mut atoms = Vec::new();
    let mut last_line = (0, "");

    for (i, line) in text.lines().enumerate() {
        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;
        last_line = (line_num, line);

        match state {
            State::ExpectHeader => {
                if line.trim() != PSF_HEADER {
                    return Err(bad_header(file_name, line.trim()));
                }
                state = State::ScanForNatomBlock;
            }
            State::ScanForNatomBlock => {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if let [count, keyword] = fields.as_slice() {
                    if *keyword == NATOM_KEYWORD {
                        let natom: usize = count.parse().map_err(|_| {
                            format_error(
                                file_name,
                                line_num,
                                line,
                                "can't convert natom to an int".to_string(),
                            )
                        })?;
                        atoms.reserve(natom.min(100_000));
                        state = if natom == 0 {
                            State::Done
                        } else {
                            State::InAtomBlock { natom }
                        };
                    }
                }
            }
            State::InAtomBlock { natom } => {
                atoms.push(parse_atom_line(file_name, line_num, line, atoms.len() + 1)?);
                if atoms.len() == natom {
                    state = State::Done;
                }
            }
            State::Done => break,
        }
    }

    match state {
        State::Done => Ok(atoms),
        State::ExpectHeader => Err(bad_header(file_name, "")),
        State::ScanForNatomBlock => Err(format_error(
            file_name,
            last_line.0,
            last_line.1,
            format!("no {NATOM_KEYWORD} block found"),
        )),
        State::InAtomBlock { natom } => Err(format_error(
            file_name,
            last_line.0,
            last_line.1,
            format!(
                "unexpected number of atoms: {NATOM_KEYWORD} declared {natom} but the file ended after {}",
                atoms.len()
            ),
        )),
    }
}

fn parse_atom_line(
    file_name: &str,
    line_num: usize,
    line: &str,
    atom_number: usize,
) -> Result<PsfAtom, PsfError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != ATOM_FIELD_COUNT {
        return Err(format_error(
            file_name,
            line_num,
            line,
            format!(
                "there are {} fields for atom number {atom_number}; i expected {ATOM_FIELD_COUNT}",
                fields.len()
            ),
        ));
    }

    let residue_number = parse_signed_integer(fields[2]).ok_or_else(|| {
        format_error(
            file_name,
            line_num,
            line,
            format!(
                "residue number '{}' for atom number {atom_number} is not an integer",
                fields[2]
            ),
        )
    })?;

    Ok(PsfAtom {
        segment_id: fields[1].to_string(),
        residue_number,
        residue_name: fields[3].to_string(),
        atom_name: fields[4].to_string(),
    })
}

fn bad_header(file_name: &str, actual: &str) -> PsfError {
    format_error(
        file_name,
        1,
        actual,
        format!("the first line of a PSF file should be '{PSF_HEADER}' i got '{actual}'"),
    )
}

fn format_error(file_name: &str, line: usize, text: &str, message: String) -> PsfError {
    PsfError::Format {
        file: file_name.to_string(),
        line,
        text: text.to_string(),
        message,
    }
}

fn natural_residue_order(a: &SequenceResidue, b: &SequenceResidue) -> Ordering {
    natural_cmp(&a.chain_code, &b.chain_code)
        .then(a.sequence_code.cmp(&b.sequence_code))
        .then_with(|| a.residue_name.cmp(&b.residue_name))
}

/// Compare strings with runs of ASCII digits ordered by numeric value
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        let (Some(ca), Some(cb)) = (a.chars().next(), b.chars().next()) else {
            return a.len().cmp(&b.len());
        };
        let ordering = if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let (da, ra) = split_digits(a);
            let (db, rb) = split_digits(b);
            a = ra;
            b = rb;
            let (ta, tb) = (da.trim_start_matches('0'), db.trim_start_matches('0'));
            ta.len()
                .cmp(&tb.len())
                .then_with(|| ta.cmp(tb))
                .then_with(|| da.len().cmp(&db.len()))
        } else {
            a = &a[ca.len_utf8()..];
            b = &b[cb.len_utf8()..];
            ca.cmp(&cb)
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn natom_line(text: &str) -> (usize, &str) {
    text.lines()
        .enumerate()
        .find(|(_, line)| line.split_whitespace().nth(1) == Some(NATOM_KEYWORD))
        .map_or((0, ""), |(i, line)| (i + 1, line))
}
