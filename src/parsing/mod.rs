//! Parsers for XPLOR restraint tables and PSF topology files.
//!
//! This module provides:
//!
//! - **Tokenizer** ([`lexer`]): parentheses, words and `!` comments with 1-based positions
//! - **Selection grammar** ([`selection`]): `(segid S and resid N and name A)` expressions
//! - **Restraint grammars** ([`restraints`]): `assign` records for dihedral and distance tables
//! - **PSF topology** ([`psf`]): the `!NATOM` block of a PSF file
//!
//! ## Example
//!
//! ```rust
//! use xplor_nef::parsing::restraints::parse_distance_table;
//!
//! let table = "assign (segid A and resid 23 and (name HA or name HB)) \
//!              (segid B and resid 24 and name HN) 3.5 1.7 0.5";
//! let records = parse_distance_table(table).unwrap();
//! assert_eq!(records[0].selections[0].atoms().len(), 2);
//! ```
//!
//! ## Errors
//!
//! | Input | Error |
//! |-------|-------|
//! | Selection or restraint table | [`error::GrammarParseError`] |
//! | Restraint with wrong field counts | [`restraints::ArityError`] |
//! | PSF file | [`psf::PsfError`] |

pub mod error;
pub mod lexer;
pub mod psf;
pub mod restraints;
pub mod selection;
