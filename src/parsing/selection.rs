//! XPLOR atom-selection grammar.
//!
//! ```text
//! segid_factor   := "segid" identifier
//! residue_factor := ("resid" | "residue") signed_integer
//! atom_factor    := "name" atom_token
//! atom_list      := atom_factor | "(" atom_factor ("or" atom_factor)* ")"
//! leaf_body      := [segid_factor "and"] residue_factor "and" atom_list
//! selection      := "(" (leaf_body / composite) ")"
//! composite      := conjunction ("or" conjunction)*
//! conjunction    := selection ("and" selection)*
//! ```
//!
//! Keywords are case-insensitive. `/` is ordered choice: the leaf body is
//! tried first and the cursor rewinds to try the composite form.
//!
//! Failures are reported PEG style, at the furthest token any alternative
//! reached, with the expectations of every alternative that stopped there.

use serde::Serialize;

use crate::parsing::error::{Found, GrammarParseError};
use crate::parsing::lexer::{self, Token, TokenKind, TokenStream, DEFAULT_COMMENT_MARKER};
use crate::utils::validation::{
    check_selection_depth, is_atom_name, is_segment_id, parse_number, parse_signed_integer,
    MAX_SELECTION_DEPTH,
};

/// One atom named by a selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AtomSelector {
    pub segment_id: Option<String>,
    pub residue_number: i64,
    pub atom_name: String,
}

/// A `[segid S and] resid N and <atom names>` clause.
///
/// `atom_names` holds the alternatives of an `(name X or name Y ...)` list;
/// it always has at least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionLeaf {
    pub segment_id: Option<String>,
    pub residue_number: i64,
    pub atom_names: Vec<String>,
}

impl SelectionLeaf {
    pub fn selectors(&self) -> impl Iterator<Item = AtomSelector> + '_ {
        self.atom_names.iter().map(|name| AtomSelector {
            segment_id: self.segment_id.clone(),
            residue_number: self.residue_number,
            atom_name: name.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionNode {
    Leaf(SelectionLeaf),
    And(Box<SelectionNode>, Box<SelectionNode>),
    Or(Box<SelectionNode>, Box<SelectionNode>),
}

impl SelectionNode {
    /// Leaves in source order
    #[must_use]
    pub fn leaves(&self) -> Vec<&SelectionLeaf> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a SelectionLeaf>) {
        match self {
            Self::Leaf(leaf) => leaves.push(leaf),
            Self::And(left, right) | Self::Or(left, right) => {
                left.collect_leaves(leaves);
                right.collect_leaves(leaves);
            }
        }
    }

    /// Atoms selected by the expression, in first-seen order without repeats.
    ///
    /// `Or` is set union and `And` set intersection over the atoms each side
    /// names. Selectors are compared as written: a leaf with a segid never
    /// matches one without, so restraint extraction intersects after chain
    /// resolution instead.
    #[must_use]
    pub fn atoms(&self) -> Vec<AtomSelector> {
        match self {
            Self::Leaf(leaf) => {
                let mut atoms = Vec::with_capacity(leaf.atom_names.len());
                for selector in leaf.selectors() {
                    if !atoms.contains(&selector) {
                        atoms.push(selector);
                    }
                }
                atoms
            }
            Self::Or(left, right) => {
                let mut atoms = left.atoms();
                for selector in right.atoms() {
                    if !atoms.contains(&selector) {
                        atoms.push(selector);
                    }
                }
                atoms
            }
            Self::And(left, right) => {
                let right = right.atoms();
                left.atoms()
                    .into_iter()
                    .filter(|selector| right.contains(selector))
                    .collect()
            }
        }
    }
}

/// The selection grammar and its tokenizer settings.
///
/// Holds no parse state; one value can serve any number of parses.
#[derive(Debug, Clone, Copy)]
pub struct Grammar {
    comment_marker: char,
    max_depth: usize,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            comment_marker: DEFAULT_COMMENT_MARKER,
            max_depth: MAX_SELECTION_DEPTH,
        }
    }
}

impl Grammar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_comment_marker(mut self, marker: char) -> Self {
        self.comment_marker = marker;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn comment_marker(&self) -> char {
        self.comment_marker
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn tokenize<'a>(&self, text: &'a str) -> TokenStream<'a> {
        lexer::tokenize(text, self.comment_marker)
    }

    /// Parse text holding exactly one parenthesized selection
    ///
    /// # Errors
    ///
    /// Returns a `GrammarParseError` on any token mismatch or trailing input.
    pub fn parse_selection(&self, text: &str) -> Result<SelectionNode, GrammarParseError> {
        let stream = self.tokenize(text);
        let mut cursor = Cursor::new(&stream, self.max_depth);
        let parsed = cursor.rule("selection", |c| {
            let node = c.selection()?;
            c.end()?;
            Ok(node)
        });
        parsed.map_err(|_| cursor.into_error())
    }
}

/// Parse one selection with the default grammar
///
/// # Errors
///
/// Returns a `GrammarParseError` on any token mismatch or trailing input.
pub fn parse_selection(text: &str) -> Result<SelectionNode, GrammarParseError> {
    Grammar::default().parse_selection(text)
}

/// Marker for a failed match; details live in the cursor's furthest failure
#[derive(Debug)]
pub(crate) struct Mismatch;

pub(crate) type Match<T> = Result<T, Mismatch>;

#[derive(Debug)]
struct Failure {
    index: usize,
    expected: Vec<String>,
    context: &'static str,
}

/// A numeric field with the place it was written
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Number<'a> {
    pub token: Token<'a>,
    pub value: f64,
}

/// Backtracking cursor over a token stream
pub(crate) struct Cursor<'t, 'a> {
    stream: &'t TokenStream<'a>,
    index: usize,
    depth: usize,
    max_depth: usize,
    rules: Vec<&'static str>,
    furthest: Option<Failure>,
    fatal: Option<GrammarParseError>,
}

impl<'t, 'a> Cursor<'t, 'a> {
    pub(crate) fn new(stream: &'t TokenStream<'a>, max_depth: usize) -> Self {
        Self {
            stream,
            index: 0,
            depth: 0,
            max_depth,
            rules: Vec::new(),
            furthest: None,
            fatal: None,
        }
    }

    pub(crate) fn peek(&self) -> Option<&'t Token<'a>> {
        self.stream.tokens.get(self.index)
    }

    pub(crate) fn at_end(&self) -> bool {
        self.index >= self.stream.tokens.len()
    }

    /// Run a named rule so failures inside it report that name
    pub(crate) fn rule<T>(
        &mut self,
        name: &'static str,
        body: impl FnOnce(&mut Self) -> Match<T>,
    ) -> Match<T> {
        self.rules.push(name);
        let result = body(self);
        self.rules.pop();
        result
    }

    /// Record that `what` would have been accepted at the current token
    pub(crate) fn expect(&mut self, what: &str) {
        let context = self.rules.last().copied().unwrap_or("input");
        let index = self.index;
        if let Some(failure) = &mut self.furthest {
            if failure.index > index {
                return;
            }
            if failure.index == index {
                if !failure.expected.iter().any(|e| e == what) {
                    failure.expected.push(what.to_string());
                }
                return;
            }
        }
        self.furthest = Some(Failure {
            index,
            expected: vec![what.to_string()],
            context,
        });
    }

    pub(crate) fn fail<T>(&mut self, what: &str) -> Match<T> {
        self.expect(what);
        Err(Mismatch)
    }

    pub(crate) fn try_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(token) if token.is_keyword(keyword) => {
                self.index += 1;
                true
            }
            _ => {
                self.expect(&format!("'{keyword}'"));
                false
            }
        }
    }

    pub(crate) fn keyword(&mut self, keyword: &str) -> Match<()> {
        if self.try_keyword(keyword) {
            Ok(())
        } else {
            Err(Mismatch)
        }
    }

    fn punct(&mut self, kind: TokenKind, symbol: &str) -> Match<()> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.index += 1;
                Ok(())
            }
            _ => self.fail(&format!("'{symbol}'")),
        }
    }

    pub(crate) fn at_open(&mut self) -> bool {
        let open = self.peek().is_some_and(|t| t.kind == TokenKind::Open);
        if !open {
            self.expect("'('");
        }
        open
    }

    fn word(&mut self, description: &str, accept: impl Fn(&str) -> bool) -> Match<&'t Token<'a>> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Word && accept(token.text) => {
                self.index += 1;
                Ok(token)
            }
            _ => self.fail(description),
        }
    }

    pub(crate) fn try_number(&mut self) -> Option<Number<'a>> {
        let token = self.word("a number", |text| parse_number(text).is_some()).ok()?;
        let value = parse_number(token.text)?;
        Some(Number {
            token: token.clone(),
            value,
        })
    }

    pub(crate) fn number(&mut self) -> Match<Number<'a>> {
        self.try_number().ok_or(Mismatch)
    }

    pub(crate) fn end(&mut self) -> Match<()> {
        if self.at_end() {
            Ok(())
        } else {
            self.fail("end of text")
        }
    }

    pub(crate) fn selection(&mut self) -> Match<SelectionNode> {
        self.rule("selection", |c| {
            c.punct(TokenKind::Open, "(")?;
            if let Some(message) = check_selection_depth(c.depth, c.max_depth) {
                c.index -= 1;
                c.set_fatal(message);
                return Err(Mismatch);
            }
            c.depth += 1;

            let start = c.index;
            let node = match c.leaf_body() {
                Ok(leaf) => Ok(SelectionNode::Leaf(leaf)),
                Err(mismatch) if c.fatal.is_some() => Err(mismatch),
                Err(_) => {
                    c.index = start;
                    c.composite()
                }
            };

            c.depth -= 1;
            let node = node?;
            c.punct(TokenKind::Close, ")")?;
            Ok(node)
        })
    }

    fn leaf_body(&mut self) -> Match<SelectionLeaf> {
        let segment_id = if self.try_keyword("segid") {
            let id = self.word("a segment id", is_segment_id)?;
            self.keyword("and")?;
            Some(id.text.to_string())
        } else {
            None
        };

        if !self.try_keyword("resid") && !self.try_keyword("residue") {
            return Err(Mismatch);
        }
        let residue = self.word("a residue number", |text| {
            parse_signed_integer(text).is_some()
        })?;
        let residue_number = parse_signed_integer(residue.text).ok_or(Mismatch)?;

        self.keyword("and")?;
        let atom_names = self.atom_list()?;

        Ok(SelectionLeaf {
            segment_id,
            residue_number,
            atom_names,
        })
    }

    fn atom_list(&mut self) -> Match<Vec<String>> {
        if !self.at_open() {
            return Ok(vec![self.atom_factor()?]);
        }
        self.punct(TokenKind::Open, "(")?;
        let mut names = vec![self.atom_factor()?];
        while self.try_keyword("or") {
            names.push(self.atom_factor()?);
        }
        self.punct(TokenKind::Close, ")")?;
        Ok(names)
    }

    fn atom_factor(&mut self) -> Match<String> {
        self.keyword("name")?;
        let name = self.word("an atom name", is_atom_name)?;
        Ok(name.text.to_string())
    }

    fn composite(&mut self) -> Match<SelectionNode> {
        let mut node = self.conjunction()?;
        while self.try_keyword("or") {
            let right = self.conjunction()?;
            node = SelectionNode::Or(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn conjunction(&mut self) -> Match<SelectionNode> {
        let mut node = self.selection()?;
        while self.try_keyword("and") {
            let right = self.selection()?;
            node = SelectionNode::And(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn set_fatal(&mut self, message: String) {
        if self.fatal.is_some() {
            return;
        }
        let (found, position) = self.found_at(self.index);
        self.fatal = Some(GrammarParseError {
            line: position.line,
            column: position.column,
            expected: vec![message],
            found,
            context: "selection".to_string(),
        });
    }

    fn found_at(&self, index: usize) -> (Found, lexer::Position) {
        match self.stream.tokens.get(index) {
            Some(token) => (Found::Token(token.text.to_string()), token.position),
            None => (Found::EndOfText, self.stream.end),
        }
    }

    /// Build the error for a failed parse from the furthest failure seen
    pub(crate) fn into_error(mut self) -> GrammarParseError {
        if let Some(fatal) = self.fatal.take() {
            return fatal;
        }
        let (index, expected, context) = match self.furthest.take() {
            Some(failure) => (failure.index, failure.expected, failure.context),
            None => (self.index, vec!["end of text".to_string()], "input"),
        };
        let (found, position) = self.found_at(index);
        GrammarParseError {
            line: position.line,
            column: position.column,
            expected,
            found,
            context: context.to_string(),
        }
    }
}
