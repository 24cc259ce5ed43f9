//! Tokenizer shared by the selection and restraint grammars.
//!
//! Produces three token kinds: `(`, `)` and words (maximal runs of anything
//! else that is not whitespace). Text from the comment marker to the end of
//! its line is dropped, so comments may sit anywhere, including mid-record.

/// Line comment marker used by XPLOR restraint tables
pub const DEFAULT_COMMENT_MARKER: char = '!';

/// 1-based line and column (in characters) of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Open,
    Close,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub position: Position,
}

impl Token<'_> {
    /// Case-insensitive keyword match
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }
}

/// Tokens of one input plus the position just past its last character
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    pub tokens: Vec<Token<'a>>,
    pub end: Position,
}

#[must_use]
pub fn tokenize(text: &str, comment_marker: char) -> TokenStream<'_> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut chars = text.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        let position = Position { line, column };

        if ch == '\n' {
            line += 1;
            column = 1;
            continue;
        }
        column += 1;

        if ch.is_whitespace() {
            continue;
        }

        if ch == comment_marker {
            while let Some(&(_, c)) = chars.peek() {
                if c == '\n' {
                    break;
                }
                column += 1;
                chars.next();
            }
            continue;
        }

        let kind = match ch {
            '(' => Some(TokenKind::Open),
            ')' => Some(TokenKind::Close),
            _ => None,
        };
        if let Some(kind) = kind {
            tokens.push(Token {
                kind,
                text: &text[offset..offset + 1],
                position,
            });
            continue;
        }

        let mut end = offset + ch.len_utf8();
        while let Some(&(next_offset, c)) = chars.peek() {
            if c.is_whitespace() || c == '(' || c == ')' || c == comment_marker {
                break;
            }
            end = next_offset + c.len_utf8();
            column += 1;
            chars.next();
        }
        tokens.push(Token {
            kind: TokenKind::Word,
            text: &text[offset..end],
            position,
        });
    }

    TokenStream {
        tokens,
        end: Position { line, column },
    }
}
