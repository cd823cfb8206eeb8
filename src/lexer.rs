use crate::error::{Error, ErrorType, Result};
use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenType {
    #[regex("[ \t\r]+")]
    Whitespace,
    #[regex(";[^\n]*")]
    Comment,

    #[regex("-?[0-9]+")]
    IntegerLiteral,
    #[regex("[a-zA-Z_][_0-9a-zA-Z]*")]
    Identifier,

    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn expand(&self, other: &Self) -> Self {
        SourceRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn offset(&self, by: usize) -> Self {
        Self::new(self.start + by, self.end + by)
    }
}

impl From<Range<usize>> for SourceRange {
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl From<SourceRange> for Range<usize> {
    fn from(range: SourceRange) -> Self {
        range.start..range.end
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub token_type: TokenType,
    pub value: &'a str,
    pub range: SourceRange,
}

impl<'a> Token<'a> {
    pub fn new(token_type: TokenType, value: &'a str, range: SourceRange) -> Self {
        Self {
            token_type,
            value,
            range,
        }
    }
}

impl<'a> PartialEq for Token<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.token_type == other.token_type
            && self.value == other.value
            && self.range == other.range
    }
}

/// Tokenizes a single program line. `offset` is the byte position of the
/// line inside the whole program, so every token range points into the
/// original source.
pub struct LineLexer<'a> {
    inner: logos::Lexer<'a, TokenType>,
    offset: usize,
}

impl<'a> LineLexer<'a> {
    pub fn new(line: &'a str, offset: usize) -> Self {
        Self {
            inner: TokenType::lexer(line),
            offset,
        }
    }

    /// Returns the next meaningful token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>> {
        while let Some(token_type) = self.inner.next() {
            let range = SourceRange::from(self.inner.span()).offset(self.offset);
            match token_type {
                Err(_) => {
                    return Err(Error::new_with_range(
                        ErrorType::Parse,
                        format!("Unknown character '{}'", self.inner.slice()),
                        range,
                    ))
                }
                Ok(TokenType::Whitespace) | Ok(TokenType::Comment) => continue,
                Ok(token_type) => {
                    return Ok(Some(Token::new(token_type, self.inner.slice(), range)))
                }
            }
        }

        Ok(None)
    }

    /// The untokenized rest of the line together with its absolute range.
    pub fn remainder(&self) -> (&'a str, SourceRange) {
        let rest = self.inner.remainder();
        let start = self.offset + self.inner.span().end;
        (rest, SourceRange::new(start, start + rest.len()))
    }
}

pub fn lex(line: &str, offset: usize) -> Result<Vec<Token>> {
    let mut lexer = LineLexer::new(line, offset);

    let mut tokens = vec![];
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    Ok(tokens)
}
