use thiserror::Error;

use crate::token::TokenKind;

/// Fatal parse errors. All three abort the current source file; the
/// caller may start a new parser on a fresh token stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected token '{image}' ({found:?}) in {file} on line {line}, expected {expected:?}")]
    UnexpectedToken {
        file: String,
        line: usize,
        expected: TokenKind,
        found: TokenKind,
        image: String,
    },

    #[error("unexpected end of token stream in {file}")]
    TokenStreamEnd { file: String },

    #[error("missing default value in {file} on line {line}")]
    MissingValue { file: String, line: usize },
}

pub type Result<T> = std::result::Result<T, ParseError>;
