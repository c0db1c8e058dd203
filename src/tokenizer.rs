use crate::model::SourceFile;
use crate::token::{Token, TokenKind};

/// The token stream contract the parser consumes.
///
/// Implementations deliver tokens in source order. `next` at end of
/// input returns an `Eof` token and is idempotent; `prev` reports the
/// kind of the most recently consumed token (`Eof` before the first
/// consumption). Comments and doc comments are delivered as distinct
/// kinds and preserve their exact source text in the token image.
pub trait Tokenizer {
    /// The file this stream was produced from.
    fn source_file(&self) -> SourceFile;

    /// Kind of the next token without consuming it.
    fn peek(&mut self) -> TokenKind;

    /// Kind of the most recently consumed token.
    fn prev(&self) -> TokenKind;

    /// Consumes and returns the next token.
    fn next(&mut self) -> Token;
}
