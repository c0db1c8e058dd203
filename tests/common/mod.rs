#![allow(dead_code)]

//! Test support: a compact PHP tokenizer driving the parser from source
//! strings. Production consumers bring their own tokenizer; this one
//! covers exactly the token set the declaration grammar consumes.

use php_declmap::model::SourceFile;
use php_declmap::token::{Token, TokenKind};
use php_declmap::tokenizer::Tokenizer;
use php_declmap::{ModelBuilder, Parser, Result};

pub struct TestTokenizer {
    file: SourceFile,
    tokens: Vec<Token>,
    index: usize,
}

impl TestTokenizer {
    pub fn new(source: &str) -> Self {
        Self::with_file("test.php", source)
    }

    pub fn with_file(path: &str, source: &str) -> Self {
        Self {
            file: SourceFile::new(path),
            tokens: Lexer::new(source.as_bytes()).run(),
            index: 0,
        }
    }
}

impl Tokenizer for TestTokenizer {
    fn source_file(&self) -> SourceFile {
        self.file.clone()
    }

    fn peek(&mut self) -> TokenKind {
        self.tokens
            .get(self.index)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn prev(&self) -> TokenKind {
        if self.index == 0 {
            TokenKind::Eof
        } else {
            self.tokens[self.index - 1].kind
        }
    }

    fn next(&mut self) -> Token {
        match self.tokens.get(self.index) {
            Some(token) => {
                let token = token.clone();
                self.index += 1;
                token
            }
            None => Token::eof(),
        }
    }
}

/// Parses a source string, panicking on parse errors.
pub fn parse_source(source: &str) -> ModelBuilder {
    let mut builder = ModelBuilder::new();
    let tokenizer = TestTokenizer::new(source);
    let mut parser = Parser::new(tokenizer, &mut builder);
    match parser.parse() {
        Ok(()) => {}
        Err(err) => panic!("parse failed: {err}"),
    }
    builder
}

/// Parses a source string, returning the builder and the parse result.
pub fn try_parse_source(source: &str) -> (ModelBuilder, Result<()>) {
    let mut builder = ModelBuilder::new();
    let tokenizer = TestTokenizer::new(source);
    let mut parser = Parser::new(tokenizer, &mut builder);
    let result = parser.parse();
    (builder, result)
}

/// Parses one more file into an existing builder.
pub fn parse_file_into(builder: &mut ModelBuilder, path: &str, source: &str) {
    let tokenizer = TestTokenizer::with_file(path, source);
    let mut parser = Parser::new(tokenizer, builder);
    match parser.parse() {
        Ok(()) => {}
        Err(err) => panic!("parse failed for {path}: {err}"),
    }
}

/// Parses with annotation extraction suppressed.
pub fn parse_source_ignoring_annotations(source: &str) -> ModelBuilder {
    let mut builder = ModelBuilder::new();
    let tokenizer = TestTokenizer::new(source);
    let mut parser = Parser::new(tokenizer, &mut builder);
    parser.set_ignore_annotations();
    match parser.parse() {
        Ok(()) => {}
        Err(err) => panic!("parse failed: {err}"),
    }
    builder
}

struct Lexer<'src> {
    input: &'src [u8],
    cursor: usize,
    line: usize,
}

impl<'src> Lexer<'src> {
    fn new(input: &'src [u8]) -> Self {
        Self { input, cursor: 0, line: 1 }
    }

    fn run(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        if self.input.starts_with(b"<?php") {
            tokens.push(Token::new(TokenKind::OpenTag, "<?php", 1, 1));
            self.cursor = 5;
        }
        loop {
            self.skip_whitespace();
            if self.cursor >= self.input.len() {
                break;
            }
            self.scan(&mut tokens);
        }
        tokens
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.cursor).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.cursor + offset).copied()
    }

    fn bump(&mut self) {
        if self.peek() == Some(b'\n') {
            self.line += 1;
        }
        self.cursor += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn image(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.input[start..self.cursor]).into_owned()
    }

    fn scan(&mut self, tokens: &mut Vec<Token>) {
        let start = self.cursor;
        let start_line = self.line;
        let c = self.input[self.cursor];

        match c {
            b'/' if self.peek_at(1) == Some(b'/') => {
                self.scan_line_comment(tokens, start, start_line);
            }
            b'#' => {
                self.scan_line_comment(tokens, start, start_line);
            }
            b'/' if self.peek_at(1) == Some(b'*') => {
                self.scan_block_comment(tokens, start, start_line);
            }
            b'$' => {
                self.bump();
                if self.peek().map(is_ident_start).unwrap_or(false) {
                    self.read_identifier();
                    tokens.push(Token::new(TokenKind::Variable, self.image(start), start_line, self.line));
                } else {
                    panic!("stray '$' on line {}", start_line);
                }
            }
            b'\'' => {
                self.bump();
                loop {
                    match self.peek() {
                        None => panic!("unterminated string on line {}", start_line),
                        Some(b'\\') => {
                            self.bump();
                            self.bump();
                        }
                        Some(b'\'') => {
                            self.bump();
                            break;
                        }
                        Some(_) => self.bump(),
                    }
                }
                tokens.push(Token::new(TokenKind::StringLiteral, self.image(start), start_line, self.line));
            }
            b'"' => self.scan_quoted(tokens, b'"', TokenKind::DoubleQuote),
            b'`' => self.scan_quoted(tokens, b'`', TokenKind::Backtick),
            c if c.is_ascii_digit() => {
                let kind = self.read_number();
                tokens.push(Token::new(kind, self.image(start), start_line, self.line));
            }
            c if is_ident_start(c) => {
                self.read_identifier();
                let image = self.image(start);
                let kind = keyword_kind(&image);
                tokens.push(Token::new(kind, image, start_line, self.line));
            }
            _ => self.scan_operator(tokens, start, start_line),
        }
    }

    fn scan_line_comment(&mut self, tokens: &mut Vec<Token>, start: usize, start_line: usize) {
        while let Some(c) = self.peek() {
            if c == b'\n' {
                break;
            }
            self.bump();
        }
        tokens.push(Token::new(TokenKind::Comment, self.image(start), start_line, start_line));
    }

    fn scan_block_comment(&mut self, tokens: &mut Vec<Token>, start: usize, start_line: usize) {
        let is_doc = self.peek_at(2) == Some(b'*') && self.peek_at(3) != Some(b'/');
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                None => panic!("unterminated comment on line {}", start_line),
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.bump();
                    self.bump();
                    break;
                }
                Some(_) => self.bump(),
            }
        }
        let kind = if is_doc { TokenKind::DocComment } else { TokenKind::Comment };
        tokens.push(Token::new(kind, self.image(start), start_line, self.line));
    }

    fn scan_quoted(&mut self, tokens: &mut Vec<Token>, delimiter: u8, kind: TokenKind) {
        let open_line = self.line;
        self.bump();
        tokens.push(Token::new(kind, (delimiter as char).to_string(), open_line, open_line));

        let mut chunk_start = self.cursor;
        let mut chunk_line = self.line;
        loop {
            match self.peek() {
                None => panic!("unterminated string on line {}", open_line),
                Some(c) if c == delimiter => {
                    if chunk_start < self.cursor {
                        tokens.push(Token::new(
                            TokenKind::StringLiteral,
                            self.image(chunk_start),
                            chunk_line,
                            self.line,
                        ));
                    }
                    let close_line = self.line;
                    self.bump();
                    tokens.push(Token::new(kind, (delimiter as char).to_string(), close_line, close_line));
                    return;
                }
                Some(b'$') if self.peek_at(1).map(is_ident_start).unwrap_or(false) => {
                    if chunk_start < self.cursor {
                        tokens.push(Token::new(
                            TokenKind::StringLiteral,
                            self.image(chunk_start),
                            chunk_line,
                            self.line,
                        ));
                    }
                    let var_start = self.cursor;
                    let var_line = self.line;
                    self.bump();
                    self.read_identifier();
                    tokens.push(Token::new(TokenKind::Variable, self.image(var_start), var_line, self.line));
                    chunk_start = self.cursor;
                    chunk_line = self.line;
                }
                Some(b'\\') => {
                    self.bump();
                    self.bump();
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn read_identifier(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> TokenKind {
        if self.peek() == Some(b'0') {
            match self.peek_at(1) {
                Some(b'x') | Some(b'X') => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.peek() {
                        if c.is_ascii_hexdigit() || c == b'_' {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    return TokenKind::LNumber;
                }
                Some(b'b') | Some(b'B') => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.peek() {
                        if c == b'0' || c == b'1' || c == b'_' {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    return TokenKind::LNumber;
                }
                Some(b'o') | Some(b'O') => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.peek() {
                        if (b'0'..=b'7').contains(&c) || c == b'_' {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    return TokenKind::LNumber;
                }
                _ => {}
            }
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == b'_' {
                self.bump();
            } else if c == b'.' && !is_float && self.peek_at(1).map(|d| d.is_ascii_digit()).unwrap_or(false) {
                is_float = true;
                self.bump();
            } else if c == b'e' || c == b'E' {
                is_float = true;
                self.bump();
                if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                    self.bump();
                }
            } else {
                break;
            }
        }
        if is_float {
            TokenKind::DNumber
        } else {
            TokenKind::LNumber
        }
    }

    fn scan_operator(&mut self, tokens: &mut Vec<Token>, start: usize, start_line: usize) {
        let c = self.input[self.cursor];
        let kind = match c {
            b'\\' => {
                self.bump();
                TokenKind::NsSeparator
            }
            b'&' => {
                self.bump();
                TokenKind::Ampersand
            }
            b'=' if self.peek_at(1) == Some(b'>') => {
                self.bump();
                self.bump();
                TokenKind::DoubleArrow
            }
            b'=' => {
                self.bump();
                TokenKind::Eq
            }
            b':' if self.peek_at(1) == Some(b':') => {
                self.bump();
                self.bump();
                TokenKind::DoubleColon
            }
            b'-' if self.peek_at(1) == Some(b'>') => {
                self.bump();
                self.bump();
                TokenKind::Arrow
            }
            b'-' => {
                self.bump();
                TokenKind::Minus
            }
            b'+' => {
                self.bump();
                TokenKind::Plus
            }
            b',' => {
                self.bump();
                TokenKind::Comma
            }
            b';' => {
                self.bump();
                TokenKind::SemiColon
            }
            b'(' => {
                self.bump();
                TokenKind::OpenParen
            }
            b')' => {
                self.bump();
                TokenKind::CloseParen
            }
            b'{' => {
                self.bump();
                TokenKind::OpenBrace
            }
            b'}' => {
                self.bump();
                TokenKind::CloseBrace
            }
            _ => panic!("unexpected character '{}' on line {}", c as char, start_line),
        };
        tokens.push(Token::new(kind, self.image(start), start_line, start_line));
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn keyword_kind(image: &str) -> TokenKind {
    match image.to_ascii_lowercase().as_str() {
        "function" => TokenKind::Function,
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "extends" => TokenKind::Extends,
        "implements" => TokenKind::Implements,
        "public" => TokenKind::Public,
        "protected" => TokenKind::Protected,
        "private" => TokenKind::Private,
        "static" => TokenKind::Static,
        "abstract" => TokenKind::Abstract,
        "final" => TokenKind::Final,
        "namespace" => TokenKind::Namespace,
        "use" => TokenKind::Use,
        "as" => TokenKind::As,
        "const" => TokenKind::Const,
        "new" => TokenKind::New,
        "instanceof" => TokenKind::InstanceOf,
        "catch" => TokenKind::Catch,
        "array" => TokenKind::Array,
        "null" => TokenKind::Null,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "self" => TokenKind::SelfKw,
        "__line__" => TokenKind::Line,
        "__file__" => TokenKind::File,
        "__dir__" => TokenKind::Dir,
        "__class__" => TokenKind::ClassC,
        "__method__" => TokenKind::MethodC,
        "__function__" => TokenKind::FuncC,
        "__namespace__" => TokenKind::NsC,
        _ => TokenKind::Identifier,
    }
}
