mod annotations;
mod cursor;
mod names;
mod scope;

use tracing::{debug, trace};

use crate::builder::Builder;
use crate::error::{ParseError, Result};
use crate::model::{Callable, Constant, Modifiers, Parameter, Property, SourceFile, Type, TypeKind, Value};
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::DEFAULT_PACKAGE;

use annotations::AnnotationReader;
use cursor::TokenCursor;
use scope::ScopeStack;

/// The declaration parser.
///
/// One instance parses one file: `parse` pulls the whole token stream
/// and materialises every declaration through the builder. The builder
/// outlives the parser and is shared across the files of a code base,
/// which is how cross-file references resolve.
pub struct Parser<'b, T: Tokenizer, B: Builder> {
    cursor: TokenCursor<T>,
    builder: &'b mut B,
    scope: ScopeStack,
    annotations: AnnotationReader,
    ignore_annotations: bool,
    source_file: SourceFile,

    // State reset at top-level boundaries.
    doc_comment: Option<String>,
    modifiers: Modifiers,
    package_name: String,
    global_package_name: String,
    namespace_name: Option<String>,
    namespace_prefix_replaced: bool,
}

impl<'b, T: Tokenizer, B: Builder> Parser<'b, T, B> {
    pub fn new(tokenizer: T, builder: &'b mut B) -> Self {
        let cursor = TokenCursor::new(tokenizer);
        let source_file = cursor.source_file();
        Self {
            cursor,
            builder,
            scope: ScopeStack::new(),
            annotations: AnnotationReader::new(),
            ignore_annotations: false,
            source_file,
            doc_comment: None,
            modifiers: Modifiers::empty(),
            package_name: DEFAULT_PACKAGE.to_string(),
            global_package_name: DEFAULT_PACKAGE.to_string(),
            namespace_name: None,
            namespace_prefix_replaced: false,
        }
    }

    /// Suppresses doc-comment type extraction: `@throws`, `@return`,
    /// `@var`, and the inline `@var` hints in callable bodies.
    pub fn set_ignore_annotations(&mut self) {
        self.ignore_annotations = true;
    }

    /// Parses the whole token stream of the current file.
    pub fn parse(&mut self) -> Result<()> {
        debug!(file = %self.source_file.path().display(), "parsing declarations");
        self.scope.push_scope();
        let result = self.parse_tokens();
        self.scope.pop_scope();
        result
    }

    fn parse_tokens(&mut self) -> Result<()> {
        self.reset();
        loop {
            match self.cursor.peek() {
                TokenKind::Eof => return Ok(()),
                TokenKind::Comment => {
                    self.cursor.next();
                }
                TokenKind::DocComment => self.parse_doc_comment(),
                TokenKind::Interface => {
                    self.parse_interface_declaration()?;
                    self.reset();
                }
                TokenKind::Class | TokenKind::Final | TokenKind::Abstract => {
                    self.parse_class_declaration()?;
                    self.reset();
                }
                TokenKind::Function => {
                    let mut tokens = Vec::new();
                    self.parse_function_or_closure(&mut tokens)?;
                    self.reset();
                }
                TokenKind::Use => {
                    self.parse_use_declarations()?;
                    self.reset();
                }
                TokenKind::Namespace => {
                    self.parse_namespace_declaration()?;
                    self.reset();
                }
                _ => {
                    self.cursor.next();
                    self.reset();
                }
            }
        }
    }

    /// Clears the pending doc comment and `@package`, and sets the
    /// modifier accumulator.
    fn reset(&mut self) {
        self.reset_with(Modifiers::empty());
    }

    fn reset_with(&mut self, modifiers: Modifiers) {
        self.doc_comment = None;
        self.package_name = DEFAULT_PACKAGE.to_string();
        self.modifiers = modifiers;
    }

    /// Consumes a top-level doc comment and extracts its `@package`.
    ///
    /// The comment is a file comment only when it directly follows the
    /// open tag and is not attached to a following type or function
    /// declaration; the first file comment fixes the file-global
    /// package and the source file's doc comment.
    fn parse_doc_comment(&mut self) {
        let follows_open_tag = self.cursor.prev() == TokenKind::OpenTag;
        let token = self.cursor.next();
        let package = self.annotations.package_name(&token.image);

        let file_comment = follows_open_tag
            && !matches!(
                self.cursor.peek(),
                TokenKind::Class
                    | TokenKind::Interface
                    | TokenKind::Final
                    | TokenKind::Abstract
                    | TokenKind::Function
            );
        if file_comment && self.global_package_name == DEFAULT_PACKAGE {
            self.global_package_name = package.clone();
            self.source_file.set_doc_comment(token.image.as_str());
        }

        self.package_name = package;
        self.doc_comment = Some(token.image);
    }

    fn parse_namespace_declaration(&mut self) -> Result<()> {
        let mut tokens = Vec::new();
        self.cursor.consume(TokenKind::Namespace, &mut tokens)?;
        self.cursor.consume_comments(&mut tokens);

        match self.cursor.peek() {
            TokenKind::OpenBrace => {
                // `namespace { ... }`: the unnamed namespace. The braces
                // and body fall through to the main loop.
                self.cursor.consume(TokenKind::OpenBrace, &mut tokens)?;
                self.builder.build_package("");
                self.namespace_name = Some(String::new());
            }
            TokenKind::NsSeparator => {
                // `namespace\Thing` is a reference to the current
                // namespace, not a declaration.
                while self.cursor.peek() == TokenKind::NsSeparator {
                    self.cursor.consume(TokenKind::NsSeparator, &mut tokens)?;
                    self.cursor.consume(TokenKind::Identifier, &mut tokens)?;
                }
            }
            _ => {
                let token = self.cursor.consume(TokenKind::Identifier, &mut tokens)?;
                let mut name = token.image;
                loop {
                    self.cursor.consume_comments(&mut tokens);
                    if self.cursor.peek() != TokenKind::NsSeparator {
                        break;
                    }
                    self.cursor.consume(TokenKind::NsSeparator, &mut tokens)?;
                    let token = self.cursor.consume(TokenKind::Identifier, &mut tokens)?;
                    name.push(crate::NAMESPACE_SEPARATOR);
                    name.push_str(&token.image);
                }
                self.cursor.consume_comments(&mut tokens);
                match self.cursor.peek() {
                    TokenKind::OpenBrace => {
                        self.cursor.consume(TokenKind::OpenBrace, &mut tokens)?;
                    }
                    _ => {
                        self.cursor.consume(TokenKind::SemiColon, &mut tokens)?;
                    }
                }
                debug!(namespace = %name, "namespace declaration");
                self.builder.build_package(&name);
                self.namespace_name = Some(name);
            }
        }
        Ok(())
    }

    fn parse_use_declarations(&mut self) -> Result<()> {
        let mut tokens = Vec::new();
        self.cursor.consume(TokenKind::Use, &mut tokens)?;
        loop {
            self.cursor.consume_comments(&mut tokens);
            self.parse_use_declaration(&mut tokens)?;
            self.cursor.consume_comments(&mut tokens);
            if self.cursor.peek() == TokenKind::Comma {
                self.cursor.consume(TokenKind::Comma, &mut tokens)?;
            } else {
                self.cursor.consume(TokenKind::SemiColon, &mut tokens)?;
                return Ok(());
            }
        }
    }

    fn parse_use_declaration(&mut self, tokens: &mut Vec<Token>) -> Result<()> {
        if self.cursor.peek() == TokenKind::NsSeparator {
            self.cursor.consume(TokenKind::NsSeparator, tokens)?;
        }
        let token = self.cursor.consume(TokenKind::Identifier, tokens)?;
        let mut fragments = vec![token.image];
        while self.cursor.peek() == TokenKind::NsSeparator {
            self.cursor.consume(TokenKind::NsSeparator, tokens)?;
            let token = self.cursor.consume(TokenKind::Identifier, tokens)?;
            fragments.push(token.image);
        }
        let qualified = fragments.join("\\");

        self.cursor.consume_comments(tokens);
        let short = if self.cursor.peek() == TokenKind::As {
            self.cursor.consume(TokenKind::As, tokens)?;
            self.cursor.consume_comments(tokens);
            self.cursor.consume(TokenKind::Identifier, tokens)?.image
        } else {
            fragments.last().cloned().unwrap_or_default()
        };

        self.scope.add(short, qualified);
        Ok(())
    }

    fn parse_class_declaration(&mut self) -> Result<()> {
        let mut tokens = Vec::new();
        let mut start_line = 0;

        match self.cursor.peek() {
            TokenKind::Abstract => {
                let token = self.cursor.consume(TokenKind::Abstract, &mut tokens)?;
                self.modifiers.raise(Modifiers::EXPLICIT_ABSTRACT);
                start_line = token.start_line;
            }
            TokenKind::Final => {
                let token = self.cursor.consume(TokenKind::Final, &mut tokens)?;
                self.modifiers.raise(Modifiers::FINAL);
                start_line = token.start_line;
            }
            _ => {}
        }

        self.cursor.consume_comments(&mut tokens);
        let class_token = self.cursor.consume(TokenKind::Class, &mut tokens)?;
        if start_line == 0 {
            start_line = class_token.start_line;
        }
        self.cursor.consume_comments(&mut tokens);
        let name_token = self.cursor.consume(TokenKind::Identifier, &mut tokens)?;

        let qualified_name = self.qualified_type_name(&name_token.image);
        trace!(class = %qualified_name, "class declaration");
        let class = self.builder.build_class(&qualified_name);
        class.set_source_file(self.source_file.clone());
        class.set_start_line(start_line);
        class.set_modifiers(self.modifiers);
        class.set_user_defined();
        if let Some(comment) = self.doc_comment.take() {
            class.set_doc_comment(comment);
        }

        let package_name = self.effective_package_name();
        self.builder.build_package(&package_name).add_type(class.clone());

        self.cursor.consume_comments(&mut tokens);
        if self.cursor.peek() == TokenKind::Extends {
            self.cursor.consume(TokenKind::Extends, &mut tokens)?;
            self.cursor.consume_comments(&mut tokens);
            let parent_name = self.parse_qualified_name(&mut tokens)?;
            let parent = self.builder.build_class_reference(&parent_name);
            class.set_parent_class(parent);
            self.cursor.consume_comments(&mut tokens);
        }
        if self.cursor.peek() == TokenKind::Implements {
            self.cursor.consume(TokenKind::Implements, &mut tokens)?;
            self.parse_interface_list(&class, &mut tokens)?;
        }

        self.parse_type_body(&class, &mut tokens, TypeKind::Class)?;
        class.set_tokens(tokens);
        Ok(())
    }

    fn parse_interface_declaration(&mut self) -> Result<()> {
        let mut tokens = Vec::new();
        let interface_token = self.cursor.consume(TokenKind::Interface, &mut tokens)?;
        self.cursor.consume_comments(&mut tokens);
        let name_token = self.cursor.consume(TokenKind::Identifier, &mut tokens)?;

        let qualified_name = self.qualified_type_name(&name_token.image);
        trace!(interface = %qualified_name, "interface declaration");
        let interface = self.builder.build_interface(&qualified_name);
        interface.set_source_file(self.source_file.clone());
        interface.set_start_line(interface_token.start_line);
        interface.set_user_defined();
        if let Some(comment) = self.doc_comment.take() {
            interface.set_doc_comment(comment);
        }

        let package_name = self.effective_package_name();
        self.builder.build_package(&package_name).add_type(interface.clone());

        self.cursor.consume_comments(&mut tokens);
        if self.cursor.peek() == TokenKind::Extends {
            self.cursor.consume(TokenKind::Extends, &mut tokens)?;
            self.parse_interface_list(&interface, &mut tokens)?;
        }

        self.parse_type_body(&interface, &mut tokens, TypeKind::Interface)?;
        interface.set_tokens(tokens);
        Ok(())
    }

    fn parse_interface_list(&mut self, ty: &Type, tokens: &mut Vec<Token>) -> Result<()> {
        loop {
            self.cursor.consume_comments(tokens);
            let name = self.parse_qualified_name(tokens)?;
            let reference = self.builder.build_interface_reference(&name);
            ty.add_interface(reference);
            self.cursor.consume_comments(tokens);
            if self.cursor.peek() == TokenKind::Comma {
                self.cursor.consume(TokenKind::Comma, tokens)?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_type_body(&mut self, ty: &Type, tokens: &mut Vec<Token>, kind: TypeKind) -> Result<()> {
        self.cursor.consume_comments(tokens);
        self.cursor.consume(TokenKind::OpenBrace, tokens)?;

        // Members without explicit visibility are public; interface
        // members are abstract as well.
        let default_modifiers = if kind == TypeKind::Interface {
            Modifiers::PUBLIC | Modifiers::ABSTRACT
        } else {
            Modifiers::PUBLIC
        };
        self.modifiers = default_modifiers;

        loop {
            match self.cursor.peek() {
                TokenKind::Eof => return Err(self.cursor.token_stream_end()),
                TokenKind::CloseBrace => {
                    let token = self.cursor.consume(TokenKind::CloseBrace, tokens)?;
                    ty.set_end_line(token.end_line);
                    return Ok(());
                }
                TokenKind::Function => {
                    let method = self.parse_method(tokens)?;
                    ty.add_method(method);
                    self.reset_with(default_modifiers);
                }
                TokenKind::Variable => {
                    let token = self.cursor.consume(TokenKind::Variable, tokens)?;
                    let property = self.builder.build_property(&token.image);
                    property.set_source_file(self.source_file.clone());
                    property.set_start_line(token.start_line);
                    property.set_end_line(token.start_line);
                    property.set_modifiers(self.modifiers);
                    if let Some(comment) = self.doc_comment.take() {
                        property.set_doc_comment(comment);
                    }
                    self.prepare_property(&property);
                    ty.add_property(property);
                }
                TokenKind::Const => {
                    let constant = self.parse_type_constant(tokens)?;
                    ty.add_constant(constant);
                    self.reset_with(default_modifiers);
                }
                kind if kind.is_modifier() => {
                    self.cursor.consume(kind, tokens)?;
                    self.modifiers.raise(modifier_bit(kind));
                }
                TokenKind::DocComment => {
                    let token = self.cursor.consume(TokenKind::DocComment, tokens)?;
                    self.doc_comment = Some(token.image);
                }
                TokenKind::Comment => {
                    self.cursor.consume(TokenKind::Comment, tokens)?;
                }
                _ => {
                    tokens.push(self.cursor.next());
                    self.reset_with(default_modifiers);
                }
            }
        }
    }

    fn parse_type_constant(&mut self, tokens: &mut Vec<Token>) -> Result<Constant> {
        self.cursor.consume(TokenKind::Const, tokens)?;
        self.cursor.consume_comments(tokens);
        let name_token = self.cursor.consume(TokenKind::Identifier, tokens)?;

        let constant = self.builder.build_type_constant(&name_token.image);
        constant.set_source_file(self.source_file.clone());
        constant.set_start_line(name_token.start_line);
        constant.set_end_line(name_token.start_line);
        if let Some(comment) = self.doc_comment.take() {
            constant.set_doc_comment(comment);
        }

        self.cursor.consume_comments(tokens);
        self.cursor.consume(TokenKind::Eq, tokens)?;
        self.parse_default_value(tokens)?;
        if self.cursor.peek() == TokenKind::SemiColon {
            self.cursor.consume(TokenKind::SemiColon, tokens)?;
        }
        Ok(constant)
    }

    fn parse_method(&mut self, tokens: &mut Vec<Token>) -> Result<Callable> {
        let mark = tokens.len();
        let function_token = self.cursor.consume(TokenKind::Function, tokens)?;
        self.cursor.consume_comments(tokens);

        let returns_reference = if self.cursor.peek() == TokenKind::Ampersand {
            self.cursor.consume(TokenKind::Ampersand, tokens)?;
            true
        } else {
            false
        };
        self.cursor.consume_comments(tokens);
        let name_token = self.cursor.consume(TokenKind::Identifier, tokens)?;
        trace!(method = %name_token.image, "method declaration");

        let method = self.builder.build_method(&name_token.image);
        method.set_source_file(self.source_file.clone());
        method.set_start_line(function_token.start_line);
        method.set_modifiers(self.modifiers);
        if returns_reference {
            method.set_returns_reference();
        }
        if let Some(comment) = self.doc_comment.take() {
            method.set_doc_comment(comment);
        }

        self.parse_parameter_list(&method, tokens)?;
        self.cursor.consume_comments(tokens);
        if self.cursor.peek() == TokenKind::OpenBrace {
            self.parse_callable_body(&method, tokens)?;
        } else {
            let token = self.cursor.consume(TokenKind::SemiColon, tokens)?;
            method.set_end_line(token.start_line);
        }

        self.prepare_callable(&method);
        method.set_tokens(tokens[mark..].to_vec());
        Ok(method)
    }

    fn parse_function_or_closure(&mut self, tokens: &mut Vec<Token>) -> Result<Callable> {
        let mark = tokens.len();
        let function_token = self.cursor.consume(TokenKind::Function, tokens)?;
        self.cursor.consume_comments(tokens);

        let returns_reference = if self.cursor.peek() == TokenKind::Ampersand {
            self.cursor.consume(TokenKind::Ampersand, tokens)?;
            true
        } else {
            false
        };
        self.cursor.consume_comments(tokens);

        let callable = if self.cursor.peek() == TokenKind::OpenParen {
            let closure = self.builder.build_closure();
            closure.set_source_file(self.source_file.clone());
            closure.set_start_line(function_token.start_line);
            if returns_reference {
                closure.set_returns_reference();
            }
            if let Some(comment) = self.doc_comment.take() {
                closure.set_doc_comment(comment);
            }
            self.parse_parameter_list(&closure, tokens)?;
            self.cursor.consume_comments(tokens);
            if self.cursor.peek() == TokenKind::Use {
                self.parse_bound_variables(&closure, tokens)?;
            }
            self.cursor.consume_comments(tokens);
            self.parse_callable_body(&closure, tokens)?;
            closure
        } else {
            let name_token = self.cursor.consume(TokenKind::Identifier, tokens)?;
            trace!(function = %name_token.image, "function declaration");
            let function = self.builder.build_function(&name_token.image);
            function.set_source_file(self.source_file.clone());
            function.set_start_line(function_token.start_line);
            if returns_reference {
                function.set_returns_reference();
            }
            if let Some(comment) = self.doc_comment.take() {
                function.set_doc_comment(comment);
            }
            self.parse_parameter_list(&function, tokens)?;
            self.cursor.consume_comments(tokens);
            if self.cursor.peek() == TokenKind::OpenBrace {
                self.parse_callable_body(&function, tokens)?;
            } else {
                let token = self.cursor.consume(TokenKind::SemiColon, tokens)?;
                function.set_end_line(token.start_line);
            }
            let package_name = self.effective_package_name();
            self.builder.build_package(&package_name).add_function(function.clone());
            function
        };

        self.prepare_callable(&callable);
        callable.set_tokens(tokens[mark..].to_vec());
        Ok(callable)
    }

    fn parse_bound_variables(&mut self, closure: &Callable, tokens: &mut Vec<Token>) -> Result<()> {
        self.cursor.consume(TokenKind::Use, tokens)?;
        self.cursor.consume_comments(tokens);
        self.cursor.consume(TokenKind::OpenParen, tokens)?;
        loop {
            self.cursor.consume_comments(tokens);
            if self.cursor.peek() == TokenKind::Ampersand {
                self.cursor.consume(TokenKind::Ampersand, tokens)?;
            }
            let variable = self.cursor.consume(TokenKind::Variable, tokens)?;
            closure.add_bound_variable(variable.image);
            self.cursor.consume_comments(tokens);
            if self.cursor.peek() == TokenKind::Comma {
                self.cursor.consume(TokenKind::Comma, tokens)?;
                continue;
            }
            self.cursor.consume(TokenKind::CloseParen, tokens)?;
            return Ok(());
        }
    }

    fn parse_parameter_list(&mut self, callable: &Callable, tokens: &mut Vec<Token>) -> Result<()> {
        self.cursor.consume_comments(tokens);
        self.cursor.consume(TokenKind::OpenParen, tokens)?;

        let mut parameters = Vec::new();
        loop {
            self.cursor.consume_comments(tokens);
            match self.cursor.peek() {
                TokenKind::Eof => return Err(self.cursor.token_stream_end()),
                TokenKind::CloseParen => {
                    self.cursor.consume(TokenKind::CloseParen, tokens)?;
                    break;
                }
                TokenKind::Comma => {
                    self.cursor.consume(TokenKind::Comma, tokens)?;
                }
                _ => {
                    let parameter = self.parse_parameter(parameters.len(), tokens)?;
                    parameters.push(parameter);
                }
            }
        }

        // A parameter is optional only when it and every parameter
        // after it carry a default value.
        let mut optional = true;
        for parameter in parameters.iter().rev() {
            optional = optional && parameter.default_value().is_some();
            parameter.set_optional(optional);
        }
        for parameter in parameters {
            callable.add_parameter(parameter);
        }
        Ok(())
    }

    fn parse_parameter(&mut self, position: usize, tokens: &mut Vec<Token>) -> Result<Parameter> {
        let mut type_hint = None;
        let mut array_hint = false;
        match self.cursor.peek() {
            TokenKind::Identifier | TokenKind::NsSeparator | TokenKind::Namespace => {
                let name = self.parse_qualified_name(tokens)?;
                type_hint = Some(self.builder.build_class_or_interface_reference(&name));
            }
            TokenKind::Array => {
                self.cursor.consume(TokenKind::Array, tokens)?;
                array_hint = true;
            }
            _ => {}
        }

        self.cursor.consume_comments(tokens);
        let by_reference = if self.cursor.peek() == TokenKind::Ampersand {
            self.cursor.consume(TokenKind::Ampersand, tokens)?;
            true
        } else {
            false
        };
        self.cursor.consume_comments(tokens);
        let name_token = self.cursor.consume(TokenKind::Variable, tokens)?;

        let parameter = self.builder.build_parameter(&name_token.image);
        parameter.set_position(position);
        if by_reference {
            parameter.set_passed_by_reference();
        }
        if array_hint {
            parameter.set_array_hint();
        }
        if let Some(hint) = type_hint {
            parameter.set_type_hint(hint);
        }

        self.cursor.consume_comments(tokens);
        if self.cursor.peek() == TokenKind::Eq {
            self.cursor.consume(TokenKind::Eq, tokens)?;
            let value = self.parse_default_value(tokens)?;
            parameter.set_default_value(value);
        }
        Ok(parameter)
    }

    fn parse_callable_body(&mut self, callable: &Callable, tokens: &mut Vec<Token>) -> Result<()> {
        self.scope.push_scope();
        let result = self.parse_callable_body_scan(callable, tokens);
        self.scope.pop_scope();
        result
    }

    /// Scans a `{ ... }` body, extracting references with dependency
    /// meaning and counting brace depth until the body closes.
    fn parse_callable_body_scan(&mut self, callable: &Callable, tokens: &mut Vec<Token>) -> Result<()> {
        self.cursor.consume(TokenKind::OpenBrace, tokens)?;
        let mut depth = 1usize;

        loop {
            match self.cursor.peek() {
                TokenKind::Eof => return Err(self.cursor.token_stream_end()),
                TokenKind::OpenBrace => {
                    self.cursor.consume(TokenKind::OpenBrace, tokens)?;
                    depth += 1;
                }
                TokenKind::CloseBrace => {
                    let token = self.cursor.consume(TokenKind::CloseBrace, tokens)?;
                    depth -= 1;
                    if depth == 0 {
                        callable.set_end_line(token.start_line);
                        return Ok(());
                    }
                }
                TokenKind::Catch => {
                    self.cursor.consume(TokenKind::Catch, tokens)?;
                    self.cursor.consume_comments(tokens);
                    self.cursor.consume(TokenKind::OpenParen, tokens)?;
                    self.cursor.consume_comments(tokens);
                    let name = self.parse_qualified_name(tokens)?;
                    let reference = self.builder.build_class_or_interface_reference(&name);
                    callable.add_dependency(reference);
                }
                TokenKind::New => {
                    self.cursor.consume(TokenKind::New, tokens)?;
                    self.cursor.consume_comments(tokens);
                    // `new $variable` is dynamic and carries no static
                    // dependency.
                    if matches!(
                        self.cursor.peek(),
                        TokenKind::Identifier | TokenKind::NsSeparator | TokenKind::Namespace
                    ) {
                        let name = self.parse_qualified_name(tokens)?;
                        let reference = self.builder.build_class_reference(&name);
                        callable.add_dependency(reference);
                    }
                }
                TokenKind::InstanceOf => {
                    self.cursor.consume(TokenKind::InstanceOf, tokens)?;
                    self.cursor.consume_comments(tokens);
                    if matches!(
                        self.cursor.peek(),
                        TokenKind::Identifier | TokenKind::NsSeparator | TokenKind::Namespace
                    ) {
                        let name = self.parse_qualified_name(tokens)?;
                        let reference = self.builder.build_class_or_interface_reference(&name);
                        callable.add_dependency(reference);
                    }
                }
                TokenKind::Identifier | TokenKind::NsSeparator | TokenKind::Namespace => {
                    let name = self.parse_qualified_name(tokens)?;
                    if self.cursor.peek() == TokenKind::DoubleColon {
                        self.cursor.consume(TokenKind::DoubleColon, tokens)?;
                        if matches!(self.cursor.peek(), TokenKind::Identifier | TokenKind::Variable) {
                            tokens.push(self.cursor.next());
                            let reference = self.builder.build_class_or_interface_reference(&name);
                            callable.add_dependency(reference);
                        }
                    }
                }
                TokenKind::DoubleQuote => self.skip_quoted(TokenKind::DoubleQuote, tokens)?,
                TokenKind::Backtick => self.skip_quoted(TokenKind::Backtick, tokens)?,
                TokenKind::Function => {
                    self.parse_function_or_closure(tokens)?;
                }
                TokenKind::Comment => {
                    let token = self.cursor.consume(TokenKind::Comment, tokens)?;
                    if !self.ignore_annotations {
                        if let Some(name) = self.annotations.inline_var_type(&token.image) {
                            let reference = self.builder.build_class_or_interface_reference(&name);
                            callable.add_dependency(reference);
                        }
                    }
                }
                _ => {
                    tokens.push(self.cursor.next());
                }
            }
        }
    }

    /// Skips a quoted token run; the lexer guarantees the delimiters
    /// are balanced, so nesting is not tracked.
    fn skip_quoted(&mut self, delimiter: TokenKind, tokens: &mut Vec<Token>) -> Result<()> {
        self.cursor.consume(delimiter, tokens)?;
        loop {
            match self.cursor.peek() {
                TokenKind::Eof => return Err(self.cursor.token_stream_end()),
                kind if kind == delimiter => {
                    self.cursor.consume(delimiter, tokens)?;
                    return Ok(());
                }
                _ => {
                    tokens.push(self.cursor.next());
                }
            }
        }
    }

    fn parse_default_value(&mut self, tokens: &mut Vec<Token>) -> Result<Value> {
        let mut value: Option<Value> = None;
        let mut negative = false;

        loop {
            match self.cursor.peek() {
                TokenKind::Comma | TokenKind::SemiColon | TokenKind::CloseParen => break,
                TokenKind::Eof => return Err(self.cursor.token_stream_end()),
                TokenKind::Null => {
                    self.cursor.consume(TokenKind::Null, tokens)?;
                    value = Some(Value::Null);
                }
                TokenKind::True => {
                    self.cursor.consume(TokenKind::True, tokens)?;
                    value = Some(Value::Bool(true));
                }
                TokenKind::False => {
                    self.cursor.consume(TokenKind::False, tokens)?;
                    value = Some(Value::Bool(false));
                }
                TokenKind::LNumber => {
                    let token = self.cursor.consume(TokenKind::LNumber, tokens)?;
                    value = Some(Value::from_int_image(&token.image, negative));
                    negative = false;
                }
                TokenKind::DNumber => {
                    let token = self.cursor.consume(TokenKind::DNumber, tokens)?;
                    value = Some(Value::from_float_image(&token.image, negative));
                    negative = false;
                }
                TokenKind::StringLiteral => {
                    let token = self.cursor.consume(TokenKind::StringLiteral, tokens)?;
                    value = Some(Value::from_string_image(&token.image));
                }
                TokenKind::Plus => {
                    self.cursor.consume(TokenKind::Plus, tokens)?;
                }
                TokenKind::Minus => {
                    self.cursor.consume(TokenKind::Minus, tokens)?;
                    negative = !negative;
                }
                TokenKind::Array => {
                    self.cursor.consume(TokenKind::Array, tokens)?;
                    self.cursor.consume_comments(tokens);
                    self.skip_parenthesized(tokens)?;
                    value = Some(Value::Array);
                }
                TokenKind::Identifier
                | TokenKind::NsSeparator
                | TokenKind::DoubleColon
                | TokenKind::SelfKw
                | TokenKind::Dir
                | TokenKind::File
                | TokenKind::Line
                | TokenKind::ClassC
                | TokenKind::MethodC
                | TokenKind::FuncC
                | TokenKind::NsC => {
                    // Constants and magic constants are present but not
                    // computable at parse time.
                    tokens.push(self.cursor.next());
                    value = Some(Value::Unresolved);
                }
                TokenKind::Comment | TokenKind::DocComment => {
                    self.cursor.consume_comments(tokens);
                }
                _ => {
                    tokens.push(self.cursor.next());
                }
            }
        }

        match value {
            Some(value) => Ok(value),
            None => Err(ParseError::MissingValue {
                file: self.source_file.path().display().to_string(),
                line: tokens.last().map(|t| t.start_line).unwrap_or(0),
            }),
        }
    }

    /// Consumes a balanced parenthesized token run.
    fn skip_parenthesized(&mut self, tokens: &mut Vec<Token>) -> Result<()> {
        self.cursor.consume(TokenKind::OpenParen, tokens)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.cursor.peek() {
                TokenKind::Eof => return Err(self.cursor.token_stream_end()),
                TokenKind::OpenParen => {
                    self.cursor.consume(TokenKind::OpenParen, tokens)?;
                    depth += 1;
                }
                TokenKind::CloseParen => {
                    self.cursor.consume(TokenKind::CloseParen, tokens)?;
                    depth -= 1;
                }
                _ => {
                    tokens.push(self.cursor.next());
                }
            }
        }
        Ok(())
    }

    /// Applies `@throws` and `@return` annotations to a parsed callable.
    fn prepare_callable(&mut self, callable: &Callable) {
        if self.ignore_annotations {
            return;
        }
        let comment = match callable.doc_comment() {
            Some(comment) => comment,
            None => return,
        };
        for name in self.annotations.throws_types(&comment) {
            let reference = self.builder.build_class_or_interface_reference(&name);
            callable.add_exception(reference);
        }
        if let Some(name) = self.annotations.return_type(&comment) {
            let reference = self.builder.build_class_or_interface_reference(&name);
            callable.set_return_type(reference);
        }
    }

    /// Applies a `@var` annotation to a parsed property.
    fn prepare_property(&mut self, property: &Property) {
        if self.ignore_annotations {
            return;
        }
        let comment = match property.doc_comment() {
            Some(comment) => comment,
            None => return,
        };
        if let Some(name) = self.annotations.var_type(&comment) {
            let reference = self.builder.build_class_or_interface_reference(&name);
            property.set_type_hint(reference);
        }
    }
}

/// The modifier bit a visibility or scope keyword raises.
fn modifier_bit(kind: TokenKind) -> Modifiers {
    match kind {
        TokenKind::Public => Modifiers::PUBLIC,
        TokenKind::Protected => Modifiers::PROTECTED,
        TokenKind::Private => Modifiers::PRIVATE,
        TokenKind::Static => Modifiers::STATIC,
        TokenKind::Abstract => Modifiers::ABSTRACT,
        TokenKind::Final => Modifiers::FINAL,
        _ => Modifiers::empty(),
    }
}
