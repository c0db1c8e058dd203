use crate::builder::Builder;
use crate::error::Result;
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::{DEFAULT_PACKAGE, PACKAGE_SEPARATOR};

use super::Parser;

impl<'b, T: Tokenizer, B: Builder> Parser<'b, T, B> {
    /// Parses a qualified name and resolves it against the alias table
    /// and the current namespace.
    ///
    /// A leading separator marks the name as already absolute. A name
    /// that started with the `namespace` keyword already carries the
    /// namespace and skips both the alias lookup and the prepend.
    /// Otherwise the first fragment is looked up in the alias table; on
    /// a miss the current namespace is prepended.
    pub(super) fn parse_qualified_name(&mut self, tokens: &mut Vec<Token>) -> Result<String> {
        let fragments = self.parse_qualified_name_raw(tokens)?;

        if fragments.first().map(String::as_str) == Some("\\") {
            return Ok(fragments.concat());
        }

        if !self.namespace_prefix_replaced {
            let mapped = match fragments.first() {
                Some(first) => self.scope.lookup(first).map(str::to_string),
                None => None,
            };
            if let Some(mapped) = mapped {
                let mut fragments = fragments;
                fragments[0] = mapped;
                return Ok(fragments.concat());
            }

            if let Some(namespace) = &self.namespace_name {
                if !namespace.is_empty() {
                    return Ok(format!("{}\\{}", namespace, fragments.concat()));
                }
            }
        }

        Ok(fragments.concat())
    }

    /// Collects the raw fragments of a qualified name. Separators are
    /// kept as their own `"\\"` fragments; a leading `namespace` keyword
    /// is replaced by the current namespace.
    pub(super) fn parse_qualified_name_raw(&mut self, tokens: &mut Vec<Token>) -> Result<Vec<String>> {
        self.namespace_prefix_replaced = false;
        let mut fragments = Vec::new();

        match self.cursor.peek() {
            TokenKind::Identifier => {
                let token = self.cursor.consume(TokenKind::Identifier, tokens)?;
                fragments.push(token.image);
            }
            TokenKind::Namespace => {
                self.cursor.consume(TokenKind::Namespace, tokens)?;
                fragments.push(self.namespace_name.clone().unwrap_or_default());
                self.namespace_prefix_replaced = true;
            }
            TokenKind::NsSeparator => {}
            _ => {
                // Not a name at all; report the mismatch.
                self.cursor.consume(TokenKind::Identifier, tokens)?;
            }
        }

        while self.cursor.peek() == TokenKind::NsSeparator {
            self.cursor.consume(TokenKind::NsSeparator, tokens)?;
            fragments.push("\\".to_string());
            let token = self.cursor.consume(TokenKind::Identifier, tokens)?;
            fragments.push(token.image);
        }

        Ok(fragments)
    }

    /// Qualified name for a type declared at the current position: the
    /// active namespace when one is set, the active package otherwise.
    pub(super) fn qualified_type_name(&self, local_name: &str) -> String {
        match &self.namespace_name {
            Some(namespace) if namespace.is_empty() => local_name.to_string(),
            Some(namespace) => format!("{}\\{}", namespace, local_name),
            None => format!(
                "{}{}{}",
                self.package_or_global(),
                PACKAGE_SEPARATOR,
                local_name
            ),
        }
    }

    /// The package a top-level declaration belongs to: namespace first,
    /// then the pending `@package`, then the file-global package.
    pub(super) fn effective_package_name(&self) -> String {
        match &self.namespace_name {
            Some(namespace) => namespace.clone(),
            None => self.package_or_global(),
        }
    }

    fn package_or_global(&self) -> String {
        if self.package_name != DEFAULT_PACKAGE {
            self.package_name.clone()
        } else {
            self.global_package_name.clone()
        }
    }
}
