//! Import and export declarations.

use husk_dts_lexer::{TokenKind, TokenSource};

use super::{ParseCtx, Parser};
use crate::ast::*;
use crate::diagnostics::DiagnosticKind;

impl<S: TokenSource> Parser<S> {
    pub(super) fn parse_import(&mut self) -> Option<Statement> {
        let start = self.start_pos();
        self.advance();

        let next = self.nth(1);
        let type_only = self.at(TokenKind::Type)
            && (matches!(next, TokenKind::LBrace | TokenKind::Star)
                || (next.is_binding_identifier() && next != TokenKind::From));
        if type_only {
            self.advance();
        }

        let kind = if self.at(TokenKind::StringLiteral) {
            let source = self.expect_string()?;
            self.skip_import_attributes();
            ImportKind::SideEffect { source }
        } else if self.peek_kind().is_binding_identifier() && self.nth(1) == TokenKind::Eq {
            let name = self.expect_ident()?;
            self.advance();
            let target = self.parse_import_target()?;
            ImportKind::Equals { name, target }
        } else {
            let has_default =
                self.peek_kind().is_binding_identifier() && !self.at_named_import_start();
            let default = if has_default {
                Some(self.expect_ident()?)
            } else {
                None
            };

            let bindings = if default.is_none() || self.matches(TokenKind::Comma) {
                Some(self.parse_import_bindings()?)
            } else {
                None
            };

            self.expect(TokenKind::From)?;
            let source = self.expect_string()?;
            self.skip_import_attributes();
            ImportKind::Clause {
                default,
                bindings,
                source,
            }
        };
        self.parse_semicolon();

        Some(Statement {
            kind: StmtKind::Import(ImportDecl { type_only, kind }),
            span: self.span_from(start),
        })
    }

    /// A `{` or `*` opens the bindings rather than naming a default import.
    fn at_named_import_start(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::LBrace | TokenKind::Star)
    }

    /// `require("m")` or `A.B`
    fn parse_import_target(&mut self) -> Option<ImportTarget> {
        let is_require = self.at(TokenKind::Ident)
            && self.peek().text == "require"
            && self.nth(1) == TokenKind::LParen;
        if is_require {
            self.advance();
            self.advance();
            let source = self.expect_string()?;
            self.expect(TokenKind::RParen)?;
            Some(ImportTarget::Require(source))
        } else {
            Some(ImportTarget::Entity(self.parse_entity_name()?))
        }
    }

    /// `* as ns` or `{ a, type b, c as d }`
    fn parse_import_bindings(&mut self) -> Option<ImportBindings> {
        if self.matches(TokenKind::Star) {
            self.expect(TokenKind::As)?;
            return Some(ImportBindings::Namespace(self.expect_ident()?));
        }

        self.expect(TokenKind::LBrace)?;
        let mut specifiers = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let start = self.start_pos();
            let type_only = self.at_specifier_type_modifier();
            if type_only {
                self.advance();
            }
            let imported = self.parse_module_export_name()?;
            let local = if self.matches(TokenKind::As) {
                self.expect_ident()?
            } else {
                imported.clone()
            };
            specifiers.push(ImportSpecifier {
                imported,
                local,
                type_only,
                span: self.span_from(start),
            });
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Some(ImportBindings::Named(specifiers))
    }

    /// `type` before a specifier name, as opposed to a specifier named
    /// `type`. `{ type as x }` renames `type`; `{ type as }` and
    /// `{ type as as x }` import `as` type-only.
    fn at_specifier_type_modifier(&mut self) -> bool {
        if !self.at(TokenKind::Type) {
            return false;
        }
        match self.nth(1) {
            TokenKind::As => !self.nth(2).is_identifier_name() || self.nth(2) == TokenKind::As,
            TokenKind::StringLiteral => true,
            next => next.is_identifier_name(),
        }
    }

    /// Specifier names may be any identifier name or a string.
    fn parse_module_export_name(&mut self) -> Option<Ident> {
        if self.at(TokenKind::StringLiteral) {
            let token = self.advance();
            return Some(Ident::new(token.text, token.span));
        }
        self.expect_ident_name()
    }

    /// `with { type: "json" }` / `assert { ... }` carry nothing for types.
    fn skip_import_attributes(&mut self) {
        let is_attributes = self.at(TokenKind::Ident)
            && matches!(self.peek().text.as_str(), "with" | "assert")
            && self.nth(1) == TokenKind::LBrace
            && !self.at_line_start();
        if is_attributes {
            self.advance();
            self.skip_balanced();
        }
    }

    pub(super) fn parse_export(&mut self, ctx: ParseCtx) -> Option<Statement> {
        let start = self.start_pos();
        self.advance();
        let ctx = ctx.ambient();

        let kind = match self.peek_kind() {
            TokenKind::Eq => {
                self.advance();
                let name = self.parse_entity_name()?;
                self.parse_semicolon();
                ExportKind::Assignment(name)
            }
            TokenKind::As => {
                self.advance();
                self.expect(TokenKind::Namespace)?;
                let name = self.expect_ident()?;
                self.parse_semicolon();
                ExportKind::AsNamespace(name)
            }
            TokenKind::Default => {
                self.advance();
                ExportKind::Default(self.parse_default_export(ctx)?)
            }
            TokenKind::Star => self.parse_export_all(false)?,
            TokenKind::LBrace => self.parse_named_exports(false)?,
            TokenKind::Type if self.nth(1) == TokenKind::LBrace => {
                self.advance();
                self.parse_named_exports(true)?
            }
            TokenKind::Type if self.nth(1) == TokenKind::Star => {
                self.advance();
                self.parse_export_all(true)?
            }
            TokenKind::Import => ExportKind::Declaration(Box::new(self.parse_import()?)),
            TokenKind::Declare => ExportKind::Declaration(Box::new(self.parse_declare(ctx)?)),
            _ => ExportKind::Declaration(Box::new(self.parse_declaration(ctx, false)?)),
        };

        Some(Statement {
            kind: StmtKind::Export(ExportDecl { kind }),
            span: self.span_from(start),
        })
    }

    fn parse_default_export(&mut self, ctx: ParseCtx) -> Option<DefaultExport> {
        let declaration = match self.peek_kind() {
            TokenKind::Function | TokenKind::Class | TokenKind::Interface => true,
            TokenKind::Abstract => self.nth(1) == TokenKind::Class,
            TokenKind::Async => self.nth(1) == TokenKind::Function,
            _ => false,
        };
        if declaration {
            let statement = self.parse_declaration(ctx, true)?;
            return Some(DefaultExport::Declaration(Box::new(statement)));
        }

        if self.peek_kind().is_binding_identifier() {
            let name = self.parse_entity_name()?;
            self.parse_semicolon();
            return Some(DefaultExport::Name(name));
        }

        self.error_here(
            DiagnosticKind::Unsupported,
            "default exports in declaration files must name a declaration or an identifier",
        );
        self.skip_initializer();
        self.parse_semicolon();
        None
    }

    /// `export * from "m"` / `export * as ns from "m"`
    fn parse_export_all(&mut self, type_only: bool) -> Option<ExportKind> {
        self.advance();
        let alias = if self.matches(TokenKind::As) {
            Some(self.parse_module_export_name()?)
        } else {
            None
        };
        self.expect(TokenKind::From)?;
        let source = self.expect_string()?;
        self.skip_import_attributes();
        self.parse_semicolon();
        Some(ExportKind::All {
            type_only,
            alias,
            source,
        })
    }

    /// `export { a, b as c, type D } [from "m"]`
    fn parse_named_exports(&mut self, type_only: bool) -> Option<ExportKind> {
        self.expect(TokenKind::LBrace)?;
        let mut specifiers = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let start = self.start_pos();
            let specifier_type_only = self.at_specifier_type_modifier();
            if specifier_type_only {
                self.advance();
            }
            let local = self.parse_module_export_name()?;
            let exported = if self.matches(TokenKind::As) {
                Some(self.parse_module_export_name()?)
            } else {
                None
            };
            specifiers.push(ExportSpecifier {
                local,
                exported,
                type_only: specifier_type_only,
                span: self.span_from(start),
            });
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        let source = if self.matches(TokenKind::From) {
            let source = self.expect_string()?;
            self.skip_import_attributes();
            Some(source)
        } else {
            None
        };
        self.parse_semicolon();
        Some(ExportKind::Named {
            type_only,
            specifiers,
            source,
        })
    }
}
