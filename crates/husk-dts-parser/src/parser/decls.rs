//! Declarations: variables, functions, classes, interfaces, type aliases,
//! enums, namespaces, ambient modules and global augmentations.

use husk_dts_lexer::{Pos, TokenKind, TokenSource};

use super::{ParseCtx, Parser};
use crate::ast::*;
use crate::diagnostics::DiagnosticKind;

impl<S: TokenSource> Parser<S> {
    pub(super) fn parse_statement(&mut self, ctx: ParseCtx) -> Option<Statement> {
        match self.peek_kind() {
            TokenKind::Declare => self.parse_declare(ctx),
            TokenKind::Export => self.parse_export(ctx),
            TokenKind::Import if !matches!(self.nth(1), TokenKind::LParen | TokenKind::Dot) => {
                self.parse_import()
            }
            _ => self.parse_declaration(ctx, false),
        }
    }

    /// `declare <declaration>`; the declaration is wrapped in
    /// [`StmtKind::Ambient`].
    pub(super) fn parse_declare(&mut self, ctx: ParseCtx) -> Option<Statement> {
        let start = self.start_pos();
        self.advance();
        let inner = self.parse_declaration(ctx.ambient(), false)?;
        Some(Statement {
            kind: StmtKind::Ambient(Box::new(inner)),
            span: self.span_from(start),
        })
    }

    /// A declaration without `export`/`declare` prefix. `anonymous` allows
    /// unnamed functions and classes (`export default class {}`).
    pub(super) fn parse_declaration(
        &mut self,
        ctx: ParseCtx,
        anonymous: bool,
    ) -> Option<Statement> {
        let start = self.start_pos();
        let kind = match self.peek_kind() {
            TokenKind::Var | TokenKind::Let => {
                self.require_ambient(ctx, "variable declarations");
                StmtKind::Var(self.parse_var()?)
            }
            TokenKind::Const if self.nth(1) == TokenKind::Enum => {
                self.advance();
                StmtKind::Enum(self.parse_enum(true)?)
            }
            TokenKind::Const => {
                self.require_ambient(ctx, "variable declarations");
                StmtKind::Var(self.parse_var()?)
            }
            TokenKind::Function => {
                self.require_ambient(ctx, "function declarations");
                StmtKind::Function(self.parse_function(anonymous)?)
            }
            TokenKind::Async if self.nth(1) == TokenKind::Function => {
                self.require_ambient(ctx, "function declarations");
                self.advance();
                StmtKind::Function(self.parse_function(anonymous)?)
            }
            TokenKind::Class => {
                self.require_ambient(ctx, "class declarations");
                StmtKind::Class(self.parse_class(false, anonymous)?)
            }
            TokenKind::Abstract if self.nth(1) == TokenKind::Class => {
                self.require_ambient(ctx, "class declarations");
                self.advance();
                StmtKind::Class(self.parse_class(true, anonymous)?)
            }
            TokenKind::Interface => StmtKind::Interface(self.parse_interface()?),
            TokenKind::Type if self.nth(1).is_binding_identifier() => {
                StmtKind::TypeAlias(self.parse_type_alias()?)
            }
            TokenKind::Enum => StmtKind::Enum(self.parse_enum(false)?),
            TokenKind::Namespace => {
                self.advance();
                StmtKind::Namespace(self.parse_namespace(ctx)?)
            }
            TokenKind::Module => {
                self.advance();
                if self.at(TokenKind::StringLiteral) {
                    StmtKind::AmbientModule(self.parse_ambient_module(ctx)?)
                } else {
                    StmtKind::Namespace(self.parse_namespace(ctx)?)
                }
            }
            TokenKind::Global if self.nth(1) == TokenKind::LBrace => {
                self.advance();
                let body = self.parse_block(ctx);
                StmtKind::Global(GlobalDecl { body })
            }
            kind => {
                self.error_here(
                    DiagnosticKind::UnexpectedToken,
                    format!("expected a declaration, found {}", kind.describe()),
                );
                return None;
            }
        };
        Some(Statement {
            kind,
            span: self.span_from(start),
        })
    }

    /// Runtime declarations outside an ambient context are still parsed.
    fn require_ambient(&mut self, ctx: ParseCtx, what: &str) {
        if !ctx.ambient {
            self.error_here(
                DiagnosticKind::Unsupported,
                format!(
                    "top-level {what} in a declaration file must start with `declare` or `export`"
                ),
            );
        }
    }

    /// `var|let|const a: A, b = 1;`
    fn parse_var(&mut self) -> Option<VarDecl> {
        let kind = match self.advance().kind {
            TokenKind::Var => VarKind::Var,
            TokenKind::Let => VarKind::Let,
            _ => VarKind::Const,
        };

        let mut declarators = Vec::new();
        loop {
            let start = self.start_pos();
            let name = self.expect_ident()?;
            self.matches(TokenKind::Bang);
            let ty = if self.matches(TokenKind::Colon) {
                self.parse_type()
            } else {
                None
            };
            let init = if self.at(TokenKind::Eq) {
                self.advance();
                self.parse_initializer(kind)
            } else {
                None
            };
            declarators.push(VarDeclarator {
                name,
                ty,
                init,
                span: self.span_from(start),
            });
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.parse_semicolon();
        Some(VarDecl { kind, declarators })
    }

    /// Only `const` bindings may carry a literal initializer.
    fn parse_initializer(&mut self, kind: VarKind) -> Option<Literal> {
        let literal = self.try_parse("literal initializer", |p| {
            let literal = p.parse_literal()?;
            let ends = matches!(
                p.peek_kind(),
                TokenKind::Comma | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
            ) || p.at_line_start();
            ends.then_some(literal)
        });
        match literal {
            Some(literal) if kind == VarKind::Const => Some(literal),
            Some(_) => {
                self.error(
                    DiagnosticKind::Unsupported,
                    self.prev_span,
                    "only `const` declarations can have initializers in declaration files",
                );
                None
            }
            None => {
                self.error_here(
                    DiagnosticKind::Unsupported,
                    "initializers in declaration files must be literals",
                );
                self.skip_initializer();
                None
            }
        }
    }

    /// A string, number, bigint or boolean literal, optionally negated.
    pub(super) fn parse_literal(&mut self) -> Option<Literal> {
        let negative = self.at(TokenKind::Minus);
        if negative {
            self.advance();
        }
        let token = self.advance();
        let sign = if negative { "-" } else { "" };
        match token.kind {
            TokenKind::NumberLiteral => Some(Literal::Number(format!("{sign}{}", token.text))),
            TokenKind::BigIntLiteral => Some(Literal::BigInt(format!("{sign}{}", token.text))),
            TokenKind::StringLiteral | TokenKind::NoSubstitutionTemplate if !negative => {
                Some(Literal::String(token.text))
            }
            TokenKind::True_ if !negative => Some(Literal::Boolean(true)),
            TokenKind::False_ if !negative => Some(Literal::Boolean(false)),
            _ => None,
        }
    }

    /// `function name<T>(params): R;`
    fn parse_function(&mut self, anonymous: bool) -> Option<FunctionDecl> {
        let keyword = self.advance();
        let unnamed = matches!(self.peek_kind(), TokenKind::LParen | TokenKind::LAngle);
        let name = if anonymous && unnamed {
            Ident::new("default", keyword.span)
        } else {
            self.expect_ident()?
        };
        let signature = self.parse_signature()?;
        if self.at(TokenKind::LBrace) {
            self.skip_body();
        } else {
            self.parse_semicolon();
        }
        Some(FunctionDecl { name, signature })
    }

    /// `class Name<T> extends Base<T> implements I, J { members }`
    fn parse_class(&mut self, is_abstract: bool, anonymous: bool) -> Option<ClassDecl> {
        self.advance();
        let named = self.peek_kind().is_binding_identifier() && !self.at(TokenKind::Implements);
        let name = if named || !anonymous {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let type_params = self.parse_type_params();

        let extends = if self.matches(TokenKind::Extends) {
            self.parse_type_reference()
        } else {
            None
        };
        let mut implements = Vec::new();
        if self.matches(TokenKind::Implements) {
            implements = self.parse_heritage_list();
        }

        self.expect(TokenKind::LBrace)?;
        let members = self.parse_class_members();
        self.expect(TokenKind::RBrace);

        Some(ClassDecl {
            name,
            is_abstract,
            type_params,
            extends,
            implements,
            members,
        })
    }

    /// `A, B<T>, C.D`
    fn parse_heritage_list(&mut self) -> Vec<TypeRef> {
        let mut refs = Vec::new();
        loop {
            match self.parse_type_reference() {
                Some(r) => refs.push(r),
                None => break,
            }
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        refs
    }

    /// `interface Name<T> extends A, B { members }`
    fn parse_interface(&mut self) -> Option<InterfaceDecl> {
        self.advance();
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params();
        let extends = if self.matches(TokenKind::Extends) {
            self.parse_heritage_list()
        } else {
            Vec::new()
        };

        self.expect(TokenKind::LBrace)?;
        let members = self.parse_type_members();
        self.expect(TokenKind::RBrace);

        Some(InterfaceDecl {
            name,
            type_params,
            extends,
            members,
        })
    }

    /// `type Name<T> = Type;`
    fn parse_type_alias(&mut self) -> Option<TypeAliasDecl> {
        self.advance();
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params();
        self.expect(TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.parse_semicolon();
        Some(TypeAliasDecl {
            name,
            type_params,
            ty,
        })
    }

    /// `enum Name { A, B = 1, C = "c" }`, after any `const`.
    fn parse_enum(&mut self, is_const: bool) -> Option<EnumDecl> {
        self.advance();
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;

        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let start = self.start_pos();
            let before = self.consumed;
            match self.parse_enum_member(start) {
                Some(member) => members.push(member),
                None => {
                    if self.consumed == before {
                        self.advance();
                    }
                    while !matches!(
                        self.peek_kind(),
                        TokenKind::Comma | TokenKind::RBrace | TokenKind::Eof
                    ) {
                        self.skip_balanced();
                    }
                }
            }
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);

        Some(EnumDecl {
            is_const,
            name,
            members,
        })
    }

    fn parse_enum_member(&mut self, start: Pos) -> Option<EnumMember> {
        let name = self.parse_property_key()?;
        let init = if self.matches(TokenKind::Eq) {
            let literal = self.try_parse("enum initializer", |p| {
                let literal = p.parse_literal()?;
                matches!(p.peek_kind(), TokenKind::Comma | TokenKind::RBrace).then_some(literal)
            });
            if literal.is_none() {
                self.error_here(
                    DiagnosticKind::Unsupported,
                    "enum initializers must be string or number literals",
                );
                self.skip_initializer();
            }
            literal
        } else {
            None
        };
        Some(EnumMember {
            name,
            init,
            span: self.span_from(start),
        })
    }

    /// `namespace A.B.C { ... }`, after the keyword.
    fn parse_namespace(&mut self, ctx: ParseCtx) -> Option<NamespaceDecl> {
        let start = self.start_pos();
        let mut segments = vec![self.expect_ident()?];
        while self.matches(TokenKind::Dot) {
            segments.push(self.expect_ident()?);
        }
        let name = EntityName {
            segments,
            span: self.span_from(start),
        };
        let body = self.parse_block(ctx);
        Some(NamespaceDecl { name, body })
    }

    /// `module "name" { ... }` or the shorthand `module "name";`, after the
    /// keyword.
    fn parse_ambient_module(&mut self, ctx: ParseCtx) -> Option<AmbientModuleDecl> {
        let name = self.expect_string()?;
        let body = if self.at(TokenKind::LBrace) {
            Some(self.parse_block(ctx))
        } else {
            self.parse_semicolon();
            None
        };
        Some(AmbientModuleDecl { name, body })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::{parse, ParseOutput, SourceId};

    fn parse_ok(src: &str) -> Module {
        let ParseOutput { module, diagnostics } = parse(src, SourceId(0));
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        module
    }

    fn first(module: &Module) -> &StmtKind {
        &module.statements[0].unwrap_ambient().kind
    }

    #[test]
    fn test_parse_declare_var() {
        let module = parse_ok("declare var x: string;\ndeclare const VERSION = \"1.0\", N = -1;");
        assert_eq!(module.statements.len(), 2);
        assert!(matches!(module.statements[0].kind, StmtKind::Ambient(_)));
        let StmtKind::Var(v) = &module.statements[1].unwrap_ambient().kind else {
            panic!("expected var");
        };
        assert!(v.is_readonly());
        assert_eq!(v.declarators.len(), 2);
        assert_eq!(v.declarators[0].init, Some(Literal::String("1.0".into())));
        assert_eq!(v.declarators[1].init, Some(Literal::Number("-1".into())));
    }

    #[test]
    fn test_parse_bare_var_is_reported_but_parsed() {
        let out = parse("var x: number;", SourceId(0));
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::Unsupported);
        assert!(matches!(out.module.statements[0].kind, StmtKind::Var(_)));
    }

    #[test]
    fn test_parse_bare_interface_is_legal() {
        let module = parse_ok("interface A {}\ntype B = A;\nenum C { X }\nnamespace D {}");
        assert_eq!(module.statements.len(), 4);
    }

    #[test]
    fn test_parse_non_literal_initializer() {
        let out = parse("declare const x = foo();", SourceId(0));
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::Unsupported);
        let StmtKind::Var(v) = first(&out.module) else {
            panic!("expected var");
        };
        assert_eq!(v.declarators[0].init, None);
    }

    #[test]
    fn test_parse_function_declaration() {
        let module = parse_ok("declare function isString(x: unknown): x is string;");
        let StmtKind::Function(f) = first(&module) else {
            panic!("expected function");
        };
        assert_eq!(f.name.name, "isString");
        assert!(matches!(
            f.signature.return_type.as_ref().map(|t| &t.kind),
            Some(TypeAnnKind::Predicate(_))
        ));
    }

    #[test]
    fn test_parse_function_body_is_reported() {
        let out = parse("declare function f(): void { return; }\ndeclare var y: number;", SourceId(0));
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::Unsupported);
        assert_eq!(out.module.statements.len(), 2);
    }

    #[test]
    fn test_parse_class_heritage() {
        let module = parse_ok(
            "declare abstract class Repo<T> extends Base<T> implements Iterable<T>, Disposable {\n  abstract find(id: string): T | undefined;\n}",
        );
        let StmtKind::Class(c) = first(&module) else {
            panic!("expected class");
        };
        assert!(c.is_abstract);
        assert_eq!(c.name.as_ref().map(|n| n.name.as_str()), Some("Repo"));
        assert_eq!(c.extends.as_ref().map(|e| e.name.to_string()), Some("Base".into()));
        assert_eq!(c.implements.len(), 2);
        assert_eq!(c.members.len(), 1);
    }

    #[test]
    fn test_parse_interface_extends() {
        let module = parse_ok("interface A<T = string> extends B<T>, C.D { x: T }");
        let StmtKind::Interface(i) = first(&module) else {
            panic!("expected interface");
        };
        assert!(i.type_params[0].default.is_some());
        assert_eq!(i.extends.len(), 2);
        assert_eq!(i.extends[1].name.to_string(), "C.D");
    }

    #[test]
    fn test_parse_enums() {
        let module = parse_ok("declare const enum E { A = 1, B = -2, C = 'c', D, }");
        let StmtKind::Enum(e) = first(&module) else {
            panic!("expected enum");
        };
        assert!(e.is_const);
        assert_eq!(e.members.len(), 4);
        assert_eq!(e.members[1].init, Some(Literal::Number("-2".into())));
        assert_eq!(e.members[2].init, Some(Literal::String("c".into())));
        assert_eq!(e.members[3].init, None);
    }

    #[test]
    fn test_parse_enum_computed_initializer_is_skipped() {
        let out = parse("enum E { A = 1 << 2, B }", SourceId(0));
        assert_eq!(out.diagnostics.len(), 1);
        let StmtKind::Enum(e) = first(&out.module) else {
            panic!("expected enum");
        };
        assert_eq!(e.members.len(), 2);
        assert_eq!(e.members[0].init, None);
    }

    #[test]
    fn test_parse_namespaces_and_modules() {
        let module = parse_ok(
            "declare namespace A.B { const x: number; function f(): void; }\ndeclare module \"m\" { export const y: string; }\ndeclare module \"shorthand\";\ndeclare global { interface Window { z: number } }",
        );
        assert_eq!(module.statements.len(), 4);
        let StmtKind::Namespace(ns) = first(&module) else {
            panic!("expected namespace");
        };
        assert_eq!(ns.name.to_string(), "A.B");
        assert_eq!(ns.body.len(), 2);

        let StmtKind::AmbientModule(m) = &module.statements[1].unwrap_ambient().kind else {
            panic!("expected ambient module");
        };
        assert_eq!(m.name.value, "m");
        assert_eq!(m.body.as_ref().map(Vec::len), Some(1));

        let StmtKind::AmbientModule(m) = &module.statements[2].unwrap_ambient().kind else {
            panic!("expected ambient module");
        };
        assert!(m.body.is_none());

        assert!(matches!(module.statements[3].unwrap_ambient().kind, StmtKind::Global(_)));
    }

    #[test]
    fn test_parse_statement_recovery() {
        let out = parse("declare var = 1;\ninterface Ok { a: string }", SourceId(0));
        assert!(!out.diagnostics.is_empty());
        assert!(out
            .module
            .statements
            .iter()
            .any(|s| s.declared_name() == Some("Ok")));
    }

    #[test]
    fn test_parse_depth_limit() {
        use crate::{parse_with_config, ParserConfig};
        let src = format!("type T = {}string{};", "Array<".repeat(20), ">".repeat(20));
        let config = ParserConfig {
            max_depth: 8,
            ..ParserConfig::default()
        };
        let out = parse_with_config(&src, SourceId(0), config);
        let limits = out
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::LimitExceeded)
            .count();
        assert_eq!(limits, 1);
    }

    #[test]
    fn test_parse_depth_limit_type_operators() {
        use crate::{parse_with_config, ParserConfig};
        let config = ParserConfig {
            max_depth: 8,
            ..ParserConfig::default()
        };
        for src in [
            format!("type T = {}X;\ninterface Ok {{}}", "keyof ".repeat(20)),
            format!("type T = {}string[];\ninterface Ok {{}}", "readonly ".repeat(20)),
        ] {
            let out = parse_with_config(&src, SourceId(0), config);
            let limits = out
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::LimitExceeded)
                .count();
            assert_eq!(limits, 1, "{src}");
            let names: Vec<_> = out.module.statements.iter().map(|s| s.declared_name()).collect();
            assert_eq!(names, [Some("Ok")], "{src}");
        }
    }

    #[test]
    fn test_parse_long_keyof_chain_hits_default_limit() {
        let src = format!("type T = {}X;", "keyof ".repeat(20_000));
        let out = parse(&src, SourceId(0));
        assert!(out.module.statements.is_empty());
        assert!(out
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::LimitExceeded));
    }

    #[test]
    fn test_parse_token_limit() {
        use crate::{parse_with_config, ParserConfig};
        let config = ParserConfig {
            max_tokens: 4,
            ..ParserConfig::default()
        };
        let out = parse_with_config("declare var x: string;", SourceId(0), config);
        assert!(out.module.statements.is_empty());
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::LimitExceeded);
    }
}
