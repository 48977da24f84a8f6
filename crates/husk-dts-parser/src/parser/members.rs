//! Interface, object type and class members.

use husk_dts_lexer::{Pos, TokenKind, TokenSource};

use super::Parser;
use crate::ast::*;
use crate::diagnostics::DiagnosticKind;

impl<S: TokenSource> Parser<S> {
    /// Members of an interface body or object type, up to (not including)
    /// the closing `}`.
    pub(super) fn parse_type_members(&mut self) -> Vec<InterfaceMember> {
        let mut members = Vec::new();
        if !self.enter() {
            self.skip_to_close_brace();
            return members;
        }
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            if self.matches(TokenKind::Semicolon) || self.matches(TokenKind::Comma) {
                continue;
            }
            let before = self.consumed;
            match self.parse_interface_member() {
                Some(member) => {
                    members.push(member);
                    if !self.parse_member_separator() {
                        self.recover_member(self.consumed);
                    }
                }
                None => self.recover_member(before),
            }
        }
        self.exit();
        members
    }

    /// Members of a class body, up to (not including) the closing `}`.
    pub(super) fn parse_class_members(&mut self) -> Vec<ClassMember> {
        let mut members = Vec::new();
        if !self.enter() {
            self.skip_to_close_brace();
            return members;
        }
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            if self.matches(TokenKind::Semicolon) {
                continue;
            }
            let before = self.consumed;
            match self.parse_class_member() {
                Some(member) => {
                    members.push(member);
                    if !self.parse_member_separator() {
                        self.recover_member(self.consumed);
                    }
                }
                None => self.recover_member(before),
            }
        }
        self.exit();
        members
    }

    /// `;`, `,`, a line break, or the closing `}`.
    fn parse_member_separator(&mut self) -> bool {
        if self.matches(TokenKind::Semicolon) || self.matches(TokenKind::Comma) {
            return true;
        }
        if self.at(TokenKind::RBrace) || self.at(TokenKind::Eof) || self.at_line_start() {
            return true;
        }
        let found = self.peek_kind().describe();
        self.error_here(
            DiagnosticKind::ExpectedToken,
            format!("expected `;` or `,` after member, found {found}"),
        );
        false
    }

    /// Skip the rest of a malformed member: up to the next member that
    /// starts a line, past a `;` or `,`, or up to the closing `}`. Always
    /// consumes at least one token.
    fn recover_member(&mut self, consumed_before: usize) {
        if self.consumed == consumed_before && !self.at(TokenKind::Eof) {
            let token = self.advance();
            if matches!(token.kind, TokenKind::Semicolon | TokenKind::Comma) {
                return;
            }
        }
        loop {
            match self.peek_kind() {
                TokenKind::RBrace | TokenKind::Eof => return,
                TokenKind::Semicolon | TokenKind::Comma => {
                    self.advance();
                    return;
                }
                kind if self.at_line_start() && is_member_start(kind) => return,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => self.skip_balanced(),
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn skip_to_close_brace(&mut self) {
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            self.skip_balanced();
        }
    }

    fn parse_interface_member(&mut self) -> Option<InterfaceMember> {
        let start = self.start_pos();

        match self.peek_kind() {
            TokenKind::LParen | TokenKind::LAngle => {
                let signature = self.parse_signature()?;
                return Some(self.interface_member(InterfaceMemberKind::Call(signature), start));
            }
            TokenKind::New if matches!(self.nth(1), TokenKind::LParen | TokenKind::LAngle) => {
                self.advance();
                let signature = self.parse_signature()?;
                let kind = InterfaceMemberKind::Construct(signature);
                return Some(self.interface_member(kind, start));
            }
            _ => {}
        }

        let readonly = self.at(TokenKind::Readonly) && self.is_modifier_not_property();
        if readonly {
            self.advance();
        }

        if self.at(TokenKind::LBracket) {
            if let Some(index) = self.try_index_signature(readonly) {
                let index = index?;
                return Some(self.interface_member(InterfaceMemberKind::Index(index), start));
            }
        }

        if matches!(self.peek_kind(), TokenKind::Get | TokenKind::Set) {
            if let Some(kind) = self.try_accessor() {
                let kind = match kind? {
                    Accessor::Get(getter) => InterfaceMemberKind::Getter(getter),
                    Accessor::Set(setter) => InterfaceMemberKind::Setter(setter),
                };
                return Some(self.interface_member(kind, start));
            }
        }

        let key = self.parse_property_key()?;
        let optional = self.matches(TokenKind::Question);
        if matches!(self.peek_kind(), TokenKind::LParen | TokenKind::LAngle) {
            let signature = self.parse_signature()?;
            return Some(self.interface_member(
                InterfaceMemberKind::Method(MethodSignature {
                    key,
                    optional,
                    signature,
                }),
                start,
            ));
        }

        let ty = if self.matches(TokenKind::Colon) {
            self.parse_type()
        } else {
            None
        };
        Some(self.interface_member(
            InterfaceMemberKind::Property(PropertySignature {
                key,
                optional,
                readonly,
                ty,
            }),
            start,
        ))
    }

    fn interface_member(&self, kind: InterfaceMemberKind, start: Pos) -> InterfaceMember {
        InterfaceMember {
            kind,
            span: self.span_from(start),
        }
    }

    fn parse_class_member(&mut self) -> Option<ClassMember> {
        let start = self.start_pos();

        let mut modifiers = Modifiers::empty();
        loop {
            let flag = match self.peek_kind() {
                TokenKind::Public => Modifiers::PUBLIC,
                TokenKind::Private => Modifiers::PRIVATE,
                TokenKind::Protected => Modifiers::PROTECTED,
                TokenKind::Static => Modifiers::STATIC,
                TokenKind::Readonly => Modifiers::READONLY,
                TokenKind::Abstract => Modifiers::ABSTRACT,
                TokenKind::Async => Modifiers::ASYNC,
                TokenKind::Override => Modifiers::OVERRIDE,
                TokenKind::Declare => Modifiers::DECLARE,
                TokenKind::Accessor => Modifiers::ACCESSOR,
                _ => break,
            };
            if !self.is_modifier_not_property() {
                break;
            }
            if modifiers.contains(flag) {
                self.error_here(DiagnosticKind::UnexpectedToken, "duplicate modifier");
            }
            self.advance();
            modifiers |= flag;
        }

        if self.at(TokenKind::LBrace) && modifiers == Modifiers::STATIC {
            self.error_here(
                DiagnosticKind::Unsupported,
                "static blocks are not allowed in declaration files",
            );
            self.skip_balanced();
            return None;
        }

        let is_constructor = matches!(self.peek_kind(), TokenKind::Ident | TokenKind::StringLiteral)
            && self.peek().text == "constructor"
            && self.nth(1) == TokenKind::LParen;
        if is_constructor {
            self.advance();
            let signature = self.parse_signature()?;
            self.skip_body();
            let kind = ClassMemberKind::Constructor(signature);
            return Some(self.class_member(kind, modifiers, start));
        }

        if self.at(TokenKind::LBracket) {
            if let Some(index) = self.try_index_signature(modifiers.contains(Modifiers::READONLY)) {
                let index = index?;
                return Some(self.class_member(ClassMemberKind::Index(index), modifiers, start));
            }
        }

        if matches!(self.peek_kind(), TokenKind::Get | TokenKind::Set) {
            if let Some(kind) = self.try_accessor() {
                let kind = match kind? {
                    Accessor::Get(getter) => ClassMemberKind::Getter(getter),
                    Accessor::Set(setter) => ClassMemberKind::Setter(setter),
                };
                self.skip_body();
                return Some(self.class_member(kind, modifiers, start));
            }
        }

        let key = self.parse_property_key()?;
        let optional = self.matches(TokenKind::Question);
        if !optional {
            // Definite assignment `x!: T` carries no information here.
            self.matches(TokenKind::Bang);
        }

        if matches!(self.peek_kind(), TokenKind::LParen | TokenKind::LAngle) {
            let signature = self.parse_signature()?;
            self.skip_body();
            return Some(self.class_member(
                ClassMemberKind::Method(MethodSignature {
                    key,
                    optional,
                    signature,
                }),
                modifiers,
                start,
            ));
        }

        let ty = if self.matches(TokenKind::Colon) {
            self.parse_type()
        } else {
            None
        };
        if self.at(TokenKind::Eq) {
            self.error_here(
                DiagnosticKind::Unsupported,
                "property initializers are not allowed in declaration files",
            );
            self.advance();
            self.skip_initializer();
        }
        Some(self.class_member(
            ClassMemberKind::Property(ClassProperty { key, optional, ty }),
            modifiers,
            start,
        ))
    }

    fn class_member(&self, kind: ClassMemberKind, modifiers: Modifiers, start: Pos) -> ClassMember {
        ClassMember {
            kind,
            modifiers,
            span: self.span_from(start),
        }
    }

    /// A modifier keyword is the member name when followed by `:`, `?`,
    /// `(`, `<`, `=`, `!`, `;`, `,`, `}` or a line break.
    fn is_modifier_not_property(&mut self) -> bool {
        let next = self.nth(1);
        if matches!(
            next,
            TokenKind::Colon
                | TokenKind::Question
                | TokenKind::LParen
                | TokenKind::LAngle
                | TokenKind::Eq
                | TokenKind::Bang
                | TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::RBrace
                | TokenKind::Eof
        ) {
            return false;
        }
        // `readonly\n name: T` is a property named `readonly` followed by
        // another member.
        let snapshot = self.snapshot();
        self.advance();
        let same_line = !self.at_line_start();
        self.restore(snapshot);
        same_line
    }

    /// `[key: K]` starts an index signature; anything else in brackets is a
    /// computed property name. `None` means not an index signature;
    /// `Some(None)` means one was recognized but its value type is missing.
    fn try_index_signature(&mut self, readonly: bool) -> Option<Option<IndexSignature>> {
        let (param, key_type) = self.try_parse("index signature", |p| {
            p.expect(TokenKind::LBracket)?;
            let param = p.expect_ident()?;
            p.expect(TokenKind::Colon)?;
            let key_type = p.parse_type()?;
            p.expect(TokenKind::RBracket)?;
            Some((param, key_type))
        })?;

        if self.expect(TokenKind::Colon).is_none() {
            return Some(None);
        }
        let Some(ty) = self.parse_type() else {
            return Some(None);
        };
        Some(Some(IndexSignature {
            readonly,
            param,
            key_type,
            ty,
        }))
    }

    /// `get name(...)` / `set name(...)`. `None` means `get`/`set` is itself
    /// the member name; `Some(None)` means a malformed accessor.
    fn try_accessor(&mut self) -> Option<Option<Accessor>> {
        let (is_get, key) = self.try_parse("accessor", |p| {
            let is_get = p.advance().kind == TokenKind::Get;
            if p.at_line_start() {
                return None;
            }
            let key = p.parse_property_key()?;
            if !p.at(TokenKind::LParen) {
                return None;
            }
            Some((is_get, key))
        })?;

        let start = self.start_pos();
        let Some(params) = self.parse_params() else {
            return Some(None);
        };

        if is_get {
            if !params.is_empty() {
                let span = self.span_from(start);
                self.error(
                    DiagnosticKind::UnexpectedToken,
                    span,
                    "a getter cannot have parameters",
                );
            }
            let return_type = if self.matches(TokenKind::Colon) {
                self.parse_type()
            } else {
                None
            };
            return Some(Some(Accessor::Get(GetAccessor { key, return_type })));
        }

        let span = self.span_from(start);
        let mut params = params.into_iter();
        let Some(param) = params.next() else {
            self.error(
                DiagnosticKind::ExpectedConstruct,
                span,
                "a setter must have exactly one parameter",
            );
            return Some(None);
        };
        if params.next().is_some() {
            self.error(
                DiagnosticKind::UnexpectedToken,
                span,
                "a setter must have exactly one parameter",
            );
        }
        if self.at(TokenKind::Colon) {
            self.error_here(
                DiagnosticKind::UnexpectedToken,
                "a setter cannot have a return type annotation",
            );
            self.advance();
            self.parse_type();
        }
        Some(Some(Accessor::Set(SetAccessor { key, param })))
    }

    /// `<T>(params): R`
    pub(super) fn parse_signature(&mut self) -> Option<Signature> {
        let type_params = self.parse_type_params();
        let params = self.parse_params()?;
        let return_type = if self.matches(TokenKind::Colon) {
            self.parse_return_type()
        } else {
            None
        };
        Some(Signature {
            type_params,
            params,
            return_type,
        })
    }

    /// Report and skip an implementation body.
    pub(super) fn skip_body(&mut self) {
        if self.at(TokenKind::LBrace) {
            self.error_here(
                DiagnosticKind::Unsupported,
                "implementations are not allowed in declaration files",
            );
            self.skip_balanced();
        }
    }

    /// Identifier, keyword, string, number, `#private`, or `[computed]`.
    pub(super) fn parse_property_key(&mut self) -> Option<PropertyKey> {
        match self.peek_kind() {
            TokenKind::StringLiteral => {
                let token = self.advance();
                Some(PropertyKey::String(StrLit {
                    value: token.text,
                    span: token.span,
                }))
            }
            TokenKind::NumberLiteral => {
                let token = self.advance();
                Some(PropertyKey::Number {
                    value: token.text,
                    span: token.span,
                })
            }
            TokenKind::PrivateName => {
                let token = self.advance();
                let name = token.text.trim_start_matches('#').to_string();
                Some(PropertyKey::Private(Ident::new(name, token.span)))
            }
            TokenKind::LBracket => self.parse_computed_key(),
            kind if kind.is_identifier_name() => {
                let token = self.advance();
                Some(PropertyKey::Ident(Ident::new(token.text, token.span)))
            }
            kind => {
                self.error_here(
                    DiagnosticKind::ExpectedConstruct,
                    format!("expected a property name, found {}", kind.describe()),
                );
                None
            }
        }
    }

    /// `[Symbol.iterator]`, `["a-b"]`, `[0]`
    fn parse_computed_key(&mut self) -> Option<PropertyKey> {
        let start = self.start_pos();
        self.advance();
        let expr = match self.peek_kind() {
            TokenKind::StringLiteral => KeyExpr::String(self.advance().text),
            TokenKind::NumberLiteral => KeyExpr::Number(self.advance().text),
            kind if kind.is_identifier_name() => {
                let name_start = self.start_pos();
                let first = self.advance();
                let mut segments = vec![Ident::new(first.text, first.span)];
                while self.at(TokenKind::Dot) && self.nth(1).is_identifier_name() {
                    self.advance();
                    let token = self.advance();
                    segments.push(Ident::new(token.text, token.span));
                }
                KeyExpr::Name(EntityName {
                    segments,
                    span: self.span_from(name_start),
                })
            }
            kind => {
                self.error_here(
                    DiagnosticKind::ExpectedConstruct,
                    format!("expected a computed property name, found {}", kind.describe()),
                );
                return None;
            }
        };
        self.expect(TokenKind::RBracket)?;
        Some(PropertyKey::Computed {
            expr,
            span: self.span_from(start),
        })
    }
}

enum Accessor {
    Get(GetAccessor),
    Set(SetAccessor),
}

/// Tokens that can begin a member.
fn is_member_start(kind: TokenKind) -> bool {
    kind.is_identifier_name()
        || matches!(
            kind,
            TokenKind::StringLiteral
                | TokenKind::NumberLiteral
                | TokenKind::PrivateName
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::LAngle
        )
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::{parse, SourceId};

    fn interface_members(src: &str) -> Vec<InterfaceMember> {
        let out = parse(src, SourceId(0));
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        match out.module.statements.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Interface(i)) => i.members,
            other => panic!("expected interface, got {other:?}"),
        }
    }

    fn class_members(src: &str) -> Vec<ClassMember> {
        let out = parse(src, SourceId(0));
        assert!(out.diagnostics.is_empty(), "unexpected diagnostics: {:?}", out.diagnostics);
        let statement = out.module.statements.into_iter().next().expect("statement");
        match statement.unwrap_ambient().kind.clone() {
            StmtKind::Class(c) => c.members,
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_call_and_construct_signatures() {
        let members = interface_members("interface F { (x: number): string; new (x: number): F; <T>(x: T): T }");
        assert_eq!(members.len(), 3);
        assert!(matches!(members[0].kind, InterfaceMemberKind::Call(_)));
        assert!(matches!(members[1].kind, InterfaceMemberKind::Construct(_)));
        assert!(matches!(&members[2].kind, InterfaceMemberKind::Call(s) if s.type_params.len() == 1));
    }

    #[test]
    fn test_parse_properties_and_methods() {
        let members = interface_members(
            "interface A {\n  readonly id: string\n  name?: string\n  greet(msg: string): void\n  'quoted-key': number\n  0: boolean\n}",
        );
        assert_eq!(members.len(), 5);
        let InterfaceMemberKind::Property(p) = &members[0].kind else {
            panic!("expected property");
        };
        assert!(p.readonly);
        let InterfaceMemberKind::Property(p) = &members[1].kind else {
            panic!("expected property");
        };
        assert!(p.optional);
        assert!(matches!(members[2].kind, InterfaceMemberKind::Method(_)));
        assert!(matches!(&members[3].kind, InterfaceMemberKind::Property(p) if matches!(p.key, PropertyKey::String(_))));
        assert!(matches!(&members[4].kind, InterfaceMemberKind::Property(p) if matches!(p.key, PropertyKey::Number { .. })));
    }

    #[test]
    fn test_parse_keyword_named_members() {
        let members = interface_members("interface A { readonly: boolean; type: string; default(): void; new: number }");
        assert_eq!(members.len(), 4);
        assert!(matches!(&members[0].kind, InterfaceMemberKind::Property(p) if p.key.name() == Some("readonly") && !p.readonly));
        assert!(matches!(&members[2].kind, InterfaceMemberKind::Method(m) if m.key.name() == Some("default")));
        assert!(matches!(&members[3].kind, InterfaceMemberKind::Property(p) if p.key.name() == Some("new")));
    }

    #[test]
    fn test_parse_index_signature_vs_computed_key() {
        let members = interface_members(
            "interface A { readonly [key: string]: number; [Symbol.iterator](): Iterator<number>; ['x']: string }",
        );
        assert_eq!(members.len(), 3);
        assert!(matches!(&members[0].kind, InterfaceMemberKind::Index(i) if i.readonly && i.param.name == "key"));
        assert!(matches!(&members[1].kind, InterfaceMemberKind::Method(m) if matches!(&m.key, PropertyKey::Computed { expr: KeyExpr::Name(n), .. } if n.to_string() == "Symbol.iterator")));
        assert!(matches!(&members[2].kind, InterfaceMemberKind::Property(p) if matches!(&p.key, PropertyKey::Computed { expr: KeyExpr::String(s), .. } if s == "x")));
    }

    #[test]
    fn test_parse_accessors_vs_get_set_names() {
        let members = interface_members(
            "interface A { get size(): number; set size(v: number); get: number; set(k: string): void }",
        );
        assert_eq!(members.len(), 4);
        assert!(matches!(&members[0].kind, InterfaceMemberKind::Getter(g) if g.key.name() == Some("size")));
        assert!(matches!(&members[1].kind, InterfaceMemberKind::Setter(s) if s.key.name() == Some("size")));
        assert!(matches!(&members[2].kind, InterfaceMemberKind::Property(p) if p.key.name() == Some("get")));
        assert!(matches!(&members[3].kind, InterfaceMemberKind::Method(m) if m.key.name() == Some("set")));
    }

    #[test]
    fn test_parse_class_members_with_modifiers() {
        let members = class_members(
            "declare class Foo {\n  private constructor(public x: number);\n  static readonly VERSION: string;\n  protected abstract run<T>(arg: T): void;\n  #secret: number;\n  static: boolean;\n  get value(): number;\n  override toString(): string;\n}",
        );
        assert_eq!(members.len(), 7);

        assert!(matches!(&members[0].kind, ClassMemberKind::Constructor(s) if s.params[0].modifiers == Modifiers::PUBLIC));
        assert_eq!(members[0].modifiers.visibility(), Visibility::Private);

        assert!(members[1].modifiers.contains(Modifiers::STATIC | Modifiers::READONLY));
        assert!(matches!(members[1].kind, ClassMemberKind::Property(_)));

        assert_eq!(members[2].modifiers.visibility(), Visibility::Protected);
        assert!(members[2].modifiers.contains(Modifiers::ABSTRACT));
        assert!(matches!(&members[2].kind, ClassMemberKind::Method(m) if m.signature.type_params.len() == 1));

        assert!(matches!(&members[3].kind, ClassMemberKind::Property(p) if matches!(p.key, PropertyKey::Private(_))));

        assert!(members[4].modifiers.is_empty());
        assert!(matches!(&members[4].kind, ClassMemberKind::Property(p) if p.key.name() == Some("static")));

        assert!(matches!(members[5].kind, ClassMemberKind::Getter(_)));
        assert!(members[6].modifiers.contains(Modifiers::OVERRIDE));
    }

    #[test]
    fn test_parse_method_body_is_reported() {
        let out = parse("declare class A { run(): void { return; } }", SourceId(0));
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::Unsupported);
        let StmtKind::Class(c) = &out.module.statements[0].unwrap_ambient().kind else {
            panic!("expected class");
        };
        assert_eq!(c.members.len(), 1);
    }

    #[test]
    fn test_parse_members_separated_by_newlines() {
        let members = interface_members("interface A {\n  a: string[]\n  [key: string]: unknown\n}");
        assert_eq!(members.len(), 2);
        assert!(matches!(&members[0].kind, InterfaceMemberKind::Property(p) if matches!(p.ty.as_ref().map(|t| &t.kind), Some(TypeAnnKind::Array(_)))));
        assert!(matches!(members[1].kind, InterfaceMemberKind::Index(_)));
    }

    #[test]
    fn test_parse_malformed_member_recovers() {
        let out = parse("interface A {\n  a: ;\n  b: string\n}", SourceId(0));
        assert!(!out.diagnostics.is_empty());
        let StmtKind::Interface(i) = &out.module.statements[0].kind else {
            panic!("expected interface");
        };
        let names: Vec<_> = i
            .members
            .iter()
            .filter_map(|m| match &m.kind {
                InterfaceMemberKind::Property(p) => p.key.name(),
                _ => None,
            })
            .collect();
        assert!(names.contains(&"b"));
    }
}
