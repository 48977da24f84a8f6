//! Type expressions.
//!
//! Precedence, lowest first: conditional, union, intersection, type
//! operator (`keyof`, `unique`, `readonly`, `infer`), postfix, primary.

use husk_dts_lexer::{Pos, TokenKind, TokenSource};
use tracing::trace;

use super::Parser;
use crate::ast::*;
use crate::diagnostics::DiagnosticKind;

impl<S: TokenSource> Parser<S> {
    /// Parse a type. `None` means no valid type starts here; a diagnostic
    /// has been recorded.
    pub(crate) fn parse_type(&mut self) -> Option<TypeAnn> {
        if !self.enter() {
            return None;
        }
        let saved = std::mem::replace(&mut self.in_extends_clause, false);
        let ty = self.parse_conditional_type();
        self.in_extends_clause = saved;
        self.exit();
        ty
    }

    /// A type that must span the whole input.
    pub(crate) fn parse_standalone_type(&mut self) -> Option<TypeAnn> {
        let ty = self.parse_type()?;
        if !self.at(TokenKind::Eof) {
            let found = self.peek_kind().describe();
            self.error_here(
                DiagnosticKind::UnexpectedToken,
                format!("unexpected {found} after type"),
            );
        }
        Some(ty)
    }

    fn parse_conditional_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        let check = self.parse_union_type()?;
        if !self.at(TokenKind::Extends) || self.at_line_start() {
            return Some(check);
        }
        self.advance();

        let saved = std::mem::replace(&mut self.in_extends_clause, true);
        let extends = self.parse_union_type();
        self.in_extends_clause = saved;
        let Some(extends) = extends else {
            return Some(check);
        };

        if self.expect(TokenKind::Question).is_none() {
            return Some(check);
        }
        let Some(true_type) = self.parse_type() else {
            return Some(check);
        };
        if self.expect(TokenKind::Colon).is_none() {
            return Some(check);
        }
        let Some(false_type) = self.parse_type() else {
            return Some(check);
        };

        Some(TypeAnn::new(
            TypeAnnKind::Conditional(Box::new(ConditionalType {
                check,
                extends,
                true_type,
                false_type,
            })),
            self.span_from(start),
        ))
    }

    pub(super) fn parse_union_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        self.matches(TokenKind::Pipe);
        let first = self.parse_intersection_type()?;
        if !self.at(TokenKind::Pipe) {
            return Some(first);
        }

        let mut types = vec![first];
        while self.matches(TokenKind::Pipe) {
            match self.parse_intersection_type() {
                Some(ty) => types.push(ty),
                None => break,
            }
        }
        Some(TypeAnn::new(TypeAnnKind::Union(types), self.span_from(start)))
    }

    fn parse_intersection_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        self.matches(TokenKind::Amp);
        let first = self.parse_type_operator()?;
        if !self.at(TokenKind::Amp) {
            return Some(first);
        }

        let mut types = vec![first];
        while self.matches(TokenKind::Amp) {
            match self.parse_type_operator() {
                Some(ty) => types.push(ty),
                None => break,
            }
        }
        Some(TypeAnn::new(
            TypeAnnKind::Intersection(types),
            self.span_from(start),
        ))
    }

    fn parse_type_operator(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        match self.peek_kind() {
            TokenKind::Keyof => {
                self.advance();
                let operand = self.parse_operand()?;
                Some(TypeAnn::new(
                    TypeAnnKind::KeyOf(Box::new(operand)),
                    self.span_from(start),
                ))
            }
            TokenKind::Unique if self.nth(1) == TokenKind::Symbol_ => {
                self.advance();
                self.advance();
                Some(TypeAnn::new(
                    TypeAnnKind::Primitive(Primitive::UniqueSymbol),
                    self.span_from(start),
                ))
            }
            TokenKind::Readonly if starts_type(self.nth(1)) => {
                self.advance();
                let operand = self.parse_operand()?;
                Some(TypeAnn::new(
                    TypeAnnKind::Readonly(Box::new(operand)),
                    self.span_from(start),
                ))
            }
            TokenKind::Infer => self.parse_infer_type(),
            _ => self.parse_postfix_type(),
        }
    }

    /// The operand of `keyof` or `readonly`, one nesting level down.
    fn parse_operand(&mut self) -> Option<TypeAnn> {
        if !self.enter() {
            return None;
        }
        let operand = self.parse_type_operator();
        self.exit();
        operand
    }

    /// `infer X` or `infer X extends C`. Outside a conditional's `extends`
    /// clause, a constraint followed by `?` belongs to an enclosing
    /// conditional instead.
    fn parse_infer_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        self.advance();
        let param = self.expect_ident()?;

        let mut constraint = None;
        if self.at(TokenKind::Extends) {
            // Entered before the snapshot so a limit diagnostic survives
            // the rollback below.
            if !self.enter() {
                return None;
            }
            let snapshot = self.snapshot();
            self.advance();
            let saved = std::mem::replace(&mut self.in_extends_clause, true);
            let parsed = self.parse_union_type();
            self.in_extends_clause = saved;
            self.exit();

            let clean = self.diagnostics.len() == snapshot.diagnostics;
            let keep = self.in_extends_clause || !self.at(TokenKind::Question);
            match parsed {
                Some(ty) if clean && keep => constraint = Some(ty),
                _ => {
                    trace!(at = %self.peek().span, "infer constraint belongs to outer conditional");
                    self.restore(snapshot);
                }
            }
        }

        Some(TypeAnn::new(
            TypeAnnKind::Infer(Box::new(InferType { param, constraint })),
            self.span_from(start),
        ))
    }

    fn parse_postfix_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        let mut ty = self.parse_primary_type()?;

        while self.at(TokenKind::LBracket) && !self.at_line_start() {
            self.advance();
            if self.matches(TokenKind::RBracket) {
                ty = TypeAnn::new(TypeAnnKind::Array(Box::new(ty)), self.span_from(start));
                continue;
            }
            let Some(index) = self.parse_type() else {
                return Some(ty);
            };
            self.expect(TokenKind::RBracket);
            ty = TypeAnn::new(
                TypeAnnKind::IndexedAccess {
                    object: Box::new(ty),
                    index: Box::new(index),
                },
                self.span_from(start),
            );
        }

        Some(ty)
    }

    fn parse_primary_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        let primitive = match self.peek_kind() {
            TokenKind::String_ => Some(Primitive::String),
            TokenKind::Number_ => Some(Primitive::Number),
            TokenKind::Boolean_ => Some(Primitive::Boolean),
            TokenKind::BigInt_ => Some(Primitive::BigInt),
            TokenKind::Symbol_ => Some(Primitive::Symbol),
            TokenKind::Void_ => Some(Primitive::Void),
            TokenKind::Null_ => Some(Primitive::Null),
            TokenKind::Undefined_ => Some(Primitive::Undefined),
            TokenKind::Never_ => Some(Primitive::Never),
            TokenKind::Any_ => Some(Primitive::Any),
            TokenKind::Unknown_ => Some(Primitive::Unknown),
            TokenKind::Object_ => Some(Primitive::Object),
            _ => None,
        };
        if let Some(primitive) = primitive {
            self.advance();
            return Some(TypeAnn::new(
                TypeAnnKind::Primitive(primitive),
                self.span_from(start),
            ));
        }

        match self.peek_kind() {
            TokenKind::True_ | TokenKind::False_ => {
                let value = self.advance().kind == TokenKind::True_;
                Some(self.literal_type(Literal::Boolean(value), start))
            }
            TokenKind::StringLiteral => {
                let token = self.advance();
                Some(self.literal_type(Literal::String(token.text), start))
            }
            TokenKind::NumberLiteral => {
                let token = self.advance();
                Some(self.literal_type(Literal::Number(token.text), start))
            }
            TokenKind::BigIntLiteral => {
                let token = self.advance();
                Some(self.literal_type(Literal::BigInt(token.text), start))
            }
            TokenKind::Minus
                if matches!(
                    self.nth(1),
                    TokenKind::NumberLiteral | TokenKind::BigIntLiteral
                ) =>
            {
                self.advance();
                let token = self.advance();
                let text = format!("-{}", token.text);
                let literal = if token.kind == TokenKind::BigIntLiteral {
                    Literal::BigInt(text)
                } else {
                    Literal::Number(text)
                };
                Some(self.literal_type(literal, start))
            }
            TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead => {
                self.parse_template_literal_type()
            }
            TokenKind::This => {
                self.advance();
                Some(TypeAnn::new(TypeAnnKind::This, self.span_from(start)))
            }
            TokenKind::LParen => self.parse_paren_or_function_type(),
            TokenKind::LAngle => self.parse_generic_function_type(),
            TokenKind::New => self.parse_constructor_type(start, false),
            TokenKind::Abstract => {
                let ty = self.try_parse("abstract constructor type", |p| {
                    p.advance();
                    p.parse_constructor_type(start, true)
                });
                if ty.is_none() {
                    self.error_here(
                        DiagnosticKind::ExpectedConstruct,
                        "expected a type, found `abstract`",
                    );
                }
                ty
            }
            TokenKind::LBracket => self.parse_tuple_type(),
            TokenKind::LBrace => self.parse_object_or_mapped_type(),
            TokenKind::Typeof => self.parse_type_query(),
            TokenKind::Import => {
                let import = self.parse_import_type()?;
                Some(TypeAnn::new(
                    TypeAnnKind::Import(Box::new(import)),
                    self.span_from(start),
                ))
            }
            TokenKind::DotDotDot => {
                self.advance();
                let inner = self.parse_type()?;
                Some(TypeAnn::new(
                    TypeAnnKind::Rest(Box::new(inner)),
                    self.span_from(start),
                ))
            }
            TokenKind::Ident
                if self.peek().text == "intrinsic"
                    && !matches!(self.nth(1), TokenKind::Dot | TokenKind::LAngle) =>
            {
                self.advance();
                Some(TypeAnn::new(
                    TypeAnnKind::Primitive(Primitive::Intrinsic),
                    self.span_from(start),
                ))
            }
            kind if kind.is_binding_identifier() => {
                let reference = self.parse_type_reference()?;
                let span = reference.span;
                Some(TypeAnn::new(TypeAnnKind::Reference(reference), span))
            }
            kind => {
                self.error_here(
                    DiagnosticKind::ExpectedConstruct,
                    format!("expected a type, found {}", kind.describe()),
                );
                None
            }
        }
    }

    fn literal_type(&self, literal: Literal, start: Pos) -> TypeAnn {
        TypeAnn::new(TypeAnnKind::Literal(literal), self.span_from(start))
    }

    /// A possibly qualified name with optional type arguments.
    pub(super) fn parse_type_reference(&mut self) -> Option<TypeRef> {
        let start = self.start_pos();
        let name = self.parse_entity_name()?;
        let type_args = self.parse_type_arguments_opt();
        Some(TypeRef {
            name,
            type_args,
            span: self.span_from(start),
        })
    }

    /// Type arguments, when a `<` follows on the same line.
    fn parse_type_arguments_opt(&mut self) -> Option<Vec<TypeAnn>> {
        if self.at(TokenKind::LAngle) && !self.at_line_start() {
            Some(self.parse_type_arguments())
        } else {
            None
        }
    }

    /// `<A, B>`. A missing `>` is reported and the arguments parsed so far
    /// are kept.
    fn parse_type_arguments(&mut self) -> Vec<TypeAnn> {
        self.advance();
        let mut args = Vec::new();
        while !self.at(TokenKind::RAngle) && !self.at(TokenKind::Eof) {
            match self.parse_type() {
                Some(ty) => args.push(ty),
                None => break,
            }
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RAngle);
        args
    }

    /// `(` starts either a function type or a parenthesized type.
    fn parse_paren_or_function_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        let function = self.try_parse("function type", |p| p.parse_function_type(start, Vec::new()));
        if function.is_some() {
            return function;
        }

        self.advance();
        let inner = self.parse_type()?;
        self.expect(TokenKind::RParen);
        Some(TypeAnn::new(
            TypeAnnKind::Parenthesized(Box::new(inner)),
            self.span_from(start),
        ))
    }

    /// `<T>(x: T) => T`. There is nothing else a `<` can start.
    fn parse_generic_function_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        let ty = self.try_parse("generic function type", |p| {
            let type_params = p.parse_type_params();
            p.parse_function_type(start, type_params)
        });
        if ty.is_none() {
            self.error_here(
                DiagnosticKind::Ambiguous,
                "`<` in type position must start a generic function type",
            );
        }
        ty
    }

    /// `(params) => R`, after any type parameters.
    fn parse_function_type(&mut self, start: Pos, type_params: Vec<TypeParam>) -> Option<TypeAnn> {
        let params = self.parse_params()?;
        self.expect(TokenKind::Arrow)?;
        let return_type = self.parse_return_type()?;
        Some(TypeAnn::new(
            TypeAnnKind::Function(Box::new(FunctionType {
                type_params,
                params,
                return_type,
            })),
            self.span_from(start),
        ))
    }

    /// `new <T>(params) => R`, with `abstract` already consumed if present.
    fn parse_constructor_type(&mut self, start: Pos, is_abstract: bool) -> Option<TypeAnn> {
        self.expect(TokenKind::New)?;
        let type_params = self.parse_type_params();
        let params = self.parse_params()?;
        self.expect(TokenKind::Arrow)?;
        let return_type = self.parse_return_type()?;
        Some(TypeAnn::new(
            TypeAnnKind::Constructor(Box::new(ConstructorType {
                is_abstract,
                type_params,
                params,
                return_type,
            })),
            self.span_from(start),
        ))
    }

    /// A type in return position, where type predicates are allowed.
    pub(super) fn parse_return_type(&mut self) -> Option<TypeAnn> {
        let kind = self.peek_kind();
        let maybe_predicate = kind == TokenKind::Asserts
            || ((kind == TokenKind::This || kind.is_binding_identifier())
                && self.nth(1) == TokenKind::Is);
        if maybe_predicate {
            let predicate = self.try_parse("type predicate", |p| p.parse_type_predicate());
            if predicate.is_some() {
                return predicate;
            }
        }
        self.parse_type()
    }

    /// `x is T`, `this is T`, `asserts x`, `asserts x is T`.
    fn parse_type_predicate(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        let next = self.nth(1);
        let asserts = self.at(TokenKind::Asserts)
            && next != TokenKind::Is
            && (next == TokenKind::This || next.is_binding_identifier());
        if asserts {
            self.advance();
            if self.at_line_start() {
                return None;
            }
        }

        let subject = if self.at(TokenKind::This) {
            PredicateSubject::This(self.advance().span)
        } else {
            PredicateSubject::Ident(self.expect_ident()?)
        };

        let ty = if self.at(TokenKind::Is) && !self.at_line_start() {
            self.advance();
            Some(self.parse_type()?)
        } else if asserts {
            None
        } else {
            return None;
        };

        Some(TypeAnn::new(
            TypeAnnKind::Predicate(Box::new(TypePredicate {
                asserts,
                subject,
                ty,
            })),
            self.span_from(start),
        ))
    }

    /// `[A, b?: B, ...C[]]`. A missing `]` is reported and the elements
    /// parsed so far are kept.
    fn parse_tuple_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        self.advance();

        let mut elements = Vec::new();
        while !self.at(TokenKind::RBracket) && !self.at(TokenKind::Eof) {
            match self.parse_tuple_element() {
                Some(element) => elements.push(element),
                None => break,
            }
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBracket);

        Some(TypeAnn::new(
            TypeAnnKind::Tuple(elements),
            self.span_from(start),
        ))
    }

    fn parse_tuple_element(&mut self) -> Option<TupleElement> {
        let start = self.start_pos();
        let dots = self.at(TokenKind::DotDotDot);
        let offset = usize::from(dots);
        let labeled = self.nth(offset).is_identifier_name()
            && (self.nth(offset + 1) == TokenKind::Colon
                || (self.nth(offset + 1) == TokenKind::Question
                    && self.nth(offset + 2) == TokenKind::Colon));

        if !labeled {
            let mut ty = self.parse_type()?;
            if self.at(TokenKind::Question) {
                self.advance();
                ty = TypeAnn::new(TypeAnnKind::Optional(Box::new(ty)), self.span_from(start));
            }
            return Some(TupleElement {
                label: None,
                optional: false,
                rest: false,
                span: ty.span,
                ty,
            });
        }

        let rest = self.matches(TokenKind::DotDotDot);
        let label = self.expect_ident_name()?;
        let optional = self.matches(TokenKind::Question);
        self.expect(TokenKind::Colon)?;
        let mut ty = self.parse_type()?;
        if self.at(TokenKind::Question) {
            let marker = self.advance().span;
            if optional {
                self.error(
                    DiagnosticKind::UnexpectedToken,
                    marker,
                    "a labeled tuple element is already optional; remove the `?` after its type",
                );
            } else {
                self.error(
                    DiagnosticKind::UnexpectedToken,
                    marker,
                    "labeled tuple elements mark optionality after the label, not the type",
                );
            }
            let span = self.span_from(ty.span.start);
            ty = TypeAnn::new(TypeAnnKind::Optional(Box::new(ty)), span);
        }

        Some(TupleElement {
            label: Some(label),
            optional,
            rest,
            ty,
            span: self.span_from(start),
        })
    }

    /// `{` starts either a mapped type or an object type literal.
    fn parse_object_or_mapped_type(&mut self) -> Option<TypeAnn> {
        if let Some(mapped) = self.try_parse("mapped type", |p| p.parse_mapped_type()) {
            return Some(mapped);
        }
        Some(self.parse_object_type())
    }

    /// `{ members }`. A missing `}` is reported and the members parsed so
    /// far are kept.
    pub(super) fn parse_object_type(&mut self) -> TypeAnn {
        let start = self.start_pos();
        self.advance();
        let members = self.parse_type_members();
        self.expect(TokenKind::RBrace);
        TypeAnn::new(TypeAnnKind::Object(members), self.span_from(start))
    }

    fn parse_mapped_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        self.expect(TokenKind::LBrace)?;

        let readonly = match self.peek_kind() {
            TokenKind::Plus | TokenKind::Minus => {
                let sign = self.parse_mapped_sign();
                self.expect(TokenKind::Readonly)?;
                sign
            }
            TokenKind::Readonly => {
                self.advance();
                MappedModifier::Add
            }
            _ => MappedModifier::None,
        };

        self.expect(TokenKind::LBracket)?;
        let key = self.expect_ident()?;
        self.expect(TokenKind::In)?;
        let constraint = self.parse_type()?;
        let name_type = if self.matches(TokenKind::As) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(TokenKind::RBracket)?;

        let optional = match self.peek_kind() {
            TokenKind::Plus | TokenKind::Minus => {
                let sign = self.parse_mapped_sign();
                self.expect(TokenKind::Question)?;
                sign
            }
            TokenKind::Question => {
                self.advance();
                MappedModifier::Add
            }
            _ => MappedModifier::None,
        };

        let value = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        if !self.matches(TokenKind::Semicolon) {
            self.matches(TokenKind::Comma);
        }
        self.expect(TokenKind::RBrace)?;

        Some(TypeAnn::new(
            TypeAnnKind::Mapped(Box::new(MappedType {
                key,
                constraint,
                name_type,
                readonly,
                optional,
                value,
            })),
            self.span_from(start),
        ))
    }

    fn parse_mapped_sign(&mut self) -> MappedModifier {
        if self.advance().kind == TokenKind::Minus {
            MappedModifier::Remove
        } else {
            MappedModifier::Add
        }
    }

    /// `` `a${T}b` ``
    fn parse_template_literal_type(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        let head = self.advance();
        let mut parts = Vec::new();
        if !head.text.is_empty() {
            parts.push(TemplatePart::Text(head.text));
        }

        if head.kind == TokenKind::TemplateHead {
            loop {
                let ty = self.parse_type()?;
                parts.push(TemplatePart::Type(ty));
                match self.peek_kind() {
                    TokenKind::TemplateMiddle => {
                        let text = self.advance().text;
                        if !text.is_empty() {
                            parts.push(TemplatePart::Text(text));
                        }
                    }
                    TokenKind::TemplateTail => {
                        let text = self.advance().text;
                        if !text.is_empty() {
                            parts.push(TemplatePart::Text(text));
                        }
                        break;
                    }
                    kind => {
                        self.error_here(
                            DiagnosticKind::ExpectedToken,
                            format!(
                                "expected `}}` closing a template substitution, found {}",
                                kind.describe()
                            ),
                        );
                        break;
                    }
                }
            }
        }

        Some(TypeAnn::new(
            TypeAnnKind::TemplateLiteral(parts),
            self.span_from(start),
        ))
    }

    /// `typeof x.y`, `typeof import("m")`, with optional type arguments.
    fn parse_type_query(&mut self) -> Option<TypeAnn> {
        let start = self.start_pos();
        self.advance();
        let target = if self.at(TokenKind::Import) {
            TypeQueryTarget::Import(self.parse_import_type()?)
        } else {
            TypeQueryTarget::Name(self.parse_entity_name()?)
        };
        let type_args = self.parse_type_arguments_opt();
        Some(TypeAnn::new(
            TypeAnnKind::TypeOf(Box::new(TypeQuery { target, type_args })),
            self.span_from(start),
        ))
    }

    /// `import("m").A.B<T>`
    fn parse_import_type(&mut self) -> Option<ImportType> {
        self.expect(TokenKind::Import)?;
        self.expect(TokenKind::LParen)?;
        let specifier = self.expect_string()?;
        self.expect(TokenKind::RParen)?;

        let qualifier = if self.at(TokenKind::Dot) {
            self.advance();
            let start = self.start_pos();
            let mut segments = vec![self.expect_ident_name()?];
            while self.at(TokenKind::Dot) && self.nth(1).is_identifier_name() {
                self.advance();
                segments.push(self.expect_ident_name()?);
            }
            Some(EntityName {
                segments,
                span: self.span_from(start),
            })
        } else {
            None
        };
        let type_args = self.parse_type_arguments_opt();
        Some(ImportType {
            specifier,
            qualifier,
            type_args,
        })
    }

    /// `<T extends C = D, const U>`; empty when no `<` follows.
    pub(super) fn parse_type_params(&mut self) -> Vec<TypeParam> {
        let mut params = Vec::new();
        if !self.matches(TokenKind::LAngle) {
            return params;
        }

        while !self.at(TokenKind::RAngle) && !self.at(TokenKind::Eof) {
            match self.parse_type_param() {
                Some(param) => params.push(param),
                None => break,
            }
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RAngle);
        params
    }

    fn parse_type_param(&mut self) -> Option<TypeParam> {
        let start = self.start_pos();
        let (mut is_in, mut is_out, mut is_const) = (false, false, false);
        loop {
            let kind = self.peek_kind();
            let is_modifier = matches!(kind, TokenKind::In | TokenKind::Out | TokenKind::Const)
                && self.nth(1).is_binding_identifier();
            if !is_modifier {
                break;
            }
            self.advance();
            match kind {
                TokenKind::In => is_in = true,
                TokenKind::Out => is_out = true,
                _ => is_const = true,
            }
        }

        let name = self.expect_ident()?;
        let constraint = if self.matches(TokenKind::Extends) {
            self.parse_type()
        } else {
            None
        };
        let default = if self.matches(TokenKind::Eq) {
            self.parse_type()
        } else {
            None
        };
        Some(TypeParam {
            name,
            constraint,
            default,
            is_in,
            is_out,
            is_const,
            span: self.span_from(start),
        })
    }

    /// `(a: A, b?: B, ...rest: C[])`. `None` only when there is no `(`.
    pub(super) fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            match self.parse_param() {
                Some(param) => params.push(param),
                None => {
                    while !self.at_param_boundary() {
                        self.skip_balanced();
                    }
                }
            }
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen);
        Some(params)
    }

    /// Where a broken parameter stops being skipped: the next parameter,
    /// the end of the list, or anything that cannot be inside it.
    fn at_param_boundary(&self) -> bool {
        let kind = self.peek_kind();
        matches!(
            kind,
            TokenKind::Comma
                | TokenKind::RParen
                | TokenKind::Semicolon
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::Arrow
                | TokenKind::Eof
        ) || self.is_statement_start(kind)
    }

    fn parse_param(&mut self) -> Option<Param> {
        let start = self.start_pos();
        let mut modifiers = Modifiers::empty();
        loop {
            let flag = match self.peek_kind() {
                TokenKind::Public => Modifiers::PUBLIC,
                TokenKind::Private => Modifiers::PRIVATE,
                TokenKind::Protected => Modifiers::PROTECTED,
                TokenKind::Readonly => Modifiers::READONLY,
                TokenKind::Override => Modifiers::OVERRIDE,
                _ => break,
            };
            let next = self.nth(1);
            if !(next.is_binding_identifier()
                || matches!(next, TokenKind::LBrace | TokenKind::LBracket | TokenKind::This))
            {
                break;
            }
            self.advance();
            modifiers |= flag;
        }

        let rest = self.matches(TokenKind::DotDotDot);
        let name = match self.peek_kind() {
            TokenKind::LBrace | TokenKind::LBracket => {
                let pattern_start = self.start_pos();
                self.skip_balanced();
                BindingName::Pattern(self.span_from(pattern_start))
            }
            TokenKind::This => {
                let token = self.advance();
                BindingName::Ident(Ident::new(token.text, token.span))
            }
            _ => BindingName::Ident(self.expect_ident()?),
        };
        let optional = self.matches(TokenKind::Question);
        let ty = if self.matches(TokenKind::Colon) {
            self.parse_type()
        } else {
            None
        };
        if self.at(TokenKind::Eq) {
            self.error_here(
                DiagnosticKind::Unsupported,
                "parameter initializers are not allowed in declaration files",
            );
            self.advance();
            self.skip_initializer();
        }

        Some(Param {
            name,
            ty,
            optional,
            rest,
            modifiers,
            span: self.span_from(start),
        })
    }
}

/// Whether `kind` can begin a type.
fn starts_type(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        LParen
            | LBracket
            | LBrace
            | LAngle
            | StringLiteral
            | NumberLiteral
            | BigIntLiteral
            | NoSubstitutionTemplate
            | TemplateHead
            | Minus
            | Keyof
            | Typeof
            | Import
            | New
            | Abstract
            | Infer
            | Unique
            | Readonly
            | DotDotDot
            | This
    ) || kind.is_identifier_name()
}
