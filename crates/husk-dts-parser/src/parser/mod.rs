//! Recursive descent parser for TypeScript declaration files.
//!
//! The parser is resilient: problems are recorded as [`Diagnostic`]s and the
//! parser keeps going, returning `None` or a partial node from the failing
//! sub-parser. Ambiguous syntax is resolved by speculation: the state is
//! saved, the more specific alternative is attempted, and on failure the
//! state is restored and the simpler alternative parsed instead.

mod decls;
mod members;
mod modules;
mod types;

use husk_dts_lexer::{Pos, SourceId, Span, Token, TokenKind, TokenSource};
use tracing::{debug, trace};

use crate::ast::*;
use crate::config::ParserConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Declaration context, passed down by value.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ParseCtx {
    /// Inside `declare`, `export`, or a namespace/module/global body.
    pub ambient: bool,
}

impl ParseCtx {
    pub fn ambient(self) -> Self {
        Self { ambient: true }
    }
}

/// Everything needed to undo a failed speculative attempt.
#[derive(Clone, Copy)]
struct Snapshot<T: Copy> {
    tokens: T,
    diagnostics: usize,
    prev_span: Span,
    consumed: usize,
}

pub(crate) struct Parser<S: TokenSource> {
    tokens: S,
    source: SourceId,
    config: ParserConfig,
    diagnostics: Vec<Diagnostic>,
    /// Span of the last consumed token.
    prev_span: Span,
    /// Number of tokens consumed so far.
    consumed: usize,
    depth: usize,
    /// Parsing the `extends` clause of a conditional type.
    in_extends_clause: bool,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(tokens: S, source: SourceId, config: ParserConfig) -> Self {
        let start = Span::point(source, Pos::START);
        Self {
            tokens,
            source,
            config,
            diagnostics: Vec::new(),
            prev_span: start,
            consumed: 0,
            depth: 0,
            in_extends_clause: false,
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    // ----- Token access -----

    fn peek(&self) -> &Token {
        self.tokens.peek()
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens.peek().kind
    }

    fn nth(&mut self, n: usize) -> TokenKind {
        self.tokens.nth(n)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Next token starts a new line.
    fn at_line_start(&self) -> bool {
        self.peek().newline_before
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.consume();
        if token.kind != TokenKind::Eof {
            self.prev_span = token.span;
            self.consumed += 1;
        }
        token
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            let found = self.peek_kind().describe();
            self.error_here(
                DiagnosticKind::ExpectedToken,
                format!("expected {}, found {found}", kind.describe()),
            );
            None
        }
    }

    /// An identifier in binding position: contextual keywords allowed,
    /// reserved words rejected.
    fn expect_ident(&mut self) -> Option<Ident> {
        if self.peek_kind().is_binding_identifier() {
            let token = self.advance();
            Some(Ident::new(token.text, token.span))
        } else {
            let found = self.peek_kind().describe();
            self.error_here(
                DiagnosticKind::ExpectedConstruct,
                format!("expected identifier, found {found}"),
            );
            None
        }
    }

    /// Any identifier name, keywords included.
    fn expect_ident_name(&mut self) -> Option<Ident> {
        if self.peek_kind().is_identifier_name() {
            let token = self.advance();
            Some(Ident::new(token.text, token.span))
        } else {
            let found = self.peek_kind().describe();
            self.error_here(
                DiagnosticKind::ExpectedConstruct,
                format!("expected identifier, found {found}"),
            );
            None
        }
    }

    fn expect_string(&mut self) -> Option<StrLit> {
        let token = self.expect(TokenKind::StringLiteral)?;
        Some(StrLit {
            value: token.text,
            span: token.span,
        })
    }

    /// `A.B.C`; the first segment must be a binding identifier.
    fn parse_entity_name(&mut self) -> Option<EntityName> {
        let first = if self.at(TokenKind::This) {
            let token = self.advance();
            Ident::new(token.text, token.span)
        } else {
            self.expect_ident()?
        };
        let start = first.span.start;
        let mut segments = vec![first];
        while self.at(TokenKind::Dot) && self.nth(1).is_identifier_name() {
            self.advance();
            let token = self.advance();
            segments.push(Ident::new(token.text, token.span));
        }
        Some(EntityName {
            segments,
            span: self.span_from(start),
        })
    }

    /// A statement or member terminator: `;`, or a line break / closing
    /// brace / end of input before the next token.
    fn parse_semicolon(&mut self) -> bool {
        if self.matches(TokenKind::Semicolon) {
            return true;
        }
        if self.at_line_start() || self.at(TokenKind::RBrace) || self.at(TokenKind::Eof) {
            return true;
        }
        self.expect(TokenKind::Semicolon);
        false
    }

    // ----- Spans and diagnostics -----

    fn start_pos(&self) -> Pos {
        self.peek().span.start
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: Pos) -> Span {
        let end = if self.prev_span.end.offset >= start.offset {
            self.prev_span.end
        } else {
            start
        };
        Span::new(self.source, start, end)
    }

    fn error(&mut self, kind: DiagnosticKind, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(kind, span, message));
    }

    fn error_here(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let span = self.peek().span;
        self.error(kind, span, message);
    }

    // ----- Speculation -----

    fn snapshot(&self) -> Snapshot<S::Snapshot> {
        Snapshot {
            tokens: self.tokens.save(),
            diagnostics: self.diagnostics.len(),
            prev_span: self.prev_span,
            consumed: self.consumed,
        }
    }

    fn restore(&mut self, snapshot: Snapshot<S::Snapshot>) {
        self.tokens.restore(snapshot.tokens);
        self.diagnostics.truncate(snapshot.diagnostics);
        self.prev_span = snapshot.prev_span;
        self.consumed = snapshot.consumed;
    }

    /// Run `f` speculatively. It fails if it returns `None` or records any
    /// diagnostic; on failure every effect is rolled back.
    fn try_parse<T>(
        &mut self,
        what: &'static str,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let snapshot = self.snapshot();
        match f(self) {
            Some(value) if self.diagnostics.len() == snapshot.diagnostics => Some(value),
            _ => {
                trace!(attempt = what, at = %self.peek().span, "speculative parse abandoned");
                self.restore(snapshot);
                None
            }
        }
    }

    /// Enter one nesting level, or report the depth limit.
    fn enter(&mut self) -> bool {
        if self.depth >= self.config.max_depth {
            self.error_here(
                DiagnosticKind::LimitExceeded,
                format!("nesting exceeds the maximum depth of {}", self.config.max_depth),
            );
            return false;
        }
        self.depth += 1;
        true
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    // ----- Recovery -----

    /// Skip a balanced `{}`, `[]` or `()` group starting at the current
    /// opening token.
    fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                TokenKind::Eof => return,
                _ => {}
            }
            self.advance();
            if depth == 0 {
                return;
            }
        }
    }

    /// Skip an initializer expression up to `,` `;` `)` `}` or a line break
    /// at nesting level zero.
    fn skip_initializer(&mut self) {
        let start = self.consumed;
        loop {
            match self.peek_kind() {
                TokenKind::Comma | TokenKind::Semicolon | TokenKind::RParen | TokenKind::RBrace
                | TokenKind::RBracket | TokenKind::Eof => return,
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => self.skip_balanced(),
                _ if self.at_line_start() && self.consumed > start => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Statement-level recovery: skip to the next statement start, past a
    /// `;`, or up to a closing brace. Always consumes at least one token.
    fn recover_statement(&mut self, consumed_before: usize) {
        if self.consumed == consumed_before && !self.at(TokenKind::Eof) {
            let token = self.advance();
            if token.kind == TokenKind::Semicolon {
                return;
            }
            if token.kind == TokenKind::LBrace {
                self.skip_block_rest();
            }
        }
        loop {
            match self.peek_kind() {
                TokenKind::Eof | TokenKind::RBrace => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => self.skip_balanced(),
                kind if self.is_statement_start(kind) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// After consuming a `{`, skip to and past its matching `}`.
    fn skip_block_rest(&mut self) {
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => return,
                _ => {}
            }
        }
    }

    fn is_statement_start(&self, kind: TokenKind) -> bool {
        use TokenKind::*;
        match kind {
            Export | Import | Interface | Class | Function | Enum | Var | Let | Const => true,
            Declare | Type | Namespace | Module | Global | Abstract => self.at_line_start(),
            _ => false,
        }
    }

    // ----- Module assembly -----

    #[tracing::instrument(level = "debug", skip(self), fields(source = %self.source))]
    pub fn parse_module(&mut self) -> Module {
        let start = Span::point(self.source, Pos::START);

        let max_tokens = self.config.max_tokens;
        if let Some(count) = self.tokens.token_count().filter(|&count| count > max_tokens) {
            self.error(
                DiagnosticKind::LimitExceeded,
                start,
                format!("file has {count} tokens, more than the maximum of {max_tokens}"),
            );
            return Module {
                source: self.source,
                statements: Vec::new(),
                references: Vec::new(),
                span: start,
            };
        }

        let references = self.parse_references();
        let statements = self.parse_statements(ParseCtx::default(), TokenKind::Eof);

        let mut end = self.peek().span.end;
        if let Some(last) = references.last() {
            end = end.max(last.span.end);
        }
        debug!(
            statements = statements.len(),
            references = references.len(),
            diagnostics = self.diagnostics.len(),
            "parsed module"
        );
        Module {
            source: self.source,
            statements,
            references,
            span: Span::new(self.source, Pos::START, end),
        }
    }

    /// Statements up to `terminator` (not consumed) or end of input.
    fn parse_statements(&mut self, ctx: ParseCtx, terminator: TokenKind) -> Vec<Statement> {
        let mut statements = Vec::new();
        while !self.at(terminator) && !self.at(TokenKind::Eof) {
            if self.matches(TokenKind::Semicolon) {
                continue;
            }
            let before = self.consumed;
            match self.parse_statement(ctx) {
                Some(statement) => statements.push(statement),
                None => self.recover_statement(before),
            }
        }
        statements
    }

    /// `{ statements }` with the body parsed in ambient context.
    fn parse_block(&mut self, ctx: ParseCtx) -> Vec<Statement> {
        if self.expect(TokenKind::LBrace).is_none() {
            return Vec::new();
        }
        if !self.enter() {
            self.skip_block_rest();
            return Vec::new();
        }
        let body = self.parse_statements(ctx.ambient(), TokenKind::RBrace);
        self.exit();
        self.expect(TokenKind::RBrace);
        body
    }

    /// Interpret the triple-slash directives the token source set aside.
    fn parse_references(&mut self) -> Vec<Reference> {
        let directives: Vec<(String, Span)> = self
            .tokens
            .directives()
            .iter()
            .map(|t| (t.text.clone(), t.span))
            .collect();
        let mut references = Vec::new();
        for (text, span) in directives {
            match parse_reference(&text) {
                Some((kind, value)) => references.push(Reference { kind, value, span }),
                None if text.starts_with("<reference") => self.error(
                    DiagnosticKind::ExpectedConstruct,
                    span,
                    "expected `path`, `types`, `lib` or `no-default-lib` in reference directive",
                ),
                // `<amd-module>` and friends carry nothing for declarations.
                None => {}
            }
        }
        references
    }
}

/// `<reference path="x" />` → `(Path, "x")`.
fn parse_reference(text: &str) -> Option<(ReferenceKind, String)> {
    let body = text.strip_prefix("<reference")?;
    for (attr, kind) in [
        ("path", ReferenceKind::Path),
        ("types", ReferenceKind::Types),
        ("lib", ReferenceKind::Lib),
        ("no-default-lib", ReferenceKind::NoDefaultLib),
    ] {
        if let Some(value) = attribute_value(body, attr) {
            return Some((kind, value));
        }
    }
    None
}

fn attribute_value(body: &str, attr: &str) -> Option<String> {
    let mut rest = body;
    while let Some(idx) = rest.find(attr) {
        let before_ok = rest[..idx]
            .chars()
            .last()
            .map_or(true, |c| c.is_whitespace());
        let after = rest[idx + attr.len()..].trim_start();
        if let Some(after_eq) = after.strip_prefix('=').filter(|_| before_ok) {
            let after_eq = after_eq.trim_start();
            let quote = after_eq.chars().next().filter(|c| *c == '"' || *c == '\'')?;
            let value = &after_eq[1..];
            let end = value.find(quote)?;
            return Some(value[..end].to_string());
        }
        rest = &rest[idx + attr.len()..];
    }
    None
}
