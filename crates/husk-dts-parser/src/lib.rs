//! TypeScript declaration file (.d.ts) parser for Husk.
//!
//! This crate provides a resilient recursive descent parser for TypeScript
//! declaration files and a classifier that sorts a parsed file's
//! declarations into global, package-export and named-module buckets for
//! Husk's type registration.
//!
//! ```
//! use husk_dts_parser::{classify, parse, SourceId};
//!
//! let out = parse("export interface Foo { x: number }", SourceId(0));
//! assert!(out.diagnostics.is_empty());
//! let classes = classify(&out.module);
//! assert!(classes.has_top_level_exports);
//! assert_eq!(classes.package.len(), 1);
//! ```

pub mod ast;
mod classify;
mod config;
mod diagnostics;
mod package;
mod parser;

use husk_dts_lexer::{TokenSource, TokenStream};
use serde::Serialize;

pub use ast::{Module, SourceId, Span, TypeAnn};
pub use classify::{classify, Classification};
pub use config::{ConfigError, ParserConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOKENS};
pub use diagnostics::{render_diagnostics, Diagnostic, DiagnosticKind, Severity};
pub use husk_dts_lexer::{Token, TokenKind};
pub use package::package_ident;

use parser::Parser;

/// A parsed module together with every diagnostic recorded while lexing and
/// parsing it. The module is always present, even for malformed input.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutput {
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }
}

/// Parse a .d.ts source string with the default limits.
#[tracing::instrument(level = "debug", skip(src), fields(len = src.len()))]
pub fn parse(src: &str, source: SourceId) -> ParseOutput {
    parse_with_config(src, source, ParserConfig::default())
}

/// Parse a .d.ts source string.
pub fn parse_with_config(src: &str, source: SourceId, config: ParserConfig) -> ParseOutput {
    let (tokens, lex_errors) = TokenStream::lex(src, source);
    let mut out = parse_tokens(tokens, source, config);
    if !lex_errors.is_empty() {
        let mut diagnostics: Vec<Diagnostic> =
            lex_errors.into_iter().map(Diagnostic::from).collect();
        diagnostics.append(&mut out.diagnostics);
        out.diagnostics = diagnostics;
    }
    out
}

/// Parse from any token source.
pub fn parse_tokens<S: TokenSource>(
    tokens: S,
    source: SourceId,
    config: ParserConfig,
) -> ParseOutput {
    let mut parser = Parser::new(tokens, source, config);
    let module = parser.parse_module();
    ParseOutput {
        module,
        diagnostics: parser.into_diagnostics(),
    }
}

/// Parse a single type expression, such as `Partial<T> | null`.
pub fn parse_type_str(src: &str) -> (Option<TypeAnn>, Vec<Diagnostic>) {
    let source = SourceId(0);
    let (tokens, lex_errors) = TokenStream::lex(src, source);
    let mut parser = Parser::new(tokens, source, ParserConfig::default());
    let ty = parser.parse_standalone_type();
    let mut diagnostics: Vec<Diagnostic> = lex_errors.into_iter().map(Diagnostic::from).collect();
    diagnostics.extend(parser.into_diagnostics());
    (ty, diagnostics)
}
