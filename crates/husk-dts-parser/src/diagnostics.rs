//! Parse diagnostics and their human-readable rendering.
//!
//! Diagnostics are collected in source order while parsing and never stop
//! the parser. [`render_diagnostics`] turns them into a report over the
//! source text using codespan-reporting.

use std::fmt;

use codespan_reporting::diagnostic::{Diagnostic as Report, Label, Severity as ReportSeverity};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::NoColor;
use husk_dts_lexer::{LexError, Span};
use serde::Serialize;
use thiserror::Error;

/// What went wrong, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// A specific token was required: `expected ';'`.
    ExpectedToken,
    /// A syntactic construct was required: `expected a type`.
    ExpectedConstruct,
    /// A token that cannot start or continue anything here.
    UnexpectedToken,
    /// The only disambiguation alternative failed.
    Ambiguous,
    /// Reported by the token source.
    Lexical,
    /// Legal TypeScript that has no place in a declaration file.
    Unsupported,
    /// A configured parser limit was hit.
    LimitExceeded,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::ExpectedToken => "expected token",
            DiagnosticKind::ExpectedConstruct => "expected construct",
            DiagnosticKind::UnexpectedToken => "unexpected token",
            DiagnosticKind::Ambiguous => "ambiguous syntax",
            DiagnosticKind::Lexical => "lexical error",
            DiagnosticKind::Unsupported => "unsupported in declaration file",
            DiagnosticKind::LimitExceeded => "limit exceeded",
        };
        f.write_str(s)
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// A non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} at {span}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Skipped bodies and initializers are warnings; everything else is an error.
    pub fn severity(&self) -> Severity {
        match self.kind {
            DiagnosticKind::Unsupported => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        Diagnostic::new(DiagnosticKind::Lexical, err.span(), err.to_string())
    }
}

/// Render `diagnostics` against `source` as plain text.
pub fn render_diagnostics(name: &str, source: &str, diagnostics: &[Diagnostic]) -> String {
    let file = SimpleFile::new(name, source);
    let config = term::Config::default();
    let mut writer = NoColor::new(Vec::new());

    for diagnostic in diagnostics {
        let range = diagnostic.span.range();
        let in_source = range.end <= source.len()
            && source.is_char_boundary(range.start)
            && source.is_char_boundary(range.end);
        if !in_source {
            // Spans from another source; fall back to the one-line form.
            let line = format!("{}: {diagnostic}\n", severity_label(diagnostic.severity()));
            writer.get_mut().extend_from_slice(line.as_bytes());
            continue;
        }
        let severity = to_report_severity(diagnostic.severity());
        let report = Report::new(severity)
            .with_message(&diagnostic.message)
            .with_labels(vec![
                Label::primary((), range).with_message(diagnostic.kind.to_string()),
            ]);
        if let Err(err) = term::emit(&mut writer, &config, &file, &report) {
            tracing::warn!(%err, "failed to render diagnostic");
        }
    }

    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}

fn to_report_severity(severity: Severity) -> ReportSeverity {
    match severity {
        Severity::Warning => ReportSeverity::Warning,
        Severity::Error => ReportSeverity::Error,
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use husk_dts_lexer::{Pos, SourceId};

    fn span(start: usize, end: usize) -> Span {
        Span::new(
            SourceId(0),
            Pos {
                offset: start,
                line: 1,
                column: start as u32 + 1,
            },
            Pos {
                offset: end,
                line: 1,
                column: end as u32 + 1,
            },
        )
    }

    #[test]
    fn test_render_includes_message_and_file() {
        let src = "declare var x: ;\n";
        let diags = vec![Diagnostic::new(
            DiagnosticKind::ExpectedConstruct,
            span(15, 16),
            "expected a type",
        )];
        let out = render_diagnostics("index.d.ts", src, &diags);
        assert!(out.contains("error"));
        assert!(out.contains("expected a type"));
        assert!(out.contains("index.d.ts"));
    }

    #[test]
    fn test_unsupported_is_a_warning() {
        let d = Diagnostic::new(DiagnosticKind::Unsupported, span(0, 1), "body skipped");
        assert_eq!(d.severity(), Severity::Warning);
        let out = render_diagnostics("a.d.ts", "{}", &[d]);
        assert!(out.contains("warning"));
    }

    #[test]
    fn test_out_of_range_span_falls_back() {
        let d = Diagnostic::new(DiagnosticKind::ExpectedToken, span(50, 60), "expected `;`");
        let out = render_diagnostics("a.d.ts", "x", &[d]);
        assert!(out.contains("expected `;`"));
    }
}
