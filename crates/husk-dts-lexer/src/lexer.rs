//! Lexer for TypeScript declaration files.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::span::{Pos, SourceId, Span};
use crate::token::{Token, TokenKind};

/// A problem found while splitting source text into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString { span: Span },
    #[error("unterminated template literal")]
    UnterminatedTemplate { span: Span },
    #[error("unterminated block comment")]
    UnterminatedComment { span: Span },
    #[error("unexpected character `{ch}`")]
    UnexpectedChar { ch: char, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnterminatedString { span }
            | LexError::UnterminatedTemplate { span }
            | LexError::UnterminatedComment { span }
            | LexError::UnexpectedChar { span, .. } => *span,
        }
    }
}

/// Result of running the lexer over a whole source text.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Lexer for TypeScript declaration files.
pub struct Lexer<'src> {
    src: &'src str,
    source: SourceId,
    chars: Peekable<CharIndices<'src>>,
    pos: Pos,
    /// Brace depth inside each open `${ ... }` substitution, innermost last.
    template_depths: Vec<usize>,
    newline_before: bool,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str, source: SourceId) -> Self {
        Self {
            src,
            source,
            chars: src.char_indices().peekable(),
            pos: Pos::START,
            template_depths: Vec::new(),
            newline_before: false,
            errors: Vec::new(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_second(&self) -> Option<char> {
        self.src.get(self.pos.offset..)?.chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let (offset, ch) = self.chars.next()?;
        self.pos.offset = offset + ch.len_utf8();
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    fn span_from(&self, start: Pos) -> Span {
        Span::new(self.source, start, self.pos)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                if ch == '\n' || ch == '\u{2028}' || ch == '\u{2029}' {
                    self.newline_before = true;
                }
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self, start: Pos) {
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return;
                }
                Some(_) => {}
                None => {
                    let span = self.span_from(start);
                    self.errors.push(LexError::UnterminatedComment { span });
                    return;
                }
            }
        }
    }

    fn read_escape(&mut self, out: &mut String) {
        let Some(escaped) = self.advance() else {
            return;
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // Line continuation
            '\n' => {}
            'x' => {
                let hex = self.read_hex_digits(2);
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) => out.push(c),
                    None => {
                        out.push_str("\\x");
                        out.push_str(&hex);
                    }
                }
            }
            'u' => {
                let hex = if self.peek() == Some('{') {
                    self.advance();
                    let mut hex = String::new();
                    while let Some(c) = self.peek() {
                        self.advance();
                        if c == '}' {
                            break;
                        }
                        hex.push(c);
                    }
                    hex
                } else {
                    self.read_hex_digits(4)
                };
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) => out.push(c),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            other => out.push(other),
        }
    }

    fn read_hex_digits(&mut self, max: usize) -> String {
        let mut hex = String::new();
        while hex.len() < max {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        hex
    }

    fn read_string(&mut self, quote: char, start: Pos) -> String {
        let mut s = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    self.advance();
                    self.read_escape(&mut s);
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\n') | None => {
                    let span = self.span_from(start);
                    self.errors.push(LexError::UnterminatedString { span });
                    break;
                }
                Some(c) => {
                    self.advance();
                    s.push(c);
                }
            }
        }
        s
    }

    /// Reads template characters up to the closing backtick or the next
    /// `${`. Returns the cooked text and whether a substitution follows.
    fn read_template_chars(&mut self, start: Pos) -> (String, bool) {
        let mut s = String::new();
        loop {
            match self.advance() {
                Some('`') => return (s, false),
                Some('$') if self.peek() == Some('{') => {
                    self.advance();
                    return (s, true);
                }
                Some('\\') => self.read_escape(&mut s),
                Some(c) => s.push(c),
                None => {
                    let span = self.span_from(start);
                    self.errors.push(LexError::UnterminatedTemplate { span });
                    return (s, false);
                }
            }
        }
    }

    fn read_number(&mut self, first: char) -> TokenKind {
        let radix = if first == '0' {
            match self.peek() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            }
        } else {
            None
        };

        if let Some(radix) = radix {
            self.advance();
            while let Some(ch) = self.peek() {
                if ch.is_digit(radix) || ch == '_' {
                    self.advance();
                } else {
                    break;
                }
            }
        } else {
            self.eat_digits();
            if first != '.' && self.peek() == Some('.') {
                self.advance();
                self.eat_digits();
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let sign_then_digit = match self.peek_second() {
                    Some('+' | '-') => true,
                    Some(c) => c.is_ascii_digit(),
                    None => false,
                };
                if sign_then_digit {
                    self.advance();
                    if matches!(self.peek(), Some('+' | '-')) {
                        self.advance();
                    }
                    self.eat_digits();
                }
            }
        }

        if self.peek() == Some('n') {
            self.advance();
            return TokenKind::BigIntLiteral;
        }
        TokenKind::NumberLiteral
    }

    fn eat_digits(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_ident_rest(&mut self) {
        while let Some(ch) = self.peek() {
            if is_ident_continue(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn text(&self, start: Pos) -> &'src str {
        self.src.get(start.offset..self.pos.offset).unwrap_or_default()
    }

    fn close_brace(&mut self, start: Pos) -> (TokenKind, String) {
        match self.template_depths.last_mut() {
            Some(0) => {
                self.template_depths.pop();
                let (text, more) = self.read_template_chars(start);
                if more {
                    self.template_depths.push(0);
                    (TokenKind::TemplateMiddle, text)
                } else {
                    (TokenKind::TemplateTail, text)
                }
            }
            Some(depth) => {
                *depth -= 1;
                (TokenKind::RBrace, "}".to_string())
            }
            None => (TokenKind::RBrace, "}".to_string()),
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let start = self.pos;
            let newline_before = std::mem::take(&mut self.newline_before);

            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, "", self.span_from(start), newline_before);
            };

            let (kind, text) = match ch {
                '(' => (TokenKind::LParen, None),
                ')' => (TokenKind::RParen, None),
                '{' => {
                    if let Some(depth) = self.template_depths.last_mut() {
                        *depth += 1;
                    }
                    (TokenKind::LBrace, None)
                }
                '}' => {
                    let (kind, text) = self.close_brace(start);
                    (kind, Some(text))
                }
                '[' => (TokenKind::LBracket, None),
                ']' => (TokenKind::RBracket, None),
                // `>` is always a single token; no shift operators exist in
                // declaration syntax, so `A<B<C>>` closes cleanly.
                '<' => (TokenKind::LAngle, None),
                '>' => (TokenKind::RAngle, None),
                ',' => (TokenKind::Comma, None),
                ';' => (TokenKind::Semicolon, None),
                ':' => (TokenKind::Colon, None),
                '?' => (TokenKind::Question, None),
                '|' => (TokenKind::Pipe, None),
                '&' => (TokenKind::Amp, None),
                '+' => (TokenKind::Plus, None),
                '-' => (TokenKind::Minus, None),
                '*' => (TokenKind::Star, None),
                '!' => (TokenKind::Bang, None),
                '@' => (TokenKind::At, None),
                '.' => {
                    if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        (self.read_number('.'), None)
                    } else if self.peek() == Some('.') && self.peek_second() == Some('.') {
                        self.advance();
                        self.advance();
                        (TokenKind::DotDotDot, None)
                    } else {
                        (TokenKind::Dot, None)
                    }
                }
                '=' => {
                    if self.peek() == Some('>') {
                        self.advance();
                        (TokenKind::Arrow, None)
                    } else {
                        (TokenKind::Eq, None)
                    }
                }
                '/' => match self.peek() {
                    Some('/') => {
                        self.advance();
                        let triple = self.peek() == Some('/');
                        self.skip_line();
                        let raw = self.text(start);
                        let body = raw.trim_start_matches('/').trim();
                        if triple && body.starts_with('<') {
                            (TokenKind::TripleSlashDirective, Some(body.to_string()))
                        } else {
                            (TokenKind::LineComment, None)
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.skip_block_comment(start);
                        if self.text(start).contains('\n') {
                            // A multi-line comment separates lines like a newline does.
                            self.newline_before = true;
                        }
                        (TokenKind::BlockComment, None)
                    }
                    _ => (TokenKind::Slash, None),
                },
                '"' | '\'' => {
                    let s = self.read_string(ch, start);
                    (TokenKind::StringLiteral, Some(s))
                }
                '`' => {
                    let (text, more) = self.read_template_chars(start);
                    if more {
                        self.template_depths.push(0);
                        (TokenKind::TemplateHead, Some(text))
                    } else {
                        (TokenKind::NoSubstitutionTemplate, Some(text))
                    }
                }
                '#' if self.peek().is_some_and(is_ident_start) => {
                    self.read_ident_rest();
                    (TokenKind::PrivateName, None)
                }
                c if c.is_ascii_digit() => {
                    let kind = self.read_number(c);
                    if kind == TokenKind::BigIntLiteral {
                        let raw = self.text(start);
                        let digits = raw.strip_suffix('n').unwrap_or(raw);
                        (kind, Some(digits.to_string()))
                    } else {
                        (kind, None)
                    }
                }
                c if is_ident_start(c) => {
                    self.read_ident_rest();
                    let word = self.text(start);
                    (TokenKind::from_keyword(word).unwrap_or(TokenKind::Ident), None)
                }
                other => {
                    let span = self.span_from(start);
                    self.errors.push(LexError::UnexpectedChar { ch: other, span });
                    self.newline_before |= newline_before;
                    continue;
                }
            };

            let text = text.unwrap_or_else(|| self.text(start).to_string());
            return Token::new(kind, text, self.span_from(start), newline_before);
        }
    }

    /// Collect all tokens (comments included) and lexing errors.
    pub fn tokenize(mut self) -> Lexed {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tracing::trace!(
            tokens = tokens.len(),
            errors = self.errors.len(),
            source = %self.source,
            "lexed declaration source"
        );
        Lexed {
            tokens,
            errors: self.errors,
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src, SourceId(0))
            .tokenize()
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_function() {
        let src = "declare function add(a: number, b: number): number;";
        let tokens = Lexer::new(src, SourceId(0)).tokenize().tokens;

        assert_eq!(tokens[0].kind, TokenKind::Declare);
        assert_eq!(tokens[1].kind, TokenKind::Function);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[2].text, "add");
        assert_eq!(tokens[3].kind, TokenKind::LParen);
        assert_eq!(tokens[4].kind, TokenKind::Ident);
        assert_eq!(tokens[5].kind, TokenKind::Colon);
        assert_eq!(tokens[6].kind, TokenKind::Number_);
    }

    #[test]
    fn test_nested_generics_close_one_angle_at_a_time() {
        assert_eq!(
            kinds("Array<Array<T>>"),
            vec![
                TokenKind::Ident,
                TokenKind::LAngle,
                TokenKind::Ident,
                TokenKind::LAngle,
                TokenKind::Ident,
                TokenKind::RAngle,
                TokenKind::RAngle,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_arrow_and_spread() {
        assert_eq!(
            kinds("(...a) => void"),
            vec![
                TokenKind::LParen,
                TokenKind::DotDotDot,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::Arrow,
                TokenKind::Void_,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions_are_line_and_column() {
        let tokens = Lexer::new("a\n  bb", SourceId(3)).tokenize().tokens;
        let bb = &tokens[1];
        assert_eq!(bb.span.start.line, 2);
        assert_eq!(bb.span.start.column, 3);
        assert_eq!(bb.span.end.column, 5);
        assert_eq!(bb.span.source, SourceId(3));
        assert!(bb.newline_before);
        assert!(!tokens[0].newline_before);
    }

    #[test]
    fn test_comments_are_tokens() {
        let src = "// line\n/* block */ x /// <reference types=\"node\" />";
        let tokens = Lexer::new(src, SourceId(0)).tokenize().tokens;
        assert_eq!(tokens[0].kind, TokenKind::LineComment);
        assert_eq!(tokens[1].kind, TokenKind::BlockComment);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[3].kind, TokenKind::TripleSlashDirective);
        assert_eq!(tokens[3].text, "<reference types=\"node\" />");
    }

    #[test]
    fn test_string_literals() {
        let tokens = Lexer::new(r#""hel\"lo" 'wo\nrld'"#, SourceId(0)).tokenize().tokens;
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "hel\"lo");
        assert_eq!(tokens[1].text, "wo\nrld");
    }

    #[test]
    fn test_unterminated_string_reports_error() {
        let lexed = Lexer::new("\"abc\ntype", SourceId(0)).tokenize();
        assert_eq!(lexed.errors.len(), 1);
        assert!(matches!(lexed.errors[0], LexError::UnterminatedString { .. }));
        assert_eq!(lexed.tokens[1].kind, TokenKind::Type);
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("1 1.5e-3 0xFF 1_000 .5 10n", SourceId(0)).tokenize().tokens;
        let texts: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(texts[0], (TokenKind::NumberLiteral, "1"));
        assert_eq!(texts[1], (TokenKind::NumberLiteral, "1.5e-3"));
        assert_eq!(texts[2], (TokenKind::NumberLiteral, "0xFF"));
        assert_eq!(texts[3], (TokenKind::NumberLiteral, "1_000"));
        assert_eq!(texts[4], (TokenKind::NumberLiteral, ".5"));
        assert_eq!(texts[5], (TokenKind::BigIntLiteral, "10"));
    }

    #[test]
    fn test_template_literal_pieces() {
        let tokens = Lexer::new("`on${Capitalize<K>}Changed_${N}`", SourceId(0))
            .tokenize()
            .tokens;
        let got: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(got[0], (TokenKind::TemplateHead, "on"));
        assert_eq!(got[1], (TokenKind::Ident, "Capitalize"));
        assert_eq!(got[5], (TokenKind::TemplateMiddle, "Changed_"));
        assert_eq!(got[6], (TokenKind::Ident, "N"));
        assert_eq!(got[7], (TokenKind::TemplateTail, ""));
    }

    #[test]
    fn test_braces_inside_template_substitution() {
        let tokens = Lexer::new("`a${ {x: 1} }b`", SourceId(0)).tokenize().tokens;
        let got: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            got,
            vec![
                TokenKind::TemplateHead,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::NumberLiteral,
                TokenKind::RBrace,
                TokenKind::TemplateTail,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_private_name_and_unexpected_char() {
        let lexed = Lexer::new("#private; ~", SourceId(0)).tokenize();
        assert_eq!(lexed.tokens[0].kind, TokenKind::PrivateName);
        assert_eq!(lexed.tokens[0].text, "#private");
        assert!(matches!(
            lexed.errors[0],
            LexError::UnexpectedChar { ch: '~', .. }
        ));
    }
}
