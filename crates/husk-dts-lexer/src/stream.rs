//! The token source interface the parser consumes, and its lexer-backed
//! implementation.

use crate::lexer::{Lexed, Lexer};
use crate::span::{SourceId, Span};
use crate::token::{Token, TokenKind};

/// A stream of significant tokens with cheap backtracking.
///
/// Implementations must make `save`/`restore` O(1) and must keep yielding
/// `Eof` once the end is reached.
pub trait TokenSource {
    type Snapshot: Copy;

    /// The next significant token, without consuming it.
    fn peek(&self) -> &Token;

    /// Consume and return the next significant token.
    fn consume(&mut self) -> Token;

    fn save(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: Self::Snapshot);

    /// Kind of the token `n` positions ahead (`nth(0)` is `peek`).
    fn nth(&mut self, n: usize) -> TokenKind {
        let snapshot = self.save();
        for _ in 0..n {
            self.consume();
        }
        let kind = self.peek().kind;
        self.restore(snapshot);
        kind
    }

    /// Number of significant tokens, when known up front.
    fn token_count(&self) -> Option<usize> {
        None
    }

    /// Triple-slash directives seen by the source, in order.
    fn directives(&self) -> &[Token] {
        &[]
    }
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    type Snapshot = S::Snapshot;

    fn peek(&self) -> &Token {
        (**self).peek()
    }

    fn consume(&mut self) -> Token {
        (**self).consume()
    }

    fn save(&self) -> Self::Snapshot {
        (**self).save()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        (**self).restore(snapshot)
    }

    fn nth(&mut self, n: usize) -> TokenKind {
        (**self).nth(n)
    }

    fn token_count(&self) -> Option<usize> {
        (**self).token_count()
    }

    fn directives(&self) -> &[Token] {
        (**self).directives()
    }
}

/// Position into a [`TokenStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSnapshot(usize);

/// A [`TokenSource`] over pre-lexed tokens with comments filtered out.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    directives: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    /// Build a stream from raw lexer output. Comment tokens are dropped,
    /// triple-slash directives are set aside, and a line break inside or
    /// around dropped trivia carries over to the next significant token.
    pub fn new(raw: Vec<Token>) -> Self {
        let mut tokens = Vec::with_capacity(raw.len());
        let mut directives = Vec::new();
        let mut pending_newline = false;

        for mut token in raw {
            if token.kind.is_trivia() {
                pending_newline |= token.newline_before;
                if token.kind == TokenKind::TripleSlashDirective {
                    // Directives always end their line.
                    pending_newline = true;
                    directives.push(token);
                }
                continue;
            }
            token.newline_before |= pending_newline;
            pending_newline = false;
            tokens.push(token);
        }

        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let span = tokens
                .last()
                .map(|t| Span::point(t.span.source, t.span.end))
                .unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", span, true));
        }

        Self {
            tokens,
            directives,
            pos: 0,
        }
    }

    /// Lex `src` and wrap the result; lexing errors are returned alongside.
    pub fn lex(src: &str, source: SourceId) -> (Self, Vec<crate::LexError>) {
        let Lexed { tokens, errors } = Lexer::new(src, source).tokenize();
        (Self::new(tokens), errors)
    }

    fn last_index(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }
}

impl TokenSource for TokenStream {
    type Snapshot = StreamSnapshot;

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.last_index())]
    }

    fn consume(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.last_index() {
            self.pos += 1;
        }
        token
    }

    fn save(&self) -> StreamSnapshot {
        StreamSnapshot(self.pos)
    }

    fn restore(&mut self, snapshot: StreamSnapshot) {
        self.pos = snapshot.0.min(self.last_index());
    }

    fn nth(&mut self, n: usize) -> TokenKind {
        let idx = (self.pos + n).min(self.last_index());
        self.tokens[idx].kind
    }

    fn token_count(&self) -> Option<usize> {
        Some(self.tokens.len())
    }

    fn directives(&self) -> &[Token] {
        &self.directives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(src: &str) -> TokenStream {
        TokenStream::lex(src, SourceId(0)).0
    }

    #[test]
    fn test_comments_are_skipped() {
        let mut s = stream("/* a */ x // b\n y");
        assert_eq!(s.consume().text, "x");
        let y = s.consume();
        assert_eq!(y.text, "y");
        assert!(y.newline_before);
        assert_eq!(s.peek().kind, TokenKind::Eof);
    }

    #[test]
    fn test_save_and_restore() {
        let mut s = stream("a b c");
        s.consume();
        let snapshot = s.save();
        s.consume();
        s.consume();
        assert_eq!(s.peek().kind, TokenKind::Eof);
        s.restore(snapshot);
        assert_eq!(s.peek().text, "b");
        assert_eq!(s.nth(1), TokenKind::Ident);
        assert_eq!(s.nth(5), TokenKind::Eof);
    }

    #[test]
    fn test_consume_at_end_stays_at_eof() {
        let mut s = stream("");
        assert_eq!(s.consume().kind, TokenKind::Eof);
        assert_eq!(s.consume().kind, TokenKind::Eof);
    }

    #[test]
    fn test_directives_are_set_aside() {
        let s = stream("/// <reference path=\"./a.d.ts\" />\ndeclare var x: A;");
        assert_eq!(s.directives().len(), 1);
        assert_eq!(s.peek().kind, TokenKind::Declare);
    }

    #[test]
    fn test_default_nth_matches_override() {
        struct Plain(TokenStream);
        impl TokenSource for Plain {
            type Snapshot = StreamSnapshot;
            fn peek(&self) -> &Token {
                self.0.peek()
            }
            fn consume(&mut self) -> Token {
                self.0.consume()
            }
            fn save(&self) -> StreamSnapshot {
                self.0.save()
            }
            fn restore(&mut self, snapshot: StreamSnapshot) {
                self.0.restore(snapshot)
            }
        }

        let mut plain = Plain(stream("a : b"));
        assert_eq!(plain.nth(1), TokenKind::Colon);
        assert_eq!(plain.peek().text, "a");
    }
}
