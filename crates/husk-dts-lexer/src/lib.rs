//! Token source for the Husk TypeScript declaration (`.d.ts`) front end.
//!
//! The parser in `husk-dts-parser` only depends on the [`TokenSource`]
//! trait; [`TokenStream`] is the implementation backed by this crate's
//! [`Lexer`].

mod lexer;
mod span;
mod stream;
mod token;

pub use lexer::{LexError, Lexed, Lexer};
pub use span::{Pos, SourceId, Span};
pub use stream::{StreamSnapshot, TokenSource, TokenStream};
pub use token::{Token, TokenKind};
