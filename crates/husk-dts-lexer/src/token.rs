//! Token kinds for TypeScript declaration files.

use serde::Serialize;

use crate::span::Span;

/// Token kinds for TypeScript declaration files.
///
/// Literal payloads live in [`Token::text`], so the kind itself is `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Identifiers and literals
    Ident,
    /// `#name` inside class bodies.
    PrivateName,
    StringLiteral,
    NumberLiteral,
    BigIntLiteral,
    /// `` `text` `` with no substitutions.
    NoSubstitutionTemplate,
    /// `` `text${ ``
    TemplateHead,
    /// `}text${`
    TemplateMiddle,
    /// `` }text` ``
    TemplateTail,

    // Trivia
    LineComment,
    BlockComment,
    /// `/// <reference ... />`
    TripleSlashDirective,

    // Keywords
    Abstract,
    Accessor,
    As,
    Asserts,
    Async,
    Class,
    Const,
    Declare,
    Default,
    Enum,
    Export,
    Extends,
    From,
    Function,
    Get,
    Global,
    Implements,
    Import,
    In,
    Infer,
    Interface,
    Is,
    Keyof,
    Let,
    Module,
    Namespace,
    New,
    Out,
    Override,
    Private,
    Protected,
    Public,
    Readonly,
    Set,
    Static,
    This,
    Type,
    Typeof,
    Unique,
    Var,

    // Primitive type keywords
    String_,
    Number_,
    Boolean_,
    BigInt_,
    Symbol_,
    Object_,
    Void_,
    Null_,
    Undefined_,
    Any_,
    Unknown_,
    Never_,
    True_,
    False_,

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    LAngle,    // <
    RAngle,    // >
    Comma,     // ,
    Semicolon, // ;
    Colon,     // :
    Dot,       // .
    DotDotDot, // ...
    Question,  // ?
    Pipe,      // |
    Amp,       // &
    Arrow,     // =>
    Eq,        // =
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Bang,      // !
    At,        // @

    Eof,
}

impl TokenKind {
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        let kind = match s {
            "abstract" => TokenKind::Abstract,
            "accessor" => TokenKind::Accessor,
            "as" => TokenKind::As,
            "asserts" => TokenKind::Asserts,
            "async" => TokenKind::Async,
            "class" => TokenKind::Class,
            "const" => TokenKind::Const,
            "declare" => TokenKind::Declare,
            "default" => TokenKind::Default,
            "enum" => TokenKind::Enum,
            "export" => TokenKind::Export,
            "extends" => TokenKind::Extends,
            "from" => TokenKind::From,
            "function" => TokenKind::Function,
            "get" => TokenKind::Get,
            "global" => TokenKind::Global,
            "implements" => TokenKind::Implements,
            "import" => TokenKind::Import,
            "in" => TokenKind::In,
            "infer" => TokenKind::Infer,
            "interface" => TokenKind::Interface,
            "is" => TokenKind::Is,
            "keyof" => TokenKind::Keyof,
            "let" => TokenKind::Let,
            "module" => TokenKind::Module,
            "namespace" => TokenKind::Namespace,
            "new" => TokenKind::New,
            "out" => TokenKind::Out,
            "override" => TokenKind::Override,
            "private" => TokenKind::Private,
            "protected" => TokenKind::Protected,
            "public" => TokenKind::Public,
            "readonly" => TokenKind::Readonly,
            "set" => TokenKind::Set,
            "static" => TokenKind::Static,
            "this" => TokenKind::This,
            "type" => TokenKind::Type,
            "typeof" => TokenKind::Typeof,
            "unique" => TokenKind::Unique,
            "var" => TokenKind::Var,
            // Primitives
            "string" => TokenKind::String_,
            "number" => TokenKind::Number_,
            "boolean" => TokenKind::Boolean_,
            "bigint" => TokenKind::BigInt_,
            "symbol" => TokenKind::Symbol_,
            "object" => TokenKind::Object_,
            "void" => TokenKind::Void_,
            "null" => TokenKind::Null_,
            "undefined" => TokenKind::Undefined_,
            "any" => TokenKind::Any_,
            "unknown" => TokenKind::Unknown_,
            "never" => TokenKind::Never_,
            "true" => TokenKind::True_,
            "false" => TokenKind::False_,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Abstract
                | Accessor
                | As
                | Asserts
                | Async
                | Class
                | Const
                | Declare
                | Default
                | Enum
                | Export
                | Extends
                | From
                | Function
                | Get
                | Global
                | Implements
                | Import
                | In
                | Infer
                | Interface
                | Is
                | Keyof
                | Let
                | Module
                | Namespace
                | New
                | Out
                | Override
                | Private
                | Protected
                | Public
                | Readonly
                | Set
                | Static
                | This
                | Type
                | Typeof
                | Unique
                | Var
                | String_
                | Number_
                | Boolean_
                | BigInt_
                | Symbol_
                | Object_
                | Void_
                | Null_
                | Undefined_
                | Any_
                | Unknown_
                | Never_
                | True_
                | False_
        )
    }

    /// Keywords that can never name a binding (variable, parameter, type).
    pub fn is_reserved_word(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Class
                | Const
                | Default
                | Enum
                | Export
                | Extends
                | Function
                | Import
                | In
                | New
                | Null_
                | This
                | True_
                | False_
                | Typeof
                | Var
                | Void_
        )
    }

    /// Whether this token counts as an identifier in property, member and
    /// specifier name position. Every keyword qualifies there.
    pub fn is_identifier_name(self) -> bool {
        self == TokenKind::Ident || self.is_keyword()
    }

    /// Whether this token counts as an identifier in binding position:
    /// contextual keywords (`get`, `set`, `as`, `from`, `is`, `asserts`,
    /// `type`, `module`, ...) qualify, reserved words do not.
    pub fn is_binding_identifier(self) -> bool {
        self.is_identifier_name() && !self.is_reserved_word()
    }

    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::TripleSlashDirective
        )
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Ident => "identifier",
            PrivateName => "private name",
            StringLiteral => "string literal",
            NumberLiteral => "number literal",
            BigIntLiteral => "bigint literal",
            NoSubstitutionTemplate | TemplateHead => "template literal",
            TemplateMiddle | TemplateTail => "template continuation",
            LineComment | BlockComment => "comment",
            TripleSlashDirective => "triple-slash directive",
            Abstract => "`abstract`",
            Accessor => "`accessor`",
            As => "`as`",
            Asserts => "`asserts`",
            Async => "`async`",
            Class => "`class`",
            Const => "`const`",
            Declare => "`declare`",
            Default => "`default`",
            Enum => "`enum`",
            Export => "`export`",
            Extends => "`extends`",
            From => "`from`",
            Function => "`function`",
            Get => "`get`",
            Global => "`global`",
            Implements => "`implements`",
            Import => "`import`",
            In => "`in`",
            Infer => "`infer`",
            Interface => "`interface`",
            Is => "`is`",
            Keyof => "`keyof`",
            Let => "`let`",
            Module => "`module`",
            Namespace => "`namespace`",
            New => "`new`",
            Out => "`out`",
            Override => "`override`",
            Private => "`private`",
            Protected => "`protected`",
            Public => "`public`",
            Readonly => "`readonly`",
            Set => "`set`",
            Static => "`static`",
            This => "`this`",
            Type => "`type`",
            Typeof => "`typeof`",
            Unique => "`unique`",
            Var => "`var`",
            String_ => "`string`",
            Number_ => "`number`",
            Boolean_ => "`boolean`",
            BigInt_ => "`bigint`",
            Symbol_ => "`symbol`",
            Object_ => "`object`",
            Void_ => "`void`",
            Null_ => "`null`",
            Undefined_ => "`undefined`",
            Any_ => "`any`",
            Unknown_ => "`unknown`",
            Never_ => "`never`",
            True_ => "`true`",
            False_ => "`false`",
            LParen => "`(`",
            RParen => "`)`",
            LBrace => "`{`",
            RBrace => "`}`",
            LBracket => "`[`",
            RBracket => "`]`",
            LAngle => "`<`",
            RAngle => "`>`",
            Comma => "`,`",
            Semicolon => "`;`",
            Colon => "`:`",
            Dot => "`.`",
            DotDotDot => "`...`",
            Question => "`?`",
            Pipe => "`|`",
            Amp => "`&`",
            Arrow => "`=>`",
            Eq => "`=`",
            Plus => "`+`",
            Minus => "`-`",
            Star => "`*`",
            Slash => "`/`",
            Bang => "`!`",
            At => "`@`",
            Eof => "end of input",
        }
    }
}

/// A token with its kind, text and position.
///
/// `text` holds the cooked value for string and template pieces (quotes,
/// backticks and `${`/`}` delimiters removed, escapes resolved) and the raw
/// lexeme for everything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// A line terminator appeared between the previous token and this one.
    pub newline_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span, newline_before: bool) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            newline_before,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contextual_keywords_are_binding_identifiers() {
        for word in ["get", "set", "as", "from", "is", "asserts", "type", "module", "global"] {
            let kind = TokenKind::from_keyword(word).unwrap();
            assert!(kind.is_binding_identifier(), "{word} should bind");
        }
    }

    #[test]
    fn test_reserved_words_only_name_properties() {
        for word in ["class", "function", "typeof", "new", "void", "null"] {
            let kind = TokenKind::from_keyword(word).unwrap();
            assert!(kind.is_identifier_name(), "{word} is a property name");
            assert!(!kind.is_binding_identifier(), "{word} must not bind");
        }
    }

    #[test]
    fn test_punctuation_is_not_a_name() {
        assert!(!TokenKind::LBrace.is_identifier_name());
        assert!(!TokenKind::StringLiteral.is_identifier_name());
        assert!(TokenKind::Ident.is_binding_identifier());
    }
}
