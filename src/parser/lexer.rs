//! Logos-based lexer for MOF
//!
//! Fast tokenization using the logos crate. MOF keywords are
//! case-insensitive, so the logos layer only recognizes identifiers and
//! the keyword classification happens on the token text.

use logos::Logos;
use text_size::TextSize;

/// Token kinds after keyword classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Trivia
    Whitespace,
    LineComment,
    BlockComment,

    // Literals
    Ident,
    /// `$Name` — an instance alias.
    Alias,
    Integer,
    Real,
    String,
    Char,

    // `#pragma`
    Pragma,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    Comma,
    Eq,

    // Keywords (classified case-insensitively from Ident)
    ClassKw,
    InstanceKw,
    OfKw,
    AsKw,
    RefKw,
    QualifierKw,
    ScopeKw,
    FlavorKw,
    NullKw,
    TrueKw,
    FalseKw,

    Error,
}

impl TokenKind {
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment
        )
    }
}

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(LogosToken::Ident) => keyword_kind(text).unwrap_or(TokenKind::Ident),
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Classify a MOF keyword, case-insensitively.
fn keyword_kind(text: &str) -> Option<TokenKind> {
    let kind = match text.to_ascii_lowercase().as_str() {
        "class" => TokenKind::ClassKw,
        "instance" => TokenKind::InstanceKw,
        "of" => TokenKind::OfKw,
        "as" => TokenKind::AsKw,
        "ref" => TokenKind::RefKw,
        "qualifier" => TokenKind::QualifierKw,
        "scope" => TokenKind::ScopeKw,
        "flavor" => TokenKind::FlavorKw,
        "null" => TokenKind::NullKw,
        "true" => TokenKind::TrueKw,
        "false" => TokenKind::FalseKw,
        _ => return None,
    };
    Some(kind)
}

/// Logos token enum - maps to TokenKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    Alias,

    // Hex and binary forms before plain decimal (longest match wins)
    #[regex(r"0[xX][0-9a-fA-F]+")]
    HexInteger,

    #[regex(r"[01]+[bB]")]
    BinaryInteger,

    #[regex(r"[+-]?[0-9]+")]
    Integer,

    #[regex(r"[+-]?[0-9]*\.[0-9]+([eE][+-]?[0-9]+)?")]
    Real,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r"'([^'\\]|\\.)'")]
    Char,

    // =========================================================================
    // DIRECTIVES
    // =========================================================================
    #[regex(r"#[ \t]*pragma")]
    Pragma,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            // Trivia
            Whitespace => TokenKind::Whitespace,
            LineComment => TokenKind::LineComment,
            BlockComment => TokenKind::BlockComment,

            // Literals
            Ident => TokenKind::Ident,
            Alias => TokenKind::Alias,
            HexInteger | BinaryInteger | Integer => TokenKind::Integer,
            Real => TokenKind::Real,
            String => TokenKind::String,
            Char => TokenKind::Char,

            Pragma => TokenKind::Pragma,

            // Punctuation
            LBrace => TokenKind::LBrace,
            RBrace => TokenKind::RBrace,
            LParen => TokenKind::LParen,
            RParen => TokenKind::RParen,
            LBracket => TokenKind::LBracket,
            RBracket => TokenKind::RBracket,
            Semicolon => TokenKind::Semicolon,
            Colon => TokenKind::Colon,
            Comma => TokenKind::Comma,
            Eq => TokenKind::Eq,
        }
    }
}
