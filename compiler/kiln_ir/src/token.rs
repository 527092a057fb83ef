//! Token types for the Kiln lexer.

use super::Span;
use std::fmt;

/// A token with its span in the source.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

/// Token kinds for Kiln source.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    /// Integer literal magnitude (negation is folded by the checker).
    Int(u64),
    /// String literal with escapes already cooked.
    Str(String),
    /// Identifier.
    Ident(String),

    // Keywords
    Namespace,
    Using,
    Class,
    Interface,
    Public,
    Private,
    Internal,
    Static,
    Sealed,
    Return,
    If,
    Else,
    While,
    Var,
    True,
    False,
    This,
    IntKw,
    BoolKw,
    StringKw,
    VoidKw,

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,

    // Operators
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,
    PlusEq,
    MinusEq,
    FatArrow,

    /// Lexical error placeholder; the lexer reports the matching diagnostic.
    Error,
    /// End of input. Always the last token of a `TokenList`.
    Eof,
}

impl TokenKind {
    /// Keyword lookup for an identifier-shaped word.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "namespace" => TokenKind::Namespace,
            "using" => TokenKind::Using,
            "class" => TokenKind::Class,
            "interface" => TokenKind::Interface,
            "public" => TokenKind::Public,
            "private" => TokenKind::Private,
            "internal" => TokenKind::Internal,
            "static" => TokenKind::Static,
            "sealed" => TokenKind::Sealed,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "var" => TokenKind::Var,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "this" => TokenKind::This,
            "int" => TokenKind::IntKw,
            "bool" => TokenKind::BoolKw,
            "string" => TokenKind::StringKw,
            "void" => TokenKind::VoidKw,
            _ => return None,
        };
        Some(kind)
    }

    /// Dense discriminant index, used by the parser's bitset token sets.
    pub const fn tag(&self) -> u8 {
        match self {
            TokenKind::Int(_) => 0,
            TokenKind::Str(_) => 1,
            TokenKind::Ident(_) => 2,
            TokenKind::Namespace => 3,
            TokenKind::Using => 4,
            TokenKind::Class => 5,
            TokenKind::Interface => 6,
            TokenKind::Public => 7,
            TokenKind::Private => 8,
            TokenKind::Internal => 9,
            TokenKind::Static => 10,
            TokenKind::Sealed => 11,
            TokenKind::Return => 12,
            TokenKind::If => 13,
            TokenKind::Else => 14,
            TokenKind::While => 15,
            TokenKind::Var => 16,
            TokenKind::True => 17,
            TokenKind::False => 18,
            TokenKind::This => 19,
            TokenKind::IntKw => 20,
            TokenKind::BoolKw => 21,
            TokenKind::StringKw => 22,
            TokenKind::VoidKw => 23,
            TokenKind::LBrace => 24,
            TokenKind::RBrace => 25,
            TokenKind::LParen => 26,
            TokenKind::RParen => 27,
            TokenKind::Semicolon => 28,
            TokenKind::Comma => 29,
            TokenKind::Dot => 30,
            TokenKind::Colon => 31,
            TokenKind::Question => 32,
            TokenKind::Eq => 33,
            TokenKind::EqEq => 34,
            TokenKind::NotEq => 35,
            TokenKind::Lt => 36,
            TokenKind::LtEq => 37,
            TokenKind::Gt => 38,
            TokenKind::GtEq => 39,
            TokenKind::Plus => 40,
            TokenKind::Minus => 41,
            TokenKind::Star => 42,
            TokenKind::Slash => 43,
            TokenKind::Percent => 44,
            TokenKind::Bang => 45,
            TokenKind::AmpAmp => 46,
            TokenKind::PipePipe => 47,
            TokenKind::PlusEq => 48,
            TokenKind::MinusEq => 49,
            TokenKind::FatArrow => 50,
            TokenKind::Error => 51,
            TokenKind::Eof => 52,
        }
    }

    /// True for the modifier keywords that may prefix a type or member.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Internal
                | TokenKind::Static
                | TokenKind::Sealed
        )
    }

    /// True for the keywords naming a predefined type.
    pub fn is_predefined_type(&self) -> bool {
        matches!(
            self,
            TokenKind::IntKw | TokenKind::BoolKw | TokenKind::StringKw | TokenKind::VoidKw
        )
    }

    /// Human-readable description used in "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(v) => format!("integer `{v}`"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Error => "invalid token".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other.text()),
        }
    }

    /// Source text of fixed tokens. Literal and identifier kinds return "".
    pub fn text(&self) -> &'static str {
        match self {
            TokenKind::Namespace => "namespace",
            TokenKind::Using => "using",
            TokenKind::Class => "class",
            TokenKind::Interface => "interface",
            TokenKind::Public => "public",
            TokenKind::Private => "private",
            TokenKind::Internal => "internal",
            TokenKind::Static => "static",
            TokenKind::Sealed => "sealed",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Var => "var",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::This => "this",
            TokenKind::IntKw => "int",
            TokenKind::BoolKw => "bool",
            TokenKind::StringKw => "string",
            TokenKind::VoidKw => "void",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::FatArrow => "=>",
            TokenKind::Int(_)
            | TokenKind::Str(_)
            | TokenKind::Ident(_)
            | TokenKind::Error
            | TokenKind::Eof => "",
        }
    }
}

/// Lexer output: a token vector that always ends with `TokenKind::Eof`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    /// Build a token list, appending the terminating `Eof` token at `end`.
    pub fn new(mut tokens: Vec<Token>, end: u32) -> Self {
        tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
        TokenList { tokens }
    }

    /// Number of tokens, including the trailing `Eof`.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// A token list is never empty; it always holds `Eof`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All tokens, including the trailing `Eof`.
    #[inline]
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Token at `index`, clamped to the trailing `Eof`.
    #[inline]
    pub fn get(&self, index: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)]
    }
}
