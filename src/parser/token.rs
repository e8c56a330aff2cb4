use crate::source::Span;

/// The closed set of token types produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Ident,
    IntLit,
    FloatLit,
    StringLit,

    // Keywords
    Fn,
    Let,
    Return,
    If,
    Else,
    While,
    Use,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    EqEq,
    Bang,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Arrow,

    // Special
    Newline,
    Eof,
    Error,
}

impl TokenKind {
    /// Debug name of the token kind, used in parser error messages.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::IntLit => "integer literal",
            TokenKind::FloatLit => "float literal",
            TokenKind::StringLit => "string literal",
            TokenKind::Fn => "'fn'",
            TokenKind::Let => "'let'",
            TokenKind::Return => "'return'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::Use => "'use'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::Bang => "'!'",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Arrow => "'->'",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "error",
        }
    }
}

/// A token: kind, source span, and a view into the source text.
///
/// For error tokens, `text` carries the lexer's message instead of source
/// text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub span: Span,
    pub text: &'src str,
}

impl<'src> Token<'src> {
    /// A placeholder token used to seed the parser before the first
    /// `advance`.
    pub fn dummy() -> Token<'src> {
        Token {
            kind: TokenKind::Eof,
            span: Span::invalid(),
            text: "",
        }
    }

    pub fn is(self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_error(self) -> bool {
        self.kind == TokenKind::Error
    }

    pub fn is_eof(self) -> bool {
        self.kind == TokenKind::Eof
    }
}
