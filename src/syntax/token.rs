use std::fmt;
use std::sync::Arc;

/// Position of a token or error inside a named source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub source: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(source: &str, line: usize, column: usize) -> Self {
        Self { source: Arc::from(source), line, column }
    }

    /// Line 1, column 1 of the named source.
    pub fn start(source: &str) -> Self {
        Self::new(source, 1, 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // Punctuation
    OpenCall,   // (
    CloseCall,  // )
    OpenList,   // {
    CloseList,  // }
    Equals,     // =
    PropSet,    // :=
    Comma,      // ,
    Null,       // !

    Eof,
}

impl TokenKind {
    /// Tokens that form a value on their own, without any following token.
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Null)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "'{v}'"),
            Self::Float(v) => write!(f, "'{v}'"),
            Self::Str(s) => write!(f, "'\"{s}\"'"),
            Self::Ident(s) => write!(f, "'{s}'"),
            Self::OpenCall => write!(f, "'('"),
            Self::CloseCall => write!(f, "')'"),
            Self::OpenList => write!(f, "'{{'"),
            Self::CloseList => write!(f, "'}}'"),
            Self::Equals => write!(f, "'='"),
            Self::PropSet => write!(f, "':='"),
            Self::Comma => write!(f, "','"),
            Self::Null => write!(f, "'!'"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// Whether `text` matches the lexer's identifier grammar. Registered command,
/// property, and parameter names must pass this so scripts can spell them.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}
