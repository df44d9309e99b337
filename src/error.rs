use crate::syntax::token::SourceLocation;

/// Every way an evaluation or a host-type registration can fail.
///
/// Evaluation aborts on the first error; there is no recovery or partial
/// execution. All variants except [`Error::Registration`] carry the source
/// location the failure was observed at.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Tokenization failed: unterminated string, malformed number,
    /// unrecognized character, `:` not followed by `=`.
    #[error("{location}: {message}")]
    Lex { message: String, location: SourceLocation },

    /// The token stream did not match the grammar.
    #[error("{location}: {message}")]
    Syntax { message: String, location: SourceLocation },

    /// A command, property, or named-argument name matched nothing the host
    /// declared. Raised at evaluation time, as encountered.
    #[error("{location}: {message}")]
    Resolution { message: String, location: SourceLocation },

    /// A raw value did not fit the declared type shape.
    #[error("{location}: {message}")]
    Coercion { message: String, location: SourceLocation },

    /// Argument binding failed, or the host operation itself reported an error.
    #[error("{location}: {message}")]
    Invocation { message: String, location: SourceLocation },

    /// The host type's declarations were rejected; no registry was built.
    #[error("registration: {message}")]
    Registration { message: String },
}

impl Error {
    pub fn lex(location: &SourceLocation, message: impl Into<String>) -> Self {
        Self::Lex { message: message.into(), location: location.clone() }
    }

    pub fn syntax(location: &SourceLocation, message: impl Into<String>) -> Self {
        Self::Syntax { message: message.into(), location: location.clone() }
    }

    pub fn resolution(location: &SourceLocation, message: impl Into<String>) -> Self {
        Self::Resolution { message: message.into(), location: location.clone() }
    }

    pub fn coercion(location: &SourceLocation, message: impl Into<String>) -> Self {
        Self::Coercion { message: message.into(), location: location.clone() }
    }

    pub fn invocation(location: &SourceLocation, message: impl Into<String>) -> Self {
        Self::Invocation { message: message.into(), location: location.clone() }
    }

    pub fn registration(message: impl Into<String>) -> Self {
        Self::Registration { message: message.into() }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. }
            | Self::Syntax { message, .. }
            | Self::Resolution { message, .. }
            | Self::Coercion { message, .. }
            | Self::Invocation { message, .. }
            | Self::Registration { message } => message,
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Lex { location, .. }
            | Self::Syntax { location, .. }
            | Self::Resolution { location, .. }
            | Self::Coercion { location, .. }
            | Self::Invocation { location, .. } => Some(location),
            Self::Registration { .. } => None,
        }
    }
}
