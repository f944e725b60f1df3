use std::fmt;

use thiserror::Error;

/// A 1-based line and a column counted from 0 at the start of each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Front-end stage that raised a positioned error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lex,
    Parse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Name,
    Type,
    Call,
    StackOverflow,
    Output,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{message} ({position})")]
    Syntax {
        phase: Phase,
        message: String,
        position: Position,
    },

    #[error("Undefined variable {0}")]
    UndefinedVariable(String),

    #[error("{0}")]
    TypeMismatch(String),

    #[error("{0} is not a function")]
    NotCallable(String),

    #[error("Maximum call depth of {0} exceeded")]
    StackOverflow(usize),

    #[error("Failed to write output: {0}")]
    Output(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { phase: Phase::Lex, .. } => ErrorKind::Lex,
            Error::Syntax { phase: Phase::Parse, .. } => ErrorKind::Parse,
            Error::UndefinedVariable(_) => ErrorKind::Name,
            Error::TypeMismatch(_) => ErrorKind::Type,
            Error::NotCallable(_) => ErrorKind::Call,
            Error::StackOverflow(_) => ErrorKind::StackOverflow,
            Error::Output(_) => ErrorKind::Output,
        }
    }

    /// Source position, for the errors raised before evaluation.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_carry_their_position() {
        let err = Error::Syntax {
            phase: Phase::Parse,
            message: "Expecting punctuation: \")\"".to_owned(),
            position: Position { line: 3, column: 7 },
        };

        assert_eq!(err.to_string(), "Expecting punctuation: \")\" (3:7)");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.position(), Some(Position { line: 3, column: 7 }));
    }

    #[test]
    fn runtime_errors_have_no_position() {
        let err = Error::UndefinedVariable("x".to_owned());

        assert_eq!(err.to_string(), "Undefined variable x");
        assert_eq!(err.kind(), ErrorKind::Name);
        assert_eq!(err.position(), None);
    }
}
