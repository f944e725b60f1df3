use crate::error::{Error, Phase, Position};

/// Character stream over the source text with line/column tracking.
#[derive(Debug)]
pub struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// Builds an error tagged with the current position. Every lexer and
    /// parser diagnostic goes through here.
    pub fn fail(&self, phase: Phase, message: impl Into<String>) -> Error {
        Error::Syntax {
            phase,
            message: message.into(),
            position: self.position(),
        }
    }
}
