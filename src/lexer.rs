use tracing::trace;

use crate::cursor::Cursor;
use crate::error::{Error, Phase};
use crate::token::{Keyword, Punctuation, Token};

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == 'λ'
}

// Digits and `? ! < > =` are accepted after the first character, so `x=1`
// is one identifier.
fn is_identifier(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit() || matches!(c, '?' | '!' | '<' | '>' | '=')
}

fn is_op_char(c: char) -> bool {
    "+-*/%=&|<>!".contains(c)
}

/// Token stream with one token of lookahead.
#[derive(Debug)]
pub struct Lexer {
    input: Cursor,
    current: Option<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            input: Cursor::new(source),
            current: None,
        }
    }

    pub fn peek(&mut self) -> Result<Option<&Token>, Error> {
        if self.current.is_none() {
            self.current = self.read_next()?;
        }
        Ok(self.current.as_ref())
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        match self.current.take() {
            Some(token) => Ok(Some(token)),
            None => self.read_next(),
        }
    }

    pub fn at_end(&mut self) -> Result<bool, Error> {
        Ok(self.peek()?.is_none())
    }

    /// Parse error at the current stream position.
    pub fn croak(&self, message: impl Into<String>) -> Error {
        self.input.fail(Phase::Parse, message)
    }

    fn read_next(&mut self) -> Result<Option<Token>, Error> {
        loop {
            self.read_while(is_whitespace);

            let c = match self.input.peek() {
                Some(c) => c,
                None => return Ok(None),
            };

            if c == '#' {
                self.skip_comment();
                continue;
            }

            let token = if c == '"' {
                self.read_string()?
            } else if c.is_ascii_digit() {
                self.read_number()?
            } else if is_identifier_start(c) {
                self.read_ident()
            } else if let Some(punctuation) = Punctuation::from_char(c) {
                self.input.next();
                Token::Punctuation(punctuation)
            } else if is_op_char(c) {
                Token::Operator(self.read_while(is_op_char))
            } else {
                return Err(self.input.fail(Phase::Lex, format!("Can't handle character: {}", c)));
            };

            trace!(%token, position = %self.input.position(), "lexed token");
            return Ok(Some(token));
        }
    }

    fn read_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(c) = self.input.peek() {
            if !predicate(c) {
                break;
            }
            result.push(c);
            self.input.next();
        }
        result
    }

    fn skip_comment(&mut self) {
        self.read_while(|c| c != '\n');
        self.input.next();
    }

    fn read_string(&mut self) -> Result<Token, Error> {
        self.input.next();

        let mut value = String::new();
        let mut escaped = false;
        loop {
            let c = match self.input.next() {
                Some(c) => c,
                None => return Err(self.input.fail(Phase::Lex, "Unterminated string literal")),
            };

            if escaped {
                value.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                return Ok(Token::String(value));
            } else {
                value.push(c);
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, Error> {
        let mut has_dot = false;
        let number = self.read_while(|c| {
            if c == '.' {
                if has_dot {
                    return false;
                }
                has_dot = true;
                return true;
            }
            c.is_ascii_digit()
        });

        number
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| self.input.fail(Phase::Lex, format!("Invalid number literal: {}", number)))
    }

    fn read_ident(&mut self) -> Token {
        let identifier = self.read_while(is_identifier);
        match Keyword::from_identifier(&identifier) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Identifier(identifier),
        }
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::{ErrorKind, Position};

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_owned())
    }

    fn op(text: &str) -> Token {
        Token::Operator(text.to_owned())
    }

    #[test]
    fn assignment_with_arithmetic() {
        assert_eq!(
            lex("num = 3.3 + 12"),
            vec![ident("num"), op("="), Token::Number(3.3), op("+"), Token::Number(12.0)]
        );
    }

    #[test]
    fn only_comments() {
        let mut lexer = Lexer::new("# this is a comment\n    # another comment\n    ");
        assert_eq!(lexer.next_token().unwrap(), None);
        assert!(lexer.at_end().unwrap());
    }

    #[test]
    fn comment_after_code() {
        assert_eq!(lex("a # trailing\nb"), vec![ident("a"), ident("b")]);
    }

    #[test]
    fn print_function_call() {
        assert_eq!(
            lex(r#"print("hello word")"#),
            vec![
                ident("print"),
                Token::Punctuation(Punctuation::LeftParen),
                Token::String("hello word".to_owned()),
                Token::Punctuation(Punctuation::RightParen),
            ]
        );
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("foo bar");
        assert_eq!(lexer.peek().unwrap(), Some(&ident("foo")));
        assert_eq!(lexer.peek().unwrap(), Some(&ident("foo")));
        assert_eq!(lexer.next_token().unwrap(), Some(ident("foo")));
        assert_eq!(lexer.next_token().unwrap(), Some(ident("bar")));
        assert!(lexer.at_end().unwrap());
    }

    #[test]
    fn string_escapes_take_next_char_literally() {
        assert_eq!(
            lex(r#""say \"hi\" \\ \n""#),
            vec![Token::String(r#"say "hi" \ n"#.to_owned())]
        );
    }

    #[test]
    fn unterminated_string() {
        let err = Lexer::new("\"abc").next_token().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lex);
        assert_eq!(err.position(), Some(Position { line: 1, column: 4 }));
    }

    #[test]
    fn number_takes_at_most_one_dot() {
        let mut lexer = Lexer::new("1.5.2");
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Number(1.5)));
        assert_eq!(lexer.next_token().unwrap_err().kind(), ErrorKind::Lex);

        assert_eq!(lex("7."), vec![Token::Number(7.0)]);
        assert_eq!(lex("0.25"), vec![Token::Number(0.25)]);
    }

    #[test]
    fn keywords() {
        assert_eq!(
            lex("if then else lambda λ true false"),
            vec![
                Token::Keyword(Keyword::If),
                Token::Keyword(Keyword::Then),
                Token::Keyword(Keyword::Else),
                Token::Keyword(Keyword::Lambda),
                Token::Keyword(Keyword::LambdaGlyph),
                Token::Keyword(Keyword::True),
                Token::Keyword(Keyword::False),
            ]
        );
    }

    #[test]
    fn identifiers_swallow_comparison_characters() {
        assert_eq!(lex("x=1"), vec![ident("x=1")]);
        assert_eq!(lex("empty? a<b"), vec![ident("empty?"), ident("a<b")]);
        assert_eq!(lex("x = 1"), vec![ident("x"), op("="), Token::Number(1.0)]);
    }

    #[test]
    fn operator_runs_are_single_tokens() {
        assert_eq!(lex("a === b"), vec![ident("a"), op("==="), ident("b")]);
        assert_eq!(lex("1 <= 2"), vec![Token::Number(1.0), op("<="), Token::Number(2.0)]);
        assert_eq!(lex("1+-2"), vec![Token::Number(1.0), op("+-"), Token::Number(2.0)]);
    }

    #[test]
    fn unknown_character() {
        let err = Lexer::new("a\n  @").collect::<Result<Vec<_>, _>>().unwrap_err();
        assert_eq!(err.to_string(), "Can't handle character: @ (2:2)");
    }
}
