use std::rc::Rc;

use tracing::debug;

use crate::ast::{precedence, BinaryOperator, Expression};
use crate::error::Error;
use crate::lexer::Lexer;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Keyword, Punctuation, Token};

/// Recursive descent parser; infix operators are resolved by precedence
/// climbing over the table in [`precedence`].
pub struct Parser {
    input: Lexer,
}

impl Parser {
    pub fn new(input: Lexer) -> Self {
        Parser { input }
    }

    pub fn parse_toplevel(&mut self) -> Result<Expression, Error> {
        let mut program = Vec::new();
        while !self.input.at_end()? {
            program.push(self.parse_expression()?);

            if !self.input.at_end()? {
                self.skip_punctuation(Punctuation::Semicolon)?;
            }
        }

        debug!(expressions = program.len(), "parsed program");
        Ok(Expression::Program(program))
    }

    fn parse_expression(&mut self) -> Result<Expression, Error> {
        ensure_sufficient_stack(|| {
            let atom = self.parse_atom()?;
            let expression = self.maybe_binary(atom, 0)?;
            self.maybe_call(expression)
        })
    }

    fn parse_atom(&mut self) -> Result<Expression, Error> {
        let atom = self.read_atom()?;
        self.maybe_call(atom)
    }

    fn read_atom(&mut self) -> Result<Expression, Error> {
        if self.is_punctuation(Punctuation::LeftParen)? {
            self.input.next_token()?;
            let expression = self.parse_expression()?;
            self.skip_punctuation(Punctuation::RightParen)?;
            return Ok(expression);
        }

        if self.is_punctuation(Punctuation::LeftBrace)? {
            return self.parse_block();
        }
        if self.is_keyword(Keyword::If)? {
            return self.parse_if();
        }
        if self.is_keyword(Keyword::True)? || self.is_keyword(Keyword::False)? {
            return self.parse_bool();
        }
        if self.is_keyword(Keyword::Lambda)? || self.is_keyword(Keyword::LambdaGlyph)? {
            self.input.next_token()?;
            return self.parse_lambda();
        }

        match self.input.next_token()? {
            Some(Token::Identifier(name)) => Ok(Expression::Variable(name)),
            Some(Token::Number(value)) => Ok(Expression::number(value)),
            Some(Token::String(value)) => Ok(Expression::string(value)),
            Some(token) => Err(self.input.croak(format!("Unexpected token: {}", token))),
            None => Err(self.input.croak("Unexpected end of input")),
        }
    }

    fn parse_block(&mut self) -> Result<Expression, Error> {
        let mut program = self.delimited(
            Punctuation::LeftBrace,
            Punctuation::RightBrace,
            Punctuation::Semicolon,
            Self::parse_expression,
        )?;

        Ok(match program.len() {
            0 => Expression::boolean(false),
            1 => program.remove(0),
            _ => Expression::Program(program),
        })
    }

    fn parse_if(&mut self) -> Result<Expression, Error> {
        self.skip_keyword(Keyword::If)?;
        let condition = self.parse_expression()?;
        if !self.is_punctuation(Punctuation::LeftBrace)? {
            self.skip_keyword(Keyword::Then)?;
        }
        let then = self.parse_expression()?;

        let otherwise = if self.is_keyword(Keyword::Else)? {
            self.input.next_token()?;
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        Ok(Expression::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise,
        })
    }

    fn parse_bool(&mut self) -> Result<Expression, Error> {
        match self.input.next_token()? {
            Some(Token::Keyword(Keyword::True)) => Ok(Expression::boolean(true)),
            Some(Token::Keyword(Keyword::False)) => Ok(Expression::boolean(false)),
            _ => Err(self.input.croak("Expecting boolean literal")),
        }
    }

    fn parse_lambda(&mut self) -> Result<Expression, Error> {
        let parameters = self.delimited(
            Punctuation::LeftParen,
            Punctuation::RightParen,
            Punctuation::Comma,
            Self::parse_varname,
        )?;
        let body = self.parse_expression()?;

        Ok(Expression::Lambda {
            parameters,
            body: Rc::new(body),
        })
    }

    fn parse_varname(&mut self) -> Result<String, Error> {
        match self.input.next_token()? {
            Some(Token::Identifier(name)) => Ok(name),
            _ => Err(self.input.croak("Expecting variable name")),
        }
    }

    fn maybe_call(&mut self, mut expression: Expression) -> Result<Expression, Error> {
        while self.is_punctuation(Punctuation::LeftParen)? {
            expression = self.parse_call(expression)?;
        }
        Ok(expression)
    }

    fn parse_call(&mut self, callee: Expression) -> Result<Expression, Error> {
        let arguments = self.delimited(
            Punctuation::LeftParen,
            Punctuation::RightParen,
            Punctuation::Comma,
            Self::parse_expression,
        )?;

        Ok(Expression::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn maybe_binary(&mut self, mut left: Expression, threshold: u8) -> Result<Expression, Error> {
        loop {
            let operator = match self.input.peek()? {
                Some(Token::Operator(operator)) => operator.clone(),
                _ => return Ok(left),
            };
            let his_precedence = match precedence(&operator) {
                Some(p) if p > threshold => p,
                _ => return Ok(left),
            };
            self.input.next_token()?;

            if operator == "=" {
                let atom = self.parse_atom()?;
                let value = self.maybe_binary(atom, his_precedence)?;
                left = Expression::Assign {
                    target: Box::new(left),
                    value: Box::new(value),
                };
            } else {
                let binary_operator = BinaryOperator::from_symbol(&operator)
                    .ok_or_else(|| self.input.croak(format!("Unknown operator: {}", operator)))?;
                let atom = self.parse_atom()?;
                let right = self.maybe_binary(atom, his_precedence)?;
                left = Expression::Binary {
                    left: Box::new(left),
                    operator: binary_operator,
                    right: Box::new(right),
                };
            }
        }
    }

    /// Parses `start item (separator item)* stop`, or just `start stop`.
    fn delimited<T>(
        &mut self,
        start: Punctuation,
        stop: Punctuation,
        separator: Punctuation,
        mut parser: impl FnMut(&mut Self) -> Result<T, Error>,
    ) -> Result<Vec<T>, Error> {
        self.skip_punctuation(start)?;

        let mut items = Vec::new();
        if self.is_punctuation(stop)? {
            self.input.next_token()?;
            return Ok(items);
        }

        loop {
            items.push(parser(self)?);

            if self.is_punctuation(stop)? {
                self.input.next_token()?;
                return Ok(items);
            }
            self.skip_punctuation(separator)?;
        }
    }

    fn is_punctuation(&mut self, punctuation: Punctuation) -> Result<bool, Error> {
        Ok(matches!(self.input.peek()?, Some(Token::Punctuation(p)) if *p == punctuation))
    }

    fn is_keyword(&mut self, keyword: Keyword) -> Result<bool, Error> {
        Ok(matches!(self.input.peek()?, Some(Token::Keyword(k)) if *k == keyword))
    }

    fn skip_punctuation(&mut self, punctuation: Punctuation) -> Result<(), Error> {
        if self.is_punctuation(punctuation)? {
            self.input.next_token()?;
            Ok(())
        } else {
            Err(self.input.croak(format!("Expecting punctuation: \"{}\"", punctuation.as_char())))
        }
    }

    fn skip_keyword(&mut self, keyword: Keyword) -> Result<(), Error> {
        if self.is_keyword(keyword)? {
            self.input.next_token()?;
            Ok(())
        } else {
            Err(self.input.croak(format!("Expecting keyword: \"{}\"", keyword.as_str())))
        }
    }
}
