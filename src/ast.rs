use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::stack::ensure_sufficient_stack;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Variable(String),
    /// Any node may be the target. Only a `Variable` can be assigned at
    /// evaluation time.
    Assign {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Option<Box<Expression>>,
    },
    /// The body is shared with every closure created from this node.
    Lambda {
        parameters: Vec<String>,
        body: Rc<Expression>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Program(Vec<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

/// Binding strength of an infix operator, `=` included.
pub fn precedence(operator: &str) -> Option<u8> {
    match operator {
        "=" => Some(1),
        "||" => Some(2),
        "&&" => Some(3),
        "<" | ">" | "<=" | ">=" | "==" | "!=" => Some(7),
        "+" | "-" => Some(10),
        "*" | "/" | "%" => Some(20),
        _ => None,
    }
}

impl BinaryOperator {
    pub fn from_symbol(operator: &str) -> Option<BinaryOperator> {
        match operator {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Subtract),
            "*" => Some(BinaryOperator::Multiply),
            "/" => Some(BinaryOperator::Divide),
            "%" => Some(BinaryOperator::Modulo),
            "==" => Some(BinaryOperator::Equal),
            "!=" => Some(BinaryOperator::NotEqual),
            "<" => Some(BinaryOperator::Less),
            "<=" => Some(BinaryOperator::LessEqual),
            ">" => Some(BinaryOperator::Greater),
            ">=" => Some(BinaryOperator::GreaterEqual),
            "&&" => Some(BinaryOperator::And),
            "||" => Some(BinaryOperator::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }
}

impl Expression {
    pub fn number(value: f64) -> Expression {
        Expression::Literal(Literal::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Expression {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn boolean(value: bool) -> Expression {
        Expression::Literal(Literal::Boolean(value))
    }

    pub fn variable(name: impl Into<String>) -> Expression {
        Expression::Variable(name.into())
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Literal(Literal::Number(_)) => "number",
            Expression::Literal(Literal::String(_)) => "string",
            Expression::Literal(Literal::Boolean(_)) => "boolean",
            Expression::Variable(_) => "variable",
            Expression::Assign { .. } => "assign",
            Expression::Binary { .. } => "binary",
            Expression::If { .. } => "if",
            Expression::Lambda { .. } => "lambda",
            Expression::Call { .. } => "call",
            Expression::Program(_) => "program",
        }
    }
}

// The parser builds operator chains in a loop, so trees can be far deeper
// than the call stack. Children are moved onto a heap worklist before the
// node itself is freed.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expression) = pending.pop() {
            expression.take_children(&mut pending);
        }
    }
}

impl Expression {
    fn is_leaf(&self) -> bool {
        matches!(self, Expression::Literal(_) | Expression::Variable(_))
    }

    fn take_children(&mut self, pending: &mut Vec<Expression>) {
        fn take(boxed: &mut Box<Expression>, pending: &mut Vec<Expression>) {
            if !boxed.is_leaf() {
                pending.push(*mem::replace(boxed, Box::new(Expression::boolean(false))));
            }
        }

        match self {
            Expression::Literal(_) | Expression::Variable(_) => {}
            Expression::Assign { target, value } => {
                take(target, pending);
                take(value, pending);
            }
            Expression::Binary { left, right, .. } => {
                take(left, pending);
                take(right, pending);
            }
            Expression::If { condition, then, otherwise } => {
                take(condition, pending);
                take(then, pending);
                if let Some(otherwise) = otherwise {
                    take(otherwise, pending);
                }
            }
            Expression::Lambda { body, .. } => {
                if !body.is_leaf() && Rc::strong_count(body) == 1 {
                    let body = mem::replace(body, Rc::new(Expression::boolean(false)));
                    if let Ok(body) = Rc::try_unwrap(body) {
                        pending.push(body);
                    }
                }
            }
            Expression::Call { callee, arguments } => {
                take(callee, pending);
                pending.extend(arguments.drain(..).filter(|argument| !argument.is_leaf()));
            }
            Expression::Program(program) => {
                pending.extend(program.drain(..).filter(|expression| !expression.is_leaf()));
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("\"")
            }
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Renders source text that parses back to the same tree. Compound
/// sub-expressions are parenthesised, a program is written as a block.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Variable(name) => f.write_str(name),
            Expression::Assign { target, value } => write!(f, "({} = {})", target, value),
            Expression::Binary { left, operator, right } => {
                write!(f, "({} {} {})", left, operator.as_str(), right)
            }
            Expression::If { condition, then, otherwise } => {
                write!(f, "(if {} then {}", condition, then)?;
                if let Some(otherwise) = otherwise {
                    write!(f, " else {}", otherwise)?;
                }
                f.write_str(")")
            }
            Expression::Lambda { parameters, body } => {
                f.write_str("(lambda (")?;
                write_list(f, parameters, ", ")?;
                write!(f, ") {})", body)
            }
            Expression::Call { callee, arguments } => {
                write!(f, "{}(", callee)?;
                write_list(f, arguments, ", ")?;
                f.write_str(")")
            }
            Expression::Program(expressions) => {
                f.write_str("{ ")?;
                write_list(f, expressions, "; ")?;
                f.write_str(" }")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_table() {
        assert_eq!(precedence("="), Some(1));
        assert_eq!(precedence("||"), Some(2));
        assert_eq!(precedence("&&"), Some(3));
        assert_eq!(precedence(">="), Some(7));
        assert_eq!(precedence("-"), Some(10));
        assert_eq!(precedence("%"), Some(20));
        assert_eq!(precedence("!"), None);
        assert_eq!(precedence("==="), None);
    }

    #[test]
    fn string_literals_are_escaped() {
        assert_eq!(Expression::string(r#"a "b" \c"#).to_string(), r#""a \"b\" \\c""#);
    }

    #[test]
    fn compound_nodes_are_parenthesised() {
        let node = Expression::Call {
            callee: Box::new(Expression::Lambda {
                parameters: vec!["x".to_owned(), "y".to_owned()],
                body: Rc::new(Expression::Binary {
                    left: Box::new(Expression::variable("x")),
                    operator: BinaryOperator::Add,
                    right: Box::new(Expression::variable("y")),
                }),
            }),
            arguments: vec![Expression::number(3.0), Expression::number(4.5)],
        };

        assert_eq!(node.to_string(), "(lambda (x, y) (x + y))(3, 4.5)");
    }

    fn left_chain(length: usize) -> Expression {
        let mut node = Expression::number(1.0);
        for _ in 0..length {
            node = Expression::Binary {
                left: Box::new(node),
                operator: BinaryOperator::Add,
                right: Box::new(Expression::number(1.0)),
            };
        }
        node
    }

    #[test]
    fn deep_trees_print() {
        let printed = left_chain(50_000).to_string();
        assert!(printed.starts_with("(((("));
        assert!(printed.ends_with(" + 1)"));
    }

    #[test]
    fn deep_trees_drop() {
        drop(left_chain(200_000));

        let mut node = Expression::number(0.0);
        for _ in 0..200_000 {
            node = Expression::Lambda {
                parameters: vec![],
                body: Rc::new(Expression::Call {
                    callee: Box::new(node),
                    arguments: vec![Expression::Program(vec![])],
                }),
            };
        }
        drop(node);
    }

    #[test]
    fn shared_lambda_bodies_outlive_the_tree() {
        let body = Rc::new(left_chain(3));
        let lambda = Expression::Lambda {
            parameters: vec![],
            body: Rc::clone(&body),
        };
        drop(lambda);
        assert_eq!(body.to_string(), "(((1 + 1) + 1) + 1)");
    }
}
