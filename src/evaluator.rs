use std::io::{self, Stdout, Write};
use std::rc::Rc;

use tracing::trace;

use crate::ast::{BinaryOperator, Expression, Literal};
use crate::env::Env;
use crate::error::Error;
use crate::object::{Closure, Object};
use crate::stack::ensure_sufficient_stack;

pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Tree-walking interpreter. Host functions write to `out`.
#[derive(Debug)]
pub struct Evaluator<W: Write = Stdout> {
  out: W,
  depth: usize,
  max_depth: usize,
}

impl Evaluator<Stdout> {
  pub fn new() -> Self {
    Evaluator::with_output(io::stdout())
  }
}

impl Default for Evaluator<Stdout> {
  fn default() -> Self {
    Self::new()
  }
}

impl<W: Write> Evaluator<W> {
  pub fn with_output(out: W) -> Self {
    Evaluator {
      out,
      depth: 0,
      max_depth: DEFAULT_MAX_DEPTH,
    }
  }

  /// Limit on nested closure calls before evaluation stops with
  /// [`Error::StackOverflow`].
  pub fn max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  pub fn output(&self) -> &W {
    &self.out
  }

  pub fn into_output(self) -> W {
    self.out
  }

  pub fn flush(&mut self) -> Result<(), Error> {
    self.out.flush()?;
    Ok(())
  }

  pub fn evaluate(&mut self, expression: &Expression, env: &Env) -> Result<Object, Error> {
    ensure_sufficient_stack(|| self.eval_expression(expression, env))
  }

  fn eval_expression(&mut self, expression: &Expression, env: &Env) -> Result<Object, Error> {
    match expression {
      Expression::Literal(literal) => Ok(Self::eval_literal(literal)),
      Expression::Variable(name) => env.get(name),
      Expression::Assign { target, value } => self.eval_assign(target, value, env),
      Expression::Binary { left, operator, right } => {
        let left = self.evaluate(left, env)?;
        let right = self.evaluate(right, env)?;
        Self::eval_binary_expression(left, *operator, right)
      }
      Expression::If { condition, then, otherwise } => {
        let condition = self.evaluate(condition, env)?;
        if matches!(condition, Object::Boolean(true)) {
          self.evaluate(then, env)
        } else if let Some(otherwise) = otherwise {
          self.evaluate(otherwise, env)
        } else {
          Ok(Object::Boolean(false))
        }
      }
      Expression::Lambda { parameters, body } => Ok(Object::Closure(Rc::new(Closure {
        env: env.clone(),
        parameters: parameters.clone(),
        body: Rc::clone(body),
      }))),
      Expression::Call { callee, arguments } => self.eval_call_expression(callee, arguments, env),
      Expression::Program(program) => {
        let mut result = Object::Boolean(false);
        for expression in program {
          result = self.evaluate(expression, env)?;
        }
        Ok(result)
      }
    }
  }

  fn eval_literal(literal: &Literal) -> Object {
    match literal {
      Literal::Number(value) => Object::Number(*value),
      Literal::String(value) => Object::String(value.clone()),
      Literal::Boolean(value) => Object::Boolean(*value),
    }
  }

  fn eval_assign(&mut self, target: &Expression, value: &Expression, env: &Env) -> Result<Object, Error> {
    let name = match target {
      Expression::Variable(name) => name,
      other => return Err(Error::TypeMismatch(format!("Cannot assign to {}", other.kind()))),
    };

    let value = self.evaluate(value, env)?;
    env.set(name, value.clone())?;
    Ok(value)
  }

  fn check_number(object: &Object) -> Result<f64, Error> {
    match object {
      Object::Number(n) => Ok(*n),
      other => Err(Error::TypeMismatch(format!("Expected number but got {}", other.describe()))),
    }
  }

  // Both operands are already evaluated: `&&` and `||` pick one of them
  // without short-circuiting.
  fn eval_binary_expression(left: Object, op: BinaryOperator, right: Object) -> Result<Object, Error> {
    let result = match op {
      BinaryOperator::And => {
        if left.is_truthy() {
          right
        } else {
          left
        }
      }
      BinaryOperator::Or => {
        if left.is_truthy() {
          left
        } else {
          right
        }
      }
      BinaryOperator::Equal => Object::Boolean(left.loosely_equals(&right)),
      BinaryOperator::NotEqual => Object::Boolean(!left.loosely_equals(&right)),
      BinaryOperator::Add => Object::Number(Self::check_number(&left)? + Self::check_number(&right)?),
      BinaryOperator::Subtract => Object::Number(Self::check_number(&left)? - Self::check_number(&right)?),
      BinaryOperator::Multiply => Object::Number(Self::check_number(&left)? * Self::check_number(&right)?),
      BinaryOperator::Divide => Object::Number(Self::check_number(&left)? / Self::check_number(&right)?),
      BinaryOperator::Modulo => Object::Number(Self::check_number(&left)? % Self::check_number(&right)?),
      BinaryOperator::Less => Object::Boolean(Self::check_number(&left)? < Self::check_number(&right)?),
      BinaryOperator::LessEqual => Object::Boolean(Self::check_number(&left)? <= Self::check_number(&right)?),
      BinaryOperator::Greater => Object::Boolean(Self::check_number(&left)? > Self::check_number(&right)?),
      BinaryOperator::GreaterEqual => Object::Boolean(Self::check_number(&left)? >= Self::check_number(&right)?),
    };
    Ok(result)
  }

  fn eval_call_expression(&mut self, callee: &Expression, arguments: &[Expression], env: &Env) -> Result<Object, Error> {
    let function = self.evaluate(callee, env)?;
    let arguments = arguments
      .iter()
      .map(|argument| self.evaluate(argument, env))
      .collect::<Result<Vec<_>, _>>()?;

    match function {
      Object::Closure(closure) => self.apply_closure(&closure, arguments),
      Object::Native(native) => (native.func)(&arguments, &mut self.out),
      other => Err(Error::NotCallable(other.describe())),
    }
  }

  fn apply_closure(&mut self, closure: &Closure, arguments: Vec<Object>) -> Result<Object, Error> {
    if self.depth >= self.max_depth {
      return Err(Error::StackOverflow(self.max_depth));
    }

    let scope = closure.env.extend();
    let mut arguments = arguments.into_iter();
    for name in &closure.parameters {
      scope.def(name, arguments.next().unwrap_or(Object::Boolean(false)));
    }

    self.depth += 1;
    trace!(depth = self.depth, arity = closure.parameters.len(), "calling closure");
    let result = self.evaluate(&closure.body, &scope);
    self.depth -= 1;
    result
  }
}
