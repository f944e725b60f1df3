use std::fmt;
use std::fmt::Formatter;
use std::io::Write;
use std::rc::Rc;

use crate::ast::Expression;
use crate::env::Env;
use crate::error::Error;

pub type NativeFn = fn(&[Object], &mut dyn Write) -> Result<Object, Error>;

/// Host function registered in the global scope.
#[derive(Clone, Copy)]
pub struct Native {
  pub name: &'static str,
  pub func: NativeFn,
}

impl fmt::Debug for Native {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Native").field(&self.name).finish()
  }
}

#[derive(Debug)]
pub struct Closure {
  pub env: Env,
  pub parameters: Vec<String>,
  pub body: Rc<Expression>,
}

#[derive(Debug, Clone)]
pub enum Object {
  Number(f64),
  String(String),
  Boolean(bool),
  Closure(Rc<Closure>),
  Native(Native),
}

impl Object {
  pub fn type_name(&self) -> &'static str {
    match self {
      Object::Number(_) => "number",
      Object::String(_) => "string",
      Object::Boolean(_) => "boolean",
      Object::Closure(_) | Object::Native(_) => "function",
    }
  }

  /// `false`, `0`, NaN and the empty string are falsy.
  pub fn is_truthy(&self) -> bool {
    match self {
      Object::Number(n) => *n != 0.0 && !n.is_nan(),
      Object::String(s) => !s.is_empty(),
      Object::Boolean(b) => *b,
      Object::Closure(_) | Object::Native(_) => true,
    }
  }

  /// Equality behind `==`: numbers, strings and booleans compare by value
  /// after converting strings and booleans to numbers when the kinds differ.
  /// Functions are only equal to themselves.
  pub fn loosely_equals(&self, other: &Object) -> bool {
    match (self, other) {
      (Object::Number(a), Object::Number(b)) => a == b,
      (Object::String(a), Object::String(b)) => a == b,
      (Object::Boolean(a), Object::Boolean(b)) => a == b,
      (Object::Number(n), Object::String(s)) | (Object::String(s), Object::Number(n)) => *n == string_to_number(s),
      (Object::Boolean(b), other) | (other, Object::Boolean(b)) => {
        Object::Number(if *b { 1.0 } else { 0.0 }).loosely_equals(other)
      }
      (Object::Closure(a), Object::Closure(b)) => Rc::ptr_eq(a, b),
      (Object::Native(a), Object::Native(b)) => a.name == b.name,
      _ => false,
    }
  }

  /// Display form with strings quoted, for diagnostics.
  pub fn describe(&self) -> String {
    match self {
      Object::String(s) => format!("{} {:?}", self.type_name(), s),
      other => format!("{} {}", other.type_name(), other),
    }
  }
}

fn string_to_number(s: &str) -> f64 {
  let trimmed = s.trim();
  if trimmed.is_empty() {
    return 0.0;
  }
  trimmed.parse().unwrap_or(f64::NAN)
}

/// Strict equality: same kind and same value, functions by identity.
impl PartialEq for Object {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Object::Number(a), Object::Number(b)) => a == b,
      (Object::String(a), Object::String(b)) => a == b,
      (Object::Boolean(a), Object::Boolean(b)) => a == b,
      (Object::Closure(a), Object::Closure(b)) => Rc::ptr_eq(a, b),
      (Object::Native(a), Object::Native(b)) => a.name == b.name,
      _ => false,
    }
  }
}

impl fmt::Display for Object {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Object::Number(n) if n.is_infinite() => {
        f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
      }
      Object::Number(n) => write!(f, "{}", n),
      Object::String(s) => write!(f, "{}", s),
      Object::Boolean(b) => write!(f, "{}", b),
      Object::Closure(closure) => {
        write!(f, "lambda ({}) {}", closure.parameters.join(", "), closure.body)
      }
      Object::Native(native) => write!(f, "{}() {{ [native code] }}", native.name),
    }
  }
}
