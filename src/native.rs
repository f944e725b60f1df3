use std::collections::HashMap;
use std::io::Write;

use crate::error::Error;
use crate::object::{Native, NativeFn, Object};

/// Host functions every program starts with. Build the global scope from
/// this table with `Env::from(native())`.
pub fn native() -> HashMap<String, Object> {
  let mut native = HashMap::new();
  register(&mut native, "print", native_print);
  register(&mut native, "println", native_println);
  native
}

fn register(table: &mut HashMap<String, Object>, name: &'static str, func: NativeFn) {
  table.insert(name.to_owned(), Object::Native(Native { name, func }));
}

fn join(args: &[Object]) -> String {
  args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>().join(" ")
}

fn native_print(args: &[Object], out: &mut dyn Write) -> Result<Object, Error> {
  write!(out, "{}", join(args))?;

  Ok(Object::Boolean(false))
}

fn native_println(args: &[Object], out: &mut dyn Write) -> Result<Object, Error> {
  writeln!(out, "{}", join(args))?;

  Ok(Object::Boolean(false))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn call(name: &str, args: &[Object]) -> String {
    let table = native();
    let mut out = Vec::new();
    match &table[name] {
      Object::Native(native) => (native.func)(args, &mut out).unwrap(),
      other => panic!("{} is not native: {:?}", name, other),
    };
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn table_contains_print_and_println() {
    let table = native();
    let mut names = table.keys().map(String::as_str).collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["print", "println"]);
  }

  #[test]
  fn print_has_no_newline() {
    assert_eq!(call("print", &[Object::String("hi".to_owned())]), "hi");
  }

  #[test]
  fn println_formats_any_value() {
    assert_eq!(
      call("println", &[Object::Number(7.0), Object::Boolean(true)]),
      "7 true\n"
    );
  }
}
