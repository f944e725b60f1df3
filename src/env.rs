use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::Error;
use crate::object::Object;

type Objects = HashMap<String, Object>;

#[derive(Default)]
struct Scope {
  objects: Objects,
  parent: Option<Env>,
}

/// Handle to one scope in the chain. Clones share the scope, so a closure
/// keeps its defining scope alive after the call that created it returns.
#[derive(Clone, Default)]
pub struct Env(Rc<RefCell<Scope>>);

impl Env {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn extend(&self) -> Env {
    Env(Rc::new(RefCell::new(Scope {
      objects: HashMap::new(),
      parent: Some(self.clone()),
    })))
  }

  pub fn is_global(&self) -> bool {
    self.0.borrow().parent.is_none()
  }

  pub fn ptr_eq(&self, other: &Env) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  /// The nearest scope, starting here, that binds `name`.
  pub fn lookup(&self, name: &str) -> Option<Env> {
    let mut scope = Some(self.clone());
    while let Some(env) = scope {
      if env.0.borrow().objects.contains_key(name) {
        return Some(env);
      }
      scope = env.0.borrow().parent.clone();
    }
    None
  }

  pub fn get(&self, name: &str) -> Result<Object, Error> {
    match self.lookup(name) {
      Some(scope) => {
        let object = scope.0.borrow().objects.get(name).cloned();
        object.ok_or_else(|| Error::UndefinedVariable(name.to_owned()))
      }
      None => Err(Error::UndefinedVariable(name.to_owned())),
    }
  }

  /// Rebinds the nearest existing binding. An unbound name is an error,
  /// except in the global scope, where it declares a new global.
  pub fn set(&self, name: &str, value: Object) -> Result<(), Error> {
    match self.lookup(name) {
      Some(scope) => {
        scope.0.borrow_mut().objects.insert(name.to_owned(), value);
      }
      None if !self.is_global() => return Err(Error::UndefinedVariable(name.to_owned())),
      None => {
        debug!(name, "implicitly declaring global");
        self.def(name, value);
      }
    }
    Ok(())
  }

  pub fn def(&self, name: &str, value: Object) {
    self.0.borrow_mut().objects.insert(name.to_owned(), value);
  }
}

impl From<Objects> for Env {
  fn from(objects: Objects) -> Self {
    Env(Rc::new(RefCell::new(Scope { objects, parent: None })))
  }
}

// Bindings may hold closures that capture this very scope, so only names
// are printed.
impl fmt::Debug for Env {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let scope = self.0.borrow();
    let mut names = scope.objects.keys().collect::<Vec<_>>();
    names.sort();
    f.debug_struct("Env")
      .field("names", &names)
      .field("global", &scope.parent.is_none())
      .finish()
  }
}
