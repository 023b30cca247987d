//! The tagged-union value model: every MAL datum, every piece of MAL code,
//! and every runtime object (procedure, atom, exception) is a `Value`.
//!
//! Lists are represented as a persistent singly-linked cons chain so that
//! `cons` is O(1) and never mutates the list it extends — two properties the
//! evaluator's `apply`/quasiquote code leans on when building argument lists
//! and quoted structure, and a property a flat `Vec<Value>` cannot give us
//! without an O(n) copy on every `cons`.

use crate::env::Environment;
use crate::error::EvalError;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A persistent, singly-linked, immutable list. Cloning is O(1) (it bumps an
/// `Rc`); `cons`-ing a new head onto an existing tail is O(1) and leaves the
/// original list untouched.
#[derive(Clone)]
pub enum PList {
    Empty,
    Cons(Rc<PCons>),
}

pub struct PCons {
    pub head: Value,
    pub tail: PList,
}

impl PList {
    pub fn empty() -> Self {
        PList::Empty
    }

    pub fn cons(head: Value, tail: PList) -> Self {
        PList::Cons(Rc::new(PCons { head, tail }))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PList::Empty)
    }

    pub fn head(&self) -> Option<&Value> {
        match self {
            PList::Cons(c) => Some(&c.head),
            PList::Empty => None,
        }
    }

    pub fn tail(&self) -> PList {
        match self {
            PList::Cons(c) => c.tail.clone(),
            PList::Empty => PList::Empty,
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> PListIter {
        PListIter(self.clone())
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        let mut out = PList::Empty;
        for item in items.into_iter().rev() {
            out = PList::cons(item, out);
        }
        out
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }

    /// Appends `other` after this list's last element. O(n) in this list's
    /// length, used by `concat`.
    pub fn append(&self, other: &PList) -> PList {
        let mut items = self.to_vec();
        items.extend(other.iter());
        PList::from_vec(items)
    }
}

pub struct PListIter(PList);

impl Iterator for PListIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match std::mem::replace(&mut self.0, PList::Empty) {
            PList::Cons(c) => {
                self.0 = c.tail.clone();
                Some(c.head.clone())
            }
            PList::Empty => None,
        }
    }
}

/// Native function backing a builtin `Proc`. Receives the evaluated argument
/// vector and the environment active at the call site (most builtins ignore
/// it; `eval` walks to the root, `env` reads the call frame directly).
pub type BuiltinFn = fn(&[Value], &Rc<Environment>) -> Result<Value, EvalError>;

pub enum ProcKind {
    Builtin {
        func: BuiltinFn,
        builtin_name: &'static str,
    },
    Lambda {
        params: Vec<Rc<str>>,
        variadic: bool,
        body: Vec<Value>,
        env: Rc<Environment>,
    },
}

/// A callable value: either a native builtin or a `fn*`-built lambda.
/// `defmacro!` flips `is_macro` on an existing lambda procedure rather than
/// wrapping it in a separate type, so a macro is a procedure in every other
/// respect (identity, `apply`, `type`).
pub struct Procedure {
    pub name: RefCell<Option<Rc<str>>>,
    pub is_macro: Cell<bool>,
    pub kind: ProcKind,
}

impl Procedure {
    pub fn argc(&self) -> usize {
        match &self.kind {
            ProcKind::Lambda {
                params, variadic, ..
            } => {
                if *variadic {
                    params.len() - 1
                } else {
                    params.len()
                }
            }
            ProcKind::Builtin { .. } => 0,
        }
    }

    pub fn variadic(&self) -> bool {
        matches!(
            &self.kind,
            ProcKind::Lambda {
                variadic: true,
                ..
            }
        )
    }

    pub fn display_name(&self) -> Option<Rc<str>> {
        if let Some(n) = self.name.borrow().as_ref() {
            return Some(n.clone());
        }
        if let ProcKind::Builtin { builtin_name, .. } = &self.kind {
            return Some(Rc::from(*builtin_name));
        }
        None
    }
}

#[derive(Clone)]
pub enum Value {
    Int(i32),
    Symbol(Rc<str>),
    Str(Rc<str>),
    List(PList),
    Nil,
    True,
    False,
    Proc(Rc<Procedure>),
    Atom(Rc<RefCell<Value>>),
    Exception(Rc<Value>),
}

impl Value {
    pub fn symbol(name: impl Into<Rc<str>>) -> Value {
        Value::Symbol(name.into())
    }

    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(PList::from_vec(items))
    }

    pub fn bool_value(b: bool) -> Value {
        if b {
            Value::True
        } else {
            Value::False
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::False)
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&PList> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_proc(&self) -> Option<&Rc<Procedure>> {
        match self {
            Value::Proc(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, Value::Proc(p) if p.is_macro.get())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Nil => "nil",
            Value::True | Value::False => "boolean",
            Value::Proc(p) => {
                if p.is_macro.get() {
                    "macro"
                } else {
                    "procedure"
                }
            }
            Value::Atom(_) => "atom",
            Value::Exception(_) => "exception",
        }
    }

    /// Identity string for `addr`: stable for the value's lifetime, distinct
    /// per underlying allocation for reference types, synthesized for
    /// immediate values.
    pub fn identity(&self) -> String {
        match self {
            Value::Proc(p) => format!("{:p}", Rc::as_ptr(p)),
            Value::Atom(a) => format!("{:p}", Rc::as_ptr(a)),
            Value::Str(s) => format!("{:p}", s.as_ptr()),
            Value::List(PList::Cons(c)) => format!("{:p}", Rc::as_ptr(c)),
            Value::List(PList::Empty) => "()".to_string(),
            Value::Exception(e) => format!("{:p}", Rc::as_ptr(e)),
            Value::Int(n) => format!("int:{n}"),
            Value::Symbol(s) => format!("sym:{s}"),
            Value::Nil => "nil".to_string(),
            Value::True => "true".to_string(),
            Value::False => "false".to_string(),
        }
    }

    pub fn pr_str(&self, readable: bool) -> String {
        format!("{}", Printed { value: self, readable })
    }
}

/// Structural-where-it-matters, identity-where-it-matters equality, per the
/// `=` builtin's contract: lists compare element-wise, procedures and atoms
/// compare by identity, exceptions compare by their payload.
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Nil, Value::Nil) => true,
        (Value::True, Value::True) => true,
        (Value::False, Value::False) => true,
        (Value::List(x), Value::List(y)) => {
            let mut xi = x.iter();
            let mut yi = y.iter();
            loop {
                match (xi.next(), yi.next()) {
                    (None, None) => return true,
                    (Some(a), Some(b)) => {
                        if !value_eq(&a, &b) {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        }
        (Value::Proc(x), Value::Proc(y)) => Rc::ptr_eq(x, y),
        (Value::Atom(x), Value::Atom(y)) => Rc::ptr_eq(x, y),
        (Value::Exception(x), Value::Exception(y)) => value_eq(x, y),
        _ => false,
    }
}

/// Carries the readable/display distinction through `Display::fmt`, which
/// otherwise has no room for an extra parameter.
pub struct Printed<'a> {
    pub value: &'a Value,
    pub readable: bool,
}

impl fmt::Display for Printed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let readable = self.readable;
        match self.value {
            Value::Int(n) => write!(f, "{n}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Str(s) => {
                if readable {
                    write!(f, "\"")?;
                    for ch in s.chars() {
                        match ch {
                            '\\' => write!(f, "\\\\")?,
                            '"' => write!(f, "\\\"")?,
                            '\n' => write!(f, "\\n")?,
                            '\t' => write!(f, "\\t")?,
                            other => write!(f, "{other}")?,
                        }
                    }
                    write!(f, "\"")
                } else {
                    write!(f, "{s}")
                }
            }
            Value::List(list) => {
                write!(f, "(")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", Printed { value: &item, readable })?;
                }
                write!(f, ")")
            }
            Value::Nil => write!(f, "nil"),
            Value::True => write!(f, "true"),
            Value::False => write!(f, "false"),
            Value::Proc(p) => match p.display_name() {
                Some(name) if p.is_macro.get() => write!(f, "#<macro:{name}>"),
                Some(name) => write!(f, "#<procedure:{name}>"),
                None => write!(f, "#<procedure>"),
            },
            Value::Atom(a) => {
                write!(f, "(atom {})", Printed { value: &a.borrow(), readable })
            }
            Value::Exception(payload) => {
                write!(f, "#<exception {}>", Printed { value: payload, readable })
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printed { value: self, readable: true }.fmt(f)
    }
}

/// Shallow, non-recursive: a lambda's captured environment is not printed
/// (it may transitively contain the very procedure being printed).
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Proc(p) => write!(f, "Proc({})", p.display_name().as_deref().unwrap_or("_")),
            Value::Atom(_) => write!(f, "Atom(..)"),
            other => write!(f, "{}", Printed { value: other, readable: true }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plist_cons_is_non_destructive() {
        let tail = PList::from_vec(vec![Value::Int(2), Value::Int(3)]);
        let extended = PList::cons(Value::Int(1), tail.clone());
        assert_eq!(tail.len(), 2);
        assert_eq!(extended.len(), 3);
        assert_eq!(extended.to_vec()[0].as_int(), Some(1));
    }

    #[test]
    fn empty_list_differs_from_nil() {
        let empty = Value::list(vec![]);
        assert!(!value_eq(&empty, &Value::Nil));
        assert_eq!(empty.pr_str(true), "()");
        assert_eq!(Value::Nil.pr_str(true), "nil");
    }

    #[test]
    fn string_readable_escapes() {
        let s = Value::string("a\n\"b\"");
        assert_eq!(s.pr_str(true), "\"a\\n\\\"b\\\"\"");
        assert_eq!(s.pr_str(false), "a\n\"b\"");
    }

    #[test]
    fn list_equality_is_elementwise() {
        let a = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let c = Value::list(vec![Value::Int(1), Value::Int(3)]);
        assert!(value_eq(&a, &b));
        assert!(!value_eq(&a, &c));
    }

    #[test]
    fn procedures_compare_by_identity_not_structure() {
        let env = Environment::new();
        let make = || {
            Rc::new(Procedure {
                name: RefCell::new(None),
                is_macro: Cell::new(false),
                kind: ProcKind::Lambda {
                    params: vec![],
                    variadic: false,
                    body: vec![Value::Nil],
                    env: env.clone(),
                },
            })
        };
        let p1 = make();
        let p2 = make();
        assert!(value_eq(&Value::Proc(p1.clone()), &Value::Proc(p1)));
        assert!(!value_eq(&Value::Proc(p2.clone()), &Value::Proc(make())));
    }
}
