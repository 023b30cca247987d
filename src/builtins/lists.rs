//! List construction and access: `list count list-ref nth list-rest rest
//! cons concat`

use crate::builtins::builtin;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{PList, Value};
use std::rc::Rc;

pub fn builtin_list(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    Ok(Value::list(args.to_vec()))
}

/// `nil` counts as a zero-length sequence, matching `empty?`.
pub fn builtin_count(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("count", 1, args.len()));
    }
    match &args[0] {
        Value::Nil => Ok(Value::Int(0)),
        Value::List(l) => Ok(Value::Int(l.len() as i32)),
        other => Err(EvalError::type_error("count", "list", other)),
    }
}

fn nth_impl(function: &str, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity(function, 2, args.len()));
    }
    let list = args[0]
        .as_list()
        .ok_or_else(|| EvalError::type_error(function, "list", &args[0]))?;
    let index = args[1]
        .as_int()
        .ok_or_else(|| EvalError::type_error(function, "integer", &args[1]))?;
    if index < 0 {
        return Err(EvalError::custom(function, "index out of range"));
    }
    list.iter()
        .nth(index as usize)
        .ok_or_else(|| EvalError::custom(function, "index out of range"))
}

pub fn builtin_list_ref(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    nth_impl("list-ref", args)
}

pub fn builtin_nth(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    nth_impl("nth", args)
}

fn rest_impl(function: &str, args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity(function, 1, args.len()));
    }
    match &args[0] {
        Value::Nil => Ok(Value::list(vec![])),
        Value::List(l) => Ok(Value::List(l.tail())),
        other => Err(EvalError::type_error(function, "list", other)),
    }
}

pub fn builtin_list_rest(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    rest_impl("list-rest", args)
}

pub fn builtin_rest(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    rest_impl("rest", args)
}

pub fn builtin_cons(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity("cons", 2, args.len()));
    }
    let tail = match &args[1] {
        Value::Nil => PList::empty(),
        Value::List(l) => l.clone(),
        other => return Err(EvalError::type_error("cons", "list", other)),
    };
    Ok(Value::List(PList::cons(args[0].clone(), tail)))
}

pub fn builtin_concat(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut out = PList::empty();
    for arg in args {
        let list = match arg {
            Value::Nil => continue,
            Value::List(l) => l,
            other => return Err(EvalError::type_error("concat", "list", other)),
        };
        out = out.append(list);
    }
    Ok(Value::List(out))
}

pub fn register(env: &Rc<Environment>) {
    let defs: &[(&'static str, crate::value::BuiltinFn)] = &[
        ("list", builtin_list),
        ("count", builtin_count),
        ("list-ref", builtin_list_ref),
        ("nth", builtin_nth),
        ("list-rest", builtin_list_rest),
        ("rest", builtin_rest),
        ("cons", builtin_cons),
        ("concat", builtin_concat),
    ];
    for (name, func) in defs {
        env.define(Rc::from(*name), Value::Proc(Rc::new(builtin(name, *func))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Rc<Environment> {
        Environment::new()
    }

    #[test]
    fn cons_is_non_destructive() {
        let e = env();
        let tail = Value::list(vec![Value::Int(2), Value::Int(3)]);
        let v = builtin_cons(&[Value::Int(1), tail.clone()], &e).unwrap();
        assert_eq!(v.as_list().unwrap().len(), 3);
        assert_eq!(tail.as_list().unwrap().len(), 2);
    }

    #[test]
    fn concat_flattens_one_level() {
        let e = env();
        let a = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::list(vec![Value::Int(3)]);
        let v = builtin_concat(&[a, b], &e).unwrap();
        let items = v.as_list().unwrap().to_vec();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].as_int(), Some(3));
    }

    #[test]
    fn count_on_nil_is_zero() {
        let e = env();
        assert_eq!(builtin_count(&[Value::Nil], &e).unwrap().as_int(), Some(0));
    }

    #[test]
    fn count_on_non_list_is_an_error() {
        let e = env();
        assert!(builtin_count(&[Value::Int(1)], &e).is_err());
    }

    #[test]
    fn list_ref_out_of_range_errors() {
        let e = env();
        let l = Value::list(vec![Value::Int(1)]);
        assert!(builtin_list_ref(&[l, Value::Int(5)], &e).is_err());
    }
}
