//! Mutable reference cells: `atom deref reset! swap!`
//!
//! The only mutable value in the language. `swap!`'s apply-then-replace is
//! not required to be atomic — there is no concurrency in this interpreter
//! to race with.

use crate::builtins::builtin;
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::apply_value;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

pub fn builtin_atom(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("atom", 1, args.len()));
    }
    Ok(Value::Atom(Rc::new(RefCell::new(args[0].clone()))))
}

pub fn builtin_deref(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("deref", 1, args.len()));
    }
    match &args[0] {
        Value::Atom(cell) => Ok(cell.borrow().clone()),
        other => Err(EvalError::type_error("deref", "atom", other)),
    }
}

pub fn builtin_reset(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity("reset!", 2, args.len()));
    }
    match &args[0] {
        Value::Atom(cell) => {
            *cell.borrow_mut() = args[1].clone();
            Ok(args[1].clone())
        }
        other => Err(EvalError::type_error("reset!", "atom", other)),
    }
}

pub fn builtin_swap(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity("swap!", "at least 2", args.len()));
    }
    let cell = match &args[0] {
        Value::Atom(cell) => cell.clone(),
        other => return Err(EvalError::type_error("swap!", "atom", other)),
    };
    let mut call_args = Vec::with_capacity(args.len() - 1);
    call_args.push(cell.borrow().clone());
    call_args.extend(args[2..].iter().cloned());
    let new_value = apply_value(&args[1], call_args, env)?;
    *cell.borrow_mut() = new_value.clone();
    Ok(new_value)
}

pub fn register(env: &Rc<Environment>) {
    let defs: &[(&'static str, crate::value::BuiltinFn)] = &[
        ("atom", builtin_atom),
        ("deref", builtin_deref),
        ("reset!", builtin_reset),
        ("swap!", builtin_swap),
    ];
    for (name, func) in defs {
        env.define(Rc::from(*name), Value::Proc(Rc::new(builtin(name, *func))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_replaces_the_cell_contents() {
        let env = Environment::new();
        let a = builtin_atom(&[Value::Int(1)], &env).unwrap();
        builtin_reset(&[a.clone(), Value::Int(2)], &env).unwrap();
        assert_eq!(builtin_deref(&[a], &env).unwrap().as_int(), Some(2));
    }

    #[test]
    fn deref_on_non_atom_is_a_type_error() {
        let env = Environment::new();
        assert!(builtin_deref(&[Value::Int(1)], &env).is_err());
    }
}
