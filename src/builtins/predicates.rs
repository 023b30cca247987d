//! Unary type predicates: `list? empty? symbol? string? true? false?
//! procedure? builtin? atom? macro? exn?`

use crate::builtins::builtin;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{ProcKind, Value};
use std::rc::Rc;

macro_rules! predicate {
    ($fn_name:ident, $lisp_name:literal, $pat:pat) => {
        pub fn $fn_name(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
            if args.len() != 1 {
                return Err(EvalError::arity($lisp_name, 1, args.len()));
            }
            Ok(Value::bool_value(matches!(&args[0], $pat)))
        }
    };
}

predicate!(builtin_listp, "list?", Value::List(_));
predicate!(builtin_symbolp, "symbol?", Value::Symbol(_));
predicate!(builtin_stringp, "string?", Value::Str(_));
predicate!(builtin_truep, "true?", Value::True);
predicate!(builtin_falsep, "false?", Value::False);
predicate!(builtin_atomp, "atom?", Value::Atom(_));
predicate!(builtin_exnp, "exn?", Value::Exception(_));

pub fn builtin_emptyp(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("empty?", 1, args.len()));
    }
    // `nil` counts as empty, matching `count`'s treatment of nil as a
    // zero-length sequence.
    match &args[0] {
        Value::Nil => Ok(Value::True),
        Value::List(l) => Ok(Value::bool_value(l.is_empty())),
        other => Err(EvalError::type_error("empty?", "list", other)),
    }
}

pub fn builtin_procedurep(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("procedure?", 1, args.len()));
    }
    Ok(Value::bool_value(
        matches!(&args[0], Value::Proc(p) if !p.is_macro.get()),
    ))
}

pub fn builtin_builtinp(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("builtin?", 1, args.len()));
    }
    Ok(Value::bool_value(
        matches!(&args[0], Value::Proc(p) if matches!(p.kind, ProcKind::Builtin { .. })),
    ))
}

pub fn builtin_macrop(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("macro?", 1, args.len()));
    }
    Ok(Value::bool_value(args[0].is_macro()))
}

pub fn register(env: &Rc<Environment>) {
    let defs: &[(&'static str, crate::value::BuiltinFn)] = &[
        ("list?", builtin_listp),
        ("empty?", builtin_emptyp),
        ("symbol?", builtin_symbolp),
        ("string?", builtin_stringp),
        ("true?", builtin_truep),
        ("false?", builtin_falsep),
        ("procedure?", builtin_procedurep),
        ("builtin?", builtin_builtinp),
        ("atom?", builtin_atomp),
        ("macro?", builtin_macrop),
        ("exn?", builtin_exnp),
    ];
    for (name, func) in defs {
        env.define(Rc::from(*name), Value::Proc(Rc::new(builtin(name, *func))));
    }
}
