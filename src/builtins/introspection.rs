//! Runtime introspection: `type arity env addr refc`

use crate::builtins::builtin;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

pub fn builtin_type(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("type", 1, args.len()));
    }
    Ok(Value::symbol(args[0].type_name()))
}

/// `(argc variadic?)` — a lambda's shape; builtins report `(0 false)` since
/// they police their own arity rather than carrying `Procedure` metadata.
pub fn builtin_arity(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("arity", 1, args.len()));
    }
    let proc = args[0]
        .as_proc()
        .ok_or_else(|| EvalError::type_error("arity", "procedure", &args[0]))?;
    Ok(Value::list(vec![
        Value::Int(proc.argc() as i32),
        Value::bool_value(proc.variadic()),
    ]))
}

/// `(symbol value)` pairs bound directly in the calling frame — does not
/// walk the parent chain.
pub fn builtin_env(_args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let pairs = env
        .snapshot()
        .into_iter()
        .map(|(name, value)| Value::list(vec![Value::Symbol(name), value]))
        .collect();
    Ok(Value::list(pairs))
}

pub fn builtin_addr(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("addr", 1, args.len()));
    }
    Ok(Value::string(args[0].identity()))
}

/// Reference counting is not a feature of this host (Rust's ownership model
/// already manages lifetimes); kept as a `nil`-returning stub so `core.mal`
/// code ported from collector-aware MAL dialects doesn't need a guard.
pub fn builtin_refc(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("refc", 1, args.len()));
    }
    Ok(Value::Nil)
}

pub fn register(env: &Rc<Environment>) {
    let defs: &[(&'static str, crate::value::BuiltinFn)] = &[
        ("type", builtin_type),
        ("arity", builtin_arity),
        ("env", builtin_env),
        ("addr", builtin_addr),
        ("refc", builtin_refc),
    ];
    for (name, func) in defs {
        env.define(Rc::from(*name), Value::Proc(Rc::new(builtin(name, *func))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        let env = Environment::new();
        assert_eq!(builtin_type(&[Value::Int(1)], &env).unwrap().as_symbol(), Some("integer"));
        assert_eq!(
            builtin_type(&[Value::string("x")], &env).unwrap().as_symbol(),
            Some("string")
        );
    }

    #[test]
    fn env_reports_only_this_frame() {
        let parent = Environment::new();
        parent.define(Rc::from("outer"), Value::Int(1));
        let child = Environment::with_parent(parent);
        child.define(Rc::from("inner"), Value::Int(2));
        let result = builtin_env(&[], &child).unwrap();
        let items = result.as_list().unwrap().to_vec();
        assert_eq!(items.len(), 1);
    }
}
