//! Conditions: `exn exn-datum throw`

use crate::builtins::builtin;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

pub fn builtin_exn(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("exn", 1, args.len()));
    }
    Ok(Value::Exception(Rc::new(args[0].clone())))
}

pub fn builtin_exn_datum(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("exn-datum", 1, args.len()));
    }
    match &args[0] {
        Value::Exception(payload) => Ok((**payload).clone()),
        other => Err(EvalError::type_error("exn-datum", "exception", other)),
    }
}

pub fn builtin_throw(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("throw", 1, args.len()));
    }
    Err(EvalError::Thrown(args[0].clone()))
}

pub fn register(env: &Rc<Environment>) {
    let defs: &[(&'static str, crate::value::BuiltinFn)] = &[
        ("exn", builtin_exn),
        ("exn-datum", builtin_exn_datum),
        ("throw", builtin_throw),
    ];
    for (name, func) in defs {
        env.define(Rc::from(*name), Value::Proc(Rc::new(builtin(name, *func))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exn_datum_unwraps_the_payload() {
        let env = Environment::new();
        let e = builtin_exn(&[Value::Int(42)], &env).unwrap();
        assert_eq!(builtin_exn_datum(&[e], &env).unwrap().as_int(), Some(42));
    }

    #[test]
    fn throw_returns_a_thrown_error() {
        let env = Environment::new();
        let err = builtin_throw(&[Value::string("boom")], &env).unwrap_err();
        assert!(matches!(err, EvalError::Thrown(_)));
    }
}
