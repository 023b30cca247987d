//! Self-reflection and the host boundary: `apply read-string slurp eval map`

use crate::builtins::builtin;
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{self, apply_value};
use crate::parser;
use crate::value::Value;
use std::fs;
use std::rc::Rc;

/// `(apply FN ARG ... LIST)` — the last argument is spread, not passed whole.
pub fn builtin_apply(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity("apply", "at least 2", args.len()));
    }
    let last = &args[args.len() - 1];
    let spread = last
        .as_list()
        .ok_or_else(|| EvalError::type_error("apply", "list", last))?;
    let mut call_args: Vec<Value> = args[1..args.len() - 1].to_vec();
    call_args.extend(spread.iter());
    apply_value(&args[0], call_args, env)
}

pub fn builtin_read_string(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("read-string", 1, args.len()));
    }
    let source = args[0]
        .as_str()
        .ok_or_else(|| EvalError::type_error("read-string", "string", &args[0]))?;
    parser::parse_one(source)
}

pub fn builtin_slurp(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("slurp", 1, args.len()));
    }
    let path = args[0]
        .as_str()
        .ok_or_else(|| EvalError::type_error("slurp", "string", &args[0]))?;
    let contents = fs::read_to_string(path).map_err(|e| EvalError::custom("slurp", e))?;
    Ok(Value::string(contents))
}

/// Evaluates in the global frame, discarding the caller's lexical scope —
/// the same rule MAL's own `eval` builtin follows.
pub fn builtin_eval(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("eval", 1, args.len()));
    }
    eval::eval(args[0].clone(), env.root())
}

pub fn builtin_map(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity("map", 2, args.len()));
    }
    let list = args[1]
        .as_list()
        .ok_or_else(|| EvalError::type_error("map", "list", &args[1]))?;
    let mapped = list
        .iter()
        .map(|item| apply_value(&args[0], vec![item], env))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::list(mapped))
}

pub fn register(env: &Rc<Environment>) {
    let defs: &[(&'static str, crate::value::BuiltinFn)] = &[
        ("apply", builtin_apply),
        ("read-string", builtin_read_string),
        ("slurp", builtin_slurp),
        ("eval", builtin_eval),
        ("map", builtin_map),
    ];
    for (name, func) in defs {
        env.define(Rc::from(*name), Value::Proc(Rc::new(builtin(name, *func))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_env() -> Rc<Environment> {
        let env = Environment::new();
        crate::builtins::register_builtins(&env);
        env
    }

    #[test]
    fn apply_spreads_the_trailing_list() {
        let env = base_env();
        let plus = env.get("+").unwrap();
        let v = builtin_apply(
            &[plus, Value::Int(1), Value::list(vec![Value::Int(2), Value::Int(3)])],
            &env,
        )
        .unwrap();
        assert_eq!(v.as_int(), Some(6));
    }

    #[test]
    fn read_string_parses_one_form() {
        let env = base_env();
        let v = builtin_read_string(&[Value::string("(+ 1 2)")], &env).unwrap();
        assert_eq!(v.as_list().unwrap().len(), 3);
    }

    #[test]
    fn eval_runs_in_the_global_frame() {
        let env = base_env();
        let child = Environment::with_parent(env.clone());
        child.define(Rc::from("shadowed"), Value::Int(1));
        env.define(Rc::from("shadowed"), Value::Int(2));
        let ast = parser::parse_one("shadowed").unwrap();
        assert_eq!(builtin_eval(&[ast], &child).unwrap().as_int(), Some(2));
    }

    #[test]
    fn map_applies_to_each_element() {
        let env = base_env();
        let double = eval::eval(parser::parse_one("(fn* (x) (* x 2))").unwrap(), env.clone()).unwrap();
        let v = builtin_map(&[double, Value::list(vec![Value::Int(1), Value::Int(2)])], &env).unwrap();
        let items = v.as_list().unwrap().to_vec();
        assert_eq!(items[0].as_int(), Some(2));
        assert_eq!(items[1].as_int(), Some(4));
    }
}
