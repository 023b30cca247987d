//! Printing: `pr-str str prn println`

use crate::builtins::builtin;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

pub fn builtin_pr_str(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    let joined = args
        .iter()
        .map(|v| v.pr_str(true))
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Value::string(joined))
}

pub fn builtin_str(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    let joined = args.iter().map(|v| v.pr_str(false)).collect::<String>();
    Ok(Value::string(joined))
}

pub fn builtin_prn(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    let joined = args
        .iter()
        .map(|v| v.pr_str(true))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{joined}");
    Ok(Value::Nil)
}

pub fn builtin_println(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    let joined = args
        .iter()
        .map(|v| v.pr_str(false))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{joined}");
    Ok(Value::Nil)
}

pub fn register(env: &Rc<Environment>) {
    let defs: &[(&'static str, crate::value::BuiltinFn)] = &[
        ("pr-str", builtin_pr_str),
        ("str", builtin_str),
        ("prn", builtin_prn),
        ("println", builtin_println),
    ];
    for (name, func) in defs {
        env.define(Rc::from(*name), Value::Proc(Rc::new(builtin(name, *func))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pr_str_quotes_strings_and_joins_with_spaces() {
        let env = Environment::new();
        let v = builtin_pr_str(&[Value::string("a"), Value::Int(1)], &env).unwrap();
        assert_eq!(v.as_str(), Some("\"a\" 1"));
    }

    #[test]
    fn str_concatenates_without_quoting() {
        let env = Environment::new();
        let v = builtin_str(&[Value::string("a"), Value::Int(1)], &env).unwrap();
        assert_eq!(v.as_str(), Some("a1"));
    }
}
