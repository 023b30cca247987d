//! Arithmetic operations: `+ - * / % > even?`
//!
//! `+ - * /` require at least two arguments (the original_source reference
//! implementation registers all four with `argc = 2, variadic = true`, never
//! a unary form); `%` and `>` are fixed two-argument operations.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn ints(function: &str, args: &[Value]) -> Result<Vec<i32>, EvalError> {
    args.iter()
        .map(|a| a.as_int().ok_or_else(|| EvalError::type_error(function, "integer", a)))
        .collect()
}

pub fn builtin_add(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity("+", "at least 2", args.len()));
    }
    Ok(Value::Int(ints("+", args)?.into_iter().sum()))
}

pub fn builtin_sub(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity("-", "at least 2", args.len()));
    }
    let nums = ints("-", args)?;
    Ok(Value::Int(nums[1..].iter().fold(nums[0], |acc, n| acc - n)))
}

pub fn builtin_mul(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity("*", "at least 2", args.len()));
    }
    Ok(Value::Int(ints("*", args)?.into_iter().product()))
}

pub fn builtin_div(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity("/", "at least 2", args.len()));
    }
    let nums = ints("/", args)?;
    let mut result = nums[0];
    for n in &nums[1..] {
        if *n == 0 {
            return Err(EvalError::custom("/", "division by zero"));
        }
        result /= n;
    }
    Ok(Value::Int(result))
}

pub fn builtin_mod(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity("%", 2, args.len()));
    }
    let nums = ints("%", args)?;
    if nums[1] == 0 {
        return Err(EvalError::custom("%", "division by zero"));
    }
    Ok(Value::Int(nums[0] % nums[1]))
}

pub fn builtin_gt(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity(">", 2, args.len()));
    }
    let nums = ints(">", args)?;
    Ok(Value::bool_value(nums[0] > nums[1]))
}

pub fn builtin_even(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("even?", 1, args.len()));
    }
    let n = args[0].as_int().ok_or_else(|| EvalError::type_error("even?", "integer", &args[0]))?;
    Ok(Value::bool_value(n % 2 == 0))
}

pub fn register(env: &Rc<Environment>) {
    env.define(Rc::from("+"), Value::Proc(Rc::new(crate::builtins::builtin("+", builtin_add))));
    env.define(Rc::from("-"), Value::Proc(Rc::new(crate::builtins::builtin("-", builtin_sub))));
    env.define(Rc::from("*"), Value::Proc(Rc::new(crate::builtins::builtin("*", builtin_mul))));
    env.define(Rc::from("/"), Value::Proc(Rc::new(crate::builtins::builtin("/", builtin_div))));
    env.define(Rc::from("%"), Value::Proc(Rc::new(crate::builtins::builtin("%", builtin_mod))));
    env.define(Rc::from(">"), Value::Proc(Rc::new(crate::builtins::builtin(">", builtin_gt))));
    env.define(
        Rc::from("even?"),
        Value::Proc(Rc::new(crate::builtins::builtin("even?", builtin_even))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Rc<Environment> {
        Environment::new()
    }

    #[test]
    fn add_sums_all_arguments() {
        let e = env();
        assert_eq!(
            builtin_add(&[Value::Int(1), Value::Int(2), Value::Int(3)], &e)
                .unwrap()
                .as_int(),
            Some(6)
        );
    }

    #[test]
    fn sub_requires_at_least_two_args() {
        let e = env();
        assert!(builtin_sub(&[Value::Int(1)], &e).is_err());
    }

    #[test]
    fn div_by_zero_is_a_catchable_error() {
        let e = env();
        let err = builtin_div(&[Value::Int(4), Value::Int(0)], &e).unwrap_err();
        assert!(err.payload().is_some());
    }

    #[test]
    fn even_predicate() {
        let e = env();
        assert!(matches!(builtin_even(&[Value::Int(4)], &e), Ok(Value::True)));
        assert!(matches!(builtin_even(&[Value::Int(3)], &e), Ok(Value::False)));
    }
}
