//! Symbol construction: `symbol`

use crate::builtins::builtin;
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

pub fn builtin_symbol(args: &[Value], _env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("symbol", 1, args.len()));
    }
    let name = args[0]
        .as_str()
        .ok_or_else(|| EvalError::type_error("symbol", "string", &args[0]))?;
    Ok(Value::symbol(name))
}

pub fn register(env: &Rc<Environment>) {
    env.define(Rc::from("symbol"), Value::Proc(Rc::new(builtin("symbol", builtin_symbol))));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_symbol_from_a_string() {
        let env = Environment::new();
        let v = builtin_symbol(&[Value::string("foo")], &env).unwrap();
        assert_eq!(v.as_symbol(), Some("foo"));
    }
}
