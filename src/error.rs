//! Error types for the reader and evaluator.
//!
//! `Thrown` is the only catchable variant (`try*`/`catch*`) — it carries the
//! value that was thrown, whether by user code calling `throw` or by the
//! evaluator synthesizing a type/arity/unbound-symbol condition as a string
//! payload. `Read`/`Syntax`/`Fatal` are host-level failures the language
//! itself has no handler for; the REPL driver reports them and moves on.

use crate::value::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("{0}")]
    Thrown(Value),

    #[error("read error: {0}")]
    Read(String),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("fatal: {0}")]
    Fatal(String),
}

impl EvalError {
    pub fn thrown(message: impl Into<String>) -> Self {
        EvalError::Thrown(Value::string(message.into()))
    }

    pub fn unbound_symbol(name: &str) -> Self {
        EvalError::thrown(format!("'{name}' not found"))
    }

    pub fn arity(function: &str, expected: impl std::fmt::Display, actual: usize) -> Self {
        EvalError::thrown(format!(
            "{function}: expected {expected} argument(s), got {actual}"
        ))
    }

    pub fn type_error(function: &str, expected: &str, actual: &Value) -> Self {
        EvalError::thrown(format!(
            "{function}: expected {expected}, got {}",
            actual.type_name()
        ))
    }

    pub fn not_callable(actual: &Value) -> Self {
        EvalError::thrown(format!(
            "value is not callable: {}",
            actual.type_name()
        ))
    }

    pub fn custom(function: &str, message: impl std::fmt::Display) -> Self {
        EvalError::thrown(format!("{function}: {message}"))
    }

    /// `None` for `Read`/`Syntax`/`Fatal` — those are not catchable by `try*`.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            EvalError::Thrown(v) => Some(v),
            _ => None,
        }
    }
}
