//! Core library: the fixed table of built-in procedures bound into the
//! global environment at startup, organized into one module per category.
//!
//! - **[arithmetic]**: `+ - * / % > even?`
//! - **[comparison]**: `=`
//! - **[predicates]**: `list? empty? symbol? string? true? false? procedure? builtin? atom? macro? exn?`
//! - **[introspection]**: `type arity env addr refc`
//! - **[lists]**: `list count list-ref nth list-rest rest cons concat`
//! - **[strings]**: `pr-str str prn println`
//! - **[symbols]**: `symbol`
//! - **[atoms]**: `atom deref reset! swap!`
//! - **[exceptions]**: `exn exn-datum throw`
//! - **[meta]**: `apply read-string slurp eval map`
//!
//! `true`, `false`, and `nil` are also bound here, as ordinary global
//! identifiers resolving to their singleton values (the reader treats them
//! as plain symbols, not literals).

use crate::env::Environment;
use crate::value::{BuiltinFn, ProcKind, Procedure};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub mod arithmetic;
pub mod atoms;
pub mod comparison;
pub mod exceptions;
pub mod introspection;
pub mod lists;
pub mod meta;
pub mod predicates;
pub mod strings;
pub mod symbols;

/// Wraps a native function pointer as a named, non-macro `Procedure`.
pub fn builtin(name: &'static str, func: BuiltinFn) -> Procedure {
    Procedure {
        name: RefCell::new(None),
        is_macro: Cell::new(false),
        kind: ProcKind::Builtin {
            func,
            builtin_name: name,
        },
    }
}

pub fn register_builtins(env: &Rc<Environment>) {
    env.define(Rc::from("true"), crate::value::Value::True);
    env.define(Rc::from("false"), crate::value::Value::False);
    env.define(Rc::from("nil"), crate::value::Value::Nil);

    arithmetic::register(env);
    comparison::register(env);
    predicates::register(env);
    introspection::register(env);
    lists::register(env);
    strings::register(env);
    symbols::register(env);
    atoms::register(env);
    exceptions::register(env);
    meta::register(env);
}
