// ABOUTME: Evaluator module for executing parsed Lisp expressions
//
// Special forms (closed set, never shadowable by a same-named macro):
//
//   (def! SYM EXPR)              bind SYM to EXPR's value in this frame
//   (defmacro! SYM FN-EXPR)      like def!, but flags the procedure a macro
//   (let* (SYM EXPR ...) BODY)   sequential bindings, then eval BODY
//   (if COND THEN [ELSE])        ELSE defaults to nil
//   (do EXPR ...)                eval in order, return the last
//   (fn* (PARAM ... [& REST]) BODY ...)   build a closure
//   (quote EXPR)                 return EXPR unevaluated
//   (quasiquote EXPR)            reshape EXPR, splicing unquotes
//   (macroexpand EXPR)           expand EXPR as a macro call, to a fixed point
//   (try* EXPR (catch* SYM HANDLER))      catch a thrown value
//
// `unquote`/`splice-unquote` are only meaningful inside `quasiquote`, which
// rewrites them structurally without going through this dispatcher; used
// anywhere else they are ordinary (unbound) symbols.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{PList, ProcKind, Procedure, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const SPECIAL_FORMS: &[&str] = &[
    "def!",
    "defmacro!",
    "let*",
    "if",
    "do",
    "fn*",
    "quote",
    "quasiquote",
    "macroexpand",
    "try*",
];

fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains(&name)
}

/// Evaluates `ast` in `env`. Tail positions (the selected arm of `if`, the
/// last expression of `do`/`let*`, and application of a named language-level
/// procedure) are handled by mutating `ast`/`env` and looping rather than
/// recursing, so deep self-recursion does not grow the Rust stack.
pub fn eval(ast: Value, env: Rc<Environment>) -> Result<Value, EvalError> {
    let mut ast = ast;
    let mut env = env;
    loop {
        let list = match &ast {
            Value::Symbol(name) => return env.get_or_unbound(name),
            Value::List(l) => l.clone(),
            other => return Ok(other.clone()),
        };
        if list.is_empty() {
            return Ok(Value::List(list));
        }

        let expanded = macroexpand(Value::List(list), &env)?;
        let list = match expanded {
            Value::List(l) => l,
            other => return Ok(other),
        };
        if list.is_empty() {
            return Ok(Value::List(list));
        }

        let items = list.to_vec();
        let head = items[0].clone();

        if let Value::Symbol(name) = &head {
            match name.as_ref() {
                "def!" => return eval_def(&items, &env),
                "defmacro!" => return eval_defmacro(&items, &env),
                "let*" => {
                    let (child, body) = eval_let(&items, &env)?;
                    env = child;
                    ast = body;
                    continue;
                }
                "if" => {
                    ast = eval_if(&items, &env)?;
                    continue;
                }
                "do" => match eval_do(&items, &env)? {
                    Some(last) => {
                        ast = last;
                        continue;
                    }
                    None => return Ok(Value::Nil),
                },
                "fn*" => return eval_fn_star(&items, &env),
                "quote" => return eval_quote(&items),
                "quasiquote" => return eval_quasiquote(&items, &env),
                "macroexpand" => {
                    if items.len() != 2 {
                        return Err(EvalError::Syntax(
                            "macroexpand requires exactly 1 argument".into(),
                        ));
                    }
                    return macroexpand(items[1].clone(), &env);
                }
                "try*" => return eval_try_star(&items, &env),
                _ => {}
            }
        }

        let proc_val = eval(head, env.clone())?;
        let proc = match proc_val.as_proc() {
            Some(p) => p.clone(),
            None => return Err(EvalError::not_callable(&proc_val)),
        };

        let mut args = Vec::with_capacity(items.len().saturating_sub(1));
        for item in &items[1..] {
            args.push(eval(item.clone(), env.clone())?);
        }
        check_arity(&proc, args.len())?;

        // Only named, language-defined procedures participate in TCO;
        // builtins and anonymous lambdas apply through a fresh Rust stack
        // frame (eval_body / the builtin call below).
        let tail_eligible =
            matches!(&proc.kind, ProcKind::Lambda { .. }) && proc.name.borrow().is_some();

        match &proc.kind {
            ProcKind::Builtin { func, .. } => return func(&args, &env),
            ProcKind::Lambda {
                params,
                variadic,
                body,
                env: closure_env,
            } => {
                let call_env = bind_params(params, *variadic, &args, closure_env.clone())?;
                if !tail_eligible {
                    return eval_body(body, &call_env);
                }
                if body.is_empty() {
                    return Ok(Value::Nil);
                }
                for expr in &body[..body.len() - 1] {
                    eval(expr.clone(), call_env.clone())?;
                }
                ast = body[body.len() - 1].clone();
                env = call_env;
            }
        }
    }
}

/// Expands `ast` as a macro call, to a fixed point: the head symbol must
/// resolve (and not be a special form) to a macro-flagged procedure, which is
/// applied to the unevaluated tail; repeats until the head no longer names a
/// macro. A no-op for anything that isn't currently a macro call.
pub fn macroexpand(mut ast: Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    loop {
        let list = match &ast {
            Value::List(l) if !l.is_empty() => l.clone(),
            _ => return Ok(ast),
        };
        let name = match list.head().and_then(|h| h.as_symbol()) {
            Some(n) if !is_special_form(n) => n.to_string(),
            _ => return Ok(ast),
        };
        let proc = match env.get(&name) {
            Some(v) => match v.as_proc() {
                Some(p) if p.is_macro.get() => p.clone(),
                _ => return Ok(ast),
            },
            None => return Ok(ast),
        };
        let args: Vec<Value> = list.iter().skip(1).collect();
        ast = apply_procedure(&proc, args, env)?;
    }
}

/// General-purpose, non-tail application entry point used by `macroexpand`
/// and by builtins (`apply`, `map`, `swap!`) that need to re-enter the
/// evaluator with an already-evaluated argument list.
pub fn apply_procedure(
    proc: &Rc<Procedure>,
    args: Vec<Value>,
    env: &Rc<Environment>,
) -> Result<Value, EvalError> {
    check_arity(proc, args.len())?;
    match &proc.kind {
        ProcKind::Builtin { func, .. } => func(&args, env),
        ProcKind::Lambda {
            params,
            variadic,
            body,
            env: closure_env,
        } => {
            let call_env = bind_params(params, *variadic, &args, closure_env.clone())?;
            eval_body(body, &call_env)
        }
    }
}

/// Like [`apply_procedure`] but takes an arbitrary `Value`, failing with
/// `not_callable` if it isn't a procedure.
pub fn apply_value(callee: &Value, args: Vec<Value>, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let proc = callee.as_proc().ok_or_else(|| EvalError::not_callable(callee))?;
    apply_procedure(proc, args, env)
}

fn eval_body(body: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut result = Value::Nil;
    for expr in body {
        result = eval(expr.clone(), env.clone())?;
    }
    Ok(result)
}

fn bind_params(
    params: &[Rc<str>],
    variadic: bool,
    args: &[Value],
    closure_env: Rc<Environment>,
) -> Result<Rc<Environment>, EvalError> {
    let call_env = Environment::with_parent(closure_env);
    if variadic {
        let fixed = params.len() - 1;
        for (p, a) in params[..fixed].iter().zip(args.iter()) {
            call_env.define(p.clone(), a.clone());
        }
        call_env.define(params[fixed].clone(), Value::list(args[fixed..].to_vec()));
    } else {
        for (p, a) in params.iter().zip(args.iter()) {
            call_env.define(p.clone(), a.clone());
        }
    }
    Ok(call_env)
}

fn check_arity(proc: &Rc<Procedure>, actual: usize) -> Result<(), EvalError> {
    // Builtins police their own arity; only language-defined procedures
    // carry arity metadata on the Procedure itself.
    if matches!(proc.kind, ProcKind::Builtin { .. }) {
        return Ok(());
    }
    let argc = proc.argc();
    let name = proc
        .display_name()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "#<procedure>".to_string());
    if proc.variadic() {
        if actual < argc {
            return Err(EvalError::arity(&name, format!("at least {argc}"), actual));
        }
    } else if actual != argc {
        return Err(EvalError::arity(&name, argc, actual));
    }
    Ok(())
}

fn eval_def(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() != 3 {
        return Err(EvalError::Syntax("def! requires exactly 2 arguments".into()));
    }
    let name = items[1]
        .as_symbol()
        .ok_or_else(|| EvalError::Syntax("def! first argument must be a symbol".into()))?;
    let value = eval(items[2].clone(), env.clone())?;
    adopt_name_if_unnamed(&value, name);
    env.define(Rc::from(name), value.clone());
    Ok(value)
}

fn eval_defmacro(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() != 3 {
        return Err(EvalError::Syntax(
            "defmacro! requires exactly 2 arguments".into(),
        ));
    }
    let name = items[1]
        .as_symbol()
        .ok_or_else(|| EvalError::Syntax("defmacro! first argument must be a symbol".into()))?;
    let value = eval(items[2].clone(), env.clone())?;
    let proc = value.as_proc().ok_or_else(|| {
        EvalError::Syntax("defmacro! second argument must evaluate to a procedure".into())
    })?;
    if !matches!(proc.kind, ProcKind::Lambda { .. }) {
        return Err(EvalError::Syntax(
            "defmacro! requires a fn*-built procedure, not a builtin".into(),
        ));
    }
    proc.is_macro.set(true);
    adopt_name_if_unnamed(&value, name);
    env.define(Rc::from(name), value.clone());
    Ok(value)
}

fn adopt_name_if_unnamed(value: &Value, name: &str) {
    if let Some(proc) = value.as_proc() {
        if proc.name.borrow().is_none() {
            *proc.name.borrow_mut() = Some(Rc::from(name));
        }
    }
}

fn eval_let(items: &[Value], env: &Rc<Environment>) -> Result<(Rc<Environment>, Value), EvalError> {
    if items.len() != 3 {
        return Err(EvalError::Syntax("let* requires exactly 2 arguments".into()));
    }
    let bindings = items[1]
        .as_list()
        .ok_or_else(|| EvalError::Syntax("let* bindings must be a list".into()))?
        .to_vec();
    if bindings.len() % 2 != 0 {
        return Err(EvalError::Syntax(
            "let* bindings must have an even number of elements".into(),
        ));
    }
    let child = Environment::with_parent(env.clone());
    let mut i = 0;
    while i < bindings.len() {
        let name = bindings[i]
            .as_symbol()
            .ok_or_else(|| EvalError::Syntax("let* binding name must be a symbol".into()))?;
        let value = eval(bindings[i + 1].clone(), child.clone())?;
        child.define(Rc::from(name), value);
        i += 2;
    }
    Ok((child, items[2].clone()))
}

fn eval_if(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() != 3 && items.len() != 4 {
        return Err(EvalError::Syntax("if requires 2 or 3 arguments".into()));
    }
    let cond = eval(items[1].clone(), env.clone())?;
    if cond.is_truthy() {
        Ok(items[2].clone())
    } else if items.len() == 4 {
        Ok(items[3].clone())
    } else {
        Ok(Value::Nil)
    }
}

fn eval_do(items: &[Value], env: &Rc<Environment>) -> Result<Option<Value>, EvalError> {
    if items.len() == 1 {
        return Ok(None);
    }
    for item in &items[1..items.len() - 1] {
        eval(item.clone(), env.clone())?;
    }
    Ok(Some(items[items.len() - 1].clone()))
}

fn eval_fn_star(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() < 3 {
        return Err(EvalError::Syntax(
            "fn* requires a parameter list and at least one body expression".into(),
        ));
    }
    let params_list = items[1]
        .as_list()
        .ok_or_else(|| EvalError::Syntax("fn* parameters must be a list".into()))?;
    let raw_params = params_list
        .iter()
        .map(|v| {
            v.as_symbol()
                .map(Rc::from)
                .ok_or_else(|| EvalError::Syntax("fn* parameter names must be symbols".into()))
        })
        .collect::<Result<Vec<Rc<str>>, EvalError>>()?;
    let (params, variadic) = split_variadic(raw_params)?;
    let body = items[2..].to_vec();
    Ok(Value::Proc(Rc::new(Procedure {
        name: RefCell::new(None),
        is_macro: Cell::new(false),
        kind: ProcKind::Lambda {
            params,
            variadic,
            body,
            env: env.clone(),
        },
    })))
}

fn split_variadic(params: Vec<Rc<str>>) -> Result<(Vec<Rc<str>>, bool), EvalError> {
    match params.iter().position(|p| &**p == "&") {
        None => Ok((params, false)),
        Some(pos) if pos == params.len() - 2 => {
            let mut out = params[..pos].to_vec();
            out.push(params[pos + 1].clone());
            Ok((out, true))
        }
        Some(_) => Err(EvalError::Syntax(
            "'&' must be followed by exactly one rest parameter".into(),
        )),
    }
}

fn eval_quote(items: &[Value]) -> Result<Value, EvalError> {
    if items.len() != 2 {
        return Err(EvalError::Syntax("quote requires exactly 1 argument".into()));
    }
    Ok(items[1].clone())
}

fn eval_quasiquote(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() != 2 {
        return Err(EvalError::Syntax(
            "quasiquote requires exactly 1 argument".into(),
        ));
    }
    if let Value::List(inner) = &items[1] {
        let inner_items = inner.to_vec();
        if inner_items.len() == 2 && inner_items[0].as_symbol() == Some("splice-unquote") {
            return Err(EvalError::Syntax(
                "splice-unquote is not valid as the entire quasiquote argument".into(),
            ));
        }
    }
    quasiquote_expand(&items[1], env)
}

fn quasiquote_expand(ast: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let list = match ast {
        Value::List(l) if !l.is_empty() => l,
        other => return Ok(other.clone()),
    };
    let items = list.to_vec();

    if let Some(name) = items[0].as_symbol() {
        if name == "unquote" {
            if items.len() != 2 {
                return Err(EvalError::Syntax("unquote requires exactly 1 argument".into()));
            }
            return eval(items[1].clone(), env.clone());
        }
    }

    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        if let Value::List(inner) = item {
            let inner_items = inner.to_vec();
            if inner_items.len() == 2 && inner_items[0].as_symbol() == Some("splice-unquote") {
                let spliced = eval(inner_items[1].clone(), env.clone())?;
                let spliced_list = spliced
                    .as_list()
                    .ok_or_else(|| EvalError::type_error("splice-unquote", "list", &spliced))?;
                out.extend(spliced_list.iter());
                continue;
            }
        }
        out.push(quasiquote_expand(item, env)?);
    }
    Ok(Value::list(out))
}

fn eval_try_star(items: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if items.len() != 2 && items.len() != 3 {
        return Err(EvalError::Syntax("try* requires 1 or 2 arguments".into()));
    }
    if items.len() == 2 {
        return eval(items[1].clone(), env.clone());
    }
    let catch_items = items[2]
        .as_list()
        .ok_or_else(|| EvalError::Syntax("try* catch clause must be a list".into()))?
        .to_vec();
    if catch_items.len() != 3 || catch_items[0].as_symbol() != Some("catch*") {
        return Err(EvalError::Syntax(
            "try* second argument must be a (catch* binding body) form".into(),
        ));
    }
    let binding = catch_items[1]
        .as_symbol()
        .ok_or_else(|| EvalError::Syntax("catch* binding must be a symbol".into()))?;

    match eval(items[1].clone(), env.clone()) {
        Ok(v) => Ok(v),
        Err(EvalError::Thrown(payload)) => {
            let catch_env = Environment::with_parent(env.clone());
            catch_env.define(Rc::from(binding), payload);
            eval(catch_items[2].clone(), catch_env)
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_one;

    fn run(src: &str, env: &Rc<Environment>) -> Value {
        eval(parse_one(src).unwrap(), env.clone()).unwrap_or_else(|e| panic!("{src}: {e}"))
    }

    fn base_env() -> Rc<Environment> {
        let env = Environment::new();
        crate::builtins::register_builtins(&env);
        env
    }

    #[test]
    fn self_evaluating_values() {
        let env = base_env();
        assert_eq!(run("42", &env).as_int(), Some(42));
        assert_eq!(run("\"hi\"", &env).as_str(), Some("hi"));
        assert!(matches!(run("nil", &env), Value::Nil));
        assert!(matches!(run("true", &env), Value::True));
        assert!(matches!(run("()", &env), Value::List(_)));
    }

    #[test]
    fn quote_returns_identity() {
        let env = base_env();
        let v = run("'(1 2 3)", &env);
        assert_eq!(v.as_list().unwrap().len(), 3);
    }

    #[test]
    fn def_and_lookup() {
        let env = base_env();
        run("(def! x 10)", &env);
        assert_eq!(run("x", &env).as_int(), Some(10));
    }

    #[test]
    fn def_adopts_name_of_unnamed_lambda() {
        let env = base_env();
        run("(def! square (fn* (x) (* x x)))", &env);
        let v = env.get("square").unwrap();
        assert_eq!(v.pr_str(true), "#<procedure:square>");
    }

    #[test]
    fn lambda_application_and_closures() {
        let env = base_env();
        run("(def! make-adder (fn* (n) (fn* (x) (+ x n))))", &env);
        run("(def! add5 (make-adder 5))", &env);
        assert_eq!(run("(add5 10)", &env).as_int(), Some(15));
    }

    #[test]
    fn arity_mismatch_is_thrown_and_catchable() {
        let env = base_env();
        run("(def! f (fn* (a b) (+ a b)))", &env);
        let v = run("(try* (f 1) (catch* e e))", &env);
        assert!(v.as_str().is_some());
    }

    #[test]
    fn tail_recursion_does_not_overflow_the_stack() {
        let env = base_env();
        run(
            "(def! count-down (fn* (n) (if (= n 0) 0 (count-down (- n 1)))))",
            &env,
        );
        assert_eq!(run("(count-down 200000)", &env).as_int(), Some(0));
    }

    #[test]
    fn let_star_sequential_bindings() {
        let env = base_env();
        assert_eq!(run("(let* (a 1 b (+ a 1)) (+ a b))", &env).as_int(), Some(3));
    }

    #[test]
    fn quasiquote_unquote_and_splicing() {
        let env = base_env();
        run("(def! lst (list 2 3))", &env);
        let v = run("`(1 ~@lst 4)", &env);
        let items = v.as_list().unwrap().to_vec();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].as_int(), Some(1));
        assert_eq!(items[3].as_int(), Some(4));
    }

    #[test]
    fn quasiquote_without_unquote_is_quote() {
        let env = base_env();
        let a = run("`(1 2 3)", &env);
        let b = run("'(1 2 3)", &env);
        assert_eq!(a.pr_str(true), b.pr_str(true));
    }

    #[test]
    fn nested_quasiquote_still_evaluates_inner_unquote() {
        let env = base_env();
        let v = run("`(1 `(2 ~(+ 1 2)))", &env);
        assert_eq!(v.pr_str(true), "(1 (quasiquote (2 3)))");
    }

    #[test]
    fn bare_splice_unquote_argument_is_a_syntax_error() {
        let env = base_env();
        let err = eval(parse_one("`~@(list 1 2)").unwrap(), env);
        assert!(matches!(err, Err(EvalError::Syntax(_))));
    }

    #[test]
    fn defmacro_and_expansion_idempotence() {
        let env = base_env();
        run(
            "(defmacro! unless (fn* (pred a b) `(if ~pred ~b ~a)))",
            &env,
        );
        assert_eq!(run("(unless false 1 2)", &env).as_int(), Some(1));
        let once = run("(macroexpand (unless false 1 2))", &env);
        let twice = eval(
            crate::parser::parse_one("(macroexpand (unless false 1 2))").unwrap(),
            env.clone(),
        )
        .unwrap();
        // a macro that expands to a non-macro-call form reaches a fixed
        // point in one step
        assert_eq!(once.pr_str(true), twice.pr_str(true));
    }

    #[test]
    fn try_catch_catches_thrown_value() {
        let env = base_env();
        let v = run(r#"(try* (throw "boom") (catch* e (str "caught:" e)))"#, &env);
        assert_eq!(v.as_str(), Some("caught:boom"));
    }

    #[test]
    fn atom_identity_across_aliases() {
        let env = base_env();
        run("(def! a (atom 1))", &env);
        run("(def! b a)", &env);
        run("(reset! a 2)", &env);
        assert_eq!(run("(deref b)", &env).as_int(), Some(2));
    }

    #[test]
    fn special_forms_cannot_be_shadowed_by_macros() {
        let env = base_env();
        // `if` is never looked up as a macro even though this binds a
        // same-named macro-flagged procedure.
        run("(defmacro! if (fn* (a b c) 99))", &env);
        assert_eq!(run("(if true 1 2)", &env).as_int(), Some(1));
    }
}
