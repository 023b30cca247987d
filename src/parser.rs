// ABOUTME: Reader module for parsing Lisp source text into value trees using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{map, not, opt, peek, recognize, value},
    multi::many0,
    IResult, Parser,
};

use crate::error::EvalError;
use crate::value::{PList, Value};

/// Skip a `;` line comment.
fn parse_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

/// Skip whitespace and comments between tokens.
fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), parse_comment)))
        .map(|_| ())
        .parse(input)
}

/// `-?[0-9]+`, parsed into an `i32`.
fn parse_int(input: &str) -> IResult<&str, Value> {
    map(
        recognize((opt(char('-')), digit1)),
        |digits: &str| Value::Int(digits.parse().expect("digit1 guarantees a parseable integer")),
    )
    .parse(input)
}

/// Characters that end a symbol token: whitespace plus the delimiter set
/// `()[]{}'"`,;` — everything else (`.`, `:`, `#`, `@`, ...) is legal inside
/// a symbol.
const SYMBOL_DELIMITERS: &str = " \t\n\r()[]{}'\"`,;";

/// Any run of non-delimiter characters is a symbol.
fn parse_symbol(input: &str) -> IResult<&str, Value> {
    let (input, name) =
        take_while1::<_, _, nom::error::Error<_>>(|c: char| !SYMBOL_DELIMITERS.contains(c))(
            input,
        )?;
    Ok((input, Value::symbol(name)))
}

/// `"..."` with `\n \t \\ \"` escapes.
fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"')(input)?;

    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Value::string("")));
    }

    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\nt"))(input)?;
    let (input, _) = char('"')(input)?;

    let mut result = String::new();
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    Ok((input, Value::string(result)))
}

/// `'X` -> `(quote X)`
fn parse_quote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, Value::list(vec![Value::symbol("quote"), expr])))
}

/// `` `X `` -> `(quasiquote X)`
fn parse_quasiquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('`')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((
        input,
        Value::list(vec![Value::symbol("quasiquote"), expr]),
    ))
}

/// `~X` -> `(unquote X)`, `~@X` -> `(splice-unquote X)`
fn parse_unquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('~')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('@')(input) {
        let (input, expr) = parse_expr(input)?;
        Ok((
            input,
            Value::list(vec![Value::symbol("splice-unquote"), expr]),
        ))
    } else {
        let (input, expr) = parse_expr(input)?;
        Ok((input, Value::list(vec![Value::symbol("unquote"), expr])))
    }
}

/// `(e1 e2 ...)`. The empty list is its own distinct value, never `Nil`.
fn parse_list(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('(')(input)?;
    let (input, _) = ws_and_comments(input)?;

    let mut items = Vec::new();
    let mut remaining = input;
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(')')(remaining) {
            return Ok((rest, Value::List(PList::from_vec(items))));
        }
        let (rest, expr) = parse_expr(remaining)?;
        items.push(expr);
        let (rest, _) = ws_and_comments(rest)?;
        remaining = rest;
    }
}

fn parse_expr(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws_and_comments(input)?;
    alt((
        parse_quote,
        parse_quasiquote,
        parse_unquote,
        parse_list,
        parse_int,
        parse_string,
        parse_symbol,
    ))
    .parse(input)
}

/// Parses exactly one top-level form, erroring on anything left over besides
/// trailing whitespace/comments. Backs `read-string`.
pub fn parse_one(input: &str) -> Result<Value, EvalError> {
    match parse_expr(input) {
        Ok((rest, value)) => {
            let (rest, _) = ws_and_comments(rest).unwrap_or((rest, ()));
            if rest.is_empty() {
                Ok(value)
            } else {
                Err(EvalError::Read(format!(
                    "unexpected trailing input: '{rest}'"
                )))
            }
        }
        Err(e) => Err(EvalError::Read(format!("{e:?}"))),
    }
}

/// Parses every top-level form in `input`, in order. Backs the REPL and
/// script-file driver, which evaluate one form at a time.
pub fn parse_all(input: &str) -> Result<Vec<Value>, EvalError> {
    let mut forms = Vec::new();
    let mut remaining = input;
    loop {
        let (rest, _) = ws_and_comments(remaining).unwrap_or((remaining, ()));
        if rest.is_empty() {
            return Ok(forms);
        }
        let (rest, expr) = parse_expr(rest).map_err(|e| EvalError::Read(format!("{e:?}")))?;
        forms.push(expr);
        remaining = rest;
    }
}
