mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod parser;
mod value;

use builtins::register_builtins;
use clap::Parser;
use config::{DEFAULT_HISTORY_FILE, PRELUDE_SOURCE, PROMPT, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use env::Environment;
use error::EvalError;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

/// A Make-a-Lisp-tradition Lisp interpreter
#[derive(Parser, Debug)]
#[command(name = "mal-rs")]
#[command(version = config::VERSION)]
#[command(about = "A Make-a-Lisp-tradition Lisp interpreter")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Disable history persistence
    #[arg(long = "no-history")]
    no_history: bool,

    /// Path to the history file
    #[arg(long = "history-file", value_name = "PATH", default_value = DEFAULT_HISTORY_FILE)]
    history_file: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    let env = Environment::new();
    register_builtins(&env);
    load_prelude(&env);

    if let Some(script_path) = &args.script {
        return run_script(script_path, &env);
    }

    run_repl(&env, &args)
}

/// A missing or unparseable prelude is a startup warning, not fatal — the
/// builtins alone still make a usable interpreter.
fn load_prelude(env: &Rc<Environment>) {
    match parser::parse_all(PRELUDE_SOURCE) {
        Ok(forms) => {
            for form in forms {
                if let Err(e) = eval::eval(form, env.clone()) {
                    log::warn!("prelude evaluation failed: {e}");
                    return;
                }
            }
        }
        Err(e) => log::warn!("prelude failed to parse: {e}"),
    }
}

fn run_script(path: &PathBuf, env: &Rc<Environment>) -> ExitCode {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("cannot read {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };
    let forms = match parser::parse_all(&contents) {
        Ok(forms) => forms,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    for form in forms {
        if let Err(e) = eval::eval(form, env.clone()) {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn run_repl(env: &Rc<Environment>, args: &CliArgs) -> ExitCode {
    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("fatal: failed to initialize the line editor: {e}");
            return ExitCode::FAILURE;
        }
    };

    if !args.no_history && rl.load_history(&args.history_file).is_err() {
        log::warn!("no history file at {}", args.history_file.display());
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if !args.no_history {
                    let _ = rl.add_history_entry(&line);
                }
                match parser::parse_one(&line) {
                    Ok(ast) => match eval::eval(ast, env.clone()) {
                        Ok(result) => println!("{}", result.pr_str(true)),
                        Err(e) => report(&e),
                    },
                    Err(e) => report(&e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("goodbye");
                break;
            }
            Err(e) => {
                eprintln!("fatal: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if !args.no_history {
        if let Err(e) = rl.save_history(&args.history_file) {
            log::warn!("could not save history to {}: {e}", args.history_file.display());
        }
    }

    ExitCode::SUCCESS
}

fn report(err: &EvalError) {
    eprintln!("{err}");
}
