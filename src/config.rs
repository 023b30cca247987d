// ABOUTME: Configuration and constants for the Lisp interpreter

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "mal-rs";
pub const WELCOME_SUBTITLE: &str = "a Make-a-Lisp interpreter with TCO, macros, and quasiquote";

pub const PROMPT: &str = "user> ";
pub const DEFAULT_HISTORY_FILE: &str = ".mal_history";

pub const PRELUDE_SOURCE: &str = include_str!("stdlib/core.mal");
