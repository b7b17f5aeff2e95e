pub mod ast;
pub mod callable;
pub mod environment;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod repl;
pub mod scanner;
pub mod token;

mod builtins;
mod shared_list;
mod stack;

use std::sync::Once;

pub use crate::ast::Program;
pub use crate::environment::Environment;
pub use crate::interpreter::Interpreter;
pub use crate::object::Object;

/// Parses a complete source text. Statements that fail to parse are left out
/// of the program and described in the returned error list, in order.
pub fn parse(source: &str) -> (Program, Vec<String>) {
    let mut parser = parser::Parser::new(source);
    let program = parser.parse_program();
    (program, parser.errors())
}

/// Evaluates `program` against `env`. Bindings it creates stay in `env`.
pub fn evaluate(program: &Program, env: &Environment) -> Object {
    Interpreter::new(env.clone()).eval(program)
}

pub fn new_environment() -> Environment {
    Environment::new()
}

pub fn new_child_environment(parent: &Environment) -> Environment {
    parent.new_child()
}

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `RUST_LOG`. Does nothing when the
/// variable is unset, and only the first call has any effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
