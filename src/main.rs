use clap::{App, Arg, ArgMatches};
use serpent::interpreter::DEFAULT_MAX_CALL_DEPTH;
use serpent::repl::{self, Mode, Outcome, Session};
use std::fs;
use std::io;
use std::process;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid value for --max-depth: {0:?}")]
    Usage(String),
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{}", tabbed(.0))]
    Parse(Vec<String>),
    #[error("{0}")]
    Runtime(String),
}

fn tabbed(errors: &[String]) -> String {
    errors
        .iter()
        .map(|error| format!("\t{}", error))
        .collect::<Vec<String>>()
        .join("\n")
}

impl CliError {
    // sysexits.h
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 64,
            CliError::Parse(_) => 65,
            CliError::Runtime(_) => 70,
            CliError::Read { .. } | CliError::Io(_) => 74,
        }
    }
}

fn main() {
    serpent::init_tracing();
    let matches = App::new("serpent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interpreter for a small Python-flavored language")
        .arg(
            Arg::with_name("SCRIPT")
                .help("Source file to run; starts the prompt when omitted")
                .index(1),
        )
        .arg(
            Arg::with_name("tokens")
                .long("tokens")
                .help("Print the token stream instead of evaluating"),
        )
        .arg(
            Arg::with_name("ast")
                .long("ast")
                .conflicts_with("tokens")
                .help("Print the parsed tree instead of evaluating"),
        )
        .arg(
            Arg::with_name("max-depth")
                .long("max-depth")
                .value_name("N")
                .takes_value(true)
                .help("Maximum nesting of function calls"),
        )
        .get_matches();

    if let Err(error) = run(&matches) {
        eprintln!("{}", error);
        process::exit(error.exit_code());
    }
}

fn run(matches: &ArgMatches) -> Result<(), CliError> {
    let mode = if matches.is_present("tokens") {
        Mode::Tokens
    } else if matches.is_present("ast") {
        Mode::Ast
    } else {
        Mode::Evaluate
    };
    let max_call_depth = match matches.value_of("max-depth") {
        None => DEFAULT_MAX_CALL_DEPTH,
        Some(text) => text
            .parse()
            .map_err(|_| CliError::Usage(text.to_string()))?,
    };
    let mut session = Session::new(mode).with_max_call_depth(max_call_depth);
    match matches.value_of("SCRIPT") {
        Some(path) => run_file(path, &mut session),
        None => run_prompt(&mut session),
    }
}

fn run_file(path: &str, session: &mut Session) -> Result<(), CliError> {
    let source = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })?;
    match session.run(&source) {
        Outcome::Errors(errors) => Err(CliError::Parse(errors)),
        Outcome::Value(value) if value.is_error() => Err(CliError::Runtime(value.inspect())),
        Outcome::Value(value) => {
            print!("{}", value.inspect());
            Ok(())
        }
        Outcome::Listing(listing) => {
            println!("{}", listing);
            Ok(())
        }
    }
}

fn run_prompt(session: &mut Session) -> Result<(), CliError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    repl::run_prompt(stdin.lock(), stdout.lock(), session)?;
    Ok(())
}
