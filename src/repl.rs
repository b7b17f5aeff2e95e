use crate::ast::AstPrinter;
use crate::interpreter::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
use crate::object::{Object, NULL};
use crate::scanner::scan_tokens;
use crate::{parse, Environment};
use std::io::{self, BufRead, Write};
use std::mem;
use tracing::debug;

pub const PROMPT: &str = ">> ";
pub const CONTINUATION_PROMPT: &str = ".. ";

/// Indentation added after a block header.
const INDENT_WIDTH: usize = 4;

/// What a session does with each unit of source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Evaluate,
    Tokens,
    Ast,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(Object),
    Listing(String),
    Errors(Vec<String>),
}

/// Groups prompt lines into units. A block header (a line ending in `:`)
/// starts a multi-line unit that runs until a blank line; any other line
/// arriving with nothing buffered is a unit by itself.
#[derive(Debug, Default)]
pub struct UnitBuffer {
    lines: Vec<String>,
    indent: usize,
}

impl UnitBuffer {
    pub fn new() -> UnitBuffer {
        UnitBuffer::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Indentation the next line of the pending unit is expected to have.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Adds a line, returning a unit once one is complete.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end();
        let blank = line.trim_start().is_empty();
        if self.lines.is_empty() {
            if blank {
                return None;
            }
            if !line.ends_with(':') {
                return Some(line.to_string());
            }
        } else if blank {
            return Some(self.take());
        }
        let leading = line.len() - line.trim_start().len();
        self.indent = if line.ends_with(':') {
            leading + INDENT_WIDTH
        } else {
            leading
        };
        self.lines.push(line.to_string());
        None
    }

    /// Empties the buffer, returning whatever was pending.
    pub fn take(&mut self) -> String {
        self.indent = 0;
        mem::take(&mut self.lines).join("\n")
    }
}

/// Evaluation state shared by every unit of one prompt or file run.
pub struct Session {
    mode: Mode,
    environment: Environment,
    max_call_depth: usize,
}

impl Session {
    pub fn new(mode: Mode) -> Session {
        Session {
            mode,
            environment: Environment::new(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Session {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn run(&mut self, source: &str) -> Outcome {
        match self.mode {
            Mode::Tokens => match scan_tokens(source) {
                Ok(tokens) => Outcome::Listing(
                    tokens
                        .iter()
                        .map(|(token, depth)| {
                            format!(
                                "{:4} {:3} {} {:?}",
                                token.line, depth, token.tokentype, token.lexeme
                            )
                        })
                        .collect::<Vec<String>>()
                        .join("\n"),
                ),
                Err(error) => Outcome::Errors(vec![error.to_string()]),
            },
            Mode::Ast => {
                let (program, errors) = parse(source);
                if !errors.is_empty() {
                    return Outcome::Errors(errors);
                }
                Outcome::Listing(AstPrinter {}.print(&program))
            }
            Mode::Evaluate => {
                let (program, errors) = parse(source);
                if !errors.is_empty() {
                    debug!(errors = errors.len(), "skipping evaluation");
                    return Outcome::Errors(errors);
                }
                let mut interpreter = Interpreter::new(self.environment.clone())
                    .with_max_call_depth(self.max_call_depth);
                Outcome::Value(interpreter.eval(&program))
            }
        }
    }

    /// Runs one prompt unit and writes its result: errors tab-prefixed, one
    /// per line, and values other than null followed by a newline.
    pub fn run_unit<W: Write>(&mut self, source: &str, output: &mut W) -> io::Result<()> {
        match self.run(source) {
            Outcome::Errors(errors) => {
                for error in errors {
                    writeln!(output, "\t{}", error)?;
                }
            }
            Outcome::Listing(listing) => writeln!(output, "{}", listing)?,
            Outcome::Value(value) => {
                if value != NULL {
                    writeln!(output, "{}", value.inspect())?;
                }
            }
        }
        Ok(())
    }
}

/// Reads units from `input` until it is exhausted. A unit still pending at
/// end of input is run as is.
pub fn run_prompt<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    session: &mut Session,
) -> io::Result<()> {
    let mut buffer = UnitBuffer::new();
    loop {
        if buffer.is_empty() {
            write!(output, "{}", PROMPT)?;
        } else {
            write!(output, "{}{}", CONTINUATION_PROMPT, " ".repeat(buffer.indent()))?;
        }
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            if !buffer.is_empty() {
                let unit = buffer.take();
                session.run_unit(&unit, &mut output)?;
            }
            return Ok(());
        }
        if let Some(unit) = buffer.push_line(&line) {
            session.run_unit(&unit, &mut output)?;
        }
    }
}

#[cfg(test)]
mod repl_tests {
    use crate::object::Object;
    use crate::repl::{run_prompt, Mode, Outcome, Session, UnitBuffer};
    use pretty_assertions::assert_eq;

    #[test]
    fn single_lines_are_units() {
        let mut buffer = UnitBuffer::new();
        assert_eq!(buffer.push_line("x = 1\n"), Some("x = 1".to_string()));
        assert_eq!(buffer.push_line("\n"), None);
        assert_eq!(buffer.push_line("if x: 1 else: 2"), Some("if x: 1 else: 2".to_string()));
        assert!(buffer.is_empty());
    }

    #[test]
    fn headers_open_multi_line_units() {
        let mut buffer = UnitBuffer::new();
        assert_eq!(buffer.push_line("def f(x):\n"), None);
        assert_eq!(buffer.indent(), 4);
        assert_eq!(buffer.push_line("    if x:\n"), None);
        assert_eq!(buffer.indent(), 8);
        assert_eq!(buffer.push_line("        return 1\n"), None);
        assert_eq!(buffer.indent(), 8);
        assert_eq!(buffer.push_line("    2\n"), None);
        assert_eq!(buffer.indent(), 4);
        assert_eq!(
            buffer.push_line("\n"),
            Some("def f(x):\n    if x:\n        return 1\n    2".to_string())
        );
        assert!(buffer.is_empty());
        assert_eq!(buffer.indent(), 0);
    }

    #[test]
    fn session_keeps_bindings() {
        let mut session = Session::new(Mode::Evaluate);
        assert_eq!(session.run("a = 2"), Outcome::Value(Object::Null));
        assert_eq!(session.run("a * 21"), Outcome::Value(Object::Integer(42)));
        assert_eq!(
            session.run("a = )"),
            Outcome::Errors(vec!["no prefix parse function for )".to_string()])
        );
    }

    #[test]
    fn listing_modes() {
        let mut tokens = Session::new(Mode::Tokens);
        assert_eq!(
            tokens.run("x = 1"),
            Outcome::Listing(
                "   1   0 NAME \"x\"\n   1   0 = \"=\"\n   1   0 INT \"1\"\n   1   0 EOF \"\""
                    .to_string()
            )
        );
        let mut ast = Session::new(Mode::Ast);
        assert_eq!(
            ast.run("1 + 2 * 3"),
            Outcome::Listing("(+ 1 (* 2 3))".to_string())
        );
    }

    #[test]
    fn prompt_transcript() {
        let input = "a = 69\ndef f():\n    a = 1\n\nf()\na\nb\nlen(\n";
        let mut output = Vec::new();
        let mut session = Session::new(Mode::Evaluate);
        run_prompt(input.as_bytes(), &mut output, &mut session).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            concat!(
                ">> >> ..     ..     >> >> 1\n",
                ">> ERROR: name is not declared: b\n",
                ">> \tno prefix parse function for EOF\n",
                ">> ",
            )
        );
    }
}
