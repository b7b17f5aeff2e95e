use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::scanner::{ScanError, Scanner};
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};
use num_enum::TryFromPrimitive;
use std::convert::TryFrom;
use std::mem;
use std::rc::Rc;
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected token of type: {expected}, got: {got}")]
    UnexpectedToken { expected: TokenType, got: TokenType },
    #[error("no prefix parse function for {0}")]
    NoPrefixParse(TokenType),
    #[error("could not parse {0:?} as integer")]
    InvalidInteger(String),
    #[error("could not parse {0:?} as float")]
    InvalidFloat(String),
    #[error("list literal needs a comma: write [{0},] for a single element")]
    SingleElementList(String),
    #[error("expected an indented block after line {0}")]
    ExpectedIndentedBlock(usize),
    #[error("for loops are not supported (line {0})")]
    UnsupportedFor(usize),
    #[error("too many nested expressions or blocks (line {0})")]
    TooDeeplyNested(usize),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// How deeply statements and expressions may nest inside one another.
pub const MAX_NESTING_DEPTH: usize = 500;

#[derive(Debug, TryFromPrimitive, Display, PartialEq, PartialOrd, Clone, Copy)]
#[repr(u8)]
enum Precedence {
    Lowest,
    Equals,      // == !=
    LessGreater, // < > <= >=
    Sum,         // + -
    Product,     // * /
    Power,       // **
    Prefix,      // ! -
    Call,        // ()
    Index,       // []
}

type PrefixFn = fn(&mut Parser) -> Option<Expression>;
type InfixFn = fn(&mut Parser, Expression) -> Option<Expression>;

struct ParseRule {
    prefix: Option<PrefixFn>,
    infix: Option<InfixFn>,
    precedence: Precedence,
}

impl ParseRule {
    fn get_rule(tt: TokenType) -> &'static ParseRule {
        &RULES[tt as usize]
    }
}

macro_rules! prefix {
    (None) => {
        None
    };
    ($method:ident) => {
        Some(Parser::$method as PrefixFn)
    };
}

macro_rules! infix {
    (None) => {
        None
    };
    ($method:ident) => {
        Some(Parser::$method as InfixFn)
    };
}

macro_rules! mkrules {
    ($($prefix:tt, $infix:tt, $precedence:tt) ; +) => {
        &[
        $(
            ParseRule {
                prefix: prefix!($prefix),
                infix: infix!($infix),
                precedence: Precedence::$precedence
            }
        ),+
        ]
    };
}

#[rustfmt::skip]
static RULES: &[ParseRule] = mkrules!(
    parse_grouped, parse_call,  Call;        // LeftParen
    None,          None,        Lowest;      // RightParen
    parse_list,    parse_index, Index;       // LeftBracket
    None,          None,        Lowest;      // RightBracket
    None,          None,        Lowest;      // LeftBrace
    None,          None,        Lowest;      // RightBrace
    None,          None,        Lowest;      // Comma
    None,          None,        Lowest;      // Colon
    None,          parse_infix, Sum;         // Plus
    parse_prefix,  parse_infix, Sum;         // Minus
    None,          parse_infix, Product;     // Star
    None,          parse_infix, Product;     // Slash
    None,          parse_infix, Power;       // StarStar
    parse_prefix,  None,        Lowest;      // Bang
    None,          parse_infix, Equals;      // BangEqual
    None,          None,        Lowest;      // Equal
    None,          parse_infix, Equals;      // EqualEqual
    None,          parse_infix, LessGreater; // Less
    None,          parse_infix, LessGreater; // LessEqual
    None,          parse_infix, LessGreater; // Greater
    None,          parse_infix, LessGreater; // GreaterEqual
    None,          None,        Lowest;      // PlusEqual
    None,          None,        Lowest;      // MinusEqual
    None,          None,        Lowest;      // StarEqual
    None,          None,        Lowest;      // SlashEqual
    parse_name,    None,        Lowest;      // Name
    parse_integer, None,        Lowest;      // Int
    parse_float,   None,        Lowest;      // Float
    parse_string,  None,        Lowest;      // String
    None,          None,        Lowest;      // Def
    parse_if,      None,        Lowest;      // If
    None,          None,        Lowest;      // Else
    None,          None,        Lowest;      // For
    None,          None,        Lowest;      // Return
    parse_boolean, None,        Lowest;      // True
    parse_boolean, None,        Lowest;      // False
    None,          None,        Lowest;      // Newline
    None,          None,        Lowest       // EOF
);

/// Tokens that close an inline block: nothing after them can belong to the
/// statements following a colon on the same line.
fn ends_inline(tt: TokenType) -> bool {
    match tt {
        TokenType::Newline
        | TokenType::EOF
        | TokenType::Else
        | TokenType::RightParen
        | TokenType::RightBracket
        | TokenType::Comma => true,
        _ => false,
    }
}

pub struct Parser {
    scanner: Scanner,
    current: Token,
    peek: Token,
    current_depth: usize,
    peek_depth: usize,
    errors: Vec<ParseError>,
    fatal: Option<ScanError>,
    nesting: usize,
}

impl Parser {
    pub fn new(source: &str) -> Parser {
        let mut parser = Parser {
            scanner: Scanner::new(source),
            current: Token::new(TokenType::EOF, "", 1),
            peek: Token::new(TokenType::EOF, "", 1),
            current_depth: 0,
            peek_depth: 0,
            errors: Vec::new(),
            fatal: None,
            nesting: 0,
        };
        parser.advance();
        parser.advance();
        parser
    }

    /// Parses every statement up to EOF. Malformed statements are left out
    /// and reported through [`Parser::errors`]; a scan failure discards the
    /// whole program.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.current_is(TokenType::EOF) {
            if !self.current_is(TokenType::Newline) {
                match self.parse_statement() {
                    Some(statement) => program.statements.push(statement),
                    None => self.synchronize(),
                }
            }
            self.advance();
        }
        if let Some(error) = self.fatal.take() {
            debug!(%error, "scan failed, discarding program");
            self.errors = vec![ParseError::Scan(error)];
            program = Program::default();
        }
        debug!(
            statements = program.statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        program
    }

    pub fn parse_errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.iter().map(|error| error.to_string()).collect()
    }

    fn advance(&mut self) {
        let (next, depth) = if self.fatal.is_some() {
            (Token::new(TokenType::EOF, "", self.peek.line), 0)
        } else {
            match self.scanner.next_token() {
                Ok(token) => (token, self.scanner.depth()),
                Err(error) => {
                    let line = error.line;
                    self.fatal = Some(error);
                    (Token::new(TokenType::EOF, "", line), 0)
                }
            }
        };
        self.current = mem::replace(&mut self.peek, next);
        self.current_depth = mem::replace(&mut self.peek_depth, depth);
    }

    fn current_is(&self, tt: TokenType) -> bool {
        self.current.tokentype == tt
    }

    fn peek_is(&self, tt: TokenType) -> bool {
        self.peek.tokentype == tt
    }

    fn expect_peek(&mut self, expected: TokenType) -> Option<()> {
        if self.peek_is(expected) {
            self.advance();
            Some(())
        } else {
            self.errors.push(ParseError::UnexpectedToken {
                expected,
                got: self.peek.tokentype,
            });
            None
        }
    }

    // Skips the rest of the line after a failed statement.
    fn synchronize(&mut self) {
        if self.current_is(TokenType::Newline) {
            return;
        }
        while !self.peek_is(TokenType::Newline) && !self.peek_is(TokenType::EOF) {
            self.advance();
        }
    }

    // Every recursive descent goes through here: statements and expressions
    // both count toward the nesting limit.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Parser) -> Option<T>) -> Option<T> {
        if self.nesting >= MAX_NESTING_DEPTH {
            debug!(line = self.current.line, "nesting limit reached");
            self.errors
                .push(ParseError::TooDeeplyNested(self.current.line));
            return None;
        }
        self.nesting += 1;
        let result = ensure_sufficient_stack(|| parse(self));
        self.nesting -= 1;
        result
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        self.nested(Parser::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Option<Statement> {
        match self.current.tokentype {
            TokenType::Name
                if self.peek_is(TokenType::Equal)
                    || self.peek.tokentype.assign_operator().is_some() =>
            {
                self.parse_assign_statement()
            }
            TokenType::Def => self.parse_function_statement(),
            TokenType::Return => self.parse_return_statement(),
            TokenType::For => self.reject_for_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    // `a += b` is read as `a = a + b`.
    fn parse_assign_statement(&mut self) -> Option<Statement> {
        let name = self.current.lexeme.clone();
        let operator = self.peek.tokentype.assign_operator();
        self.advance();
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        let value = match operator {
            None => value,
            Some(operator) => Expression::Infix {
                left: Box::new(Expression::Name(name.clone())),
                operator,
                right: Box::new(value),
            },
        };
        Some(Statement::Assign { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        if ends_inline(self.peek.tokentype) {
            return Some(Statement::Return(None));
        }
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Statement::Return(Some(value)))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        Some(Statement::Expression(expr))
    }

    fn parse_function_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TokenType::Name)?;
        let name = self.current.lexeme.clone();
        self.expect_peek(TokenType::LeftParen)?;
        let parameters = self.parse_parameters()?;
        self.expect_peek(TokenType::Colon)?;
        let body = self.parse_block()?;
        Some(Statement::Function {
            name,
            parameters,
            body: Rc::new(body),
        })
    }

    fn parse_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();
        if self.peek_is(TokenType::RightParen) {
            self.advance();
            return Some(parameters);
        }
        self.expect_peek(TokenType::Name)?;
        parameters.push(self.current.lexeme.clone());
        while self.peek_is(TokenType::Comma) {
            self.advance();
            self.expect_peek(TokenType::Name)?;
            parameters.push(self.current.lexeme.clone());
        }
        self.expect_peek(TokenType::RightParen)?;
        Some(parameters)
    }

    // Records the error and skips the header line plus any deeper body.
    fn reject_for_statement(&mut self) -> Option<Statement> {
        let depth = self.current_depth;
        self.errors
            .push(ParseError::UnsupportedFor(self.current.line));
        while !self.peek_is(TokenType::Newline) && !self.peek_is(TokenType::EOF) {
            self.advance();
        }
        if self.peek_is(TokenType::Newline) {
            self.advance();
            while self.peek_depth > depth && !self.peek_is(TokenType::EOF) {
                self.advance();
            }
        }
        None
    }

    /// Parses the block after a colon: inline if more tokens follow on the
    /// same line, indented otherwise.
    fn parse_block(&mut self) -> Option<BlockStatement> {
        if self.peek_is(TokenType::EOF) {
            self.errors
                .push(ParseError::ExpectedIndentedBlock(self.current.line));
            return None;
        }
        if self.peek_is(TokenType::Newline) {
            self.parse_indented_block()
        } else {
            Some(self.parse_inline_block())
        }
    }

    // A statement that ended in an indented block has already consumed the
    // newline, which closes this block too.
    fn parse_inline_block(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();
        while !self.current_is(TokenType::Newline) && !ends_inline(self.peek.tokentype) {
            self.advance();
            match self.parse_statement() {
                Some(statement) => block.statements.push(statement),
                None => self.synchronize(),
            }
        }
        block
    }

    // The first line fixes the block depth; the block runs while lines are at
    // least that deep.
    fn parse_indented_block(&mut self) -> Option<BlockStatement> {
        let header_depth = self.current_depth;
        let header_line = self.current.line;
        self.advance();
        if self.peek_is(TokenType::EOF) || self.peek_depth <= header_depth {
            self.errors
                .push(ParseError::ExpectedIndentedBlock(header_line));
            return None;
        }
        let depth = self.peek_depth;
        trace!(depth, "entering block");
        let mut block = BlockStatement::default();
        while self.peek_depth >= depth && !self.peek_is(TokenType::EOF) {
            self.advance();
            match self.parse_statement() {
                Some(statement) => block.statements.push(statement),
                None => self.synchronize(),
            }
            if self.peek_is(TokenType::Newline) {
                self.advance();
            }
        }
        trace!(depth, statements = block.statements.len(), "leaving block");
        Some(block)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        self.nested(|parser| parser.parse_expression_inner(precedence))
    }

    // An `if` with an indented block leaves the parser on the newline that
    // closed it; the next line is never an operand.
    fn parse_expression_inner(&mut self, precedence: Precedence) -> Option<Expression> {
        let prefix = match ParseRule::get_rule(self.current.tokentype).prefix {
            None => {
                self.errors
                    .push(ParseError::NoPrefixParse(self.current.tokentype));
                return None;
            }
            Some(prefix) => prefix,
        };
        let mut left = prefix(self)?;
        while !self.current_is(TokenType::Newline)
            && precedence < ParseRule::get_rule(self.peek.tokentype).precedence
        {
            let infix = match ParseRule::get_rule(self.peek.tokentype).infix {
                None => return Some(left),
                Some(infix) => infix,
            };
            self.advance();
            left = infix(self, left)?;
        }
        Some(left)
    }

    fn parse_name(&mut self) -> Option<Expression> {
        Some(Expression::Name(self.current.lexeme.clone()))
    }

    fn parse_integer(&mut self) -> Option<Expression> {
        match self.current.lexeme.parse() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                self.errors
                    .push(ParseError::InvalidInteger(self.current.lexeme.clone()));
                None
            }
        }
    }

    fn parse_float(&mut self) -> Option<Expression> {
        match self.current.lexeme.parse() {
            Ok(value) => Some(Expression::Float(value)),
            Err(_) => {
                self.errors
                    .push(ParseError::InvalidFloat(self.current.lexeme.clone()));
                None
            }
        }
    }

    fn parse_string(&mut self) -> Option<Expression> {
        Some(Expression::Str(self.current.lexeme.clone()))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(self.current_is(TokenType::True)))
    }

    fn parse_grouped(&mut self) -> Option<Expression> {
        self.advance();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RightParen)?;
        Some(expr)
    }

    // `[]` is empty; any other list needs a comma, so `[x]` is rejected and a
    // single element is written `[x,]`.
    fn parse_list(&mut self) -> Option<Expression> {
        if self.peek_is(TokenType::RightBracket) {
            self.advance();
            return Some(Expression::List(Vec::new()));
        }
        self.advance();
        let first = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenType::RightBracket) {
            self.advance();
            self.errors
                .push(ParseError::SingleElementList(first.to_string()));
            return None;
        }
        let mut elements = vec![first];
        while self.peek_is(TokenType::Comma) {
            self.advance();
            if self.peek_is(TokenType::RightBracket) {
                break;
            }
            self.advance();
            elements.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(TokenType::RightBracket)?;
        Some(Expression::List(elements))
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let operator = self.current.tokentype;
        self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    // An `else` only belongs to this `if` when it sits at the same depth.
    fn parse_if(&mut self) -> Option<Expression> {
        let depth = self.current_depth;
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::Colon)?;
        let consequence = self.parse_block()?;
        let alternative = if self.peek_is(TokenType::Else) && self.peek_depth == depth {
            self.advance();
            self.expect_peek(TokenType::Colon)?;
            Some(self.parse_block()?)
        } else {
            None
        };
        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    // `**` is right associative: its right operand binds one level looser.
    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        let operator = self.current.tokentype;
        let precedence = ParseRule::get_rule(operator).precedence;
        let precedence = match operator {
            TokenType::StarStar => {
                Precedence::try_from(precedence as u8 - 1).unwrap_or(Precedence::Lowest)
            }
            _ => precedence,
        };
        self.advance();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn parse_call(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_call_arguments()?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut arguments = Vec::new();
        if self.peek_is(TokenType::RightParen) {
            self.advance();
            return Some(arguments);
        }
        self.advance();
        arguments.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenType::Comma) {
            self.advance();
            self.advance();
            arguments.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(TokenType::RightParen)?;
        Some(arguments)
    }

    fn parse_index(&mut self, left: Expression) -> Option<Expression> {
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RightBracket)?;
        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }
}

#[cfg(test)]
mod parser_tests {
    use super::{ParseError, Parser, MAX_NESTING_DEPTH, RULES};
    use crate::ast::{BlockStatement, Expression, Program, Statement};
    use crate::scanner::ScanError;
    use crate::token::TokenType;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    fn parse(source: &str) -> (Program, Vec<ParseError>) {
        let mut parser = Parser::new(source);
        let program = parser.parse_program();
        (program, parser.parse_errors().to_vec())
    }

    fn parse_ok(source: &str) -> Program {
        let (program, errors) = parse(source);
        assert_eq!(errors, vec![], "unexpected parse errors for {:?}", source);
        program
    }

    fn expression(source: &str) -> Expression {
        let program = parse_ok(source);
        assert_eq!(program.statements.len(), 1);
        match program.statements.into_iter().next() {
            Some(Statement::Expression(expr)) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    fn name(x: &str) -> Box<Expression> {
        Box::new(Expression::Name(x.to_string()))
    }

    #[test]
    fn rule_table_covers_every_token() {
        assert_eq!(TokenType::iter().count(), RULES.len());
    }

    #[test]
    fn integer_literal() {
        assert_eq!(expression("35"), Expression::Integer(35));
        assert_eq!(expression("6.9"), Expression::Float(6.9));
        assert_eq!(expression("\"hi\""), Expression::Str("hi".to_string()));
        assert_eq!(expression("false"), Expression::Boolean(false));
    }

    #[test]
    fn assignment_statements() {
        let program = parse_ok("\na = 3\nb = 5\ncd = 3535\n");
        let names: Vec<&str> = program
            .statements
            .iter()
            .map(|statement| match statement {
                Statement::Assign { name, .. } => name.as_str(),
                other => panic!("expected assignment, got {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "cd"]);
    }

    #[test]
    fn compound_assignment_desugars() {
        assert_eq!(
            parse_ok("a *= 2").statements,
            vec![Statement::Assign {
                name: "a".to_string(),
                value: Expression::Infix {
                    left: name("a"),
                    operator: TokenType::Star,
                    right: Box::new(Expression::Integer(2)),
                },
            }]
        );
    }

    #[test]
    fn operator_precedence() {
        let cases = vec![
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b - c", "((a + b) - c)"),
            ("a + b * c", "(a + (b * c))"),
            ("a * b ** c", "(a * (b ** c))"),
            ("a ** b ** c", "(a ** (b ** c))"),
            ("-a ** 2", "((-a) ** 2)"),
            ("a < b == c > d", "((a < b) == (c > d))"),
            ("1 + 2 <= 3 != true", "(((1 + 2) <= 3) != true)"),
            ("(a + b) * c", "((a + b) * c)"),
            ("a + f(b * c, d)", "(a + f((b * c), d))"),
            ("a * [1, 2][b]", "(a * ([1, 2][b]))"),
            ("f(x)[0]", "(f(x)[0])"),
            ("xs[0](1)", "(xs[0])(1)"),
        ];
        for (source, expected) in cases {
            assert_eq!(expression(source).to_string(), expected, "source: {}", source);
        }
    }

    #[test]
    fn list_literals() {
        assert_eq!(expression("[]"), Expression::List(vec![]));
        assert_eq!(
            expression("[1,]"),
            Expression::List(vec![Expression::Integer(1)])
        );
        assert_eq!(
            expression("[1, 2.0, \"3\",]"),
            Expression::List(vec![
                Expression::Integer(1),
                Expression::Float(2.0),
                Expression::Str("3".to_string())
            ])
        );
        let (program, errors) = parse("[1]");
        assert_eq!(program.statements, vec![]);
        assert_eq!(errors, vec![ParseError::SingleElementList("1".to_string())]);
    }

    #[test]
    fn inline_if_else() {
        assert_eq!(
            expression("if x < y: x else: y"),
            Expression::If {
                condition: Box::new(Expression::Infix {
                    left: name("x"),
                    operator: TokenType::Less,
                    right: name("y"),
                }),
                consequence: BlockStatement {
                    statements: vec![Statement::Expression(Expression::Name("x".to_string()))]
                },
                alternative: Some(BlockStatement {
                    statements: vec![Statement::Expression(Expression::Name("y".to_string()))]
                }),
            }
        );
    }

    #[test]
    fn indented_blocks_end_on_dedent() {
        let program = parse_ok("if a:\n    x = 1\n    y = 2\nz\n");
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.to_string(), "if a:\n    x = 1\n    y = 2\nz");
    }

    #[test]
    fn lines_after_an_indented_block_start_new_statements() {
        let program = parse_ok("if a:\n    x\n(y)\n[1, 2]\n-z");
        assert_eq!(program.statements.len(), 4);
        assert_eq!(program.to_string(), "if a: x\ny\n[1, 2]\n(-z)");

        let program = parse_ok("def f(): if a:\n    1\nf()");
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.to_string(), "def f():\n    if a: 1\nf()");
    }

    #[test]
    fn indented_if_inside_parentheses() {
        let program = parse_ok("x = (if a:\n    1\n    2\nelse: 3) + 4\nx");
        assert_eq!(program.statements.len(), 2);
        assert_eq!(
            program.to_string(),
            "x = ((if a:\n    1\n    2\nelse: 3) + 4)\nx"
        );
    }

    #[test]
    fn nesting_limit() {
        let (program, errors) = parse(&format!("{}x", "-".repeat(MAX_NESTING_DEPTH)));
        assert_eq!(program.statements, vec![]);
        assert_eq!(errors, vec![ParseError::TooDeeplyNested(1)]);

        let (program, errors) = parse(&format!("{}x\ny", "-".repeat(MAX_NESTING_DEPTH - 2)));
        assert_eq!(errors, vec![]);
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn nested_blocks_bind_else_by_depth() {
        let program = parse_ok("if a:\n    if b:\n        1\n    y\nelse:\n    2\nz");
        assert_eq!(
            program.to_string(),
            "if a:\n    if b: 1\n    y\nelse: 2\nz"
        );
        let program = parse_ok("if a:\n    if b:\n        1\n    else:\n        2\n");
        match &program.statements[0] {
            Statement::Expression(Expression::If {
                consequence,
                alternative,
                ..
            }) => {
                assert_eq!(alternative, &None);
                assert_eq!(consequence.to_string(), "if b: 1 else: 2");
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn function_statements() {
        let program = parse_ok("def c(a, b):\n\treturn a + b\nc(3, 5)");
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.to_string(), "def c(a, b): return (a + b)\nc(3, 5)");
        assert_eq!(
            parse_ok("def f(): return").to_string(),
            "def f(): return"
        );
        assert_eq!(
            parse_ok("def f(x): y = x return y").to_string(),
            "def f(x):\n    y = x\n    return y"
        );
    }

    #[test]
    fn trailing_parameter_comma_is_rejected() {
        let (program, errors) = parse("def f(a,): a");
        assert_eq!(program.statements, vec![]);
        assert_eq!(
            errors,
            vec![ParseError::UnexpectedToken {
                expected: TokenType::Name,
                got: TokenType::RightParen
            }]
        );
    }

    #[test]
    fn missing_indented_block() {
        let (_, errors) = parse("def f():\nx");
        assert_eq!(errors, vec![ParseError::ExpectedIndentedBlock(1)]);
        let (_, errors) = parse("if a:");
        assert_eq!(errors, vec![ParseError::ExpectedIndentedBlock(1)]);
    }

    #[test]
    fn errors_do_not_stop_later_statements() {
        let (program, errors) = parse("a = )\nb = 2\n* 3\nc");
        assert_eq!(
            errors,
            vec![
                ParseError::NoPrefixParse(TokenType::RightParen),
                ParseError::NoPrefixParse(TokenType::Star),
            ]
        );
        assert_eq!(program.to_string(), "b = 2\nc");
    }

    #[test]
    fn for_loops_are_rejected_with_their_body() {
        let (program, errors) = parse("for i in xs:\n    print(i)\n    i\nafter");
        assert_eq!(errors, vec![ParseError::UnsupportedFor(1)]);
        assert_eq!(program.to_string(), "after");
    }

    #[test]
    fn integer_overflow_is_reported() {
        let (_, errors) = parse("99999999999999999999");
        assert_eq!(
            errors,
            vec![ParseError::InvalidInteger("99999999999999999999".to_string())]
        );
    }

    #[test]
    fn scan_errors_abort_the_parse() {
        let (program, errors) = parse("a = 1\nb = 2 $ 3\n");
        assert_eq!(program, Program::default());
        assert_eq!(
            errors,
            vec![ParseError::Scan(ScanError {
                character: '$',
                line: 2
            })]
        );
    }

    #[test]
    fn error_messages() {
        let mut parser = Parser::new("f(1");
        parser.parse_program();
        assert_eq!(
            parser.errors(),
            vec!["expected token of type: ), got: EOF".to_string()]
        );
    }
}
