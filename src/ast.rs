use crate::stack::ensure_sufficient_stack;
use crate::token::TokenType;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A sequence of statements, either an indented block or the inline body
/// following a colon on the same line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign {
        name: String,
        value: Expression,
    },
    Return(Option<Expression>),
    Expression(Expression),
    Function {
        name: String,
        parameters: Vec<String>,
        body: Rc<BlockStatement>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Name(String),
    Integer(i64),
    Float(f64),
    Str(String),
    Boolean(bool),
    List(Vec<Expression>),
    Prefix {
        operator: TokenType,
        right: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        operator: TokenType,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

pub trait Visitor<T, Output> {
    fn visit(&mut self, n: &T) -> Output;
}

impl Expression {
    pub fn accept<T>(&self, v: &mut dyn Visitor<Expression, T>) -> T {
        v.visit(self)
    }
}

impl Statement {
    pub fn accept<T>(&self, v: &mut dyn Visitor<Statement, T>) -> T {
        v.visit(self)
    }
}

/// Renders a float so that it scans back as a FLOAT token. NaN and the
/// infinities have no literal form: they render as `NaN`, `inf` and `-inf`,
/// which scan back as names.
pub fn format_float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

impl BlockStatement {
    /// Whether the block can follow its colon on the same line: one statement
    /// with no block of its own anywhere inside.
    fn fits_inline(&self) -> bool {
        match self.statements.as_slice() {
            [statement] => !statement.contains_block(),
            _ => false,
        }
    }
}

impl Statement {
    fn contains_block(&self) -> bool {
        match self {
            Statement::Function { .. } => true,
            Statement::Return(None) => false,
            Statement::Assign { value, .. }
            | Statement::Return(Some(value))
            | Statement::Expression(value) => value.contains_block(),
        }
    }
}

impl Expression {
    fn contains_block(&self) -> bool {
        match self {
            Expression::If { .. } => true,
            Expression::List(elements) => elements.iter().any(Expression::contains_block),
            Expression::Prefix { right, .. } => right.contains_block(),
            Expression::Infix { left, right, .. } => left.contains_block() || right.contains_block(),
            Expression::Call {
                function,
                arguments,
            } => function.contains_block() || arguments.iter().any(Expression::contains_block),
            Expression::Index { left, index } => left.contains_block() || index.contains_block(),
            _ => false,
        }
    }
}

const INDENT: &str = "    ";

// Display renders source that parses back to the same tree. Operators are
// parenthesized, and so is an `if` used as an operand. Blocks that do not fit
// inline go on the following lines, one level deeper than their header.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements, 0)
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements, 0)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_statement(f, self, 0)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_expression(f, self, 0, true)
    }
}

fn write_statements(f: &mut Formatter<'_>, statements: &[Statement], level: usize) -> fmt::Result {
    for (i, statement) in statements.iter().enumerate() {
        if i > 0 {
            write!(f, "\n{}", INDENT.repeat(level))?;
        }
        write_statement(f, statement, level)?;
    }
    Ok(())
}

// `level` is the indentation of the header line the block belongs to.
fn write_block(f: &mut Formatter<'_>, block: &BlockStatement, level: usize) -> fmt::Result {
    if block.fits_inline() {
        write!(f, " ")?;
        write_statements(f, &block.statements, level)
    } else {
        write!(f, "\n{}", INDENT.repeat(level + 1))?;
        write_statements(f, &block.statements, level + 1)
    }
}

fn write_statement(f: &mut Formatter<'_>, statement: &Statement, level: usize) -> fmt::Result {
    match statement {
        Statement::Assign { name, value } => {
            write!(f, "{} = ", name)?;
            write_expression(f, value, level, true)
        }
        Statement::Return(None) => write!(f, "return"),
        Statement::Return(Some(value)) => {
            write!(f, "return ")?;
            write_expression(f, value, level, true)
        }
        Statement::Expression(expr) => write_expression(f, expr, level, true),
        Statement::Function {
            name,
            parameters,
            body,
        } => {
            write!(f, "def {}({}):", name, parameters.join(", "))?;
            write_block(f, body, level)
        }
    }
}

fn write_list(f: &mut Formatter<'_>, items: &[Expression], level: usize) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_expression(f, item, level, false)?;
    }
    Ok(())
}

// A bare `if` only appears where it starts the rest of its statement.
fn write_expression(
    f: &mut Formatter<'_>,
    expr: &Expression,
    level: usize,
    bare: bool,
) -> fmt::Result {
    ensure_sufficient_stack(|| match expr {
        Expression::Name(name) => write!(f, "{}", name),
        Expression::Integer(value) => write!(f, "{}", value),
        Expression::Float(value) => write!(f, "{}", format_float(*value)),
        Expression::Str(value) => write!(f, "\"{}\"", value),
        Expression::Boolean(value) => write!(f, "{}", value),
        Expression::List(elements) => {
            write!(f, "[")?;
            write_list(f, elements, level)?;
            if elements.len() == 1 {
                write!(f, ",")?;
            }
            write!(f, "]")
        }
        Expression::Prefix { operator, right } => {
            write!(f, "({}", operator)?;
            write_expression(f, right, level, false)?;
            write!(f, ")")
        }
        Expression::Infix {
            left,
            operator,
            right,
        } => {
            write!(f, "(")?;
            write_expression(f, left, level, false)?;
            write!(f, " {} ", operator)?;
            write_expression(f, right, level, false)?;
            write!(f, ")")
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            if bare {
                return write_if(f, condition, consequence, alternative.as_ref(), level);
            }
            write!(f, "(")?;
            write_if(f, condition, consequence, alternative.as_ref(), level)?;
            // A closing paren right after an indented block goes on its own
            // line, back at the header's level.
            if alternative.as_ref().unwrap_or(consequence).fits_inline() {
                write!(f, ")")
            } else {
                write!(f, "\n{})", INDENT.repeat(level))
            }
        }
        Expression::Call {
            function,
            arguments,
        } => {
            write_expression(f, function, level, false)?;
            write!(f, "(")?;
            write_list(f, arguments, level)?;
            write!(f, ")")
        }
        Expression::Index { left, index } => {
            write!(f, "(")?;
            write_expression(f, left, level, false)?;
            write!(f, "[")?;
            write_expression(f, index, level, false)?;
            write!(f, "])")
        }
    })
}

// An `else` after an indented block starts a line at the `if`'s own level,
// which is how the parser matches the two.
fn write_if(
    f: &mut Formatter<'_>,
    condition: &Expression,
    consequence: &BlockStatement,
    alternative: Option<&BlockStatement>,
    level: usize,
) -> fmt::Result {
    write!(f, "if ")?;
    write_expression(f, condition, level, false)?;
    write!(f, ":")?;
    write_block(f, consequence, level)?;
    if let Some(alternative) = alternative {
        if consequence.fits_inline() {
            write!(f, " else:")?;
        } else {
            write!(f, "\n{}else:", INDENT.repeat(level))?;
        }
        write_block(f, alternative, level)?;
    }
    Ok(())
}

/// Renders the tree in prefix form, e.g. `(+ 1 (* 2 3))`.
pub struct AstPrinter {}

impl AstPrinter {
    pub fn print(&mut self, program: &Program) -> String {
        program
            .statements
            .iter()
            .map(|statement| statement.accept(self))
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn parenthesize(&mut self, name: &str, args: Vec<&Expression>) -> String {
        let mut x = String::from("(");
        x.push_str(name);
        for arg in args {
            x.push_str(" ");
            x.push_str(arg.accept(self).as_str());
        }
        x.push_str(")");
        x
    }

    fn block(&mut self, block: &BlockStatement) -> String {
        let mut x = String::from("(block");
        for statement in &block.statements {
            x.push_str(" ");
            x.push_str(statement.accept(self).as_str());
        }
        x.push_str(")");
        x
    }
}

impl Visitor<Expression, String> for AstPrinter {
    fn visit(&mut self, n: &Expression) -> String {
        match n {
            Expression::Name(name) => name.clone(),
            Expression::Integer(value) => value.to_string(),
            Expression::Float(value) => format_float(*value),
            Expression::Str(value) => format!("{:?}", value),
            Expression::Boolean(value) => value.to_string(),
            Expression::List(elements) => self.parenthesize("list", elements.iter().collect()),
            Expression::Prefix { operator, right } => {
                self.parenthesize(&operator.to_string(), vec![right.as_ref()])
            }
            Expression::Infix {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.to_string(), vec![left.as_ref(), right.as_ref()]),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let mut x = format!("(if {} {}", condition.accept(self), self.block(consequence));
                if let Some(alternative) = alternative {
                    x.push_str(" ");
                    x.push_str(self.block(alternative).as_str());
                }
                x.push_str(")");
                x
            }
            Expression::Call {
                function,
                arguments,
            } => {
                let mut args = vec![function.as_ref()];
                args.extend(arguments.iter());
                self.parenthesize("call", args)
            }
            Expression::Index { left, index } => self.parenthesize("index", vec![left.as_ref(), index.as_ref()]),
        }
    }
}

impl Visitor<Statement, String> for AstPrinter {
    fn visit(&mut self, n: &Statement) -> String {
        match n {
            Statement::Assign { name, value } => format!("(assign {} {})", name, value.accept(self)),
            Statement::Return(None) => String::from("(return)"),
            Statement::Return(Some(value)) => self.parenthesize("return", vec![value]),
            Statement::Expression(expr) => expr.accept(self),
            Statement::Function {
                name,
                parameters,
                body,
            } => format!("(def {} ({}) {})", name, parameters.join(" "), self.block(body)),
        }
    }
}

#[cfg(test)]
mod ast_tests {
    use crate::ast::{format_float, AstPrinter, BlockStatement, Expression, Program, Statement};
    use crate::token::TokenType;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn basic_ast_test() {
        let expression = Expression::Infix {
            left: Box::new(Expression::Prefix {
                operator: TokenType::Minus,
                right: Box::new(Expression::Integer(123)),
            }),
            operator: TokenType::Star,
            right: Box::new(Expression::Float(45.67)),
        };
        let mut visitor = AstPrinter {};
        assert_eq!(expression.accept(&mut visitor), "(* (- 123) 45.67)");
        assert_eq!(expression.to_string(), "((-123) * 45.67)");
    }

    #[test]
    fn assignment_renders_as_source() {
        let program = Program {
            statements: vec![Statement::Assign {
                name: String::from("abc"),
                value: Expression::Name(String::from("def")),
            }],
        };
        assert_eq!(program.to_string(), "abc = def");
    }

    fn if_expression(
        condition: &str,
        consequence: Vec<Statement>,
        alternative: Option<Vec<Statement>>,
    ) -> Expression {
        Expression::If {
            condition: Box::new(Expression::Name(String::from(condition))),
            consequence: BlockStatement {
                statements: consequence,
            },
            alternative: alternative.map(|statements| BlockStatement { statements }),
        }
    }

    fn int(value: i64) -> Statement {
        Statement::Expression(Expression::Integer(value))
    }

    #[test]
    fn single_statement_blocks_render_inline() {
        let body = BlockStatement {
            statements: vec![Statement::Return(Some(Expression::List(vec![
                Expression::Str(String::from("x")),
            ])))],
        };
        let function = Statement::Function {
            name: String::from("f"),
            parameters: vec![String::from("a"), String::from("b")],
            body: Rc::new(body),
        };
        assert_eq!(function.to_string(), "def f(a, b): return [\"x\",]");
        let mut printer = AstPrinter {};
        assert_eq!(
            function.accept(&mut printer),
            "(def f (a b) (block (return (list \"x\"))))"
        );
        let expression = if_expression("a", vec![int(1)], Some(vec![int(2)]));
        assert_eq!(expression.to_string(), "if a: 1 else: 2");
    }

    #[test]
    fn nested_blocks_render_indented() {
        let body = BlockStatement {
            statements: vec![Statement::Return(Some(if_expression(
                "a",
                vec![int(1)],
                Some(vec![int(2)]),
            )))],
        };
        let function = Statement::Function {
            name: String::from("f"),
            parameters: vec![String::from("a")],
            body: Rc::new(body),
        };
        assert_eq!(function.to_string(), "def f(a):\n    return if a: 1 else: 2");

        let outer = if_expression(
            "a",
            vec![Statement::Expression(if_expression("b", vec![int(1)], None))],
            Some(vec![int(2), int(3)]),
        );
        assert_eq!(
            outer.to_string(),
            "if a:\n    if b: 1\nelse:\n    2\n    3"
        );
    }

    #[test]
    fn if_operands_are_parenthesized() {
        let inline = Expression::Infix {
            left: Box::new(if_expression("a", vec![int(1)], Some(vec![int(2)]))),
            operator: TokenType::Plus,
            right: Box::new(Expression::Integer(3)),
        };
        assert_eq!(inline.to_string(), "((if a: 1 else: 2) + 3)");

        let indented = Statement::Assign {
            name: String::from("x"),
            value: Expression::Infix {
                left: Box::new(if_expression("a", vec![int(1), int(2)], None)),
                operator: TokenType::Plus,
                right: Box::new(Expression::Integer(3)),
            },
        };
        let program = Program {
            statements: vec![
                Statement::Function {
                    name: String::from("f"),
                    parameters: vec![],
                    body: Rc::new(BlockStatement {
                        statements: vec![indented],
                    }),
                },
                int(4),
            ],
        };
        assert_eq!(
            program.to_string(),
            "def f():\n    x = ((if a:\n        1\n        2\n    ) + 3)\n4"
        );
    }

    #[test]
    fn floats_keep_their_decimal_point() {
        assert_eq!(format_float(7.0), "7.0");
        assert_eq!(format_float(2.75), "2.75");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NAN), "NaN");
    }
}
