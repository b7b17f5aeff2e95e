use crate::ast::{BlockStatement, Expression, Program, Statement, Visitor};
use crate::builtins;
use crate::callable::Function;
use crate::environment::Environment;
use crate::object::{Object, NULL};
use crate::stack::ensure_sufficient_stack;
use crate::token::TokenType;
use std::convert::TryFrom;
use std::mem;
use std::rc::Rc;
use tracing::{debug, trace};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Returns early from the enclosing evaluation when a sub-result is an error
/// or a pending `return`.
macro_rules! propagate {
    ($value:expr) => {
        match $value {
            abrupt @ Object::Error(_) | abrupt @ Object::ReturnValue(_) => return abrupt,
            value => value,
        }
    };
}

pub struct Interpreter {
    environment: Environment,
    call_depth: usize,
    max_call_depth: usize,
}

impl Visitor<Expression, Object> for Interpreter {
    fn visit(&mut self, expr: &Expression) -> Object {
        match expr {
            Expression::Name(name) => self.lookup(name),
            Expression::Integer(value) => Object::Integer(*value),
            Expression::Float(value) => Object::Float(*value),
            Expression::Str(value) => Object::Str(value.clone()),
            Expression::Boolean(value) => Object::from_bool(*value),
            Expression::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(propagate!(self.evaluate(element)));
                }
                Object::List(values)
            }
            Expression::Prefix { operator, right } => {
                let right = propagate!(self.evaluate(right));
                eval_prefix(*operator, right)
            }
            Expression::Infix {
                left,
                operator,
                right,
            } => {
                let left = propagate!(self.evaluate(left));
                let right = propagate!(self.evaluate(right));
                eval_infix(*operator, &left, &right)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = propagate!(self.evaluate(condition));
                if condition.is_truthy() {
                    self.eval_block(consequence)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative)
                } else {
                    NULL
                }
            }
            Expression::Call {
                function,
                arguments,
            } => {
                let callee = propagate!(self.evaluate(function));
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(propagate!(self.evaluate(argument)));
                }
                self.call(callee, values)
            }
            Expression::Index { left, index } => {
                let left = propagate!(self.evaluate(left));
                let index = propagate!(self.evaluate(index));
                eval_index(left, index)
            }
        }
    }
}

impl Visitor<Statement, Object> for Interpreter {
    fn visit(&mut self, stmt: &Statement) -> Object {
        match stmt {
            Statement::Assign { name, value } => {
                let value = propagate!(self.evaluate(value));
                self.environment.assign(name, value);
                NULL
            }
            Statement::Return(None) => Object::ReturnValue(Box::new(NULL)),
            Statement::Return(Some(value)) => {
                let value = propagate!(self.evaluate(value));
                Object::ReturnValue(Box::new(value))
            }
            Statement::Expression(expr) => self.evaluate(expr),
            Statement::Function {
                name,
                parameters,
                body,
            } => {
                let function = Function::new(
                    name,
                    parameters.clone(),
                    Rc::clone(body),
                    self.environment.clone(),
                );
                self.environment.define(name, Object::Function(function));
                NULL
            }
        }
    }
}

impl Interpreter {
    pub fn new(environment: Environment) -> Interpreter {
        Interpreter {
            environment,
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Limits how many user function calls may be active at once.
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Interpreter {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Runs a whole program. Stops at the first error or top-level `return`
    /// and otherwise yields the value of the last statement.
    pub fn eval(&mut self, program: &Program) -> Object {
        let mut result = NULL;
        for statement in &program.statements {
            result = self.execute(statement);
            match result {
                Object::ReturnValue(value) => return *value,
                Object::Error(_) => return result,
                _ => (),
            }
        }
        result
    }

    pub fn evaluate(&mut self, expr: &Expression) -> Object {
        ensure_sufficient_stack(|| -> Object { expr.accept(self) })
    }

    pub fn execute(&mut self, stmt: &Statement) -> Object {
        stmt.accept(self)
    }

    /// Evaluates `block` with `environment` as the current scope, restoring
    /// the previous scope afterwards.
    pub fn execute_block(&mut self, block: &BlockStatement, environment: Environment) -> Object {
        trace!(scopes = environment.depth(), "entering block");
        let previous = mem::replace(&mut self.environment, environment);
        let result = self.eval_block(block);
        self.environment = previous;
        result
    }

    fn eval_block(&mut self, block: &BlockStatement) -> Object {
        let mut result = NULL;
        for statement in &block.statements {
            result = self.execute(statement);
            if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
                break;
            }
        }
        result
    }

    fn lookup(&self, name: &str) -> Object {
        if let Some(value) = self.environment.get(name) {
            return value;
        }
        match builtins::lookup(name) {
            Some(builtin) => Object::Builtin(builtin),
            None => Object::error(format!("name is not declared: {}", name)),
        }
    }

    fn call(&mut self, callee: Object, arguments: Vec<Object>) -> Object {
        match callee {
            Object::Builtin(builtin) => (builtin.call)(&arguments),
            Object::Function(function) => {
                if self.call_depth >= self.max_call_depth {
                    debug!(
                        function = function.name(),
                        depth = self.call_depth,
                        "recursion limit reached"
                    );
                    return Object::error("maximum recursion depth exceeded");
                }
                debug!(
                    function = function.name(),
                    arguments = arguments.len(),
                    depth = self.call_depth,
                    "call"
                );
                self.call_depth += 1;
                let result = function.call(self, arguments);
                self.call_depth -= 1;
                result
            }
            other => Object::error(format!("not a function: {}", other.object_type())),
        }
    }
}

fn eval_prefix(operator: TokenType, right: Object) -> Object {
    match (operator, right) {
        (TokenType::Bang, right) => Object::from_bool(!right.is_truthy()),
        (TokenType::Minus, Object::Integer(value)) => match value.checked_neg() {
            Some(negated) => Object::Integer(negated),
            None => Object::error(format!("integer overflow: -{}", value)),
        },
        (TokenType::Minus, Object::Float(value)) => Object::Float(-value),
        (operator, right) => Object::error(format!(
            "unknown operator: {}{}",
            operator,
            right.object_type()
        )),
    }
}

/// Applies a binary operator to two evaluated operands. Integers stay
/// integers until a float is involved; booleans and null only support
/// equality.
pub(crate) fn eval_infix(operator: TokenType, left: &Object, right: &Object) -> Object {
    let result = match (left, right) {
        (Object::Integer(l), Object::Integer(r)) => integer_infix(operator, *l, *r),
        (Object::Integer(l), Object::Float(r)) => float_infix(operator, *l as f64, *r),
        (Object::Float(l), Object::Integer(r)) => float_infix(operator, *l, *r as f64),
        (Object::Float(l), Object::Float(r)) => float_infix(operator, *l, *r),
        (Object::Str(l), Object::Str(r)) => string_infix(operator, l, r),
        (Object::Boolean(_), _) | (_, Object::Boolean(_)) | (Object::Null, _) | (_, Object::Null) => {
            match operator {
                TokenType::EqualEqual => Some(Object::from_bool(left == right)),
                TokenType::BangEqual => Some(Object::from_bool(left != right)),
                _ => None,
            }
        }
        _ if left.object_type() != right.object_type() => Some(Object::error(format!(
            "type mismatch: {} {} {}",
            left.object_type(),
            operator,
            right.object_type()
        ))),
        _ => None,
    };
    result.unwrap_or_else(|| {
        Object::error(format!(
            "unknown operator: {} {} {}",
            left.object_type(),
            operator,
            right.object_type()
        ))
    })
}

fn integer_infix(operator: TokenType, l: i64, r: i64) -> Option<Object> {
    let value = match operator {
        TokenType::Plus => l.checked_add(r),
        TokenType::Minus => l.checked_sub(r),
        TokenType::Star => l.checked_mul(r),
        TokenType::Slash if r == 0 => return Some(Object::error("division by zero")),
        TokenType::Slash => l.checked_div(r),
        TokenType::StarStar if r < 0 => return Some(Object::Float((l as f64).powf(r as f64))),
        TokenType::StarStar => integer_pow(l, r),
        TokenType::Less => return Some(Object::from_bool(l < r)),
        TokenType::LessEqual => return Some(Object::from_bool(l <= r)),
        TokenType::Greater => return Some(Object::from_bool(l > r)),
        TokenType::GreaterEqual => return Some(Object::from_bool(l >= r)),
        TokenType::EqualEqual => return Some(Object::from_bool(l == r)),
        TokenType::BangEqual => return Some(Object::from_bool(l != r)),
        _ => return None,
    };
    Some(match value {
        Some(value) => Object::Integer(value),
        None => Object::error(format!("integer overflow: {} {} {}", l, operator, r)),
    })
}

// Exponents past u32 only fit for bases 0, 1 and -1.
fn integer_pow(base: i64, exponent: i64) -> Option<i64> {
    match base {
        0 if exponent == 0 => Some(1),
        0 | 1 => Some(base),
        -1 if exponent % 2 == 0 => Some(1),
        -1 => Some(-1),
        _ => u32::try_from(exponent)
            .ok()
            .and_then(|exponent| base.checked_pow(exponent)),
    }
}

fn float_infix(operator: TokenType, l: f64, r: f64) -> Option<Object> {
    let result = match operator {
        TokenType::Plus => Object::Float(l + r),
        TokenType::Minus => Object::Float(l - r),
        TokenType::Star => Object::Float(l * r),
        TokenType::Slash if r == 0.0 => Object::error("division by zero"),
        TokenType::Slash => Object::Float(l / r),
        TokenType::StarStar => Object::Float(l.powf(r)),
        TokenType::Less => Object::from_bool(l < r),
        TokenType::LessEqual => Object::from_bool(l <= r),
        TokenType::Greater => Object::from_bool(l > r),
        TokenType::GreaterEqual => Object::from_bool(l >= r),
        TokenType::EqualEqual => Object::from_bool(l == r),
        TokenType::BangEqual => Object::from_bool(l != r),
        _ => return None,
    };
    Some(result)
}

fn string_infix(operator: TokenType, l: &str, r: &str) -> Option<Object> {
    match operator {
        TokenType::Plus => Some(Object::Str(format!("{}{}", l, r))),
        TokenType::EqualEqual => Some(Object::from_bool(l == r)),
        TokenType::BangEqual => Some(Object::from_bool(l != r)),
        _ => None,
    }
}

// Out-of-range indices, negative ones included, yield null.
fn eval_index(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::List(elements), Object::Integer(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(NULL),
        _ => Object::error(format!(
            "index operator not supported: {}",
            left.object_type()
        )),
    }
}
