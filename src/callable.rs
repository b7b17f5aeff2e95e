use crate::ast::BlockStatement;
use crate::environment::Environment;
use crate::interpreter::Interpreter;
use crate::object::Object;
use std::fmt;
use std::fmt::Debug;
use std::rc::Rc;

/// A user-defined function together with the environment it closes over.
#[derive(Clone)]
pub struct Function {
    data: Rc<FunctionImpl>,
}

struct FunctionImpl {
    name: String,
    parameters: Vec<String>,
    body: Rc<BlockStatement>,
    closure: Environment,
}

// The closure usually contains the function itself, so it is left out.
impl Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.data.name)
            .field("parameters", &self.data.parameters)
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}({})", self.name(), self.parameters().join(", "))
    }
}

impl Function {
    pub fn new(
        name: &str,
        parameters: Vec<String>,
        body: Rc<BlockStatement>,
        closure: Environment,
    ) -> Function {
        Function {
            data: Rc::new(FunctionImpl {
                name: name.to_string(),
                parameters,
                body,
                closure,
            }),
        }
    }

    /// Binds the arguments in a child of the closure and runs the body there.
    /// A `return` is unwrapped; otherwise the last statement's value is the
    /// result.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Object {
        if arguments.len() != self.arity() {
            return Object::error(format!(
                "wrong number of arguments: expected {}, got {}",
                self.arity(),
                arguments.len()
            ));
        }
        let mut environment = self.data.closure.new_child();
        for (parameter, argument) in self.parameters().iter().zip(arguments) {
            environment.define(parameter, argument);
        }
        match interpreter.execute_block(&self.data.body, environment) {
            Object::ReturnValue(value) => *value,
            result => result,
        }
    }

    pub fn arity(&self) -> usize {
        self.data.parameters.len()
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.data.parameters
    }

    pub fn equals(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

/// A native function from the builtin table.
#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub call: fn(&[Object]) -> Object,
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin fn {}>", self.name)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin fn {}>", self.name)
    }
}
