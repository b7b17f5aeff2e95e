use crate::callable::Builtin;
use crate::interpreter::eval_infix;
use crate::object::{Object, NULL};
use crate::token::TokenType;
use phf::phf_map;

/// Looked up only after the environment chain, so user bindings shadow these.
static BUILTINS: phf::Map<&'static str, Builtin> = phf_map! {
    "len" => Builtin { name: "len", call: len },
    "sum" => Builtin { name: "sum", call: sum },
    "pow" => Builtin { name: "pow", call: pow },
    "print" => Builtin { name: "print", call: print },
};

pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.get(name).cloned()
}

fn wrong_arity(expected: usize, got: usize) -> Object {
    Object::error(format!(
        "wrong number of arguments: expected {}, got {}",
        expected, got
    ))
}

fn len(args: &[Object]) -> Object {
    if args.len() != 1 {
        return wrong_arity(1, args.len());
    }
    match &args[0] {
        Object::Str(value) => Object::Integer(value.chars().count() as i64),
        Object::List(elements) => Object::Integer(elements.len() as i64),
        other => Object::error(format!(
            "argument to `len` not supported, got {}",
            other.object_type()
        )),
    }
}

// Integer until the first float argument.
fn sum(args: &[Object]) -> Object {
    let mut total = Object::Integer(0);
    for arg in args {
        total = match (&total, arg) {
            (Object::Integer(_), Object::Integer(_))
            | (Object::Integer(_), Object::Float(_))
            | (Object::Float(_), Object::Integer(_))
            | (Object::Float(_), Object::Float(_)) => eval_infix(TokenType::Plus, &total, arg),
            (_, other) => {
                return Object::error(format!(
                    "argument to `sum` must be numeric, got {}",
                    other.object_type()
                ))
            }
        };
        if total.is_error() {
            return total;
        }
    }
    total
}

fn pow(args: &[Object]) -> Object {
    if args.len() != 2 {
        return wrong_arity(2, args.len());
    }
    for arg in args {
        match arg {
            Object::Integer(_) | Object::Float(_) => (),
            other => {
                return Object::error(format!(
                    "argument to `pow` must be numeric, got {}",
                    other.object_type()
                ))
            }
        }
    }
    eval_infix(TokenType::StarStar, &args[0], &args[1])
}

fn print(args: &[Object]) -> Object {
    println!(
        "{}",
        args.iter()
            .map(Object::inspect)
            .collect::<Vec<String>>()
            .join(" ")
    );
    NULL
}
