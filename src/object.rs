use crate::callable::{Builtin, Function};
use std::fmt;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ObjectType {
    #[strum(to_string = "INTEGER")]
    Integer,
    #[strum(to_string = "FLOAT")]
    Float,
    #[strum(to_string = "BOOLEAN")]
    Boolean,
    #[strum(to_string = "STRING")]
    Str,
    #[strum(to_string = "LIST")]
    List,
    #[strum(to_string = "NULL")]
    Null,
    #[strum(to_string = "FUNCTION")]
    Function,
    #[strum(to_string = "BUILTIN")]
    Builtin,
    #[strum(to_string = "ERROR")]
    Error,
    #[strum(to_string = "RETURN_VALUE")]
    ReturnValue,
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Str(String),
    List(Vec<Object>),
    Null,
    Function(Function),
    Builtin(Builtin),
    Error(String),
    /// Carries a `return` out of nested blocks; unwrapped at the call boundary.
    ReturnValue(Box<Object>),
}

pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

impl Object {
    pub fn error(message: impl Into<String>) -> Object {
        Object::Error(message.into())
    }

    pub fn from_bool(value: bool) -> Object {
        if value {
            TRUE
        } else {
            FALSE
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Float(_) => ObjectType::Float,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::Str(_) => ObjectType::Str,
            Object::List(_) => ObjectType::List,
            Object::Null => ObjectType::Null,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::Error(_) => ObjectType::Error,
            Object::ReturnValue(_) => ObjectType::ReturnValue,
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            Object::Error(_) => true,
            _ => false,
        }
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Boolean(false) | Object::Null => false,
            _ => true,
        }
    }

    pub fn inspect(&self) -> String {
        match self {
            Object::Integer(value) => value.to_string(),
            Object::Float(value) => value.to_string(),
            Object::Boolean(value) => value.to_string(),
            Object::Str(value) => value.clone(),
            Object::List(elements) => format!(
                "list([{}])",
                elements
                    .iter()
                    .map(Object::inspect)
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Object::Null => String::from("null"),
            Object::Function(function) => function.to_string(),
            Object::Builtin(builtin) => builtin.to_string(),
            Object::Error(message) => format!("ERROR: {}", message),
            Object::ReturnValue(value) => value.inspect(),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

// Functions are equal only to themselves; everything else compares by value.
impl PartialEq for Object {
    fn eq(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Integer(l), Object::Integer(r)) => l == r,
            (Object::Float(l), Object::Float(r)) => l == r,
            (Object::Boolean(l), Object::Boolean(r)) => l == r,
            (Object::Str(l), Object::Str(r)) => l == r,
            (Object::List(l), Object::List(r)) => l == r,
            (Object::Null, Object::Null) => true,
            (Object::Function(l), Object::Function(r)) => l.equals(r),
            (Object::Builtin(l), Object::Builtin(r)) => l.name == r.name,
            (Object::Error(l), Object::Error(r)) => l == r,
            (Object::ReturnValue(l), Object::ReturnValue(r)) => l == r,
            _ => false,
        }
    }
}

#[cfg(test)]
mod object_tests {
    use crate::object::{Object, ObjectType, FALSE, NULL, TRUE};
    use pretty_assertions::assert_eq;

    #[test]
    fn inspect_renderings() {
        assert_eq!(Object::Integer(-4).inspect(), "-4");
        assert_eq!(Object::Float(2.75).inspect(), "2.75");
        assert_eq!(Object::Float(7.0).inspect(), "7");
        assert_eq!(TRUE.inspect(), "true");
        assert_eq!(NULL.inspect(), "null");
        assert_eq!(Object::Str("hi".to_string()).inspect(), "hi");
        assert_eq!(
            Object::List(vec![Object::Integer(1), Object::Str("a".to_string())]).inspect(),
            "list([1, a])"
        );
        assert_eq!(Object::List(vec![]).inspect(), "list([])");
        assert_eq!(Object::error("boom").inspect(), "ERROR: boom");
        assert_eq!(
            Object::ReturnValue(Box::new(Object::Integer(3))).to_string(),
            "3"
        );
    }

    #[test]
    fn type_tags() {
        assert_eq!(Object::Str(String::new()).object_type().to_string(), "STRING");
        assert_eq!(NULL.object_type(), ObjectType::Null);
        assert_eq!(Object::error("x").object_type().to_string(), "ERROR");
    }

    #[test]
    fn truthiness() {
        assert!(!FALSE.is_truthy());
        assert!(!NULL.is_truthy());
        assert!(TRUE.is_truthy());
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::Float(0.0).is_truthy());
        assert!(Object::Str(String::new()).is_truthy());
        assert!(Object::List(vec![]).is_truthy());
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Object::from_bool(true), TRUE);
        assert_eq!(Object::from_bool(false), FALSE);
        assert_ne!(TRUE, Object::Integer(1));
        assert_ne!(NULL, FALSE);
        assert_eq!(
            Object::List(vec![Object::Integer(1)]),
            Object::List(vec![Object::Integer(1)])
        );
        assert_ne!(Object::Integer(1), Object::Float(1.0));
    }
}
