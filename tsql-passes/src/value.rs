use std::fmt;

use tsql_parser::ast::naming::{BinaryOp, UnaryOp};

/// Static type of a naming-rule expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Str,
    Bool,
}

impl Type {
    pub fn name(self) -> &'static str {
        match self {
            Type::Int => "integer",
            Type::Str => "string",
            Type::Bool => "boolean",
        }
    }
}

impl Type {
    /// Result type of `lhs op rhs`, or `None` if the operator does not apply.
    pub fn binary(op: BinaryOp, lhs: Type, rhs: Type) -> Option<Type> {
        use Type::{Bool, Int, Str};

        match (op, lhs, rhs) {
            (BinaryOp::And | BinaryOp::Or, Bool, Bool) => Some(Bool),
            (BinaryOp::Eq | BinaryOp::NotEq, lhs, rhs) if lhs == rhs => Some(Bool),
            (BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq, Int, Int)
            | (BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq, Str, Str)
            | (BinaryOp::Like, Str, Str) => Some(Bool),
            (BinaryOp::Add, Str, Str) => Some(Str),
            (BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem, Int, Int) => {
                Some(Int)
            }
            _ => None,
        }
    }

    pub fn unary(op: UnaryOp, operand: Type) -> Option<Type> {
        match (op, operand) {
            (UnaryOp::Not, Type::Bool) => Some(Type::Bool),
            (UnaryOp::Neg, Type::Int) => Some(Type::Int),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime value of a naming-rule expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Str(_) => Type::Str,
            Value::Bool(_) => Type::Bool,
        }
    }

    /// Attempts to cast the `Value` into a `&str` or `None` if wrong type.
    pub fn cast_to_str(&self) -> Option<&str> {
        match self {
            Value::Str(string) => Some(string),
            _ => None,
        }
    }

    pub fn cast_to_int(&self) -> Option<i64> {
        match self {
            Value::Int(val) => Some(*val),
            _ => None,
        }
    }

    pub fn cast_to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(val) => Some(*val),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(val) => write!(f, "{}", val),
            Value::Str(val) => write!(f, "'{}'", val),
            Value::Bool(val) => write!(f, "{}", val),
        }
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Str(val.to_string())
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Int(val)
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_types() {
        assert_eq!(Type::binary(BinaryOp::Add, Type::Str, Type::Str), Some(Type::Str));
        assert_eq!(Type::binary(BinaryOp::Add, Type::Str, Type::Int), None);
        assert_eq!(Type::binary(BinaryOp::Eq, Type::Bool, Type::Bool), Some(Type::Bool));
        assert_eq!(Type::binary(BinaryOp::Lt, Type::Bool, Type::Bool), None);
        assert_eq!(Type::binary(BinaryOp::Like, Type::Str, Type::Str), Some(Type::Bool));
        assert_eq!(Type::binary(BinaryOp::Or, Type::Int, Type::Bool), None);
    }

    #[test]
    fn test_unary_types() {
        assert_eq!(Type::unary(UnaryOp::Not, Type::Bool), Some(Type::Bool));
        assert_eq!(Type::unary(UnaryOp::Neg, Type::Str), None);
    }
}
