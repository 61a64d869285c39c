//! Functions callable from naming rules.
//!
//! Names are matched case-insensitively. String positions are 1-based and count characters,
//! as in T-SQL.

use std::collections::HashMap;

use crate::value::{Type, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuiltinError {
    #[error("argument {index} must be {expected}, found {found}")]
    ArgumentType {
        index: usize,
        expected: Type,
        found: Type,
    },
    #[error("argument {index} must not be negative")]
    NegativeLength { index: usize },
}

pub type NativeFn = fn(&[Value]) -> Result<Value, BuiltinError>;

/// A native function together with its signature.
#[derive(Debug, Clone)]
pub struct BuiltinFn {
    pub ident: &'static str,
    pub params: &'static [Type],
    pub ret: Type,
    pub func: NativeFn,
}

impl BuiltinFn {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Checks argument types and calls the function.
    pub fn call(&self, args: &[Value]) -> Result<Value, BuiltinError> {
        for (index, (arg, expected)) in args.iter().zip(self.params).enumerate() {
            if arg.ty() != *expected {
                return Err(BuiltinError::ArgumentType {
                    index: index + 1,
                    expected: *expected,
                    found: arg.ty(),
                });
            }
        }
        (self.func)(args)
    }
}

/// Registry of the functions available to a rule.
#[derive(Debug, Clone, Default)]
pub struct BuiltinFunctions {
    functions: HashMap<String, BuiltinFn>,
}

impl BuiltinFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_native_fn(&mut self, ident: &'static str, params: &'static [Type], ret: Type, func: NativeFn) {
        self.functions.insert(
            ident.to_ascii_lowercase(),
            BuiltinFn {
                ident,
                params,
                ret,
                func,
            },
        );
    }

    pub fn get(&self, ident: &str) -> Option<&BuiltinFn> {
        self.functions.get(&ident.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuiltinFn> {
        self.functions.values()
    }
}

/// Returns the default [`BuiltinFunctions`] that should be used.
pub fn default_builtin_functions() -> BuiltinFunctions {
    use Type::{Bool, Int, Str};

    let mut builtins = BuiltinFunctions::new();
    builtins.add_native_fn("len", &[Str], Int, len);
    builtins.add_native_fn("upper", &[Str], Str, upper);
    builtins.add_native_fn("lower", &[Str], Str, lower);
    builtins.add_native_fn("trim", &[Str], Str, trim);
    builtins.add_native_fn("left", &[Str, Int], Str, left);
    builtins.add_native_fn("right", &[Str, Int], Str, right);
    builtins.add_native_fn("substring", &[Str, Int, Int], Str, substring);
    builtins.add_native_fn("starts_with", &[Str, Str], Bool, starts_with);
    builtins.add_native_fn("ends_with", &[Str, Str], Bool, ends_with);
    builtins.add_native_fn("contains", &[Str, Str], Bool, contains);
    builtins.add_native_fn("is_upper", &[Str], Bool, is_upper);
    builtins.add_native_fn("is_lower", &[Str], Bool, is_lower);
    builtins
}

// Argument types are checked by `BuiltinFn::call` before these run.

fn str_arg(args: &[Value], index: usize) -> &str {
    args[index].cast_to_str().unwrap_or_default()
}

fn count_arg(args: &[Value], index: usize) -> Result<usize, BuiltinError> {
    let value = args[index].cast_to_int().unwrap_or_default();
    usize::try_from(value).map_err(|_| BuiltinError::NegativeLength { index: index + 1 })
}

fn len(args: &[Value]) -> Result<Value, BuiltinError> {
    // LEN ignores trailing spaces
    let count = str_arg(args, 0).trim_end_matches(' ').chars().count();
    Ok(Value::Int(count as i64))
}

fn upper(args: &[Value]) -> Result<Value, BuiltinError> {
    Ok(Value::Str(str_arg(args, 0).to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value, BuiltinError> {
    Ok(Value::Str(str_arg(args, 0).to_lowercase()))
}

fn trim(args: &[Value]) -> Result<Value, BuiltinError> {
    Ok(Value::Str(str_arg(args, 0).trim().to_string()))
}

fn left(args: &[Value]) -> Result<Value, BuiltinError> {
    let count = count_arg(args, 1)?;
    Ok(Value::Str(str_arg(args, 0).chars().take(count).collect()))
}

fn right(args: &[Value]) -> Result<Value, BuiltinError> {
    let count = count_arg(args, 1)?;
    let chars: Vec<char> = str_arg(args, 0).chars().collect();
    let skip = chars.len().saturating_sub(count);
    Ok(Value::Str(chars[skip..].iter().collect()))
}

/// `substring(s, start, length)`. Positions before 1 still consume `length`, as in T-SQL.
fn substring(args: &[Value]) -> Result<Value, BuiltinError> {
    let start = args[1].cast_to_int().unwrap_or_default();
    let length = count_arg(args, 2)? as i64;
    let end = start.saturating_add(length);
    let first = start.max(1);
    let taken = usize::try_from(end.saturating_sub(first)).unwrap_or(0);
    let skipped = usize::try_from(first - 1).unwrap_or(usize::MAX);
    Ok(Value::Str(
        str_arg(args, 0).chars().skip(skipped).take(taken).collect(),
    ))
}

fn starts_with(args: &[Value]) -> Result<Value, BuiltinError> {
    let (s, prefix) = (str_arg(args, 0).to_lowercase(), str_arg(args, 1).to_lowercase());
    Ok(Value::Bool(s.starts_with(&prefix)))
}

fn ends_with(args: &[Value]) -> Result<Value, BuiltinError> {
    let (s, suffix) = (str_arg(args, 0).to_lowercase(), str_arg(args, 1).to_lowercase());
    Ok(Value::Bool(s.ends_with(&suffix)))
}

fn contains(args: &[Value]) -> Result<Value, BuiltinError> {
    let (s, needle) = (str_arg(args, 0).to_lowercase(), str_arg(args, 1).to_lowercase());
    Ok(Value::Bool(s.contains(&needle)))
}

/// True when the string has at least one letter and no lowercase letters.
fn is_upper(args: &[Value]) -> Result<Value, BuiltinError> {
    let s = str_arg(args, 0);
    Ok(Value::Bool(
        s.chars().any(char::is_alphabetic) && !s.chars().any(char::is_lowercase),
    ))
}

/// True when the string has at least one letter and no uppercase letters.
fn is_lower(args: &[Value]) -> Result<Value, BuiltinError> {
    let s = str_arg(args, 0);
    Ok(Value::Bool(
        s.chars().any(char::is_alphabetic) && !s.chars().any(char::is_uppercase),
    ))
}
