//! Semantic passes over naming rules and CONTAINS predicates.

pub mod builtin_functions;
pub mod check;
pub mod contains;
pub mod eval;
pub mod value;

pub use check::{check_rule, CheckError};
pub use contains::{collect_terms, Matcher};
pub use eval::{EvalError, Evaluator, ObjectName};
