//! Lexer, syntax trees and parsers for the naming-rule and CONTAINS languages.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod visitor;

pub use parser::{parse_contains, parse_naming_rule};
pub use tsql_source::{Span, SyntaxError};
