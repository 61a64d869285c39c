//! Static checking of naming rules.
//!
//! Resolves variables and functions and infers the type of every expression, so a rule can
//! be rejected when it is loaded instead of when it is first evaluated.

use tracing::debug;
use tsql_parser::ast::naming::{
    ArgList, BinaryExpr, Expr, IntegerLiteralExpr, ReferenceExpr, StringLiteralExpr, UnaryExpr,
};
use tsql_parser::visitor::{walk_arg_list, walk_binary_expr, walk_unary_expr, ExprVisitor};
use tsql_source::Span;

use crate::builtin_functions::BuiltinFunctions;
use crate::eval::VARIABLES;
use crate::value::Type;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckError {
    #[error("cannot resolve variable `{name}`")]
    UnknownVariable { name: String, span: Span },
    #[error("cannot resolve function `{name}`")]
    UnknownFunction { name: String, span: Span },
    #[error("function `{name}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("argument {index} of `{name}` must be {expected}, found {found}")]
    ArgumentType {
        name: String,
        index: usize,
        expected: Type,
        found: Type,
        span: Span,
    },
    #[error("operator `{op}` cannot be applied to {operands}")]
    OperatorType {
        op: &'static str,
        operands: String,
        span: Span,
    },
    #[error("integer literal `{value}` is too large")]
    IntegerOverflow { value: u64, span: Span },
    #[error("a rule must be boolean, found {found}")]
    NotABoolean { found: Type, span: Span },
}

impl CheckError {
    pub fn span(&self) -> Span {
        match self {
            CheckError::UnknownVariable { span, .. }
            | CheckError::UnknownFunction { span, .. }
            | CheckError::ArityMismatch { span, .. }
            | CheckError::ArgumentType { span, .. }
            | CheckError::OperatorType { span, .. }
            | CheckError::IntegerOverflow { span, .. }
            | CheckError::NotABoolean { span, .. } => *span,
        }
    }
}

/// Type checking pass.
pub struct Checker<'b> {
    builtins: &'b BuiltinFunctions,
    /// Types of the expressions visited so far. `None` marks an expression whose type could
    /// not be determined; it suppresses follow-up errors.
    types: Vec<Option<Type>>,
    errors: Vec<CheckError>,
}

impl<'b> Checker<'b> {
    pub fn new(builtins: &'b BuiltinFunctions) -> Self {
        Self {
            builtins,
            types: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Checks a whole rule. The rule must evaluate to a boolean.
    pub fn check_rule(mut self, expr: &Expr) -> Vec<CheckError> {
        match self.infer(expr) {
            Some(Type::Bool) | None => {}
            Some(found) => self.errors.push(CheckError::NotABoolean {
                found,
                span: expr.span(),
            }),
        }
        debug!(errors = self.errors.len(), "checked naming rule");
        self.errors
    }

    /// Infers the type of `expr`, recording errors on the way.
    pub fn infer(&mut self, expr: &Expr) -> Option<Type> {
        self.visit_expr(expr);
        self.pop()
    }

    pub fn errors(&self) -> &[CheckError] {
        &self.errors
    }

    fn pop(&mut self) -> Option<Type> {
        self.types.pop().flatten()
    }
}

impl<'a> ExprVisitor<'a> for Checker<'_> {
    fn visit_integer_literal_expr(&mut self, expr: &'a IntegerLiteralExpr) {
        // integers evaluate as i64
        if i64::try_from(expr.value).is_err() {
            self.errors.push(CheckError::IntegerOverflow {
                value: expr.value,
                span: expr.span,
            });
        }
        self.types.push(Some(Type::Int));
    }

    fn visit_string_literal_expr(&mut self, _expr: &'a StringLiteralExpr) {
        self.types.push(Some(Type::Str));
    }

    fn visit_reference_expr(&mut self, expr: &'a ReferenceExpr) {
        let name = &expr.ident.name;
        let args = match &expr.args {
            Some(args) => args,
            None => {
                let ty = if VARIABLES.iter().any(|var| var.eq_ignore_ascii_case(name)) {
                    Some(Type::Str)
                } else {
                    self.errors.push(CheckError::UnknownVariable {
                        name: name.clone(),
                        span: expr.span,
                    });
                    None
                };
                self.types.push(ty);
                return;
            }
        };

        self.visit_arg_list(args);
        let arg_types = self.types.split_off(self.types.len() - args.exprs.len());

        let builtin = match self.builtins.get(name) {
            Some(builtin) => builtin,
            None => {
                self.errors.push(CheckError::UnknownFunction {
                    name: name.clone(),
                    span: expr.ident.span,
                });
                self.types.push(None);
                return;
            }
        };

        if builtin.arity() != arg_types.len() {
            self.errors.push(CheckError::ArityMismatch {
                name: builtin.ident.to_string(),
                expected: builtin.arity(),
                found: arg_types.len(),
                span: expr.span,
            });
        } else {
            for (index, ((found, expected), arg)) in arg_types
                .iter()
                .zip(builtin.params)
                .zip(&args.exprs)
                .enumerate()
            {
                if let Some(found) = found {
                    if found != expected {
                        self.errors.push(CheckError::ArgumentType {
                            name: builtin.ident.to_string(),
                            index: index + 1,
                            expected: *expected,
                            found: *found,
                            span: arg.span(),
                        });
                    }
                }
            }
        }
        self.types.push(Some(builtin.ret));
    }

    fn visit_arg_list(&mut self, args: &'a ArgList) {
        // one type per argument is left on the stack
        walk_arg_list(self, args);
    }

    fn visit_unary_expr(&mut self, expr: &'a UnaryExpr) {
        walk_unary_expr(self, expr);
        let ty = match self.pop() {
            Some(operand) => {
                let ty = Type::unary(expr.op, operand);
                if ty.is_none() {
                    self.errors.push(CheckError::OperatorType {
                        op: expr.op.as_str(),
                        operands: operand.to_string(),
                        span: expr.span,
                    });
                }
                ty
            }
            None => None,
        };
        self.types.push(ty);
    }

    fn visit_binary_expr(&mut self, expr: &'a BinaryExpr) {
        walk_binary_expr(self, expr);
        let rhs = self.pop();
        let lhs = self.pop();
        let ty = match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => {
                let ty = Type::binary(expr.op, lhs, rhs);
                if ty.is_none() {
                    self.errors.push(CheckError::OperatorType {
                        op: expr.op.as_str(),
                        operands: format!("{} and {}", lhs, rhs),
                        span: expr.span,
                    });
                }
                ty
            }
            _ => None,
        };
        self.types.push(ty);
    }
}

/// Checks `expr` against `builtins`. An empty result means the rule is well formed.
pub fn check_rule(expr: &Expr, builtins: &BuiltinFunctions) -> Vec<CheckError> {
    Checker::new(builtins).check_rule(expr)
}
