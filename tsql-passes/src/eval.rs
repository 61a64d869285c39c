//! Evaluation of naming rules against database object names.

use std::cmp::Ordering;

use tracing::{debug, trace};
use tsql_parser::ast::naming::{BinaryExpr, BinaryOp, Expr, ReferenceExpr, UnaryExpr, UnaryOp};
use tsql_source::Span;

use crate::builtin_functions::{default_builtin_functions, BuiltinError, BuiltinFunctions};
use crate::value::{Type, Value};

/// Variables a rule can refer to. All of them are strings.
pub const VARIABLES: &[&str] = &["name", "kind", "schema"];

/// The database object a rule is evaluated for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectName {
    pub name: String,
    /// Object kind, e.g. `table` or `index`.
    pub kind: String,
    pub schema: String,
}

impl ObjectName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    fn variable(&self, ident: &str) -> Option<&str> {
        if ident.eq_ignore_ascii_case("name") {
            Some(&self.name)
        } else if ident.eq_ignore_ascii_case("kind") {
            Some(&self.kind)
        } else if ident.eq_ignore_ascii_case("schema") {
            Some(&self.schema)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
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
    #[error("in call to `{name}`: {source}")]
    Builtin {
        name: String,
        source: BuiltinError,
        span: Span,
    },
    #[error("operator `{op}` cannot be applied to {operands}")]
    OperatorType {
        op: &'static str,
        operands: String,
        span: Span,
    },
    #[error("division by zero")]
    DivisionByZero { span: Span },
    #[error("integer overflow")]
    IntegerOverflow { span: Span },
    #[error("a rule must be boolean, found {found}")]
    NotABoolean { found: Type, span: Span },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::UnknownVariable { span, .. }
            | EvalError::UnknownFunction { span, .. }
            | EvalError::ArityMismatch { span, .. }
            | EvalError::Builtin { span, .. }
            | EvalError::OperatorType { span, .. }
            | EvalError::DivisionByZero { span }
            | EvalError::IntegerOverflow { span }
            | EvalError::NotABoolean { span, .. } => *span,
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Tree-walking evaluator for naming rules.
pub struct Evaluator {
    builtins: BuiltinFunctions,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(default_builtin_functions())
    }
}

impl Evaluator {
    pub fn new(builtins: BuiltinFunctions) -> Self {
        Self { builtins }
    }

    pub fn builtins(&self) -> &BuiltinFunctions {
        &self.builtins
    }

    /// Evaluates a rule for `object`. Returns whether the object name satisfies the rule.
    pub fn evaluate_rule(&self, rule: &Expr, object: &ObjectName) -> EvalResult<bool> {
        let verdict = match self.eval(rule, object)? {
            Value::Bool(verdict) => verdict,
            other => {
                return Err(EvalError::NotABoolean {
                    found: other.ty(),
                    span: rule.span(),
                })
            }
        };
        debug!(object = %object.name, verdict, "evaluated naming rule");
        Ok(verdict)
    }

    /// Evaluates any expression.
    pub fn eval(&self, expr: &Expr, object: &ObjectName) -> EvalResult<Value> {
        match expr {
            Expr::IntegerLiteral(lit) => i64::try_from(lit.value)
                .map(Value::Int)
                .map_err(|_| EvalError::IntegerOverflow { span: lit.span }),
            Expr::StringLiteral(lit) => Ok(Value::Str(lit.text().to_string())),
            Expr::Reference(reference) => self.eval_reference(reference, object),
            Expr::Paren(paren) => self.eval(&paren.expr, object),
            Expr::Unary(unary) => self.eval_unary(unary, object),
            Expr::Binary(binary) => self.eval_binary(binary, object),
        }
    }

    fn eval_reference(&self, expr: &ReferenceExpr, object: &ObjectName) -> EvalResult<Value> {
        let name = &expr.ident.name;
        let args = match &expr.args {
            Some(args) => args,
            None => {
                return object
                    .variable(name)
                    .map(Value::from)
                    .ok_or_else(|| EvalError::UnknownVariable {
                        name: name.clone(),
                        span: expr.span,
                    })
            }
        };

        let builtin = self.builtins.get(name).ok_or_else(|| EvalError::UnknownFunction {
            name: name.clone(),
            span: expr.ident.span,
        })?;
        if builtin.arity() != args.exprs.len() {
            return Err(EvalError::ArityMismatch {
                name: builtin.ident.to_string(),
                expected: builtin.arity(),
                found: args.exprs.len(),
                span: expr.span,
            });
        }

        let values = args
            .exprs
            .iter()
            .map(|arg| self.eval(arg, object))
            .collect::<EvalResult<Vec<_>>>()?;
        let result = builtin.call(&values).map_err(|source| EvalError::Builtin {
            name: builtin.ident.to_string(),
            source,
            span: expr.span,
        })?;
        trace!(function = builtin.ident, ?values, %result, "called builtin");
        Ok(result)
    }

    fn eval_unary(&self, expr: &UnaryExpr, object: &ObjectName) -> EvalResult<Value> {
        let operand = self.eval(&expr.operand, object)?;
        match (expr.op, operand) {
            (UnaryOp::Not, Value::Bool(val)) => Ok(Value::Bool(!val)),
            (UnaryOp::Neg, Value::Int(val)) => val
                .checked_neg()
                .map(Value::Int)
                .ok_or(EvalError::IntegerOverflow { span: expr.span }),
            (op, operand) => Err(EvalError::OperatorType {
                op: op.as_str(),
                operands: operand.ty().to_string(),
                span: expr.span,
            }),
        }
    }

    fn eval_binary(&self, expr: &BinaryExpr, object: &ObjectName) -> EvalResult<Value> {
        let lhs = self.eval(&expr.lhs, object)?;

        // AND / OR short-circuit
        match (expr.op, &lhs) {
            (BinaryOp::And, Value::Bool(false)) => return Ok(Value::Bool(false)),
            (BinaryOp::Or, Value::Bool(true)) => return Ok(Value::Bool(true)),
            _ => {}
        }

        let rhs = self.eval(&expr.rhs, object)?;
        let span = expr.span;
        let mismatch = || EvalError::OperatorType {
            op: expr.op.as_str(),
            operands: format!("{} and {}", lhs.ty(), rhs.ty()),
            span,
        };
        let overflow = || EvalError::IntegerOverflow { span };

        let value = match (expr.op, &lhs, &rhs) {
            (BinaryOp::And, Value::Bool(_), Value::Bool(r))
            | (BinaryOp::Or, Value::Bool(_), Value::Bool(r)) => Value::Bool(*r),

            (BinaryOp::Eq, _, _) | (BinaryOp::NotEq, _, _) => {
                let equal = compare(&lhs, &rhs).ok_or_else(mismatch)? == Ordering::Equal;
                Value::Bool(equal == (expr.op == BinaryOp::Eq))
            }
            (BinaryOp::Lt, Value::Bool(_), _)
            | (BinaryOp::LtEq, Value::Bool(_), _)
            | (BinaryOp::Gt, Value::Bool(_), _)
            | (BinaryOp::GtEq, Value::Bool(_), _) => return Err(mismatch()),
            (BinaryOp::Lt, _, _) => Value::Bool(compare(&lhs, &rhs).ok_or_else(mismatch)?.is_lt()),
            (BinaryOp::LtEq, _, _) => Value::Bool(compare(&lhs, &rhs).ok_or_else(mismatch)?.is_le()),
            (BinaryOp::Gt, _, _) => Value::Bool(compare(&lhs, &rhs).ok_or_else(mismatch)?.is_gt()),
            (BinaryOp::GtEq, _, _) => Value::Bool(compare(&lhs, &rhs).ok_or_else(mismatch)?.is_ge()),

            (BinaryOp::Like, Value::Str(text), Value::Str(pattern)) => {
                Value::Bool(like(text, pattern))
            }

            (BinaryOp::Add, Value::Str(l), Value::Str(r)) => Value::Str(format!("{}{}", l, r)),
            (BinaryOp::Add, Value::Int(l), Value::Int(r)) => {
                Value::Int(l.checked_add(*r).ok_or_else(overflow)?)
            }
            (BinaryOp::Sub, Value::Int(l), Value::Int(r)) => {
                Value::Int(l.checked_sub(*r).ok_or_else(overflow)?)
            }
            (BinaryOp::Mul, Value::Int(l), Value::Int(r)) => {
                Value::Int(l.checked_mul(*r).ok_or_else(overflow)?)
            }
            (BinaryOp::Div, Value::Int(_), Value::Int(0))
            | (BinaryOp::Rem, Value::Int(_), Value::Int(0)) => {
                return Err(EvalError::DivisionByZero { span })
            }
            (BinaryOp::Div, Value::Int(l), Value::Int(r)) => {
                Value::Int(l.checked_div(*r).ok_or_else(overflow)?)
            }
            (BinaryOp::Rem, Value::Int(l), Value::Int(r)) => {
                Value::Int(l.checked_rem(*r).ok_or_else(overflow)?)
            }
            _ => return Err(mismatch()),
        };
        Ok(value)
    }
}

/// Compares two values of the same type. Strings compare case-insensitively, like the default
/// SQL Server collation.
fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
        (Value::Str(l), Value::Str(r)) => Some(l.to_lowercase().cmp(&r.to_lowercase())),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// SQL `LIKE`: `%` matches any run of characters, `_` exactly one, `[...]` one character of a
/// set (`[^...]` negated, `a-z` ranges). Case-insensitive.
///
/// Runs in `O(text * pattern)`: on a mismatch only the most recent `%` is retried.
pub fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let pattern = like_tokens(&pattern);

    let (mut t, mut p) = (0, 0);
    // position of the last `%` and of the text it was tried at
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some(LikeToken::AnyRun) => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(token) if token.matches(text[t]) => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((any_run, tried)) => {
                    backtrack = Some((any_run, tried + 1));
                    p = any_run + 1;
                    t = tried + 1;
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|token| *token == LikeToken::AnyRun)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LikeToken<'p> {
    /// `%`
    AnyRun,
    /// `_`
    AnyChar,
    /// `[...]`, without the brackets
    Set(&'p [char]),
    Char(char),
}

impl LikeToken<'_> {
    fn matches(self, c: char) -> bool {
        match self {
            LikeToken::AnyRun => false,
            LikeToken::AnyChar => true,
            LikeToken::Set(set) => char_in_set(c, set),
            LikeToken::Char(expected) => expected == c,
        }
    }
}

/// Splits a pattern into tokens. Runs of `%` collapse into one.
fn like_tokens(pattern: &[char]) -> Vec<LikeToken<'_>> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < pattern.len() {
        let token = match pattern[i] {
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyChar,
            '[' => match pattern[i + 1..].iter().position(|&c| c == ']') {
                Some(len) => {
                    let set = &pattern[i + 1..i + 1 + len];
                    i += len + 1;
                    LikeToken::Set(set)
                }
                // unmatched `[` is a literal
                None => LikeToken::Char('['),
            },
            c => LikeToken::Char(c),
        };
        i += 1;
        if !(token == LikeToken::AnyRun && tokens.last() == Some(&LikeToken::AnyRun)) {
            tokens.push(token);
        }
    }
    tokens
}

fn char_in_set(c: char, set: &[char]) -> bool {
    let (negated, set) = match set.split_first() {
        Some(('^', rest)) => (true, rest),
        _ => (false, set),
    };
    let mut found = false;
    let mut i = 0;
    while i < set.len() {
        if i + 2 < set.len() && set[i + 1] == '-' {
            found |= (set[i]..=set[i + 2]).contains(&c);
            i += 3;
        } else {
            found |= set[i] == c;
            i += 1;
        }
    }
    found != negated
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tsql_parser::parse_naming_rule;

    fn eval(source: &str, name: &str) -> EvalResult<Value> {
        let expr = parse_naming_rule(source).unwrap();
        Evaluator::default().eval(&expr, &ObjectName::new(name))
    }

    fn rule(source: &str, object: &ObjectName) -> EvalResult<bool> {
        let expr = parse_naming_rule(source).unwrap();
        Evaluator::default().evaluate_rule(&expr, object)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3", ""), Ok(Value::Int(7)));
        assert_eq!(eval("(1 + 2) * 3", ""), Ok(Value::Int(9)));
        assert_eq!(eval("7 / 2 - 7 % 2", ""), Ok(Value::Int(2)));
        assert_eq!(eval("-len(name)", "abc"), Ok(Value::Int(-3)));
        assert_eq!(eval("'tbl_' + name", "x"), Ok(Value::from("tbl_x")));
    }

    #[test]
    fn test_comparison_ignores_case() {
        assert_eq!(eval("name = 'ORDERS'", "orders"), Ok(Value::Bool(true)));
        assert_eq!(eval("name <> 'orders'", "Orders"), Ok(Value::Bool(false)));
        assert_eq!(eval("'a' < 'B'", ""), Ok(Value::Bool(true)));
        assert_eq!(eval("len(name) >= 3", "ab"), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_rules() {
        let table = ObjectName::new("tbl_Orders").with_kind("table").with_schema("dbo");
        assert_eq!(rule("starts_with(name, 'tbl_') AND len(name) <= 30", &table), Ok(true));
        assert_eq!(rule("kind = 'table' AND schema = 'sales'", &table), Ok(false));
        assert_eq!(rule("NOT is_upper(name) OR kind = 'view'", &table), Ok(true));
        assert_eq!(rule("name LIKE 'TBL[_]%'", &table), Ok(true));
    }

    #[test]
    fn test_short_circuit() {
        // the right hand side would fail
        assert_eq!(eval("1 = 2 AND 1 / 0 = 1", ""), Ok(Value::Bool(false)));
        assert_eq!(eval("1 = 1 OR missing", ""), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            eval("1 / (len(name) - 3)", "abc"),
            Err(EvalError::DivisionByZero {
                span: Span::new(0, 19)
            })
        );
        assert_eq!(
            eval("missing", "").unwrap_err().to_string(),
            "cannot resolve variable `missing`"
        );
        assert_eq!(
            eval("len(name) = 'x'", "").unwrap_err().to_string(),
            "operator `=` cannot be applied to integer and string"
        );
        assert_eq!(
            eval("left(name, -1)", "abc").unwrap_err().to_string(),
            "in call to `left`: argument 2 must not be negative"
        );
        assert_eq!(
            eval("9223372036854775807 + 1", "").unwrap_err(),
            EvalError::IntegerOverflow {
                span: Span::new(0, 23)
            }
        );
        assert_eq!(
            rule("len(name)", &ObjectName::new("x")),
            Err(EvalError::NotABoolean {
                found: Type::Int,
                span: Span::new(0, 9)
            })
        );
    }

    #[test]
    fn test_like() {
        assert!(like("tbl_orders", "tbl%"));
        assert!(like("TBL_ORDERS", "tbl_orders"));
        assert!(like("ix_a", "ix__"));
        assert!(!like("ix_ab", "ix__"));
        assert!(like("pk1", "pk[0-9]"));
        assert!(!like("pka", "pk[0-9]"));
        assert!(like("pka", "pk[^0-9]"));
        assert!(like("", "%"));
        assert!(like("a[b", "a[b"));
        assert!(!like("abc", "ab"));
        assert!(like("abcabd", "%ab_"));
        assert!(like("mississippi", "m%iss%pi"));
        assert!(!like("mississippi", "m%iss%pix"));
        assert!(like("x", "%%x%%"));
    }

    #[test]
    fn test_like_many_wildcards_is_linear() {
        let text = "a".repeat(2_000);
        assert!(!like(&text, &format!("{}b", "%".repeat(12))));
        assert!(!like(&text, "%a%a%a%a%a%a%a%a%a%a%a%b"));
        assert!(!like(&text, &format!("{}b", "%_".repeat(50))));
        assert!(like(&text, &"%a".repeat(12)));
    }
}
