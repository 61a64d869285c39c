//! Checking T-SQL object names against configurable naming rules.

pub mod commands;
pub mod config;

use tsql_parser::ast::naming::Expr;
use tsql_parser::parse_naming_rule;
use tsql_passes::builtin_functions::default_builtin_functions;
use tsql_passes::{check_rule, CheckError, EvalError, Evaluator, ObjectName};
use tsql_source::{Source, SyntaxError};

pub use config::{Config, ConfigError, NamingRule};

/// Error produced while compiling a naming rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("{}", join(.0))]
    Check(Vec<CheckError>),
}

impl RuleError {
    /// Renders every diagnostic against the rule text.
    pub fn render(&self, source: &Source) -> String {
        match self {
            RuleError::Syntax(err) => source.render(err),
            RuleError::Check(errors) => errors
                .iter()
                .map(|err| source.render_at(err, err.span().start))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn join(errors: &[CheckError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parses and checks a naming rule.
pub fn compile_rule(source: &str) -> Result<Expr, RuleError> {
    let expr = parse_naming_rule(source)?;
    let errors = check_rule(&expr, &default_builtin_functions());
    if errors.is_empty() {
        Ok(expr)
    } else {
        Err(RuleError::Check(errors))
    }
}

/// Evaluates a compiled rule for `object`.
pub fn check_name(rule: &Expr, object: &ObjectName) -> Result<bool, EvalError> {
    Evaluator::default().evaluate_rule(rule, object)
}
