//! Bodies of the `tsql-rules` subcommands.
//!
//! Each command writes its report to `out`, its diagnostics to `err`, and returns an
//! [`Outcome`] that the binary turns into the process exit code. Errors returned through
//! `anyhow` are usage or I/O problems rather than rule or search results.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::ValueEnum;
use console::style;
use tracing::debug;
use tsql_parser::{parse_contains, parse_naming_rule};
use tsql_passes::{collect_terms, Matcher, ObjectName};
use tsql_source::Source;

use crate::{check_name, compile_rule, Config, ConfigError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Grammar {
    /// Naming-rule expressions
    #[default]
    Naming,
    /// CONTAINS search conditions
    Contains,
}

/// Result of a command that ran to completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The input did not parse or compile, a name failed its rule, or the document did not match.
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Prints the tree (or the canonical text) of a rule or search condition.
pub fn parse(
    grammar: Grammar,
    canonical: bool,
    text: &str,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let output = match grammar {
        Grammar::Naming => parse_naming_rule(text).map(|expr| {
            if canonical {
                expr.to_string()
            } else {
                expr.dump()
            }
        }),
        Grammar::Contains => parse_contains(text).map(|term| {
            if canonical {
                term.to_string()
            } else {
                term.dump()
            }
        }),
    };
    match output {
        Ok(output) => {
            writeln!(out, "{}", output)?;
            Ok(Outcome::Success)
        }
        Err(error) => {
            writeln!(err, "{}", Source::new(text).render(&error))?;
            Ok(Outcome::Failure)
        }
    }
}

/// Arguments of [`check`].
#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    /// Inline rule. Takes precedence over `config`.
    pub rule: Option<String>,
    /// Configuration file to pick the rule from, by `kind`.
    pub config: Option<PathBuf>,
    pub kind: Option<String>,
    pub schema: String,
    pub names: Vec<String>,
}

/// Checks every name in `options` and prints `PASS`, `FAIL` or `ERROR` for each.
pub fn check(
    options: &CheckOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let kind = options.kind.as_deref();
    let (source_name, rule, message) = match (&options.rule, &options.config) {
        (Some(rule), _) => ("<rule>".to_string(), rule.clone(), None),
        (None, Some(path)) => {
            let config = match Config::from_file(path) {
                Ok(config) => config,
                Err(ConfigError::Rule {
                    kind: rule_kind,
                    rule,
                    source,
                }) => {
                    writeln!(err, "{}", source.render(&Source::with_name(&rule_kind, &rule)))?;
                    return Ok(Outcome::Failure);
                }
                Err(error) => return Err(error.into()),
            };
            let kind = kind.context("`--kind` is required with `--config`")?;
            let rule = config
                .rule_for(kind)
                .with_context(|| format!("no rule for `{}` in `{}`", kind, path.display()))?;
            (rule.kind.clone(), rule.source.clone(), rule.message.clone())
        }
        (None, None) => anyhow::bail!("either `--rule` or `--config` is required"),
    };

    let source = Source::with_name(&source_name, &rule);
    let expr = match compile_rule(&rule) {
        Ok(expr) => expr,
        Err(error) => {
            writeln!(err, "{}", error.render(&source))?;
            return Ok(Outcome::Failure);
        }
    };

    let mut failures = 0;
    for name in &options.names {
        let object = ObjectName::new(name.as_str())
            .with_kind(kind.unwrap_or_default())
            .with_schema(options.schema.as_str());
        match check_name(&expr, &object) {
            Ok(true) => writeln!(out, "{} {}", style("PASS").green(), name)?,
            Ok(false) => {
                failures += 1;
                match &message {
                    Some(message) => {
                        writeln!(out, "{} {}: {}", style("FAIL").red(), name, message)?
                    }
                    None => writeln!(out, "{} {}", style("FAIL").red(), name)?,
                }
            }
            Err(error) => {
                failures += 1;
                writeln!(out, "{} {}", style("ERROR").red().bold(), name)?;
                writeln!(err, "{}", source.render_at(&error, error.span().start))?;
            }
        }
    }
    debug!(checked = options.names.len(), failures, "checked names");

    Ok(if failures == 0 {
        Outcome::Success
    } else {
        Outcome::Failure
    })
}

/// Tests whether the text file at `file` satisfies `predicate`.
pub fn search(
    predicate: &str,
    file: &Path,
    near_distance: usize,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    let document = fs::read_to_string(file)
        .with_context(|| format!("failed to read `{}`", file.display()))?;
    let term = match parse_contains(predicate) {
        Ok(term) => term,
        Err(error) => {
            writeln!(err, "{}", Source::with_name("<predicate>", predicate).render(&error))?;
            return Ok(Outcome::Failure);
        }
    };
    let terms: Vec<&str> = collect_terms(&term).iter().map(|term| term.text()).collect();
    debug!(?terms, "searching");

    let matched = Matcher::new(&document)
        .with_near_distance(near_distance)
        .matches(&term);
    if matched {
        writeln!(out, "{}: {}", file.display(), style("match").green())?;
        Ok(Outcome::Success)
    } else {
        writeln!(out, "{}: {}", file.display(), style("no match").red())?;
        Ok(Outcome::Failure)
    }
}
