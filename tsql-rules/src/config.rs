//! Rule configuration files.
//!
//! ```toml
//! [rules.table]
//! rule = "starts_with(name, 'tbl_') AND len(name) <= 30"
//! message = "tables start with tbl_"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Deserialize;
use tracing::{debug, info};
use tsql_parser::ast::naming::Expr;

use crate::{compile_rule, RuleError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("rule for `{kind}` is defined more than once (kinds ignore case)")]
    DuplicateKind { kind: String },
    #[error("rule for `{kind}` is invalid: {source}")]
    Rule {
        kind: String,
        /// Text of the offending rule.
        rule: String,
        #[source]
        source: RuleError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    rules: BTreeMap<String, RawRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    rule: String,
    message: Option<String>,
}

/// A compiled rule for one object kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NamingRule {
    pub kind: String,
    /// Rule text as written in the configuration.
    pub source: String,
    pub expr: Expr,
    pub message: Option<String>,
}

/// Naming rules keyed by object kind. Kinds are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    rules: BTreeMap<String, NamingRule>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_str(&text)?;
        info!(path = %path.display(), rules = config.rules.len(), "loaded configuration");
        Ok(config)
    }

    /// Parses a configuration. Every rule is compiled, so a returned `Config` only holds
    /// well-formed rules.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        let mut rules = BTreeMap::new();
        for (kind, raw_rule) in raw.rules {
            let key = kind.to_lowercase();
            if rules.contains_key(&key) {
                return Err(ConfigError::DuplicateKind { kind });
            }
            let expr = compile_rule(&raw_rule.rule).map_err(|source| ConfigError::Rule {
                kind: kind.clone(),
                rule: raw_rule.rule.clone(),
                source,
            })?;
            debug!(%kind, rule = %expr, "compiled naming rule");
            rules.insert(
                key,
                NamingRule {
                    kind,
                    source: raw_rule.rule,
                    expr,
                    message: raw_rule.message,
                },
            );
        }
        Ok(Self { rules })
    }

    pub fn rule_for(&self, kind: &str) -> Option<&NamingRule> {
        self.rules.get(&kind.to_lowercase())
    }

    pub fn rules(&self) -> impl Iterator<Item = &NamingRule> {
        self.rules.values()
    }
}
