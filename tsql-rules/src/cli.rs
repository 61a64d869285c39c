use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tsql_rules::commands::Grammar;

#[derive(Parser)]
#[command(name = "tsql-rules", bin_name = "tsql-rules")]
#[command(about = "Check T-SQL object names against naming rules and test CONTAINS predicates")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a rule or search condition and print its tree
    #[command(after_help = r#"EXAMPLES:
  tsql-rules parse "len(name) <= 30 AND NOT is_upper(name)"
  tsql-rules parse -g contains --canonical '"sql server" near data'"#)]
    Parse {
        /// Grammar of the input text
        #[arg(long, short = 'g', value_enum, default_value_t = Grammar::Naming)]
        grammar: Grammar,

        /// Print the canonical text instead of the tree
        #[arg(long)]
        canonical: bool,

        text: String,
    },

    /// Check object names against a naming rule
    #[command(after_help = r#"EXAMPLES:
  tsql-rules check --rule "starts_with(name, 'tbl_')" tbl_orders customers
  tsql-rules check --config rules.toml --kind index ix_orders_date"#)]
    Check {
        /// Rule to apply
        #[arg(long, short = 'r', conflicts_with = "config", required_unless_present = "config")]
        rule: Option<String>,

        /// Configuration file holding one rule per object kind
        #[arg(long, short = 'c', value_name = "FILE", requires = "kind")]
        config: Option<PathBuf>,

        /// Object kind, used to pick the rule from the configuration
        #[arg(long, short = 'k')]
        kind: Option<String>,

        /// Schema of the objects
        #[arg(long, short = 's', default_value = "dbo")]
        schema: String,

        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Test whether a text file satisfies a CONTAINS search condition
    Search {
        predicate: String,

        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Maximum number of words between the sides of NEAR
        #[arg(long, default_value_t = tsql_passes::contains::DEFAULT_NEAR_DISTANCE)]
        near_distance: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_requires_a_rule() {
        assert!(Cli::try_parse_from(["tsql-rules", "check", "x"]).is_err());
        assert!(Cli::try_parse_from(["tsql-rules", "check", "--config", "r.toml", "x"]).is_err());
        assert!(Cli::try_parse_from(["tsql-rules", "check", "-r", "1 = 1", "x"]).is_ok());
        assert!(
            Cli::try_parse_from(["tsql-rules", "check", "-c", "r.toml", "-k", "table", "x"]).is_ok()
        );
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["tsql-rules", "parse", "-vv", "1 = 1"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
