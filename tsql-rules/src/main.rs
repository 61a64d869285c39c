mod cli;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tsql_rules::commands::{self, CheckOptions};

use cli::{Cli, Command};

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG takes precedence over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    let outcome = match cli.command {
        Command::Parse {
            grammar,
            canonical,
            text,
        } => commands::parse(grammar, canonical, &text, &mut out, &mut err)?,
        Command::Check {
            rule,
            config,
            kind,
            schema,
            names,
        } => {
            let options = CheckOptions {
                rule,
                config,
                kind,
                schema,
                names,
            };
            commands::check(&options, &mut out, &mut err)?
        }
        Command::Search {
            predicate,
            file,
            near_distance,
        } => commands::search(&predicate, &file, near_distance, &mut out, &mut err)?,
    };
    Ok(outcome.into())
}
