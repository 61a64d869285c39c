use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tsql_rules::commands::{self, CheckOptions, Grammar, Outcome};

struct Output {
    outcome: Outcome,
    stdout: String,
    stderr: String,
}

fn run(
    command: impl FnOnce(&mut Vec<u8>, &mut Vec<u8>) -> anyhow::Result<Outcome>,
) -> Output {
    console::set_colors_enabled(false);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let outcome = command(&mut out, &mut err).unwrap();
    Output {
        outcome,
        stdout: String::from_utf8(out).unwrap(),
        stderr: String::from_utf8(err).unwrap(),
    }
}

fn check(options: CheckOptions) -> Output {
    run(|out, err| commands::check(&options, out, err))
}

fn inline_rule(rule: &str, kind: Option<&str>, names: &[&str]) -> CheckOptions {
    CheckOptions {
        rule: Some(rule.to_string()),
        kind: kind.map(str::to_string),
        schema: "dbo".to_string(),
        names: names.iter().map(|name| name.to_string()).collect(),
        ..CheckOptions::default()
    }
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_parse_prints_tree() {
    let output = run(|out, err| commands::parse(Grammar::Naming, false, "len(name) > 1", out, err));
    assert_eq!(output.outcome, Outcome::Success);
    assert_eq!(output.stdout, "(> (call len name) 1)\n");
    assert_eq!(output.stderr, "");

    let output = run(|out, err| {
        commands::parse(Grammar::Contains, true, "\"sql server\" ~ data", out, err)
    });
    assert_eq!(output.outcome, Outcome::Success);
    assert_eq!(output.stdout, "\"sql server\" NEAR data\n");
}

#[test]
fn test_parse_syntax_error_fails() {
    let output = run(|out, err| commands::parse(Grammar::Naming, false, "len(name) >", out, err));
    assert_eq!(output.outcome, Outcome::Failure);
    assert_eq!(output.stdout, "");
    assert_eq!(
        output.stderr,
        "error: expected expression, found end of input\n --> <input>:1:12\n  |\n1 | len(name) >\n  |            ^\n"
    );
}

#[test]
fn test_check_pass_and_fail() {
    let output = check(inline_rule(
        "starts_with(name, 'tbl_')",
        None,
        &["tbl_orders", "customers"],
    ));
    assert_eq!(output.outcome, Outcome::Failure);
    assert_eq!(output.stdout, "PASS tbl_orders\nFAIL customers\n");
    assert_eq!(output.stderr, "");

    let output = check(inline_rule("starts_with(name, 'tbl_')", None, &["tbl_orders"]));
    assert_eq!(output.outcome, Outcome::Success);
}

#[test]
fn test_check_runtime_error_is_rendered() {
    let output = check(inline_rule("len(name) / (len(name) - 3) = 1", None, &["abc"]));
    assert_eq!(output.outcome, Outcome::Failure);
    assert_eq!(output.stdout, "ERROR abc\n");
    assert!(output.stderr.starts_with("error: division by zero\n --> <rule>:1:"));
    assert!(output.stderr.contains("1 | len(name) / (len(name) - 3) = 1\n"));
}

#[test]
fn test_check_compile_error_is_rendered() {
    let output = check(inline_rule("lenght(name) < 30", None, &["orders"]));
    assert_eq!(output.outcome, Outcome::Failure);
    assert_eq!(output.stdout, "");
    assert_eq!(
        output.stderr,
        "error: cannot resolve function `lenght`\n --> <rule>:1:1\n  |\n1 | lenght(name) < 30\n  | ^\n"
    );
}

#[test]
fn test_check_kind_with_inline_rule() {
    let output = check(inline_rule("kind = 'INDEX'", Some("index"), &["ix_orders"]));
    assert_eq!(output.outcome, Outcome::Success);
    assert_eq!(output.stdout, "PASS ix_orders\n");

    let output = check(inline_rule("kind = 'INDEX'", None, &["ix_orders"]));
    assert_eq!(output.outcome, Outcome::Failure);
    assert_eq!(output.stdout, "FAIL ix_orders\n");
}

#[test]
fn test_check_with_config() {
    let path = temp_file(
        "commands_config.toml",
        "[rules.table]\nrule = \"starts_with(name, 'tbl_')\"\nmessage = \"tables start with tbl_\"\n",
    );
    let options = CheckOptions {
        config: Some(path.clone()),
        kind: Some("TABLE".to_string()),
        schema: "dbo".to_string(),
        names: vec!["tbl_orders".to_string(), "orders".to_string()],
        ..CheckOptions::default()
    };
    let output = check(options);
    assert_eq!(output.outcome, Outcome::Failure);
    assert_eq!(
        output.stdout,
        "PASS tbl_orders\nFAIL orders: tables start with tbl_\n"
    );

    let options = CheckOptions {
        config: Some(path),
        kind: Some("view".to_string()),
        names: vec!["orders".to_string()],
        ..CheckOptions::default()
    };
    let err = commands::check(&options, &mut Vec::new(), &mut Vec::new()).unwrap_err();
    assert!(err.to_string().starts_with("no rule for `view` in "));
}

#[test]
fn test_check_with_bad_config_rule() {
    let path = temp_file("commands_bad_rule.toml", "[rules.table]\nrule = \"name =\"\n");
    let output = check(CheckOptions {
        config: Some(path),
        kind: Some("table".to_string()),
        names: vec!["orders".to_string()],
        ..CheckOptions::default()
    });
    assert_eq!(output.outcome, Outcome::Failure);
    assert_eq!(output.stdout, "");
    assert_eq!(
        output.stderr,
        "error: expected expression, found end of input\n --> table:1:7\n  |\n1 | name =\n  |       ^\n"
    );
}

#[test]
fn test_check_without_rule_is_an_error() {
    let options = CheckOptions {
        names: vec!["orders".to_string()],
        ..CheckOptions::default()
    };
    assert!(commands::check(&options, &mut Vec::new(), &mut Vec::new()).is_err());
}

#[test]
fn test_search() {
    let path = temp_file(
        "commands_document.txt",
        "Microsoft SQL Server supports full-text search.",
    );
    let output = run(|out, err| commands::search("\"sql server\" NEAR search", &path, 50, out, err));
    assert_eq!(output.outcome, Outcome::Success);
    assert_eq!(output.stdout, format!("{}: match\n", path.display()));

    let output = run(|out, err| commands::search("oracle", &path, 50, out, err));
    assert_eq!(output.outcome, Outcome::Failure);
    assert_eq!(output.stdout, format!("{}: no match\n", path.display()));

    let output = run(|out, err| commands::search("microsoft NEAR search", &path, 2, out, err));
    assert_eq!(output.outcome, Outcome::Failure);
}

#[test]
fn test_search_bad_predicate() {
    let path = temp_file("commands_predicate.txt", "anything");
    let output = run(|out, err| commands::search("a AND", &path, 50, out, err));
    assert_eq!(output.outcome, Outcome::Failure);
    assert_eq!(output.stdout, "");
    assert!(output.stderr.starts_with("error: "));
    assert!(output.stderr.contains(" --> <predicate>:1:6\n"));
}

#[test]
fn test_search_missing_file() {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("does_not_exist.txt");
    let err = commands::search("a", &path, 50, &mut Vec::new(), &mut Vec::new()).unwrap_err();
    assert!(err.to_string().starts_with("failed to read "));
}
