use pretty_assertions::assert_eq;
use tsql_passes::{EvalError, ObjectName};
use tsql_rules::{check_name, compile_rule, Config, ConfigError, RuleError};
use tsql_source::{Source, SyntaxError};

fn passes(rule: &str, name: &str) -> bool {
    let expr = compile_rule(rule).unwrap();
    check_name(&expr, &ObjectName::new(name).with_kind("table").with_schema("dbo")).unwrap()
}

#[test]
fn test_prefix_rule() {
    let rule = "starts_with(name, 'tbl_') AND len(name) <= 30";
    assert!(passes(rule, "tbl_Orders"));
    assert!(passes(rule, "TBL_orders"));
    assert!(!passes(rule, "Orders"));
    assert!(!passes(rule, "tbl_abcdefghijklmnopqrstuvwxyz0123"));
}

#[test]
fn test_like_rule() {
    let rule = "name LIKE 'ix[_]%[_]%' OR name LIKE 'pk[_]%'";
    assert!(passes(rule, "IX_Orders_Date"));
    assert!(passes(rule, "pk_orders"));
    assert!(!passes(rule, "ix_orders"));
    assert!(!passes(rule, "ixorders"));
}

#[test]
fn test_case_rules() {
    assert!(passes("is_lower(name)", "orders"));
    assert!(!passes("is_lower(name)", "Orders"));
    assert!(passes("is_upper(left(name, 1))", "Orders"));
    assert!(!passes("is_upper(left(name, 1))", "orders"));
    assert!(passes("NOT contains(name, ' ')", "OrderLines"));
}

#[test]
fn test_variables() {
    assert!(passes("kind = 'TABLE' AND schema = 'dbo'", "x"));
    assert!(passes("right(schema + '.' + name, 4) = 'o.ab'", "ab"));
    assert!(passes("substring(name, 2, 3) = 'rde'", "orders"));
}

#[test]
fn test_arithmetic_rule() {
    assert!(passes("len(name) % 2 = 0 AND -len(name) < -1", "ab"));
    assert!(passes("(len(name) + 1) * 2 = 8", "abc"));
}

#[test]
fn test_comments_and_brackets() {
    assert!(passes("-- rule for tables\n[name] <> 'x'", "y"));
}

#[test]
fn test_compile_errors() {
    assert_eq!(compile_rule(""), Err(RuleError::Syntax(SyntaxError::EmptyInput)));
    assert_eq!(
        compile_rule("len(name) >"),
        Err(RuleError::Syntax(SyntaxError::unexpected(
            "expression",
            "end of input",
            11
        )))
    );
    assert_eq!(
        compile_rule("len(nme) > 1 AND upper(name)")
            .unwrap_err()
            .to_string(),
        "cannot resolve variable `nme`; operator `AND` cannot be applied to boolean and string"
    );
}

#[test]
fn test_render_check_error() {
    let rule = "len(name) > 1 AND\n  lenght(name) < 30";
    let err = compile_rule(rule).unwrap_err();
    assert_eq!(
        err.render(&Source::with_name("table", rule)),
        "error: cannot resolve function `lenght`\n --> table:2:3\n  |\n2 |   lenght(name) < 30\n  |   ^"
    );
}

#[test]
fn test_runtime_error() {
    let expr = compile_rule("len(name) / (len(name) - 3) = 1").unwrap();
    assert!(matches!(
        check_name(&expr, &ObjectName::new("abc")),
        Err(EvalError::DivisionByZero { .. })
    ));
}

#[test]
fn test_config() {
    let config = Config::from_str(
        r#"
[rules.table]
rule = "starts_with(name, 'tbl_')"
message = "tables start with tbl_"

[rules.view]
rule = "ends_with(name, '_v')"
"#,
    )
    .unwrap();

    let view = config.rule_for("view").unwrap();
    assert!(check_name(&view.expr, &ObjectName::new("orders_v")).unwrap());
    assert!(!check_name(&view.expr, &ObjectName::new("orders")).unwrap());
    assert_eq!(
        config.rules().map(|rule| rule.kind.as_str()).collect::<Vec<_>>(),
        vec!["table", "view"]
    );
}

#[test]
fn test_config_with_bad_rule() {
    let err = Config::from_str("[rules.table]\nrule = \"name =\"").unwrap_err();
    match err {
        ConfigError::Rule { kind, rule, source } => {
            assert_eq!(kind, "table");
            assert_eq!(
                source.render(&Source::with_name(&kind, &rule)),
                "error: expected expression, found end of input\n --> table:1:7\n  |\n1 | name =\n  |       ^"
            );
        }
        other => panic!("unexpected error: {}", other),
    }
}
