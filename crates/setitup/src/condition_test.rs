// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use rstest::rstest;

use super::*;
use crate::context::RunContext;
use crate::settings::Settings;

fn context(force: bool) -> RunContext {
    let env = BTreeMap::from([
        ("SHELL".to_string(), "/bin/zsh".to_string()),
        ("COUNT".to_string(), "3".to_string()),
    ]);
    RunContext::with_env("/base", env).unwrap().with_force(force)
}

fn check(source: &str) -> Result<bool, String> {
    let context = context(false);
    let settings = Settings {
        root: false,
        bundles: BTreeMap::new(),
    };
    let scopes = Scopes::new(&context, Some(&settings));
    evaluate(source, &scopes)
}

#[rstest]
#[case("true", true)]
#[case("False", false)]
#[case("1 == 2", false)]
#[case("1 == 1", true)]
#[case("1 != 2", true)]
#[case("2 > 1 and 1 >= 1", true)]
#[case("1 < 2 && 3 <= 2", false)]
#[case("1 > 2 or 'a' < 'b'", true)]
#[case("false || 0", false)]
#[case("not false", true)]
#[case("!(1 == 1)", false)]
#[case("not not 1", true)]
#[case("''", false)]
#[case("'x'", true)]
#[case("none", false)]
#[case("none == None", true)]
#[case("-1 < 0", true)]
#[case("env.SHELL == '/bin/zsh'", true)]
#[case("env.SHELL == \"/bin/bash\"", false)]
#[case("env.UNSET == none", true)]
#[case("env.UNSET", false)]
#[case("env.COUNT == 3", false)]
#[case("env.COUNT == '3'", true)]
#[case("context.force", false)]
#[case("not settings.root", true)]
#[case("context.run_step and not context.verbose", true)]
#[case("true or undefined.reference", true)]
#[case("'a' == 1", false)]
#[case("exists('/')", true)]
#[case("exists('/definitely/not/here')", false)]
fn test_evaluate(#[case] source: &str, #[case] expected: bool) {
    assert_eq!(check(source), Ok(expected), "{source}");
}

#[rstest]
#[case("")]
#[case("1 =")]
#[case("1 = 1")]
#[case("(1 == 1")]
#[case("1 == 1)")]
#[case("'unterminated")]
#[case("1 < 2 < 3")]
#[case("a & b")]
#[case("1 < 'a'")]
#[case("unknown.scope")]
#[case("context.nope")]
#[case("launch('rockets')")]
#[case("installed()")]
#[case("installed(1)")]
#[case("#")]
fn test_evaluate_errors(#[case] source: &str) {
    assert!(check(source).is_err(), "{source} should fail");
}

#[rstest]
#[case(10, true)]
#[case(MAX_DEPTH - 1, true)]
#[case(MAX_DEPTH, false)]
#[case(10_000, false)]
fn test_parse_nesting_limit(#[case] depth: usize, #[case] accepted: bool) {
    let grouped = format!("{}true{}", "(".repeat(depth), ")".repeat(depth));
    let negated = format!("{}true", "not ".repeat(depth));
    for source in [grouped, negated] {
        match parse(&source) {
            Ok(_) => assert!(accepted, "depth {depth} should be rejected"),
            Err(reason) => {
                assert!(!accepted, "depth {depth} should parse: {reason}");
                assert!(reason.contains("nests deeper"), "{reason}");
            }
        }
    }
}

#[rstest]
fn test_parse_precedence() {
    let expr = parse("a or b and not c").unwrap();
    let expected = Expr::Or(
        Box::new(Expr::Reference("a".to_string())),
        Box::new(Expr::And(
            Box::new(Expr::Reference("b".to_string())),
            Box::new(Expr::Not(Box::new(Expr::Reference("c".to_string())))),
        )),
    );
    assert_eq!(expr, expected);
}

#[rstest]
fn test_parse_call_with_arguments() {
    let expr = parse("installed(\"git\")").unwrap();
    assert_eq!(
        expr,
        Expr::Call(
            "installed".to_string(),
            vec![Expr::Literal(Operand::Str("git".to_string()))]
        )
    );
}

#[rstest]
fn test_installed_is_false_when_forced() {
    let context = context(true);
    let scopes = Scopes::new(&context, None);
    assert_eq!(evaluate("installed('sh')", &scopes), Ok(false));
}

#[rstest]
fn test_installed_missing_command() {
    let context = context(false);
    let scopes = Scopes::new(&context, None);
    assert_eq!(
        evaluate("installed('setitup-no-such-command')", &scopes),
        Ok(false)
    );
}
