// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

fn context() -> RunContext {
    let env = BTreeMap::from([("HOME".to_string(), "/home/ada".to_string())]);
    RunContext::with_env("/base", env).unwrap()
}

#[rstest]
fn test_defaults() {
    let context = context();
    assert!(context.run_step);
    assert!(!context.force);
    assert!(!context.verbose);
    assert!(context.packages.is_empty());
    assert_eq!(context.home_dir, PathBuf::from("/home/ada"));
    assert!(context.tmp_dir().is_dir());
}

#[rstest]
fn test_tmp_dir_is_removed_on_drop() {
    let context = context();
    let tmp = context.tmp_dir().to_path_buf();
    drop(context);
    assert!(!tmp.exists());
}

#[rstest]
#[case("base_directory", Resolved::Text("/base".to_string()))]
#[case("packages", Resolved::Text("git ripgrep".to_string()))]
#[case("force", Resolved::Bool(true))]
#[case("run_step", Resolved::Bool(true))]
#[case("home_dir", Resolved::Text("/home/ada".to_string()))]
fn test_fields(#[case] name: &str, #[case] expected: Resolved) {
    let mut context = context().with_force(true);
    context.packages = vec!["git".to_string(), "ripgrep".to_string()];
    assert_eq!(context.field(name), Some(expected));
}

#[rstest]
fn test_every_listed_field_resolves() {
    let context = context();
    for name in CONTEXT_FIELDS {
        assert!(context.field(name).is_some(), "{name} should resolve");
    }
    assert_eq!(context.field("nope"), None);
}

#[rstest]
#[case("files/rc", "/base/files/rc")]
#[case("/etc/rc", "/etc/rc")]
#[case("~/rc", "/home/ada/rc")]
fn test_resolve_source(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(context().resolve_source(raw), PathBuf::from(expected));
}

#[rstest]
#[case("~", "/home/ada")]
#[case("~/.bashrc", "/home/ada/.bashrc")]
#[case("relative/rc", "relative/rc")]
fn test_resolve_target(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(context().resolve_target(raw), PathBuf::from(expected));
}
