// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;
use crate::context::RunContext;
use crate::substitute::Scopes;
use crate::Error;

fn load(source: &str) -> Result<Settings> {
    let context = RunContext::with_env("/base", BTreeMap::new()).unwrap();
    let scopes = Scopes::new(&context, None);
    let root: Value = toml::from_str(source).unwrap();
    Settings::from_dict(&Site::new(&root, &scopes))
}

#[rstest]
fn test_load_settings() {
    let settings = load(
        r#"
root = true

[bundles]
dev = ["git", "ripgrep"]
empty = []
"#,
    )
    .unwrap();
    assert!(settings.root);
    assert_eq!(settings.bundle("dev"), Some(&["git".to_string(), "ripgrep".to_string()][..]));
    assert_eq!(settings.bundle("empty"), Some(&[][..]));
}

#[rstest]
#[case("bundles = {}\n", "root")]
#[case("root = false\n", "bundles")]
fn test_missing_settings_key(#[case] source: &str, #[case] key: &str) {
    let err = load(source).unwrap_err();
    assert!(matches!(err, Error::MissingKey { key: ref k, .. } if k == key));
}

#[rstest]
#[case("root = \"yes\"\nbundles = {}\n")]
#[case("root = true\nbundles = { dev = \"git\" }\n")]
fn test_invalid_settings(#[case] source: &str) {
    let err = load(source).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
}

#[rstest]
fn test_expand_bundle_or_single_package() {
    let settings = load("root = false\n[bundles]\ndev = [\"git\", \"rg\"]\n").unwrap();
    assert_eq!(settings.expand("dev"), vec!["git", "rg"]);
    assert_eq!(settings.expand("vim"), vec!["vim"]);
}

#[rstest]
#[case(&["root"], Some(Resolved::Bool(false)))]
#[case(&["bundles"], Some(Resolved::Text("dev".to_string())))]
#[case(&["bundles", "dev"], Some(Resolved::Text("git rg".to_string())))]
#[case(&["bundles", "absent"], None)]
#[case(&["nope"], None)]
fn test_fields(#[case] path: &[&str], #[case] expected: Option<Resolved>) {
    let settings = load("root = false\n[bundles]\ndev = [\"git\", \"rg\"]\n").unwrap();
    assert_eq!(settings.field(path), expected);
}
