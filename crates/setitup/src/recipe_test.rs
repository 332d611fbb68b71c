// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use rstest::rstest;

use super::*;
use crate::context::RunContext;
use crate::document::DocPath;
use crate::substitute::Scopes;
use crate::Error;

const RECIPES: &str = r#"
[[git.install.steps]]
kind = "guard"
conditions = ["not installed('git')"]

[[git.install.steps]]
kind = "shell"
command = "apt-get install -y git"

[[git.config.steps]]
kind = "overwrite"
source = "files/gitconfig"
target = "{env.HOME}/.gitconfig"

[ripgrep.install]
steps = [{ kind = "shell", command = "cargo install ripgrep" }]

[empty]
"#;

fn load(source: &str) -> Result<Recipes> {
    let env = BTreeMap::from([("HOME".to_string(), "/home/ada".to_string())]);
    let context = RunContext::with_env("/base", env).unwrap();
    let scopes = Scopes::new(&context, None);
    let root: Value = toml::from_str(source).unwrap();
    Recipes::from_dict(&Site::new(&root, &scopes))
}

#[rstest]
fn test_load_recipes() {
    let recipes = load(RECIPES).expect("Should load recipes");
    assert_eq!(recipes.len(), 3);
    assert_eq!(recipes.names().collect::<Vec<_>>(), vec!["empty", "git", "ripgrep"]);

    let git = recipes.get("git").unwrap();
    assert_eq!(git.install_steps().map(<[Step]>::len), Some(2));
    let config = git.config_steps().unwrap();
    assert_eq!(
        config[0].describe(),
        "Overwrite: /home/ada/.gitconfig with files/gitconfig"
    );

    let ripgrep = recipes.get("ripgrep").unwrap();
    assert!(ripgrep.config.is_none());
    assert_eq!(
        ripgrep.install_steps().unwrap()[0].describe(),
        "CMD: cargo install ripgrep"
    );

    let empty = recipes.get("empty").unwrap();
    assert_eq!(empty, &Recipe::default());
}

#[rstest]
fn test_parsing_is_deterministic() {
    assert_eq!(load(RECIPES).unwrap(), load(RECIPES).unwrap());
}

#[rstest]
fn test_missing_command_path() {
    let err = load(
        r#"
[[pkg.install.steps]]
kind = "shell"
"#,
    )
    .unwrap_err();

    let expected: DocPath = ["pkg", "install", "steps", "0", "command"]
        .into_iter()
        .collect();
    assert_eq!(err.path(), Some(&expected));
    assert!(matches!(err, Error::MissingKey { .. }));
    assert_eq!(
        err.trail().unwrap().type_names(),
        vec!["ShellStep", "Step", "InstallSpec", "Recipe", "Recipes"]
    );
}

#[rstest]
fn test_steps_must_be_a_sequence() {
    let err = load("[pkg.config]\nsteps = \"echo\"\n").unwrap_err();
    let expected: DocPath = ["pkg", "config", "steps"].into_iter().collect();
    assert!(matches!(err, Error::InvalidValue { .. }));
    assert_eq!(err.path(), Some(&expected));
}

#[rstest]
fn test_install_requires_steps() {
    let err = load("[pkg.install]\n").unwrap_err();
    assert!(matches!(err, Error::MissingKey { ref key, .. } if key == "steps"));
}

#[rstest]
fn test_recipe_must_be_a_table() {
    let err = load("pkg = 3\n").unwrap_err();
    assert!(matches!(err, Error::TerminalType { found: "integer", .. }));
}

#[rstest]
fn test_unknown_step_kind() {
    let err = load("[[pkg.install.steps]]\nkind = \"launch\"\n").unwrap_err();
    let expected: DocPath = ["pkg", "install", "steps", "0", "kind"].into_iter().collect();
    assert!(matches!(err, Error::UnknownVariant { .. }));
    assert_eq!(err.path(), Some(&expected));
}

#[rstest]
fn test_false_guard_is_evaluated_at_load() {
    let recipes = load(
        r#"
[[pkg.install.steps]]
kind = "guard"
conditions = ["1 == 2"]

[[pkg.install.steps]]
kind = "shell"
command = "echo never"
"#,
    )
    .unwrap();
    let steps = recipes.get("pkg").unwrap().install_steps().unwrap();
    assert_eq!(steps[0].describe(), "Guards: [1 == 2] => SKIP");
}

#[rstest]
#[case("gti", &["git"])]
#[case("ripgr", &["ripgrep"])]
#[case("GIT", &["git"])]
#[case("zzzzzz", &[])]
fn test_similar(#[case] query: &str, #[case] expected: &[&str]) {
    let recipes = load(RECIPES).unwrap();
    assert_eq!(recipes.similar(query), expected);
}

#[rstest]
fn test_to_value_summary() {
    let recipes = load(RECIPES).unwrap();
    let summary = recipes.to_value(&["ripgrep".to_string()]);
    let expected: Value = serde_yaml::from_str(
        r#"
ripgrep:
  install:
    steps:
      - "CMD: cargo install ripgrep"
"#,
    )
    .unwrap();
    assert_eq!(summary, expected);

    let all = recipes.to_value(&[]);
    assert_eq!(all.as_mapping().map(Mapping::len), Some(3));
}
