// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write document");
    path
}

#[rstest]
#[case(&[], "<root>")]
#[case(&["pkg"], "pkg")]
#[case(&["pkg", "install", "steps", "0"], "pkg => install => steps => 0")]
fn test_doc_path_display(#[case] components: &[&str], #[case] expected: &str) {
    let path: DocPath = components.iter().copied().collect();
    assert_eq!(path.to_string(), expected);
}

#[rstest]
fn test_doc_path_join_and_prefix() {
    let path = DocPath::root().join("pkg").join("install");
    assert_eq!(path.len(), 2);
    assert_eq!(path.prefix(1), DocPath::from_iter(["pkg"]));
    assert_eq!(path.prefix(10), path);
    assert!(path.prefix(0).is_empty());
}

#[rstest]
fn test_merge_is_deep_and_later_wins() {
    let mut base: Value = serde_yaml::from_str(
        r#"
pkg:
  install:
    steps: [a]
  keep: true
"#,
    )
    .unwrap();
    let overlay: Value = serde_yaml::from_str(
        r#"
pkg:
  install:
    steps: [b, c]
other: 1
"#,
    )
    .unwrap();

    merge_into(&mut base, overlay);

    let expected: Value = serde_yaml::from_str(
        r#"
pkg:
  install:
    steps: [b, c]
  keep: true
other: 1
"#,
    )
    .unwrap();
    assert_eq!(base, expected);
}

#[rstest]
fn test_read_toml_and_yaml_documents() {
    let tmp = TempDir::new().unwrap();
    let toml_path = write(
        tmp.path(),
        "a.toml",
        r#"
[pkg.install]
steps = [{ kind = "shell", command = "echo hi" }]
"#,
    );
    let yaml_path = write(tmp.path(), "b.yaml", "pkg:\n  config:\n    steps: []\n");

    let merged = read_documents([&toml_path, &yaml_path]).expect("Should read documents");
    let pkg = merged.get("pkg").expect("pkg should be present");
    assert!(pkg.get("install").is_some());
    assert!(pkg.get("config").is_some());
}

#[rstest]
fn test_missing_documents_are_skipped() {
    let tmp = TempDir::new().unwrap();
    let merged = read_documents([tmp.path().join("absent.toml")]).unwrap();
    assert_eq!(merged, Value::Mapping(Mapping::new()));
}

#[rstest]
fn test_empty_yaml_document_is_an_empty_table() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "empty.yaml", "");
    let document = read_document(&path).unwrap();
    assert_eq!(document, Some(Value::Mapping(Mapping::new())));
}

#[rstest]
fn test_non_table_document_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "list.yaml", "- a\n- b\n");
    let err = read_document(&path).unwrap_err();
    assert!(matches!(err, Error::NotAMapping { found: "sequence", .. }));
}

#[rstest]
fn test_invalid_toml_is_reported() {
    let tmp = TempDir::new().unwrap();
    let path = write(tmp.path(), "bad.toml", "[pkg\n");
    let err = read_document(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidToml { .. }));
}

#[rstest]
fn test_read_directory_merges_in_sorted_order() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "20-late.toml", "value = \"late\"\n");
    write(tmp.path(), "10-early.toml", "value = \"early\"\nonly_early = true\n");
    write(tmp.path(), "notes.txt", "ignored");

    let listed = list_documents(tmp.path()).unwrap();
    assert_eq!(listed.len(), 2);

    let merged = read_directory(tmp.path()).unwrap();
    assert_eq!(merged.get("value"), Some(&Value::from("late")));
    assert_eq!(merged.get("only_early"), Some(&Value::from(true)));
}

#[rstest]
fn test_read_directory_requires_directory() {
    let tmp = TempDir::new().unwrap();
    let err = read_directory(tmp.path().join("missing")).unwrap_err();
    assert!(matches!(err, Error::DirectoryNotFound(_)));
}

#[rstest]
#[case("a: 1", "table")]
#[case("[1, 2]", "sequence")]
#[case("hello", "string")]
#[case("3", "integer")]
#[case("1.5", "float")]
#[case("true", "boolean")]
#[case("~", "null")]
fn test_type_name(#[case] source: &str, #[case] expected: &str) {
    let value: Value = serde_yaml::from_str(source).unwrap();
    assert_eq!(type_name(&value), expected);
}
