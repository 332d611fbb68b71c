// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

use clap::CommandFactory;
use rstest::rstest;

use super::*;

#[rstest]
fn test_cli_definition_is_valid() {
    Opt::command().debug_assert();
}

#[rstest]
#[case(&["setitup", "install", "git"], "git", false)]
#[case(&["setitup", "i", "-f", "dev"], "dev", true)]
#[case(&["setitup", "install", "--force", "dev"], "dev", true)]
fn test_parse_install(#[case] args: &[&str], #[case] package: &str, #[case] force: bool) {
    let opt = Opt::try_parse_from(args).expect("Should parse install");
    match opt.cmd {
        Command::Install(cmd) => {
            assert_eq!(cmd.package, package);
            assert_eq!(cmd.force, force);
        }
        _ => panic!("Expected the install command"),
    }
}

#[rstest]
#[case("config")]
#[case("c")]
fn test_parse_config(#[case] name: &str) {
    let opt = Opt::try_parse_from(["setitup", name, "vim"]).expect("Should parse config");
    assert!(matches!(opt.cmd, Command::Config(ref cmd) if cmd.package == "vim" && !cmd.force));
}

#[rstest]
#[case("list")]
#[case("ls")]
#[case("l")]
fn test_parse_list(#[case] name: &str) {
    let opt = Opt::try_parse_from(["setitup", name]).expect("Should parse list");
    assert!(matches!(opt.cmd, Command::List(_)));
}

#[rstest]
#[case("dry")]
#[case("drydry")]
fn test_parse_dry(#[case] name: &str) {
    let opt = Opt::try_parse_from(["setitup", name, "dev"]).expect("Should parse dry");
    assert!(matches!(opt.cmd, Command::Dry(ref cmd) if cmd.package == "dev"));
}

#[rstest]
fn test_global_flags() {
    let opt = Opt::try_parse_from(["setitup", "-vv", "install", "-d", "/srv/dotfiles", "git"])
        .expect("Should parse global flags");
    assert_eq!(opt.logging.verbose, 2);
    assert!(!opt.logging.quiet);
    assert_eq!(opt.directory.directory, PathBuf::from("/srv/dotfiles"));
}

#[rstest]
fn test_package_is_required() {
    assert!(Opt::try_parse_from(["setitup", "install"]).is_err());
}
