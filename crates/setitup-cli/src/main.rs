// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! setitup - Recipe-driven environment bootstrapper CLI

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;
use setitup::{RunContext, Session};

mod cmd_config;
mod cmd_dry;
mod cmd_install;
mod cmd_list;
mod console;

use cmd_config::CmdConfig;
use cmd_dry::CmdDry;
use cmd_install::CmdInstall;
use cmd_list::CmdList;

#[cfg(test)]
#[path = "./main_test.rs"]
mod main_test;

#[derive(Parser)]
#[clap(
    name = "setitup",
    about = "Recipe-driven environment bootstrapper",
    version,
    long_about = "Install and configure packages from declarative recipe documents"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(flatten)]
    directory: DirectoryFlags,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct DirectoryFlags {
    /// Base directory holding the settings and recipes directories
    #[clap(
        short = 'd',
        long = "directory",
        default_value = ".",
        env = "SETITUP_DIR",
        global = true
    )]
    pub directory: PathBuf,
}

impl DirectoryFlags {
    /// Open a session over the base directory with settings and recipes loaded.
    pub fn load(&self, force: bool, verbose: bool) -> Result<Session> {
        let context = RunContext::new(self.directory.clone())?
            .with_force(force)
            .with_verbose(verbose);
        let session = Session::new(context);
        session.load_directory()?;
        Ok(session)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Install a package or bundle
    #[clap(visible_alias = "i")]
    Install(CmdInstall),

    /// Configure a package or bundle
    #[clap(visible_alias = "c")]
    Config(CmdConfig),

    /// List available packages and bundles
    #[clap(visible_aliases = ["ls", "l"])]
    List(CmdList),

    /// Show what would run for a package or bundle
    #[clap(visible_alias = "drydry")]
    Dry(CmdDry),
}

impl Opt {
    fn run(self) -> Result<i32> {
        // Setup logging
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        let verbose = self.logging.verbose > 0;
        match self.cmd {
            Command::Install(mut cmd) => cmd.run(&self.directory, verbose),
            Command::Config(mut cmd) => cmd.run(&self.directory, verbose),
            Command::List(mut cmd) => cmd.run(&self.directory),
            Command::Dry(mut cmd) => cmd.run(&self.directory),
        }
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    // The session, and its scratch directory, is dropped before exiting.
    let code = opt.run()?;
    std::process::exit(code);
}
