// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `setitup install` command.

use clap::Args;
use miette::Result;
use setitup::Phase;

use crate::console::ConsoleReporter;
use crate::DirectoryFlags;

/// Install a package or bundle
#[derive(Debug, Args)]
pub struct CmdInstall {
    /// Package or bundle name
    pub package: String,

    /// Redo installs even for commands that are already available
    #[clap(short, long)]
    pub force: bool,
}

impl CmdInstall {
    pub fn run(&mut self, directory: &DirectoryFlags, verbose: bool) -> Result<i32> {
        let mut session = directory.load(self.force, verbose)?;
        session.select(&self.package)?;
        session.run(Phase::Install, &mut ConsoleReporter::new(verbose))?;
        Ok(0)
    }
}
