// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `setitup config` command.

use clap::Args;
use miette::Result;
use setitup::Phase;

use crate::console::ConsoleReporter;
use crate::DirectoryFlags;

/// Configure a package or bundle
#[derive(Debug, Args)]
pub struct CmdConfig {
    /// Package or bundle name
    pub package: String,

    /// Reapply configuration unconditionally
    #[clap(short, long)]
    pub force: bool,
}

impl CmdConfig {
    pub fn run(&mut self, directory: &DirectoryFlags, verbose: bool) -> Result<i32> {
        let mut session = directory.load(self.force, verbose)?;
        session.select(&self.package)?;
        session.run(Phase::Config, &mut ConsoleReporter::new(verbose))?;
        Ok(0)
    }
}
