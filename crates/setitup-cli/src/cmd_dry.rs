// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `setitup dry` command.

use clap::Args;
use miette::{IntoDiagnostic, Result};

use crate::DirectoryFlags;

/// Show what would run for a package or bundle
#[derive(Debug, Args)]
pub struct CmdDry {
    /// Package or bundle name
    pub package: String,
}

impl CmdDry {
    pub fn run(&mut self, directory: &DirectoryFlags) -> Result<i32> {
        let mut session = directory.load(false, false)?;
        session.select(&self.package)?;
        let summary = session.summary()?;
        let yaml = serde_yaml::to_string(&summary).into_diagnostic()?;
        print!("{yaml}");
        Ok(0)
    }
}
