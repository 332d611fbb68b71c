// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `setitup list` command.

use clap::Args;
use colored::Colorize;
use miette::Result;

use crate::DirectoryFlags;

/// List available packages and bundles
#[derive(Debug, Args)]
pub struct CmdList {}

impl CmdList {
    pub fn run(&mut self, directory: &DirectoryFlags) -> Result<i32> {
        let session = directory.load(false, false)?;
        let recipes = session.recipes()?;
        let settings = session.settings()?;

        let installable: Vec<&str> = recipes
            .iter()
            .filter(|(_, recipe)| recipe.install.is_some())
            .map(|(name, _)| name)
            .collect();
        let configurable: Vec<&str> = recipes
            .iter()
            .filter(|(_, recipe)| recipe.config.is_some())
            .map(|(name, _)| name)
            .collect();

        print_group("Installable packages:", &installable);
        println!();
        print_group("Configurable packages:", &configurable);
        println!();

        println!("{}", "Bundles:".bold());
        if settings.bundles.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for (name, packages) in &settings.bundles {
            println!("  {} {}", name.green(), packages.join(", ").dimmed());
        }

        Ok(0)
    }
}

fn print_group(title: &str, names: &[&str]) {
    println!("{}", title.bold());
    if names.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for name in names {
        println!("  {}", name.cyan());
    }
}
