// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Colored terminal reporting of step progress.

use colored::Colorize;
use setitup::{Reporter, StepEvent, StepStatus};

/// Prints each step event as a status-tagged line.
///
/// Captured output is shown for failures, and for successes when verbose.
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&mut self, title: &str) {
        println!("{} {}", "==>".blue().bold(), title.bold());
    }

    fn report(&mut self, event: StepEvent) {
        let label = event.status.to_string();
        let label = match event.status {
            StepStatus::Started => label.cyan(),
            StepStatus::Skipped => label.yellow(),
            StepStatus::Success => label.green(),
            StepStatus::Error => label.red().bold(),
        };
        println!("  {}  {label}", event.description);

        let show_output = match event.status {
            StepStatus::Error => true,
            StepStatus::Success => self.verbose,
            _ => false,
        };
        if let Some(output) = event.output.filter(|_| show_output) {
            for line in output.lines() {
                println!("          {}", line.dimmed());
            }
        }
    }
}
