// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Step progress reporting.

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./report_test.rs"]
mod report_test;

/// Lifecycle state of a step as it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Started,
    Skipped,
    Success,
    Error,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Started => "STARTED",
            Self::Skipped => "SKIPPED",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEvent {
    pub status: StepStatus,
    pub description: String,
    /// Captured output, for finished steps that produced any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Receives progress while recipes run.
pub trait Reporter {
    /// Called when a new group of steps begins, such as one package's install.
    fn section(&mut self, _title: &str) {}

    fn report(&mut self, event: StepEvent);
}

/// A reporter that keeps every event, for inspection after a run.
#[derive(Debug, Default, Serialize)]
pub struct RecordingReporter {
    pub sections: Vec<String>,
    pub events: Vec<StepEvent>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<StepStatus> {
        self.events.iter().map(|event| event.status).collect()
    }
}

impl Reporter for RecordingReporter {
    fn section(&mut self, title: &str) {
        self.sections.push(title.to_string());
    }

    fn report(&mut self, event: StepEvent) {
        self.events.push(event);
    }
}

/// Run `effect` if the gate is open, reporting the step's lifecycle.
///
/// A closed gate reports the step as skipped and never invokes `effect`.
pub(crate) fn run_gated<F>(
    description: &str,
    gate: bool,
    reporter: &mut dyn Reporter,
    effect: F,
) -> Result<Option<String>>
where
    F: FnOnce() -> Result<Option<String>>,
{
    let event = |status, output| StepEvent {
        status,
        description: description.to_string(),
        output,
    };

    if !gate {
        tracing::info!("Skipping: {description}");
        reporter.report(event(StepStatus::Skipped, None));
        return Ok(None);
    }

    tracing::info!("Running: {description}");
    reporter.report(event(StepStatus::Started, None));
    match effect() {
        Ok(output) => {
            tracing::info!("Finished: {description}");
            reporter.report(event(StepStatus::Success, output.clone()));
            Ok(output)
        }
        Err(err) => {
            tracing::info!("Failed: {description}");
            let output = match &err {
                Error::CommandFailed { output, .. } => Some(output.clone()),
                _ => None,
            };
            reporter.report(event(StepStatus::Error, output));
            Err(err)
        }
    }
}
