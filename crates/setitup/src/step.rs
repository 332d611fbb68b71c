// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! The closed set of step kinds and their execution.

use std::fmt;
use std::process::Command;

use serde_yaml::{Mapping, Value};

use crate::context::RunContext;
use crate::document::render_scalar;
use crate::object::DictObject;
use crate::report::{run_gated, Reporter};
use crate::schema::{
    is_string_list, string_field, string_list_field, KeySpec, Site, ValueType,
};
use crate::{condition, files, Error, Result};

#[cfg(test)]
#[path = "./step_test.rs"]
mod step_test;

/// Discriminator read from a step's `kind` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Shell,
    Guard,
    Overwrite,
    Update,
}

impl StepKind {
    pub const NAMES: &'static [&'static str] = &["shell", "guard", "overwrite", "update"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "shell" => Some(Self::Shell),
            "guard" => Some(Self::Guard),
            "overwrite" => Some(Self::Overwrite),
            "update" => Some(Self::Update),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Guard => "guard",
            Self::Overwrite => "overwrite",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs a rendered command through `sh -c` and captures its stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellStep {
    pub command: String,
}

impl DictObject for ShellStep {
    const NAME: &'static str = "ShellStep";
    const KEYS: &'static [KeySpec] = &[KeySpec::typed("command", ValueType::String)];

    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self> {
        let command = site.render(string_field(region, "command"))?;
        Ok(Self { command })
    }
}

impl ShellStep {
    pub fn run(&self) -> Result<Option<String>> {
        let output = Command::new("sh").arg("-c").arg(&self.command).output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(Some(stdout));
        }
        let status = match output.status.code() {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };
        Err(Error::CommandFailed {
            command: self.command.clone(),
            status,
            output: stdout + &String::from_utf8_lossy(&output.stderr),
        })
    }
}

/// Sets the gate for the steps after it from a list of conditions.
///
/// Conditions are rendered and evaluated when the step is built; the gate is
/// open only when every condition holds, so an empty list always opens it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardStep {
    pub conditions: Vec<String>,
    pub verdict: bool,
}

impl DictObject for GuardStep {
    const NAME: &'static str = "GuardStep";
    const KEYS: &'static [KeySpec] = &[KeySpec::predicate(
        "conditions",
        "a list of condition strings",
        is_string_list,
    )];

    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self> {
        let conditions = string_list_field(region, "conditions");
        let mut verdict = true;
        for raw in &conditions {
            let rendered = site.render(raw)?;
            let holds = condition::evaluate(&rendered, site.scopes()).map_err(|reason| {
                Error::Condition {
                    condition: rendered.clone(),
                    reason,
                    trail: site.trail().clone(),
                }
            })?;
            tracing::trace!("Condition {rendered:?} => {holds}");
            // Every condition is evaluated so malformed ones surface at load time.
            verdict &= holds;
        }
        Ok(Self {
            conditions,
            verdict,
        })
    }
}

/// Copies a source file over a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverwriteStep {
    pub source: String,
    pub target: String,
}

impl DictObject for OverwriteStep {
    const NAME: &'static str = "OverwriteStep";
    const KEYS: &'static [KeySpec] = &[
        KeySpec::typed("source", ValueType::String),
        KeySpec::typed("target", ValueType::String),
    ];

    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self> {
        Ok(Self {
            source: site.render(string_field(region, "source"))?,
            target: site.render(string_field(region, "target"))?,
        })
    }
}

/// Replaces marked sections of a target file with those of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStep {
    pub source: String,
    pub target: String,
    pub sections: Vec<String>,
    pub markers: Vec<String>,
}

impl DictObject for UpdateStep {
    const NAME: &'static str = "UpdateStep";
    const KEYS: &'static [KeySpec] = &[
        KeySpec::typed("source", ValueType::String),
        KeySpec::typed("target", ValueType::String),
        KeySpec::predicate("sections", "a list of section names", is_string_list),
        KeySpec::predicate("markers", "a list of marker strings", is_string_list),
    ];

    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self> {
        Ok(Self {
            source: site.render(string_field(region, "source"))?,
            target: site.render(string_field(region, "target"))?,
            sections: string_list_field(region, "sections"),
            markers: string_list_field(region, "markers"),
        })
    }
}

/// One executable unit of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Shell(ShellStep),
    Guard(GuardStep),
    Overwrite(OverwriteStep),
    Update(UpdateStep),
}

impl DictObject for Step {
    const NAME: &'static str = "Step";
    const KEYS: &'static [KeySpec] = &[KeySpec::present("kind")];

    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self> {
        let value = region.get("kind").unwrap_or(&Value::Null);
        let Some(kind) = value.as_str().and_then(StepKind::from_name) else {
            let kind = match value {
                Value::String(name) => name.clone(),
                other => render_scalar(other),
            };
            return Err(Error::UnknownVariant {
                kind,
                path: site.path().join("kind"),
                trail: site.trail().clone(),
            });
        };
        match kind {
            StepKind::Shell => ShellStep::from_dict(site).map(Self::Shell),
            StepKind::Guard => GuardStep::from_dict(site).map(Self::Guard),
            StepKind::Overwrite => OverwriteStep::from_dict(site).map(Self::Overwrite),
            StepKind::Update => UpdateStep::from_dict(site).map(Self::Update),
        }
    }
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Shell(_) => StepKind::Shell,
            Self::Guard(_) => StepKind::Guard,
            Self::Overwrite(_) => StepKind::Overwrite,
            Self::Update(_) => StepKind::Update,
        }
    }

    /// One line summary of what the step will do.
    pub fn describe(&self) -> String {
        match self {
            Self::Shell(step) => format!("CMD: {}", step.command),
            Self::Guard(step) => format!(
                "Guards: [{}] => {}",
                step.conditions.join(", "),
                if step.verdict { "RUN" } else { "SKIP" }
            ),
            Self::Overwrite(step) => format!("Overwrite: {} with {}", step.target, step.source),
            Self::Update(step) => format!("Update: {} with {}", step.target, step.source),
        }
    }

    /// Execute the step against the shared context.
    ///
    /// Guards always run and set the gate. Every other kind runs only while
    /// the gate is open, and is otherwise reported as skipped.
    pub fn execute(
        &self,
        context: &mut RunContext,
        reporter: &mut dyn Reporter,
    ) -> Result<Option<String>> {
        let description = self.describe();
        let gate = context.run_step;
        match self {
            Self::Guard(step) => run_gated(&description, true, reporter, || {
                context.run_step = step.verdict;
                Ok(None)
            }),
            Self::Shell(step) => run_gated(&description, gate, reporter, || step.run()),
            Self::Overwrite(step) => run_gated(&description, gate, reporter, || {
                let source = context.resolve_source(&step.source);
                let target = context.resolve_target(&step.target);
                files::overwrite(&source, &target)?;
                Ok(None)
            }),
            Self::Update(step) => run_gated(&description, gate, reporter, || {
                let source = context.resolve_source(&step.source);
                let target = context.resolve_target(&step.target);
                files::update(&source, &target, &step.sections, &step.markers)?;
                Ok(None)
            }),
        }
    }

    /// Summary value used when printing a dry run.
    pub fn to_value(&self) -> Value {
        Value::String(self.describe())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Execute steps in order with the gate opened at the start.
///
/// Returns each step's captured output; the first failure aborts the list.
pub fn run_steps(
    steps: &[Step],
    context: &mut RunContext,
    reporter: &mut dyn Reporter,
) -> Result<Vec<Option<String>>> {
    context.open_gate();
    let mut outputs = Vec::with_capacity(steps.len());
    for step in steps {
        outputs.push(step.execute(context, reporter)?);
    }
    Ok(outputs)
}
