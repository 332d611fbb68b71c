// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::substitute::Resolved;
use crate::Result;

#[cfg(test)]
#[path = "./context_test.rs"]
mod context_test;

/// Names of the fields exposed to templates under the `context` scope.
pub const CONTEXT_FIELDS: &[&str] = &[
    "base_directory",
    "packages",
    "force",
    "verbose",
    "run_step",
    "home_dir",
    "tmp_dir",
];

/// Mutable state shared by every step of a run.
///
/// Owns a scratch directory that is removed when the context is dropped.
#[derive(Debug)]
pub struct RunContext {
    pub base_directory: PathBuf,
    pub packages: Vec<String>,
    pub force: bool,
    pub verbose: bool,
    /// The gate: whether the next non-guard step executes.
    pub run_step: bool,
    pub home_dir: PathBuf,
    env: BTreeMap<String, String>,
    tmp_dir: TempDir,
}

impl RunContext {
    /// A context over the current process environment.
    pub fn new<P: Into<PathBuf>>(base_directory: P) -> Result<Self> {
        let env = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self::with_env(base_directory, env)
    }

    /// A context over an explicit environment snapshot.
    pub fn with_env<P: Into<PathBuf>>(
        base_directory: P,
        env: BTreeMap<String, String>,
    ) -> Result<Self> {
        let home_dir = env
            .get("HOME")
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .unwrap_or_default();
        let tmp_dir = tempfile::Builder::new().prefix("setitup-").tempdir()?;
        tracing::debug!("Scratch directory {}", tmp_dir.path().display());
        Ok(Self {
            base_directory: base_directory.into(),
            packages: Vec::new(),
            force: false,
            verbose: false,
            run_step: true,
            home_dir,
            env,
            tmp_dir,
        })
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn tmp_dir(&self) -> &Path {
        self.tmp_dir.path()
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Reset the gate so that the next step runs.
    pub fn open_gate(&mut self) {
        self.run_step = true;
    }

    /// Resolve a named field for the `context` template scope.
    pub fn field(&self, name: &str) -> Option<Resolved> {
        let value = match name {
            "base_directory" => Resolved::Text(self.base_directory.display().to_string()),
            "packages" => Resolved::Text(self.packages.join(" ")),
            "force" => Resolved::Bool(self.force),
            "verbose" => Resolved::Bool(self.verbose),
            "run_step" => Resolved::Bool(self.run_step),
            "home_dir" => Resolved::Text(self.home_dir.display().to_string()),
            "tmp_dir" => Resolved::Text(self.tmp_dir().display().to_string()),
            _ => return None,
        };
        Some(value)
    }

    /// Expand a leading `~` and resolve relative paths against the base directory.
    pub fn resolve_source(&self, raw: &str) -> PathBuf {
        let path = self.expand_home(raw);
        if path.is_absolute() {
            path
        } else {
            self.base_directory.join(path)
        }
    }

    /// Expand a leading `~`; other paths are used as given.
    pub fn resolve_target(&self, raw: &str) -> PathBuf {
        self.expand_home(raw)
    }

    fn expand_home(&self, raw: &str) -> PathBuf {
        if raw == "~" {
            return self.home_dir.clone();
        }
        match raw.strip_prefix("~/") {
            Some(rest) => self.home_dir.join(rest),
            None => PathBuf::from(raw),
        }
    }
}
