// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for setitup operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::document::DocPath;
use crate::schema::Trail;

/// Convenience Result type with setitup Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or running recipes.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// A path component could not be followed through the document
    #[error("Error looking for value at path {path}, stopped at {reached}")]
    #[diagnostic(
        code(setitup::path_resolution),
        help("{}", report(trail, Some(region)))
    )]
    PathResolution {
        path: DocPath,
        reached: DocPath,
        region: String,
        trail: Trail,
    },

    /// The value at a validated path is not a table
    #[error("Expected a table at path {path}, found a {found}")]
    #[diagnostic(
        code(setitup::terminal_type),
        help("{}", report(trail, Some(region)))
    )]
    TerminalType {
        path: DocPath,
        found: &'static str,
        region: String,
        trail: Trail,
    },

    /// A required key is absent from a table
    #[error("Missing key `{key}` at path {path}")]
    #[diagnostic(
        code(setitup::missing_key),
        help("{}", report(trail, Some(region)))
    )]
    MissingKey {
        key: String,
        path: DocPath,
        region: String,
        trail: Trail,
    },

    /// A key is present but its value has the wrong type or shape
    #[error("Invalid value {value} at path {path}, expected {expected}")]
    #[diagnostic(
        code(setitup::invalid_value),
        help("{}", report(trail, Some(region)))
    )]
    InvalidValue {
        key: String,
        path: DocPath,
        value: String,
        expected: String,
        region: String,
        trail: Trail,
    },

    /// A step declares a `kind` outside the known set
    #[error("Unknown step kind `{kind}` at path {path}")]
    #[diagnostic(
        code(setitup::unknown_variant),
        help("Valid kinds are: {}\n{}", crate::step::StepKind::NAMES.join(", "), report(trail, None))
    )]
    UnknownVariant {
        kind: String,
        path: DocPath,
        trail: Trail,
    },

    /// A template references a scope or field that does not exist
    #[error("Cannot substitute `{{{reference}}}` in {template:?}: {reason}")]
    #[diagnostic(code(setitup::substitution), help("{}", report(trail, None)))]
    Substitution {
        template: String,
        reference: String,
        reason: String,
        trail: Trail,
    },

    /// A guard condition could not be parsed or evaluated
    #[error("Invalid guard condition {condition:?}: {reason}")]
    #[diagnostic(code(setitup::condition), help("{}", report(trail, None)))]
    Condition {
        condition: String,
        reason: String,
        trail: Trail,
    },

    /// An external command exited unsuccessfully
    #[error("Command failed ({status}): {command}")]
    #[diagnostic(code(setitup::command_failed), help("{}", output_message(output)))]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    /// A singleton was read before it was loaded
    #[error("{0} has not been initialized")]
    #[diagnostic(code(setitup::uninitialized))]
    Uninitialized(&'static str),

    /// A singleton was loaded twice
    #[error("{0} has already been initialized")]
    #[diagnostic(
        code(setitup::already_initialized),
        help("Settings and recipes are loaded once per session")
    )]
    AlreadyInitialized(&'static str),

    /// A selected package has no recipe
    #[error("Missing recipe for package `{package}`")]
    #[diagnostic(code(setitup::missing_recipe), help("{}", suggestion_message(similar)))]
    MissingRecipe {
        package: String,
        similar: Vec<String>,
    },

    /// A document directory does not exist
    #[error("Directory not found: {0:?}")]
    #[diagnostic(
        code(setitup::directory_not_found),
        help("The base directory must contain `settings` and `recipes` directories")
    )]
    DirectoryNotFound(PathBuf),

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(setitup::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Invalid TOML in a document
    #[error("Invalid TOML file {path:?}: {error}")]
    #[diagnostic(code(setitup::invalid_toml))]
    InvalidToml {
        path: PathBuf,
        #[source]
        error: toml::de::Error,
    },

    /// Invalid YAML in a document
    #[error("Invalid YAML file {path:?}: {error}")]
    #[diagnostic(code(setitup::invalid_yaml))]
    InvalidYaml {
        path: PathBuf,
        #[source]
        error: serde_yaml::Error,
    },

    /// A document's top level is not a table
    #[error("Document {path:?} must be a table at the top level, found a {found}")]
    #[diagnostic(code(setitup::not_a_mapping))]
    NotAMapping { path: PathBuf, found: &'static str },

    /// An overwrite or update step could not touch the filesystem
    #[error("Failed to {action} {target:?}")]
    #[diagnostic(code(setitup::file_operation))]
    FileOperation {
        action: &'static str,
        target: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// An update step's markers or sections cannot be applied
    #[error("Cannot update {target:?}: {reason}")]
    #[diagnostic(
        code(setitup::invalid_markers),
        help("Update steps take `markers = [\"<begin>\", \"<end>\"]`")
    )]
    InvalidMarkers { target: PathBuf, reason: String },

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(setitup::io_error))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The document path this error points at, if it is a schema error.
    pub fn path(&self) -> Option<&DocPath> {
        match self {
            Self::PathResolution { path, .. }
            | Self::TerminalType { path, .. }
            | Self::MissingKey { path, .. }
            | Self::InvalidValue { path, .. }
            | Self::UnknownVariant { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The construction trail accumulated before this error was raised.
    pub fn trail(&self) -> Option<&Trail> {
        match self {
            Self::PathResolution { trail, .. }
            | Self::TerminalType { trail, .. }
            | Self::MissingKey { trail, .. }
            | Self::InvalidValue { trail, .. }
            | Self::UnknownVariant { trail, .. }
            | Self::Substitution { trail, .. }
            | Self::Condition { trail, .. } => Some(trail),
            _ => None,
        }
    }
}

fn report(trail: &Trail, region: Option<&String>) -> String {
    let mut lines: Vec<String> = trail.lines().collect();
    if let Some(region) = region {
        lines.push("Current context:".to_string());
        lines.extend(region.lines().map(|line| format!("  {line}")));
    }
    lines.join("\n")
}

fn output_message(output: &str) -> String {
    if output.trim().is_empty() {
        "The command produced no output".to_string()
    } else {
        format!("Output:\n{}", output.trim_end())
    }
}

fn suggestion_message(similar: &[String]) -> String {
    if similar.is_empty() {
        "Check that the package or bundle name is correct".to_string()
    } else {
        format!("Did you mean one of: {}?", similar.join(", "))
    }
}
