// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Path-tracked validation of document regions against declared key specs.

use std::fmt;

use serde_yaml::{Mapping, Value};

use crate::document::{render_region, render_scalar, type_name, DocPath};
use crate::substitute::Scopes;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./schema_test.rs"]
mod schema_test;

/// Primitive type tags a key can be required to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Integer,
    Float,
    String,
    Sequence,
    Table,
}

impl ValueType {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Bool => value.is_bool(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_f64(),
            Self::String => value.is_string(),
            Self::Sequence => value.is_sequence(),
            Self::Table => value.is_mapping(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "a boolean"),
            Self::Integer => write!(f, "an integer"),
            Self::Float => write!(f, "a float"),
            Self::String => write!(f, "a string"),
            Self::Sequence => write!(f, "a sequence"),
            Self::Table => write!(f, "a table"),
        }
    }
}

/// How the value under a required key is checked.
#[derive(Debug, Clone, Copy)]
pub enum Validator {
    /// Only presence is required.
    Present,
    /// The value must have this runtime type.
    Type(ValueType),
    /// The value must satisfy a predicate; `name` describes what it expects.
    Predicate {
        name: &'static str,
        check: fn(&Value) -> bool,
    },
}

impl Validator {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Present => true,
            Self::Type(ty) => ty.matches(value),
            Self::Predicate { check, .. } => check(value),
        }
    }

    pub fn expectation(&self) -> String {
        match self {
            Self::Present => "any value".to_string(),
            Self::Type(ty) => ty.to_string(),
            Self::Predicate { name, .. } => name.to_string(),
        }
    }
}

/// A required key and the validator applied to its value.
#[derive(Debug, Clone, Copy)]
pub struct KeySpec {
    pub key: &'static str,
    pub validator: Validator,
}

impl KeySpec {
    pub const fn present(key: &'static str) -> Self {
        Self {
            key,
            validator: Validator::Present,
        }
    }

    pub const fn typed(key: &'static str, ty: ValueType) -> Self {
        Self {
            key,
            validator: Validator::Type(ty),
        }
    }

    pub const fn predicate(
        key: &'static str,
        name: &'static str,
        check: fn(&Value) -> bool,
    ) -> Self {
        Self {
            key,
            validator: Validator::Predicate { name, check },
        }
    }
}

/// True for a sequence whose items are all strings. Empty sequences pass.
pub fn is_string_list(value: &Value) -> bool {
    value
        .as_sequence()
        .is_some_and(|items| items.iter().all(Value::is_string))
}

/// True for a table mapping names to string lists.
pub fn is_bundle_table(value: &Value) -> bool {
    value
        .as_mapping()
        .is_some_and(|table| table.iter().all(|(k, v)| k.is_string() && is_string_list(v)))
}

/// One enclosing construction in progress when an error was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub action: FrameAction,
    pub type_name: &'static str,
    pub path: DocPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    Constructing,
    Updating,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            FrameAction::Constructing => "constructing",
            FrameAction::Updating => "updating",
        };
        write!(f, "while {action} `{}` at {}", self.type_name, self.path)
    }
}

/// The stack of constructions enclosing a point in a document walk.
///
/// Frames are stored outermost first and threaded down through nested
/// construction, so an error raised anywhere carries the full chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trail(Vec<Frame>);

impl Trail {
    pub fn push(&self, frame: Frame) -> Self {
        let mut frames = self.0.clone();
        frames.push(frame);
        Self(frames)
    }

    /// Frames ordered outermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.0
    }

    /// Type names of the frames, innermost first.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.0.iter().rev().map(|frame| frame.type_name).collect()
    }

    /// Rendered frames, innermost first.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.0.iter().rev().map(ToString::to_string)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A position in a document being turned into typed values.
///
/// Carries the full root (so nested builders can address sibling paths), the
/// path to the current region, the construction trail, and the substitution
/// scopes used to render templated fields.
#[derive(Clone)]
pub struct Site<'a> {
    root: &'a Value,
    path: DocPath,
    trail: Trail,
    scopes: &'a Scopes<'a>,
}

impl<'a> Site<'a> {
    pub fn new(root: &'a Value, scopes: &'a Scopes<'a>) -> Self {
        Self {
            root,
            path: DocPath::root(),
            trail: Trail::default(),
            scopes,
        }
    }

    /// A site at an explicit path below `root`.
    pub fn at(root: &'a Value, path: DocPath, scopes: &'a Scopes<'a>) -> Self {
        Self {
            path,
            ..Self::new(root, scopes)
        }
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    pub fn path(&self) -> &DocPath {
        &self.path
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn scopes(&self) -> &'a Scopes<'a> {
        self.scopes
    }

    /// The site one component deeper.
    pub fn child<S: Into<String>>(&self, component: S) -> Self {
        Self {
            path: self.path.join(component),
            ..self.clone()
        }
    }

    /// The same site inside a new construction frame.
    pub fn enter(&self, action: FrameAction, type_name: &'static str) -> Self {
        let frame = Frame {
            action,
            type_name,
            path: self.path.clone(),
        };
        Self {
            trail: self.trail.push(frame),
            ..self.clone()
        }
    }

    /// Render a templated string against this site's scopes.
    pub fn render(&self, template: &str) -> Result<String> {
        crate::substitute::render_in(template, self.scopes, &self.trail)
    }
}

/// Resolve the site's path and validate the region found there.
///
/// Every path component must resolve through a table key or, for sequences,
/// through a stringified in-bounds index. The value reached must be a table,
/// and every key spec must be present and accepted by its validator.
pub fn check_dict<'a>(site: &Site<'a>, keys: &[KeySpec]) -> Result<&'a Mapping> {
    let path = site.path();
    let mut current = site.root();

    for (depth, component) in path.components().iter().enumerate() {
        let next = match current {
            Value::Mapping(table) => table.get(component.as_str()),
            Value::Sequence(items) => component
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        };
        current = next.ok_or_else(|| Error::PathResolution {
            path: path.clone(),
            reached: path.prefix(depth),
            region: render_region(current),
            trail: site.trail().clone(),
        })?;
    }

    let region = match current {
        Value::Mapping(table) => table,
        other => {
            return Err(Error::TerminalType {
                path: path.clone(),
                found: type_name(other),
                region: render_region(other),
                trail: site.trail().clone(),
            });
        }
    };

    for spec in keys {
        let Some(value) = region.get(spec.key) else {
            return Err(Error::MissingKey {
                key: spec.key.to_string(),
                path: path.join(spec.key),
                region: render_region(current),
                trail: site.trail().clone(),
            });
        };
        if !spec.validator.accepts(value) {
            return Err(Error::InvalidValue {
                key: spec.key.to_string(),
                path: path.join(spec.key),
                value: render_scalar(value),
                expected: spec.validator.expectation(),
                region: render_region(current),
                trail: site.trail().clone(),
            });
        }
    }

    Ok(region)
}

/// A string field of a validated region; empty when absent.
pub(crate) fn string_field<'r>(region: &'r Mapping, key: &str) -> &'r str {
    region.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// A string-list field of a validated region; empty when absent.
pub(crate) fn string_list_field(region: &Mapping, key: &str) -> Vec<String> {
    region
        .get(key)
        .and_then(Value::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
