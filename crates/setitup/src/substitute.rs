// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Template substitution over the `settings`, `context` and `env` scopes.
//!
//! Templates embed references as `{scope.field}`; `{{` and `}}` produce
//! literal braces. Unknown scopes and unknown fields of `settings` or
//! `context` are errors, while an unset environment variable renders empty.

use std::fmt;

use crate::context::{RunContext, CONTEXT_FIELDS};
use crate::schema::Trail;
use crate::settings::Settings;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./substitute_test.rs"]
mod substitute_test;

/// Scope names accepted as the first component of a reference.
pub const SCOPES: &[&str] = &["settings", "context", "env"];

/// The value a reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Bool(bool),
    Text(String),
    /// An environment variable that is not set.
    Missing,
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Missing => Ok(()),
        }
    }
}

/// The named scopes visible to templates and guard conditions.
#[derive(Debug, Clone, Copy)]
pub struct Scopes<'a> {
    context: &'a RunContext,
    settings: Option<&'a Settings>,
}

impl<'a> Scopes<'a> {
    pub fn new(context: &'a RunContext, settings: Option<&'a Settings>) -> Self {
        Self { context, settings }
    }

    pub fn context(&self) -> &'a RunContext {
        self.context
    }

    pub fn settings(&self) -> Option<&'a Settings> {
        self.settings
    }

    /// Resolve a dotted reference such as `context.home_dir` or `env.HOME`.
    ///
    /// The error is a human readable reason.
    pub fn lookup(&self, reference: &str) -> std::result::Result<Resolved, String> {
        let parts: Vec<&str> = reference.split('.').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err("malformed reference".to_string());
        }
        match parts.as_slice() {
            ["settings", rest @ ..] => {
                let settings = self
                    .settings
                    .ok_or_else(|| Error::Uninitialized("Settings").to_string())?;
                settings
                    .field(rest)
                    .ok_or_else(|| format!("`settings` has no field `{}`", rest.join(".")))
            }
            ["context", name] => self
                .context
                .field(name)
                .ok_or_else(|| unknown_context_field(name)),
            ["context", rest @ ..] => Err(unknown_context_field(&rest.join("."))),
            ["env", name] => Ok(self
                .context
                .env()
                .get(*name)
                .map_or(Resolved::Missing, |value| Resolved::Text(value.clone()))),
            ["env", ..] => Err("`env` references take exactly one variable name".to_string()),
            [scope, ..] => Err(format!(
                "unknown scope `{scope}`, expected one of: {}",
                SCOPES.join(", ")
            )),
            [] => Err("malformed reference".to_string()),
        }
    }
}

/// Render a template against `scopes`.
pub fn render(template: &str, scopes: &Scopes<'_>) -> Result<String> {
    render_in(template, scopes, &Trail::default())
}

/// Render a template, attaching `trail` to any error.
pub(crate) fn render_in(template: &str, scopes: &Scopes<'_>, trail: &Trail) -> Result<String> {
    let fail = |reference: &str, reason: String| Error::Substitution {
        template: template.to_string(),
        reference: reference.to_string(),
        reason,
        trail: trail.clone(),
    };

    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                rendered.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                rendered.push('}');
            }
            '{' => {
                let mut reference = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(fail(&reference, "nested `{` in reference".to_string()));
                        }
                        c => reference.push(c),
                    }
                }
                if !closed {
                    return Err(fail(&reference, "unclosed `{`".to_string()));
                }
                let reference = reference.trim();
                if reference.is_empty() {
                    return Err(fail(reference, "empty reference".to_string()));
                }
                let value = scopes
                    .lookup(reference)
                    .map_err(|reason| fail(reference, reason))?;
                rendered.push_str(&value.to_string());
            }
            '}' => {
                return Err(fail("}", "single `}` in template, write `}}` for a literal brace".to_string()));
            }
            c => rendered.push(c),
        }
    }
    Ok(rendered)
}

fn unknown_context_field(name: &str) -> String {
    format!(
        "`context` has no field `{name}`, expected one of: {}",
        CONTEXT_FIELDS.join(", ")
    )
}
