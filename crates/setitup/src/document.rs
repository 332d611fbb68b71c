// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Untyped document model, document paths, and reading/merging of documents.
//!
//! Documents are read into [`serde_yaml::Value`] regardless of their on-disk
//! format, so that TOML and YAML sources can be merged and validated with the
//! same machinery.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./document_test.rs"]
mod document_test;

/// File extensions picked up when reading a document directory.
const DOCUMENT_EXTENSIONS: &[&str] = &["toml", "yaml", "yml"];

/// A path into a nested document.
///
/// Each component is a mapping key, or a stringified integer index when the
/// value it addresses is a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// The empty path, addressing the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path extended by one component.
    pub fn join<S: Into<String>>(&self, component: S) -> Self {
        let mut components = self.0.clone();
        components.push(component.into());
        Self(components)
    }

    /// The first `len` components of this path.
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0.iter().take(len).cloned().collect())
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DocPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join(" => "))
    }
}

/// Human readable name of the runtime type of a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "table",
        Value::Tagged(_) => "tagged value",
    }
}

/// Render a value as YAML for use in diagnostics.
pub fn render_region(value: &Value) -> String {
    match serde_yaml::to_string(value) {
        Ok(rendered) => rendered.trim_end().to_string(),
        Err(_) => format!("{value:?}"),
    }
}

/// Render a scalar value inline, as it would be written in a document.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => render_region(other),
    }
}

/// Deep-merge `overlay` into `base`.
///
/// Mappings merge key by key; any other value at a matching path is replaced
/// by the overlay's value.
pub fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Read a single document from disk.
///
/// Returns `None` when the file does not exist. The format is chosen by
/// extension: `.yaml`/`.yml` are YAML, everything else is TOML.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Option<Value>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|error| Error::ReadFailed {
        path: path.to_path_buf(),
        error,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    let value: Value = if is_yaml {
        serde_yaml::from_str(&content).map_err(|error| Error::InvalidYaml {
            path: path.to_path_buf(),
            error,
        })?
    } else {
        toml::from_str(&content).map_err(|error| Error::InvalidToml {
            path: path.to_path_buf(),
            error,
        })?
    };

    match value {
        Value::Null => Ok(Some(Value::Mapping(Mapping::new()))),
        Value::Mapping(_) => Ok(Some(value)),
        other => Err(Error::NotAMapping {
            path: path.to_path_buf(),
            found: type_name(&other),
        }),
    }
}

/// Read and deep-merge documents in order; later documents win.
///
/// Files that do not exist contribute nothing.
pub fn read_documents<I, P>(paths: I) -> Result<Value>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut merged = Value::Mapping(Mapping::new());
    for path in paths {
        let path = path.as_ref();
        match read_document(path)? {
            Some(document) => {
                tracing::debug!("Read document {}", path.display());
                merge_into(&mut merged, document);
            }
            None => tracing::debug!("Skipping missing document {}", path.display()),
        }
    }
    Ok(merged)
}

/// List the document files directly inside `dir`, sorted by path.
pub fn list_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }
    let dir = dunce::canonicalize(dir)?;
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());

    let mut found = Vec::new();
    for ext in DOCUMENT_EXTENSIONS {
        let pattern = format!("{escaped}/*.{ext}");
        let paths = glob::glob(&pattern).map_err(|e| {
            Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;
        for entry in paths {
            let path = entry.map_err(|e| Error::Io(e.into_error()))?;
            if path.is_file() {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Read every document inside `dir` and merge them into a single mapping.
pub fn read_directory<P: AsRef<Path>>(dir: P) -> Result<Value> {
    let paths = list_documents(dir)?;
    read_documents(&paths)
}
