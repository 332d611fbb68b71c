// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::object::DictObject;
use crate::schema::{is_bundle_table, string_list_field, KeySpec, Site, ValueType};
use crate::substitute::Resolved;
use crate::Result;

#[cfg(test)]
#[path = "./settings_test.rs"]
mod settings_test;

/// Global settings merged from the `settings` documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Whether the runner may use elevated privileges.
    pub root: bool,
    /// Named groups of packages selectable in place of a single package.
    pub bundles: BTreeMap<String, Vec<String>>,
}

impl DictObject for Settings {
    const NAME: &'static str = "Settings";
    const KEYS: &'static [KeySpec] = &[
        KeySpec::typed("root", ValueType::Bool),
        KeySpec::predicate("bundles", "a table of package name lists", is_bundle_table),
    ];

    fn from_region(region: &Mapping, _site: &Site<'_>) -> Result<Self> {
        let root = region.get("root").and_then(Value::as_bool).unwrap_or_default();
        let bundles = region
            .get("bundles")
            .and_then(Value::as_mapping)
            .map(|table| {
                table
                    .iter()
                    .filter_map(|(name, _)| name.as_str())
                    .map(|name| (name.to_string(), string_list_field(table, name)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self { root, bundles })
    }
}

impl Settings {
    pub fn bundle(&self, name: &str) -> Option<&[String]> {
        self.bundles.get(name).map(Vec::as_slice)
    }

    /// The packages selected by `name`: a bundle's members, or the name itself.
    pub fn expand(&self, name: &str) -> Vec<String> {
        match self.bundle(name) {
            Some(packages) => packages.to_vec(),
            None => vec![name.to_string()],
        }
    }

    /// Resolve a dotted field path for the `settings` template scope.
    pub fn field(&self, path: &[&str]) -> Option<Resolved> {
        match path {
            ["root"] => Some(Resolved::Bool(self.root)),
            ["bundles"] => Some(Resolved::Text(
                self.bundles.keys().cloned().collect::<Vec<_>>().join(" "),
            )),
            ["bundles", name] => self
                .bundle(name)
                .map(|packages| Resolved::Text(packages.join(" "))),
            _ => None,
        }
    }
}
