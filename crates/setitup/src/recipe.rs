// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Recipes: per-package install and config step lists.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::object::DictObject;
use crate::schema::{KeySpec, Site, ValueType};
use crate::step::Step;
use crate::Result;

#[cfg(test)]
#[path = "./recipe_test.rs"]
mod recipe_test;

/// Build one step per index of the validated `steps` sequence.
fn steps_from_region(region: &Mapping, site: &Site<'_>) -> Result<Vec<Step>> {
    let count = region
        .get("steps")
        .and_then(Value::as_sequence)
        .map_or(0, Vec::len);
    let steps = site.child("steps");
    (0..count)
        .map(|index| Step::from_dict(&steps.child(index.to_string())))
        .collect()
}

fn steps_to_value(steps: &[Step]) -> Value {
    let mut spec = Mapping::new();
    spec.insert(
        "steps".into(),
        Value::Sequence(steps.iter().map(Step::to_value).collect()),
    );
    Value::Mapping(spec)
}

/// Steps that install a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallSpec {
    pub steps: Vec<Step>,
}

impl DictObject for InstallSpec {
    const NAME: &'static str = "InstallSpec";
    const KEYS: &'static [KeySpec] = &[KeySpec::typed("steps", ValueType::Sequence)];

    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self> {
        let steps = steps_from_region(region, site)?;
        Ok(Self { steps })
    }
}

/// Steps that configure an installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSpec {
    pub steps: Vec<Step>,
}

impl DictObject for ConfigSpec {
    const NAME: &'static str = "ConfigSpec";
    const KEYS: &'static [KeySpec] = &[KeySpec::typed("steps", ValueType::Sequence)];

    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self> {
        let steps = steps_from_region(region, site)?;
        Ok(Self { steps })
    }
}

/// Everything known about how to set up one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe {
    pub install: Option<InstallSpec>,
    pub config: Option<ConfigSpec>,
}

impl DictObject for Recipe {
    const NAME: &'static str = "Recipe";

    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self> {
        let install = match region.contains_key("install") {
            true => Some(InstallSpec::from_dict(&site.child("install"))?),
            false => None,
        };
        let config = match region.contains_key("config") {
            true => Some(ConfigSpec::from_dict(&site.child("config"))?),
            false => None,
        };
        Ok(Self { install, config })
    }
}

impl Recipe {
    pub fn install_steps(&self) -> Option<&[Step]> {
        self.install.as_ref().map(|spec| spec.steps.as_slice())
    }

    pub fn config_steps(&self) -> Option<&[Step]> {
        self.config.as_ref().map(|spec| spec.steps.as_slice())
    }

    pub fn to_value(&self) -> Value {
        let mut summary = Mapping::new();
        if let Some(install) = &self.install {
            summary.insert("install".into(), steps_to_value(&install.steps));
        }
        if let Some(config) = &self.config {
            summary.insert("config".into(), steps_to_value(&config.steps));
        }
        Value::Mapping(summary)
    }
}

/// The registry of recipes, keyed by package name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipes {
    recipes: BTreeMap<String, Recipe>,
}

impl DictObject for Recipes {
    const NAME: &'static str = "Recipes";

    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self> {
        let mut recipes = BTreeMap::new();
        for key in region.keys() {
            let Some(name) = key.as_str() else {
                tracing::warn!("Ignoring recipe with a non-string name: {key:?}");
                continue;
            };
            let recipe = Recipe::from_dict(&site.child(name))?;
            recipes.insert(name.to_string(), recipe);
        }
        Ok(Self { recipes })
    }
}

impl Recipes {
    pub fn get(&self, package: &str) -> Option<&Recipe> {
        self.recipes.get(package)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.recipes.contains_key(package)
    }

    /// Package names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Recipe)> {
        self.recipes.iter().map(|(name, recipe)| (name.as_str(), recipe))
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Package names close to `package`, for suggesting corrections.
    pub fn similar(&self, package: &str) -> Vec<String> {
        let wanted = package.to_lowercase();
        self.names()
            .filter(|name| {
                let name = name.to_lowercase();
                name.contains(&wanted) || wanted.contains(&name) || edit_distance(&name, &wanted) <= 2
            })
            .map(String::from)
            .collect()
    }

    /// Summaries of the named recipes, or of all recipes when `packages` is empty.
    pub fn to_value(&self, packages: &[String]) -> Value {
        let mut summary = Mapping::new();
        for (name, recipe) in self.iter() {
            if packages.is_empty() || packages.iter().any(|p| p == name) {
                summary.insert(name.into(), recipe.to_value());
            }
        }
        Value::Mapping(summary)
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }
    previous[b.len()]
}
