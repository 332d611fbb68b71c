// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use serde_yaml::Value;

use crate::context::RunContext;
use crate::document::read_directory;
use crate::object::DictSingleton;
use crate::recipe::Recipes;
use crate::report::Reporter;
use crate::schema::Site;
use crate::settings::Settings;
use crate::step::run_steps;
use crate::substitute::Scopes;
use crate::{Error, Result, RECIPES_DIRNAME, SETTINGS_DIRNAME};

#[cfg(test)]
#[path = "./session_test.rs"]
mod session_test;

/// Which step list of each selected recipe to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Install,
    Config,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => f.write_str("install"),
            Self::Config => f.write_str("config"),
        }
    }
}

/// One invocation of the bootstrapper.
///
/// Settings are loaded before recipes so that recipe templates can read
/// them; each is loaded at most once.
#[derive(Debug)]
pub struct Session {
    context: RunContext,
    settings: DictSingleton<Settings>,
    recipes: DictSingleton<Recipes>,
}

impl Session {
    pub fn new(context: RunContext) -> Self {
        Self {
            context,
            settings: DictSingleton::new(),
            recipes: DictSingleton::new(),
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn settings(&self) -> Result<&Settings> {
        self.settings.get()
    }

    pub fn recipes(&self) -> Result<&Recipes> {
        self.recipes.get()
    }

    /// Load settings from a merged settings document.
    pub fn load_settings(&self, document: &Value) -> Result<&Settings> {
        let scopes = Scopes::new(&self.context, None);
        self.settings.load(&Site::new(document, &scopes))
    }

    /// Load recipes from a merged recipes document.
    ///
    /// Templates may reference `settings` only once settings are loaded.
    pub fn load_recipes(&self, document: &Value) -> Result<&Recipes> {
        let scopes = Scopes::new(&self.context, self.settings.get().ok());
        self.recipes.load(&Site::new(document, &scopes))
    }

    /// Load `settings/` then `recipes/` from the base directory.
    pub fn load_directory(&self) -> Result<()> {
        let base = &self.context.base_directory;
        let settings = read_directory(base.join(SETTINGS_DIRNAME))?;
        self.load_settings(&settings)?;
        let recipes = read_directory(base.join(RECIPES_DIRNAME))?;
        let loaded = self.load_recipes(&recipes)?;
        tracing::info!("Loaded {} recipes from {}", loaded.len(), base.display());
        Ok(())
    }

    /// Select a bundle or single package to run.
    ///
    /// Every selected package must have a recipe.
    pub fn select(&mut self, name: &str) -> Result<&[String]> {
        let settings = self.settings.get()?;
        let recipes = self.recipes.get()?;
        let packages = settings.expand(name);
        if packages.is_empty() {
            tracing::warn!("Bundle {name} has no packages");
        }
        if let Some(missing) = packages.iter().find(|package| !recipes.contains(package)) {
            return Err(Error::MissingRecipe {
                package: missing.clone(),
                similar: recipes.similar(missing),
            });
        }
        tracing::debug!("Selected {}", packages.join(", "));
        self.context.packages = packages;
        Ok(&self.context.packages)
    }

    /// Run one phase of every selected package, in selection order.
    ///
    /// Packages without steps for the phase are reported and skipped.
    pub fn run(&mut self, phase: Phase, reporter: &mut dyn Reporter) -> Result<()> {
        let recipes = self.recipes.get()?;
        let packages = self.context.packages.clone();
        for package in &packages {
            let recipe = recipes.get(package).ok_or_else(|| Error::MissingRecipe {
                package: package.clone(),
                similar: recipes.similar(package),
            })?;
            reporter.section(&format!("{phase} {package}"));
            let steps = match phase {
                Phase::Install => recipe.install_steps(),
                Phase::Config => recipe.config_steps(),
            };
            let Some(steps) = steps else {
                tracing::warn!("{package} has no {phase} steps, skipping");
                continue;
            };
            run_steps(steps, &mut self.context, reporter)?;
        }
        Ok(())
    }

    /// Summaries of the selected recipes, or of every recipe if none is selected.
    pub fn summary(&self) -> Result<Value> {
        Ok(self.recipes.get()?.to_value(&self.context.packages))
    }
}
