// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! setitup - Recipe-driven environment bootstrapper
//!
//! This crate provides the core library for describing how to install and
//! configure named packages as nested configuration documents, validating those
//! documents against declared shapes, and executing the declared steps in order.
//!
//! # Overview
//!
//! A base directory holds two groups of documents: `settings/*.toml` and
//! `recipes/*.toml`. Each group is deep-merged into a single untyped mapping,
//! checked region by region against [`KeySpec`] declarations, and rebuilt into
//! typed values ([`Settings`], [`Recipes`]). Steps are then executed in
//! declaration order against a shared [`RunContext`], with guard steps gating
//! the steps that follow them.
//!
//! # Example
//!
//! ```toml
//! # recipes/ripgrep.toml
//! [[ripgrep.install.steps]]
//! kind = "guard"
//! conditions = ["not installed('rg')"]
//!
//! [[ripgrep.install.steps]]
//! kind = "shell"
//! command = "cargo install ripgrep --root {context.home_dir}/.local"
//!
//! [[ripgrep.config.steps]]
//! kind = "overwrite"
//! source = "files/ripgreprc"
//! target = "{env.HOME}/.config/ripgrep/config"
//! ```

pub mod condition;
pub mod context;
pub mod document;
pub mod error;
pub mod files;
pub mod object;
pub mod recipe;
pub mod report;
pub mod schema;
pub mod session;
pub mod settings;
pub mod step;
pub mod substitute;

pub use context::RunContext;
pub use document::{read_directory, read_documents, DocPath};
pub use error::{Error, Result};
pub use object::{DictObject, DictSingleton};
pub use recipe::{ConfigSpec, InstallSpec, Recipe, Recipes};
pub use report::{RecordingReporter, Reporter, StepEvent, StepStatus};
pub use schema::{check_dict, KeySpec, Site, Trail, Validator, ValueType};
pub use session::{Phase, Session};
pub use settings::Settings;
pub use step::{GuardStep, OverwriteStep, ShellStep, Step, StepKind, UpdateStep};
pub use substitute::{render, Scopes};

/// Name of the directory holding settings documents.
pub const SETTINGS_DIRNAME: &str = "settings";

/// Name of the directory holding recipe documents.
pub const RECIPES_DIRNAME: &str = "recipes";
