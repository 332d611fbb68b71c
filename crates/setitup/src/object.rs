// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! Typed values built from validated document regions.

use once_cell::unsync::OnceCell;
use serde_yaml::Mapping;

use crate::schema::{check_dict, FrameAction, KeySpec, Site};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./object_test.rs"]
mod object_test;

/// A value constructed from a table in a document.
///
/// Implementors declare the keys they require and a builder that receives the
/// validated region together with the site it was found at. Construction
/// happens through [`DictObject::from_dict`], which validates the region and
/// records a construction frame so that failures anywhere below report the
/// whole chain of enclosing types.
pub trait DictObject: Sized {
    /// Name used in construction frames and diagnostics.
    const NAME: &'static str;

    /// Keys that must be present in the region, with their validators.
    const KEYS: &'static [KeySpec] = &[];

    /// Build the value from a region that has passed [`Self::KEYS`].
    fn from_region(region: &Mapping, site: &Site<'_>) -> Result<Self>;

    /// Validate the region at `site` and build the value from it.
    fn from_dict(site: &Site<'_>) -> Result<Self> {
        let site = site.enter(FrameAction::Constructing, Self::NAME);
        let region = check_dict(&site, Self::KEYS)?;
        Self::from_region(region, &site)
    }
}

/// A process-scoped slot for a [`DictObject`] that is loaded exactly once.
///
/// Reading before loading is an [`Error::Uninitialized`] and loading twice is
/// an [`Error::AlreadyInitialized`]; neither is ever silently tolerated.
#[derive(Debug)]
pub struct DictSingleton<T> {
    cell: OnceCell<T>,
}

impl<T> Default for DictSingleton<T> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }
}

impl<T: DictObject> DictSingleton<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the region at `site` and store the value built from it.
    pub fn load(&self, site: &Site<'_>) -> Result<&T> {
        if self.is_ready() {
            return Err(Error::AlreadyInitialized(T::NAME));
        }
        let site = site.enter(FrameAction::Updating, T::NAME);
        let region = check_dict(&site, T::KEYS)?;
        let value = T::from_region(region, &site)?;
        tracing::debug!("Loaded {} from {}", T::NAME, site.path());
        self.cell
            .set(value)
            .map_err(|_| Error::AlreadyInitialized(T::NAME))?;
        self.get()
    }

    /// The loaded value.
    pub fn get(&self) -> Result<&T> {
        self.cell.get().ok_or(Error::Uninitialized(T::NAME))
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }
}
