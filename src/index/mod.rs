//! Remote version lookup against a package index.
//!
//! The index is queried per package name. A lookup distinguishes three
//! outcomes so callers never confuse "unknown package" with "known package
//! without releases".

mod pypi;

use anyhow::Result;
use async_trait::async_trait;

pub use pypi::{DEFAULT_INDEX_URL, PyPiIndex};

/// A single published version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionRecord {
    /// Version string as published (e.g. "2.31.0", "1.0rc1")
    pub version: String,
    /// Every file of the release was yanked
    pub yanked: bool,
}

impl VersionRecord {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }
}

/// Outcome of [`PackageIndex::available_versions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The index does not know the package.
    NotFound,
    /// The package exists but has no releases.
    Empty,
    /// Published versions, in index order.
    Found(Vec<VersionRecord>),
}

impl Lookup {
    /// Builds a lookup from a list of records, mapping an empty list to [`Lookup::Empty`].
    pub fn from_records(records: Vec<VersionRecord>) -> Self {
        if records.is_empty() {
            Lookup::Empty
        } else {
            Lookup::Found(records)
        }
    }

    /// Version strings of a successful lookup; empty otherwise.
    ///
    /// Yanked releases are left out unless every release was yanked.
    pub fn versions(&self) -> Vec<String> {
        let Lookup::Found(records) = self else {
            return vec![];
        };

        let available: Vec<String> = records
            .iter()
            .filter(|r| !r.yanked)
            .map(|r| r.version.clone())
            .collect();
        if available.is_empty() {
            records.iter().map(|r| r.version.clone()).collect()
        } else {
            available
        }
    }
}

/// Trait for package indexes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Fetch every published version of `name`.
    async fn available_versions(&self, name: &str) -> Result<Lookup>;
}
