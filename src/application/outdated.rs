//! Outdated action - compares installed versions with the index.

use anyhow::Result;
use log::debug;

use crate::index::PackageIndex;
use crate::manifest::ManifestStore;
use crate::package::{ResolveError, VersionResolver, normalize_name, scan_packages};
use crate::project::ProjectContext;
use crate::runtime::Runtime;

/// A declared dependency whose installed version is missing or behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedEntry {
    pub name: String,
    pub range: String,
    /// Installed version; `None` when not installed
    pub current: Option<String>,
    /// Highest version satisfying `range`; `None` when nothing does
    pub wanted: Option<String>,
    /// Highest published version; `None` when the index has none
    pub latest: Option<String>,
}

impl OutdatedEntry {
    fn is_outdated(&self) -> bool {
        self.current.is_none() || self.current != self.wanted || self.current != self.latest
    }
}

/// Outdated action - resolves wanted/latest for every declared dependency
pub struct OutdatedAction<'a, R: Runtime, P: PackageIndex> {
    runtime: &'a R,
    project: &'a ProjectContext,
    index: &'a P,
}

impl<'a, R: Runtime, P: PackageIndex> OutdatedAction<'a, R, P> {
    pub fn new(runtime: &'a R, project: &'a ProjectContext, index: &'a P) -> Self {
        Self {
            runtime,
            project,
            index,
        }
    }

    /// Outdated dependencies sorted by name. Lookups run one at a time.
    #[tracing::instrument(skip(self))]
    pub async fn check(&self) -> Result<Vec<OutdatedEntry>> {
        let store = ManifestStore::new(self.runtime, self.project.manifest_path.clone());
        let declared = store.dependencies()?;
        if declared.is_empty() {
            return Ok(vec![]);
        }

        let installed = scan_packages(self.runtime, &self.project.modules_dir)?;
        let mut entries = Vec::new();

        for (name, range) in &declared {
            let key = normalize_name(name);
            let current = installed
                .iter()
                .find(|p| p.key() == key)
                .and_then(|p| p.version.clone());

            let versions = self.index.available_versions(name).await?.versions();
            let wanted = match VersionResolver::wanted(range, &versions) {
                Ok(version) => Some(version),
                Err(e @ ResolveError::NoSatisfyingVersion { .. }) => {
                    debug!("{}", e);
                    None
                }
                Err(e) => return Err(e.into()),
            };

            let entry = OutdatedEntry {
                name: name.clone(),
                range: range.clone(),
                current,
                wanted,
                latest: VersionResolver::latest(&versions),
            };
            if entry.is_outdated() {
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
