//! Remove action - deletes an installed package and optionally forgets it.

use anyhow::Result;
use log::debug;
use std::collections::HashSet;

use crate::manifest::ManifestStore;
use crate::package::{
    InstalledPackage, is_plain_entry, normalize_name, scan_packages, top_level_entries,
};
use crate::project::ProjectContext;
use crate::runtime::Runtime;

/// Result of [`RemoveAction::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(InstalledPackage),
    NotInstalled,
}

/// Remove action - deletes package files from the install directory
pub struct RemoveAction<'a, R: Runtime> {
    runtime: &'a R,
    project: &'a ProjectContext,
}

impl<'a, R: Runtime> RemoveAction<'a, R> {
    pub fn new(runtime: &'a R, project: &'a ProjectContext) -> Self {
        Self { runtime, project }
    }

    /// Remove `name` from the install directory; with `save`, also drop it
    /// from the manifest, whether or not it was installed.
    #[tracing::instrument(skip(self))]
    pub fn remove(&self, name: &str, save: bool) -> Result<RemoveOutcome> {
        let key = normalize_name(name);
        let (matched, others): (Vec<_>, Vec<_>) =
            scan_packages(self.runtime, &self.project.modules_dir)?
                .into_iter()
                .partition(|p| p.key() == key);

        let outcome = match matched.into_iter().next() {
            Some(package) => {
                self.remove_files(&package, &top_level_entries(&others));
                RemoveOutcome::Removed(package)
            }
            None => RemoveOutcome::NotInstalled,
        };

        if save {
            self.forget(name)?;
        }

        Ok(outcome)
    }

    /// Delete every entry owned by `package`. Top-level entries listed in
    /// `shared` belong to other installed packages too and are kept; the
    /// metadata directory always goes. Failures are ignored.
    pub fn remove_files(&self, package: &InstalledPackage, shared: &HashSet<String>) {
        let modules_dir = &self.project.modules_dir;

        for entry in package.owned_entries() {
            if !is_plain_entry(&entry) {
                debug!("Refusing to remove {:?} outside {:?}", entry, modules_dir);
                continue;
            }
            if entry != package.dist_info && shared.contains(&entry) {
                debug!("Keeping {:?}, still owned by another package", entry);
                continue;
            }

            let path = modules_dir.join(&entry);
            debug!("Removing {:?}", path);

            if let Err(e) = self.runtime.remove_dir_all(&path) {
                let module = modules_dir.join(format!("{}.py", entry));
                debug!("{:?} is not a directory ({}), trying {:?}", path, e, module);
                if let Err(e) = self.runtime.remove_file(&module) {
                    debug!("Failed to remove {:?}: {}", module, e);
                }
            }
        }
    }

    fn forget(&self, name: &str) -> Result<()> {
        let store = ManifestStore::new(self.runtime, self.project.manifest_path.clone());
        let mut dependencies = store.dependencies()?;

        let key = normalize_name(name);
        dependencies.retain(|declared, _| normalize_name(declared) != key);
        store.write_dependencies(dependencies)
    }
}
