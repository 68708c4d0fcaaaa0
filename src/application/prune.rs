//! Prune action - removes installed packages nothing depends on.

use anyhow::Result;
use log::info;

use crate::package::InstalledPackage;
use crate::project::ProjectContext;
use crate::runtime::Runtime;

use super::{ListAction, RemoveAction};

/// Prune action - removes orphaned packages
pub struct PruneAction<'a, R: Runtime> {
    list: ListAction<'a, R>,
    remove: RemoveAction<'a, R>,
}

impl<'a, R: Runtime> PruneAction<'a, R> {
    pub fn new(runtime: &'a R, project: &'a ProjectContext) -> Self {
        Self {
            list: ListAction::new(runtime, project),
            remove: RemoveAction::new(runtime, project),
        }
    }

    /// Remove every orphan. Entries shared with packages that are still
    /// needed are kept, and the manifest is left untouched.
    #[tracing::instrument(skip(self))]
    pub fn prune(&self) -> Result<Vec<InstalledPackage>> {
        let tree = self.list.dependency_tree()?;
        let retained = tree.retained_entries();

        for package in &tree.orphans {
            info!("Pruning {}", package.name);
            self.remove.remove_files(package, &retained);
        }
        Ok(tree.orphans)
    }
}
